use clap::Parser;
use tempreg_server::DEFAULT_PORT;

#[derive(Debug, Parser)]
#[command(
    name = "tempreg",
    about = "Temporary registry: a seeded, throwaway dataset registry for tests",
    version
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "TEMPREG_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "TEMPREG_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Keep the temporary registry data on exit
    #[arg(long, env = "TEMPREG_NO_CLEANUP")]
    pub no_cleanup: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "TEMPREG_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Start without the seed datasets
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
