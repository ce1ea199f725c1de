use anyhow::Context;
use colored::Colorize;
use tempreg_server::{shutdown_signal, Lifecycle, LifecycleOptions, ServerConfig, Summary};

use crate::cli::Cli;

pub fn options(cli: &Cli) -> anyhow::Result<LifecycleOptions> {
    let server = ServerConfig::new(&cli.bind_host, cli.port).context("reading bind address")?;
    Ok(LifecycleOptions {
        server,
        no_cleanup: cli.no_cleanup,
        seed: !cli.no_seed,
    })
}

pub async fn run(cli: Cli) -> anyhow::Result<Summary> {
    let options = options(&cli)?;
    println!(
        "{} temporary registry on {}",
        "▶".green().bold(),
        options.server.bind_addr.to_string().bold()
    );
    let summary = Lifecycle::new(options).run(shutdown_signal()).await?;
    if summary.cleaned_up {
        println!("{} removed {}", "✓".green(), summary.root.display());
    } else {
        println!(
            "{} kept registry data in {}",
            "✓".green(),
            summary.root.display().to_string().yellow()
        );
    }
    Ok(summary)
}
