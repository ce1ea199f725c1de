//! Dataset and owner name validation.
//!
//! Valid names:
//! - Must be non-empty and at most [`MAX_NAME_LEN`] bytes
//! - Must start with a lowercase ASCII letter
//! - May contain only lowercase ASCII letters, digits, and `_`

use crate::error::{RepoError, RepoResult};

/// Longest accepted dataset or owner name.
pub const MAX_NAME_LEN: usize = 144;

/// Validate a dataset name.
///
/// ```
/// use tempreg_repo::validate_dataset_name;
///
/// assert!(validate_dataset_name("synths").is_ok());
/// assert!(validate_dataset_name("synths_2024").is_ok());
/// assert!(validate_dataset_name("Synths").is_err());
/// assert!(validate_dataset_name("2synths").is_err());
/// ```
pub fn validate_dataset_name(name: &str) -> RepoResult<()> {
    validate(name, "dataset name")
}

/// Validate an owner (peer) name. Same rules as dataset names.
pub fn validate_username(name: &str) -> RepoResult<()> {
    validate(name, "username")
}

fn validate(name: &str, what: &str) -> RepoResult<()> {
    let invalid = |reason: String| RepoError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let first = name
        .chars()
        .next()
        .ok_or_else(|| invalid(format!("{what} must not be empty")))?;
    if name.len() > MAX_NAME_LEN {
        return Err(invalid(format!(
            "{what} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if !first.is_ascii_lowercase() {
        return Err(invalid(format!("{what} must start with a lowercase letter")));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}
