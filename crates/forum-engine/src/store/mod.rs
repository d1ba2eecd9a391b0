//! File-backed persistence for profiles and reports

pub mod profile;
pub mod report;

use forum_core::{Error, Result};

pub use profile::FileProfileStore;
pub use report::FileReportStore;

const MAX_ID_LEN: usize = 64;

/// Identifiers double as file names, so only `[A-Za-z0-9_-]{1,64}` is accepted
pub(crate) fn validate_id(kind: &str, id: &str) -> Result<()> {
    let valid = (1..=MAX_ID_LEN).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid {kind} id '{id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("user", "alice_01-x").is_ok());
        assert!(validate_id("user", "").is_err());
        assert!(validate_id("user", "../etc/passwd").is_err());
        assert!(validate_id("user", "a b").is_err());
        assert!(validate_id("user", &"x".repeat(65)).is_err());
    }
}
