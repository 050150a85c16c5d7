//! Migration file name codec
//!
//! File names have the shape `<id>_<name><extension>`, for example
//! `20261019120000123_create_users.sql`. The id is a decimal `u64` used as
//! the sort key, the extension is everything from the last `.` on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::domain::migration::{MigrationFile, SQL_EXTENSION};
use crate::domain::result::{Error, Result};

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)_(.+)(\.[^./\\]+)$").expect("file name pattern is valid")
});

/// Last id handed out by `next_id`, keeps ids strictly increasing
static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Split a file name into id, name and extension
pub fn parse(file_name: &str) -> Result<MigrationFile> {
    let caps = FILE_NAME_RE
        .captures(file_name)
        .ok_or_else(|| Error::InvalidFileName(file_name.to_string()))?;

    let id = caps[1]
        .parse::<u64>()
        .map_err(|_| Error::InvalidFileName(format!("{}: id out of range", file_name)))?;

    Ok(MigrationFile {
        id,
        name: caps[2].to_string(),
        extension: caps[3].to_string(),
        file_name: file_name.to_string(),
    })
}

/// Format a migration file name from its parts
pub fn file_name(id: u64, name: &str) -> String {
    format!("{}_{}{}", id, name, SQL_EXTENSION)
}

/// Build a fresh file name for a new migration
pub fn generate(name: &str) -> Result<String> {
    validate_name(name)?;
    Ok(file_name(next_id(), name))
}

/// Check that a migration name survives a trip through `file_name` and `parse`
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("Migration name cannot be empty"));
    }
    if name.trim() != name {
        return Err(Error::validation(
            "Migration name cannot start or end with whitespace",
        ));
    }
    if name.contains(['/', '\\', '\0', '\n', '\r']) {
        return Err(Error::validation(format!(
            "Migration name contains an invalid character: {:?}",
            name
        )));
    }
    Ok(())
}

/// Timestamp based id (`YYYYMMDDHHMMSSmmm`, UTC)
///
/// Never returns an id lower than or equal to one returned earlier in this
/// process, even when called twice within the same millisecond.
pub fn next_id() -> u64 {
    let candidate = Utc::now()
        .format("%Y%m%d%H%M%S%3f")
        .to_string()
        .parse::<u64>()
        .unwrap_or_default();

    let previous = LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or_default();
    candidate.max(previous + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let file = parse("1_create_users.sql").unwrap();
        assert_eq!(file.id, 1);
        assert_eq!(file.name, "create_users");
        assert_eq!(file.extension, ".sql");
        assert_eq!(file.file_name, "1_create_users.sql");
    }

    #[test]
    fn test_parse_uses_last_dot_for_extension() {
        let file = parse("0042_add.v2.columns.sql").unwrap();
        assert_eq!(file.id, 42);
        assert_eq!(file.name, "add.v2.columns");
        assert_eq!(file.extension, ".sql");

        let file = parse("3_notes.txt").unwrap();
        assert_eq!(file.extension, ".txt");
        assert!(!file.is_sql());
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        for bad in [
            "abc_test.sql",
            "notes.txt",
            "README",
            "1_.sql",
            "1_create_users",
            "1_create_users.",
            "_create_users.sql",
            "12create_users.sql",
            ".1_hidden.sql",
            "99999999999999999999999_overflow.sql",
        ] {
            assert!(
                matches!(parse(bad), Err(Error::InvalidFileName(_))),
                "{} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_generate_round_trips_through_parse() {
        for name in ["create_users", "add index", "v2.backfill", "ümlaut_ok"] {
            let generated = generate(name).unwrap();
            let parsed = parse(&generated).unwrap();
            assert_eq!(parsed.name, name);
            assert_eq!(parsed.extension, ".sql");
            assert!(parsed.id > 0);
        }
    }

    #[test]
    fn test_generate_rejects_invalid_names() {
        assert!(matches!(generate(""), Err(Error::Validation(_))));
        assert!(matches!(generate("   "), Err(Error::Validation(_))));
        assert!(matches!(generate(" padded"), Err(Error::Validation(_))));
        assert!(matches!(generate("nested/path"), Err(Error::Validation(_))));
        assert!(matches!(generate("dos\\path"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_next_id_strictly_increases() {
        let mut previous = next_id();
        for _ in 0..1000 {
            let id = next_id();
            assert!(id > previous);
            previous = id;
        }
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(file_name(7, "seed_data"), "7_seed_data.sql");
    }
}
