//! Naming rules for stored uploads.

use crate::error::{Error, Result};
use std::path::Path;
use uuid::Uuid;

/// Validate a client-supplied upload file name.
///
/// Only emptiness is rejected; the name is otherwise used verbatim.
pub fn check_file_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFileName(name.to_string()));
    }
    Ok(name)
}

/// Derive an alternate name for `name` by inserting a random suffix
/// before the extension: `report.pgp` becomes `report-<suffix>.pgp`.
pub fn alternate_file_name(name: &str) -> String {
    alternate_file_name_with(name, &random_suffix())
}

fn alternate_file_name_with(name: &str, suffix: &str) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem}-{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{suffix}"),
    }
}

fn random_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_goes_before_last_extension() {
        assert_eq!(alternate_file_name_with("report.pgp", "x1"), "report-x1.pgp");
        assert_eq!(
            alternate_file_name_with("archive.tar.gz", "x1"),
            "archive.tar-x1.gz"
        );
        assert_eq!(alternate_file_name_with("README", "x1"), "README-x1");
        assert_eq!(alternate_file_name_with(".profile", "x1"), ".profile-x1");
    }

    #[test]
    fn random_names_differ() {
        let a = alternate_file_name("report.pgp");
        let b = alternate_file_name("report.pgp");
        assert_ne!(a, b);
        assert!(a.starts_with("report-"));
        assert!(a.ends_with(".pgp"));
        assert_eq!(a.len(), "report-.pgp".len() + 12);
    }

    #[test]
    fn rejects_blank_names() {
        assert!(check_file_name("").is_err());
        assert!(check_file_name("   ").is_err());
        assert_eq!(check_file_name("x.gpg").unwrap(), "x.gpg");
    }
}
