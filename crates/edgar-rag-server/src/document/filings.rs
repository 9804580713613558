use std::path::{Path, PathBuf};

use crate::utils::error::ApiError;

/// Filename convention: `*_pooled.txt` files hold several filing sections
/// joined by the section delimiter and take the section-aware chunking path.
pub fn is_pooled(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().contains("_pooled"))
        .unwrap_or(false)
}

/// Raw filings live under `data_root/<company>/`.
pub fn company_dir(data_root: &Path, company: &str) -> PathBuf {
    data_root.join(company)
}

/// Lists the filing files of one company directory, sorted by name so chunk
/// ids stay stable across runs.
pub fn list_filings(dir: &Path) -> Result<Vec<PathBuf>, ApiError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ApiError::Io(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ApiError::Io(format!("{}: {}", dir.display(), e)))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_convention_matches_filenames() {
        assert!(is_pooled(Path::new("10ks/Ford/ford_10k_pooled.txt")));
        assert!(!is_pooled(Path::new("10ks/Ford/ford_10k_item1.txt")));
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let err = list_filings(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[test]
    fn listing_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let files = list_filings(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
