//! Discovery of input workbooks

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// List the XLSX workbooks directly inside `dir`, sorted by file name.
///
/// Only regular files with an `xlsx` extension (any case) are eligible;
/// subdirectories are not descended into. The sort gives the deterministic
/// processing order the merge relies on.
pub fn list_workbooks<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut workbooks = Vec::new();

    for entry in WalkDir::new(dir.as_ref()).max_depth(1).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && has_xlsx_extension(entry.path()) {
            workbooks.push(entry.path().to_path_buf());
        }
    }

    workbooks.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(workbooks)
}

fn has_xlsx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_filters_and_sorts_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xlsx", "a.xlsx", "notes.txt", "c.XLSX", "plain"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let workbooks = list_workbooks(dir.path()).unwrap();
        let names: Vec<_> = workbooks
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, vec!["a.xlsx", "b.xlsx", "c.XLSX"]);
    }

    #[test]
    fn test_does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.xlsx"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.xlsx"), b"").unwrap();

        let workbooks = list_workbooks(dir.path()).unwrap();
        assert_eq!(workbooks.len(), 1);
        assert!(workbooks[0].ends_with("top.xlsx"));
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_workbooks(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(list_workbooks(&missing).is_err());
    }
}
