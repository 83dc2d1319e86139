//! Theme preference persisted as a one-line text file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use webterm_core::{PreferenceStore, WebTermError};

#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_theme(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let name = contents.trim();
                (!name.is_empty()).then(|| name.to_owned())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                debug!(path = %self.path.display(), %error, "cannot read theme preference");
                None
            }
        }
    }

    fn save_theme(&mut self, name: &str) -> webterm_core::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                WebTermError::preference(format!("{}: {error}", parent.display()))
            })?;
        }
        fs::write(&self.path, format!("{name}\n"))
            .map_err(|error| WebTermError::preference(format!("{}: {error}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_has_no_theme() {
        let dir = tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("theme"));
        assert_eq!(store.load_theme(), None);
    }

    #[test]
    fn save_creates_parent_and_round_trips() {
        let dir = tempdir().expect("tempdir");
        let mut store = FilePreferenceStore::new(dir.path().join("nested").join("theme"));
        store.save_theme("monokai").expect("save");
        assert_eq!(store.load_theme().as_deref(), Some("monokai"));
        assert_eq!(
            fs::read_to_string(store.path()).expect("read"),
            "monokai\n"
        );
    }

    #[test]
    fn blank_file_has_no_theme() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("theme");
        fs::write(&path, "  \n").expect("write");
        assert_eq!(FilePreferenceStore::new(path).load_theme(), None);
    }

    #[test]
    fn unwritable_location_reports_preference_error() {
        let dir = tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").expect("write");
        let mut store = FilePreferenceStore::new(blocker.join("theme"));
        let error = store.save_theme("dark").expect_err("parent is a file");
        assert!(matches!(error, WebTermError::Preference(_)));
    }
}
