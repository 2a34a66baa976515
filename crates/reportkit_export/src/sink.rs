//! Persistence of finished export buffers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stores finished bytes under a filename.
///
/// Called only after rendering succeeded; a failed call must not leave a
/// partial file behind under `file_name`.
pub trait ReportSink: Send + Sync {
    fn persist(&self, file_name: &str, content: &[u8]) -> io::Result<()>;
}

/// Writes exports into one directory.
///
/// Content goes to a `.part` sibling first and is renamed into place.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    path_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(path_dir: impl Into<PathBuf>) -> Self {
        Self {
            path_dir: path_dir.into(),
        }
    }

    pub fn path_dir(&self) -> &Path {
        &self.path_dir
    }
}

impl ReportSink for DirectorySink {
    fn persist(&self, file_name: &str, content: &[u8]) -> io::Result<()> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a plain file name: {file_name:?}"),
            ));
        }
        fs::create_dir_all(&self.path_dir)?;

        let path_file = self.path_dir.join(file_name);
        let path_file_part = self.path_dir.join(format!("{file_name}.part"));
        if let Err(e) = fs::write(&path_file_part, content) {
            let _ = fs::remove_file(&path_file_part);
            return Err(e);
        }
        if let Err(e) = fs::rename(&path_file_part, &path_file) {
            let _ = fs::remove_file(&path_file_part);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_file_into_created_directory() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir_tmp.path().join("exports"));
        sink.persist("UsersList_20261017T093000000Z.pdf", b"%PDF-1.3")
            .unwrap();

        let path_file = sink.path_dir().join("UsersList_20261017T093000000Z.pdf");
        assert_eq!(fs::read(&path_file).unwrap(), b"%PDF-1.3");
        let l_names: Vec<_> = fs::read_dir(sink.path_dir()).unwrap().collect();
        assert_eq!(l_names.len(), 1);
    }

    #[test]
    fn failed_rename_leaves_no_part_file() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir_tmp.path());
        let path_blocker = dir_tmp.path().join("UsersList.pdf");
        fs::create_dir(&path_blocker).unwrap();
        fs::write(path_blocker.join("keep.txt"), b"x").unwrap();

        assert!(sink.persist("UsersList.pdf", b"%PDF-1.3").is_err());
        let l_names: Vec<String> = fs::read_dir(dir_tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(l_names, vec!["UsersList.pdf".to_string()]);
        assert!(path_blocker.is_dir());
    }

    #[test]
    fn path_like_names_are_rejected() {
        let dir_tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir_tmp.path());
        let err = sink.persist("../escape.pdf", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!dir_tmp.path().join("../escape.pdf").exists());
    }
}
