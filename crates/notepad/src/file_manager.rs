use anyhow::{anyhow, Result};
use docformat::FileFormat;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::editor::Line;

const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Reads and writes documents, remembering which file and format the
/// current document belongs to.
pub struct FileManager {
    current_path: Option<PathBuf>,
    format: FileFormat,
    default_format: FileFormat,
}

impl FileManager {
    pub fn new(default_format: FileFormat) -> Self {
        Self {
            current_path: None,
            format: default_format,
            default_format,
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn has_file(&self) -> bool {
        self.current_path.is_some()
    }

    /// Forget the current file, as for a new untitled document.
    pub fn reset(&mut self) {
        self.current_path = None;
        self.format = self.default_format;
    }

    /// Display name of the current file, or `[Untitled]`.
    pub fn display_name(&self) -> String {
        self.current_path
            .as_deref()
            .map(basename)
            .unwrap_or_else(|| "[Untitled]".to_string())
    }

    /// Read `path` into lines and make it the current file.
    pub async fn load(&mut self, path: impl AsRef<Path>) -> Result<Vec<Line>> {
        let path = path.as_ref();

        match fs::metadata(path).await {
            Ok(metadata) if !metadata.is_file() => {
                return Err(anyhow!("Not a regular file: {}", path.display()));
            }
            Ok(metadata) if metadata.len() > LARGE_FILE_THRESHOLD => {
                log::warn!(
                    "Large file detected ({} bytes): {}",
                    metadata.len(),
                    path.display()
                );
            }
            Ok(_) => {}
            Err(e) => return Err(io_error("Cannot open", path, e)),
        }

        let bytes = fs::read(path)
            .await
            .map_err(|e| io_error("Cannot open", path, e))?;
        let lines = docformat::decode(&bytes);

        self.current_path = Some(path.to_path_buf());
        self.format = docformat::detect_format(path);
        log::info!(
            "Opened {} ({} lines, {:?})",
            path.display(),
            lines.len(),
            self.format
        );
        Ok(lines)
    }

    /// Encode `lines` as `format` and write them to `path`, which becomes
    /// the current file. Missing parent directories are created. Returns
    /// the number of bytes written.
    pub async fn save(
        &mut self,
        path: impl AsRef<Path>,
        lines: &[Line],
        format: FileFormat,
    ) -> Result<usize> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if fs::metadata(parent).await.is_err() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error("Cannot create directory", parent, e))?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        if let Ok(metadata) = fs::metadata(path).await {
            if metadata.permissions().readonly() {
                return Err(anyhow!("File is read-only: {}", path.display()));
            }
        }

        let bytes = docformat::encode(lines, format);
        fs::write(path, &bytes)
            .await
            .map_err(|e| io_error("Cannot save", path, e))?;

        self.current_path = Some(path.to_path_buf());
        self.format = format;
        log::info!(
            "Saved {} ({} bytes, {:?})",
            path.display(),
            bytes.len(),
            format
        );
        Ok(bytes.len())
    }

    /// Save back to the current file in the format its name implies.
    pub async fn save_current(&mut self, lines: &[Line]) -> Result<PathBuf> {
        let path = self
            .current_path
            .clone()
            .ok_or_else(|| anyhow!("No file name set"))?;
        let format = docformat::detect_format(&path);
        self.save(&path, lines, format).await?;
        Ok(path)
    }

    /// Path offered when exporting as `format`: the current file if there
    /// is one, else `document.<ext>`.
    pub fn suggested_path(&self, format: FileFormat) -> PathBuf {
        self.current_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("document.{}", format.extension())))
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new(FileFormat::default())
    }
}

/// Final component of `path`, or the whole path when it has none.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::NotFound => anyhow!("{action} {}: file not found", path.display()),
        std::io::ErrorKind::PermissionDenied => {
            anyhow!("{action} {}: permission denied", path.display())
        }
        _ => anyhow!("{action} {}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn lines(text: &[&str]) -> Vec<Line> {
        text.iter().map(|l| l.as_bytes().to_vec()).collect()
    }

    #[tokio::test]
    async fn test_file_manager_creation() {
        let fm = FileManager::new(FileFormat::Md);
        assert!(!fm.has_file());
        assert!(fm.current_path().is_none());
        assert_eq!(fm.format(), FileFormat::Md);
        assert_eq!(fm.display_name(), "[Untitled]");
    }

    #[tokio::test]
    async fn test_load_tracks_path_and_format() {
        let mut temp_file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(temp_file, "# Title\r\nbody\n").unwrap();

        let mut fm = FileManager::default();
        let loaded = fm.load(temp_file.path()).await.unwrap();
        assert_eq!(loaded, lines(&["# Title", "body"]));
        assert!(fm.has_file());
        assert_eq!(fm.format(), FileFormat::Md);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut fm = FileManager::default();
        let err = fm.load(dir.path().join("nope.txt")).await.unwrap_err();
        assert!(err.to_string().contains("file not found"));
        assert!(!fm.has_file());

        assert!(fm.load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_save_creates_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("out.csv");
        let mut fm = FileManager::default();

        let written = fm
            .save(&target, &lines(&["a,b", "c"]), FileFormat::Csv)
            .await
            .unwrap();
        let on_disk = std::fs::read(&target).unwrap();
        assert_eq!(on_disk, b"\"a,b\"\nc\n");
        assert_eq!(written, on_disk.len());
        assert_eq!(fm.current_path(), Some(target.as_path()));
        assert_eq!(fm.format(), FileFormat::Csv);
        assert_eq!(fm.display_name(), "out.csv");
    }

    #[tokio::test]
    async fn test_save_current_round_trips_text() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut fm = FileManager::default();
        assert!(fm.save_current(&lines(&["x"])).await.is_err());

        fm.load(temp_file.path()).await.unwrap();
        let path = fm.save_current(&lines(&["one", "two"])).await.unwrap();
        assert_eq!(path, temp_file.path());
        assert_eq!(std::fs::read(temp_file.path()).unwrap(), b"one\ntwo");

        let mut reopened = FileManager::default();
        assert_eq!(
            reopened.load(temp_file.path()).await.unwrap(),
            lines(&["one", "two"])
        );
    }

    #[test]
    fn test_suggested_path_and_reset() {
        let mut fm = FileManager::new(FileFormat::Txt);
        assert_eq!(
            fm.suggested_path(FileFormat::Html),
            PathBuf::from("document.html")
        );
        fm.current_path = Some(PathBuf::from("/tmp/notes.txt"));
        fm.format = FileFormat::Csv;
        assert_eq!(
            fm.suggested_path(FileFormat::Html),
            PathBuf::from("/tmp/notes.txt")
        );
        fm.reset();
        assert!(!fm.has_file());
        assert_eq!(fm.format(), FileFormat::Txt);
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename(Path::new("/a/b/c.txt")), "c.txt");
        assert_eq!(basename(Path::new("plain")), "plain");
        assert_eq!(basename(Path::new("/")), "/");
    }
}
