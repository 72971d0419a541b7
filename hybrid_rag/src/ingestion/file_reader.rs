use std::path::{Path, PathBuf};

use crate::errors::PipelineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
    Markdown,
    Image,
}

impl FileKind {
    /// Classify by extension, ignoring case. Unknown extensions yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            "md" => Some(FileKind::Markdown),
            "jpg" | "jpeg" | "png" => Some(FileKind::Image),
            _ => None,
        }
    }
}

/// Files found in the raw data folder, grouped by kind and sorted by path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredFiles {
    pub pdf: Vec<PathBuf>,
    pub text: Vec<PathBuf>,
    pub markdown: Vec<PathBuf>,
    pub image: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn total(&self) -> usize {
        self.pdf.len() + self.text.len() + self.markdown.len() + self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Files that get chunked, text before markdown
    pub fn readable(&self) -> impl Iterator<Item = (FileKind, &PathBuf)> {
        let text = self.text.iter().map(|path| (FileKind::Text, path));
        let markdown = self.markdown.iter().map(|path| (FileKind::Markdown, path));
        text.chain(markdown)
    }

    /// Files that are counted but not parsed
    pub fn unsupported(&self) -> impl Iterator<Item = &PathBuf> {
        self.pdf.iter().chain(self.image.iter())
    }

    fn push(&mut self, kind: FileKind, path: PathBuf) {
        match kind {
            FileKind::Pdf => self.pdf.push(path),
            FileKind::Text => self.text.push(path),
            FileKind::Markdown => self.markdown.push(path),
            FileKind::Image => self.image.push(path),
        }
    }

    fn sort(&mut self) {
        self.pdf.sort();
        self.text.sort();
        self.markdown.sort();
        self.image.sort();
    }
}

/// Lists the top level of a folder (no recursion)
pub struct FileReader {
    folder: PathBuf,
}

impl FileReader {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self { folder: folder.into() }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub async fn read_files(&self) -> PipelineResult<DiscoveredFiles> {
        let mut files = DiscoveredFiles::default();
        let mut entries = tokio::fs::read_dir(&self.folder).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if let Some(kind) = FileKind::from_path(&path) {
                files.push(kind, path);
            }
        }

        files.sort();
        tracing::debug!(
            folder = %self.folder.display(),
            pdf = files.pdf.len(),
            text = files.text.len(),
            markdown = files.markdown.len(),
            image = files.image.len(),
            "Discovered files"
        );
        Ok(files)
    }
}

/// File name used as chunk provenance
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a/report.PDF")), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), Some(FileKind::Text));
        assert_eq!(FileKind::from_path(Path::new("README.md")), Some(FileKind::Markdown));
        assert_eq!(FileKind::from_path(Path::new("photo.jpeg")), Some(FileKind::Image));
        assert_eq!(FileKind::from_path(Path::new("data.csv")), None);
        assert_eq!(FileKind::from_path(Path::new("Makefile")), None);
    }

    #[tokio::test]
    async fn test_read_files_groups_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "guide.md", "scan.pdf", "logo.png", "data.csv"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = FileReader::new(dir.path()).read_files().await.unwrap();

        assert_eq!(files.total(), 5);
        let text: Vec<_> = files.text.iter().map(|p| display_name(p)).collect();
        assert_eq!(text, vec!["a.txt", "b.txt"]);
        let readable: Vec<_> = files.readable().map(|(kind, path)| (kind, display_name(path))).collect();
        assert_eq!(
            readable,
            vec![
                (FileKind::Text, "a.txt".to_string()),
                (FileKind::Text, "b.txt".to_string()),
                (FileKind::Markdown, "guide.md".to_string()),
            ]
        );
        assert_eq!(files.unsupported().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_folder_is_io_error() {
        let result = FileReader::new("/definitely/not/here").read_files().await;
        assert!(matches!(result, Err(crate::errors::PipelineError::Io(_))));
    }
}
