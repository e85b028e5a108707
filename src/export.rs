use arboard::Clipboard;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const EXPORT_EXTENSION: &str = "txt";
pub const DEFAULT_FILENAME_LENGTH: usize = 50;
const FALLBACK_STEM: &str = "untitled";

/// Hands exported text to the outside world.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download_file(&self, text: &str, filename: &str) -> Result<()>;
}

/// Filename for an export: the first line of the text, cut to `max_chars`
/// without leaving half a word at the end, plus the extension.
pub fn export_filename(text: &str, max_chars: usize) -> String {
    let first_line = text.trim().lines().next().unwrap_or_default().trim();
    let chars: Vec<char> = first_line.chars().collect();

    let mut stem: String = chars.iter().take(max_chars).collect();
    let cut_mid_word = chars.len() > max_chars
        && max_chars > 0
        && !chars[max_chars].is_whitespace()
        && !chars[max_chars - 1].is_whitespace();
    if cut_mid_word {
        if let Some(idx) = stem.rfind(' ') {
            stem.truncate(idx);
        }
    }

    let stem: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim();

    if stem.is_empty() {
        format!("{FALLBACK_STEM}.{EXPORT_EXTENSION}")
    } else {
        format!("{stem}.{EXPORT_EXTENSION}")
    }
}

/// Writes exports into a directory, never replacing an existing file.
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `name.txt`, then `name (1).txt`, `name (2).txt`, ...
    async fn unused_path(&self, filename: &str) -> Result<PathBuf> {
        let candidate = self.dir.join(filename);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut n = 1;
        loop {
            let candidate = self.dir.join(format!("{stem} ({n}){extension}"));
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

#[async_trait]
impl Downloader for DirectoryDownloader {
    async fn download_file(&self, text: &str, filename: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.unused_path(filename).await?;
        tokio::fs::write(&path, text).await?;
        tracing::info!("Exported {} bytes to {:?}", text.len(), path);
        Ok(())
    }
}

/// Puts the text on the system clipboard. The clipboard handle is kept for
/// the downloader's lifetime; some platforms drop the contents with it.
#[derive(Default)]
pub struct ClipboardDownloader {
    clipboard: Mutex<Option<Clipboard>>,
}

impl ClipboardDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Downloader for ClipboardDownloader {
    async fn download_file(&self, text: &str, filename: &str) -> Result<()> {
        let mut slot = self.clipboard.lock();
        if slot.is_none() {
            *slot = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = slot.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        tracing::info!("Copied {:?} to the clipboard", filename);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filename_from_first_line() {
        assert_eq!(export_filename("Shopping list\n- eggs", 50), "Shopping list.txt");
        assert_eq!(export_filename("\n\n  Padded  \nmore", 50), "Padded.txt");
    }

    #[test]
    fn test_filename_drops_partial_word() {
        assert_eq!(export_filename("Meeting notes tomorrow", 16), "Meeting notes.txt");
        // cut right after a word keeps it
        assert_eq!(export_filename("Meeting notes tomorrow", 13), "Meeting notes.txt");
        // cut at a space keeps the full words before it
        assert_eq!(export_filename("Meeting notes tomorrow", 14), "Meeting notes.txt");
        // a single long word has nothing to drop back to
        assert_eq!(export_filename("Supercalifragilistic", 5), "Super.txt");
    }

    #[test]
    fn test_filename_sanitized_and_fallback() {
        assert_eq!(export_filename("a/b: c?", 50), "a_b_ c_.txt");
        assert_eq!(export_filename("", 50), "untitled.txt");
        assert_eq!(export_filename("   \n  ", 50), "untitled.txt");
    }

    #[tokio::test]
    async fn test_directory_downloader_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(dir.path().join("out"));

        downloader.download_file("one", "note.txt").await.unwrap();
        downloader.download_file("two", "note.txt").await.unwrap();
        downloader.download_file("three", "note.txt").await.unwrap();

        let out = dir.path().join("out");
        assert_eq!(std::fs::read_to_string(out.join("note.txt")).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(out.join("note (1).txt")).unwrap(), "two");
        assert_eq!(std::fs::read_to_string(out.join("note (2).txt")).unwrap(), "three");
    }
}
