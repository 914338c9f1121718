use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::OutputTarget;
use crate::domain::error::AppError;

/// Same-second collisions get a numeric suffix; give up after this many
const MAX_SUFFIX: u32 = 1000;

/// Writes `<prefix>_<YYYYMMDD_HHMMSS>.txt` files into a directory
pub struct FileOutput {
    dir: PathBuf,
}

impl FileOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn candidate(&self, prefix: &str, timestamp: &str, n: u32) -> PathBuf {
        let name = if n == 0 {
            format!("{prefix}_{timestamp}.txt")
        } else {
            format!("{prefix}_{timestamp}_{n}.txt")
        };
        self.dir.join(name)
    }
}

/// Writes `content` to the freshly created `path`; a failed write removes
/// the partial file.
async fn write_or_remove<W>(path: &Path, writer: &mut W, content: &str) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(content.as_bytes()).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        if let Err(rm) = tokio::fs::remove_file(path).await {
            log::warn!("Could not remove partial output {}: {rm}", path.display());
        }
        return Err(AppError::storage(format!(
            "Failed to write {}: {e}",
            path.display()
        )));
    }
    Ok(())
}

pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

#[async_trait]
impl OutputTarget for FileOutput {
    async fn save(&self, content: &str, prefix: &str) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::storage(format!("Failed to create output folder {}: {e}", self.dir.display()))
        })?;

        let ts = timestamp();
        for n in 0..MAX_SUFFIX {
            let path = self.candidate(prefix, &ts, n);
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            let mut file = match file {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(AppError::storage(format!(
                        "Failed to create {}: {e}",
                        path.display()
                    )))
                }
            };

            write_or_remove(&path, &mut file, content).await?;

            log::info!("Saved output: {} ({} chars)", path.display(), content.len());
            return Ok(path);
        }

        Err(AppError::storage(format!(
            "Too many output files named {prefix}_{ts} in {}",
            self.dir.display()
        )))
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_timestamped(name: &str, prefix: &str) -> bool {
        let Some(rest) = name.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
            return false;
        };
        let stamp = &rest[..15.min(rest.len())];
        stamp.len() == 15
            && stamp.as_bytes()[8] == b'_'
            && stamp.chars().enumerate().all(|(i, c)| i == 8 || c.is_ascii_digit())
            && name.ends_with(".txt")
    }

    #[tokio::test]
    async fn test_save_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = FileOutput::new(dir.path().join("nested").join("output"));

        let path = out.save("Dear Board,\nHello.", "rewritten_email").await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(is_timestamped(&name, "rewritten_email"), "{name}");
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "Dear Board,\nHello.");
    }

    #[tokio::test]
    async fn test_same_second_saves_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let out = FileOutput::new(dir.path());

        let first = out.save("one", "processed_mail").await.unwrap();
        let second = out.save("two", "processed_mail").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(tokio::fs::read_to_string(&first).await.unwrap(), "one");
        assert_eq!(tokio::fs::read_to_string(&second).await.unwrap(), "two");
    }

    /// Writer whose every write fails
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::Error::new(ErrorKind::Other, "no space left")))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rewritten_email_20240101_120000.txt");
        tokio::fs::write(&path, "").await.unwrap();

        let err = write_or_remove(&path, &mut FullDisk, "Dear team").await.unwrap_err();
        assert_eq!(err.code, crate::domain::error::ErrorCode::Storage);
        assert!(err.message.contains("no space left"));
        assert!(!path.exists());
    }

    #[test]
    fn test_ingestion_prefix() {
        assert_eq!(super::super::ingestion_prefix("mail"), "processed_mail");
    }
}
