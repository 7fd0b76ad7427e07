use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::bitmap::CapturedBitmap;
use crate::error::PersistError;

/// Writes finalized captures to disk as PNG
#[derive(Debug, Clone)]
pub struct PersistenceSink {
    dir: PathBuf,
}

impl PersistenceSink {
    /// Use `dir`, or `<temp>/glimpse` when none is configured
    pub fn new(dir: Option<PathBuf>) -> Self {
        let dir = dir.unwrap_or_else(|| std::env::temp_dir().join("glimpse"));
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(taken_at: DateTime<Local>) -> String {
        taken_at.format("glimpse-%Y%m%d-%H%M%S-%3f.png").to_string()
    }

    pub fn write(
        &self,
        bitmap: &CapturedBitmap,
        taken_at: DateTime<Local>,
    ) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(Self::file_name(taken_at));
        let png = bitmap
            .encode_png()
            .map_err(|e| PersistError::Encode(format!("{e:#}")))?;
        fs::write(&path, png).map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Saved capture to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use glimpse_types::Size;
    use image::RgbaImage;

    use super::*;

    #[test]
    fn test_file_name_from_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            PersistenceSink::file_name(at),
            "glimpse-20260309-140507-000.png"
        );
    }

    #[test]
    fn test_unwritable_dir_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let sink = PersistenceSink::new(Some(blocker.join("captures")));
        let bitmap = CapturedBitmap::new(RgbaImage::new(2, 2), Size::new(2.0, 2.0));

        assert!(matches!(
            sink.write(&bitmap, Local::now()),
            Err(PersistError::CreateDir { .. })
        ));
    }

    #[test]
    fn test_write_creates_png() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PersistenceSink::new(Some(dir.path().join("captures")));
        let bitmap = CapturedBitmap::new(RgbaImage::new(8, 6), Size::new(8.0, 6.0));

        let path = sink.write(&bitmap, Local::now()).unwrap();

        assert!(path.starts_with(dir.path().join("captures")));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }
}
