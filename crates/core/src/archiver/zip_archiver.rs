//! Deflated zip archiver.

use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ArchiveError;
use super::traits::Archiver;
use super::ArchiveResult;

/// Archives a directory into a deflated zip file.
///
/// The zip is written to a sibling temp file first and renamed into place
/// so readers never observe a partial archive.
#[derive(Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }

    fn build_zip(dir: &Path, dest: &Path) -> Result<ArchiveResult, ArchiveError> {
        if !dir.is_dir() {
            return Err(ArchiveError::MissingFolder(dir.to_path_buf()));
        }

        let tmp_path = dest.with_extension("zip.tmp");
        let file = File::create(&tmp_path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut sources = Vec::new();
        collect_files(dir, &mut sources)?;

        let mut files = 0usize;
        for source in &sources {
            let relative = source
                .strip_prefix(dir)
                .map_err(|e| ArchiveError::TaskFailed(e.to_string()))?;
            let entry_name = relative.to_string_lossy().replace('\\', "/");
            zip.start_file(entry_name, options)?;
            let mut reader = File::open(source)?;
            std::io::copy(&mut reader, &mut zip)?;
            files += 1;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        drop(writer);

        if dest.exists() {
            std::fs::remove_file(dest)?;
        }
        std::fs::rename(&tmp_path, dest)?;

        let bytes = std::fs::metadata(dest)?.len();
        Ok(ArchiveResult {
            path: dest.to_path_buf(),
            bytes,
            files,
        })
    }
}

/// Recursively collect regular files under `dir`.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

#[async_trait]
impl Archiver for ZipArchiver {
    fn name(&self) -> &str {
        "zip"
    }

    async fn archive(&self, dir: &Path, dest: &Path) -> Result<ArchiveResult, ArchiveError> {
        let dir = dir.to_path_buf();
        let dest = dest.to_path_buf();
        let result = tokio::task::spawn_blocking(move || Self::build_zip(&dir, &dest))
            .await
            .map_err(|e| ArchiveError::TaskFailed(e.to_string()))??;

        debug!(
            "Archived {} files into {:?} ({} bytes)",
            result.files, result.path, result.bytes
        );
        Ok(result)
    }
}
