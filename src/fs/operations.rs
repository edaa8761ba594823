//! Local file operations
//!
//! Everything that lands on the local disk goes through a [`PartialFile`]:
//! bytes are written to a hidden staging file next to the target and only
//! renamed into place once the write completed. A failed transfer drops the
//! staging file, so the target is either the complete new file or untouched.

use crate::error::{IoResultExt, Result, TransferError};
use crate::progress::ProgressReporter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const STAGING_PREFIX: &str = ".filexfer-";
const STAGING_SUFFIX: &str = ".part";

/// Check that `path` is an existing regular file and return its size
pub fn ensure_source_file(path: &Path) -> Result<u64> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TransferError::LocalFileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(TransferError::io(path, e)),
    };

    if !metadata.is_file() {
        return Err(TransferError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    Ok(metadata.len())
}

/// Output file staged next to its final location
///
/// Parent directories created for the staging file are removed again when
/// it is dropped without [`commit`](Self::commit).
#[derive(Debug)]
pub struct PartialFile {
    target: PathBuf,
    // Dropped before `dirs`, so the directories are empty by then.
    staging: NamedTempFile,
    dirs: CreatedDirs,
}

impl PartialFile {
    /// Create the staging file, creating the target's parent directories
    pub fn create(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dirs = CreatedDirs::create(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(parent)
            .with_path(parent)?;

        Ok(Self {
            target: target.to_path_buf(),
            staging,
            dirs,
        })
    }

    /// Final location of the file
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path of the staging file
    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }

    /// Handle for writing the staged bytes
    pub fn file_mut(&mut self) -> &mut File {
        self.staging.as_file_mut()
    }

    /// Flush to disk and atomically move the staging file onto the target
    pub fn commit(self) -> Result<PathBuf> {
        self.staging
            .as_file()
            .sync_all()
            .with_path(self.staging.path())?;

        let Self {
            target,
            staging,
            mut dirs,
        } = self;
        staging
            .persist(&target)
            .map_err(|e| TransferError::io(&target, e.error))?;
        dirs.keep();

        tracing::debug!("Committed {:?}", target);
        Ok(target)
    }
}

/// Directories created on behalf of a staging file, deepest first
#[derive(Debug, Default)]
struct CreatedDirs(Vec<PathBuf>);

impl CreatedDirs {
    /// Create `dir` and its missing ancestors, remembering which were new
    fn create(dir: &Path) -> Result<Self> {
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(d) = current {
            if d.as_os_str().is_empty() || d.exists() {
                break;
            }
            missing.push(d.to_path_buf());
            current = d.parent();
        }

        let dirs = Self(missing);
        std::fs::create_dir_all(dir).with_path(dir)?;
        Ok(dirs)
    }

    /// Leave the directories in place
    fn keep(&mut self) {
        self.0.clear();
    }
}

impl Drop for CreatedDirs {
    fn drop(&mut self) {
        // remove_dir only succeeds on empty directories
        for dir in &self.0 {
            if std::fs::remove_dir(dir).is_err() {
                break;
            }
        }
    }
}

/// Options for local file copies
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Buffer size for reads and writes
    pub buffer_size: usize,
    /// Preserve file permissions
    pub preserve_permissions: bool,
    /// Preserve access and modification time
    pub preserve_mtime: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024, // 1MB
            preserve_permissions: true,
            preserve_mtime: true,
        }
    }
}

/// Local file copier with overwrite-if-exists semantics
pub struct FileCopier {
    options: CopyOptions,
    progress: ProgressReporter,
}

impl FileCopier {
    /// Create a new file copier with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self {
            options,
            progress: ProgressReporter::disabled(),
        }
    }

    /// Create with default options
    pub fn default_copier() -> Self {
        Self::new(CopyOptions::default())
    }

    /// Report copied bytes to `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Copy `source` to `dest`, replacing `dest` only after a complete copy
    ///
    /// Returns the number of bytes copied. A missing source fails before
    /// anything is created on the destination side.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<u64> {
        let size = ensure_source_file(source)?;
        let src_file = File::open(source).with_path(source)?;

        let mut partial = PartialFile::create(dest)?;
        let staging_path = partial.staging_path().to_path_buf();

        self.progress.start(Some(size), "copy");
        let bytes_copied = {
            let mut reader = self
                .progress
                .wrap_read(BufReader::with_capacity(self.options.buffer_size, src_file));
            let mut writer = BufWriter::with_capacity(self.options.buffer_size, partial.file_mut());

            let copied = std::io::copy(&mut reader, &mut writer).with_path(&staging_path)?;
            writer.flush().with_path(&staging_path)?;
            copied
        };

        self.preserve_attributes(source, &staging_path)?;
        partial.commit()?;

        Ok(bytes_copied)
    }

    /// Preserve permissions and timestamps according to the options
    pub fn preserve_attributes(&self, source: &Path, dest: &Path) -> Result<()> {
        if self.options.preserve_permissions {
            self.copy_permissions(source, dest)?;
        }

        if self.options.preserve_mtime {
            self.copy_mtime(source, dest)?;
        }

        Ok(())
    }

    /// Copy file permissions
    fn copy_permissions(&self, source: &Path, dest: &Path) -> Result<()> {
        let metadata = std::fs::metadata(source).with_path(source)?;
        std::fs::set_permissions(dest, metadata.permissions()).with_path(dest)?;
        Ok(())
    }

    /// Copy modification time
    fn copy_mtime(&self, source: &Path, dest: &Path) -> Result<()> {
        let metadata = std::fs::metadata(source).with_path(source)?;

        if let Ok(mtime) = metadata.modified() {
            let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime));
        }

        if let Ok(atime) = metadata.accessed() {
            let _ = filetime::set_file_atime(dest, filetime::FileTime::from_system_time(atime));
        }

        Ok(())
    }
}
