//! Filesystem-backed CSV log.
//!
//! Implements [`LogStorePort`] on top of `std::fs`.  On the device the
//! ESP-IDF VFS routes the path to the SPIFFS data partition registered by
//! [`mount_spiffs`]; on the host it is an ordinary file, which is what the
//! tests use.
//!
//! Every call opens and closes the file.  Appends are synced before
//! returning.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::app::ports::LogStorePort;
use crate::error::StorageError;

/// Row terminator.
pub const LINE_ENDING: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct FsLogStore {
    path: PathBuf,
}

impl FsLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn map_io(e: &io::Error, otherwise: StorageError) -> StorageError {
    match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound,
        _ => otherwise,
    }
}

impl LogStorePort for FsLogStore {
    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|_| StorageError::OpenFailed)?;

        file.write_all(line.as_bytes())
            .and_then(|()| file.write_all(LINE_ENDING.as_bytes()))
            .and_then(|()| file.sync_all())
            .map_err(|_| StorageError::WriteFailed)
    }

    fn remove(&mut self) -> Result<(), StorageError> {
        fs::remove_file(&self.path).map_err(|e| map_io(&e, StorageError::IoError))
    }

    fn size(&self) -> Result<u64, StorageError> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|e| map_io(&e, StorageError::IoError))
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError> {
        let mut file = File::open(&self.path).map_err(|e| map_io(&e, StorageError::OpenFailed))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|_| StorageError::IoError)?;
        file.read(buf).map_err(|_| StorageError::IoError)
    }
}

/// Register the SPIFFS partition `partition_label` with the VFS at
/// `mount_point`.  No formatting on failure: a damaged partition keeps
/// its data for offline recovery.
#[cfg(target_os = "espidf")]
pub fn mount_spiffs(partition_label: &str, mount_point: &str) -> Result<(), StorageError> {
    use std::ffi::CString;

    use esp_idf_sys::{ESP_OK, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};
    use log::{error, info};

    let base = CString::new(mount_point).map_err(|_| StorageError::MountFailed)?;
    let label = CString::new(partition_label).map_err(|_| StorageError::MountFailed)?;
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base.as_ptr(),
        partition_label: label.as_ptr(),
        max_files: 4,
        format_if_mount_failed: false,
    };

    // SAFETY: `conf` and both strings outlive the call.
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK as i32 {
        error!("storage: mounting '{}' at {} failed ({})", partition_label, mount_point, ret);
        return Err(StorageError::MountFailed);
    }
    // The VFS keeps referring to the registration strings.
    core::mem::forget(base);
    core::mem::forget(label);

    info!("storage: '{}' mounted at {}", partition_label, mount_point);
    Ok(())
}
