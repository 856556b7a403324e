//! Filesystem statistics for a directory.

use std::path::Path;

use crate::error::Result;

/// Raw `statvfs` figures for the filesystem holding a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiskStat {
    pub block_count: u64,
    pub block_size: u64,
    pub available_blocks: u64,
}

impl DiskStat {
    pub fn total_bytes(&self) -> u64 {
        self.block_count.saturating_mul(self.block_size)
    }

    /// Space available to unprivileged users, not the raw free block count.
    pub fn free_bytes(&self) -> u64 {
        self.available_blocks.saturating_mul(self.block_size)
    }
}

/// Queries free and total space for a path.
pub trait DiskStatProbe: Send + Sync {
    fn stat(&self, path: &Path) -> Result<DiskStat>;
}

/// Probe backed by the operating system's `statvfs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatvfsProbe;

#[cfg(unix)]
impl DiskStatProbe for StatvfsProbe {
    fn stat(&self, path: &Path) -> Result<DiskStat> {
        use nix::sys::statvfs::statvfs;

        let stat = statvfs(path).map_err(|errno| crate::error::DisksizeError::Probe {
            path: path.to_path_buf(),
            source: std::io::Error::from(errno),
        })?;

        Ok(DiskStat {
            block_count: stat.blocks() as u64,
            block_size: stat.block_size() as u64,
            available_blocks: stat.blocks_available() as u64,
        })
    }
}

#[cfg(not(unix))]
impl DiskStatProbe for StatvfsProbe {
    fn stat(&self, path: &Path) -> Result<DiskStat> {
        Err(crate::error::DisksizeError::Probe {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "statvfs is not available on this platform",
            ),
        })
    }
}
