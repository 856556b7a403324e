use std::path::Path;

use crate::error::DisksizeError;
use crate::probe::{DiskStat, DiskStatProbe, StatvfsProbe};

#[test]
fn test_bytes_scale_by_block_size() {
    let stat = DiskStat { block_count: 250, block_size: 4096, available_blocks: 100 };
    assert_eq!(stat.total_bytes(), 1_024_000);
    assert_eq!(stat.free_bytes(), 409_600);
}

#[test]
fn test_bytes_saturate() {
    let stat = DiskStat { block_count: u64::MAX, block_size: 2, available_blocks: u64::MAX };
    assert_eq!(stat.total_bytes(), u64::MAX);
    assert_eq!(stat.free_bytes(), u64::MAX);
}

#[cfg(unix)]
#[test]
fn test_statvfs_on_crate_dir() {
    let stat = StatvfsProbe.stat(Path::new(env!("CARGO_MANIFEST_DIR"))).unwrap();
    assert!(stat.block_size > 0);
    assert!(stat.total_bytes() >= stat.free_bytes());
}

#[test]
fn test_statvfs_missing_dir() {
    let path = Path::new("/nonexistent/disksize/probe/dir");
    let err = StatvfsProbe.stat(path).unwrap_err();
    assert!(matches!(err, DisksizeError::Probe { ref path, .. } if path.ends_with("dir")));
    assert!(err.to_string().contains("/nonexistent/disksize/probe/dir"));
}
