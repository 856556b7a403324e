//! Cursor protocol the host query engine drives to read `disks_size`.

use std::sync::Arc;

use tracing::trace;

use crate::auth::{ErrorReporter, Session};
use crate::error::Result;
use crate::record::DiskUsageRecord;
use crate::share::{DIR_NAME, FREE_SIZE, RELATED_VARIABLE, TOTAL_SIZE};
use crate::snapshot::SnapshotBuilder;
use crate::store::{RecordStore, DISKSIZE_MAX_ROWS};

/// Row position inside the record store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Position {
    index: usize,
}

impl Position {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_at(&mut self, other: Position) {
        self.index = other.index;
    }

    pub fn set_after(&mut self, other: Position) {
        self.index = other.index + 1;
    }
}

/// Result of a sequential read.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStatus {
    Found,
    EndOfFile,
}

/// Per-open cursor state.
#[derive(Debug, Default)]
pub struct DisksizeHandle {
    pos: Position,
    next_pos: Position,
    current_row: DiskUsageRecord,
}

impl DisksizeHandle {
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Points the cursor at a position previously returned by [`position`],
    /// to be read back with `rnd_pos`.
    ///
    /// [`position`]: DisksizeHandle::position
    pub fn set_position(&mut self, pos: Position) {
        self.pos.set_at(pos);
    }

    pub fn current_row(&self) -> &DiskUsageRecord {
        &self.current_row
    }
}

/// Receives one column value from `read_column_value`.
pub trait ColumnSink {
    fn set_varchar_utf8mb4(&mut self, value: &str) -> Result<()>;
    fn set_unsigned(&mut self, value: u64) -> Result<()>;
}

/// Operations a host query engine invokes on a read-only virtual table.
///
/// A handle only exists between `open_table` and `close_table`; every scan
/// operation borrows it, so none can run on an unopened or closed cursor.
pub trait VirtualTable {
    type Handle;

    fn open_table(&self, session: &Session, reporter: &dyn ErrorReporter) -> Self::Handle;
    fn close_table(&self, handle: Self::Handle);
    fn rnd_init(&self, handle: &mut Self::Handle, scan: bool) -> Result<()>;
    fn rnd_next(&self, handle: &mut Self::Handle) -> RowStatus;
    fn rnd_pos(&self, handle: &mut Self::Handle);
    fn reset_position(&self, handle: &mut Self::Handle);
    fn read_column_value(&self, handle: &Self::Handle, field: &mut dyn ColumnSink, index: usize) -> Result<()>;
    fn get_row_count(&self) -> u64;
    fn delete_all_rows(&self) -> Result<()>;
}

/// The `disks_size` table: a record store plus the builder that refills it
/// on every open.
pub struct DisksizeTable {
    store: Arc<RecordStore>,
    builder: SnapshotBuilder,
}

impl DisksizeTable {
    pub fn new(builder: SnapshotBuilder) -> Self {
        Self { store: Arc::clone(builder.store()), builder }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

impl VirtualTable for DisksizeTable {
    type Handle = DisksizeHandle;

    fn open_table(&self, session: &Session, reporter: &dyn ErrorReporter) -> DisksizeHandle {
        let summary = self.builder.rebuild(session, reporter);
        trace!(?summary, "disks_size opened");
        DisksizeHandle::default()
    }

    fn close_table(&self, handle: DisksizeHandle) {
        drop(handle);
    }

    fn rnd_init(&self, _handle: &mut DisksizeHandle, _scan: bool) -> Result<()> {
        Ok(())
    }

    fn rnd_next(&self, handle: &mut DisksizeHandle) -> RowStatus {
        handle.pos.set_at(handle.next_pos);

        match self.store.get(handle.pos.index()) {
            Some(record) => {
                handle.current_row = record;
                handle.next_pos.set_after(handle.pos);
                RowStatus::Found
            }
            None => RowStatus::EndOfFile,
        }
    }

    fn rnd_pos(&self, handle: &mut DisksizeHandle) {
        // A hole here means a rebuild raced us; keep the stale row.
        if let Some(record) = self.store.get(handle.pos.index()) {
            handle.current_row = record;
        }
    }

    fn reset_position(&self, handle: &mut DisksizeHandle) {
        handle.pos.reset();
        handle.next_pos.reset();
    }

    fn read_column_value(&self, handle: &DisksizeHandle, field: &mut dyn ColumnSink, index: usize) -> Result<()> {
        let row = &handle.current_row;
        match index {
            DIR_NAME => field.set_varchar_utf8mb4(row.directory_label()),
            RELATED_VARIABLE => field.set_varchar_utf8mb4(row.source_variable()),
            FREE_SIZE => field.set_unsigned(row.free_bytes()),
            TOTAL_SIZE => field.set_unsigned(row.total_bytes()),
            _ => Ok(()),
        }
    }

    fn get_row_count(&self) -> u64 {
        DISKSIZE_MAX_ROWS as u64
    }

    fn delete_all_rows(&self) -> Result<()> {
        self.store.clear();
        Ok(())
    }
}
