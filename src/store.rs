use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::record::DiskUsageRecord;

/// Maximum number of rows in the table.
pub const DISKSIZE_MAX_ROWS: usize = 10;

struct Slots {
    records: [Option<DiskUsageRecord>; DISKSIZE_MAX_ROWS],
    /// Next write position; the slot is this value modulo the capacity.
    next_available_index: usize,
}

/// Fixed-capacity ring of disk usage records.
///
/// Every read and write goes through a single mutex held only for one slot
/// update, one lookup or one full clear. Once full, each insert overwrites the
/// oldest slot.
pub struct RecordStore {
    slots: Mutex<Slots>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                records: std::array::from_fn(|_| None),
                next_available_index: 0,
            }),
        }
    }

    // Every critical section leaves the slots consistent, so a panic in
    // another holder does not invalidate the data.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops every record and rewinds the write cursor.
    pub fn clear(&self) {
        let mut slots = self.lock();
        slots.records.fill(None);
        slots.next_available_index = 0;
    }

    pub fn insert(&self, record: DiskUsageRecord) {
        let mut slots = self.lock();
        let index = slots.next_available_index % DISKSIZE_MAX_ROWS;
        slots.next_available_index = slots.next_available_index.wrapping_add(1);
        slots.records[index] = Some(record);
    }

    /// Copy of the record at `index`, or `None` for a hole or an index past
    /// the capacity.
    pub fn get(&self, index: usize) -> Option<DiskUsageRecord> {
        self.lock().records.get(index).cloned().flatten()
    }

    pub fn capacity(&self) -> usize {
        DISKSIZE_MAX_ROWS
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.lock().records.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}
