use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::auth::{FirstErrorReporter, PrivilegeGate, Session};
use crate::cursor::{ColumnSink, DisksizeHandle, DisksizeTable, RowStatus, VirtualTable};
use crate::error::{DisksizeError, Result};
use crate::probe::{DiskStat, DiskStatProbe};
use crate::record::DiskUsageRecord;
use crate::resolver::ConfigResolver;
use crate::share::{TableRegistry, TableShare};
use crate::snapshot::SnapshotBuilder;
use crate::store::RecordStore;

pub(crate) const PRIVILEGE: &str = "SENSITIVE_VARIABLES_OBSERVER";

pub(crate) fn record(label: &str, variable: &str, free: u64, total: u64) -> DiskUsageRecord {
    DiskUsageRecord::new(label, variable, free, total)
}

pub(crate) fn stat(total: u64, free: u64) -> DiskStat {
    DiskStat { block_count: total, block_size: 1, available_blocks: free }
}

pub(crate) fn authorized() -> Session {
    Session::new("monitor", [PRIVILEGE])
}

pub(crate) fn unauthorized() -> Session {
    Session::new("guest", Vec::<String>::new())
}

/// Disk table answering from a fixed path table and recording every call.
#[derive(Default)]
pub(crate) struct FixedDisks {
    stats: HashMap<PathBuf, DiskStat>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
    delay: Duration,
}

impl FixedDisks {
    pub(crate) fn new<'a>(stats: impl IntoIterator<Item = (&'a str, DiskStat)>) -> Self {
        Self {
            stats: stats.into_iter().map(|(path, stat)| (PathBuf::from(path), stat)).collect(),
            calls: Arc::default(),
            delay: Duration::ZERO,
        }
    }

    /// Makes every `stat` take `delay`, like a slow disk.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<PathBuf>>> {
        Arc::clone(&self.calls)
    }
}

impl DiskStatProbe for FixedDisks {
    fn stat(&self, path: &Path) -> Result<DiskStat> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.stats.get(path).copied().ok_or_else(|| DisksizeError::Probe {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

pub(crate) fn builder(
    store: &Arc<RecordStore>,
    variables: &[(&str, &str)],
    disks: FixedDisks,
) -> SnapshotBuilder {
    let resolver: ConfigResolver = variables.iter().copied().collect();
    SnapshotBuilder::new(Arc::clone(store), resolver, disks, PrivilegeGate::new(PRIVILEGE))
        .with_variables(variables.iter().map(|(name, _)| *name))
}

/// Table reporting `variables`, each measured from `stats`.
pub(crate) fn table(variables: &[(&str, &str)], stats: &[(&str, DiskStat)]) -> DisksizeTable {
    let store = Arc::new(RecordStore::new());
    DisksizeTable::new(builder(&store, variables, FixedDisks::new(stats.iter().copied())))
}

/// Opens the table as `session` and returns every row of one full scan.
pub(crate) fn open_and_scan(table: &DisksizeTable, session: &Session) -> Vec<DiskUsageRecord> {
    let reporter = FirstErrorReporter::new();
    let mut handle = table.open_table(session, &reporter);
    let rows = scan(table, &mut handle);
    table.close_table(handle);
    rows
}

pub(crate) fn scan(table: &DisksizeTable, handle: &mut DisksizeHandle) -> Vec<DiskUsageRecord> {
    let mut rows = Vec::new();
    while table.rnd_next(handle) == RowStatus::Found {
        rows.push(handle.current_row().clone());
    }
    rows
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Value {
    Text(String),
    Unsigned(u64),
}

/// Column sink collecting the values it is handed.
#[derive(Default)]
pub(crate) struct RowSink {
    pub(crate) values: Vec<Value>,
}

impl ColumnSink for RowSink {
    fn set_varchar_utf8mb4(&mut self, value: &str) -> Result<()> {
        self.values.push(Value::Text(value.to_string()));
        Ok(())
    }

    fn set_unsigned(&mut self, value: u64) -> Result<()> {
        self.values.push(Value::Unsigned(value));
        Ok(())
    }
}

/// In-memory catalog.
#[derive(Default)]
pub(crate) struct MemoryRegistry {
    pub(crate) tables: BTreeSet<&'static str>,
    pub(crate) fail_add: bool,
}

impl TableRegistry for MemoryRegistry {
    fn add_tables(&mut self, shares: &[&TableShare]) -> Result<()> {
        if self.fail_add {
            return Err(DisksizeError::Registration {
                table: shares[0].name.to_string(),
                reason: "catalog is read-only".to_string(),
            });
        }
        self.tables.extend(shares.iter().map(|share| share.name));
        Ok(())
    }

    fn delete_tables(&mut self, shares: &[&TableShare]) -> Result<()> {
        for share in shares {
            if !self.tables.remove(share.name) {
                return Err(DisksizeError::Deregistration {
                    table: share.name.to_string(),
                    reason: "not registered".to_string(),
                });
            }
        }
        Ok(())
    }
}
