//! DuckDB extension exposing the free and total space of the directories a
//! database server is configured with, as the `disks_size` table.
//!
//! The table is rebuilt on every scan: each configured variable is resolved,
//! its directory probed with `statvfs`, and the result written into a bounded
//! ring of records that the scan then walks with a cursor.

extern crate duckdb;
extern crate duckdb_loadable_macros;
extern crate libduckdb_sys;

pub mod auth;
pub mod config;
pub mod cursor;
pub mod error;
pub mod probe;
pub mod record;
pub mod resolver;
pub mod service;
pub mod share;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;

pub use auth::{AuthorizationGate, ErrorReporter, FirstErrorReporter, PrivilegeGate, Session};
pub use config::DisksizeConfig;
pub use cursor::{ColumnSink, DisksizeHandle, DisksizeTable, Position, RowStatus, VirtualTable};
pub use error::{DisksizeError, Result};
pub use probe::{DiskStat, DiskStatProbe, StatvfsProbe};
pub use record::DiskUsageRecord;
pub use resolver::{ConfigResolver, PathResolver};
pub use service::DisksizeService;
pub use share::{TableRegistry, TableShare, DISKS_SIZE_SHARE};
pub use snapshot::{RebuildSummary, SnapshotBuilder};
pub use store::{RecordStore, DISKSIZE_MAX_ROWS};

use duckdb::{
    core::{DataChunkHandle, Inserter, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
    Connection,
};
use duckdb_loadable_macros::duckdb_entrypoint_c_api;
use share::ColumnType;
use std::{
    error::Error,
    ffi::CString,
    sync::{Arc, Mutex, PoisonError, RwLock},
};
use tracing::{debug, info};

// ============================================================================
// Extension State
// One per loading database, carried as the table function's extra info
// ============================================================================

struct RunningService {
    service: DisksizeService,
    /// Security context every scan runs under; DuckDB has no per-user grants.
    session: Session,
}

/// Handle on the `disks_size` service of one database.
///
/// Clones share the same state. The clone registered with the table function
/// lives as long as the database's catalog.
#[derive(Clone, Default)]
pub struct DisksizeExtension {
    state: Arc<RwLock<Option<RunningService>>>,
}

impl DisksizeExtension {
    /// Builds the table from `config` and registers it on `con`.
    pub fn load(con: &Connection, mut config: DisksizeConfig) -> Result<Self> {
        apply_duckdb_settings(con, &mut config);

        let extension = Self::default();
        let builder = SnapshotBuilder::new(
            Arc::new(RecordStore::new()),
            config.resolver(),
            StatvfsProbe,
            config.gate(),
        );
        let service = DisksizeService::init(&mut DuckdbCatalog::attached(con, &extension), DisksizeTable::new(builder))?;
        extension.install(service, config.session());
        Ok(extension)
    }

    fn install(&self, service: DisksizeService, session: Session) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(RunningService { service, session });
    }

    fn running_table(&self) -> Result<(Arc<DisksizeTable>, Session)> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .as_ref()
            .map(|running| (Arc::clone(running.service.table()), running.session.clone()))
            .ok_or_else(|| DisksizeError::NotRunning {
                table: DISKS_SIZE_SHARE.name.to_string(),
            })
    }

    /// Deregisters the table and drops the snapshot. Scans issued afterwards
    /// fail with [`DisksizeError::NotRunning`].
    pub fn shutdown(&self) -> Result<()> {
        let running = self.state.write().unwrap_or_else(PoisonError::into_inner).take();
        match running {
            Some(running) => running.service.deinit(&mut DuckdbCatalog::detached()),
            None => Ok(()),
        }
    }
}

// ============================================================================
// DuckDB Catalog
// Registers shares as table functions on the loading connection
// ============================================================================

struct DuckdbCatalog<'a> {
    target: Option<(&'a Connection, &'a DisksizeExtension)>,
}

impl<'a> DuckdbCatalog<'a> {
    fn attached(con: &'a Connection, extension: &'a DisksizeExtension) -> Self {
        Self { target: Some((con, extension)) }
    }

    fn detached() -> Self {
        Self { target: None }
    }
}

impl TableRegistry for DuckdbCatalog<'_> {
    fn add_tables(&mut self, shares: &[&TableShare]) -> Result<()> {
        for share in shares {
            let (con, extension) = self.target.ok_or_else(|| DisksizeError::Registration {
                table: share.name.to_string(),
                reason: "no connection to register on".to_string(),
            })?;
            con.register_table_function_with_extra_info::<DisksSizeVTab, _>(share.name, extension)
                .map_err(|err| DisksizeError::Registration {
                    table: share.name.to_string(),
                    reason: err.to_string(),
                })?;
        }
        Ok(())
    }

    fn delete_tables(&mut self, shares: &[&TableShare]) -> Result<()> {
        // DuckDB cannot drop a table function; once the state is gone the
        // function only reports NotRunning.
        for share in shares {
            debug!("table function {} left in catalog until the database closes", share.name);
        }
        Ok(())
    }
}

// ============================================================================
// Disks Size Table Function - disks_size()
// Returns free and total space of each configured server directory
// ============================================================================

/// Writes one column of one row of the output chunk.
struct ChunkField<'a> {
    output: &'a DataChunkHandle,
    column: usize,
    row: usize,
}

impl ColumnSink for ChunkField<'_> {
    fn set_varchar_utf8mb4(&mut self, value: &str) -> Result<()> {
        let value = CString::new(value).map_err(|err| DisksizeError::ColumnValue {
            column: DISKS_SIZE_SHARE.columns[self.column].name,
            reason: err.to_string(),
        })?;
        self.output.flat_vector(self.column).insert(self.row, value);
        Ok(())
    }

    fn set_unsigned(&mut self, value: u64) -> Result<()> {
        let mut vector = self.output.flat_vector(self.column);
        // SAFETY: column is declared UBIGINT and row is within the chunk capacity.
        unsafe { vector.as_mut_slice::<u64>()[self.row] = value };
        Ok(())
    }
}

#[repr(C)]
struct DisksSizeBindData;

#[repr(C)]
struct DisksSizeInitData {
    table: Arc<DisksizeTable>,
    handle: Mutex<Option<DisksizeHandle>>,
}

impl Drop for DisksSizeInitData {
    fn drop(&mut self) {
        let handle = self.handle.get_mut().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            self.table.close_table(handle);
        }
    }
}

struct DisksSizeVTab;

impl VTab for DisksSizeVTab {
    type InitData = DisksSizeInitData;
    type BindData = DisksSizeBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn std::error::Error>> {
        for column in DISKS_SIZE_SHARE.columns {
            let type_id = match column.column_type {
                ColumnType::Char(_) => LogicalTypeId::Varchar,
                ColumnType::BigintUnsigned => LogicalTypeId::UBigint,
            };
            bind.add_result_column(column.name, LogicalTypeHandle::from(type_id));
        }
        Ok(DisksSizeBindData)
    }

    fn init(info: &InitInfo) -> Result<Self::InitData, Box<dyn std::error::Error>> {
        let extension = unsafe { &*info.get_extra_info::<DisksizeExtension>() };
        let (table, session) = extension.running_table()?;

        let reporter = FirstErrorReporter::new();
        let mut handle = table.open_table(&session, &reporter);
        if let Some(err) = reporter.take() {
            table.close_table(handle);
            return Err(Box::new(err));
        }
        table.rnd_init(&mut handle, true)?;

        Ok(DisksSizeInitData {
            table,
            handle: Mutex::new(Some(handle)),
        })
    }

    fn func(func: &TableFunctionInfo<Self>, output: &mut DataChunkHandle) -> Result<(), Box<dyn std::error::Error>> {
        let init_data = func.get_init_data();
        let table = &init_data.table;
        let mut guard = init_data.handle.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(handle) = guard.as_mut() else {
            output.set_len(0);
            return Ok(());
        };

        let mut count = 0;
        while count < DISKSIZE_MAX_ROWS && table.rnd_next(handle) == RowStatus::Found {
            for column in 0..DISKS_SIZE_SHARE.columns.len() {
                let mut field = ChunkField { output: &*output, column, row: count };
                table.read_column_value(handle, &mut field, column)?;
            }
            count += 1;
        }

        output.set_len(count);
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        None
    }
}

// ============================================================================
// Extension Entry Point
// ============================================================================

/// Fills gaps in `config` from the loading database's own settings.
fn apply_duckdb_settings(con: &Connection, config: &mut DisksizeConfig) {
    if !config.variables.contains_key("tmpdir") {
        match con.query_row("SELECT current_setting('temp_directory')", [], |row| row.get::<_, String>(0)) {
            Ok(dir) if !dir.is_empty() => {
                config.variables.insert("tmpdir".to_string(), dir);
            }
            Ok(_) => {}
            Err(err) => debug!("could not read temp_directory: {err}"),
        }
    }

    // Without external access the session may not look at the filesystem.
    if let Ok(false) = con.query_row("SELECT current_setting('enable_external_access')", [], |row| {
        row.get::<_, bool>(0)
    }) {
        info!("enable_external_access is off, {} will deny access", DISKS_SIZE_SHARE.name);
        config.access.grants.clear();
    }
}

#[duckdb_entrypoint_c_api()]
pub unsafe fn extension_entrypoint(con: Connection) -> Result<(), Box<dyn Error>> {
    DisksizeExtension::load(&con, DisksizeConfig::load()?)?;
    Ok(())
}
