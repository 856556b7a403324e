//! Service lifecycle: table registration at startup, removal at shutdown.

use std::sync::Arc;

use tracing::{error, info};

use crate::cursor::DisksizeTable;
use crate::error::Result;
use crate::share::{TableRegistry, TableShare, DISKS_SIZE_SHARE};

/// Shares added to the host catalog by this service.
pub const SHARE_LIST: [&TableShare; 1] = [&DISKS_SIZE_SHARE];

/// A running `disks_size` service. Created by [`init`](Self::init), torn down
/// by [`deinit`](Self::deinit).
pub struct DisksizeService {
    table: Arc<DisksizeTable>,
}

impl DisksizeService {
    /// Registers the table with the host. On failure nothing stays
    /// registered and the table (with its store) is dropped.
    pub fn init(registry: &mut dyn TableRegistry, table: DisksizeTable) -> Result<Self> {
        info!("initializing...");

        if let Err(err) = registry.add_tables(&SHARE_LIST) {
            error!("{err}");
            return Err(err);
        }
        info!("table {} has been registered successfully.", DISKS_SIZE_SHARE.name);

        Ok(Self { table: Arc::new(table) })
    }

    pub fn table(&self) -> &Arc<DisksizeTable> {
        &self.table
    }

    /// Clears the snapshot and removes the table from the host catalog.
    pub fn deinit(self, registry: &mut dyn TableRegistry) -> Result<()> {
        self.table.store().clear();

        if let Err(err) = registry.delete_tables(&SHARE_LIST) {
            error!("{err}");
            return Err(err);
        }
        info!("table {} has been removed successfully.", DISKS_SIZE_SHARE.name);
        info!("uninstalled.");
        Ok(())
    }
}
