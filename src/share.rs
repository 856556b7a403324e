//! Table description handed to the host catalog.

use crate::cursor::Position;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Fixed-width character column of the given length. The width is
    /// catalog metadata; table functions without a width declare plain text.
    Char(u16),
    BigintUnsigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    /// Catalog metadata. Every row sets all four columns, so nothing here
    /// ever produces a NULL.
    pub nullable: bool,
}

/// Everything the host needs to expose a virtual table.
///
/// `name` and `columns` drive registration and bind. `definition`,
/// `read_only` and `ref_length` describe the table to catalogs that store a
/// SQL schema and row references; the DuckDB table function needs neither.
#[derive(Clone, Copy, Debug)]
pub struct TableShare {
    pub name: &'static str,
    /// SQL column definition clause.
    pub definition: &'static str,
    pub columns: &'static [ColumnDef],
    /// Read-only tables reject writes; delete-all stays available.
    pub read_only: bool,
    /// Size of the position reference the host stores per row.
    pub ref_length: usize,
}

pub const DIR_NAME: usize = 0;
pub const RELATED_VARIABLE: usize = 1;
pub const FREE_SIZE: usize = 2;
pub const TOTAL_SIZE: usize = 3;

const DISKS_SIZE_COLUMNS: [ColumnDef; 4] = [
    ColumnDef { name: "DIR_NAME", column_type: ColumnType::Char(255), nullable: false },
    ColumnDef { name: "RELATED_VARIABLE", column_type: ColumnType::Char(60), nullable: false },
    ColumnDef { name: "FREE_SIZE", column_type: ColumnType::BigintUnsigned, nullable: true },
    ColumnDef { name: "TOTAL_SIZE", column_type: ColumnType::BigintUnsigned, nullable: true },
];

pub const DISKS_SIZE_SHARE: TableShare = TableShare {
    name: "disks_size",
    definition: "DIR_NAME char(255) not null, RELATED_VARIABLE char(60) not null, \
                 FREE_SIZE bigint unsigned, TOTAL_SIZE bigint unsigned, PRIMARY KEY(DIR_NAME)",
    columns: &DISKS_SIZE_COLUMNS,
    read_only: true,
    ref_length: std::mem::size_of::<Position>(),
};

/// Host catalog the service adds its tables to at startup and removes them
/// from at shutdown.
pub trait TableRegistry {
    fn add_tables(&mut self, shares: &[&TableShare]) -> Result<()>;
    fn delete_tables(&mut self, shares: &[&TableShare]) -> Result<()>;
}
