//! Error type shared by the store, the snapshot builder and the host glue.

use std::path::PathBuf;

/// Errors raised by the `disks_size` table provider.
///
/// Per-variable failures (unset variables, unreadable directories) never
/// escape a rebuild; they are logged and skipped. What remains here is what a
/// caller can actually observe.
#[derive(Debug, thiserror::Error)]
pub enum DisksizeError {
    /// The session lacks the privilege required to read the table.
    #[error("Access denied; you need (at least one of) the {privilege} privilege(s) for this operation")]
    AccessDenied {
        /// Name of the missing global privilege.
        privilege: String,
    },

    /// `statvfs` (or the platform equivalent) failed for a directory.
    #[error("OS file access problem to {}: {source}", path.display())]
    Probe {
        /// Directory that was probed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host refused to add the table to its catalog.
    #[error("table {table} has NOT been registered: {reason}")]
    Registration { table: String, reason: String },

    /// The host refused to drop the table from its catalog.
    #[error("error while trying to remove table {table}: {reason}")]
    Deregistration { table: String, reason: String },

    /// A column value could not be handed to the host.
    #[error("invalid value for column {column}: {reason}")]
    ColumnValue { column: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The table function was invoked after the service shut down.
    #[error("{table} service is not running")]
    NotRunning { table: String },
}

pub type Result<T, E = DisksizeError> = std::result::Result<T, E>;
