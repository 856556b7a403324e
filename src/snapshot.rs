//! Rebuilds the record store from the live environment on every table open.

use std::path::{PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::{AuthorizationGate, ErrorReporter, Session};
use crate::error::DisksizeError;
use crate::probe::DiskStatProbe;
use crate::record::DiskUsageRecord;
use crate::resolver::{PathResolver, SERVER_SCOPE};
use crate::store::RecordStore;

/// Server variables reported by the table, in row order.
pub const VARIABLES_TO_PARSE: [&str; 10] = [
    "log_bin_basename",
    "datadir",
    "tmpdir",
    "innodb_undo_directory",
    "innodb_data_home_dir",
    "innodb_log_group_home_dir",
    "innodb_temp_tablespaces_dir",
    "innodb_tmpdir",
    "innodb_redo_log_archive_dirs",
    "replica_load_tmpdir",
];

/// Variables whose value is a file path prefix rather than a directory.
const FILE_PATH_VARIABLES: &[&str] = &["log_bin_basename"];

/// Outcome of one rebuild pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub inserted: usize,
    /// Variables that were unset or empty.
    pub unresolved: usize,
    pub probe_failures: usize,
    pub denied: bool,
}

pub struct SnapshotBuilder {
    store: Arc<RecordStore>,
    resolver: Box<dyn PathResolver>,
    probe: Box<dyn DiskStatProbe>,
    gate: Box<dyn AuthorizationGate>,
    variables: Vec<String>,
}

impl SnapshotBuilder {
    pub fn new(
        store: Arc<RecordStore>,
        resolver: impl PathResolver + 'static,
        probe: impl DiskStatProbe + 'static,
        gate: impl AuthorizationGate + 'static,
    ) -> Self {
        Self {
            store,
            resolver: Box::new(resolver),
            probe: Box::new(probe),
            gate: Box::new(gate),
            variables: VARIABLES_TO_PARSE.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the list of variables to report.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Clears the store, then repopulates it if `session` is authorized.
    ///
    /// A denied session leaves the store empty and gets an access-denied
    /// error through `reporter`. Per-variable failures are skipped.
    pub fn rebuild(&self, session: &Session, reporter: &dyn ErrorReporter) -> RebuildSummary {
        let mut summary = RebuildSummary::default();
        self.store.clear();

        if !self.gate.check(session) {
            debug!("user {} lacks {}, disks_size left empty", session.user(), self.gate.required_privilege());
            reporter.report(DisksizeError::AccessDenied {
                privilege: self.gate.required_privilege().to_string(),
            });
            summary.denied = true;
            return summary;
        }

        for name in &self.variables {
            // Resolve and probe outside the store lock.
            let Some(value) = self
                .resolver
                .get_variable(SERVER_SCOPE, name)
                .filter(|value| !value.is_empty())
            else {
                debug!("variable {name} is not set, skipping");
                summary.unresolved += 1;
                continue;
            };

            let path = if FILE_PATH_VARIABLES.contains(&name.as_str()) {
                containing_directory(&value)
            } else {
                PathBuf::from(&value)
            };

            let stat = match self.probe.stat(&path) {
                Ok(stat) => stat,
                Err(err) => {
                    warn!("{err} (variable {name})");
                    summary.probe_failures += 1;
                    continue;
                }
            };

            self.store.insert(DiskUsageRecord::new(
                value,
                name.as_str(),
                stat.free_bytes(),
                stat.total_bytes(),
            ));
            summary.inserted += 1;
        }

        debug!(
            "disks_size rebuilt: {} rows, {} unset, {} unreadable",
            summary.inserted, summary.unresolved, summary.probe_failures
        );
        summary
    }
}

/// Everything before the last path separator of `value`.
///
/// This is a plain string cut, not `Path::parent`: `/binlog` and `binlog`
/// both yield an empty path (which the probe rejects), and a trailing
/// separator is cut off as-is, so `/a/binlog/` yields `/a/binlog`.
pub fn containing_directory(value: &str) -> PathBuf {
    match value.rfind(MAIN_SEPARATOR) {
        Some(index) => PathBuf::from(&value[..index]),
        None => PathBuf::new(),
    }
}
