/// One row of `disks_size`: a configured directory and the space left on the
/// filesystem holding it.
///
/// Records are built once and replaced wholesale; there are no setters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskUsageRecord {
    directory_label: String,
    source_variable: String,
    free_bytes: u64,
    total_bytes: u64,
}

impl DiskUsageRecord {
    pub fn new(
        directory_label: impl Into<String>,
        source_variable: impl Into<String>,
        free_bytes: u64,
        total_bytes: u64,
    ) -> Self {
        Self {
            directory_label: directory_label.into(),
            source_variable: source_variable.into(),
            free_bytes,
            total_bytes,
        }
    }

    /// Value of the variable as configured (DIR_NAME).
    pub fn directory_label(&self) -> &str {
        &self.directory_label
    }

    /// Name of the server variable the directory came from (RELATED_VARIABLE).
    pub fn source_variable(&self) -> &str {
        &self.source_variable
    }

    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}
