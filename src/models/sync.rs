/// Result of a quiet remote directory ensure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    Created,
    AlreadyExisted,
}

/// Totals for one completed upload run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub directories_created: usize,
    pub directories_existing: usize,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
}

impl SyncSummary {
    pub fn record_directory(&mut self, outcome: DirectoryOutcome) {
        match outcome {
            DirectoryOutcome::Created => self.directories_created += 1,
            DirectoryOutcome::AlreadyExisted => self.directories_existing += 1,
        }
    }

    pub fn record_upload(&mut self, bytes: u64) {
        self.files_uploaded += 1;
        self.bytes_uploaded += bytes;
    }

    pub fn directories_total(&self) -> usize {
        self.directories_created + self.directories_existing
    }
}
