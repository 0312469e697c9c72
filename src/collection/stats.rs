use chrono::Utc;
use serde::Serialize;

/// Runtime statistics of one collection handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub item_count: usize,
    pub version: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub rollbacks: u64,
    pub last_write_at: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct WriteMetrics {
    pub(crate) writes: u64,
    pub(crate) write_failures: u64,
    pub(crate) rollbacks: u64,
    pub(crate) last_write_at: Option<String>,
}

impl WriteMetrics {
    pub(crate) fn record_write(&mut self) {
        self.writes += 1;
        self.last_write_at = Some(Utc::now().to_rfc3339());
    }

    pub(crate) fn record_failure(&mut self, rolled_back: bool) {
        self.write_failures += 1;
        if rolled_back {
            self.rollbacks += 1;
        }
    }
}
