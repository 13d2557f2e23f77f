//! Dashboard statistics over the loaded records.

use serde::Serialize;

use veilmatch_shared::{MatchRecord, MatchStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub total: usize,
    pub matched: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl MatchStats {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        records.iter().fold(
            Self {
                total: records.len(),
                ..Self::default()
            },
            |mut stats, record| {
                match record.status {
                    MatchStatus::Matched => stats.matched += 1,
                    MatchStatus::Pending => stats.pending += 1,
                    MatchStatus::Rejected => stats.rejected += 1,
                }
                stats
            },
        )
    }

    /// Percentage of records with `status`. An empty list counts as 0%.
    pub fn share(&self, status: MatchStatus) -> f64 {
        let count = match status {
            MatchStatus::Matched => self.matched,
            MatchStatus::Pending => self.pending,
            MatchStatus::Rejected => self.rejected,
        };
        count as f64 * 100.0 / self.total.max(1) as f64
    }
}
