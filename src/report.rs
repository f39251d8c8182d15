use std::{cmp::Ordering, fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentIdentifier,
    error::{GymResult, IoError},
};

/// Summary of one completed (or in-flight) episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub initial_capital: f64,
    /// Mark-to-market account value at the last recorded valuation.
    pub final_value: f64,
    /// `(final_value - initial_capital) / initial_capital`.
    pub total_return: f64,
    /// Steps taken since the last reset.
    pub steps: usize,
    /// Full valuation history, seeded with the initial capital.
    pub valuations: Vec<f64>,
}

impl EpisodeReport {
    pub(crate) fn new(initial_capital: f64, valuations: &[f64]) -> Self {
        let final_value = valuations.last().copied().unwrap_or(initial_capital);
        Self {
            initial_capital,
            final_value,
            total_return: (final_value - initial_capital) / initial_capital,
            steps: valuations.len().saturating_sub(1),
            valuations: valuations.to_vec(),
        }
    }

    /// Persists the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> GymResult<()> {
        let file = File::create(path).map_err(IoError::from)?;
        serde_json::to_writer_pretty(file, self).map_err(IoError::from)?;
        Ok(())
    }
}

/// One evaluated agent on the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub agent_uid: u64,
    pub identifier: AgentIdentifier,
    pub final_value: f64,
    pub total_return: f64,
}

/// Top-`k` agents by total return.
///
/// Kept sorted and truncated on every insert so batch evaluation over large
/// agent streams holds at most `k` entries per rayon worker.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.saturating_add(1)),
        }
    }

    pub fn record(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.entries.sort_by(|a, b| {
            b.total_return
                .partial_cmp(&a.total_return)
                .unwrap_or(Ordering::Equal)
        });
        self.entries.truncate(self.capacity);
    }

    pub fn merge(mut self, other: Self) -> Self {
        for entry in other.entries {
            self.record(entry);
        }
        self
    }

    /// Entries sorted by total return, best first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> GymResult<()> {
        let file = File::create(path).map_err(IoError::from)?;
        serde_json::to_writer_pretty(file, self).map_err(IoError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(uid: u64, total_return: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            agent_uid: uid,
            identifier: AgentIdentifier::Named(Arc::new(format!("agent-{uid}"))),
            final_value: 100_000.0 * (1.0 + total_return),
            total_return,
        }
    }

    #[test]
    fn report_derives_return_from_history() {
        let report = EpisodeReport::new(100_000.0, &[100_000.0, 105_000.0, 110_000.0]);
        assert_eq!(report.final_value, 110_000.0);
        assert_eq!(report.steps, 2);
        assert!((report.total_return - 0.1).abs() < 1e-12);
    }

    #[test]
    fn leaderboard_keeps_top_k_sorted() {
        let mut board = Leaderboard::new(2);
        board.record(entry(1, 0.05));
        board.record(entry(2, -0.10));
        board.record(entry(3, 0.20));

        let uids: Vec<u64> = board.entries().iter().map(|e| e.agent_uid).collect();
        assert_eq!(uids, vec![3, 1]);
    }

    #[test]
    fn merge_respects_capacity() {
        let mut a = Leaderboard::new(2);
        a.record(entry(1, 0.01));
        a.record(entry(2, 0.02));
        let mut b = Leaderboard::new(2);
        b.record(entry(3, 0.03));
        b.record(entry(4, 0.04));

        let merged = a.merge(b);
        let uids: Vec<u64> = merged.entries().iter().map(|e| e.agent_uid).collect();
        assert_eq!(uids, vec![4, 3]);
    }
}
