use serde_json::json;

use crate::logging::{LogEvent, LogFields, LogLevel};

/// Saturating counters for the editing session. Shared between the builder
/// and the store behind an `Arc<Mutex<_>>` when enabled.
#[derive(Debug, Default, Clone)]
pub struct BuilderMetrics {
    placements: u64,
    moves: u64,
    collisions_resolved: u64,
    compactions: u64,
    loads: u64,
    saves: u64,
    save_failures: u64,
}

impl BuilderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_placement(&mut self) {
        self.placements = self.placements.saturating_add(1);
    }

    pub fn record_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }

    pub fn record_collisions(&mut self, displaced: usize) {
        self.collisions_resolved = self.collisions_resolved.saturating_add(displaced as u64);
    }

    pub fn record_compaction(&mut self) {
        self.compactions = self.compactions.saturating_add(1);
    }

    pub fn record_load(&mut self) {
        self.loads = self.loads.saturating_add(1);
    }

    pub fn record_save(&mut self) {
        self.saves = self.saves.saturating_add(1);
    }

    pub fn record_save_failure(&mut self) {
        self.save_failures = self.save_failures.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            placements: self.placements,
            moves: self.moves,
            collisions_resolved: self.collisions_resolved,
            compactions: self.compactions,
            loads: self.loads,
            saves: self.saves,
            save_failures: self.save_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub placements: u64,
    pub moves: u64,
    pub collisions_resolved: u64,
    pub compactions: u64,
    pub loads: u64,
    pub saves: u64,
    pub save_failures: u64,
}

impl MetricsSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut fields = LogFields::new();
        fields.insert("placements".to_string(), json!(self.placements));
        fields.insert("moves".to_string(), json!(self.moves));
        fields.insert(
            "collisions_resolved".to_string(),
            json!(self.collisions_resolved),
        );
        fields.insert("compactions".to_string(), json!(self.compactions));
        fields.insert("loads".to_string(), json!(self.loads));
        fields.insert("saves".to_string(), json!(self.saves));
        fields.insert("save_failures".to_string(), json!(self.save_failures));
        LogEvent::new(LogLevel::Info, target, "builder_metrics").with_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_into_snapshot() {
        let mut metrics = BuilderMetrics::new();
        metrics.record_placement();
        metrics.record_placement();
        metrics.record_collisions(3);
        metrics.record_save();
        metrics.record_save_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.placements, 2);
        assert_eq!(snapshot.collisions_resolved, 3);
        assert_eq!(snapshot.saves, 1);
        assert_eq!(snapshot.save_failures, 1);
        assert_eq!(snapshot.moves, 0);
    }

    #[test]
    fn snapshot_event_carries_all_counters() {
        let mut metrics = BuilderMetrics::new();
        metrics.record_load();
        let event = metrics.snapshot().to_log_event("pageboard::metrics");
        assert_eq!(event.message, "builder_metrics");
        assert_eq!(event.fields["loads"], serde_json::json!(1));
        assert_eq!(event.fields["saves"], serde_json::json!(0));
    }
}
