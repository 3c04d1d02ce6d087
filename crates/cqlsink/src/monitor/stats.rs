use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Kind of statement, detected from its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    pub fn from_cql(cql: &str) -> Self {
        let head = cql.trim_start();
        let starts = |kw: &str| {
            head.get(..kw.len())
                .is_some_and(|s| s.eq_ignore_ascii_case(kw))
        };
        if starts("INSERT") {
            StatementKind::Insert
        } else if starts("UPDATE") {
            StatementKind::Update
        } else if starts("DELETE") {
            StatementKind::Delete
        } else {
            StatementKind::Other
        }
    }
}

/// Snapshot of session counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub executed: u64,
    pub failed: u64,
    /// Conditional statements that were not applied.
    pub not_applied: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
}

#[derive(Debug, Default)]
pub(super) struct StatsCounters {
    executed: AtomicU64,
    failed: AtomicU64,
    not_applied: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    total_duration_nanos: AtomicU64,
    max_duration_nanos: AtomicU64,
}

impl StatsCounters {
    pub(super) fn record(&self, kind: StatementKind, duration: Duration, outcome: Option<bool>) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        match kind {
            StatementKind::Insert => self.insert_count.fetch_add(1, Ordering::Relaxed),
            StatementKind::Update => self.update_count.fetch_add(1, Ordering::Relaxed),
            StatementKind::Delete => self.delete_count.fetch_add(1, Ordering::Relaxed),
            StatementKind::Other => 0,
        };
        match outcome {
            None => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            Some(false) => {
                self.not_applied.fetch_add(1, Ordering::Relaxed);
            }
            Some(true) => {}
        }
        let nanos = duration.as_nanos() as u64;
        self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_duration_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> SessionStats {
        SessionStats {
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            not_applied: self.not_applied.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
        }
    }

    pub(super) fn reset(&self) {
        for counter in [
            &self.executed,
            &self.failed,
            &self.not_applied,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.total_duration_nanos,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
