//! Production monitoring.
//!
//! Counters are atomics (the original bumped plain ints from concurrent
//! requests), the recent-assessment ring sits behind a Mutex with a cap.
//! Recording never fails the pipeline: a poisoned ring lock drops the
//! history entry and logs, nothing more.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::triage::types::{PriorityLevel, TriageAssessment};

pub const DEFAULT_HISTORY_CAP: usize = 100;

const LEVELS: [PriorityLevel; 6] = [
    PriorityLevel::Routine,
    PriorityLevel::Low,
    PriorityLevel::Moderate,
    PriorityLevel::High,
    PriorityLevel::Critical,
    PriorityLevel::Emergency,
];

fn level_index(level: PriorityLevel) -> usize {
    LEVELS.iter().position(|l| *l == level).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RecentAssessment {
    pub assessment_id: Uuid,
    pub level: &'static str,
    pub score: f64,
    pub driving_intent: String,
    pub fallback: bool,
    pub processing_ms: u64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub uptime_secs: u64,
    pub total_assessments: u64,
    pub llm_failures: u64,
    pub fallback_assessments: u64,
    pub safety_flags: u64,
    pub level_counts: BTreeMap<&'static str, u64>,
    /// fallbacks / total, 0 when idle.
    pub fallback_rate: f64,
    /// Mean over the history ring, not all time.
    pub avg_processing_ms: f64,
    pub recent: Vec<RecentAssessment>,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

pub struct TriageMonitor {
    started_at: Instant,
    total_assessments: AtomicU64,
    llm_failures: AtomicU64,
    fallback_assessments: AtomicU64,
    safety_flags: AtomicU64,
    level_counts: [AtomicU64; 6],
    history: Mutex<VecDeque<RecentAssessment>>,
    history_cap: usize,
}

impl TriageMonitor {
    pub fn new(history_cap: usize) -> Self {
        Self {
            started_at: Instant::now(),
            total_assessments: AtomicU64::new(0),
            llm_failures: AtomicU64::new(0),
            fallback_assessments: AtomicU64::new(0),
            safety_flags: AtomicU64::new(0),
            level_counts: std::array::from_fn(|_| AtomicU64::new(0)),
            history: Mutex::new(VecDeque::with_capacity(history_cap.max(1))),
            history_cap: history_cap.max(1),
        }
    }

    pub fn record_assessment(&self, assessment: &TriageAssessment) {
        self.total_assessments.fetch_add(1, Ordering::Relaxed);
        self.level_counts[level_index(assessment.priority.level)].fetch_add(1, Ordering::Relaxed);
        if assessment.fallback {
            self.fallback_assessments.fetch_add(1, Ordering::Relaxed);
        }

        let entry = RecentAssessment {
            assessment_id: assessment.id,
            level: assessment.priority.level.as_str(),
            score: assessment.priority.score,
            driving_intent: assessment.priority.driving_intent.clone(),
            fallback: assessment.fallback,
            processing_ms: assessment.processing_ms,
            at: assessment.assessed_at,
        };
        match self.history.lock() {
            Ok(mut ring) => {
                if ring.len() == self.history_cap {
                    ring.pop_front();
                }
                ring.push_back(entry);
            }
            Err(_) => tracing::error!("monitor history lock poisoned, dropping entry"),
        }
    }

    pub fn record_llm_failure(&self) {
        self.llm_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn record_safety_flags(&self, count: usize) {
        if count > 0 {
            self.safety_flags.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let total = self.total_assessments.load(Ordering::Relaxed);
        let fallbacks = self.fallback_assessments.load(Ordering::Relaxed);

        let mut level_counts = BTreeMap::new();
        for level in LEVELS {
            level_counts.insert(
                level.as_str(),
                self.level_counts[level_index(level)].load(Ordering::Relaxed),
            );
        }

        let recent: Vec<RecentAssessment> = match self.history.lock() {
            Ok(ring) => ring.iter().cloned().collect(),
            Err(_) => {
                tracing::error!("monitor history lock poisoned, snapshot without history");
                Vec::new()
            }
        };
        let avg_processing_ms = if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(|r| r.processing_ms as f64).sum::<f64>() / recent.len() as f64
        };

        DashboardSnapshot {
            uptime_secs: self.uptime_secs(),
            total_assessments: total,
            llm_failures: self.llm_failures.load(Ordering::Relaxed),
            fallback_assessments: fallbacks,
            safety_flags: self.safety_flags.load(Ordering::Relaxed),
            level_counts,
            fallback_rate: if total == 0 {
                0.0
            } else {
                fallbacks as f64 / total as f64
            },
            avg_processing_ms,
            recent,
        }
    }
}

impl Default for TriageMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}
