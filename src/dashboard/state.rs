use crate::api::types::PairDayData;
use crate::dashboard::params::DashboardParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What happened to one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The cycle was still the latest and its rows are now displayed.
    Published { cycle: u64, rows: usize },
    /// A newer cycle started before this one finished; its result was dropped.
    Stale { cycle: u64, latest: u64 },
    /// The cycle was the latest and one of its fetches failed.
    Failed { cycle: u64, message: String },
}

impl CycleOutcome {
    pub fn cycle(&self) -> u64 {
        match self {
            CycleOutcome::Published { cycle, .. }
            | CycleOutcome::Stale { cycle, .. }
            | CycleOutcome::Failed { cycle, .. } => *cycle,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, CycleOutcome::Published { .. })
    }
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub params: DashboardParams,
    pub state: RefreshState,
    pub loading: bool,
    pub rows: Vec<PairDayData>,
    /// Number of the most recently started cycle.
    pub cycle: u64,
    /// Cycle whose rows are currently displayed, 0 if none yet.
    pub displayed_cycle: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl DashboardSnapshot {
    pub fn new(params: DashboardParams) -> Self {
        Self {
            params,
            state: RefreshState::Idle,
            loading: false,
            rows: Vec::new(),
            cycle: 0,
            displayed_cycle: 0,
            last_updated: None,
            last_error: None,
        }
    }
}
