use crate::api::types::PairDayData;
use crate::api::{PairDayQuery, PairQuery, SubgraphClient};
use crate::config::DashboardConfig;
use crate::dashboard::params::{DashboardParams, PairOrderBy};
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod params;
pub mod state;

pub use params::{OrderDirection, PairDayOrderBy};
pub use state::{CycleOutcome, DashboardSnapshot, RefreshState};

/// Owns the parameters and the displayed result set, and runs the
/// list-then-fetch refresh cycle.
///
/// Cycles may overlap. Each one is numbered when it starts and only the most
/// recently started cycle is allowed to publish rows or flip the loading flag;
/// a slower, older cycle finishing later is dropped.
#[derive(Clone)]
pub struct Dashboard {
    client: SubgraphClient,
    activity_window_secs: i64,
    state: Arc<RwLock<DashboardSnapshot>>,
}

impl Dashboard {
    pub fn new(client: SubgraphClient, params: DashboardParams, config: &DashboardConfig) -> Self {
        Self {
            client,
            activity_window_secs: i64::from(config.activity_window_hours) * 3600,
            state: Arc::new(RwLock::new(DashboardSnapshot::new(params))),
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.clone()
    }

    pub async fn params(&self) -> DashboardParams {
        self.state.read().await.params.clone()
    }

    /// Replaces the parameters and runs a full cycle with them. Invalid
    /// parameters are rejected without starting a cycle.
    pub async fn apply_params(&self, params: DashboardParams) -> Result<CycleOutcome> {
        params.validate()?;
        let cycle = self.begin_cycle(params.clone()).await;
        let result = self.run_cycle(&params, Utc::now()).await;
        Ok(self.finish_cycle(cycle, result).await)
    }

    /// Re-runs the cycle with the current parameters.
    pub async fn refresh(&self) -> Result<CycleOutcome> {
        let params = self.params().await;
        self.apply_params(params).await
    }

    async fn begin_cycle(&self, params: DashboardParams) -> u64 {
        let mut state = self.state.write().await;
        state.cycle += 1;
        state.params = params;
        state.state = RefreshState::Loading;
        state.loading = true;
        info!("Refresh cycle {} started", state.cycle);
        state.cycle
    }

    async fn run_cycle(&self, params: &DashboardParams, now: DateTime<Utc>) -> Result<Vec<PairDayData>> {
        let pairs = self
            .client
            .list_pairs(&PairQuery {
                first: params.first,
                order_by: PairOrderBy::CreatedAtTimestamp,
                order_direction: params.order_direction,
                created_at_timestamp_gt: params.created_after,
                created_at_block_number: params.created_at_block_number,
            })
            .await?;

        self.client
            .fetch_pair_day_datas(&PairDayQuery {
                first: params.first,
                order_by: params.order_by,
                order_direction: params.order_direction,
                date_gt: now.timestamp() - self.activity_window_secs,
                pair_addresses: pairs.into_iter().map(|pair| pair.id).collect(),
                daily_volume_usd_gt: params.min_daily_volume_usd,
            })
            .await
    }

    async fn finish_cycle(&self, cycle: u64, result: Result<Vec<PairDayData>>) -> CycleOutcome {
        let mut state = self.state.write().await;
        if state.cycle != cycle {
            warn!(
                "Discarding result of refresh cycle {}, cycle {} is newer",
                cycle, state.cycle
            );
            return CycleOutcome::Stale {
                cycle,
                latest: state.cycle,
            };
        }

        state.loading = false;
        match result {
            Ok(rows) => {
                let count = rows.len();
                state.rows = rows;
                state.state = RefreshState::Loaded;
                state.displayed_cycle = cycle;
                state.last_updated = Some(Utc::now());
                state.last_error = None;
                info!("Refresh cycle {} loaded {} rows", cycle, count);
                CycleOutcome::Published { cycle, rows: count }
            }
            Err(e) => {
                // Previously displayed rows stay in place.
                let message = format!("Fetch failed: {}", e);
                error!("Refresh cycle {} failed: {}", cycle, e);
                state.state = RefreshState::Failed;
                state.last_error = Some(message.clone());
                CycleOutcome::Failed { cycle, message }
            }
        }
    }
}
