use crate::api::query;
use crate::api::types::{PairDayData, PairDayDatasData};
use crate::api::SubgraphClient;
use crate::dashboard::params::{OrderDirection, PairDayOrderBy};
use crate::error::Result;
use crate::validation;
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;

/// Filter and ordering for daily activity of a known set of pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDayQuery {
    pub first: u32,
    pub order_by: PairDayOrderBy,
    pub order_direction: OrderDirection,
    pub date_gt: i64,
    pub pair_addresses: Vec<String>,
    pub daily_volume_usd_gt: f64,
}

impl Default for PairDayQuery {
    fn default() -> Self {
        Self {
            first: 1000,
            order_by: PairDayOrderBy::DailyVolumeUsd,
            order_direction: OrderDirection::Desc,
            date_gt: Utc::now().timestamp() - 24 * 3600,
            pair_addresses: Vec::new(),
            daily_volume_usd_gt: 1000.0,
        }
    }
}

impl SubgraphClient {
    /// Fetches day records for `pair_addresses` only. An empty address set
    /// yields an empty result without contacting the service.
    pub async fn fetch_pair_day_datas(&self, params: &PairDayQuery) -> Result<Vec<PairDayData>> {
        if params.pair_addresses.is_empty() {
            info!("No pairs to fetch activity for, skipping day data query");
            return Ok(Vec::new());
        }

        validation::validate_first(params.first)?;
        validation::validate_timestamp(params.date_gt)?;
        validation::validate_min_volume(params.daily_volume_usd_gt)?;
        let addresses =
            validation::sanitize_addresses(params.pair_addresses.iter().map(String::as_str))?;

        let request = query::pair_day_datas_request(
            params.first,
            params.order_by,
            params.order_direction,
            params.date_gt,
            &addresses,
            params.daily_volume_usd_gt,
        );
        let data: PairDayDatasData = self.query(request).await?;

        let records = shape_pair_day_datas(data.pair_day_datas, params, &addresses);
        info!(
            "Fetched {} day records for {} pairs (volume > {})",
            records.len(),
            addresses.len(),
            params.daily_volume_usd_gt
        );
        Ok(records)
    }
}

/// Keeps only records for requested pairs above the volume floor, restores the
/// requested ordering (stable) and truncates to `first`.
pub fn shape_pair_day_datas(
    records: Vec<PairDayData>,
    params: &PairDayQuery,
    addresses: &[String],
) -> Vec<PairDayData> {
    let allowed: HashSet<&str> = addresses.iter().map(String::as_str).collect();
    let received = records.len();

    let mut records: Vec<PairDayData> = records
        .into_iter()
        .filter(|record| allowed.contains(record.pair_address.to_ascii_lowercase().as_str()))
        .filter(|record| record.daily_volume_usd > params.daily_volume_usd_gt)
        .collect();
    if records.len() != received {
        warn!(
            "Dropped {} day records outside the requested pairs or volume floor",
            received - records.len()
        );
    }

    records.sort_by(|a, b| {
        params
            .order_direction
            .apply(params.order_by.key(a).total_cmp(&params.order_by.key(b)))
    });
    records.truncate(params.first as usize);
    records
}
