use crate::api::query;
use crate::api::types::{Pair, PairsData};
use crate::api::SubgraphClient;
use crate::dashboard::params::{OrderDirection, PairOrderBy};
use crate::error::Result;
use crate::validation;
use chrono::Utc;
use log::info;

/// Filter and ordering for the most recently created pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct PairQuery {
    pub first: u32,
    pub order_by: PairOrderBy,
    pub order_direction: OrderDirection,
    pub created_at_timestamp_gt: i64,
    pub created_at_block_number: Option<u64>,
}

impl Default for PairQuery {
    fn default() -> Self {
        Self {
            first: 1000,
            order_by: PairOrderBy::CreatedAtTimestamp,
            order_direction: OrderDirection::Desc,
            created_at_timestamp_gt: Utc::now().timestamp() - 72 * 3600,
            created_at_block_number: None,
        }
    }
}

impl SubgraphClient {
    /// Lists pairs created after the cutoff (and in the given block, if any).
    /// One request, no retry; an empty list is a normal result.
    pub async fn list_pairs(&self, params: &PairQuery) -> Result<Vec<Pair>> {
        validation::validate_first(params.first)?;
        validation::validate_timestamp(params.created_at_timestamp_gt)?;

        let request = query::pairs_request(
            params.first,
            params.order_by,
            params.order_direction,
            params.created_at_timestamp_gt,
            params.created_at_block_number,
        );
        let data: PairsData = self.query(request).await?;

        let mut pairs = data.pairs;
        pairs.truncate(params.first as usize);
        info!(
            "Listed {} pairs created after {}{}",
            pairs.len(),
            params.created_at_timestamp_gt,
            params
                .created_at_block_number
                .map(|block| format!(" in block {}", block))
                .unwrap_or_default()
        );
        Ok(pairs)
    }
}
