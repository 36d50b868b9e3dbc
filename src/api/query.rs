//! GraphQL documents for the Uniswap V2 subgraph.
//!
//! Values never get spliced into the document text. Every argument travels in
//! the `variables` object, and `where` filters are built as typed JSON.

use crate::dashboard::params::{OrderDirection, PairDayOrderBy, PairOrderBy};
use serde::Serialize;
use serde_json::{json, Map, Value};

macro_rules! token_fields {
    () => {
        "id
          symbol
          name
          decimals
          totalSupply
          tradeVolume
          tradeVolumeUSD
          untrackedVolumeUSD
          txCount
          totalLiquidity
          derivedETH"
    };
}

pub const PAIRS_QUERY: &str = concat!(
    "query Pairs($first: Int!, $orderBy: Pair_orderBy!, $orderDirection: OrderDirection!, $where: Pair_filter!) {
      pairs(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
        id
        token0 {
          ",
    token_fields!(),
    "
        }
        token1 {
          ",
    token_fields!(),
    "
        }
        createdAtTimestamp
        createdAtBlockNumber
      }
    }"
);

pub const PAIR_DAY_DATAS_QUERY: &str = concat!(
    "query PairDayDatas($first: Int!, $orderBy: PairDayData_orderBy!, $orderDirection: OrderDirection!, $where: PairDayData_filter!) {
      pairDayDatas(first: $first, orderBy: $orderBy, orderDirection: $orderDirection, where: $where) {
        token0 {
          ",
    token_fields!(),
    "
        }
        token1 {
          ",
    token_fields!(),
    "
        }
        dailyVolumeUSD
        id
        pairAddress
        dailyVolumeToken0
        dailyVolumeToken1
        date
      }
    }"
);

/// Body of a GraphQL POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn first(&self) -> Option<u64> {
        self.variables.get("first").and_then(Value::as_u64)
    }
}

/// Builds the pair listing request. BigInt filters are sent as decimal strings.
pub fn pairs_request(
    first: u32,
    order_by: PairOrderBy,
    order_direction: OrderDirection,
    created_at_timestamp_gt: i64,
    created_at_block_number: Option<u64>,
) -> GraphQlRequest {
    let mut filter = Map::new();
    filter.insert(
        "createdAtTimestamp_gt".to_string(),
        Value::String(created_at_timestamp_gt.to_string()),
    );
    if let Some(block) = created_at_block_number {
        filter.insert("createdAtBlockNumber".to_string(), Value::String(block.to_string()));
    }

    GraphQlRequest {
        operation_name: "Pairs",
        query: PAIRS_QUERY,
        variables: json!({
            "first": first,
            "orderBy": order_by.as_str(),
            "orderDirection": order_direction.as_str(),
            "where": Value::Object(filter),
        }),
    }
}

/// Builds the daily activity request. `pair_addresses` must already be sanitised.
pub fn pair_day_datas_request(
    first: u32,
    order_by: PairDayOrderBy,
    order_direction: OrderDirection,
    date_gt: i64,
    pair_addresses: &[String],
    daily_volume_usd_gt: f64,
) -> GraphQlRequest {
    GraphQlRequest {
        operation_name: "PairDayDatas",
        query: PAIR_DAY_DATAS_QUERY,
        variables: json!({
            "first": first,
            "orderBy": order_by.as_str(),
            "orderDirection": order_direction.as_str(),
            "where": {
                "date_gt": date_gt,
                "pairAddress_in": pair_addresses,
                "dailyVolumeUSD_gt": daily_volume_usd_gt.to_string(),
            },
        }),
    }
}
