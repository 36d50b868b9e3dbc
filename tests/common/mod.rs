#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use pair_dashboard::api::query::GraphQlRequest;
use pair_dashboard::api::{SubgraphClient, SubgraphTransport};
use pair_dashboard::config::DashboardConfig;
use pair_dashboard::dashboard::params::DashboardParams;
use pair_dashboard::dashboard::Dashboard;
use pair_dashboard::error::{Error, Result};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const HOUR: i64 = 3600;

pub fn address(n: u64) -> String {
    format!("0x{:040x}", n)
}

pub fn token_json(id: &str, symbol: &str) -> Value {
    json!({
        "id": id,
        "symbol": symbol,
        "name": format!("{} Token", symbol),
        "decimals": "18",
        "totalSupply": "1000000000000000000000000",
        "tradeVolume": "1520.25",
        "tradeVolumeUSD": "30211.98",
        "untrackedVolumeUSD": "30500",
        "txCount": "42",
        "totalLiquidity": "88.5",
        "derivedETH": "0.00031"
    })
}

pub fn pair_json(pair: &str, created_at: i64, block: u64) -> Value {
    json!({
        "id": pair,
        "token0": token_json(&address(0xd0), "DAI"),
        "token1": token_json(&address(0xe0), "WETH"),
        "createdAtTimestamp": created_at.to_string(),
        "createdAtBlockNumber": block.to_string()
    })
}

pub fn day_json(pair: &str, usd: f64, token0: f64, token1: f64, date: i64) -> Value {
    json!({
        "id": format!("{}-{}", pair, date / 86400),
        "pairAddress": pair,
        "token0": token_json(&address(0xd0), "DAI"),
        "token1": token_json(&address(0xe0), "WETH"),
        "dailyVolumeToken0": token0.to_string(),
        "dailyVolumeToken1": token1.to_string(),
        "dailyVolumeUSD": usd.to_string(),
        "date": date
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Pairs,
    PairDayDatas,
}

struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// In-memory subgraph applying the same filters, ordering and truncation as
/// the real service. Requests can be held back per `first` value to force
/// overlapping cycles to complete out of order.
pub struct FakeSubgraph {
    pairs: Vec<Value>,
    day_datas: Vec<Value>,
    fail: Mutex<Option<FailAt>>,
    gates: Mutex<HashMap<u64, Gate>>,
    requests: Mutex<Vec<GraphQlRequest>>,
}

pub struct GateHandle {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl FakeSubgraph {
    pub fn new(pairs: Vec<Value>, day_datas: Vec<Value>) -> Self {
        Self {
            pairs,
            day_datas,
            fail: Mutex::new(None),
            gates: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Five recent pairs, one stale pair, and day records that exercise the
    /// pair filter, the volume floor and the ordering.
    pub fn populated() -> Self {
        let now = Utc::now().timestamp();
        let pairs = vec![
            pair_json(&address(1), now - 2 * HOUR, 18_000_005),
            pair_json(&address(2), now - 10 * HOUR, 18_000_004),
            pair_json(&address(3), now - 20 * HOUR, 18_000_003),
            pair_json(&address(4), now - 30 * HOUR, 18_000_002),
            pair_json(&address(5), now - 50 * HOUR, 18_000_002),
            pair_json(&address(6), now - 100 * HOUR, 17_999_000),
        ];
        let today = now - HOUR;
        let day_datas = vec![
            day_json(&address(1), 15_000.0, 15_000.0, 6.0, today),
            day_json(&address(2), 250_000.5, 100.0, 90.0, today),
            day_json(&address(3), 999.0, 999.0, 0.4, today),
            day_json(&address(4), 42_000.0, 3.0, 17.0, today),
            day_json(&address(5), 1_000.0, 1_000.0, 0.5, today),
            day_json(&address(5), 7_500.0, 7_500.0, 3.0, now - 30 * HOUR),
            day_json(&address(6), 900_000.0, 1.0, 1.0, today),
            day_json(&address(99), 80_000.0, 1.0, 1.0, today),
        ];
        Self::new(pairs, day_datas)
    }

    pub fn fail_at(&self, stage: Option<FailAt>) {
        *self.fail.lock().unwrap() = stage;
    }

    /// Holds any request whose `first` equals `first` until released.
    pub fn gate(&self, first: u64) -> GateHandle {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(
            first,
            Gate {
                entered: entered.clone(),
                release: release.clone(),
            },
        );
        GateHandle { entered, release }
    }

    pub fn requests(&self) -> Vec<GraphQlRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.operation_name == operation)
            .count()
    }

    fn respond(&self, request: &GraphQlRequest) -> Result<Value> {
        let fail = *self.fail.lock().unwrap();
        let filter = &request.variables["where"];
        let first = request.first().unwrap_or(100) as usize;
        let descending = request.variables["orderDirection"] == "desc";

        match request.operation_name {
            "Pairs" => {
                if fail == Some(FailAt::Pairs) {
                    return Err(Error::NetworkError("connection refused".to_string()));
                }
                let created_gt = as_f64(&filter["createdAtTimestamp_gt"]);
                let block = filter.get("createdAtBlockNumber").map(as_f64);
                let mut pairs: Vec<Value> = self
                    .pairs
                    .iter()
                    .filter(|p| as_f64(&p["createdAtTimestamp"]) > created_gt)
                    .filter(|p| block.map_or(true, |b| as_f64(&p["createdAtBlockNumber"]) == b))
                    .cloned()
                    .collect();
                sort_by_field(&mut pairs, "createdAtTimestamp", descending);
                pairs.truncate(first);
                Ok(json!({ "data": { "pairs": pairs } }))
            }
            "PairDayDatas" => {
                if fail == Some(FailAt::PairDayDatas) {
                    return Err(Error::ApiError("indexing error".to_string()));
                }
                let allowed: Vec<&str> = filter["pairAddress_in"]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let date_gt = as_f64(&filter["date_gt"]);
                let usd_gt = as_f64(&filter["dailyVolumeUSD_gt"]);
                let order_by = request.variables["orderBy"].as_str().unwrap_or("dailyVolumeUSD");
                let mut records: Vec<Value> = self
                    .day_datas
                    .iter()
                    .filter(|d| allowed.contains(&d["pairAddress"].as_str().unwrap_or_default()))
                    .filter(|d| as_f64(&d["date"]) > date_gt)
                    .filter(|d| as_f64(&d["dailyVolumeUSD"]) > usd_gt)
                    .cloned()
                    .collect();
                sort_by_field(&mut records, order_by, descending);
                records.truncate(first);
                Ok(json!({ "data": { "pairDayDatas": records } }))
            }
            other => Ok(json!({ "errors": [{ "message": format!("unknown operation {}", other) }] })),
        }
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap_or(f64::NAN),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn sort_by_field(items: &mut [Value], field: &str, descending: bool) {
    items.sort_by(|a, b| {
        let ordering = as_f64(&a[field])
            .partial_cmp(&as_f64(&b[field]))
            .unwrap_or(Ordering::Equal);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

#[async_trait]
impl SubgraphTransport for FakeSubgraph {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = request.first().and_then(|first| {
            self.gates
                .lock()
                .unwrap()
                .get(&first)
                .map(|g| (g.entered.clone(), g.release.clone()))
        });
        if let Some((entered, release)) = gate {
            if request.operation_name == "Pairs" {
                entered.notify_one();
                release.notified().await;
            }
        }

        self.respond(&request)
    }
}

pub fn dashboard_with(fake: Arc<FakeSubgraph>) -> Dashboard {
    let config = DashboardConfig::default();
    let params = DashboardParams::from_config(&config, Utc::now());
    Dashboard::new(SubgraphClient::new(fake), params, &config)
}

pub fn default_params() -> DashboardParams {
    DashboardParams::from_config(&DashboardConfig::default(), Utc::now())
}
