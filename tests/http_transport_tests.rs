mod common;

use common::{address, day_json, pair_json, HOUR};
use pair_dashboard::api::{HttpTransport, PairDayQuery, PairQuery, SubgraphClient};
use pair_dashboard::config::ApiConfig;
use pair_dashboard::error::Error;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;

type Received = Arc<Mutex<Vec<Value>>>;

/// Starts a local server standing in for the subgraph. `reply` maps the
/// posted JSON body to a status code and a raw response body.
async fn spawn_subgraph<F>(reply: F) -> (SocketAddr, Received)
where
    F: Fn(&Value) -> (StatusCode, String) + Clone + Send + Sync + 'static,
{
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();
    let route = warp::post()
        .and(warp::path::end())
        .and(warp::body::json())
        .map(move |body: Value| {
            log.lock().unwrap().push(body.clone());
            let (status, text) = reply(&body);
            warp::reply::with_status(
                warp::reply::with_header(text, "content-type", "application/json"),
                status,
            )
        });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, received)
}

fn client_for(addr: SocketAddr, timeout_secs: u64) -> SubgraphClient {
    let config = ApiConfig {
        endpoint: format!("http://{}/", addr),
        timeout_secs,
    };
    SubgraphClient::new(Arc::new(HttpTransport::new(&config).unwrap()))
}

#[tokio::test]
async fn test_pairs_round_trip_over_http() {
    let now = chrono::Utc::now().timestamp();
    let (addr, received) = spawn_subgraph(move |_| {
        let body = json!({ "data": { "pairs": [
            pair_json(&address(1), now - HOUR, 18_000_001),
            pair_json(&address(2), now - 2 * HOUR, 18_000_000),
        ] } });
        (StatusCode::OK, body.to_string())
    })
    .await;

    let pairs = client_for(addr, 5).list_pairs(&PairQuery::default()).await.unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].id, address(1));
    assert_eq!(pairs[0].token1.symbol, "WETH");
    assert_eq!(pairs[1].created_at_block_number, 18_000_000);

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["operationName"], "Pairs");
    assert_eq!(bodies[0]["variables"]["first"], 1000);
    assert!(bodies[0]["query"].as_str().unwrap().contains("derivedETH"));
}

#[tokio::test]
async fn test_day_datas_round_trip_over_http() {
    let now = chrono::Utc::now().timestamp();
    let (addr, received) = spawn_subgraph(move |_| {
        let body = json!({ "data": { "pairDayDatas": [
            day_json(&address(1), 5_000.0, 10.0, 2.0, now - HOUR),
        ] } });
        (StatusCode::OK, body.to_string())
    })
    .await;

    let query = PairDayQuery {
        pair_addresses: vec![address(1)],
        ..PairDayQuery::default()
    };
    let records = client_for(addr, 5).fetch_pair_day_datas(&query).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].daily_volume_usd, 5_000.0);

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies[0]["variables"]["where"]["pairAddress_in"], json!([address(1)]));
    assert_eq!(bodies[0]["variables"]["where"]["dailyVolumeUSD_gt"], "1000");
}

#[tokio::test]
async fn test_server_error_status_is_api_error() {
    let (addr, _) =
        spawn_subgraph(|_| (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"boom\"}".to_string())).await;
    let result = client_for(addr, 5).list_pairs(&PairQuery::default()).await;
    assert!(matches!(result, Err(Error::ApiError(msg)) if msg.contains("500")));
}

#[tokio::test]
async fn test_graphql_error_payload_is_api_error() {
    let (addr, _) = spawn_subgraph(|_| {
        (
            StatusCode::OK,
            json!({ "errors": [{ "message": "Failed to decode `BigInt` value" }] }).to_string(),
        )
    })
    .await;
    let result = client_for(addr, 5).list_pairs(&PairQuery::default()).await;
    assert!(matches!(result, Err(Error::ApiError(msg)) if msg.contains("BigInt")));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_format() {
    let (addr, _) = spawn_subgraph(|_| (StatusCode::OK, "<html>gateway</html>".to_string())).await;
    let result = client_for(addr, 5).list_pairs(&PairQuery::default()).await;
    assert!(matches!(result, Err(Error::ApiInvalidFormat(_))));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client_for(addr, 5).list_pairs(&PairQuery::default()).await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::NetworkError(_)));
    assert!(err.is_fetch_failure());
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let route = warp::post().and(warp::body::json()).and_then(|_body: Value| async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Ok::<_, warp::Rejection>(warp::reply::json(&json!({ "data": { "pairs": [] } })))
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let result = client_for(addr, 1).list_pairs(&PairQuery::default()).await;
    assert!(matches!(result, Err(Error::NetworkError(_))));
}
