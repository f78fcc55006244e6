//! Integration tests for the REST client against an in-process HTTP server.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use trimtool_lib::model::{
    AliasQuery, Assignment, AssignmentMethod, NewAlias, NewTrim, ProcessedQuery, TrimQuery, UnprocessedQuery,
};
use trimtool_lib::{ApiError, TrimtoolClient};

// =============================================================================
// Mock server
// =============================================================================

#[derive(Clone)]
struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: &'static str,
    delay: Option<Duration>,
}

fn route(method: &'static str, path: &'static str, status: u16, body: &'static str) -> Route {
    Route {
        method,
        path,
        status,
        body,
        delay: None,
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    uri: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn handle(req: Request<Incoming>, routes: Arc<Vec<Route>>, log: Log) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let path = req.uri().path().to_string();
    let body = req
        .into_body()
        .collect()
        .await
        .map(|c| String::from_utf8_lossy(&c.to_bytes()).into_owned())
        .unwrap_or_default();

    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        uri,
        body,
    });

    let matched = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .cloned();

    let (status, body, delay) = match matched {
        Some(r) => (r.status, r.body, r.delay),
        None => (404, r#"{"detail":"Not Found"}"#, None),
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}

async fn serve(routes: Vec<Route>) -> (TrimtoolClient, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = Arc::clone(&log);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let routes = Arc::clone(&routes);
            let log = Arc::clone(&server_log);
            tokio::spawn(async move {
                let service = service_fn(move |req| handle(req, Arc::clone(&routes), Arc::clone(&log)));
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    let client = TrimtoolClient::builder()
        .url(format!("http://{}/", addr))
        .build()
        .unwrap();
    (client, log)
}

fn requests(log: &Log) -> Vec<Recorded> {
    log.lock().unwrap().clone()
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_stats() {
    let (client, _) = serve(vec![route(
        "GET",
        "/stats",
        200,
        r#"{"total": 1200, "processed": 900, "needs_review": 42}"#,
    )])
    .await;

    let stats = client.stats(&CancellationToken::new()).await.unwrap();
    assert_eq!(stats.total, 1200);
    assert_eq!(stats.processed, 900);
    assert_eq!(stats.needs_review, 42);
}

#[tokio::test]
async fn test_trims_query_string() {
    let (client, log) = serve(vec![route(
        "GET",
        "/trims",
        200,
        r#"[{"id": 1, "make": "Toyota", "model": "Camry", "trim_name": "SE", "year_start": 2018, "year_end": null}]"#,
    )])
    .await;

    let query = TrimQuery::from_search("Toyota Camry").with_limit(100);
    let trims = client.trims(&query, &CancellationToken::new()).await.unwrap();

    assert_eq!(trims.len(), 1);
    assert_eq!(trims[0].trim_name, "SE");
    assert_eq!(trims[0].year_end, None);

    let recorded = requests(&log);
    assert_eq!(recorded[0].uri, "/trims?make=Toyota&model=Camry&limit=100");
}

#[tokio::test]
async fn test_processed_listings_filters() {
    let (client, log) = serve(vec![route(
        "GET",
        "/listings/processed",
        200,
        r#"[{"ad_id": 77, "brand": "Kia", "model": "Rio", "trim": "lx", "normalized_trim": "LX",
            "confidence": 0.93, "method": "fuzzy", "needs_review": true, "processed_at": "2024-05-01T10:00:00"}]"#,
    )])
    .await;

    let mut query = ProcessedQuery::default();
    query.model = "Rio".into();
    query.method = AssignmentMethod::Fuzzy;
    query.set_max_conf(0.95);

    let listings = client
        .processed_listings(&query, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(listings[0].ad_id, "77");
    assert!(listings[0].needs_review);
    assert_eq!(listings[0].confidence_percent(), "93%");
    assert_eq!(
        requests(&log)[0].uri,
        "/listings/processed?model=Rio&assignment_method=fuzzy&min_conf=0&max_conf=0.95&limit=50"
    );
}

#[tokio::test]
async fn test_unprocessed_and_candidates() {
    let (client, log) = serve(vec![
        route(
            "GET",
            "/listings/unprocessed",
            200,
            r#"[{"ad_id": "x1", "brand": "Honda", "model": "Civic", "year": 2019, "trim": "ex-l"}]"#,
        ),
        route(
            "GET",
            "/listings/x1/candidates",
            200,
            r#"{"candidates": [{"trim": "EX-L", "score": 0.875}]}"#,
        ),
    ])
    .await;

    let cancel = CancellationToken::new();
    let listings = client
        .unprocessed_listings(&UnprocessedQuery::default(), &cancel)
        .await
        .unwrap();
    assert_eq!(listings[0].raw_trim(), "ex-l");

    let list = client.listing_candidates("x1", None, &cancel).await.unwrap();
    assert_eq!(list.candidates[0].score_percent(), "87.5%");

    let recorded = requests(&log);
    assert_eq!(recorded[0].uri, "/listings/unprocessed?limit=50");
    assert_eq!(recorded[1].uri, "/listings/x1/candidates?top_n=10");
}

#[tokio::test]
async fn test_listing_details() {
    let (client, _) = serve(vec![route(
        "GET",
        "/listings/9/details",
        200,
        r#"{"listing": {"ad_id": 9, "price": null}, "details": {}}"#,
    )])
    .await;

    let details = client
        .listing_details("9", &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(details.listing.len(), 2);
    assert!(details.details.unwrap().is_empty());
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_assign_trim_body() {
    let (client, log) = serve(vec![route(
        "POST",
        "/listings/abc/assign-trim",
        200,
        r#"{"status": "ok"}"#,
    )])
    .await;

    client
        .assign_trim("abc", &Assignment::TrimMasterId(5), &CancellationToken::new())
        .await
        .unwrap();

    let recorded = requests(&log);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].body, r#"{"trim_master_id":5}"#);
}

#[tokio::test]
async fn test_process_listings_defaults_zero_limit() {
    let (client, log) = serve(vec![route(
        "POST",
        "/process-listings",
        200,
        r#"{"processed": 10, "exact_matches": 6, "fuzzy_matches": 2, "unmatched": 1, "llm_matches": 1}"#,
    )])
    .await;

    let summary = client
        .process_listings(0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        summary.to_string(),
        "Processed: 10, Exact: 6, Fuzzy: 2, Unmatched: 1, LLM: 1"
    );
    assert_eq!(requests(&log)[0].body, r#"{"limit":500}"#);
}

#[tokio::test]
async fn test_create_and_delete_alias() {
    let (client, log) = serve(vec![
        route(
            "POST",
            "/aliases",
            200,
            r#"{"id": 3, "trim_master_id": 8, "alias": "sport tech"}"#,
        ),
        route("DELETE", "/aliases/3", 204, ""),
        route("GET", "/aliases", 200, "[]"),
    ])
    .await;

    let cancel = CancellationToken::new();
    let created = client
        .create_alias(&NewAlias::new(8, "  Sport Tech "), &cancel)
        .await
        .unwrap();
    assert_eq!(created.id, 3);

    client.delete_alias(3, &cancel).await.unwrap();
    let remaining = client.aliases(&AliasQuery::default(), &cancel).await.unwrap();
    assert!(remaining.is_empty());

    let recorded = requests(&log);
    assert_eq!(recorded[0].body, r#"{"trim_master_id":8,"alias":"sport tech"}"#);
    assert_eq!(recorded[1].method, "DELETE");
    assert_eq!(recorded[2].uri, "/aliases");
}

#[tokio::test]
async fn test_create_trim_returns_record() {
    let (client, log) = serve(vec![route(
        "POST",
        "/trims",
        201,
        r#"{"id": 12, "make": "Kia", "model": "Sorento", "trim_name": "SX", "year_start": 2021}"#,
    )])
    .await;

    let new_trim = NewTrim {
        make: "Kia".into(),
        model: "Sorento".into(),
        trim_name: "SX".into(),
        year_start: Some(2021),
        year_end: None,
    };
    let created = client
        .create_trim(&new_trim, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(created.id, 12);
    assert_eq!(created.trim_name, "SX");
    assert_eq!(created.year_end, None);
    assert_eq!(requests(&log)[0].uri, "/trims");
}

#[tokio::test]
async fn test_create_with_empty_reply_is_parse_error() {
    let (client, _) = serve(vec![route("POST", "/aliases", 204, "")]).await;
    let err = client
        .create_alias(&NewAlias::new(8, "sx"), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Parse { .. }));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_error_detail_surfaces() {
    let (client, _) = serve(vec![route(
        "POST",
        "/listings/1/reprocess",
        409,
        r#"{"detail": "Listing is locked"}"#,
    )])
    .await;

    let err = client
        .reprocess_listing("1", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(409));
    assert_eq!(err.to_string(), "Listing is locked");
}

#[tokio::test]
async fn test_error_without_detail_uses_status_line() {
    let (client, _) = serve(vec![route("GET", "/stats", 503, "{}")]).await;

    let err = client.stats(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503 - Service Unavailable");
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let (client, _) = serve(vec![route("GET", "/stats", 200, "not json")]).await;

    let err = client.stats(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Parse { body: Some(ref b), .. } if b == "not json"));
}

#[tokio::test]
async fn test_cancelled_call_resolves_to_cancelled() {
    let mut slow = route("GET", "/stats", 200, r#"{"total": 1}"#);
    slow.delay = Some(Duration::from_secs(10));
    let (client, _) = serve(vec![slow]).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client.stats(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_precancelled_token_never_sends() {
    let (client, log) = serve(vec![route("GET", "/stats", 200, "{}")]).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.stats(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(requests(&log).is_empty());
}
