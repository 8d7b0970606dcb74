use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use jobs_core::{FetchError, JobId, JobList, JobSource, JobsClient, ListState};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Serves `router` on an ephemeral local port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Page `n` holds ids `n*100 + 1 ..= n*100 + per_page`; pages past `last` are empty.
fn paged_upstream(per_page: i64, last: i64) -> Router {
    Router::new().route(
        "/common/jobs",
        get(move |Query(params): Query<HashMap<String, String>>| async move {
            let page: i64 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
            let results: Vec<Value> = if page >= 1 && page <= last {
                (1..=per_page)
                    .map(|i| json!({ "id": page * 100 + i, "title": format!("Job {page}-{i}") }))
                    .collect()
            } else {
                Vec::new()
            };
            Json(json!({ "results": results }))
        }),
    )
}

#[tokio::test]
async fn test_fetch_page_normalizes_results_in_order() {
    let router = Router::new().route(
        "/common/jobs",
        get(|| async {
            Json(json!({
                "results": [
                    {
                        "id": 7,
                        "title": "Delivery Partner",
                        "company_name": "QuickShip",
                        "primary_details": { "Place": "Bengaluru", "Salary": "₹18000 - ₹25000" },
                        "whatsapp_no": "9000000000"
                    },
                    { "id": "abc", "custom_link": "tel:+911112223334" }
                ]
            }))
        }),
    );
    let client = JobsClient::new(serve(router).await);

    let jobs = client.fetch_page(1).await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, JobId::Number(7));
    assert_eq!(jobs[0].location, "Bengaluru");
    assert_eq!(jobs[0].salary, "₹18000 - ₹25000");
    assert_eq!(jobs[1].id, JobId::from("abc"));
    assert_eq!(jobs[1].phone, "+911112223334");
    assert_eq!(jobs[1].company, "Company Not Listed");
}

#[tokio::test]
async fn test_fetch_page_sends_page_number() {
    let client = JobsClient::new(serve(paged_upstream(2, 5)).await);

    let jobs = client.fetch_page(3).await.unwrap();

    assert_eq!(jobs[0].id, JobId::Number(301));
}

#[tokio::test]
async fn test_missing_results_degrades_to_empty_page() {
    let router = Router::new().route("/common/jobs", get(|| async { Json(json!({ "message": "ok" })) }));
    let client = JobsClient::new(serve(router).await);

    assert!(client.fetch_page(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_json_body_degrades_to_empty_page() {
    let router = Router::new().route("/common/jobs", get(|| async { "<html>maintenance</html>" }));
    let client = JobsClient::new(serve(router).await);

    assert!(client.fetch_page(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_a_fetch_error() {
    let router = Router::new().route(
        "/common/jobs",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let client = JobsClient::new(serve(router).await);

    let err = client.fetch_page(4).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { page: 4, status: 500 }));
    assert_eq!(err.page(), 4);
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = JobsClient::new(format!("http://{addr}"));

    let err = client.fetch_page(1).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { page: 1, .. }));
}

#[tokio::test]
async fn test_truncated_body_is_a_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promise more body than gets sent, then hang up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 500\r\n\r\n{\"results\":[")
            .await
            .unwrap();
    });
    let client = JobsClient::new(format!("http://{addr}"));

    let err = client.fetch_page(2).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { page: 2, .. }));
}

#[tokio::test]
async fn test_job_list_pages_until_short_page() {
    let client = JobsClient::new(serve(paged_upstream(10, 2)).await);
    let list = JobList::new(client);

    list.load_first_page().await;
    list.load_more().await;
    list.load_more().await;

    assert_eq!(list.len(), 20);
    assert_eq!(list.state(), ListState::Exhausted);
    assert!(!list.has_more());
}
