//! Search lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HttpTransport` and
//! `SearchController` over real HTTP. Validates that request building,
//! response parsing, error mapping and cancellation work end-to-end.

use std::{sync::Arc, time::Duration};

use axum::{http::StatusCode, routing::get, Router};
use news_core::{
    http_transport, CancellationToken, ClientSettings, HttpTransport, SearchController,
    SearchMethod, SearchOutcome, SearchQuery, SearchTransport, Settlement, TransportError,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    format!("http://{addr}")
}

async fn mock_backend() -> String {
    serve(mock_server::app()).await
}

fn transport(base_url: &str, method: SearchMethod) -> HttpTransport {
    HttpTransport::new(&ClientSettings {
        api_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        method,
    })
    .unwrap()
}

#[tokio::test]
async fn get_and_post_return_the_same_page() {
    let base = mock_backend().await;
    let query = SearchQuery::new("apple").with_page_size(2).with_city("London");
    let cancel = CancellationToken::new();

    let via_get = transport(&base, SearchMethod::Get)
        .execute(&query, &cancel)
        .await
        .unwrap();
    let via_post = transport(&base, SearchMethod::Post)
        .execute(&query, &cancel)
        .await
        .unwrap();

    assert_eq!(via_get.total_results, 3);
    assert_eq!(via_get.total_pages, 2);
    assert_eq!(via_get.next_page, Some(2));
    assert_eq!(via_get.city.as_deref(), Some("London"));
    assert_eq!(via_get.articles, via_post.articles);
    // second identical lookup hits the backend cache
    assert!(via_post.from_cache);
}

#[tokio::test]
async fn server_validation_message_is_surfaced() {
    let base = mock_backend().await;
    // Bypasses local validation to reach the backend's own check.
    let query = SearchQuery::new("   ");

    let err = transport(&base, SearchMethod::Get)
        .execute(&query, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::ServerError {
            message: "Search keyword is required".to_string(),
            status: 400,
        }
    );
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_status() {
    let router = Router::new().route(
        "/api/v1/news/search",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
    );
    let base = serve(router).await;
    let controller = SearchController::new(Arc::new(transport(&base, SearchMethod::Get)));

    let ticket = controller.submit(SearchQuery::new("apple")).unwrap();
    assert_eq!(ticket.settled().await, Settlement::Applied);

    let outcome = controller.outcome();
    let message = outcome.error_message().unwrap();
    assert!(message.contains("502"), "message was {message:?}");
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = http_transport(&format!("http://{addr}"), Duration::from_secs(2))
        .unwrap()
        .execute(&SearchQuery::new("apple"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::NetworkError(_)), "{err:?}");
}

#[tokio::test]
async fn slow_backend_times_out_as_network_error() {
    let router = Router::new().route(
        "/api/v1/news/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let base = serve(router).await;

    let err = http_transport(&base, Duration::from_millis(100))
        .unwrap()
        .execute(&SearchQuery::new("apple"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        TransportError::NetworkError(detail) => {
            assert!(detail.contains("timed out"), "detail was {detail:?}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_is_cancelled_cooperatively() {
    let router = Router::new().route(
        "/api/v1/news/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "{}"
        }),
    );
    let base = serve(router).await;
    let transport = transport(&base, SearchMethod::Get);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = transport
        .execute(&SearchQuery::new("apple"), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::Cancelled);
}

#[tokio::test]
async fn end_to_end_search_then_paginate() {
    let base = mock_backend().await;
    let controller = SearchController::new(Arc::new(transport(&base, SearchMethod::Get)));
    let mut transitions = controller.transitions();
    assert_eq!(controller.outcome(), SearchOutcome::Idle);

    let ticket = controller
        .submit(SearchQuery::new("apple").with_page_size(10))
        .unwrap();
    assert_eq!(ticket.settled().await, Settlement::Applied);

    assert!(transitions.recv().await.unwrap().is_loading());
    let done = transitions.recv().await.unwrap();
    let result = done.result().unwrap();
    assert_eq!(result.total_results, 3);
    assert_eq!(result.articles.len(), 3);
    assert_eq!(result.articles[0].id, "guardian-1");

    let ticket = controller
        .submit(SearchQuery::new("apple").with_page_size(1))
        .unwrap();
    ticket.settled().await;
    let ticket = controller.go_to_page(2).unwrap();
    assert_eq!(ticket.settled().await, Settlement::Applied);

    let outcome = controller.outcome();
    let page = outcome.result().unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.previous_page, Some(1));
    assert_eq!(page.articles[0].id, "nyt-1");
}

#[tokio::test]
async fn rapid_resubmits_only_apply_the_last() {
    let base = mock_backend().await;
    let controller = SearchController::new(Arc::new(transport(&base, SearchMethod::Get)));

    let first = controller.submit(SearchQuery::new("apple")).unwrap();
    let second = controller.submit(SearchQuery::new("climate")).unwrap();
    let third = controller.submit(SearchQuery::new("bike")).unwrap();

    assert_ne!(first.settled().await, Settlement::Applied);
    assert_ne!(second.settled().await, Settlement::Applied);
    assert_eq!(third.settled().await, Settlement::Applied);

    let outcome = controller.outcome();
    assert_eq!(outcome.query().unwrap().keyword, "bike");
    assert_eq!(outcome.result().unwrap().articles[0].id, "nyt-2");
}

#[tokio::test]
async fn health_probe_reports_up() {
    let base = mock_backend().await;
    let health = transport(&base, SearchMethod::Get).health().await.unwrap();
    assert_eq!(health["status"], "UP");
}
