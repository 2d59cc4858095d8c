//! Tests for request dispatch.

mod common;
use common::*;

use std::sync::Arc;

use oxide_expose::{HttpError, Method, Request};

#[tokio::test]
async fn valid_route() {
    let router = app();
    let response = router.dispatch(Request::get("/it/test_route")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body_string(), Some("Test Router".to_string()));
}

#[tokio::test]
async fn handler_sees_resolved_language() {
    let router = app();

    let response = router.dispatch(Request::get("/it/test_language")).await.unwrap();
    assert_eq!(response.body_string(), Some("it".to_string()));

    let response = router.dispatch(Request::get("/test_language")).await.unwrap();
    assert_eq!(response.body_string(), Some("en".to_string()));
}

#[tokio::test]
async fn not_found_route() {
    let router = app();
    let err = router.dispatch(Request::get("/")).await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.body, "Resource not found\n");
}

#[tokio::test]
async fn handler_abort_propagates() {
    let router = app();
    let err = router.dispatch(Request::get("/test_404")).await.unwrap_err();
    assert_eq!(err, HttpError::new(404, "Not found, dude"));
}

#[tokio::test]
async fn query_string_is_not_part_of_the_path() {
    let router = app();
    let request = Request::from_uri(Method::Get, "/test_int/7?x=1");
    let response = router.dispatch(request).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn concurrent_dispatch_keeps_requests_apart() {
    let router = Arc::new(app());

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let router = Arc::clone(&router);
            let path = if i % 2 == 0 {
                "/it/test_language"
            } else {
                "/en/test_language"
            };
            tokio::spawn(async move {
                let body = router
                    .dispatch(Request::get(path))
                    .await
                    .unwrap()
                    .body_string();
                (i, body)
            })
        })
        .collect();

    for task in tasks {
        let (i, body) = task.await.unwrap();
        let expected = if i % 2 == 0 { "it" } else { "en" };
        assert_eq!(body.as_deref(), Some(expected));
    }
}
