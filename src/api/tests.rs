use mockito::{Matcher, Server};
use serde_json::json;

use super::*;
use crate::config::{ApiConfig, NetworkConfig};
use crate::models::Category;

fn create_test_client(server: &Server) -> TmdbClient {
    let api = ApiConfig {
        base_url: server.url(),
        api_key: "test-key".to_string(),
        language: "en-US".to_string(),
        ..ApiConfig::default()
    };
    let network = NetworkConfig {
        connection_timeout: 5,
        max_retries: 2,
    };

    TmdbClient::new(&api, &network)
        .expect("client construction")
        .with_retry_policy(RetryPolicy::new(2, 1, 10))
}

fn create_page_response(page: u32, total_pages: u32) -> serde_json::Value {
    json!({
        "page": page,
        "results": [
            {
                "id": 603,
                "title": "The Matrix",
                "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                "backdrop_path": "/ncEsesgOJDNrTUED89hYbA117wo.jpg",
                "release_date": "1999-03-30",
                "vote_average": 8.2,
                "genre_ids": [28, 878],
                "overview": "Set in the 22nd century..."
            },
            {
                "id": 604,
                "title": "The Matrix Reloaded",
                "poster_path": null,
                "backdrop_path": null,
                "release_date": "",
                "vote_average": 0.0,
                "genre_ids": [28, 878],
                "overview": null
            }
        ],
        "total_pages": total_pages,
        "total_results": total_pages * 20
    })
}

#[tokio::test]
async fn category_page_parses_items_and_pagination() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/now_playing")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("language".into(), "en-US".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(create_page_response(1, 5).to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let page = client
        .category_page(Category::NowPlaying, 1)
        .await
        .expect("page 1");

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 5);
    assert!(page.has_next());
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "The Matrix");
    assert_eq!(page.items[1].rating(), None);

    mock.assert_async().await;
}

#[tokio::test]
async fn search_page_sends_encoded_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("query".into(), "바람".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(create_page_response(1, 1).to_string())
        .create_async()
        .await;

    let client = create_test_client(&server);
    let page = client.search_page("바람", 1).await.expect("search page");

    assert_eq!(page.items.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn movie_detail_parses_full_record() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/603")
        .match_query(Matcher::UrlEncoded("api_key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 603,
                "title": "The Matrix",
                "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                "backdrop_path": null,
                "release_date": "1999-03-30",
                "vote_average": 8.2,
                "overview": "Set in the 22nd century...",
                "runtime": 136,
                "tagline": "Welcome to the Real World.",
                "genres": [
                    {"id": 28, "name": "Action"},
                    {"id": 878, "name": "Science Fiction"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let detail = client.movie_detail(603).await.expect("detail");

    assert_eq!(detail.title, "The Matrix");
    assert_eq!(detail.runtime, Some(136));
    assert_eq!(detail.genres.len(), 2);
    assert_eq!(detail.release_year(), Some(1999));

    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_surfaces_typed_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let client = create_test_client(&server);
    let err = client
        .category_page(Category::Popular, 1)
        .await
        .expect_err("404 should fail");

    assert!(matches!(err, ApiError::ClientError { status: 404, .. }));
    // Permanent error: exactly one request on the wire.
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_retry_within_the_attempt_budget() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/top_rated")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream down")
        .expect(3) // 1 initial + 2 retries
        .create_async()
        .await;

    let client = create_test_client(&server);
    let err = client
        .category_page(Category::TopRated, 1)
        .await
        .expect_err("503 should fail after retries");

    assert!(err.is_transient());
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/movie/upcoming")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{not json")
        .create_async()
        .await;

    let client = create_test_client(&server);
    let err = client
        .category_page(Category::Upcoming, 1)
        .await
        .expect_err("garbage body should fail");

    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn page_zero_is_rejected_before_any_request() {
    // No mock registered: a request hitting the wire would fail differently.
    let server = Server::new_async().await;
    let client = create_test_client(&server);

    let err = client
        .category_page(Category::Popular, 0)
        .await
        .expect_err("page 0 is a caller bug");
    assert!(matches!(err, ApiError::Validation(_)));

    let err = client.search_page("dune", 0).await.expect_err("page 0");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn favorites_has_no_remote_listing() {
    let server = Server::new_async().await;
    let client = create_test_client(&server);

    let err = client
        .category_page(Category::Favorites, 1)
        .await
        .expect_err("favorites is local-only");
    assert!(matches!(err, ApiError::Validation(_)));
}
