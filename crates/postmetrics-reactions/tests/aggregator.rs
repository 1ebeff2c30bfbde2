//! Integration tests for the token exchange and `ReactionAggregator`.
//!
//! One wiremock server stands in for the Graph API, the bookmark count API
//! and the star API; they are told apart by path.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postmetrics_core::PostRecord;
use postmetrics_reactions::{
    AccessToken, FacebookClient, HatenaClient, ReactionAggregator, ReactionError,
};

const TOKEN: &str = "app-token";

fn aggregator(base: &str) -> ReactionAggregator {
    let facebook = FacebookClient::with_base_url(5, "postmetrics-test/0.1", base)
        .expect("failed to build FacebookClient");
    let hatena = HatenaClient::with_base_urls(5, "postmetrics-test/0.1", base, base)
        .expect("failed to build HatenaClient");
    ReactionAggregator::new(facebook, hatena)
}

fn post(url: &str, title: &str) -> PostRecord {
    PostRecord {
        url: Some(url.to_string()),
        title: Some(title.to_string()),
        published: Some("2024-01-01T00:00:00".to_string()),
    }
}

async fn mount_counts(
    server: &MockServer,
    url: &str,
    engagement: [u64; 4],
    bookmarks: u64,
    star_names: &[&str],
) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("id", url))
        .and(query_param("fields", "og_object{engagement},engagement"))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "engagement": {
                "reaction_count": engagement[0],
                "comment_count": engagement[1],
                "share_count": engagement[2],
                "comment_plugin_count": engagement[3]
            },
            "id": url
        })))
        .expect(1)
        .mount(server)
        .await;

    let mut bookmark_body = serde_json::Map::new();
    bookmark_body.insert(url.to_string(), json!(bookmarks));
    Mock::given(method("GET"))
        .and(path("/count/entries"))
        .and(query_param("url", url))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::Value::Object(bookmark_body)),
        )
        .expect(1)
        .mount(server)
        .await;

    let stars: Vec<_> = star_names
        .iter()
        .map(|name| json!({ "name": name, "quote": "" }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/entry.json"))
        .and(query_param("uri", url))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [{ "uri": url, "stars": stars }],
            "can_comment": 0
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Token exchange
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_access_token_sends_client_credentials_grant() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/access_token"))
        .and(query_param("client_id", "fb-id"))
        .and(query_param("client_secret", "fb-secret"))
        .and(query_param("grant_type", "client_credentials"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "fb-id|abc", "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = FacebookClient::with_base_url(5, "postmetrics-test/0.1", &server.uri()).unwrap();
    let token = client
        .fetch_access_token("fb-id", "fb-secret")
        .await
        .expect("should acquire token");
    assert_eq!(token.as_str(), "fb-id|abc");
}

#[tokio::test]
async fn fetch_access_token_without_field_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "bearer" })))
        .mount(&server)
        .await;

    let client = FacebookClient::with_base_url(5, "postmetrics-test/0.1", &server.uri()).unwrap();
    let err = client.fetch_access_token("id", "secret").await.unwrap_err();
    assert!(
        matches!(err, ReactionError::MissingField { ref field, .. } if field == "access_token"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_access_token_rejected_credentials_do_not_leak_secret() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = FacebookClient::with_base_url(5, "postmetrics-test/0.1", &server.uri()).unwrap();
    let err = client
        .fetch_access_token("id", "top-secret")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReactionError::Authentication { status: 401, .. }),
        "got: {err:?}"
    );
    assert!(!err.to_string().contains("top-secret"));
}

#[tokio::test]
async fn fetch_access_token_non_json_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = FacebookClient::with_base_url(5, "postmetrics-test/0.1", &server.uri()).unwrap();
    let err = client.fetch_access_token("id", "secret").await.unwrap_err();
    assert!(matches!(err, ReactionError::Malformed { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_post_scenario_produces_expected_row() {
    let server = MockServer::start().await;
    mount_counts(&server, "https://x/a", [3, 1, 2, 0], 5, &["u1", "u1", "u2"]).await;

    let collected_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let rows = aggregator(&server.uri())
        .collect(&[post("https://x/a", "Post A")], &AccessToken::new(TOKEN), collected_at)
        .await
        .expect("aggregation should succeed");

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.collected_at, "2024-06-01 12:00:00");
    assert_eq!(row.title, "Post A");
    assert_eq!(row.url, "https://x/a");
    assert_eq!(row.published, "2024-01-01T00:00:00");
    assert_eq!(row.fb_reaction_count, 3);
    assert_eq!(row.fb_comment_count, 1);
    assert_eq!(row.fb_share_count, 2);
    assert_eq!(row.fb_comment_plugin_count, 0);
    assert_eq!(row.hatena_bookmark, 5);
    assert_eq!(row.hatena_star_total, 3);
    assert_eq!(row.hatena_star_uu, 2);
}

#[tokio::test]
async fn rows_follow_input_order_with_three_requests_per_post() {
    let server = MockServer::start().await;
    let urls = ["https://x/a", "https://x/b", "https://x/c"];
    for (i, url) in (0u64..).zip(urls) {
        mount_counts(&server, url, [i, 0, 0, 0], 10 + i, &["u1"]).await;
    }

    let posts: Vec<_> = urls.iter().map(|u| post(u, "t")).collect();
    let rows = aggregator(&server.uri())
        .collect(&posts, &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap();

    let row_urls: Vec<_> = rows.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(row_urls, urls);
    assert_eq!(rows[2].fb_reaction_count, 2);
    assert_eq!(rows[1].hatena_bookmark, 11);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3 * urls.len());
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    for chunk in paths.chunks(3) {
        assert_eq!(chunk, ["/", "/count/entries", "/entry.json"]);
    }
}

#[tokio::test]
async fn empty_post_list_makes_no_requests() {
    let server = MockServer::start().await;
    let rows = aggregator(&server.uri())
        .collect(&[], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn zero_counts_are_kept() {
    let server = MockServer::start().await;
    mount_counts(&server, "https://x/z", [0, 0, 0, 0], 0, &[]).await;

    let rows = aggregator(&server.uri())
        .collect(&[post("https://x/z", "Zero")], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap();
    assert_eq!(rows[0].hatena_bookmark, 0);
    assert_eq!(rows[0].hatena_star_total, 0);
    assert_eq!(rows[0].hatena_star_uu, 0);
}

#[tokio::test]
async fn bookmark_response_without_url_key_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "engagement": {
                "reaction_count": 1,
                "comment_count": 1,
                "share_count": 1,
                "comment_plugin_count": 1
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/count/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/entry.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let err = aggregator(&server.uri())
        .collect(&[post("https://x/a", "A")], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReactionError::MissingField { ref field, .. } if field == "https://x/a"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn missing_engagement_object_is_missing_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "https://x/a" })))
        .mount(&server)
        .await;

    let err = aggregator(&server.uri())
        .collect(&[post("https://x/a", "A")], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReactionError::MissingField { ref field, .. } if field == "engagement"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn star_response_without_entries_is_missing_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "engagement": {
                "reaction_count": 1,
                "comment_count": 1,
                "share_count": 1,
                "comment_plugin_count": 1
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/count/entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "https://x/a": 4 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/entry.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "entries": [] })))
        .mount(&server)
        .await;

    let err = aggregator(&server.uri())
        .collect(&[post("https://x/a", "A")], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReactionError::MissingField { ref field, .. } if field == "entries[0]"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn incomplete_post_fails_before_any_request() {
    let server = MockServer::start().await;
    let partial = PostRecord {
        url: None,
        title: Some("No URL".to_string()),
        published: None,
    };

    let err = aggregator(&server.uri())
        .collect(&[partial], &AccessToken::new(TOKEN), Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReactionError::IncompletePost { index: 0, field: "url" }),
        "got: {err:?}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}
