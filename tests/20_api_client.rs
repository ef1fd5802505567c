mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use trendwatch::api::params::{AuthorsQuery, DateRange, HashtagFilter, PostsQuery, ReportFilter};
use reqwest::Method;
use trendwatch::api::ApiClient;
use trendwatch::error::ClientError;
use trendwatch::session::Session;

#[tokio::test]
async fn requests_without_token_carry_no_authorization() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    let hashtags = client.active_hashtags().await?;
    assert_eq!(hashtags.len(), 2);

    let seen = backend.state.last("/api/hashtags").expect("request recorded");
    assert_eq!(seen.authorization, None);
    Ok(())
}

#[tokio::test]
async fn login_then_every_request_carries_the_bearer_token() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let session = Session::in_memory();
    let client = common::client(&backend, session.clone())?;

    let response = client.login("ana", common::PASSWORD).await?;
    assert_eq!(response.token_type, "bearer");
    session.set(&response.access_token)?;

    client.active_hashtags().await?;
    client.stats().await?;

    let expected = format!("Bearer {}", response.access_token);
    for path in ["/api/hashtags", "/api/stats"] {
        let seen = backend.state.last(path).expect("request recorded");
        assert_eq!(seen.authorization.as_deref(), Some(expected.as_str()), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn token_is_read_fresh_for_each_request() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let session = Session::in_memory();
    let client = common::client(&backend, session.clone())?;

    session.set("first")?;
    client.stats().await?;
    session.set("second")?;
    client.stats().await?;
    session.clear()?;
    client.stats().await?;

    let headers: Vec<Option<String>> = backend
        .state
        .requests()
        .into_iter()
        .filter(|s| s.path == "/api/stats")
        .map(|s| s.authorization)
        .collect();
    assert_eq!(
        headers,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string()), None]
    );
    Ok(())
}

#[tokio::test]
async fn server_detail_is_surfaced_verbatim() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    let err = client.login("ana", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Incorrect username or password");
    Ok(())
}

#[tokio::test]
async fn all_hashtags_reaches_the_server_as_the_sentinel() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    let mut query = PostsQuery {
        filter: ReportFilter::new(DateRange::default(), HashtagFilter::parse("all"), 10),
        ..PostsQuery::default()
    };
    client.top_posts(&query).await?;

    let seen = backend.state.last("/api/posts").expect("request recorded");
    assert_eq!(seen.query.get("hashtag").map(String::as_str), Some("all"));
    assert_eq!(seen.query.get("limit").map(String::as_str), Some("10"));
    assert_eq!(seen.query.get("category").map(String::as_str), Some("Views"));
    assert!(seen.query.get("start_date").is_some_and(|d| d.starts_with("1990-01-01")));

    query.filter.hashtag = HashtagFilter::parse("#dance");
    query.filter.range = DateRange::from_dates(NaiveDate::from_ymd_opt(2024, 1, 1), None);
    client.top_posts(&query).await?;

    let seen = backend.state.last("/api/posts").expect("request recorded");
    assert_eq!(seen.query.get("hashtag").map(String::as_str), Some("dance"));
    assert!(seen.query.get("start_date").is_some_and(|d| d.starts_with("2024-01-01")));
    Ok(())
}

#[tokio::test]
async fn slow_server_times_out_without_touching_the_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    backend.state.stats_delay_ms.store(1500, Ordering::SeqCst);

    let token = common::token_for("ana", 3600);
    let session = Session::in_memory();
    session.set(&token)?;
    let client = ApiClient::with_timeout(&backend.base_url, Duration::from_millis(200), session.clone())?;

    let err = client.stats().await.unwrap_err();
    assert_eq!(err, ClientError::Timeout);
    assert_eq!(session.get(), Some(token));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");
    let client = ApiClient::with_timeout(
        &format!("http://127.0.0.1:{}", port),
        Duration::from_millis(500),
        Session::in_memory(),
    )?;

    let err = client.stats().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_) | ClientError::Timeout));
    assert!(!err.user_message().is_empty());
    Ok(())
}

#[tokio::test]
async fn add_hashtag_posts_normalized_json() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    let response = client.add_hashtag("  #SummerVibes ").await?;
    assert_eq!(response.text(), "Hashtag added successfully");

    let seen = backend.state.last("/api/hashtag").expect("request recorded");
    assert_eq!(seen.body.get("hashtag").map(String::as_str), Some("summervibes"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    Ok(())
}

#[tokio::test]
async fn deactivate_hashtag_patches_the_encoded_id() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let session = Session::in_memory();
    session.set("tok")?;
    let client = common::client(&backend, session)?;

    client.deactivate_hashtag("h1").await?;
    let seen = backend.state.last("/api/hashtags/h1/deactivate").expect("request recorded");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok"));

    let err = client.deactivate_hashtag("missing").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.user_message(), "Hashtag not found");
    Ok(())
}

#[tokio::test]
async fn multimodal_search_sends_query_and_image_parts() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    let dir = common::temp_dir();
    std::fs::create_dir_all(&dir)?;
    let image = dir.join("cat.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G', 0, 1, 2, 3])?;

    let matches = client.multimodal_search(Some(" cats dancing "), Some(&image)).await?;
    assert!(matches.is_empty());

    let seen = backend.state.last("/api/search/multimodal").expect("request recorded");
    assert!(seen
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary=")));
    assert_eq!(seen.body.get("query").map(String::as_str), Some("cats dancing"));
    assert_eq!(seen.body.get("image").map(String::as_str), Some("cat.png:8"));

    client.multimodal_search(Some("cats"), None).await?;
    let seen = backend.state.last("/api/search/multimodal").expect("request recorded");
    assert!(!seen.body.contains_key("image"));

    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}

#[tokio::test]
async fn report_queries_carry_the_required_hashtag() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let client = common::client(&backend, Session::in_memory())?;

    for pairs in [PostsQuery::default().to_query(), AuthorsQuery::default().to_query()] {
        assert!(pairs.iter().any(|(k, v)| *k == "hashtag" && v == "all"));
    }
    client.top_posts(&PostsQuery::default()).await?;

    // the same endpoint without the field fails validation
    let bare = client.request(Method::GET, "/api/posts")?.query(&[("feed", "false")]);
    let response = bare.send().await?;
    assert_eq!(response.status().as_u16(), 422);
    Ok(())
}
