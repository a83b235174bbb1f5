use lookbook_backend::api;
use lookbook_backend::bootstrap;
use lookbook_backend::config::{LookbookConfig, LookbookPaths};
use lookbook_backend::feed::{CreateCommentInput, CreatePostInput, RegisterAuthorInput};
use serde_json::json;
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

fn next_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .unwrap()
        .port()
}

async fn wait_for_health(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not become healthy in time");
}

async fn register_author(client: &reqwest::Client, base_url: &str, id: &str, visibility: &str) {
    let resp = client
        .post(format!("{base_url}/authors"))
        .json(&RegisterAuthorInput {
            id: Some(id.to_string()),
            display_name: format!("author {id}"),
            avatar_ref: None,
            visibility: Some(visibility.to_string()),
        })
        .send()
        .await
        .expect("register author response");
    assert!(resp.status().is_success());
}

async fn create_post(client: &reqwest::Client, base_url: &str, author_id: &str) -> String {
    let resp: serde_json::Value = client
        .post(format!("{base_url}/posts"))
        .json(&CreatePostInput {
            author_id: author_id.to_string(),
            result_image_ref: format!("https://cdn.example/renders/{author_id}.png"),
            category: Some("dresses".into()),
            vibe_tag: Some("evening".into()),
            is_manual: false,
            created_at: None,
        })
        .send()
        .await
        .expect("create post response")
        .json()
        .await
        .expect("post json");

    resp.get("post")
        .and_then(|p| p.get("id"))
        .and_then(|id| id.as_str())
        .expect("post id")
        .to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rest_roundtrip_with_engagement() {
    let temp = tempdir().expect("tempdir");
    let port = next_port();
    let config = LookbookConfig::new(
        port,
        LookbookPaths::from_base_dir(temp.path()).expect("paths"),
    );

    let bootstrap = bootstrap::initialize(&config).await.expect("bootstrap");
    let database = bootstrap.database.clone();

    let server_config = config.clone();
    let server = tokio::spawn(async move {
        let _ = api::serve_http(server_config, database).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;

    let client = reqwest::Client::new();

    register_author(&client, &base_url, "mira", "public").await;
    register_author(&client, &base_url, "sana", "private").await;

    let public_post = create_post(&client, &base_url, "mira").await;
    let hidden_post = create_post(&client, &base_url, "sana").await;

    // A like lands once, then turns into a no-op.
    let first_like: serde_json::Value = client
        .post(format!("{base_url}/posts/{public_post}/like"))
        .json(&json!({ "author_id": "jonas" }))
        .send()
        .await
        .expect("first like response")
        .json()
        .await
        .expect("like json");
    assert_eq!(first_like["newly_liked"], json!(true));
    assert_eq!(first_like["like_count"], json!(1));
    assert_eq!(first_like["score"], json!(15));

    let second_like: serde_json::Value = client
        .post(format!("{base_url}/posts/{public_post}/like"))
        .json(&json!({ "author_id": "jonas" }))
        .send()
        .await
        .expect("second like response")
        .json()
        .await
        .expect("like json");
    assert_eq!(second_like["newly_liked"], json!(false));
    assert_eq!(second_like["like_count"], json!(1));
    assert_eq!(second_like["score"], json!(15));

    // Comments come back in the order they were issued.
    for text in ["nice", "cool"] {
        let resp = client
            .post(format!("{base_url}/posts/{public_post}/comments"))
            .json(&CreateCommentInput {
                author_id: "jonas".into(),
                author_display_name: "Jonas".into(),
                text: text.into(),
            })
            .send()
            .await
            .expect("comment response");
        assert!(resp.status().is_success());
    }

    let comments: serde_json::Value = client
        .get(format!("{base_url}/posts/{public_post}/comments?viewer=mira"))
        .send()
        .await
        .expect("comments response")
        .json()
        .await
        .expect("comments json");
    let texts: Vec<&str> = comments["comments"]
        .as_array()
        .expect("comments array")
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["nice", "cool"]);

    // Views count every call.
    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/posts/{public_post}/view"))
            .send()
            .await
            .expect("view response");
        assert!(resp.status().is_success());
    }

    let details: serde_json::Value = client
        .get(format!("{base_url}/posts/{public_post}?viewer=jonas"))
        .send()
        .await
        .expect("details response")
        .json()
        .await
        .expect("details json");
    assert_eq!(details["post"]["view_count"], json!(2));
    assert_eq!(details["post"]["score"], json!(15 + 10 + 10 + 1 + 1));
    assert_eq!(details["liked_by_me"], json!(true));

    // The private author's post stays out of a stranger's feed but in her own.
    let feed_for_stranger: serde_json::Value = client
        .get(format!("{base_url}/feed?viewer=jonas"))
        .send()
        .await
        .expect("feed response")
        .json()
        .await
        .expect("feed json");
    let ids: Vec<&str> = feed_for_stranger["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .map(|e| e["post"]["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&public_post.as_str()));
    assert!(!ids.contains(&hidden_post.as_str()));

    let feed_for_owner: serde_json::Value = client
        .get(format!("{base_url}/feed?viewer=sana"))
        .send()
        .await
        .expect("feed response")
        .json()
        .await
        .expect("feed json");
    let ids: Vec<&str> = feed_for_owner["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .map(|e| e["post"]["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&hidden_post.as_str()));

    // Missing posts surface as 404, not 500.
    let missing = client
        .post(format!("{base_url}/posts/ghost/like"))
        .json(&json!({ "author_id": "jonas" }))
        .send()
        .await
        .expect("missing like response");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    server.abort();
    let _ = server.await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn catalogue_orders_by_trend_and_dedups_likes() {
    let temp = tempdir().expect("tempdir");
    let port = next_port();
    let config = LookbookConfig::new(
        port,
        LookbookPaths::from_base_dir(temp.path()).expect("paths"),
    );

    let bootstrap = bootstrap::initialize(&config).await.expect("bootstrap");
    let database = bootstrap.database.clone();
    lookbook_backend::seed::load_demo(&database).expect("seed demo data");

    let server_config = config.clone();
    let server = tokio::spawn(async move {
        let _ = api::serve_http(server_config, database).await;
    });

    let base_url = format!("http://127.0.0.1:{port}");
    wait_for_health(&base_url).await;

    let client = reqwest::Client::new();

    let listing: serde_json::Value = client
        .get(format!("{base_url}/products?viewer=mira"))
        .send()
        .await
        .expect("products response")
        .json()
        .await
        .expect("products json");
    let products = listing["products"].as_array().expect("products array");
    assert_eq!(products.len(), 4);
    assert_eq!(products[0]["id"], json!("aurora-slip"));
    assert_eq!(products[0]["liked_by_me"], json!(true));
    let scores: Vec<f64> = products
        .iter()
        .map(|p| p["trend_score"].as_f64().unwrap())
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }

    // mira already liked this product during seeding
    let relike: serde_json::Value = client
        .post(format!("{base_url}/products/aurora-slip/like"))
        .json(&json!({ "author_id": "mira" }))
        .send()
        .await
        .expect("relike response")
        .json()
        .await
        .expect("relike json");
    assert_eq!(relike["newly_liked"], json!(false));
    assert_eq!(relike["like_count"], json!(2));

    server.abort();
    let _ = server.await;
}
