//! End-to-end scenario tests for the chirp API
//!
//! These run against a live service: start Postgres, apply `schema.sql`,
//! run the `api` binary, and point `API_BASE` at it (default
//! `http://localhost:3000`). They are ignored by default because they need
//! that running stack.

use reqwest::StatusCode;
use serde_json::{Value, json};

fn api_base() -> String {
    std::env::var("API_BASE").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn unique_username(prefix: &str) -> String {
    // Usernames are capped at 15 characters, so keep the suffix short.
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}{:08x}", prefix, nanos)
}

async fn register(client: &reqwest::Client, username: &str, password: &str) -> Value {
    let response = client
        .post(format!("{}/api/user/register", api_base()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
#[ignore = "requires a running service and Postgres"]
async fn test_register_post_fetch_and_foreign_delete() {
    let client = reqwest::Client::new();

    // Register alice and post with her access token.
    let alice = unique_username("alice");
    let registered = register(&client, &alice, "secret123").await;
    let access_token = registered["access_token"].as_str().unwrap().to_string();
    assert!(registered["refresh_token"].is_string());
    assert_eq!(registered["user"]["username"], alice.as_str());

    let response = client
        .post(format!("{}/api/tweet/create", api_base()))
        .header("access-token", &access_token)
        .json(&json!({ "body": "hello world" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["tweet"]["body"], "hello world");
    let tweet_id = created["tweet"]["id"].as_str().unwrap().to_string();

    // The tweet is readable without a token, author resolved.
    let response = client
        .get(format!("{}/api/tweet/{}", api_base(), tweet_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["tweet"]["body"], "hello world");
    assert_eq!(fetched["tweet"]["author"]["username"], alice.as_str());

    // A different user cannot delete it.
    let mallory = unique_username("mallory");
    let other = register(&client, &mallory, "secret456").await;
    let other_token = other["access_token"].as_str().unwrap();

    let response = client
        .delete(format!("{}/api/tweet/{}", api_base(), tweet_id))
        .header("access-token", other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Still there afterward.
    let response = client
        .get(format!("{}/api/tweet/{}", api_base(), tweet_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The owner can delete it.
    let response = client
        .delete(format!("{}/api/tweet/{}", api_base(), tweet_id))
        .header("access-token", &access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running service and Postgres"]
async fn test_duplicate_registration_conflicts() {
    let client = reqwest::Client::new();
    let username = unique_username("dup");

    register(&client, &username, "secret123").await;

    let response = client
        .post(format!("{}/api/user/register", api_base()))
        .json(&json!({ "username": username, "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The first registration still logs in.
    let response = client
        .post(format!("{}/api/user/login", api_base()))
        .json(&json!({ "username": username, "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running service and Postgres"]
async fn test_like_is_idempotent_and_follow_reports_repeats() {
    let client = reqwest::Client::new();

    let poster = unique_username("poster");
    let fan = unique_username("fan");
    let poster_auth = register(&client, &poster, "secret123").await;
    let fan_auth = register(&client, &fan, "secret123").await;
    let poster_token = poster_auth["access_token"].as_str().unwrap();
    let fan_token = fan_auth["access_token"].as_str().unwrap();
    let poster_id = poster_auth["user"]["id"].as_str().unwrap();

    let response = client
        .post(format!("{}/api/tweet/create", api_base()))
        .header("access-token", poster_token)
        .json(&json!({ "body": "like me twice" }))
        .send()
        .await
        .unwrap();
    let tweet_id = response.json::<Value>().await.unwrap()["tweet"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Two likes leave exactly one entry.
    for _ in 0..2 {
        let response = client
            .patch(format!("{}/api/tweet/{}/like", api_base(), tweet_id))
            .header("access-token", fan_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["likes"].as_array().unwrap().len(), 1);
    }

    // Unliking when absent leaves the list unchanged.
    let response = client
        .patch(format!("{}/api/tweet/{}/unlike", api_base(), tweet_id))
        .header("access-token", fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.json::<Value>().await.unwrap()["likes"], json!([]));

    let response = client
        .patch(format!("{}/api/tweet/{}/unlike", api_base(), tweet_id))
        .header("access-token", fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.json::<Value>().await.unwrap()["likes"], json!([]));

    // Retweet toggles back to the original state.
    for expected in ["Tweet retweeted successfully", "Retweet undone"] {
        let response = client
            .patch(format!("{}/api/tweet/{}/retweet", api_base(), tweet_id))
            .header("access-token", fan_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.json::<Value>().await.unwrap()["message"], expected);
    }

    // Following twice reports the repeat instead of duplicating.
    let response = client
        .patch(format!("{}/api/user/{}/follow", api_base(), poster_id))
        .header("access-token", fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.json::<Value>().await.unwrap()["message"],
        "Followed successfully"
    );

    let response = client
        .patch(format!("{}/api/user/{}/follow", api_base(), poster_id))
        .header("access-token", fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.json::<Value>().await.unwrap()["message"],
        "Already following"
    );
}
