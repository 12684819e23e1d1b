#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use std::collections::HashSet;
mod common;

// The seeded inbox holds ten messages sent daily from 2025-01-01 to 2025-01-10.
// Even-numbered ones go to user1, odd-numbered ones to user2, and the last
// four (2025-01-07 onward) are unread.

fn contents(messages: &[serde_json::Value]) -> Vec<String> {
    messages.iter().map(|m| m["content"].as_str().unwrap().to_string()).collect()
}

fn numbers(messages: &[serde_json::Value]) -> Vec<u32> {
    contents(messages)
        .iter()
        .map(|c| c.trim_end_matches('.').rsplit(' ').next().unwrap().parse().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_all_newest_first() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages").await;

    assert_eq!(numbers(&listed), [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
}

#[tokio::test]
async fn test_list_path_window_is_inclusive() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages/2025-01-03T00:00:00Z/2025-01-05T00:00:00Z").await;

    assert_eq!(numbers(&listed), [4, 3, 2]);
}

#[tokio::test]
async fn test_list_query_window_with_open_end() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages?start=2025-01-08T00:00:00Z").await;

    assert_eq!(numbers(&listed), [9, 8, 7]);
}

#[tokio::test]
async fn test_list_query_window_with_open_start() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages?end=2025-01-02T00:00:00Z").await;

    assert_eq!(numbers(&listed), [1, 0]);
}

#[tokio::test]
async fn test_distinct_recipients() {
    let app = common::TestApp::spawn().await;
    app.send_ok("1", "a@x.com", "z@x.com").await;
    app.send_ok("2", "a@x.com", "z@x.com").await;
    app.send_ok("3", "b@x.com", "z@x.com").await;

    let recipients = app.list("/messages/recipients").await;

    let recipients: HashSet<&str> = recipients.iter().map(|r| r.as_str().unwrap()).collect();
    assert_eq!(recipients, HashSet::from(["a@x.com", "b@x.com"]));
}

#[tokio::test]
async fn test_recipient_messages() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages/recipients/user1@test.com").await;

    assert_eq!(numbers(&listed), [8, 6, 4, 2, 0]);
    assert!(listed.iter().all(|m| m["recipientAddress"] == "user1@test.com"));
}

#[tokio::test]
async fn test_recipient_messages_in_window() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages/recipients/user2@test.com/2025-01-02T00:00:00Z/2025-01-06T00:00:00Z").await;

    assert_eq!(numbers(&listed), [5, 3, 1]);
}

#[tokio::test]
async fn test_recipient_messages_in_query_window() {
    let app = common::TestApp::spawn_seeded().await;

    let listed = app.list("/messages/recipients/user1@test.com?start=2025-01-03T00:00:00Z&end=2025-01-07T00:00:00Z").await;

    assert_eq!(numbers(&listed), [6, 4, 2]);
}

#[tokio::test]
async fn test_unread_in_query_window() {
    let app = common::TestApp::spawn_seeded().await;

    let open_end = app.list("/messages/recipients/user1@test.com/unread?start=2025-01-08T00:00:00Z").await;
    let open_start = app.list("/messages/recipients/user2@test.com/unread?end=2025-01-08T00:00:00Z").await;

    assert_eq!(numbers(&open_end), [8]);
    assert_eq!(numbers(&open_start), [7]);
}

#[tokio::test]
async fn test_unread_is_subset_of_recipient_messages() {
    let app = common::TestApp::spawn_seeded().await;

    let all = app.list("/messages/recipients/user2@test.com").await;
    let unread = app.list("/messages/recipients/user2@test.com/unread").await;

    assert_eq!(numbers(&unread), [9, 7]);
    assert!(unread.iter().all(|m| m["readTimestamp"].is_null() && all.contains(m)));
}

#[tokio::test]
async fn test_unread_in_window() {
    let app = common::TestApp::spawn_seeded().await;

    let listed =
        app.list("/messages/recipients/user1@test.com/unread/2025-01-01T00:00:00Z/2025-01-08T00:00:00Z").await;

    assert_eq!(numbers(&listed), [6]);
}

#[tokio::test]
async fn test_unread_reflects_mark_read() {
    let app = common::TestApp::spawn_seeded().await;
    let unread = app.list("/messages/recipients/user1@test.com/unread").await;
    let target = unread[0]["id"].as_str().unwrap().to_string();

    let resp =
        app.client.patch(app.url("/messages/mark-read")).json(&serde_json::json!([target])).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let after = app.list("/messages/recipients/user1@test.com/unread").await;
    assert_eq!(after.len(), unread.len() - 1);
    assert!(!common::ids(&after).contains(&target));
}

#[tokio::test]
async fn test_unknown_recipient_is_empty() {
    let app = common::TestApp::spawn_seeded().await;

    assert!(app.list("/messages/recipients/nobody@test.com").await.is_empty());
}
