// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn resolves_registered_channels() {
    let client = FakeChatClient::new().with_channel("alpha");
    let channel = client.resolve_channel("guild", "alpha").await.unwrap();
    assert_eq!(channel.name(), "alpha");
}

#[tokio::test]
async fn unregistered_channel_resolves_to_none() {
    let client = FakeChatClient::new().with_channel("alpha");
    assert!(client.resolve_channel("guild", "ghost").await.is_none());
}

#[tokio::test]
async fn send_records_content_and_image_count() {
    let client = FakeChatClient::new().with_channel("alpha");
    let channel = client.resolve_channel("guild", "alpha").await.unwrap();
    channel
        .send("hello", SendOptions { images: vec![vec![1, 2, 3]] })
        .await
        .unwrap();
    let sent = client.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].content, "hello");
    assert_eq!(sent[0].image_count, 1);
}

#[tokio::test]
async fn failing_channel_returns_error_on_send() {
    let client = FakeChatClient::new().with_failing_channel("beta");
    let channel = client.resolve_channel("guild", "beta").await.unwrap();
    let result = channel.send("hi", SendOptions::default()).await;
    assert!(result.is_err());
}
