// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The chat-platform contract consumed by the executor and sync engine.
//! No concrete implementation lives here (external collaborator); a
//! `FakeChatClient` test double is provided under `test-support`.

use async_trait::async_trait;
use ch_core::MessageId;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub images: Vec<Vec<u8>>,
}

/// A resolved channel (plain channel or forum thread) that can be posted to.
#[async_trait]
pub trait ChannelRef: Send + Sync {
    fn id(&self) -> String;
    fn name(&self) -> String;
    async fn send(&self, content: &str, options: SendOptions) -> Result<MessageId, String>;
    async fn edit(&self, message_id: &MessageId, content: &str) -> Result<(), String>;
}

/// The platform entry point: resolves channel names/IDs to a `ChannelRef`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Case-insensitive name lookup, ID path tried first.
    async fn resolve_channel(&self, guild_or_scope: &str, name_or_id: &str) -> Option<Arc<dyn ChannelRef>>;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeChannelRef, FakeChatClient, SentMessage};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    pub struct SentMessage {
        pub channel: String,
        pub content: String,
        pub image_count: usize,
    }

    pub struct FakeChannelRef {
        name: String,
        sent: Arc<Mutex<Vec<SentMessage>>>,
        fail_send: bool,
    }

    #[async_trait]
    impl ChannelRef for FakeChannelRef {
        fn id(&self) -> String {
            self.name.clone()
        }

        fn name(&self) -> String {
            self.name.clone()
        }

        async fn send(&self, content: &str, options: SendOptions) -> Result<MessageId, String> {
            if self.fail_send {
                return Err(format!("send to {} failed", self.name));
            }
            self.sent.lock().push(SentMessage {
                channel: self.name.clone(),
                content: content.to_string(),
                image_count: options.images.len(),
            });
            Ok(MessageId::new(format!("msg-{}", self.sent.lock().len())))
        }

        async fn edit(&self, _message_id: &MessageId, content: &str) -> Result<(), String> {
            if self.fail_send {
                return Err(format!("edit on {} failed", self.name));
            }
            self.sent.lock().push(SentMessage {
                channel: self.name.clone(),
                content: content.to_string(),
                image_count: 0,
            });
            Ok(())
        }
    }

    /// A chat client test double: channels registered via `with_channel` (or
    /// `with_failing_channel`) resolve; everything else returns `None`. Clone
    /// shares the same recorded-message log, so a clone handed to an
    /// `Executor` still reflects sends back to the test's own handle.
    #[derive(Default, Clone)]
    pub struct FakeChatClient {
        channels: HashMap<String, bool>,
        sent: Arc<Mutex<Vec<SentMessage>>>,
    }

    impl FakeChatClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_channel(mut self, name: impl Into<String>) -> Self {
            self.channels.insert(name.into(), false);
            self
        }

        pub fn with_failing_channel(mut self, name: impl Into<String>) -> Self {
            self.channels.insert(name.into(), true);
            self
        }

        pub fn sent_messages(&self) -> Vec<SentMessage> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl ChatClient for FakeChatClient {
        async fn resolve_channel(&self, _guild_or_scope: &str, name_or_id: &str) -> Option<Arc<dyn ChannelRef>> {
            let fail_send = *self.channels.get(name_or_id)?;
            Some(Arc::new(FakeChannelRef {
                name: name_or_id.to_string(),
                sent: Arc::clone(&self.sent),
                fail_send,
            }))
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
