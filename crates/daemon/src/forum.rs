// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The forum-channel contract consumed by the sync engine. Like
//! `ch_engine::chat`, no concrete implementation lives here (external
//! collaborator); a `FakeForumChannel` test double is provided under
//! `test-support`.

use async_trait::async_trait;
use ch_core::MessageId;
use std::sync::Arc;

/// A forum channel: a container of threads, each tagged from a shared tag
/// map and carrying a pinned status message.
#[async_trait]
pub trait ForumChannel: Send + Sync {
    fn id(&self) -> String;
    async fn fetch_active_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String>;
    async fn fetch_archived_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String>;
}

/// One thread within a `ForumChannel`.
#[async_trait]
pub trait ForumThread: Send + Sync {
    fn id(&self) -> String;
    fn parent_id(&self) -> String;
    fn name(&self) -> String;
    fn archived(&self) -> bool;
    fn applied_tags(&self) -> Vec<String>;

    async fn edit(&self, applied_tags: Vec<String>) -> Result<(), String>;
    async fn set_name(&self, name: &str) -> Result<(), String>;
    async fn set_archived(&self, archived: bool) -> Result<(), String>;
    async fn fetch_starter_message(&self) -> Result<Option<String>, String>;
    /// `None` if no message is currently pinned.
    async fn fetch_pinned(&self) -> Result<Option<(MessageId, String)>, String>;

    async fn send(&self, content: &str) -> Result<MessageId, String>;
    async fn edit_message(&self, message_id: &MessageId, content: &str) -> Result<(), String>;
    async fn pin(&self, message_id: &MessageId) -> Result<(), String>;
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeForumChannel, FakeForumThread};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, Default)]
    pub struct ThreadState {
        pub name: String,
        pub archived: bool,
        pub applied_tags: Vec<String>,
        pub pinned: Option<(MessageId, String)>,
        pub starter_message: Option<String>,
        pub sent: Vec<String>,
    }

    pub struct FakeForumThread {
        id: String,
        parent_id: String,
        state: Arc<Mutex<ThreadState>>,
    }

    impl FakeForumThread {
        pub fn new(id: impl Into<String>, parent_id: impl Into<String>, name: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                parent_id: parent_id.into(),
                state: Arc::new(Mutex::new(ThreadState {
                    name: name.into(),
                    ..Default::default()
                })),
            }
        }

        pub fn with_tags(self, tags: Vec<String>) -> Self {
            self.state.lock().applied_tags = tags;
            self
        }

        pub fn with_pinned(self, message_id: MessageId, content: impl Into<String>) -> Self {
            self.state.lock().pinned = Some((message_id, content.into()));
            self
        }

        pub fn with_archived(self, archived: bool) -> Self {
            self.state.lock().archived = archived;
            self
        }

        pub fn snapshot(&self) -> ThreadState {
            self.state.lock().clone()
        }
    }

    #[async_trait]
    impl ForumThread for FakeForumThread {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn parent_id(&self) -> String {
            self.parent_id.clone()
        }

        fn name(&self) -> String {
            self.state.lock().name.clone()
        }

        fn archived(&self) -> bool {
            self.state.lock().archived
        }

        fn applied_tags(&self) -> Vec<String> {
            self.state.lock().applied_tags.clone()
        }

        async fn edit(&self, applied_tags: Vec<String>) -> Result<(), String> {
            self.state.lock().applied_tags = applied_tags;
            Ok(())
        }

        async fn set_name(&self, name: &str) -> Result<(), String> {
            self.state.lock().name = name.to_string();
            Ok(())
        }

        async fn set_archived(&self, archived: bool) -> Result<(), String> {
            self.state.lock().archived = archived;
            Ok(())
        }

        async fn fetch_starter_message(&self) -> Result<Option<String>, String> {
            Ok(self.state.lock().starter_message.clone())
        }

        async fn fetch_pinned(&self) -> Result<Option<(MessageId, String)>, String> {
            Ok(self.state.lock().pinned.clone())
        }

        async fn send(&self, content: &str) -> Result<MessageId, String> {
            let mut state = self.state.lock();
            state.sent.push(content.to_string());
            Ok(MessageId::new(format!("{}-msg-{}", self.id, state.sent.len())))
        }

        async fn edit_message(&self, _message_id: &MessageId, content: &str) -> Result<(), String> {
            if let Some(pinned) = self.state.lock().pinned.as_mut() {
                pinned.1 = content.to_string();
            }
            Ok(())
        }

        async fn pin(&self, message_id: &MessageId) -> Result<(), String> {
            let mut state = self.state.lock();
            let content = state
                .sent
                .last()
                .cloned()
                .unwrap_or_default();
            state.pinned = Some((message_id.clone(), content));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeForumChannel {
        id: String,
        threads: Mutex<Vec<Arc<FakeForumThread>>>,
    }

    impl FakeForumChannel {
        pub fn new(id: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                threads: Mutex::new(Vec::new()),
            }
        }

        pub fn with_thread(self, thread: FakeForumThread) -> Self {
            self.threads.lock().push(Arc::new(thread));
            self
        }
    }

    #[async_trait]
    impl ForumChannel for FakeForumChannel {
        fn id(&self) -> String {
            self.id.clone()
        }

        async fn fetch_active_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String> {
            Ok(self
                .threads
                .lock()
                .iter()
                .filter(|t| !t.archived())
                .map(|t| Arc::clone(t) as Arc<dyn ForumThread>)
                .collect())
        }

        async fn fetch_archived_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String> {
            Ok(self
                .threads
                .lock()
                .iter()
                .filter(|t| t.archived())
                .map(|t| Arc::clone(t) as Arc<dyn ForumThread>)
                .collect())
        }
    }
}
