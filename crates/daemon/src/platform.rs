// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stand-in platform adapters wired in when `cronhostd` starts without a
//! concrete chat-platform integration configured. The chat platform client
//! itself is an external collaborator (out of scope here, same as
//! `ch_engine::chat`/`crate::forum`); these types let the binary still
//! start, log, and run its scheduler/sync loops against an empty platform
//! rather than requiring every caller to stub one out by hand.

use async_trait::async_trait;
use ch_engine::chat::{ChannelRef, ChatClient};
use std::sync::Arc;
use tracing::warn;

use crate::forum::{ForumChannel, ForumThread};

/// A [`ChatClient`] that never resolves a channel. Every send attempt is
/// recorded as a per-run error by the executor rather than panicking.
pub struct UnconfiguredChatClient;

#[async_trait]
impl ChatClient for UnconfiguredChatClient {
    async fn resolve_channel(&self, _guild_or_scope: &str, name_or_id: &str) -> Option<Arc<dyn ChannelRef>> {
        warn!(channel = %name_or_id, "no chat platform adapter configured; dropping send");
        None
    }
}

/// A [`ForumChannel`] with no threads and no ability to fetch any. The sync
/// engine's phases all treat a fetch failure as a per-item error, so this
/// degrades to "every phase runs zero items" rather than crashing the
/// daemon.
pub struct UnconfiguredForumChannel {
    id: String,
}

impl UnconfiguredForumChannel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl ForumChannel for UnconfiguredForumChannel {
    fn id(&self) -> String {
        self.id.clone()
    }

    async fn fetch_active_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String> {
        Err("no forum platform adapter configured".to_string())
    }

    async fn fetch_archived_threads(&self) -> Result<Vec<Arc<dyn ForumThread>>, String> {
        Err("no forum platform adapter configured".to_string())
    }
}
