// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers for the cron/chat domain.

crate::define_id! {
    /// Stable opaque job identifier, formatted `cron-<8 hex>`.
    pub struct CronId;
}

crate::define_id! {
    /// Forum thread identifier.
    pub struct ThreadId;
}

crate::define_id! {
    /// Channel identifier (may be a thread, a plain text channel, or a name
    /// resolved at dispatch time).
    pub struct ChannelId;
}

crate::define_id! {
    /// Pinned platform message identifier.
    pub struct MessageId;
}

crate::define_id! {
    /// Webhook source identifier; unique across all records when present.
    pub struct WebhookSourceId;
}

/// Generate a stable opaque cron ID: `cron-<8 hex>`.
pub fn generate_cron_id() -> CronId {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    CronId::new(format!("cron-{}", &raw[..8]))
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
