// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level environment configuration: default timezone and the
//! tool-tier override map.

use chrono_tz::Tz;
use std::collections::HashMap;
use std::str::FromStr;

/// Resolve the default timezone from `DEFAULT_TIMEZONE`. An invalid IANA
/// name falls back to UTC with a stderr warning, matching the "system
/// timezone" fallback described for this host (no OS timezone database
/// lookup is attempted; UTC is the safe default).
pub fn default_timezone() -> Tz {
    match std::env::var("DEFAULT_TIMEZONE") {
        Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
            eprintln!("warning: invalid DEFAULT_TIMEZONE {name:?}, falling back to UTC");
            Tz::UTC
        }),
        Err(_) => Tz::UTC,
    }
}

/// A tool tier: how much of the tool surface a model is allowed to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolTier {
    Basic,
    Standard,
    Full,
}

impl ToolTier {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "basic" => Some(ToolTier::Basic),
            "standard" => Some(ToolTier::Standard),
            "full" => Some(ToolTier::Full),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolTier::Basic => "basic",
            ToolTier::Standard => "standard",
            ToolTier::Full => "full",
        }
    }
}

/// Parse a `model=tier` comma-separated override list from the named
/// environment variable.
pub fn tool_tier_overrides(var: &str) -> HashMap<String, ToolTier> {
    let Ok(raw) = std::env::var(var) else {
        return HashMap::new();
    };
    raw.split(',')
        .filter_map(|pair| {
            let (model, tier) = pair.split_once('=')?;
            let tier = ToolTier::parse(tier)?;
            Some((model.trim().to_string(), tier))
        })
        .collect()
}

/// Resolve a model's tool tier: explicit override first, then a
/// name-pattern heuristic, defaulting to `Full`.
pub fn tool_tier_for(model: &str, overrides: &HashMap<String, ToolTier>) -> ToolTier {
    if let Some(tier) = overrides.get(model) {
        return *tier;
    }
    let lower = model.to_ascii_lowercase();
    if lower.contains("haiku") || lower.contains("mini") || lower.contains("flash") {
        ToolTier::Basic
    } else if lower.contains("sonnet") {
        ToolTier::Standard
    } else {
        ToolTier::Full
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
