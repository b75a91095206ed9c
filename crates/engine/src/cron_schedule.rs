// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Five-field cron expression evaluation with an IANA timezone.
//!
//! The `cron` crate's parser expects a leading seconds field; every
//! expression is evaluated with an implicit `0` seconds column so callers
//! only ever write the familiar `min hour dom month dow` form.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;

use crate::error::ExecutorError;

#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    timezone: Tz,
    inner: Schedule,
}

impl CronSchedule {
    pub fn parse(expr: &str, timezone: Tz) -> Result<Self, ExecutorError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ExecutorError::InvalidSchedule {
                expr: expr.to_string(),
                reason: format!("expected 5 fields, got {}", fields.len()),
            });
        }
        let six_field = format!("0 {expr}");
        let inner = Schedule::from_str(&six_field).map_err(|e| ExecutorError::InvalidSchedule {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { expr: expr.to_string(), timezone, inner })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The first fire time strictly after `after`, in UTC.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.timezone);
        self.inner.after(&local).next().map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
#[path = "cron_schedule_tests.rs"]
mod tests;
