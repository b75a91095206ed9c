// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn rejects_wrong_field_count() {
    let result = CronSchedule::parse("* * * *", Tz::UTC);
    assert!(result.is_err());
}

#[test]
fn rejects_unparseable_expression() {
    let result = CronSchedule::parse("99 * * * *", Tz::UTC);
    assert!(result.is_err());
}

#[test]
fn daily_at_midnight_fires_next_day() {
    let schedule = CronSchedule::parse("0 0 * * *", Tz::UTC).unwrap();
    let after = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
    let next = schedule.next_after(after).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
}

#[test]
fn hourly_fires_on_next_hour_boundary() {
    let schedule = CronSchedule::parse("0 * * * *", Tz::UTC).unwrap();
    let after = Utc.with_ymd_and_hms(2026, 1, 1, 12, 30, 0).unwrap();
    let next = schedule.next_after(after).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 13, 0, 0).unwrap());
}

#[test]
fn timezone_affects_fire_instant() {
    let ny = CronSchedule::parse("0 9 * * *", chrono_tz::America::New_York).unwrap();
    let after = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let next = ny.next_after(after).unwrap();
    // 9am America/New_York in January (EST, UTC-5) is 14:00 UTC.
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 14, 0, 0).unwrap());
}

#[test]
fn expr_and_timezone_are_retained() {
    let schedule = CronSchedule::parse("*/15 * * * *", Tz::UTC).unwrap();
    assert_eq!(schedule.expr(), "*/15 * * * *");
    assert_eq!(schedule.timezone(), Tz::UTC);
}
