// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn cancel_with_no_registered_hook_returns_false() {
    let control = RunControl::new();
    assert!(!control.cancel(&CronId::new("cron-aaaaaaaa")));
}

#[test]
fn registered_hook_is_notified_and_consumed() {
    let control = RunControl::new();
    let cron_id = CronId::new("cron-aaaaaaaa");
    let (tx, mut rx) = oneshot::channel();
    control.register(cron_id.clone(), tx);
    assert!(control.is_running(&cron_id));

    assert!(control.cancel(&cron_id));
    assert!(rx.try_recv().is_ok());
    assert!(!control.is_running(&cron_id));
    assert!(!control.cancel(&cron_id));
}

#[test]
fn clear_removes_the_hook_without_notifying() {
    let control = RunControl::new();
    let cron_id = CronId::new("cron-aaaaaaaa");
    let (tx, _rx) = oneshot::channel();
    control.register(cron_id.clone(), tx);
    control.clear(&cron_id);
    assert!(!control.is_running(&cron_id));
}

#[test]
fn registering_twice_replaces_the_previous_hook() {
    let control = RunControl::new();
    let cron_id = CronId::new("cron-aaaaaaaa");
    let (tx1, rx1) = oneshot::channel();
    let (tx2, mut rx2) = oneshot::channel();
    control.register(cron_id.clone(), tx1);
    control.register(cron_id.clone(), tx2);
    drop(rx1);

    assert!(control.cancel(&cron_id));
    assert!(rx2.try_recv().is_ok());
}
