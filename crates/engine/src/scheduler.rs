// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory cron job registry: register/unregister/list, and derive each
//! job's next fire time from its 5-field schedule. Firing never waits for a
//! prior run to finish — the executor's overlap guard is responsible for
//! skipping (see `executor.rs`).

use crate::cron_schedule::CronSchedule;
use ch_core::CronId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// A registered cron job. Jobs with no `schedule` are webhook/manual
/// trigger only and never self-fire.
pub struct CronJob {
    pub cron_id: CronId,
    pub schedule: Option<CronSchedule>,
    pub guild_id: String,
    pub channel: String,
    next_run: Option<DateTime<Utc>>,
    in_flight: Arc<AtomicBool>,
}

impl CronJob {
    pub fn new(
        cron_id: CronId,
        schedule: Option<CronSchedule>,
        guild_id: impl Into<String>,
        channel: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let next_run = schedule.as_ref().and_then(|s| s.next_after(now));
        Self {
            cron_id,
            schedule,
            guild_id: guild_id.into(),
            channel: channel.into(),
            next_run,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.next_run
    }

    /// Shared overlap-guard handle; the executor checks-and-sets this at the
    /// start of a run and clears it when the run (and its lock) are done.
    pub fn in_flight_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_flight)
    }
}

/// The in-memory schedule set. Owns no lock or channel handles itself; the
/// executor and forum sync engine are handed `&CronJob` snapshots and act on
/// them through their own dependencies.
#[derive(Default)]
pub struct Scheduler {
    jobs: HashMap<CronId, CronJob>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: CronJob) {
        self.jobs.insert(job.cron_id.clone(), job);
    }

    pub fn unregister(&mut self, id: &CronId) -> Option<CronJob> {
        self.jobs.remove(id)
    }

    pub fn get_job(&self, id: &CronId) -> Option<&CronJob> {
        self.jobs.get(id)
    }

    pub fn list_jobs(&self) -> Vec<&CronJob> {
        self.jobs.values().collect()
    }

    /// CronIds whose `nextRun` is at or before `now`; each fired job's
    /// `nextRun` is advanced to the following occurrence (or cleared, if the
    /// schedule yields no further occurrence).
    pub fn fired_jobs(&mut self, now: DateTime<Utc>) -> Vec<CronId> {
        let mut fired = Vec::new();
        for job in self.jobs.values_mut() {
            if let Some(next_run) = job.next_run {
                if next_run <= now {
                    fired.push(job.cron_id.clone());
                    job.next_run = job.schedule.as_ref().and_then(|s| s.next_after(now));
                }
            }
        }
        fired
    }

    /// Earliest `nextRun` across all registered jobs, for the daemon's tick
    /// sleep-until deadline.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.jobs.values().filter_map(|j| j.next_run).min()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
