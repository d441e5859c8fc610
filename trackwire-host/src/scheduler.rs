//! Periodic jobs keyed by hook name.
//!
//! The schedule itself (hook, interval, next run) is persisted under the
//! process-wide `cron` slot so it survives restarts. What runs when a job is
//! due is bound in memory with [`Scheduler::bind`], mirroring how hosts
//! re-register their callbacks on every startup.

use crate::error::{HostError, HostResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};
use trackwire_store::KeyValueStore;

/// Slot holding the persisted schedule.
pub const CRON_KEY: &str = "cron";

/// Built-in named intervals, in seconds.
pub const DEFAULT_INTERVALS: &[(&str, i64)] = &[
    ("hourly", 60 * 60),
    ("twicedaily", 12 * 60 * 60),
    ("daily", 24 * 60 * 60),
    ("weekly", 7 * 24 * 60 * 60),
];

/// Invoked when a job comes due.
pub type JobCallback = Arc<dyn Fn() + Send + Sync>;

/// One persisted recurring job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub hook: String,
    /// Interval name the job was scheduled with.
    pub interval: String,
    pub interval_secs: i64,
    /// Unix seconds of the next run.
    pub next_run: i64,
}

type JobTable = BTreeMap<String, ScheduledJob>;

/// Recurring-job scheduler backed by a [`KeyValueStore`].
pub struct Scheduler {
    store: Arc<dyn KeyValueStore>,
    intervals: RwLock<HashMap<String, i64>>,
    callbacks: RwLock<HashMap<String, JobCallback>>,
}

impl Scheduler {
    /// Creates a scheduler with the built-in intervals.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let intervals = DEFAULT_INTERVALS
            .iter()
            .map(|(name, secs)| ((*name).to_string(), *secs))
            .collect();
        Self {
            store,
            intervals: RwLock::new(intervals),
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or redefines) a named interval.
    pub fn add_interval(&self, name: &str, secs: i64) -> HostResult<()> {
        if secs <= 0 {
            return Err(HostError::InvalidInterval {
                name: name.to_string(),
                secs,
            });
        }
        self.intervals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), secs);
        Ok(())
    }

    /// Resolves a named interval to seconds.
    pub fn interval_secs(&self, name: &str) -> Option<i64> {
        self.intervals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Binds the callback run when `hook` comes due. Replaces any previous binding.
    pub fn bind(&self, hook: &str, callback: JobCallback) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hook.to_string(), callback);
    }

    /// Removes the callback bound to `hook`.
    pub fn unbind(&self, hook: &str) {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(hook);
    }

    /// Returns true if a callback is bound to `hook`.
    pub fn is_bound(&self, hook: &str) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(hook)
    }

    /// Schedules `hook` to recur every `interval`, first at `first_run`.
    ///
    /// Returns `false` if the hook is already scheduled; the existing
    /// schedule is kept.
    pub fn schedule(&self, hook: &str, interval: &str, first_run: i64) -> HostResult<bool> {
        let interval_secs = self
            .interval_secs(interval)
            .ok_or_else(|| HostError::UnknownInterval(interval.to_string()))?;

        let mut jobs = self.load()?;
        if jobs.contains_key(hook) {
            debug!(hook, "Job already scheduled");
            return Ok(false);
        }

        jobs.insert(
            hook.to_string(),
            ScheduledJob {
                hook: hook.to_string(),
                interval: interval.to_string(),
                interval_secs,
                next_run: first_run,
            },
        );
        self.save(&jobs)?;
        info!(hook, interval, first_run, "Job scheduled");
        Ok(true)
    }

    /// Removes `hook` from the schedule. Returns `false` if it was not scheduled.
    pub fn unschedule(&self, hook: &str) -> HostResult<bool> {
        let mut jobs = self.load()?;
        if jobs.remove(hook).is_none() {
            return Ok(false);
        }
        self.save(&jobs)?;
        info!(hook, "Job unscheduled");
        Ok(true)
    }

    /// Unix seconds of the next run of `hook`, if scheduled.
    pub fn next_scheduled(&self, hook: &str) -> HostResult<Option<i64>> {
        Ok(self.load()?.get(hook).map(|j| j.next_run))
    }

    /// Every scheduled job, ordered by hook name.
    pub fn jobs(&self) -> HostResult<Vec<ScheduledJob>> {
        Ok(self.load()?.into_values().collect())
    }

    /// Runs every job due at `now` once, then advances it past `now` by
    /// whole intervals. Returns the number of callbacks invoked.
    ///
    /// The advanced schedule is saved before any callback runs, so a
    /// callback may unschedule its own hook. Persisted jobs with a
    /// non-positive interval are re-resolved by interval name, or dropped
    /// if the name is unknown.
    pub fn run_due(&self, now: i64) -> HostResult<usize> {
        let mut jobs = self.load()?;
        let mut changed = self.repair(&mut jobs);
        let mut due = Vec::new();
        let mut overflowed = Vec::new();

        for job in jobs.values_mut() {
            if job.next_run > now {
                continue;
            }
            match next_run_after(job, now) {
                Some(next_run) => {
                    job.next_run = next_run;
                    due.push(job.hook.clone());
                }
                None => overflowed.push(job.hook.clone()),
            }
        }
        for hook in overflowed {
            warn!(hook = %hook, "Dropping job whose next run is out of range");
            jobs.remove(&hook);
            changed = true;
        }

        if due.is_empty() {
            if changed {
                self.save(&jobs)?;
            }
            return Ok(0);
        }
        self.save(&jobs)?;

        let mut ran = 0;
        for hook in due {
            let callback = self
                .callbacks
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&hook)
                .cloned();
            match callback {
                Some(callback) => {
                    debug!(hook = %hook, "Running scheduled job");
                    callback();
                    ran += 1;
                }
                None => warn!(hook = %hook, "Scheduled job has no bound callback"),
            }
        }
        Ok(ran)
    }

    fn repair(&self, jobs: &mut JobTable) -> bool {
        let mut changed = false;
        jobs.retain(|hook, job| {
            if job.interval_secs > 0 {
                return true;
            }
            changed = true;
            match self.interval_secs(&job.interval) {
                Some(secs) => {
                    warn!(hook = %hook, interval = %job.interval, stored = job.interval_secs, "Repaired job interval");
                    job.interval_secs = secs;
                    true
                }
                None => {
                    warn!(hook = %hook, interval = %job.interval, "Dropping job with invalid interval");
                    false
                }
            }
        });
        changed
    }

    fn load(&self) -> HostResult<JobTable> {
        match self.store.get(CRON_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(JobTable::new()),
        }
    }

    fn save(&self, jobs: &JobTable) -> HostResult<()> {
        if jobs.is_empty() {
            self.store.delete(CRON_KEY)?;
        } else {
            self.store.set(CRON_KEY, serde_json::to_value(jobs)?, true)?;
        }
        Ok(())
    }
}

/// First run strictly after `now`, stepping from `job.next_run` by whole
/// intervals. `None` on overflow.
fn next_run_after(job: &ScheduledJob, now: i64) -> Option<i64> {
    let missed = now
        .checked_sub(job.next_run)?
        .checked_div(job.interval_secs)?
        .checked_add(1)?;
    missed
        .checked_mul(job.interval_secs)?
        .checked_add(job.next_run)
}
