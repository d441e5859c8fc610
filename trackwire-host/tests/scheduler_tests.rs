use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trackwire_host::{HostError, ScheduledJob, Scheduler, CRON_KEY};
use trackwire_store::{KeyValueStore, MemoryStore};

const WEEK: i64 = 7 * 24 * 60 * 60;

fn counter() -> (Arc<AtomicUsize>, trackwire_host::JobCallback) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let callback: trackwire_host::JobCallback = Arc::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (count, callback)
}

// ── Intervals ───────────────────────────────────────────────────

#[test]
fn builtin_intervals_resolve() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    assert_eq!(scheduler.interval_secs("hourly"), Some(3600));
    assert_eq!(scheduler.interval_secs("twicedaily"), Some(43_200));
    assert_eq!(scheduler.interval_secs("daily"), Some(86_400));
    assert_eq!(scheduler.interval_secs("weekly"), Some(WEEK));
    assert_eq!(scheduler.interval_secs("fortnightly"), None);
}

#[test]
fn custom_interval_can_be_added() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    scheduler.add_interval("fortnightly", 2 * WEEK).unwrap();
    assert_eq!(scheduler.interval_secs("fortnightly"), Some(2 * WEEK));
}

#[test]
fn non_positive_interval_is_rejected() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let err = scheduler.add_interval("never", 0).unwrap_err();
    assert!(matches!(err, HostError::InvalidInterval { .. }));
}

// ── Scheduling ──────────────────────────────────────────────────

#[test]
fn schedule_persists_job_in_store() {
    let store = Arc::new(MemoryStore::new());
    let scheduler = Scheduler::new(store.clone());

    assert!(scheduler.schedule("acme_send_system_info", "weekly", 1000).unwrap());
    assert!(store.contains(CRON_KEY));
    assert_eq!(
        scheduler.jobs().unwrap(),
        vec![ScheduledJob {
            hook: "acme_send_system_info".into(),
            interval: "weekly".into(),
            interval_secs: WEEK,
            next_run: 1000,
        }]
    );
}

#[test]
fn schedule_is_noop_when_already_scheduled() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    assert!(scheduler.schedule("h", "weekly", 1000).unwrap());
    assert!(!scheduler.schedule("h", "daily", 5000).unwrap());
    assert_eq!(scheduler.next_scheduled("h").unwrap(), Some(1000));
}

#[test]
fn schedule_unknown_interval_fails() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let err = scheduler.schedule("h", "monthly", 0).unwrap_err();
    assert!(matches!(err, HostError::UnknownInterval(name) if name == "monthly"));
}

#[test]
fn unschedule_removes_job_and_clears_slot_when_empty() {
    let store = Arc::new(MemoryStore::new());
    let scheduler = Scheduler::new(store.clone());
    scheduler.schedule("h", "hourly", 0).unwrap();

    assert!(scheduler.unschedule("h").unwrap());
    assert!(!scheduler.unschedule("h").unwrap());
    assert_eq!(scheduler.next_scheduled("h").unwrap(), None);
    assert!(store.get(CRON_KEY).unwrap().is_none());
}

#[test]
fn schedule_survives_new_scheduler_on_same_store() {
    let store = Arc::new(MemoryStore::new());
    Scheduler::new(store.clone()).schedule("h", "daily", 42).unwrap();
    assert_eq!(Scheduler::new(store).next_scheduled("h").unwrap(), Some(42));
}

// ── Running ─────────────────────────────────────────────────────

#[test]
fn run_due_skips_jobs_not_yet_due() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let (count, cb) = counter();
    scheduler.bind("h", cb);
    scheduler.schedule("h", "weekly", 1000).unwrap();

    assert_eq!(scheduler.run_due(999).unwrap(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn run_due_runs_once_and_advances() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let (count, cb) = counter();
    scheduler.bind("h", cb);
    scheduler.schedule("h", "weekly", 1000).unwrap();

    assert_eq!(scheduler.run_due(1000).unwrap(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.next_scheduled("h").unwrap(), Some(1000 + WEEK));

    assert_eq!(scheduler.run_due(1000 + WEEK - 1).unwrap(), 0);
}

#[test]
fn run_due_collapses_missed_runs() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let (count, cb) = counter();
    scheduler.bind("h", cb);
    scheduler.schedule("h", "hourly", 0).unwrap();

    assert_eq!(scheduler.run_due(3 * 3600 + 10).unwrap(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.next_scheduled("h").unwrap(), Some(4 * 3600));
}

#[test]
fn run_due_without_binding_advances_but_runs_nothing() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    scheduler.schedule("h", "hourly", 0).unwrap();
    assert_eq!(scheduler.run_due(10).unwrap(), 0);
    assert_eq!(scheduler.next_scheduled("h").unwrap(), Some(3600));
}

#[test]
fn callback_may_unschedule_itself() {
    let store = Arc::new(MemoryStore::new());
    let scheduler = Arc::new(Scheduler::new(store));
    let weak = Arc::downgrade(&scheduler);
    scheduler.bind(
        "h",
        Arc::new(move || {
            if let Some(s) = weak.upgrade() {
                s.unschedule("h").unwrap();
            }
        }),
    );
    scheduler.schedule("h", "hourly", 0).unwrap();

    assert_eq!(scheduler.run_due(0).unwrap(), 1);
    assert_eq!(scheduler.next_scheduled("h").unwrap(), None);
}

#[test]
fn unbind_stops_callback() {
    let scheduler = Scheduler::new(Arc::new(MemoryStore::new()));
    let (count, cb) = counter();
    scheduler.bind("h", cb);
    assert!(scheduler.is_bound("h"));
    scheduler.unbind("h");
    assert!(!scheduler.is_bound("h"));

    scheduler.schedule("h", "hourly", 0).unwrap();
    scheduler.run_due(0).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

// ── Corrupt persisted jobs ──────────────────────────────────────

fn seed_job(store: &MemoryStore, interval: &str, interval_secs: i64, next_run: i64) {
    let job = serde_json::json!({
        "acme_send_system_info": {
            "hook": "acme_send_system_info",
            "interval": interval,
            "interval_secs": interval_secs,
            "next_run": next_run,
        }
    });
    store.set(CRON_KEY, job, true).unwrap();
}

#[test]
fn zero_interval_job_is_repaired_from_its_name() {
    let store = Arc::new(MemoryStore::new());
    seed_job(&store, "weekly", 0, 0);
    let scheduler = Scheduler::new(store.clone());
    let (count, callback) = counter();
    scheduler.bind("acme_send_system_info", callback);

    assert_eq!(scheduler.run_due(1_700_000_000).unwrap(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 1);

    let job = &scheduler.jobs().unwrap()[0];
    assert_eq!(job.interval_secs, WEEK);
    assert!(job.next_run > 1_700_000_000);
    assert!(job.next_run <= 1_700_000_000 + WEEK);
}

#[test]
fn negative_interval_job_is_repaired_before_it_is_due() {
    let store = Arc::new(MemoryStore::new());
    seed_job(&store, "daily", -5, 2_000_000_000);
    let scheduler = Scheduler::new(store);

    assert_eq!(scheduler.run_due(1_700_000_000).unwrap(), 0);
    let job = &scheduler.jobs().unwrap()[0];
    assert_eq!(job.interval_secs, 86_400);
    assert_eq!(job.next_run, 2_000_000_000);
}

#[test]
fn zero_interval_job_with_unknown_name_is_dropped() {
    let store = Arc::new(MemoryStore::new());
    seed_job(&store, "fortnightly", 0, 0);
    let scheduler = Scheduler::new(store.clone());
    let (count, callback) = counter();
    scheduler.bind("acme_send_system_info", callback);

    assert_eq!(scheduler.run_due(1_700_000_000).unwrap(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(scheduler.jobs().unwrap().is_empty());
    assert!(!store.contains(CRON_KEY));
}

#[test]
fn job_whose_next_run_overflows_is_dropped() {
    let store = Arc::new(MemoryStore::new());
    seed_job(&store, "weekly", WEEK, i64::MIN);
    let scheduler = Scheduler::new(store.clone());
    let (count, callback) = counter();
    scheduler.bind("acme_send_system_info", callback);

    assert_eq!(scheduler.run_due(i64::MAX).unwrap(), 0);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!store.contains(CRON_KEY));
}
