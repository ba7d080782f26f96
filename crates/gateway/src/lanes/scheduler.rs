//! Per-lane admission control.
//!
//! Every lane owns a FIFO queue, a running count and a concurrency limit.
//! Work is admitted strictly in enqueue order while `running < limit`;
//! everything else waits.  Lanes are created lazily on first reference
//! (limit 1) and are fully independent of each other.  Idle lanes that
//! were never configured can be pruned and are recreated on next use.
//!
//! An admitted unit of work holds a [`LanePermit`].  Dropping the permit
//! releases the slot and admits the next waiter, so the slot comes back
//! whether the work succeeds, fails, panics or is aborted.  Dropping a
//! still-queued [`LaneScheduler::acquire`] future withdraws it from the
//! queue without side effects.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Limit given to lanes that have never been configured.
pub const DEFAULT_LANE_CONCURRENCY: usize = 1;

/// Queue waits longer than this are logged when the work is admitted.
const SLOW_ADMISSION: Duration = Duration::from_secs(2);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, thiserror::Error)]
pub enum LaneError {
    #[error("lane \"{lane}\" was cleared while the task was queued")]
    Cleared { lane: String },
    #[error("task on lane \"{lane}\" was aborted")]
    Aborted { lane: String },
    #[error("task on lane \"{lane}\" panicked")]
    Panicked { lane: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lane state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Lane {
    name: String,
    state: Mutex<LaneState>,
}

struct LaneState {
    limit: usize,
    running: usize,
    queue: VecDeque<Waiter>,
    next_seq: u64,
    /// Limit came from `set_concurrency`; such lanes survive pruning.
    configured: bool,
}

struct Waiter {
    seq: u64,
    enqueued_at: Instant,
    admit: oneshot::Sender<LanePermit>,
}

impl Lane {
    fn new(name: &str, limit: usize) -> Self {
        Self {
            name: name.to_owned(),
            state: Mutex::new(LaneState {
                limit,
                running: 0,
                queue: VecDeque::new(),
                next_seq: 0,
                configured: false,
            }),
        }
    }

    /// Append a waiter and return its admission channel.
    fn push(&self) -> (u64, oneshot::Receiver<LanePermit>) {
        let (admit, rx) = oneshot::channel();
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.push_back(Waiter { seq, enqueued_at: Instant::now(), admit });
        (seq, rx)
    }

    /// Admit queued waiters while the lane has capacity.
    fn pump(self: &Arc<Self>) {
        loop {
            let waiter = {
                let mut state = self.state.lock();
                if state.running >= state.limit {
                    return;
                }
                let Some(waiter) = state.queue.pop_front() else {
                    return;
                };
                state.running += 1;
                waiter
            };

            let waited = waiter.enqueued_at.elapsed();
            if waited >= SLOW_ADMISSION {
                tracing::warn!(
                    lane = %self.name,
                    waited_ms = waited.as_millis() as u64,
                    "lane wait exceeded threshold"
                );
            }

            let permit = LanePermit { lane: Arc::clone(self), armed: true };
            if let Err(mut permit) = waiter.admit.send(permit) {
                // The waiter went away between being queued and admitted.
                permit.armed = false;
                let mut state = self.state.lock();
                state.running = state.running.saturating_sub(1);
            }
        }
    }

    fn release(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            state.running = state.running.saturating_sub(1);
        }
        self.pump();
    }

    fn withdraw(&self, seq: u64) {
        let mut state = self.state.lock();
        if let Some(pos) = state.queue.iter().position(|w| w.seq == seq) {
            state.queue.remove(pos);
            tracing::debug!(lane = %self.name, seq, "queued task withdrawn");
        }
    }

    fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.running == 0 && state.queue.is_empty()
    }

    fn snapshot(&self) -> LaneSnapshot {
        let state = self.state.lock();
        LaneSnapshot {
            name: self.name.clone(),
            limit: state.limit,
            running: state.running,
            queued: state.queue.len(),
        }
    }
}

/// Point-in-time view of one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneSnapshot {
    pub name: String,
    pub limit: usize,
    pub running: usize,
    pub queued: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Permits and admissions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A running slot on a lane.  Released on drop.
pub struct LanePermit {
    lane: Arc<Lane>,
    armed: bool,
}

impl LanePermit {
    pub fn lane(&self) -> &str {
        &self.lane.name
    }
}

impl Drop for LanePermit {
    fn drop(&mut self) {
        if self.armed {
            self.lane.release();
        }
    }
}

impl std::fmt::Debug for LanePermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanePermit").field("lane", &self.lane.name).finish()
    }
}

/// A queued entry.  Dropping it before admission withdraws it.
struct Admission {
    lane: Arc<Lane>,
    seq: u64,
    rx: oneshot::Receiver<LanePermit>,
    queued: bool,
}

impl Admission {
    async fn admitted(mut self) -> Result<LanePermit, LaneError> {
        let result = (&mut self.rx).await;
        self.queued = false;
        result.map_err(|_| LaneError::Cleared { lane: self.lane.name.clone() })
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if self.queued {
            self.lane.withdraw(self.seq);
        }
    }
}

/// Completion handle for work started with [`LaneScheduler::spawn`].
///
/// Awaiting it yields the task's output.  [`LaneTask::abort`] withdraws
/// the task if it is still queued, or cancels it and frees its slot if it
/// is running.
pub struct LaneTask<T> {
    lane: String,
    handle: JoinHandle<Result<T, LaneError>>,
}

impl<T> LaneTask<T> {
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn lane(&self) -> &str {
        &self.lane
    }
}

impl<T> Future for LaneTask<T> {
    type Output = Result<T, LaneError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(LaneError::Aborted { lane: this.lane.clone() }),
            Err(_) => Err(LaneError::Panicked { lane: this.lane.clone() }),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owns the lane table.  Construct once and share it behind an `Arc`.
pub struct LaneScheduler {
    lanes: RwLock<HashMap<String, Arc<Lane>>>,
}

impl Default for LaneScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl LaneScheduler {
    pub fn new() -> Self {
        Self {
            lanes: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create a lane.
    fn lane(&self, name: &str) -> Arc<Lane> {
        // Fast path: read lock.
        {
            let lanes = self.lanes.read();
            if let Some(lane) = lanes.get(name) {
                return lane.clone();
            }
        }
        // Slow path: write lock to insert.
        let mut lanes = self.lanes.write();
        lanes
            .entry(name.to_owned())
            .or_insert_with(|| {
                tracing::debug!(lane = name, limit = DEFAULT_LANE_CONCURRENCY, "lane created");
                Arc::new(Lane::new(name, DEFAULT_LANE_CONCURRENCY))
            })
            .clone()
    }

    fn enqueue(&self, name: &str) -> Admission {
        let lane = self.lane(name);
        let (seq, rx) = lane.push();
        lane.pump();
        Admission { lane, seq, rx, queued: true }
    }

    /// Set a lane's concurrency limit and return the effective value.
    ///
    /// Values below 1 are clamped to 1 with a warning.  Lowering the limit
    /// never interrupts running work; the lane simply admits nothing new
    /// until the running count drops below the new limit.  Raising it
    /// admits waiters immediately.
    pub fn set_concurrency(&self, name: &str, limit: i64) -> usize {
        let effective = if limit < 1 {
            tracing::warn!(lane = name, requested = limit, "invalid lane concurrency, clamping to 1");
            1
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };

        let lane = self.lane(name);
        let previous = {
            let mut state = lane.state.lock();
            state.configured = true;
            std::mem::replace(&mut state.limit, effective)
        };
        if previous != effective {
            tracing::info!(lane = name, previous, limit = effective, "lane concurrency updated");
        }
        lane.pump();
        effective
    }

    /// Wait for a slot on `lane`.  Hold the permit for the duration of the
    /// work; it releases on drop.
    pub async fn acquire(&self, lane: &str) -> Result<LanePermit, LaneError> {
        self.enqueue(lane).admitted().await
    }

    /// Run `task` on `lane` once admitted and return its output.
    pub async fn run<F, T>(&self, lane: &str, task: F) -> Result<T, LaneError>
    where
        F: Future<Output = T>,
    {
        let permit = self.acquire(lane).await?;
        let output = task.await;
        drop(permit);
        Ok(output)
    }

    /// Queue `task` on `lane` and drive it on the tokio runtime.
    ///
    /// The task takes its place in the FIFO before this returns, so calls
    /// made in sequence are admitted in that sequence.  Must be called
    /// from within a tokio runtime.
    pub fn spawn<F, T>(&self, lane: &str, task: F) -> LaneTask<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let admission = self.enqueue(lane);
        let handle = tokio::spawn(async move {
            let permit = admission.admitted().await?;
            let output = task.await;
            drop(permit);
            Ok(output)
        });
        LaneTask { lane: lane.to_owned(), handle }
    }

    /// Reject every queued (not yet running) task on `lane`.  Returns the
    /// number of tasks removed.
    pub fn clear(&self, lane: &str) -> usize {
        let Some(lane) = self.lanes.read().get(lane).cloned() else {
            return 0;
        };
        let removed = std::mem::take(&mut lane.state.lock().queue);
        if !removed.is_empty() {
            tracing::info!(lane = %lane.name, removed = removed.len(), "lane queue cleared");
        }
        removed.len()
    }

    pub fn lane_snapshot(&self, lane: &str) -> Option<LaneSnapshot> {
        self.lanes.read().get(lane).map(|l| l.snapshot())
    }

    /// Snapshot of every known lane, sorted by name.
    pub fn snapshot(&self) -> Vec<LaneSnapshot> {
        let mut lanes: Vec<_> = self.lanes.read().values().map(|l| l.snapshot()).collect();
        lanes.sort_by(|a, b| a.name.cmp(&b.name));
        lanes
    }

    /// Drop `lane` if it is idle and was never configured.  Returns whether
    /// it was removed.  The next reference recreates it with the default
    /// limit.
    pub fn prune_lane(&self, lane: &str) -> bool {
        let mut lanes = self.lanes.write();
        let removable = lanes.get(lane).is_some_and(is_prunable);
        if removable {
            lanes.remove(lane);
            tracing::trace!(lane, "idle lane pruned");
        }
        removable
    }

    /// Drop every idle, unconfigured lane.  Returns the number removed.
    pub fn prune_idle(&self) -> usize {
        let mut lanes = self.lanes.write();
        let before = lanes.len();
        lanes.retain(|_, lane| !is_prunable(lane));
        let removed = before - lanes.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = lanes.len(), "idle lanes pruned");
        }
        removed
    }

    /// Number of known lanes (for monitoring).
    pub fn lane_count(&self) -> usize {
        self.lanes.read().len()
    }
}

/// Only the table holds the lane (no permit, admission or caller between
/// lookup and enqueue), nothing runs or waits on it, and its limit is the
/// lazy default.  Callers hold the table's write lock.
fn is_prunable(lane: &Arc<Lane>) -> bool {
    Arc::strong_count(lane) == 1 && !lane.state.lock().configured && lane.is_idle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn settle() -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(30))
    }

    fn counts(s: &LaneScheduler, lane: &str) -> (usize, usize) {
        let snap = s.lane_snapshot(lane).unwrap();
        (snap.running, snap.queued)
    }

    #[tokio::test]
    async fn run_returns_task_output() {
        let s = LaneScheduler::new();
        assert_eq!(s.run("a", async { 42 }).await.unwrap(), 42);
        assert_eq!(counts(&s, "a"), (0, 0));
    }

    #[tokio::test]
    async fn lanes_are_created_lazily_with_limit_one() {
        let s = LaneScheduler::new();
        assert!(s.lane_snapshot("fresh").is_none());
        let _p = s.acquire("fresh").await.unwrap();
        let snap = s.lane_snapshot("fresh").unwrap();
        assert_eq!(snap.limit, DEFAULT_LANE_CONCURRENCY);
        assert_eq!(snap.running, 1);
        assert_eq!(s.lane_count(), 1);
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let s = Arc::new(LaneScheduler::new());
        s.set_concurrency("work", 2);

        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let current = current.clone();
                let peak = peak.clone();
                s.spawn("work", async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(counts(&s, "work"), (0, 0));
    }

    #[tokio::test]
    async fn next_task_waits_for_a_free_slot() {
        let s = LaneScheduler::new();
        s.set_concurrency("l", 2);
        let p1 = s.acquire("l").await.unwrap();
        let _p2 = s.acquire("l").await.unwrap();

        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let third = s.spawn("l", async move { flag.store(true, Ordering::SeqCst) });

        settle().await;
        assert!(!started.load(Ordering::SeqCst));
        assert_eq!(counts(&s, "l"), (2, 1));

        drop(p1);
        third.await.unwrap();
        assert!(started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn admission_is_fifo() {
        let s = LaneScheduler::new();
        let gate = s.acquire("fifo").await.unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let order = order.clone();
                s.spawn("fifo", async move { order.lock().push(i) })
            })
            .collect();

        settle().await;
        assert_eq!(counts(&s, "fifo"), (1, 5));
        drop(gate);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn completion_order_does_not_reorder_pending() {
        let s = LaneScheduler::new();
        s.set_concurrency("l", 2);
        let p1 = s.acquire("l").await.unwrap();
        let p2 = s.acquire("l").await.unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<_> = ["x", "y"]
            .into_iter()
            .map(|name| {
                let order = order.clone();
                s.spawn("l", async move { order.lock().push(name) })
            })
            .collect();
        settle().await;

        // Second holder finishes first; the earliest waiter still goes first.
        drop(p2);
        settle().await;
        drop(p1);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock(), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn failed_task_releases_its_slot() {
        let s = LaneScheduler::new();
        let out = s.run("l", async { Err::<(), _>("boom") }).await.unwrap();
        assert_eq!(out, Err("boom"));
        assert_eq!(counts(&s, "l"), (0, 0));
        assert_eq!(s.run("l", async { 1 }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn panicked_task_releases_its_slot() {
        let s = LaneScheduler::new();
        let task = s.spawn("l", async { panic!("task blew up") });
        assert!(matches!(task.await, Err(LaneError::Panicked { .. })));
        assert_eq!(counts(&s, "l"), (0, 0));
        assert_eq!(s.run("l", async { "ok" }).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn aborting_a_queued_task_has_no_side_effects() {
        let s = LaneScheduler::new();
        let gate = s.acquire("l").await.unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let queued = s.spawn("l", async move { flag.store(true, Ordering::SeqCst) });
        settle().await;
        assert_eq!(counts(&s, "l"), (1, 1));

        queued.abort();
        assert!(matches!(queued.await, Err(LaneError::Aborted { .. })));
        assert_eq!(counts(&s, "l"), (1, 0));

        drop(gate);
        settle().await;
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(counts(&s, "l"), (0, 0));
    }

    #[tokio::test]
    async fn aborting_a_running_task_releases_its_slot() {
        let s = LaneScheduler::new();
        let running = s.spawn("l", async { tokio::time::sleep(Duration::from_secs(60)).await });
        settle().await;
        assert_eq!(counts(&s, "l"), (1, 0));

        running.abort();
        assert!(matches!(running.await, Err(LaneError::Aborted { .. })));
        assert_eq!(counts(&s, "l"), (0, 0));
    }

    #[tokio::test]
    async fn dropping_a_pending_acquire_withdraws_it() {
        let s = LaneScheduler::new();
        let _gate = s.acquire("l").await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), s.acquire("l")).await;
        assert!(waited.is_err());
        assert_eq!(counts(&s, "l"), (1, 0));
    }

    #[tokio::test]
    async fn invalid_limits_are_clamped() {
        let s = LaneScheduler::new();
        assert_eq!(s.set_concurrency("l", 0), 1);
        assert_eq!(s.set_concurrency("l", -3), 1);
        assert_eq!(s.set_concurrency("l", 3), 3);
        assert_eq!(s.lane_snapshot("l").unwrap().limit, 3);
    }

    #[tokio::test]
    async fn raising_the_limit_admits_waiters() {
        let s = LaneScheduler::new();
        let _gate = s.acquire("l").await.unwrap();
        let a = s.spawn("l", async { "a" });
        let b = s.spawn("l", async { "b" });
        settle().await;
        assert_eq!(counts(&s, "l"), (1, 2));

        s.set_concurrency("l", 3);
        assert_eq!(a.await.unwrap(), "a");
        assert_eq!(b.await.unwrap(), "b");
    }

    #[tokio::test]
    async fn lowering_the_limit_does_not_preempt() {
        let s = LaneScheduler::new();
        s.set_concurrency("l", 3);
        let p1 = s.acquire("l").await.unwrap();
        let p2 = s.acquire("l").await.unwrap();
        let p3 = s.acquire("l").await.unwrap();

        s.set_concurrency("l", 1);
        assert_eq!(counts(&s, "l"), (3, 0));

        let next = s.spawn("l", async { "next" });
        settle().await;
        drop(p1);
        drop(p2);
        settle().await;
        // One still running and the limit is 1: nothing new admitted.
        assert_eq!(counts(&s, "l"), (1, 1));

        drop(p3);
        assert_eq!(next.await.unwrap(), "next");
    }

    #[tokio::test]
    async fn lanes_are_independent() {
        let s = LaneScheduler::new();
        let _busy = s.acquire("a").await.unwrap();
        let out = tokio::time::timeout(Duration::from_secs(1), s.run("b", async { 7 })).await;
        assert_eq!(out.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn clear_rejects_queued_tasks() {
        let s = LaneScheduler::new();
        let _gate = s.acquire("l").await.unwrap();
        let a = s.spawn("l", async {});
        let b = s.spawn("l", async {});
        settle().await;

        assert_eq!(s.clear("l"), 2);
        assert!(matches!(a.await, Err(LaneError::Cleared { .. })));
        assert!(matches!(b.await, Err(LaneError::Cleared { .. })));
        assert_eq!(counts(&s, "l"), (1, 0));
        assert_eq!(s.clear("unknown"), 0);
    }

    #[tokio::test]
    async fn finished_conversation_lanes_are_pruned() {
        let s = LaneScheduler::new();
        s.set_concurrency("main", 4);
        s.set_concurrency("agent:team", 2);

        for i in 0..500 {
            let lane = format!("session:peer{i}");
            s.run(&lane, async {}).await.unwrap();
        }
        assert_eq!(s.lane_count(), 502);

        assert_eq!(s.prune_idle(), 500);
        assert_eq!(s.lane_count(), 2);
        assert_eq!(s.lane_snapshot("agent:team").unwrap().limit, 2);
        assert_eq!(s.lane_snapshot("main").unwrap().limit, 4);
    }

    #[tokio::test]
    async fn busy_lanes_survive_pruning() {
        let s = LaneScheduler::new();
        let held = s.acquire("session:busy").await.unwrap();
        let queued = s.spawn("session:busy", async { "late" });
        settle().await;

        assert_eq!(s.prune_idle(), 0);
        assert!(!s.prune_lane("session:busy"));
        assert_eq!(counts(&s, "session:busy"), (1, 1));

        drop(held);
        assert_eq!(queued.await.unwrap(), "late");
        assert!(s.prune_lane("session:busy"));
        assert_eq!(s.lane_count(), 0);
    }

    #[tokio::test]
    async fn pruned_lane_is_recreated_on_next_use() {
        let s = LaneScheduler::new();
        s.run("session:a", async {}).await.unwrap();
        assert!(s.prune_lane("session:a"));
        assert!(s.lane_snapshot("session:a").is_none());

        // Fresh lane: default limit, still serializes.
        let first = s.acquire("session:a").await.unwrap();
        let second = s.spawn("session:a", async { 2 });
        settle().await;
        let snap = s.lane_snapshot("session:a").unwrap();
        assert_eq!((snap.limit, snap.running, snap.queued), (DEFAULT_LANE_CONCURRENCY, 1, 1));
        drop(first);
        assert_eq!(second.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn lane_held_by_a_caller_is_not_pruned() {
        let s = LaneScheduler::new();
        s.run("session:a", async {}).await.unwrap();
        // A lookup in progress holds its own reference to the lane.
        let in_flight = s.lane("session:a");
        assert!(!s.prune_lane("session:a"));
        drop(in_flight);
        assert!(s.prune_lane("session:a"));
        assert!(!s.prune_lane("unknown"));
    }

    #[tokio::test]
    async fn snapshot_is_sorted() {
        let s = LaneScheduler::new();
        s.set_concurrency("cron", 1);
        s.set_concurrency("agent:admin", 2);
        s.set_concurrency("main", 4);
        let names: Vec<_> = s.snapshot().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["agent:admin", "cron", "main"]);
    }
}
