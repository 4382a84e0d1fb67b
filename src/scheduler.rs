//! Cancellable timers for the dashboard view.
//!
//! Timers do not call into the view directly. They produce [FiredTimer]s that
//! the owner of the view applies one at a time, so every event runs to
//! completion before the next one starts. Each fired timer names the task
//! that produced it, so events from cancelled tasks can be told apart from
//! events of tasks scheduled later.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Repeating timers fire at most this often.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// What happened when a timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Time to add a simulated transaction.
    Tick,
    /// The refresh delay has elapsed.
    RefreshCompleted,
}

/// Identifies a scheduled task so that it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// A timer event together with the task that emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// The task that fired.
    pub task: TaskId,
    /// What happened.
    pub event: TimerEvent,
}

/// Whether a task fires once or keeps firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fire once after the delay.
    Once,
    /// Fire after the delay and then every time the delay elapses again.
    Every,
}

/// A capability for scheduling cancellable timer events.
pub trait Scheduler {
    /// Emit `event` after `delay`, and then every `delay` if `repeat` is
    /// [Repeat::Every].
    fn schedule(&mut self, event: TimerEvent, delay: Duration, repeat: Repeat) -> TaskId;

    /// Stop `task` from firing again. Cancelling a finished or unknown task
    /// does nothing.
    fn cancel(&mut self, task: TaskId);

    /// The number of tasks that may still fire.
    fn pending(&self) -> usize;
}

/// Schedules timers as tokio tasks that send their events to a channel.
#[derive(Debug)]
pub struct TokioScheduler {
    sender: UnboundedSender<FiredTimer>,
    tasks: HashMap<TaskId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its events are sent to.
    ///
    /// Must be used from within a tokio runtime.
    pub fn new() -> (Self, UnboundedReceiver<FiredTimer>) {
        let (sender, receiver) = unbounded_channel();

        let scheduler = Self {
            sender,
            tasks: HashMap::new(),
            next_id: 0,
        };

        (scheduler, receiver)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, event: TimerEvent, delay: Duration, repeat: Repeat) -> TaskId {
        self.tasks.retain(|_, handle| !handle.is_finished());

        self.next_id += 1;
        let id = TaskId(self.next_id);
        let sender = self.sender.clone();
        let fired = FiredTimer { task: id, event };

        let handle = match repeat {
            Repeat::Once => tokio::spawn(async move {
                time::sleep(delay).await;

                if sender.send(fired).is_err() {
                    tracing::debug!("timer event {event:?} dropped, the receiver is closed");
                }
            }),
            Repeat::Every => tokio::spawn(async move {
                let period = delay.max(MIN_PERIOD);
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    interval.tick().await;

                    if sender.send(fired).is_err() {
                        tracing::debug!("stopping {event:?} timer, the receiver is closed");
                        break;
                    }
                }
            }),
        };

        tracing::debug!("scheduled {event:?} as task {id:?} ({repeat:?}, {delay:?})");
        self.tasks.insert(id, handle);

        id
    }

    fn cancel(&mut self, task: TaskId) {
        if let Some(handle) = self.tasks.remove(&task) {
            handle.abort();
            tracing::debug!("cancelled task {task:?}");
        }
    }

    fn pending(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ManualTask {
    event: TimerEvent,
    due: Duration,
    period: Option<Duration>,
}

/// A fake clock that only moves when told to.
///
/// Time starts at zero. Call [ManualScheduler::pop_due] to fire tasks one at
/// a time, or [ManualScheduler::advance] to fire everything due within a
/// period.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    tasks: BTreeMap<TaskId, ManualTask>,
}

impl ManualScheduler {
    /// Create a scheduler whose clock reads zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The time elapsed on the fake clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire the earliest task due at or before `deadline`, moving the clock to
    /// its due time.
    ///
    /// Tasks due at the same time fire in the order they were scheduled.
    /// Returns `None` and leaves the clock untouched if nothing is due.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<FiredTimer> {
        let (&id, &task) = self
            .tasks
            .iter()
            .filter(|(_, task)| task.due <= deadline)
            .min_by_key(|(id, task)| (task.due, **id))?;

        self.now = self.now.max(task.due);

        match task.period {
            Some(period) => {
                if let Some(entry) = self.tasks.get_mut(&id) {
                    entry.due += period;
                }
            }
            None => {
                self.tasks.remove(&id);
            }
        }

        Some(FiredTimer {
            task: id,
            event: task.event,
        })
    }

    /// Move the clock to `deadline` without firing anything.
    ///
    /// The clock never moves backwards.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Fire every task due within `by` of now, in order, and move the clock
    /// forward by `by`.
    pub fn advance(&mut self, by: Duration) -> Vec<FiredTimer> {
        let deadline = self.now + by;
        let mut fired = Vec::new();

        while let Some(timer) = self.pop_due(deadline) {
            fired.push(timer);
        }

        self.advance_to(deadline);
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, event: TimerEvent, delay: Duration, repeat: Repeat) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);

        let period = match repeat {
            Repeat::Once => None,
            Repeat::Every => Some(delay.max(MIN_PERIOD)),
        };
        let first_delay = period.unwrap_or(delay);

        self.tasks.insert(
            id,
            ManualTask {
                event,
                due: self.now + first_delay,
                period,
            },
        );

        id
    }

    fn cancel(&mut self, task: TaskId) {
        self.tasks.remove(&task);
    }

    fn pending(&self) -> usize {
        self.tasks.len()
    }
}
