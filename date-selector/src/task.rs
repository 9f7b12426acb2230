//! One-shot work deferred to a later frame.
//!
//! Nothing runs in the background. Deferred work is a list of tasks the host
//! drains by ticking the controller once per rendered frame. Every task
//! carries the [`Generation`] of the operation that scheduled it; a reset
//! moves the live generation forward and everything older is dropped
//! unexecuted.

use std::time::Instant;

use smallvec::SmallVec;
use tracing::trace;

use crate::controller::ScrollRequest;

/// Monotonically increasing tag of extension and reset operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The following generation.
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What a deferred task does when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Clears the forward in-flight flag.
    ReleaseForward,
    /// Clears the backward in-flight flag when the host never confirmed the
    /// correction scroll.
    ReleaseBackward,
    /// Requests the reset's centering scroll again.
    RetryCentering,
    /// Re-issues a scroll request the host could not apply.
    RetryScroll(ScrollRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    NextFrame,
    At(Instant),
}

#[derive(Debug, Clone, Copy)]
struct FrameTask {
    generation: Generation,
    due: Due,
    kind: TaskKind,
}

/// Queue of deferred tasks, drained by [`FrameTasks::take_due`].
#[derive(Debug, Default, Clone)]
pub struct FrameTasks {
    tasks: SmallVec<[FrameTask; 4]>,
}

impl FrameTasks {
    /// Runs `kind` on the next frame tick.
    pub fn next_frame(&mut self, generation: Generation, kind: TaskKind) {
        self.tasks.push(FrameTask {
            generation,
            due: Due::NextFrame,
            kind,
        });
    }

    /// Runs `kind` on the first frame tick at or after `at`.
    pub fn at(&mut self, generation: Generation, at: Instant, kind: TaskKind) {
        self.tasks.push(FrameTask {
            generation,
            due: Due::At(at),
            kind,
        });
    }

    /// Removes every task matching `predicate` without running it.
    pub fn cancel(&mut self, predicate: impl Fn(&TaskKind) -> bool) {
        self.tasks.retain(|task| !predicate(&task.kind));
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes and returns the tasks due at `now`, oldest first.
    ///
    /// Tasks scheduled before `live_since` belong to a superseded window and
    /// are discarded.
    pub fn take_due(&mut self, now: Instant, live_since: Generation) -> SmallVec<[TaskKind; 4]> {
        let mut due = SmallVec::new();
        let mut index = 0;
        while index < self.tasks.len() {
            let task = self.tasks[index];
            if task.generation < live_since {
                trace!(generation = task.generation.raw(), kind = ?task.kind, "dropping stale task");
                self.tasks.remove(index);
                continue;
            }
            let ready = match task.due {
                Due::NextFrame => true,
                Due::At(at) => at <= now,
            };
            if ready {
                due.push(task.kind);
                self.tasks.remove(index);
            } else {
                index += 1;
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn next_frame_tasks_run_on_first_tick() {
        let mut tasks = FrameTasks::default();
        let now = Instant::now();
        let generation = Generation::default().next();
        tasks.next_frame(generation, TaskKind::ReleaseForward);

        let due = tasks.take_due(now, Generation::default());
        assert_eq!(due.as_slice(), &[TaskKind::ReleaseForward]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn timed_tasks_wait_for_their_instant() {
        let mut tasks = FrameTasks::default();
        let start = Instant::now();
        let generation = Generation::default();
        tasks.at(
            generation,
            start + Duration::from_millis(100),
            TaskKind::RetryCentering,
        );

        assert!(tasks.take_due(start, generation).is_empty());
        assert!(
            tasks
                .take_due(start + Duration::from_millis(99), generation)
                .is_empty()
        );
        assert_eq!(tasks.len(), 1);

        let due = tasks.take_due(start + Duration::from_millis(100), generation);
        assert_eq!(due.as_slice(), &[TaskKind::RetryCentering]);
    }

    #[test]
    fn stale_generations_are_dropped() {
        let mut tasks = FrameTasks::default();
        let old = Generation::default().next();
        let current = old.next();
        tasks.next_frame(old, TaskKind::ReleaseForward);
        tasks.next_frame(current, TaskKind::RetryCentering);

        let due = tasks.take_due(Instant::now(), current);
        assert_eq!(due.as_slice(), &[TaskKind::RetryCentering]);
        assert!(tasks.is_empty());
    }

    #[test]
    fn cancel_removes_matching_kinds() {
        let mut tasks = FrameTasks::default();
        let generation = Generation::default();
        tasks.next_frame(generation, TaskKind::ReleaseForward);
        tasks.at(generation, Instant::now(), TaskKind::RetryCentering);

        tasks.cancel(|kind| matches!(kind, TaskKind::RetryCentering));

        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks.take_due(Instant::now(), generation).as_slice(),
            &[TaskKind::ReleaseForward]
        );
    }

    #[test]
    fn generations_increase() {
        let first = Generation::default();
        assert!(first.next() > first);
        assert_eq!(first.next().next().raw(), 2);
    }
}
