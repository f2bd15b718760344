use std::{
    collections::HashMap,
    hash::Hash,
    time::{Duration, Instant},
};

use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    FadeIn,
    FadeOut,
    Delay,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    kind: TaskKind,
    started: Instant,
    duration: Duration,
}

/// Where a running task stands after `advance`
#[derive(Debug, Clone, PartialEq)]
pub struct TaskProgress<K> {
    pub key: K,
    pub kind: TaskKind,
    /// 0 at start, 1 when finished
    pub fraction: f32,
    pub finished: bool,
}

impl<K> TaskProgress<K> {
    /// Opacity a fade implies at this point
    pub fn opacity(&self) -> f32 {
        match self.kind {
            TaskKind::FadeIn => self.fraction,
            TaskKind::FadeOut => 1.0 - self.fraction,
            TaskKind::Delay => 1.0,
        }
    }
}

/// Timed tasks keyed by entity. Starting a task for a key cancels whatever
/// was running for it; nothing queues.
pub struct TaskScheduler<K: Eq + Hash + Clone> {
    tasks: HashMap<K, Task>,
}

impl<K: Eq + Hash + Clone> Default for TaskScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> TaskScheduler<K> {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Returns the kind of the task this one replaced
    pub fn start(
        &mut self,
        key: K,
        kind: TaskKind,
        duration: Duration,
        now: Instant,
    ) -> Option<TaskKind> {
        let replaced = self.tasks.insert(
            key,
            Task {
                kind,
                started: now,
                duration,
            },
        );
        if let Some(task) = &replaced {
            trace!("{:?} task canceled by {:?}", task.kind, kind);
        }
        replaced.map(|task| task.kind)
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.tasks.remove(key).is_some()
    }

    pub fn is_running(&self, key: &K) -> bool {
        self.tasks.contains_key(key)
    }

    pub fn kind_of(&self, key: &K) -> Option<TaskKind> {
        self.tasks.get(key).map(|task| task.kind)
    }

    /// Progress of every task at `now`. Finished tasks are reported once and
    /// removed.
    pub fn advance(&mut self, now: Instant) -> Vec<TaskProgress<K>> {
        let mut progress = Vec::with_capacity(self.tasks.len());
        self.tasks.retain(|key, task| {
            let elapsed = now.saturating_duration_since(task.started);
            let finished = elapsed >= task.duration;
            let fraction = if finished {
                1.0
            } else {
                elapsed.as_secs_f32() / task.duration.as_secs_f32()
            };
            progress.push(TaskProgress {
                key: key.clone(),
                kind: task.kind,
                fraction,
                finished,
            });
            !finished
        });
        progress
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
}
