//! In-memory queue implementation.
//!
//! Tasks are stored in their encoded form and decoded on every read, so
//! the storage codec is exercised exactly as it would be against a real
//! broker, and a corrupt record stays an isolated failure.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tracing::warn;

use super::{Queue, TaskFilter};
use crate::codec::TaskCodec;
use crate::domain::{ConveyorError, Profile, Status, Task, TaskId};
use crate::observability::QueueCounts;

struct InMemoryQueueState {
    /// Encoded records, the single source of truth.
    records: HashMap<TaskId, Vec<u8>>,

    /// Waiting tasks per lane. BTreeMap so lane scan order is stable.
    ready: BTreeMap<Profile, VecDeque<TaskId>>,

    closed: bool,
}

impl InMemoryQueueState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            ready: BTreeMap::new(),
            closed: false,
        }
    }

    /// Pop the next waiting task id, restricted to one lane when given.
    fn pop_ready(&mut self, profile: Option<&Profile>) -> Option<TaskId> {
        match profile {
            Some(profile) => self.ready.get_mut(profile)?.pop_front(),
            None => self.ready.values_mut().find_map(VecDeque::pop_front),
        }
    }
}

pub struct InMemoryQueue {
    codec: TaskCodec,
    state: Mutex<InMemoryQueueState>,
    notify: Notify,
}

impl InMemoryQueue {
    pub fn new(codec: TaskCodec) -> Self {
        Self {
            codec,
            state: Mutex::new(InMemoryQueueState::new()),
            notify: Notify::new(),
        }
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Shut the queue down: pending `reserve` calls return `None`.
    /// In-flight tasks are unaffected; their final `update` still
    /// lands.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        drop(state);
        self.notify.notify_waiters();
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn enqueue(&self, task: Task) -> Result<(), ConveyorError> {
        let encoded = self.codec.encode(&task)?;

        let mut state = self.state.lock().await;
        state.records.insert(task.id(), encoded);
        if task.status().is_runnable() {
            state
                .ready
                .entry(task.profile().clone())
                .or_default()
                .push_back(task.id());
        }
        drop(state);

        self.notify.notify_one();
        Ok(())
    }

    async fn reserve(&self, profile: Option<&Profile>) -> Option<Task> {
        loop {
            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return None;
                }

                while let Some(id) = state.pop_ready(profile) {
                    // Popping the id is the exclusive claim: no other
                    // worker can reach this task anymore.
                    let Some(bytes) = state.records.get(&id) else {
                        continue;
                    };
                    match self.codec.decode(bytes) {
                        Ok(task) => return Some(task),
                        Err(e) => {
                            // Fatal for this record only; drop it and
                            // keep serving the lane.
                            warn!(task = %id, error = %e, "dropping undecodable record");
                            state.records.remove(&id);
                        }
                    }
                }
            }

            self.notify.notified().await;
        }
    }

    async fn update(&self, task: &Task) -> Result<(), ConveyorError> {
        let encoded = self.codec.encode(task)?;

        let mut state = self.state.lock().await;
        let Some(bytes) = state.records.get(&task.id()) else {
            return Err(ConveyorError::NotFound(task.id()));
        };

        if let Ok(stored) = self.codec.decode(bytes) {
            let current = stored.status();
            if current.is_terminal() && current != task.status() {
                warn!(
                    task = %task.id(),
                    current = %current,
                    requested = %task.status(),
                    "ignoring transition out of a terminal status"
                );
                return Ok(());
            }
        }

        state.records.insert(task.id(), encoded);
        Ok(())
    }

    async fn find(&self, id: TaskId) -> Result<Task, ConveyorError> {
        let state = self.state.lock().await;
        let bytes = state.records.get(&id).ok_or(ConveyorError::NotFound(id))?;
        self.codec.decode(bytes)
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ConveyorError> {
        let state = self.state.lock().await;
        let mut tasks: Vec<Task> = Vec::with_capacity(state.records.len());
        for (id, bytes) in &state.records {
            match self.codec.decode(bytes) {
                Ok(task) => {
                    if filter.matches(&task) {
                        tasks.push(task);
                    }
                }
                Err(e) => warn!(task = %id, error = %e, "skipping undecodable record"),
            }
        }
        // ULIDs sort by creation time.
        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    async fn counts(&self) -> Result<QueueCounts, ConveyorError> {
        let filter = TaskFilter::default();
        let mut counts = QueueCounts::default();
        for task in self.list(&filter).await? {
            match task.status() {
                Status::Waiting => counts.waiting += 1,
                Status::Running => counts.running += 1,
                Status::Succeeded => counts.succeeded += 1,
                Status::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }
}
