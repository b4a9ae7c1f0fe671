use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    effects::{EffectChannel, EffectStream},
    events::{TaskScreenEffect, TaskScreenEvent},
    reducer::{reduce, resolve, CallOutcome, FollowUp, RepositoryCall},
    repository::TaskRepository,
    state::TasksScreenState,
    store::{StateStore, Subscription},
};

/// Owns the task screen state and drives it from events.
///
/// `send_event` never blocks on the repository: the synchronous part of the
/// transition is stored before it returns, and any repository call runs as a
/// task on `runtime`. When the call finishes its outcome is applied to the
/// snapshot current at that moment. Follow-up dispatches (such as reloading
/// after an add) re-enter `send_event` directly, so their synchronous part is
/// stored before the next follow-up runs.
///
/// Concurrent calls are not sequenced: the last one to finish decides the
/// final `is_loading` and `tasks`.
#[derive(Clone)]
pub struct TaskScreenController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    store: StateStore<TasksScreenState>,
    effects: EffectChannel<TaskScreenEffect>,
    repository: Arc<dyn TaskRepository>,
    runtime: Handle,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskScreenController {
    pub fn new(repository: Arc<dyn TaskRepository>, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                store: StateStore::default(),
                effects: EffectChannel::new(),
                repository,
                runtime,
                in_flight: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Creates a controller, attaches the effect consumer and kicks off the
    /// initial task load. The consumer is attached first so a failing initial
    /// load is still reported.
    pub fn start(
        repository: Arc<dyn TaskRepository>,
        runtime: Handle,
    ) -> (Self, EffectStream<TaskScreenEffect>) {
        let controller = Self::new(repository, runtime);
        let effects = controller.effects();
        controller.send_event(TaskScreenEvent::GetTasks);
        (controller, effects)
    }

    pub fn send_event(&self, event: TaskScreenEvent) {
        debug!(event = event.name(), "dispatching task screen event");
        let mut call = None;
        self.inner.store.update(|state| {
            let transition = reduce(state, event);
            call = transition.call;
            transition.state
        });
        if let Some(call) = call {
            self.spawn_call(call);
        }
    }

    pub fn state(&self) -> TasksScreenState {
        self.inner.store.state()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TasksScreenState) + Send + Sync + 'static,
    {
        self.inner.store.subscribe(listener)
    }

    /// Attaches the effect consumer. Only effects emitted after this call are
    /// delivered to it.
    pub fn effects(&self) -> EffectStream<TaskScreenEffect> {
        self.inner.effects.consume()
    }

    /// Waits for every repository call started so far, including calls
    /// started by follow-up dispatches while waiting.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.inner.in_flight.lock());
            if pending.is_empty() {
                break;
            }
            for result in join_all(pending).await {
                if let Err(error) = result {
                    warn!(%error, "task screen repository call did not complete");
                }
            }
        }
    }

    fn spawn_call(&self, call: RepositoryCall) {
        debug!(call = call.name(), "starting repository call");
        let controller = self.clone();
        let handle = self.inner.runtime.spawn(async move {
            let outcome = controller.execute(call).await;
            controller.apply(outcome);
        });

        let mut in_flight = self.inner.in_flight.lock();
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
    }

    async fn execute(&self, call: RepositoryCall) -> CallOutcome {
        let repository = &self.inner.repository;
        match call {
            RepositoryCall::GetAllTasks => CallOutcome::TasksFetched(repository.get_all_tasks().await),
            RepositoryCall::AddTask { title, body } => {
                CallOutcome::TaskAdded(repository.add_task(&title, &body).await)
            }
            RepositoryCall::DeleteTask { task_id } => {
                CallOutcome::TaskDeleted(repository.delete_task(&task_id).await)
            }
            RepositoryCall::UpdateTask {
                task_id,
                title,
                body,
            } => CallOutcome::TaskUpdated(repository.update_task(&task_id, &title, &body).await),
        }
    }

    fn apply(&self, outcome: CallOutcome) {
        let mut follow_ups = Vec::new();
        self.inner.store.update(|state| {
            let resolution = resolve(state, outcome);
            follow_ups = resolution.follow_ups;
            resolution.state
        });

        for follow_up in follow_ups {
            match follow_up {
                FollowUp::Emit(effect) => {
                    debug!(message = effect.message(), "emitting task screen effect");
                    self.inner.effects.emit(effect);
                }
                FollowUp::Dispatch(event) => self.send_event(event),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
