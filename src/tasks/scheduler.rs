//! Tokio-backed one-shot timers for hosted views

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::debug;

use super::view_task::ViewCommand;
use crate::{
    engine::{Scheduler, TimerHandle},
    view::ControlEvent,
};

/// Each timer is a sleeping task that posts `TimerFired` back into the
/// owning view's command queue. Cancelling aborts the task.
pub struct TokioScheduler {
    ids: Arc<AtomicU64>,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
    commands: mpsc::UnboundedSender<ViewCommand>,
}

impl TokioScheduler {
    /// `ids` must outlive remounts of the view so a fire queued before a
    /// reload can never match a timer of the new mount.
    pub fn new(ids: Arc<AtomicU64>, commands: mpsc::UnboundedSender<ViewCommand>) -> Self {
        Self {
            ids,
            tasks: HashMap::new(),
            commands,
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        let handle = TimerHandle(self.ids.fetch_add(1, Ordering::Relaxed) + 1);
        let commands = self.commands.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let fired = ViewCommand::Event {
                event: ControlEvent::TimerFired(handle),
                reply: None,
            };
            if commands.send(fired).is_err() {
                debug!("View closed before timer {:?} fired", handle);
            }
        });

        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
