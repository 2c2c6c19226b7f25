//! Background task driving one hosted view
//!
//! Every event source of a view (commands from the API, timer fires, storage
//! notifications from other views) is funnelled through this single loop, so
//! each handler runs to completion before the next event is looked at.

use std::sync::{atomic::AtomicU64, Arc};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::scheduler::TokioScheduler;
use crate::{
    engine::RefreshWindow,
    state::{ViewId, ViewSnapshot},
    store::{OriginStore, StorageEvent, StorageSubscription, Viewport},
    view::{ControlEvent, ControlView, ViewOutcome},
};

pub type EventReply = (ViewOutcome, ViewSnapshot);

#[derive(Debug)]
pub enum ViewCommand {
    Event {
        event: ControlEvent,
        reply: Option<oneshot::Sender<EventReply>>,
    },
    Close,
}

/// Host-side handle to a running view task
#[derive(Debug)]
pub struct ViewHandle {
    pub id: ViewId,
    pub commands: mpsc::UnboundedSender<ViewCommand>,
    pub snapshots: watch::Receiver<ViewSnapshot>,
    pub task: JoinHandle<()>,
}

enum Next {
    Command(Option<ViewCommand>),
    Storage(Option<StorageEvent>),
}

struct ViewTask {
    id: ViewId,
    origin: Arc<OriginStore>,
    window: RefreshWindow,
    timer_ids: Arc<AtomicU64>,
    commands_tx: mpsc::UnboundedSender<ViewCommand>,
    commands_rx: mpsc::UnboundedReceiver<ViewCommand>,
    snapshot_tx: watch::Sender<ViewSnapshot>,
    view: ControlView,
    subscription: StorageSubscription,
    reloads: u32,
    mounted_at: DateTime<Utc>,
}

/// Mount a view of `origin` and start its task. Must be called from within a
/// tokio runtime.
pub fn spawn_view(id: ViewId, origin: Arc<OriginStore>, viewport: Viewport, window: RefreshWindow) -> ViewHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let timer_ids = Arc::new(AtomicU64::new(0));

    let (view, subscription) = mount(&origin, viewport, window, &timer_ids, &commands_tx);
    let mounted_at = Utc::now();
    let (snapshot_tx, snapshots) = watch::channel(ViewSnapshot::capture(id, &view, 0, mounted_at));

    let task = ViewTask {
        id,
        origin,
        window,
        timer_ids,
        commands_tx: commands_tx.clone(),
        commands_rx,
        snapshot_tx,
        view,
        subscription,
        reloads: 0,
        mounted_at,
    };

    info!("View {} mounted in phase {:?}", id, task.view.phase());
    let task = tokio::spawn(task.run());

    ViewHandle {
        id,
        commands: commands_tx,
        snapshots,
        task,
    }
}

fn mount(
    origin: &Arc<OriginStore>,
    viewport: Viewport,
    window: RefreshWindow,
    timer_ids: &Arc<AtomicU64>,
    commands: &mpsc::UnboundedSender<ViewCommand>,
) -> (ControlView, StorageSubscription) {
    let handle = origin.handle();
    // Subscribe first so no change made during mount is missed
    let subscription = handle.subscribe();
    let scheduler = TokioScheduler::new(Arc::clone(timer_ids), commands.clone());
    let view = ControlView::mount(Arc::new(handle), Box::new(scheduler), viewport, window);
    (view, subscription)
}

impl ViewTask {
    async fn run(mut self) {
        loop {
            let next = tokio::select! {
                command = self.commands_rx.recv() => Next::Command(command),
                change = self.subscription.recv() => Next::Storage(change),
            };

            match next {
                Next::Command(Some(ViewCommand::Event { event, reply })) => {
                    let outcome = self.apply(event);
                    let snapshot = self.publish();
                    if let Some(reply) = reply {
                        if reply.send((outcome, snapshot)).is_err() {
                            debug!("View {}: caller went away before the reply", self.id);
                        }
                    }
                }
                Next::Command(Some(ViewCommand::Close)) | Next::Command(None) => break,
                Next::Storage(Some(change)) => {
                    self.apply(ControlEvent::Storage(change));
                    self.publish();
                }
                Next::Storage(None) => {
                    warn!("View {}: origin store change feed closed", self.id);
                    break;
                }
            }
        }

        info!("View {} closed", self.id);
    }

    fn apply(&mut self, event: ControlEvent) -> ViewOutcome {
        let outcome = self.view.handle(event);
        if outcome == ViewOutcome::Reload {
            self.reload();
        }
        outcome
    }

    /// Discard the in-memory state and mount again, re-reading persisted keys
    fn reload(&mut self) {
        let viewport = self.view.viewport();
        let (view, subscription) = mount(
            &self.origin,
            viewport,
            self.window,
            &self.timer_ids,
            &self.commands_tx,
        );

        // Replacing the view drops the old engine and scheduler, cancelling
        // anything still pending there
        self.view = view;
        self.subscription = subscription;
        self.reloads += 1;
        self.mounted_at = Utc::now();
        info!("View {} reloaded ({} so far), phase {:?}", self.id, self.reloads, self.view.phase());
    }

    fn publish(&self) -> ViewSnapshot {
        let snapshot = ViewSnapshot::capture(self.id, &self.view, self.reloads, self.mounted_at);
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}
