//! Single-consumer queue of persona change events.
//!
//! Change notifications may arrive while a switch is still running; the
//! dispatcher drains them strictly one at a time so merge-on-save never sees
//! a half-finished switch.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use super::coordinator::PersonaSwitchCoordinator;
use super::error::{SwitchError, SwitchOutcome};
use super::SwitchEvent;

/// Number of completions buffered for slow subscribers.
const COMPLETION_CAPACITY: usize = 64;

/// Completion signal published after each switch event is processed.
#[derive(Debug, Clone)]
pub struct SwitchCompletion {
    /// The event that was processed.
    pub event: SwitchEvent,
    /// Outcome, or the rendered error that aborted the switch.
    pub outcome: Result<SwitchOutcome, String>,
}

enum DispatchMessage {
    Switch(SwitchEvent),
    Drain,
}

/// Cloneable handle for enqueueing change events.
#[derive(Debug, Clone)]
pub struct SwitchNotifier {
    sender: mpsc::UnboundedSender<DispatchMessage>,
}

impl std::fmt::Debug for DispatchMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch(event) => f.debug_tuple("Switch").field(event).finish(),
            Self::Drain => f.write_str("Drain"),
        }
    }
}

impl SwitchNotifier {
    /// Enqueues a change of the active-persona pointer.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::DispatcherClosed`] after the dispatcher shut down.
    pub fn notify(&self, event: SwitchEvent) -> Result<(), SwitchError> {
        debug!(old = ?event.old, new = ?event.new, "enqueueing persona switch");
        self.sender
            .send(DispatchMessage::Switch(event))
            .map_err(|_| SwitchError::DispatcherClosed)
    }
}

/// Background task that runs queued switches through a coordinator.
pub struct SwitchDispatcher {
    notifier: SwitchNotifier,
    completions: broadcast::Sender<SwitchCompletion>,
    worker: JoinHandle<()>,
}

impl SwitchDispatcher {
    /// Spawns the draining task on the current tokio runtime.
    #[must_use]
    pub fn spawn(coordinator: Arc<PersonaSwitchCoordinator>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (completions, _) = broadcast::channel(COMPLETION_CAPACITY);
        let worker = tokio::spawn(drain(coordinator, receiver, completions.clone()));

        Self {
            notifier: SwitchNotifier { sender },
            completions,
            worker,
        }
    }

    /// Returns a handle for enqueueing events.
    #[must_use]
    pub fn notifier(&self) -> SwitchNotifier {
        self.notifier.clone()
    }

    /// Subscribes to completion signals published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchCompletion> {
        self.completions.subscribe()
    }

    /// Processes every event accepted by a notifier, then stops the task.
    ///
    /// The queue closes once the drain request reaches the task; notifiers
    /// still held elsewhere fail with [`SwitchError::DispatcherClosed`] from
    /// then on.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        if self.notifier.sender.send(DispatchMessage::Drain).is_ok()
            && let Err(join_error) = self.worker.await
        {
            error!(error = %join_error, "persona switch dispatcher task failed");
        }
    }
}

async fn drain(
    coordinator: Arc<PersonaSwitchCoordinator>,
    mut receiver: mpsc::UnboundedReceiver<DispatchMessage>,
    completions: broadcast::Sender<SwitchCompletion>,
) {
    while let Some(message) = receiver.recv().await {
        match message {
            DispatchMessage::Switch(event) => dispatch(&coordinator, &completions, event).await,
            DispatchMessage::Drain => {
                // Refuse new events, then finish the ones accepted after the drain request.
                receiver.close();
                while let Some(late) = receiver.recv().await {
                    if let DispatchMessage::Switch(event) = late {
                        dispatch(&coordinator, &completions, event).await;
                    }
                }
                break;
            }
        }
    }
    debug!("persona switch dispatcher stopped");
}

async fn dispatch(
    coordinator: &PersonaSwitchCoordinator,
    completions: &broadcast::Sender<SwitchCompletion>,
    event: SwitchEvent,
) {
    let outcome = match coordinator.run_switch(&event).await {
        Ok(outcome) => Ok(outcome),
        Err(switch_error) => {
            error!(error = %switch_error, "persona switch failed");
            Err(switch_error.to_string())
        }
    };

    // No subscribers is fine; the signal is for observers only.
    let _ = completions.send(SwitchCompletion { event, outcome });
}
