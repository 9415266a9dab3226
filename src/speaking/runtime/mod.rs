mod handle;

pub use handle::PracticeSessionHandle;

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::PracticeConfig;

use super::sequencer::Sequencer;
use super::types::{SequencerError, SequencerEvent, SessionCommand, SessionSnapshot};

type Reply = oneshot::Sender<Result<SessionSnapshot, SequencerError>>;

pub(crate) enum RuntimeRequest {
    Command { command: SessionCommand, reply: Reply },
    FinishStep { reply: Reply },
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },
    Shutdown { reply: oneshot::Sender<SessionSnapshot> },
}

/// Moves `sequencer` onto its own task. Ticks and commands are multiplexed on
/// one loop, so a tick that expires a step is fully applied before the next
/// command is looked at.
pub fn spawn_practice_session(
    sequencer: Sequencer,
    config: &PracticeConfig,
) -> (PracticeSessionHandle, broadcast::Receiver<SessionSnapshot>) {
    let (request_tx, request_rx) = mpsc::channel(config.command_capacity.max(1));
    let (snapshot_tx, snapshot_rx) = broadcast::channel(config.snapshot_capacity.max(1));

    let worker = SessionWorker {
        sequencer,
        requests: request_rx,
        snapshots: snapshot_tx.clone(),
        period: config.tick_interval,
    };
    let task = tokio::spawn(worker.run());

    (
        PracticeSessionHandle::new(request_tx, snapshot_tx, task),
        snapshot_rx,
    )
}

struct SessionWorker {
    sequencer: Sequencer,
    requests: mpsc::Receiver<RuntimeRequest>,
    snapshots: broadcast::Sender<SessionSnapshot>,
    period: Duration,
}

impl SessionWorker {
    async fn run(mut self) {
        let mut ticker = self.ticker();
        info!(
            target: "practice_runtime",
            period = ?self.period,
            "practice session worker running"
        );

        loop {
            let armed = self.sequencer.is_timer_armed();
            tokio::select! {
                biased;

                request = self.requests.recv() => {
                    let Some(request) = request else {
                        debug!(target: "practice_runtime", "all handles dropped");
                        self.sequencer.teardown();
                        break;
                    };

                    match request {
                        RuntimeRequest::Command { command, reply } => {
                            let result = self.sequencer.handle(command).await;
                            self.settle(&result, &mut ticker);
                            let _ = reply.send(result.map(|_| self.sequencer.snapshot()));
                        }
                        RuntimeRequest::FinishStep { reply } => {
                            let result = self.sequencer.finish_step();
                            self.settle(&result, &mut ticker);
                            let _ = reply.send(result.map(|_| self.sequencer.snapshot()));
                        }
                        RuntimeRequest::Snapshot { reply } => {
                            let _ = reply.send(self.sequencer.snapshot());
                        }
                        RuntimeRequest::Shutdown { reply } => {
                            self.sequencer.teardown();
                            let snapshot = self.sequencer.snapshot();
                            self.publish(snapshot.clone());
                            let _ = reply.send(snapshot);
                            break;
                        }
                    }
                }
                _ = ticker.tick(), if armed => {
                    let result = self.sequencer.tick();
                    if let Err(err) = &result {
                        warn!(target: "practice_runtime", %err, "tick failed");
                    }
                    self.settle(&result, &mut ticker);
                }
            }
        }

        info!(target: "practice_runtime", "practice session worker stopped");
    }

    fn ticker(&self) -> Interval {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Publishes the outcome of an input and restarts the tick phase whenever a
    /// step was entered, so every step gets a full first period.
    fn settle(&self, result: &Result<SequencerEvent, SequencerError>, ticker: &mut Interval) {
        match result {
            Ok(SequencerEvent::Idle) => {}
            Ok(event) => {
                if event.is_transition() {
                    ticker.reset();
                }
                self.publish(self.sequencer.snapshot());
            }
            Err(_) => {}
        }
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        if self.snapshots.send(snapshot).is_err() {
            debug!(target: "practice_runtime", "no snapshot subscribers");
        }
    }
}

#[cfg(test)]
mod tests;
