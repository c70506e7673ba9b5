use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_logging::{chat_debug, chat_info};
use tokio::runtime::Runtime;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::transport::{ChatTransport, ReqwestTransport, TransportSettings};
use crate::{EngineEvent, Ticket, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build transport: {0}")]
    Transport(#[from] TransportError),
}

enum EngineCommand {
    Fetch { ticket: Ticket, query: String },
    Post { body: String },
    StartPolling { interval: Duration },
    StopPolling,
    Shutdown,
}

/// Runs chat IO on a background tokio runtime and reports back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: TransportSettings) -> Result<Self, EngineError> {
        let transport = ReqwestTransport::new(settings)?;
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn ChatTransport>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = Runtime::new()?;

        thread::spawn(move || run_commands(runtime, transport, cmd_rx, event_tx));

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch(&self, ticket: Ticket, query: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Fetch {
            ticket,
            query: query.into(),
        });
    }

    pub fn post(&self, body: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Post { body: body.into() });
    }

    /// Starts (or restarts) the poll timer; the first tick arrives after one full interval.
    pub fn start_polling(&self, interval: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling { interval });
    }

    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_commands(
    runtime: Runtime,
    transport: Arc<dyn ChatTransport>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut poller: Option<CancellationToken> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Fetch { ticket, query } => {
                let transport = transport.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = transport.fetch(&query).await;
                    let _ = event_tx.send(EngineEvent::FetchCompleted {
                        ticket,
                        query,
                        result,
                    });
                });
            }
            EngineCommand::Post { body } => {
                let transport = transport.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let result = transport.post(&body).await;
                    let _ = event_tx.send(EngineEvent::PostCompleted { result });
                });
            }
            EngineCommand::StartPolling { interval } => {
                if let Some(token) = poller.take() {
                    token.cancel();
                }
                let token = CancellationToken::new();
                runtime.spawn(poll_ticks(interval, token.clone(), event_tx.clone()));
                chat_debug!("poll timer started ({:?})", interval);
                poller = Some(token);
            }
            EngineCommand::StopPolling => {
                if let Some(token) = poller.take() {
                    token.cancel();
                    chat_debug!("poll timer stopped");
                }
            }
            EngineCommand::Shutdown => break,
        }
    }

    if let Some(token) = poller.take() {
        token.cancel();
    }
    runtime.shutdown_timeout(Duration::from_secs(1));
    chat_info!("engine stopped");
}

async fn poll_ticks(
    period: Duration,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticks.tick() => {
                if event_tx.send(EngineEvent::PollTick).is_err() {
                    break;
                }
            }
        }
    }
}
