use std::time::{Duration, Instant};

use chat_core::{Effect, FetchOutcome, HistoryEntry, Msg, Permission, ResponseHeaders};
use chat_engine::{EngineEvent, EngineHandle, FetchReply};
use chat_logging::{chat_debug, chat_info};

use super::history::{NavigationHistory, SessionHistory};
use super::notify::Notifier;

/// Carries core effects out to the engine, the history stack and the notifier,
/// and turns what comes back into core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    history: SessionHistory,
    notifier: Box<dyn Notifier>,
    notification_display: Duration,
    notification_deadline: Option<Instant>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        initial: HistoryEntry,
        notifier: Box<dyn Notifier>,
        notification_display: Duration,
    ) -> Self {
        Self {
            engine,
            history: SessionHistory::new(initial),
            notifier,
            notification_display,
            notification_deadline: None,
        }
    }

    pub fn permission(&self) -> Permission {
        self.notifier.permission()
    }

    /// Runs `effects` in order; returns messages that resolve synchronously.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut replies = Vec::new();
        for effect in effects {
            match effect {
                Effect::Fetch(request) => {
                    chat_debug!("GET ?{} (generation {})", request.query, request.generation);
                    self.engine.fetch(request.generation, request.query);
                }
                Effect::PostMessage { body } => {
                    chat_info!("POST message ({} bytes)", body.len());
                    self.engine.post(body);
                }
                Effect::StartPollTimer { interval } => self.engine.start_polling(interval),
                Effect::StopPollTimer => self.engine.stop_polling(),
                Effect::PushHistory(entry) => self.history.push(entry),
                Effect::RequestNotificationPermission => {
                    let permission = self.notifier.request_permission();
                    replies.push(Msg::PermissionResolved(permission));
                }
                Effect::ShowNotification { title } => {
                    self.notifier.show(&title);
                    self.notification_deadline = Some(Instant::now() + self.notification_display);
                }
            }
        }
        replies
    }

    /// Waits up to `wait` for engine events and drains whatever else is queued.
    pub fn collect(&mut self, wait: Duration) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if let Some(event) = self.engine.recv_timeout(wait) {
            msgs.push(engine_event_to_msg(event));
        }
        while let Some(event) = self.engine.try_recv() {
            msgs.push(engine_event_to_msg(event));
        }
        if let Some(msg) = self.expire_notification(Instant::now()) {
            msgs.push(msg);
        }
        msgs
    }

    /// Restore message for the entry stepped back to, if any.
    pub fn back(&mut self) -> Option<Msg> {
        self.history
            .back()
            .map(|entry| Msg::HistoryRestored(entry.show_chat.clone()))
    }

    pub fn forward(&mut self) -> Option<Msg> {
        self.history
            .forward()
            .map(|entry| Msg::HistoryRestored(entry.show_chat.clone()))
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        self.history.current()
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn expire_notification(&mut self, now: Instant) -> Option<Msg> {
        match self.notification_deadline {
            Some(deadline) if now >= deadline => {
                self.notification_deadline = None;
                Some(Msg::NotificationClosed)
            }
            _ => None,
        }
    }
}

pub fn engine_event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FetchCompleted {
            ticket,
            query,
            result,
        } => {
            let outcome = match result {
                Ok(FetchReply::NotModified) => FetchOutcome::NotModified,
                Ok(FetchReply::Content { html, markers, .. }) => FetchOutcome::Fresh {
                    body: html,
                    headers: ResponseHeaders {
                        first_msg_id: markers.first_msg_id,
                        last_msg_id: markers.last_msg_id,
                        chat_tag: markers.chat_tag,
                    },
                },
                Err(err) => FetchOutcome::Failed {
                    reason: err.to_string(),
                },
            };
            Msg::FetchCompleted {
                generation: ticket,
                query,
                outcome,
            }
        }
        EngineEvent::PostCompleted { result } => {
            Msg::PostCompleted(result.map_err(|err| err.to_string()))
        }
        EngineEvent::PollTick => Msg::PollTimerFired,
    }
}
