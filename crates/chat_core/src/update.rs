use chat_logging::{chat_debug, chat_trace, chat_warn};

use crate::{
    ChatState, Effect, FetchOutcome, FetchRequest, Generation, HistoryEntry, MessageId, Msg,
    Permission, Protocol, RangeKind, ResponseHeaders, TimerState, ViewState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ChatState, msg: Msg) -> (ChatState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { permission } => {
            if state.is_started() {
                return (state, Vec::new());
            }
            state.mark_started();
            state.set_permission(permission);

            let mut effects = Vec::new();
            if permission == Permission::Undecided {
                effects.push(Effect::RequestNotificationPermission);
            }
            let initial = state
                .settings()
                .initial_view
                .as_deref()
                .map(|raw| state.protocol().parse_view(raw))
                .unwrap_or(ViewState::Latest);
            state.set_view(initial);
            effects.extend(init_view(&mut state));
            effects
        }
        Msg::PermissionResolved(permission) => {
            state.set_permission(permission);
            Vec::new()
        }
        Msg::NotificationClosed => {
            state.set_notification_open(false);
            Vec::new()
        }
        Msg::PollTimerFired => {
            if state.timer() == TimerState::Running {
                vec![fetch_effect(&state)]
            } else {
                chat_trace!("ignoring poll tick while timer is stopped");
                Vec::new()
            }
        }
        Msg::RefreshRequested => vec![fetch_effect(&state)],
        Msg::FetchCompleted {
            generation,
            query,
            outcome,
        } => apply_fetch(&mut state, generation, &query, outcome),
        Msg::NavigateNewer => navigate_newer(&mut state),
        Msg::NavigateOlder => navigate_older(&mut state),
        Msg::NavigateLatest => change_view(&mut state, ViewState::Latest, true),
        Msg::HistoryRestored(raw) => {
            let view = state.protocol().parse_view(&raw);
            change_view(&mut state, view, false)
        }
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SendSubmitted => {
            if state.input().is_empty() {
                return (state, Vec::new());
            }
            let body = state.take_input();
            vec![Effect::PostMessage { body }]
        }
        Msg::PostCompleted(Ok(())) => vec![fetch_effect(&state)],
        Msg::PostCompleted(Err(reason)) => {
            chat_warn!("sending message failed: {}", reason);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn fetch_effect(state: &ChatState) -> Effect {
    Effect::Fetch(FetchRequest {
        generation: state.generation(),
        query: state
            .protocol()
            .fetch_query(state.current_view(), state.markers()),
    })
}

/// Switches to `view` unless it is already selected.
fn change_view(state: &mut ChatState, view: ViewState, push_history: bool) -> Vec<Effect> {
    if *state.current_view() == view {
        return Vec::new();
    }
    state.set_view(view);

    let mut effects = Vec::new();
    if push_history {
        effects.push(Effect::PushHistory(HistoryEntry::for_view(
            state.protocol(),
            state.current_view(),
        )));
    }
    effects.extend(init_view(state));
    effects
}

/// Aligns the poll timer with the selected view, resets range data and fetches.
fn init_view(state: &mut ChatState) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    match (state.current_view().is_latest(), state.timer()) {
        (true, TimerState::Stopped) => {
            state.set_timer(TimerState::Running);
            effects.push(Effect::StartPollTimer {
                interval: state.settings().poll_interval,
            });
        }
        (false, TimerState::Running) => {
            state.set_timer(TimerState::Stopped);
            effects.push(Effect::StopPollTimer);
        }
        _ => {}
    }
    state.reset_view_data();
    effects.push(fetch_effect(state));
    effects
}

fn navigate_newer(state: &mut ChatState) -> Vec<Effect> {
    let target = match (state.protocol(), state.current_view()) {
        (_, ViewState::Latest) => return vec![fetch_effect(state)],
        (Protocol::BoundedRange, _) => state.markers().up.map(ViewState::LowerBound),
        (Protocol::ChatTag, ViewState::Month(month)) => {
            let next = month.next();
            match state.settings().current_month {
                Some(current) if next >= current => Some(ViewState::Latest),
                _ => Some(ViewState::Month(next)),
            }
        }
        (Protocol::ChatTag, _) => None,
    };
    match target {
        Some(view) => change_view(state, view, true),
        None => warn(state, "unable to select next chat"),
    }
}

fn navigate_older(state: &mut ChatState) -> Vec<Effect> {
    let target = match (state.protocol(), state.current_view()) {
        (Protocol::BoundedRange, _) => state.markers().down.map(ViewState::UpperBound),
        (Protocol::ChatTag, ViewState::Month(month)) => Some(ViewState::Month(month.prev())),
        (Protocol::ChatTag, ViewState::Latest) => state
            .settings()
            .current_month
            .map(|current| ViewState::Month(current.prev())),
        (Protocol::ChatTag, _) => None,
    };
    match target {
        Some(view) => change_view(state, view, true),
        None => warn(state, "unable to select previous chat"),
    }
}

fn warn(state: &mut ChatState, message: &str) -> Vec<Effect> {
    chat_warn!("{}", message);
    state.set_warning(message.to_string());
    Vec::new()
}

fn apply_fetch(
    state: &mut ChatState,
    generation: Generation,
    query: &str,
    outcome: FetchOutcome,
) -> Vec<Effect> {
    if generation != state.generation() {
        chat_debug!(
            "dropping response for abandoned view (query={}, generation={}, current={})",
            query,
            generation,
            state.generation()
        );
        return Vec::new();
    }

    let (body, headers) = match outcome {
        FetchOutcome::NotModified => {
            chat_trace!("fetch {} not modified", query);
            return Vec::new();
        }
        FetchOutcome::Failed { reason } => {
            chat_warn!("fetch {} failed: {}", query, reason);
            return Vec::new();
        }
        FetchOutcome::Fresh { body, headers } => (body, headers),
    };

    let is_latest = state.current_view().is_latest();
    let has_content = !body.trim().is_empty();
    let had_marker = match state.protocol() {
        Protocol::BoundedRange => state.markers().up.is_some(),
        Protocol::ChatTag => state.markers().tag.is_some(),
    };

    match state.protocol() {
        Protocol::BoundedRange => {
            if has_content {
                if is_latest {
                    state.transcript_mut().prepend(body);
                } else {
                    state.transcript_mut().replace(body);
                }
            }
            update_range_markers(state, query, &headers);
        }
        Protocol::ChatTag => {
            state.transcript_mut().replace(body);
            if let Some(tag) = headers.chat_tag.filter(|tag| !tag.is_empty()) {
                state.markers_mut().tag = Some(tag);
            }
        }
    }
    state.mark_dirty();

    let mut effects = Vec::new();
    if has_content && had_marker && is_latest {
        effects.extend(notify(state));
    }
    effects
}

/// Up is overwritten when unknown or on a lower-bound query, down when unknown
/// or on an upper-bound query. Absent headers never erase a known marker.
fn update_range_markers(state: &mut ChatState, query: &str, headers: &ResponseHeaders) {
    let kind = RangeKind::of_query(query);
    let last = parse_marker("X-LastMsgId", headers.last_msg_id.as_deref());
    let first = parse_marker("X-FirstMsgId", headers.first_msg_id.as_deref());
    let markers = state.markers_mut();
    if let Some(last) = last {
        if markers.up.is_none() || kind == RangeKind::Lower {
            markers.up = Some(last);
        }
    }
    if let Some(first) = first {
        if markers.down.is_none() || kind == RangeKind::Upper {
            markers.down = Some(first);
        }
    }
}

fn parse_marker(header: &str, raw: Option<&str>) -> Option<MessageId> {
    let raw = raw?.trim();
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            chat_warn!("ignoring malformed {} header: {:?}", header, raw);
            None
        }
    }
}

fn notify(state: &mut ChatState) -> Option<Effect> {
    if state.permission() != Permission::Granted || state.notification_open() {
        return None;
    }
    state.set_notification_open(true);
    Some(Effect::ShowNotification {
        title: state.settings().notification_title.clone(),
    })
}
