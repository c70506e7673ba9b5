use chat_core::{
    update, ChatSettings, ChatState, Effect, FetchOutcome, FetchRequest, Msg, MonthTag,
    Permission, Protocol, ResponseHeaders, TimerState, ViewState,
};
use pretty_assertions::assert_eq;

fn settings() -> ChatSettings {
    ChatSettings {
        protocol: Protocol::ChatTag,
        current_month: MonthTag::new(2024, 3),
        ..ChatSettings::default()
    }
}

fn start() -> (ChatState, Vec<Effect>) {
    update(
        ChatState::new(settings()),
        Msg::Started {
            permission: Permission::Denied,
        },
    )
}

fn tagged(state: ChatState, query: &str, body: &str, tag: &str) -> ChatState {
    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::FetchCompleted {
            generation,
            query: query.to_string(),
            outcome: FetchOutcome::Fresh {
                body: body.to_string(),
                headers: ResponseHeaders {
                    chat_tag: Some(tag.to_string()),
                    ..ResponseHeaders::default()
                },
            },
        },
    );
    state
}

fn last_fetch(effects: &[Effect]) -> Option<String> {
    effects.iter().rev().find_map(|effect| match effect {
        Effect::Fetch(FetchRequest { query, .. }) => Some(query.clone()),
        _ => None,
    })
}

#[test]
fn latest_fetch_sends_tag_once_known() {
    chat_logging::initialize_for_tests();
    let (state, effects) = start();
    assert_eq!(last_fetch(&effects).as_deref(), Some("g=cur"));

    let state = tagged(state, "g=cur", "<p>a</p>", "1700");
    let (state, effects) = update(state, Msg::PollTimerFired);
    assert_eq!(last_fetch(&effects).as_deref(), Some("g=cur&t=1700"));

    // Fresh content replaces rather than prepends.
    let state = tagged(state, "g=cur&t=1700", "<p>a</p><p>b</p>", "1800");
    assert_eq!(state.view().fragments, vec!["<p>a</p><p>b</p>"]);
    assert_eq!(state.markers().tag.as_deref(), Some("1800"));
}

#[test]
fn not_modified_keeps_tag_and_content() {
    chat_logging::initialize_for_tests();
    let (state, _) = start();
    let state = tagged(state, "g=cur", "<p>a</p>", "1700");
    let generation = state.generation();
    let (state, _) = update(
        state,
        Msg::FetchCompleted {
            generation,
            query: "g=cur&t=1700".to_string(),
            outcome: FetchOutcome::NotModified,
        },
    );
    assert_eq!(state.view().fragments, vec!["<p>a</p>"]);
    assert_eq!(state.markers().tag.as_deref(), Some("1700"));
}

#[test]
fn months_step_back_and_snap_to_latest() {
    chat_logging::initialize_for_tests();
    let (state, _) = start();

    let (state, effects) = update(state, Msg::NavigateOlder);
    assert_eq!(
        state.current_view(),
        &ViewState::Month(MonthTag::new(2024, 2).unwrap())
    );
    assert_eq!(state.timer(), TimerState::Stopped);
    assert_eq!(last_fetch(&effects).as_deref(), Some("g=2024_2"));

    let (state, _) = update(state, Msg::NavigateOlder);
    assert_eq!(
        state.current_view(),
        &ViewState::Month(MonthTag::new(2024, 1).unwrap())
    );

    let (state, _) = update(state, Msg::NavigateNewer);
    assert_eq!(
        state.current_view(),
        &ViewState::Month(MonthTag::new(2024, 2).unwrap())
    );

    let (state, effects) = update(state, Msg::NavigateNewer);
    assert!(state.current_view().is_latest());
    assert_eq!(state.timer(), TimerState::Running);
    assert_eq!(last_fetch(&effects).as_deref(), Some("g=cur"));
}

#[test]
fn older_without_current_month_warns() {
    chat_logging::initialize_for_tests();
    let settings = ChatSettings {
        current_month: None,
        ..settings()
    };
    let (state, _) = update(
        ChatState::new(settings),
        Msg::Started {
            permission: Permission::Denied,
        },
    );
    let (state, effects) = update(state, Msg::NavigateOlder);
    assert!(effects.is_empty());
    assert!(state.view().last_warning.is_some());
}
