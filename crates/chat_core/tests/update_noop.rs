use chat_core::{update, ChatSettings, ChatState, Msg};

#[test]
fn tick_does_not_touch_state() {
    let state = ChatState::new(ChatSettings::default());
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
