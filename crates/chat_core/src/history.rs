use url::{form_urlencoded, Url};

use crate::{Protocol, ViewState};

const PAGE_TITLE: &str = "Chat";

/// One navigation history entry: state `{ show_chat }`, a title and a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub show_chat: String,
    pub title: String,
}

impl HistoryEntry {
    pub fn for_view(protocol: Protocol, view: &ViewState) -> Self {
        let show_chat = protocol.encode_view(view);
        let title = if view.is_latest() {
            PAGE_TITLE.to_string()
        } else {
            format!("{PAGE_TITLE} - {show_chat}")
        };
        Self { show_chat, title }
    }

    /// Relative page URL, `?show_chat=<view>`.
    pub fn url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("show_chat", &self.show_chat)
            .finish();
        format!("?{query}")
    }
}

/// Extracts the view override from a page URL (`?show_chat=` or the older `?show=`).
pub fn show_chat_from_page_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    let mut fallback = None;
    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "show_chat" if !value.is_empty() => return Some(value.into_owned()),
            "show" if !value.is_empty() => fallback = Some(value.into_owned()),
            _ => {}
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_entry_uses_plain_title() {
        let entry = HistoryEntry::for_view(Protocol::BoundedRange, &ViewState::Latest);
        assert_eq!(entry.title, "Chat");
        assert_eq!(entry.show_chat, "lower_bound=cur");
    }

    #[test]
    fn bound_entry_names_range_and_encodes_url() {
        let entry = HistoryEntry::for_view(Protocol::BoundedRange, &ViewState::UpperBound(12));
        assert_eq!(entry.title, "Chat - upper_bound=12");
        assert_eq!(entry.url(), "?show_chat=upper_bound%3D12");
    }

    #[test]
    fn page_url_override_prefers_show_chat() {
        assert_eq!(
            show_chat_from_page_url("http://chat.local/room/?show_chat=upper_bound%3D5"),
            Some("upper_bound=5".to_string())
        );
        assert_eq!(
            show_chat_from_page_url("http://chat.local/room/?show=2024_2"),
            Some("2024_2".to_string())
        );
        assert_eq!(show_chat_from_page_url("http://chat.local/room/"), None);
        assert_eq!(show_chat_from_page_url("not a url"), None);
    }
}
