use chat_core::HistoryEntry;
use chat_logging::chat_trace;

/// Browser-style back/forward stack of chat views.
pub trait NavigationHistory {
    fn push(&mut self, entry: HistoryEntry);
    /// Steps back and returns the entry now current, if there was one to go back to.
    fn back(&mut self) -> Option<&HistoryEntry>;
    fn forward(&mut self) -> Option<&HistoryEntry>;
    fn current(&self) -> &HistoryEntry;
}

/// In-memory history for one run of the host.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl SessionHistory {
    pub fn new(initial: HistoryEntry) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl NavigationHistory for SessionHistory {
    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor + 1);
        chat_trace!("history push {}", entry.url());
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    fn back(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    fn forward(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{Protocol, ViewState};

    fn entry(view: ViewState) -> HistoryEntry {
        HistoryEntry::for_view(Protocol::BoundedRange, &view)
    }

    fn shown(entry: Option<&HistoryEntry>) -> Option<&str> {
        entry.map(|e| e.show_chat.as_str())
    }

    #[test]
    fn back_and_forward_walk_entries() {
        let mut history = SessionHistory::new(entry(ViewState::Latest));
        history.push(entry(ViewState::UpperBound(10)));
        history.push(entry(ViewState::UpperBound(5)));

        assert_eq!(shown(history.back()), Some("upper_bound=10"));
        assert_eq!(shown(history.back()), Some("lower_bound=cur"));
        assert_eq!(shown(history.back()), None);
        assert_eq!(shown(history.forward()), Some("upper_bound=10"));
    }

    #[test]
    fn push_drops_forward_entries() {
        let mut history = SessionHistory::new(entry(ViewState::Latest));
        history.push(entry(ViewState::UpperBound(10)));
        history.back();
        history.push(entry(ViewState::LowerBound(3)));

        assert_eq!(history.len(), 2);
        assert!(history.forward().is_none());
        assert_eq!(history.current().show_chat, "lower_bound=3");
    }
}
