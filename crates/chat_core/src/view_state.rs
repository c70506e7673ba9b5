use std::fmt;

use url::form_urlencoded;

use crate::Markers;

pub type MessageId = i64;

/// Which wire dialect the chat endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// `lower_bound=` / `upper_bound=` ranges with `X-FirstMsgId` / `X-LastMsgId`.
    #[default]
    BoundedRange,
    /// `g=<chat>&t=<tag>` conditional refresh with `X-ChatTag`.
    ChatTag,
}

impl Protocol {
    pub fn latest_token(self) -> &'static str {
        match self {
            Protocol::BoundedRange => "lower_bound=cur",
            Protocol::ChatTag => "cur",
        }
    }

    /// Parses a wire/history string into a view. Empty input means latest.
    pub fn parse_view(self, raw: &str) -> ViewState {
        let raw = raw.trim();
        if raw.is_empty() || raw == self.latest_token() {
            return ViewState::Latest;
        }
        match self {
            Protocol::BoundedRange => {
                if let Some(id) = raw
                    .strip_prefix("lower_bound=")
                    .and_then(|v| v.parse::<MessageId>().ok())
                {
                    return ViewState::LowerBound(id);
                }
                if let Some(id) = raw
                    .strip_prefix("upper_bound=")
                    .and_then(|v| v.parse::<MessageId>().ok())
                {
                    return ViewState::UpperBound(id);
                }
            }
            Protocol::ChatTag => {
                if let Some(month) = MonthTag::parse(raw) {
                    return ViewState::Month(month);
                }
            }
        }
        ViewState::Custom(raw.to_string())
    }

    pub fn encode_view(self, view: &ViewState) -> String {
        match view {
            ViewState::Latest => self.latest_token().to_string(),
            ViewState::LowerBound(id) => format!("lower_bound={id}"),
            ViewState::UpperBound(id) => format!("upper_bound={id}"),
            ViewState::Month(month) => month.to_string(),
            ViewState::Custom(raw) => raw.clone(),
        }
    }

    /// Builds the GET query for the next fetch of `view`.
    ///
    /// In latest mode with a known up marker the bounded protocol continues
    /// incrementally from that marker instead of reloading the newest page.
    pub fn fetch_query(self, view: &ViewState, markers: &Markers) -> String {
        match self {
            Protocol::BoundedRange => match (view, markers.up) {
                (ViewState::Latest, Some(up)) => format!("lower_bound={up}"),
                _ => self.encode_view(view),
            },
            Protocol::ChatTag => {
                let mut query = form_urlencoded::Serializer::new(String::new());
                query.append_pair("g", &self.encode_view(view));
                if let Some(tag) = markers.tag.as_deref() {
                    query.append_pair("t", tag);
                }
                query.finish()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Latest,
    LowerBound(MessageId),
    UpperBound(MessageId),
    Month(MonthTag),
    Custom(String),
}

impl ViewState {
    pub fn is_latest(&self) -> bool {
        matches!(self, ViewState::Latest)
    }
}

/// Monthly archive name used by the chat-tag protocol, rendered as `<year>_<month>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthTag {
    year: i32,
    month: u8,
}

impl MonthTag {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.split_once('_')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.year, self.month)
    }
}

/// How a fetch query relates to the marker bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Lower,
    Upper,
    Other,
}

impl RangeKind {
    pub fn of_query(query: &str) -> Self {
        if query.starts_with("lower_bound=") {
            RangeKind::Lower
        } else if query.starts_with("upper_bound=") {
            RangeKind::Upper
        } else {
            RangeKind::Other
        }
    }
}
