use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chat_core::{ChatSettings, MonthTag, Protocol, DEFAULT_NOTIFICATION_TITLE};
use chat_engine::TransportSettings;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;
use super::notify::NotificationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolChoice {
    #[default]
    Bounded,
    Tag,
}

impl ProtocolChoice {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bounded" => Some(Self::Bounded),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl From<ProtocolChoice> for Protocol {
    fn from(choice: ProtocolChoice) -> Self {
        match choice {
            ProtocolChoice::Bounded => Protocol::BoundedRange,
            ProtocolChoice::Tag => Protocol::ChatTag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererChoice {
    #[default]
    Text,
    Markdown,
}

impl RendererChoice {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Host configuration, read from an optional RON file and then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub protocol: ProtocolChoice,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub notification_title: String,
    pub notifications: NotificationMode,
    pub notification_display_secs: u64,
    pub renderer: RendererChoice,
    pub log: LogDestination,
    pub log_file: PathBuf,
    /// `None` disables session save/restore.
    pub session_file: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            endpoint: transport.endpoint,
            protocol: ProtocolChoice::default(),
            poll_interval_secs: 30,
            request_timeout_secs: transport.request_timeout.as_secs(),
            max_response_bytes: transport.max_bytes,
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            notifications: NotificationMode::default(),
            notification_display_secs: 5,
            renderer: RendererChoice::default(),
            log: LogDestination::default(),
            log_file: PathBuf::from("./chat_poller.log"),
            session_file: Some(PathBuf::from("./.chat_poller_session.ron")),
            export_dir: PathBuf::from("./exports"),
        }
    }
}

impl AppConfig {
    /// Reads `path` when given; defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("endpoint must not be empty");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        if self.max_response_bytes == 0 {
            anyhow::bail!("max_response_bytes must be at least 1");
        }
        Ok(())
    }

    pub fn example() -> Result<String> {
        let pretty = ron::ser::PrettyConfig::new();
        Ok(ron::ser::to_string_pretty(&Self::default(), pretty)?)
    }

    pub fn chat_settings(
        &self,
        initial_view: Option<String>,
        current_month: Option<MonthTag>,
    ) -> ChatSettings {
        ChatSettings {
            protocol: self.protocol.into(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            notification_title: self.notification_title.clone(),
            initial_view,
            current_month,
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            endpoint: self.endpoint.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
            ..TransportSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = AppConfig::parse(
            r#"(endpoint: "http://chat.local/room/", protocol: tag, notifications: denied)"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://chat.local/room/");
        assert_eq!(config.protocol, ProtocolChoice::Tag);
        assert_eq!(config.notifications, NotificationMode::Denied);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn example_config_round_trips() {
        let example = AppConfig::example().unwrap();
        assert_eq!(AppConfig::parse(&example).unwrap(), AppConfig::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = AppConfig::parse("(poll_interval_secs: 0)").unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn zero_timeout_and_size_cap_are_rejected() {
        let err = AppConfig::parse("(request_timeout_secs: 0)").unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));

        let err = AppConfig::parse("(max_response_bytes: 0)").unwrap_err();
        assert!(err.to_string().contains("max_response_bytes"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = AppConfig::load(Some(Path::new("/definitely/missing.ron"))).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/missing.ron"));
    }

    #[test]
    fn settings_follow_config() {
        let config = AppConfig {
            poll_interval_secs: 5,
            protocol: ProtocolChoice::Tag,
            ..AppConfig::default()
        };
        let settings = config.chat_settings(Some("2024_1".into()), MonthTag::new(2024, 2));
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.protocol, Protocol::ChatTag);
        assert_eq!(settings.initial_view.as_deref(), Some("2024_1"));
    }
}
