use std::path::PathBuf;

use anyhow::{anyhow, Result};

use super::config::{AppConfig, ProtocolChoice, RendererChoice};
use super::logging::LogDestination;
use super::notify::NotificationMode;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub show_chat: Option<String>,
    pub page_url: Option<String>,
    pub interval_secs: Option<u64>,
    pub protocol: Option<ProtocolChoice>,
    pub notifications: Option<NotificationMode>,
    pub renderer: Option<RendererChoice>,
    pub log: Option<LogDestination>,
    pub print_example: bool,
    pub show_help: bool,
}

impl CliOptions {
    /// Overrides config values with whatever was given on the command line.
    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.interval_secs {
            config.poll_interval_secs = secs;
        }
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(mode) = self.notifications {
            config.notifications = mode;
        }
        if let Some(renderer) = self.renderer {
            config.renderer = renderer;
        }
        if let Some(log) = self.log {
            config.log = log;
        }
        config.validate()
    }
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| -> Result<String> {
            iter.next()
                .map(|value| value.as_ref().to_string())
                .ok_or_else(|| anyhow!("{flag} requires {what}"))
        };
        match arg.as_ref() {
            "--config" => {
                options.config_path = Some(PathBuf::from(value_for("--config", "a file path")?));
            }
            "--endpoint" => {
                options.endpoint = Some(value_for("--endpoint", "a url")?);
            }
            "--show-chat" => {
                options.show_chat = Some(value_for("--show-chat", "a view")?);
            }
            "--page-url" => {
                options.page_url = Some(value_for("--page-url", "a url")?);
            }
            "--interval-secs" => {
                let raw = value_for("--interval-secs", "a number of seconds")?;
                let secs = raw
                    .parse::<u64>()
                    .map_err(|_| anyhow!("--interval-secs expects seconds, got {raw:?}"))?;
                options.interval_secs = Some(secs);
            }
            "--protocol" => {
                let raw = value_for("--protocol", "bounded or tag")?;
                options.protocol = Some(
                    ProtocolChoice::parse(&raw)
                        .ok_or_else(|| anyhow!("unknown protocol {raw:?}; use bounded or tag"))?,
                );
            }
            "--notifications" => {
                let raw = value_for("--notifications", "granted, denied or ask")?;
                options.notifications = Some(NotificationMode::parse(&raw).ok_or_else(|| {
                    anyhow!("unknown notification mode {raw:?}; use granted, denied or ask")
                })?);
            }
            "--renderer" => {
                let raw = value_for("--renderer", "text or markdown")?;
                options.renderer = Some(
                    RendererChoice::parse(&raw)
                        .ok_or_else(|| anyhow!("unknown renderer {raw:?}; use text or markdown"))?,
                );
            }
            "--log" => {
                let raw = value_for("--log", "file, terminal or both")?;
                options.log = Some(
                    LogDestination::parse(&raw).ok_or_else(|| {
                        anyhow!("unknown log destination {raw:?}; use file, terminal or both")
                    })?,
                );
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

pub fn print_help() {
    println!("chat_poller");
    println!("  --config <path>             Read settings from a RON file");
    println!("  --endpoint <url>            Chat endpoint (GET and POST)");
    println!("  --show-chat <view>          Open a specific view instead of the latest messages");
    println!("  --page-url <url>            Take the view from a page url (?show_chat=...)");
    println!("  --interval-secs <n>         Poll interval in latest mode");
    println!("  --protocol <bounded|tag>    Server pagination protocol");
    println!("  --notifications <mode>      granted, denied or ask");
    println!("  --renderer <text|markdown>  How message fragments are shown");
    println!("  --log <file|terminal|both>  Log destination");
    println!("  --print-example-config      Print a config template");
    println!("  -h, --help                  Show this help");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_give_defaults() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new())?;
        assert_eq!(options, CliOptions::default());
        Ok(())
    }

    #[test]
    fn view_and_protocol_flags_are_parsed() -> Result<()> {
        let options = parse_cli_args(vec![
            "--show-chat",
            "upper_bound=40",
            "--protocol",
            "tag",
            "--interval-secs",
            "10",
        ])?;
        assert_eq!(options.show_chat.as_deref(), Some("upper_bound=40"));
        assert_eq!(options.protocol, Some(ProtocolChoice::Tag));
        assert_eq!(options.interval_secs, Some(10));
        Ok(())
    }

    #[test]
    fn missing_value_is_an_error() {
        let error = parse_cli_args(vec!["--endpoint"]).expect_err("missing value should fail");
        assert!(error.to_string().contains("--endpoint requires a url"));
    }

    #[test]
    fn bad_interval_is_an_error() {
        let error =
            parse_cli_args(vec!["--interval-secs", "soon"]).expect_err("non-number should fail");
        assert!(error.to_string().contains("--interval-secs"));
    }

    #[test]
    fn unknown_argument_points_to_help() {
        let error = parse_cli_args(vec!["--wat"]).expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn apply_overrides_config() -> Result<()> {
        let options = parse_cli_args(vec![
            "--endpoint",
            "http://chat.local/",
            "--notifications",
            "denied",
            "--log",
            "both",
        ])?;
        let mut config = AppConfig::default();
        options.apply(&mut config)?;
        assert_eq!(config.endpoint, "http://chat.local/");
        assert_eq!(config.notifications, NotificationMode::Denied);
        assert_eq!(config.log, LogDestination::Both);
        Ok(())
    }

    #[test]
    fn apply_rejects_zero_interval() {
        let options = CliOptions {
            interval_secs: Some(0),
            ..CliOptions::default()
        };
        assert!(options.apply(&mut AppConfig::default()).is_err());
    }
}
