use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chat_core::{show_chat_from_page_url, update, ChatState, HistoryEntry, MonthTag, Msg};
use chat_engine::{
    AtomicFileWriter, EngineHandle, FragmentRenderer, MarkdownRenderer, PlainTextRenderer,
    TranscriptExporter, TranscriptSource,
};
use chat_logging::{chat_info, chat_warn};
use chrono::{Datelike, Local};
use log::LevelFilter;

use super::cli::{parse_cli_args, print_help, CliOptions};
use super::config::{AppConfig, RendererChoice};
use super::effects::EffectRunner;
use super::logging;
use super::notify::TerminalNotifier;
use super::session::{load_session, save_session, SessionSnapshot};
use super::ui::{self, HostEvent, HELP_LINES};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> Result<()> {
    let cli = parse_cli_args(std::env::args().skip(1))?;
    if cli.show_help {
        print_help();
        return Ok(());
    }
    if cli.print_example {
        println!("{}", AppConfig::example()?);
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config_path.as_deref())?;
    cli.apply(&mut config).context("invalid command line")?;
    logging::initialize(config.log, LevelFilter::Debug, &config.log_file);
    chat_info!(
        "chat_poller starting: endpoint={} protocol={:?} interval={}s",
        config.endpoint,
        config.protocol,
        config.poll_interval_secs
    );

    let session = config.session_file.as_deref().and_then(load_session);
    let settings = config.chat_settings(initial_view(&cli, session.as_ref()), current_month());
    let protocol = settings.protocol;
    let initial_entry = HistoryEntry::for_view(
        protocol,
        &protocol.parse_view(settings.initial_view.as_deref().unwrap_or_default()),
    );

    let engine =
        EngineHandle::new(config.transport_settings()).context("failed to start chat engine")?;
    let notifier = TerminalNotifier::stdout(
        config.notifications,
        session.as_ref().map(|snapshot| snapshot.permission),
    );
    let runner = EffectRunner::new(
        engine,
        initial_entry,
        Box::new(notifier),
        Duration::from_secs(config.notification_display_secs),
    );
    let renderer: Box<dyn FragmentRenderer> = match config.renderer {
        RendererChoice::Text => Box::new(PlainTextRenderer),
        RendererChoice::Markdown => Box::new(MarkdownRenderer),
    };

    let (event_tx, event_rx) = mpsc::channel::<HostEvent>();
    thread::spawn(move || ui::forward_commands(io::stdin().lock(), &event_tx));

    let mut host = Host {
        state: ChatState::new(settings),
        runner,
        renderer,
        config,
        needs_render: false,
    };
    let permission = host.runner.permission();
    host.dispatch(Msg::Started { permission });
    host.render_if_needed();

    loop {
        match event_rx.recv_timeout(TICK) {
            Ok(event) => {
                if !host.handle(event) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        for msg in host.runner.collect(Duration::ZERO) {
            host.dispatch(msg);
        }
        host.dispatch(Msg::Tick);
        host.render_if_needed();
    }

    host.finish();
    Ok(())
}

/// `--show-chat` wins over `--page-url`, which wins over the saved session.
fn initial_view(cli: &CliOptions, session: Option<&SessionSnapshot>) -> Option<String> {
    cli.show_chat
        .clone()
        .or_else(|| cli.page_url.as_deref().and_then(show_chat_from_page_url))
        .or_else(|| session.map(|snapshot| snapshot.show_chat.clone()))
}

fn current_month() -> Option<MonthTag> {
    let today = Local::now();
    MonthTag::new(today.year(), u8::try_from(today.month()).ok()?)
}

struct Host {
    state: ChatState,
    runner: EffectRunner,
    renderer: Box<dyn FragmentRenderer>,
    config: AppConfig,
    needs_render: bool,
}

impl Host {
    /// Applies `msg` and every message its effects resolve to synchronously.
    fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            self.needs_render |= state.consume_dirty();
            self.state = state;
            inbox.extend(self.runner.run(effects));
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle(&mut self, event: HostEvent) -> bool {
        match event {
            HostEvent::Core(msg) => self.dispatch(msg),
            HostEvent::Send(text) => {
                self.dispatch(Msg::InputChanged(text));
                self.dispatch(Msg::SendSubmitted);
            }
            HostEvent::Back => match self.runner.back() {
                Some(msg) => self.dispatch(msg),
                None => println!("(no earlier view)"),
            },
            HostEvent::Forward => match self.runner.forward() {
                Some(msg) => self.dispatch(msg),
                None => println!("(no later view)"),
            },
            HostEvent::Export => self.export(),
            HostEvent::Help => {
                for line in HELP_LINES {
                    println!("  {line}");
                }
                println!("  page: {}", self.runner.current_entry().url());
            }
            HostEvent::Unknown(command) => {
                println!("unknown command {command}; /help lists commands");
            }
            HostEvent::Quit => return false,
        }
        true
    }

    fn export(&self) {
        let view = self.state.view();
        let exported_at = Local::now().to_rfc3339();
        let source = TranscriptSource {
            endpoint: &self.config.endpoint,
            show_chat: &view.show_chat,
            title: &view.title,
            fragments: &view.fragments,
            exported_at: &exported_at,
        };
        let writer = AtomicFileWriter::new(self.config.export_dir.clone());
        let exporter = TranscriptExporter::new(writer);
        match exporter.export(&source, self.renderer.as_ref()) {
            Ok(summary) => println!(
                "exported {} lines to {}",
                summary.line_count,
                summary.output_path.display()
            ),
            Err(err) => {
                chat_warn!("export failed: {}", err);
                println!("export failed: {err}");
            }
        }
    }

    fn render_if_needed(&mut self) {
        if !std::mem::take(&mut self.needs_render) {
            return;
        }
        println!();
        for line in ui::render(&self.state.view(), self.renderer.as_ref()) {
            println!("{line}");
        }
    }

    fn finish(self) {
        if let Some(path) = &self.config.session_file {
            let view = self.state.view();
            save_session(
                path,
                &SessionSnapshot {
                    show_chat: view.show_chat,
                    permission: view.permission,
                },
            );
        }
        self.runner.shutdown();
        chat_info!("chat_poller stopped");
    }
}
