use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use docqa_core::{update, AppState, Msg};
use docqa_engine::EngineHandle;
use engine_logging::{engine_error, engine_info, engine_warn};
use log::LevelFilter;

use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::ui::input::{parse_line, Command, HELP};
use super::ui::render::{render_documents, Screen};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

enum Inbound {
    Line(String),
    Closed,
}

pub fn run_app() -> anyhow::Result<()> {
    let (config, config_problem) = config::load();
    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(config.log_destination, level);
    if let Some(problem) = config_problem {
        engine_warn!("{}; using defaults", problem);
    }
    engine_info!("docqa starting against {}", config.api_url);

    let engine = EngineHandle::new(config.engine_config()).map_err(|err| {
        engine_error!("Failed to start engine: {}", err);
        err
    })?;

    let mut app = App {
        state: AppState::with_policy(config.query_policy.into()),
        runner: EffectRunner::new(engine),
        screen: Screen::new(config.api_url.clone()),
        out: io::stdout(),
    };

    let (line_tx, line_rx) = mpsc::channel::<Inbound>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(Inbound::Line(line)).is_err() {
                return;
            }
        }
        let _ = line_tx.send(Inbound::Closed);
    });

    app.print(&["DocQA ready. Type /help for commands.".to_string()]);
    app.dispatch(Msg::Started);

    // One loop applies every message, so state changes never interleave.
    loop {
        match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Inbound::Line(line)) => {
                if !app.handle_command(parse_line(&line)) {
                    break;
                }
            }
            Ok(Inbound::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        app.drain_engine_events();
    }

    engine_info!("docqa shutting down");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    screen: Screen,
    out: io::Stdout,
}

impl App {
    /// Returns `false` when the user asked to leave.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Command::ShowDocuments => {
                let lines = render_documents(&self.state.view());
                self.print(&lines);
            }
            Command::Help => self.print(&[HELP.to_string()]),
            Command::Quit => return false,
            Command::Unknown(name) => {
                self.print(&[format!("Unknown command /{name}. Type /help for commands.")]);
            }
        }
        true
    }

    fn drain_engine_events(&mut self) {
        while let Some(event) = self.runner.engine().try_recv() {
            if let Some(msg) = self.runner.translate(event) {
                self.dispatch(msg);
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;

        let notices = self.runner.run(effects);
        if let Some(view) = view {
            let lines = self.screen.frame(&view);
            self.print(&lines);
        }
        if !notices.is_empty() {
            let lines: Vec<String> = notices.iter().map(|notice| format!("!! {notice}")).collect();
            self.print(&lines);
        }
    }

    fn print(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let mut out = self.out.lock();
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}
