//! A simple program demonstrates how to use `colloquy` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use colloquy::PanelBuilder;
use colloquy::core::transcript::{DisplayMessage, Sender};
use colloquy_http_backend::{DirectBackend, HttpConfigBuilder, ReplayBackend};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum PanelEvent {
    Idle,
    Message(DisplayMessage),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(base_url) = env::var("CHAT_BASE_URL") else {
        eprintln!("CHAT_BASE_URL environment variable is not set");
        return;
    };
    let mode = env::var("CHAT_MODE").unwrap_or_else(|_| "direct".to_owned());

    let config = HttpConfigBuilder::with_base_url(base_url)
        .with_request_timeout(Duration::from_secs(30))
        .build();

    let builder = match mode.as_str() {
        "direct" => PanelBuilder::with_backend(DirectBackend::new(config))
            .load_recent_on_start(false)
            .with_greeting("Hello! how can I help you today?"),
        "replay" => PanelBuilder::with_backend(ReplayBackend::new(config)),
        other => {
            eprintln!(
                "unknown CHAT_MODE: {other} (expected \"direct\" or \"replay\")"
            );
            return;
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let panel = builder
        .on_message({
            let event_tx = event_tx.clone();
            move |msg| {
                event_tx.send(PanelEvent::Message(msg.clone())).ok();
            }
        })
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(PanelEvent::Idle).ok();
            }
        })
        .build();

    // Let the initial history load settle before the first prompt.
    if mode == "replay" {
        loop {
            match event_rx.recv().await {
                Some(PanelEvent::Message(msg)) => print_message(&msg),
                Some(PanelEvent::Idle) => break,
                None => return,
            }
        }
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    'outer: loop {
        // Show whatever arrived while the prompt was idle (the
        // greeting, for example).
        while let Ok(event) = event_rx.try_recv() {
            if let PanelEvent::Message(msg) = event {
                print_message(&msg);
            }
        }

        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            // A blank submission is a no-op, so there would be no idle
            // event to wait for.
            continue;
        }
        panel.send_message(line);

        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("💬 Waiting for a reply...");
                    progress_bar
                })
                .inc(1);

            let sleep_fut = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep_fut => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                PanelEvent::Message(msg) => print_message(&msg),
                PanelEvent::Idle => break,
            }
        }
    }

    panel.close();
}

fn print_message(msg: &DisplayMessage) {
    match (msg.sender, msg.timestamp) {
        (Sender::Bot, _) => {
            println!(
                "{}🤖 {}",
                BAR_CHAR.bright_cyan(),
                msg.text.bright_white()
            );
        }
        (Sender::User, Some(_)) => {
            println!("{}🧑 {}", BAR_CHAR.bright_green(), msg.text);
        }
        // The local echo was just typed; don't print it back.
        (Sender::User, None) => {}
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
