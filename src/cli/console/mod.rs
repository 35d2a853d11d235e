//! Console command - drives the key UI from a terminal

use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::infrastructure::logging::{self, LoggingConfig};
use crate::config::LogFormat;
use crate::ui::{
    Clipboard, ConsoleSnapshot, CopyState, KeyConsole, KeysHttpClient, MemoryClipboard,
    Osc52Clipboard, ToastKind, UiError, WidgetState,
};

/// Arguments for the console command
#[derive(Args, Clone)]
pub struct ConsoleArgs {
    /// Base URL the `/keys/*` routes hang off
    #[arg(long, default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Session token sent as a Bearer header
    #[arg(long, env = "API_KEY_DESK_SESSION")]
    pub token: Option<String>,

    /// Keep copied keys in memory instead of the terminal clipboard (OSC 52)
    #[arg(long)]
    pub no_osc52: bool,

    /// Log level for the console itself
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// A line typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Generate,
    Validate(String),
    Copy,
    Done,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    Some(match command {
        "generate" | "g" => Input::Generate,
        "validate" | "v" => Input::Validate(rest.trim().to_string()),
        "copy" | "c" => Input::Copy,
        "done" | "d" => Input::Done,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    })
}

const HELP: &str = "commands: generate | validate <key> | copy | done | help | quit";

/// Run the interactive console until `quit` or end of input
pub async fn run(args: ConsoleArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(&LoggingConfig {
        level: args.log_level.clone(),
        format: LogFormat::Pretty,
    });

    let clipboard: Arc<dyn Clipboard> = if args.no_osc52 {
        Arc::new(MemoryClipboard::new())
    } else {
        Arc::new(Osc52Clipboard::stdout())
    };
    let api = Arc::new(KeysHttpClient::new(args.api_url.clone(), args.token.clone()));
    let console = KeyConsole::new(api, clipboard);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut requests: JoinSet<Result<(), UiError>> = JoinSet::new();

    println!("{}", HELP);
    println!("{}", render(&console.snapshot().await));

    loop {
        let deadline = console.next_deadline().await;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                match parse_input(&line) {
                    None => {}
                    Some(Input::Quit) => break,
                    Some(Input::Help) => println!("{}", HELP),
                    Some(Input::Unknown(command)) => println!("unknown command '{}'; {}", command, HELP),
                    Some(Input::Generate) => {
                        let console = console.clone();
                        requests.spawn(async move { console.generate().await });
                    }
                    Some(Input::Validate(key)) => {
                        console.set_entered_key(key).await;
                        let console = console.clone();
                        requests.spawn(async move { console.validate().await });
                    }
                    Some(Input::Copy) => report(console.copy().await),
                    Some(Input::Done) => console.dismiss_dialog().await,
                }

                tokio::task::yield_now().await;
            }
            Some(finished) = requests.join_next(), if !requests.is_empty() => {
                report(finished?);
            }
            _ = sleep_until(deadline), if deadline.is_some() => {}
        }

        println!("{}", render(&console.snapshot().await));
    }

    requests.shutdown().await;
    Ok(())
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn report(result: Result<(), UiError>) {
    if let Err(e) = result {
        println!("! {}", e);
    }
}

/// Plain-text frame of the current state
fn render(snapshot: &ConsoleSnapshot) -> String {
    let mut out = Vec::new();

    out.push(match snapshot.generate {
        WidgetState::Idle => "[ Generate key ]".to_string(),
        WidgetState::Pending => "[ Generating... ] (disabled)".to_string(),
    });

    out.push(match snapshot.validate {
        WidgetState::Idle => "[ Validate key ]".to_string(),
        WidgetState::Pending => format!("[ Validating '{}'... ] (disabled)", snapshot.entered_key),
    });

    if let Some(key) = &snapshot.displayed_key {
        out.push("API key successfully created! This is the only time it is visible.".to_string());
        out.push(format!("  {}", key));
        out.push(match snapshot.copy {
            CopyState::NotCopied => "  [ Copy to clipboard ]  [ Done ]".to_string(),
            CopyState::Copied => "  [ Copied ]  [ Done ]".to_string(),
        });
    }

    for toast in &snapshot.toasts {
        let marker = match toast.kind {
            ToastKind::Success => "+",
            ToastKind::Error => "x",
        };
        out.push(format!("{} {}", marker, toast.message));
    }

    out.join("\n")
}
