//! A terminal chat client built on `codemate` as a library.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::time::Duration;

use codemate::SessionBuilder;
use codemate::config::Config;
use codemate::core::conversation::{Outcome, Turn};
use codemate_ollama_model::OllamaProvider;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};

const BAR_CHAR: &str = "▎";

const HELP: &str = "\
Type a message and press Enter to send it. Commands:
  /retry    send the last message again
  /undo     remove the last message and offer it for editing
  /clear    start over
  /history  show the whole conversation
  /help     show this help
  /quit     exit";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Send(&'a str),
    Retry,
    Undo,
    Clear,
    History,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let command = line.trim();
        match command {
            "/retry" => Command::Retry,
            "/undo" => Command::Undo,
            "/clear" => Command::Clear,
            "/history" => Command::History,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ if command.starts_with('/') => Command::Unknown(command),
            _ => Command::Send(line),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    debug!("starting with {config:?}");

    let model_provider = OllamaProvider::new(config.ollama_config());
    let session = SessionBuilder::with_model_provider(model_provider)
        .with_history_window(config.history_window)
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!(
        "{} {} {}",
        "codemate".bright_white().bold(),
        format!("({} at {})", config.model, config.base_url).dimmed(),
        "/help for commands".dimmed()
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    // The text taken back by `/undo`, sent again on an empty line.
    let mut draft: Option<String> = None;

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(mut line) = read_line(&mut lines).await else {
            break;
        };
        if line.trim().is_empty() {
            let Some(text) = draft.take() else {
                continue;
            };
            println!("{}", text.dimmed());
            line = text;
        }

        match Command::parse(&line) {
            Command::Send(text) => {
                draft = None;
                let progress_bar = spinner(&progress_style);
                let result = session.submit(text).await;
                progress_bar.finish_and_clear();
                match result {
                    Ok(Some(turn)) => print_outcome(&turn),
                    Ok(None) => {}
                    Err(err) => print_notice(&err.to_string()),
                }
            }
            Command::Retry => {
                let progress_bar = spinner(&progress_style);
                let result = session.retry().await;
                progress_bar.finish_and_clear();
                match result {
                    Ok(Some(turn)) => print_outcome(&turn),
                    Ok(None) => print_notice("Nothing to retry."),
                    Err(err) => print_notice(&err.to_string()),
                }
            }
            Command::Undo => match session.undo() {
                Ok(Some(text)) => {
                    print_notice("Removed the last message:");
                    println!("{}", text.bright_white());
                    print_notice(
                        "Press Enter to send it again, or type a new one.",
                    );
                    draft = Some(text);
                }
                Ok(None) => print_notice("Nothing to undo."),
                Err(err) => print_notice(&err.to_string()),
            },
            Command::Clear => match session.clear() {
                Ok(()) => {
                    draft = None;
                    print_notice("Conversation cleared.");
                }
                Err(err) => print_notice(&err.to_string()),
            },
            Command::History => match session.turns() {
                Ok(turns) if turns.is_empty() => {
                    print_notice("The conversation is empty.")
                }
                Ok(turns) => {
                    for turn in &turns {
                        println!(
                            "{}🧑 {}",
                            BAR_CHAR.bright_green(),
                            turn.user_text()
                        );
                        print_outcome(turn);
                    }
                }
                Err(err) => print_notice(&err.to_string()),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Unknown(command) => {
                print_notice(&format!("Unknown command {command}, try /help."))
            }
        }
    }
}

fn spinner(style: &ProgressStyle) -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style.clone());
    progress_bar.set_message("🤔 Thinking...");
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar
}

fn print_outcome(turn: &Turn) {
    match turn.outcome() {
        Some(Outcome::Reply { text }) => {
            println!("{}🤖 {}", BAR_CHAR.bright_cyan(), text.bright_white());
        }
        Some(Outcome::Failed { message, .. }) => {
            println!("{}⚠️  {}", BAR_CHAR.bright_red(), message.red());
        }
        None => {
            println!("{}…", BAR_CHAR.dimmed());
        }
    }
}

fn print_notice(notice: &str) {
    println!("{}{}", BAR_CHAR.bright_yellow(), notice.dimmed());
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    match lines.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
