// Threadchat CLI — minimal terminal front-end for the chat engine.
// Reads lines from stdin, runs one synchronous turn per line, and renders
// the reply. `/new` starts a fresh conversation; Ctrl-C cancels an
// in-flight turn without quitting.

use clap::Parser;
use log::debug;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use threadchat::atoms::constants::{MAX_POLL_ATTEMPTS, POLL_DELAY_MS};
use threadchat::{
    run_turn, ChatSession, Credentials, HttpAssistantClient, PollConfig, DEFAULT_BASE_URL,
};

#[derive(Parser, Debug)]
#[command(name = "threadchat", version, about = "Chat with a hosted assistant from the terminal")]
struct Cli {
    /// Base URL of the assistant service.
    #[arg(long, env = "THREADCHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Assistant identifier (overrides keychain and ASSISTANT_ID).
    #[arg(long)]
    assistant: Option<String>,

    /// Maximum run-status checks before a turn is reported as timed out.
    #[arg(long, default_value_t = MAX_POLL_ATTEMPTS)]
    max_poll_attempts: u32,

    /// Delay between run-status checks, in milliseconds.
    #[arg(long, default_value_t = POLL_DELAY_MS)]
    poll_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let credentials = match Credentials::load(cli.assistant.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let client = HttpAssistantClient::new(&credentials, cli.base_url);
    let poll = PollConfig {
        max_attempts: cli.max_poll_attempts,
        delay: Duration::from_millis(cli.poll_delay_ms),
    };
    let mut session = ChatSession::new();

    println!("threadchat — type a message, `/new` for a fresh conversation, `/quit` to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // EOF
            Err(e) => {
                eprintln!("input error: {}", e);
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "/quit" | "/exit" => break,
            "/new" => {
                session.reset();
                println!("Started a new conversation.");
                continue;
            }
            _ => {}
        }

        // Ctrl-C during a turn cancels the poll instead of killing the
        // process; the watcher is disarmed once the turn settles.
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        match run_turn(&client, &mut session, input, &poll, &cancel).await {
            Ok(reply) => println!("assistant> {}", reply),
            Err(e) => {
                debug!("turn aborted: {}", e);
                eprintln!("{}", e.user_message());
            }
        }
        watcher.abort();
    }
}
