//! CLI for chatcore
//!
//! Joins a set of local users, reads chat lines from stdin and prints every
//! delivery as JSON. `@bob hi` sends to bob; any other line is broadcast.
//! Ctrl-C cancels the broker.

use std::sync::Arc;
use std::time::Duration;

use chatcore::broker::{Broker, Message, Shutdown};
use chatcore::config::{Settings, load_config};
use chatcore::history::MessageStore;
use chatcore::service::ChatService;
use chatcore::users::{User, UserDirectory};
use chatcore::utils::error::ChatError;
use chatcore::utils::logging;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(name = "chatcore")]
struct Args {
    /// Users to join, comma separated
    #[arg(long, value_delimiter = ',', default_value = "alice,bob")]
    users: Vec<String>,

    /// User that stdin lines are sent as
    #[arg(long = "as", default_value = "alice")]
    sender: String,

    /// Log level, overriding the configured one
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(args.log_level.as_deref().unwrap_or(&config.log.level));

    if let Err(e) = run(args, config).await {
        error!("Chat failed: {}", e);
    }
}

async fn run(args: Args, config: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let broker = Arc::new(Broker::with_capacity(
        shutdown.clone(),
        config.broker.queue_capacity,
    ));
    broker.run()?;

    let service = ChatService::new(
        broker.clone(),
        UserDirectory::with_shutdown(shutdown.clone()),
        MessageStore::new(),
        config.broker.subscriber_buffer,
    );

    let mut printers = Vec::new();
    for id in &args.users {
        let user = User::with_id(id.as_str(), id.as_str(), format!("{id}@chat.local"));
        let mut inbox = service.join(user)?;
        let id = id.clone();
        printers.push(tokio::spawn(async move {
            while let Some(msg) = inbox.recv().await {
                match serde_json::to_string(&msg) {
                    Ok(json) => println!("{id} <- {json}"),
                    Err(e) => error!("Failed to encode delivery for {id}: {e}"),
                }
            }
        }));
    }

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received. Exiting gracefully.");
                ctrl_c.trigger();
            }
            Err(e) => error!("Cannot listen for Ctrl-C: {e}"),
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.triggered() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let Some(message) = parse_line(&args.sender, &line) else {
            continue;
        };

        match service.send(message).await {
            Ok(()) => {}
            Err(ChatError::Broker(e)) => {
                error!("Broker refused message: {e}");
                break;
            }
            Err(e) => error!("Message not sent: {e}"),
        }
    }

    // Let the loop drain what stdin already queued before stopping it.
    while !shutdown.is_triggered() && broker.queued_len() > 0 {
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
    broker.stop();
    broker.join().await;

    for id in &args.users {
        let _ = service.leave(id);
    }
    for printer in printers {
        let _ = printer.await;
    }

    info!(messages = service.history(None).len(), "Chat closed");
    Ok(())
}

fn parse_line(sender: &str, line: &str) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.strip_prefix('@') {
        Some(rest) => {
            let (recipient, content) = rest.split_once(' ').unwrap_or((rest, ""));
            Some(Message::direct(sender, recipient, content.trim()))
        }
        None => Some(Message::broadcast(sender, line)),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_line;

    #[test]
    fn test_parse_line() {
        assert!(parse_line("alice", "   ").is_none());

        let direct = parse_line("alice", "@bob  hello there").unwrap();
        assert_eq!(direct.recipient, "bob");
        assert_eq!(direct.content, "hello there");
        assert!(!direct.broadcast);

        let all = parse_line("alice", "hi all").unwrap();
        assert!(all.broadcast);
        assert_eq!(all.sender, "alice");
    }
}
