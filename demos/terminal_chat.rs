//! Interactive terminal chat.
//!
//! Demonstrates:
//! - Display name prompt on first connect
//! - Sending lines typed on stdin
//! - Rendering records with their local time label
//! - Forcing a reconnect with `/reconnect`
//!
//! Usage:
//!   cargo run --example terminal_chat
//!   cargo run --example terminal_chat -- --page https://chat.example.com/
//!   cargo run --example terminal_chat -- --name Alice --port 9000 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use chat_client::{
    Category, ChatClient, ClientEvent, DisplayRecord, IdentityProvider, Result, StatusUpdate,
};
use common::Args;

// ============================================================================
// Constants
// ============================================================================

const CMD_RECONNECT: &str = "/reconnect";
const CMD_QUIT: &str = "/quit";

// ============================================================================
// Identity Prompt
// ============================================================================

/// Asks the input loop for the next typed line.
struct PromptIdentity {
    requests: mpsc::UnboundedSender<oneshot::Sender<String>>,
}

#[async_trait]
impl IdentityProvider for PromptIdentity {
    async fn display_name(&self) -> Option<String> {
        let (tx, rx) = oneshot::channel();
        self.requests.send(tx).ok()?;
        rx.await.ok()
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Terminal Chat ===");
    println!("Type a message and press Enter. {CMD_RECONNECT} reconnects, {CMD_QUIT} exits.\n");

    let (prompt_tx, mut prompt_rx) = mpsc::unbounded_channel();

    let mut builder = ChatClient::builder().page_url(args.page_url);
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    builder = match args.name {
        Some(name) => builder.display_name(name),
        None => builder.identity(PromptIdentity {
            requests: prompt_tx,
        }),
    };

    let (client, events) = builder.start()?;
    let printer = tokio::spawn(print_events(events));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_prompt: Option<oneshot::Sender<String>> = None;

    loop {
        tokio::select! {
            Some(reply) = prompt_rx.recv() => {
                println!("Enter your name:");
                pending_prompt = Some(reply);
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                if let Some(reply) = pending_prompt.take() {
                    let _ = reply.send(line);
                    continue;
                }

                match line.trim() {
                    CMD_QUIT => break,
                    CMD_RECONNECT => client.force_reconnect()?,
                    _ => client.send(line)?,
                }
            }
        }
    }

    client.shutdown().await;
    let _ = printer.await;

    println!("Bye.");
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

async fn print_events(mut events: mpsc::UnboundedReceiver<ClientEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Record(record) => print_record(&record),
            ClientEvent::Status(update) => print_status(&update),
        }
    }
}

fn print_record(record: &DisplayRecord) {
    let marker = match record.category {
        Category::User => ">",
        Category::Other => " ",
        Category::System => "*",
    };
    println!("[{}] {marker} {}", record.time_label(), record.text);
}

fn print_status(update: &StatusUpdate) {
    let input = if update.input_enabled() { "" } else { " (input disabled)" };
    println!("-- {}{input} --", update.text);
}
