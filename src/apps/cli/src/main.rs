//! ChatMind CLI
//!
//! Line-oriented chat client over the in-memory pipeline: type a message,
//! watch the canned responder's reply stream in character by character.

use anyhow::{Context, Result};
use chatmind_core::infrastructure::events::EventBus;
use chatmind_core::infrastructure::responder::CannedResponder;
use chatmind_core::infrastructure::store::{ConversationStore, MemoryStore};
use chatmind_core::presentation::TICK_INTERVAL_MS;
use chatmind_core::{ChatMindError, DeliveryCoordinator, StreamPresenter};
use chatmind_core_types::{ConversationId, MessageId, SessionContext};
use chrono::{Local, Utc};
use clap::Parser;
use std::collections::HashMap;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "chatmind-cli", version, about = "ChatMind terminal chat client")]
struct Args {
    /// Display name shown for your messages
    #[arg(long, default_value = "You")]
    name: String,

    /// Base responder delay in milliseconds
    #[arg(long, default_value_t = 1000)]
    responder_delay_ms: u64,

    /// Extra random responder delay in milliseconds
    #[arg(long, default_value_t = 2000)]
    responder_jitter_ms: u64,

    /// Seconds to wait for the responder to acknowledge a trigger
    #[arg(long, default_value_t = 30)]
    reply_timeout_secs: u64,
}

fn default_title() -> String {
    format!("Chat {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

/// Prints the not-yet-printed tail of every message the presenter shows.
/// Streams reveals naturally: each tick grows `shown_chars`, we print the
/// delta.
fn flush_output(
    presenter: &StreamPresenter,
    printed: &mut HashMap<MessageId, usize>,
    user_label: &str,
) {
    let mut stdout = std::io::stdout();
    for entry in presenter.render_list() {
        let already = printed.entry(entry.message.id).or_insert(0);
        if *already >= entry.shown_chars {
            continue;
        }
        if *already == 0 {
            let label = if entry.message.is_responder() {
                "chatmind"
            } else {
                user_label
            };
            let _ = write!(stdout, "[{}] ", label);
        }
        let visible = entry.visible_body();
        let start = visible
            .char_indices()
            .nth(*already)
            .map(|(i, _)| i)
            .unwrap_or(visible.len());
        let _ = write!(stdout, "{}", &visible[start..]);
        *already = entry.shown_chars;
        if !entry.is_revealing() {
            let _ = writeln!(stdout);
        }
    }
    let _ = stdout.flush();
}

struct App {
    store: Arc<MemoryStore>,
    coordinator: DeliveryCoordinator,
    presenter: StreamPresenter,
    ctx: SessionContext,
    printed: HashMap<MessageId, usize>,
    user_label: String,
}

impl App {
    async fn open_conversation(
        &mut self,
        title: &str,
    ) -> Result<(ConversationId, broadcast::Receiver<Vec<chatmind_core_types::Message>>)> {
        let conversation = self
            .store
            .create_conversation(&self.ctx, title)
            .await
            .context("create conversation")?;
        let snapshots = self
            .store
            .subscribe(conversation.id)
            .await
            .context("subscribe to conversation")?;
        self.presenter.set_active_conversation(conversation.id);
        self.printed.clear();
        println!("--- {} ---", conversation.title);
        Ok((conversation.id, snapshots))
    }

    async fn handle_line(&mut self, conversation_id: ConversationId, line: &str) -> Result<bool> {
        match line.trim() {
            "" => return Ok(false),
            "/quit" => return Ok(true),
            "/list" => {
                let conversations = self
                    .store
                    .list_conversations(&self.ctx)
                    .await
                    .context("list conversations")?;
                for c in conversations {
                    println!("  {}  {}", c.id, c.title);
                }
                return Ok(false);
            }
            _ => {}
        }

        if self.coordinator.is_busy(conversation_id) {
            println!("(still waiting on the previous message, hang on)");
            return Ok(false);
        }

        match self.coordinator.submit(conversation_id, line).await {
            Ok(_) => {
                self.presenter.note_user_send();
            }
            Err(e) => match e {
                ChatMindError::Busy { .. } => {
                    println!("(still waiting on the previous message, hang on)");
                }
                ChatMindError::InputRejected => {}
                other => {
                    warn!("Submit failed: error={}", other);
                    if let Some(text) = other.recovered_text() {
                        println!("(message not sent, your text: {})", text);
                    } else {
                        println!("(sent, but the responder is unavailable right now)");
                    }
                }
            },
        }
        Ok(false)
    }

    /// Resyncs after a lagged subscription by refetching the full sequence.
    async fn resync(&mut self, conversation_id: ConversationId) {
        match self.store.fetch_messages(conversation_id).await {
            Ok(messages) => self.presenter.apply_snapshot(messages, Utc::now()),
            Err(e) => warn!("Resync failed: conversation_id={}, error={}", conversation_id, e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ctx = SessionContext::new(Uuid::new_v4()).with_display_name(&args.name);

    let store = Arc::new(MemoryStore::new());
    let responder = Arc::new(CannedResponder::new(store.clone()).with_delay(
        Duration::from_millis(args.responder_delay_ms),
        Duration::from_millis(args.responder_jitter_ms),
    ));
    let coordinator = DeliveryCoordinator::new(
        store.clone(),
        responder,
        ctx.clone(),
        EventBus::new(),
    )
    .with_reply_timeout(Duration::from_secs(args.reply_timeout_secs));

    let user_label = ctx.display_label().to_string();
    let mut app = App {
        store,
        coordinator,
        presenter: StreamPresenter::new(),
        ctx,
        printed: HashMap::new(),
        user_label,
    };

    info!("ChatMind CLI started: user={}", app.user_label);
    println!("ChatMind. Type a message, /new for a fresh chat, /list, /quit.");

    let (mut conversation_id, mut snapshots) = app.open_conversation(&default_title()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                if line.trim() == "/new" {
                    app.coordinator.discard_turn(conversation_id);
                    let (id, rx) = app.open_conversation(&default_title()).await?;
                    conversation_id = id;
                    snapshots = rx;
                    continue;
                }
                if app.handle_line(conversation_id, &line).await? {
                    break;
                }
            }
            snapshot = snapshots.recv() => {
                match snapshot {
                    Ok(snapshot) => app.presenter.apply_snapshot(snapshot, Utc::now()),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Snapshot stream lagged: skipped={}", skipped);
                        app.resync(conversation_id).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ticker.tick() => {
                app.presenter.tick();
            }
        }

        flush_output(&app.presenter, &mut app.printed, &app.user_label);
        app.presenter.take_scroll_request();
    }

    info!("ChatMind CLI exiting");
    Ok(())
}
