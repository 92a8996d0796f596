//! Krypto Chat terminal client
//!
//! Entry point wiring the chat widget to the realtime channel, the backend
//! API and a terminal surface.

#![allow(clippy::map_err_ignore)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use krypto_chat::api::ApiClient;
use krypto_chat::channel::Transport;
use krypto_chat::channel::socket::SocketIoTransport;
use krypto_chat::config::{AppConfig, LoggingConfig};
use krypto_chat::ui::bubble::INPUT_PLACEHOLDER;
use krypto_chat::ui::{DiskSink, SharedLines, TerminalSurface};
use krypto_chat::widget::{ChatHandle, WidgetOptions};

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Send(String),
    Summary,
    Download,
    Quit,
}

fn parse_action(line: String) -> Action {
    match line.trim() {
        "/summary" => Action::Summary,
        "/download" => Action::Download,
        "/quit" | "/exit" => Action::Quit,
        _ => Action::Send(line),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so they never interleave with the transcript on stdout.
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing (M-LOG-STRUCTURED)
    init_tracing(&config.logging);

    info!(
        name: "chat.config.loaded",
        base_url = %config.server.base_url,
        download_dir = %config.download.directory.display(),
        "Configuration loaded"
    );

    let base_url = Url::parse(&config.server.base_url).context("invalid server.base_url")?;
    let service = Arc::new(ApiClient::new(base_url.as_str())?);

    let socket = Arc::new(SocketIoTransport::new(&base_url)?);
    socket
        .connect()
        .await
        .with_context(|| format!("failed to open realtime channel at {}", socket.endpoint()))?;

    let lines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let surface = TerminalSurface::new(std::io::stdout(), Arc::clone(&lines));
    let sink = DiskSink::new(config.download.directory.clone());
    let options = WidgetOptions {
        download_extension: config.download.extension.clone(),
    };

    let transport: Arc<dyn Transport> = Arc::clone(&socket) as Arc<dyn Transport>;
    let widget = ChatHandle::mount(transport, service, surface, sink, options);
    info!(name: "chat.session.started", session_id = %widget.session(), "Chat session started");

    println!("{INPUT_PLACEHOLDER}  (/summary, /download, /quit)");

    let outcome = command_loop(&widget, &lines).await;

    let state = widget.unmount().await;
    socket.close().await;
    let state = state?;
    info!(
        name: "chat.session.ended",
        session_id = %state.session(),
        entries = state.transcript().len(),
        "Chat session ended"
    );
    outcome
}

/// Read commands from stdin until EOF or `/quit`.
async fn command_loop<R>(widget: &ChatHandle, lines: &SharedLines<R>) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = lines.lock().await.next_line().await?;
        let Some(line) = line else { return Ok(()) };

        match parse_action(line) {
            Action::Send(text) => widget.submit(text)?,
            Action::Summary => widget.generate_summary().await?,
            Action::Download => widget.download_chat()?,
            Action::Quit => return Ok(()),
        }
    }
}
