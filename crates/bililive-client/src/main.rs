//! bililive CLI
//!
//! Usage: `bililive [config.yaml] [room_id]`
//! - Joins one room and logs chat messages, gifts, online changes and live state
//! - Ctrl-C disconnects cleanly

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use bililive_client::{config, Event, Flow, Session};
use bililive_core::protocol::cmd;

const DEFAULT_CONFIG: &str = "bililive.yaml";

fn log_danmaku(ev: &Event) -> Flow {
    match ev.danmaku() {
        Ok(d) => tracing::info!(room = ev.room_id, uid = d.uid, user = %d.uname, "{}", d.text),
        Err(e) => tracing::debug!(error = %e, "unreadable chat message"),
    }
    Flow::Continue
}

fn log_gift(ev: &Event) -> Flow {
    match ev.gift() {
        Ok(g) => tracing::info!(room = ev.room_id, user = %g.uname, "gift {} x{}", g.gift_name, g.num),
        Err(e) => tracing::debug!(error = %e, "unreadable gift"),
    }
    Flow::Continue
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let cfg = if std::path::Path::new(&path).exists() {
        match config::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, %path, "config load failed");
                return ExitCode::FAILURE;
            }
        }
    } else {
        tracing::info!(%path, "config not found, using defaults");
        config::ClientConfig::default()
    };

    let room = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(room)) => room,
        Some(Err(e)) => {
            tracing::error!(error = %e, "room_id must be a number");
            return ExitCode::FAILURE;
        }
        None => match cfg.room {
            Some(room) => room,
            None => {
                tracing::error!("no room given: pass one on the command line or set `room` in the config");
                return ExitCode::FAILURE;
            }
        },
    };

    let session = match Session::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "session setup failed");
            return ExitCode::FAILURE;
        }
    };

    session.register_fn(cmd::DANMU_MSG, log_danmaku);
    session.register_fn(cmd::SEND_GIFT, log_gift);
    session.register_fn(cmd::ONLINE_CHANGE, |ev: &Event| {
        if let Ok(online) = ev.online() {
            tracing::info!(room = ev.room_id, online, "online changed");
        }
        Flow::Continue
    });
    session.register_fn(cmd::LIVE, |ev: &Event| {
        tracing::info!(room = ev.room_id, owner = %ev.owner_name, "stream is live");
        Flow::Continue
    });
    session.register_fn(cmd::PREPARING, |ev: &Event| {
        tracing::info!(room = ev.room_id, owner = %ev.owner_name, "stream went offline");
        Flow::Continue
    });
    session.register_fn(cmd::ALL, |ev: &Event| {
        tracing::trace!(cmd = %ev.cmd, "event");
        Flow::Continue
    });

    let handle = session.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received, disconnecting");
            handle.disconnect();
        }
    });

    match session.connect(room).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), "session failed");
            ExitCode::FAILURE
        }
    }
}
