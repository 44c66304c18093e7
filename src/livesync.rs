// src/livesync.rs

//! Live-sync notification hub.
//!
//! In watch mode with `sync = true`, rebuilt artifacts are announced to
//! connected browser clients: stylesheet changes are injected in place,
//! script changes trigger a full reload. The HTTP proxy and the browser
//! transport live outside this crate; they subscribe to the hub and relay
//! [`Notification`]s.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::errors::{AssetflowError, Result};

/// Capacity of the broadcast buffer; slow clients past this lag and skip.
const CHANNEL_CAPACITY: usize = 64;

/// Message pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Reload the whole page.
    Reload,
    /// Swap the stylesheet at `path` without reloading.
    InjectCss { path: String },
}

struct Hub {
    target: String,
    tx: broadcast::Sender<Notification>,
}

/// Cheap, cloneable handle to the running hub. Dropping the last handle
/// closes every subscription.
#[derive(Clone)]
pub struct LiveSyncHandle {
    inner: Arc<Hub>,
}

impl fmt::Debug for LiveSyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSyncHandle")
            .field("target", &self.inner.target)
            .field("clients", &self.client_count())
            .finish()
    }
}

impl LiveSyncHandle {
    /// Start the hub in front of `target` (the upstream site URL).
    pub fn start(target: &str) -> Result<Self> {
        validate_target(target)?;
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        info!(target = %target, "live-sync started");
        Ok(Self {
            inner: Arc::new(Hub {
                target: target.to_string(),
                tx,
            }),
        })
    }

    pub fn target(&self) -> &str {
        &self.inner.target
    }

    /// Register a client.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }

    /// Push a notification to every connected client; returns how many
    /// received it. No clients is not an error.
    pub fn notify(&self, notification: Notification) -> usize {
        match self.inner.tx.send(notification.clone()) {
            Ok(n) => {
                info!(?notification, clients = n, "live-sync notification sent");
                n
            }
            Err(_) => {
                debug!(?notification, "no live-sync clients connected");
                0
            }
        }
    }
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://[A-Za-z0-9.\-_~]+(:[0-9]{1,5})?(/[^\s]*)?$")
            .expect("static regex is valid")
    })
}

/// `sync = true` requires an absolute http(s) URL.
pub fn validate_target(target: &str) -> Result<()> {
    if url_regex().is_match(target) {
        Ok(())
    } else {
        Err(AssetflowError::LiveSync(format!(
            "syncTarget must be an http(s) URL (got '{target}')"
        )))
    }
}
