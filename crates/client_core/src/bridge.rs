//! Host bridge capability: the embedding chat runtime, or a logging stand-in
//! when the picker runs on its own.

use std::sync::{Arc, Mutex, RwLock};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

pub const ORDER_BUTTON_TEXT: &str = "🚕 Order";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeParams {
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub hint_color: Option<String>,
    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub button_text_color: Option<String>,
}

/// Presentation variables derived from the host theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeVariables {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub btn: String,
    pub btnfg: String,
}

impl Default for ThemeVariables {
    fn default() -> Self {
        Self::from_params(&ThemeParams::default())
    }
}

impl ThemeVariables {
    pub fn from_params(params: &ThemeParams) -> Self {
        fn pick(value: &Option<String>, fallback: &str) -> String {
            value
                .as_deref()
                .filter(|color| !color.trim().is_empty())
                .unwrap_or(fallback)
                .to_string()
        }

        Self {
            bg: pick(&params.bg_color, "#ffffff"),
            fg: pick(&params.text_color, "#111111"),
            muted: pick(&params.hint_color, "#6b7280"),
            btn: pick(&params.button_color, "#111111"),
            btnfg: pick(&params.button_text_color, "#ffffff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainButton {
    Hidden,
    Visible { text: String, enabled: bool },
}

impl MainButton {
    pub fn order() -> Self {
        Self::Visible {
            text: ORDER_BUTTON_TEXT.to_string(),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Visible { enabled: true, .. })
    }
}

pub trait HostBridge: Send + Sync {
    /// False for the standalone fallback; submission never leaves the process then.
    fn is_embedded(&self) -> bool;
    fn theme_params(&self) -> Option<ThemeParams>;
    fn ready(&self);
    fn expand(&self);
    fn set_main_button(&self, button: MainButton);
    fn send_data(&self, data: &str) -> Result<()>;
    fn close(&self) -> Result<()>;
}

/// Chosen once at startup.
pub fn select_bridge(embedded: Option<Arc<dyn HostBridge>>) -> Arc<dyn HostBridge> {
    match embedded {
        Some(bridge) => bridge,
        None => {
            info!("no host bridge present; orders will only be logged");
            Arc::new(LoggingBridge::default())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    Ready,
    Expand,
    MainButton(MainButton),
    SendData(String),
    Close,
}

impl BridgeCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Expand => "expand",
            Self::MainButton(_) => "main_button",
            Self::SendData(_) => "send_data",
            Self::Close => "close",
        }
    }
}

/// Forwards bridge calls to the embedding runtime over a bounded queue.
pub struct ChannelBridge {
    tx: mpsc::Sender<BridgeCommand>,
    theme: RwLock<Option<ThemeParams>>,
}

impl ChannelBridge {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<BridgeCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                theme: RwLock::new(None),
            },
            rx,
        )
    }

    pub fn update_theme(&self, params: ThemeParams) {
        if let Ok(mut theme) = self.theme.write() {
            *theme = Some(params);
        }
    }

    fn dispatch(&self, cmd: BridgeCommand) -> Result<()> {
        let name = cmd.name();
        match self.tx.try_send(cmd) {
            Ok(()) => {
                debug!(command = name, "queued host bridge command");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(anyhow!("host bridge queue is full")),
            Err(TrySendError::Closed(_)) => Err(anyhow!("host bridge disconnected")),
        }
    }

    fn dispatch_best_effort(&self, cmd: BridgeCommand) {
        if let Err(err) = self.dispatch(cmd) {
            warn!(error = %err, "host bridge command dropped");
        }
    }
}

impl HostBridge for ChannelBridge {
    fn is_embedded(&self) -> bool {
        true
    }

    fn theme_params(&self) -> Option<ThemeParams> {
        self.theme.read().ok().and_then(|theme| theme.clone())
    }

    fn ready(&self) {
        self.dispatch_best_effort(BridgeCommand::Ready);
    }

    fn expand(&self) {
        self.dispatch_best_effort(BridgeCommand::Expand);
    }

    fn set_main_button(&self, button: MainButton) {
        self.dispatch_best_effort(BridgeCommand::MainButton(button));
    }

    fn send_data(&self, data: &str) -> Result<()> {
        self.dispatch(BridgeCommand::SendData(data.to_string()))
    }

    fn close(&self) -> Result<()> {
        self.dispatch(BridgeCommand::Close)
    }
}

#[derive(Debug, Default)]
pub struct LoggingBridge {
    logged: Mutex<Vec<String>>,
}

impl LoggingBridge {
    pub fn logged_payloads(&self) -> Vec<String> {
        self.logged
            .lock()
            .map(|logged| logged.clone())
            .unwrap_or_default()
    }
}

impl HostBridge for LoggingBridge {
    fn is_embedded(&self) -> bool {
        false
    }

    fn theme_params(&self) -> Option<ThemeParams> {
        None
    }

    fn ready(&self) {}

    fn expand(&self) {}

    fn set_main_button(&self, button: MainButton) {
        debug!(?button, "main button (standalone)");
    }

    fn send_data(&self, data: &str) -> Result<()> {
        info!(payload = data, "WebAppData");
        if let Ok(mut logged) = self.logged.lock() {
            logged.push(data.to_string());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/bridge_tests.rs"]
mod tests;
