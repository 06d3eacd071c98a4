//! Confirmation step in front of destructive actions.

use crate::core::Result;
use async_trait::async_trait;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::{Level, event};

/// Style of the continue button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Danger,
}

/// Already-resolved text of a confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub continue_label: String,
    pub cancel_label: String,
    pub variant: ButtonVariant,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            continue_label: "Continue".to_string(),
            cancel_label: "Cancel".to_string(),
            variant: ButtonVariant::Primary,
        }
    }

    pub fn continue_label(mut self, label: impl Into<String>) -> Self {
        self.continue_label = label.into();
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = label.into();
        self
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }
}

/// What the user did with the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDecision {
    Confirmed,
    Cancelled,
    /// Closed without choosing
    Dismissed,
}

impl ConfirmDecision {
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmDecision::Confirmed)
    }
}

/// Shows a prompt and reports the user's choice.
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn ask(&self, prompt: &ConfirmPrompt) -> Result<ConfirmDecision>;
}

/// Asks `gate` and runs `on_confirm` only on an explicit confirmation.
///
/// Returns `None` when the prompt was cancelled or dismissed.
pub async fn confirm<G, F, Fut>(
    gate: &G,
    prompt: &ConfirmPrompt,
    on_confirm: F,
) -> Result<Option<Fut::Output>>
where
    G: ConfirmGate + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future,
{
    let decision = gate.ask(prompt).await?;
    event!(Level::INFO, title = %prompt.title, ?decision, "confirmation answered");

    if !decision.is_confirmed() {
        return Ok(None);
    }
    Ok(Some(on_confirm().await))
}

/// Open/closed flag of a dialog, owned by whoever shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DialogState {
    open: bool,
}

impl DialogState {
    pub fn opened() -> Self {
        Self { open: true }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}

/// Non-interactive gate that confirms everything (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

#[async_trait]
impl ConfirmGate for AssumeYes {
    async fn ask(&self, _prompt: &ConfirmPrompt) -> Result<ConfirmDecision> {
        Ok(ConfirmDecision::Confirmed)
    }
}

/// Line-based prompt: `y`/`yes` confirms, end of input dismisses, anything
/// else cancels.
pub struct TerminalConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl TerminalConfirm<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TerminalConfirm<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner()
    }
}

fn render(prompt: &ConfirmPrompt) -> String {
    let marker = match prompt.variant {
        ButtonVariant::Danger => "!! ",
        ButtonVariant::Primary => "",
    };
    format!(
        "{}{}\n{}\n{} [y] / {} [N]: ",
        marker, prompt.title, prompt.message, prompt.continue_label, prompt.cancel_label
    )
}

#[async_trait]
impl<R, W> ConfirmGate for TerminalConfirm<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn ask(&self, prompt: &ConfirmPrompt) -> Result<ConfirmDecision> {
        let mut io = self.io.lock().await;
        let (reader, writer) = &mut *io;

        writer.write_all(render(prompt).as_bytes()).await?;
        writer.flush().await?;

        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(ConfirmDecision::Dismissed);
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(ConfirmDecision::Confirmed),
            _ => Ok(ConfirmDecision::Cancelled),
        }
    }
}
