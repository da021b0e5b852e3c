//! Progress handler seam and the cancellation gate around it

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// What the caller wants after seeing a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    Continue,
    /// Stop scheduling new directories; scans already running still finish
    Stop,
}

/// Receives batches of newly discovered `.git` paths
///
/// Invocations never overlap: the engine awaits each call before making the
/// next one. Returning an error aborts the crawl.
#[async_trait]
pub trait ProgressHandler: Send {
    async fn on_progress(&mut self, batch: &[PathBuf]) -> anyhow::Result<Control>;
}

#[async_trait]
impl<H: ProgressHandler + ?Sized> ProgressHandler for &mut H {
    async fn on_progress(&mut self, batch: &[PathBuf]) -> anyhow::Result<Control> {
        (**self).on_progress(batch).await
    }
}

#[async_trait]
impl<H: ProgressHandler + ?Sized> ProgressHandler for Box<H> {
    async fn on_progress(&mut self, batch: &[PathBuf]) -> anyhow::Result<Control> {
        (**self).on_progress(batch).await
    }
}

/// Handler built from a synchronous closure, see [`handler_fn`]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a synchronous closure as a [`ProgressHandler`]
///
/// ```
/// use repo_finder::core::{handler_fn, Control};
///
/// let mut seen = 0;
/// let _handler = handler_fn(move |batch| {
///     seen += batch.len();
///     Ok(if seen >= 10 { Control::Stop } else { Control::Continue })
/// });
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(&[PathBuf]) -> anyhow::Result<Control> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F> ProgressHandler for FnHandler<F>
where
    F: FnMut(&[PathBuf]) -> anyhow::Result<Control> + Send,
{
    async fn on_progress(&mut self, batch: &[PathBuf]) -> anyhow::Result<Control> {
        (self.f)(batch)
    }
}

/// Forwards each batch into a bounded channel
///
/// Waiting for channel capacity holds back the next delivery, so a slow
/// consumer paces the progress stream. A dropped receiver stops the crawl.
pub struct ChannelHandler {
    sender: mpsc::Sender<Vec<PathBuf>>,
}

impl ChannelHandler {
    pub fn new(sender: mpsc::Sender<Vec<PathBuf>>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl ProgressHandler for ChannelHandler {
    async fn on_progress(&mut self, batch: &[PathBuf]) -> anyhow::Result<Control> {
        match self.sender.send(batch.to_vec()).await {
            Ok(()) => Ok(Control::Continue),
            Err(_) => {
                tracing::debug!("Progress receiver dropped, requesting stop");
                Ok(Control::Stop)
            }
        }
    }
}

/// Invokes the handler and remembers whether it asked to stop
///
/// Once a stop has been requested, later deliveries still reach the handler
/// but their returned [`Control`] no longer matters.
pub(crate) struct CancellationGate<H> {
    handler: H,
    stop_requested: bool,
    deliveries: u64,
}

impl<H: ProgressHandler> CancellationGate<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            stop_requested: false,
            deliveries: 0,
        }
    }

    /// Delivers one batch; an `Err` means the crawl must abort
    pub async fn deliver(&mut self, batch: &[PathBuf]) -> anyhow::Result<()> {
        self.deliveries += 1;
        let control = self.handler.on_progress(batch).await?;

        if control == Control::Stop && !self.stop_requested {
            tracing::info!(
                "Progress handler requested stop after {} deliveries",
                self.deliveries
            );
            self.stop_requested = true;
        }

        Ok(())
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }
}
