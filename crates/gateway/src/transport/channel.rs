//! In-process request/reply over tokio channels
//!
//! Requests queue on a bounded mpsc; the responder answers each one on the
//! oneshot it came with. Dropping the responder fails every outstanding and
//! future request with [`TransportError::ChannelClosed`].

use crate::error::TransportError;
use crate::transport::Requester;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

struct Envelope<Req, Res> {
    request: Req,
    reply_tx: oneshot::Sender<Res>,
}

/// Core side of the channel
pub struct ChannelRequester<Req, Res> {
    tx: mpsc::Sender<Envelope<Req, Res>>,
}

impl<Req, Res> Clone for ChannelRequester<Req, Res> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<Req, Res> ChannelRequester<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Create a requester/responder pair; `capacity` bounds queued requests
    pub fn pair(capacity: usize) -> (Self, ChannelResponder<Req, Res>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, ChannelResponder { rx })
    }
}

#[async_trait]
impl<Req, Res> Requester<Req, Res> for ChannelRequester<Req, Res>
where
    Req: Clone + Send + Sync + 'static,
    Res: Send + 'static,
{
    async fn request(&self, req: &Req) -> Result<Res, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request: req.clone(),
                reply_tx,
            })
            .await
            .map_err(|_| TransportError::ChannelClosed)?;

        reply_rx.await.map_err(|_| TransportError::ChannelClosed)
    }
}

/// Execution side of the channel
pub struct ChannelResponder<Req, Res> {
    rx: mpsc::Receiver<Envelope<Req, Res>>,
}

impl<Req, Res> ChannelResponder<Req, Res> {
    /// Next request with its reply handle; `None` once every requester is gone
    pub async fn next(&mut self) -> Option<(Req, oneshot::Sender<Res>)> {
        self.rx.recv().await.map(|e| (e.request, e.reply_tx))
    }
}
