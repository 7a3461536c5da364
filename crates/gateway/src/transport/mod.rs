//! Request/reply transport between the core and the execution side
//!
//! Instructions travel over an in-process tokio channel; each request
//! carries a oneshot for its reply. The [`Requester`] trait is the seam a
//! networked transport would implement.

pub mod channel;

pub use channel::{ChannelRequester, ChannelResponder};

use crate::error::TransportError;
use async_trait::async_trait;

/// Send a request and wait for its reply
#[async_trait]
pub trait Requester<Req, Res>: Send + Sync
where
    Req: Send + Sync,
    Res: Send,
{
    async fn request(&self, req: &Req) -> Result<Res, TransportError>;
}
