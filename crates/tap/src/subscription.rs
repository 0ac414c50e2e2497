//! Consumer handle for one live stream
//!
//! A `Subscription` owns the receiving end of a bounded queue that the
//! router fills. Closing it stops further enqueues immediately, but
//! envelopes already queued are still yielded before end-of-stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::debug;

use firehose_envelope::Envelope;

use crate::error::{Result, TapError};
use crate::filter::StreamFilter;
use crate::subscriber::SubscriberState;

/// An open, filtered live stream
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    filter: StreamFilter,
    receiver: mpsc::Receiver<Arc<Envelope>>,
    state: Arc<SubscriberState>,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        filter: StreamFilter,
        receiver: mpsc::Receiver<Arc<Envelope>>,
        state: Arc<SubscriberState>,
    ) -> Self {
        Self {
            id,
            filter,
            receiver,
            state,
        }
    }

    /// Unique subscription ID
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Filter this subscription was registered with
    #[inline]
    pub fn filter(&self) -> &StreamFilter {
        &self.filter
    }

    /// Envelopes dropped because this subscription's queue was full
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.state.dropped()
    }

    /// True until closed, unsubscribed, or evicted
    pub fn is_open(&self) -> bool {
        !self.state.is_closed() && !self.state.is_evicted()
    }

    /// True if the router removed this subscription for persistent overflow
    pub fn is_evicted(&self) -> bool {
        self.state.is_evicted()
    }

    /// Wait for the next envelope
    ///
    /// Returns `None` once the subscription is closed and its queue drained.
    pub async fn next(&mut self) -> Option<Arc<Envelope>> {
        self.receiver.recv().await
    }

    /// Wait for the next envelope, up to `timeout`
    ///
    /// # Errors
    ///
    /// Returns `TapError::Timeout` if nothing arrived in time. `Ok(None)`
    /// means end-of-stream.
    pub async fn next_timeout(&mut self, timeout: Duration) -> Result<Option<Arc<Envelope>>> {
        tokio::time::timeout(timeout, self.receiver.recv())
            .await
            .map_err(|_| TapError::Timeout {
                id: self.id,
                waited: timeout,
            })
    }

    /// Take the next queued envelope without waiting
    pub fn try_next(&mut self) -> Option<Arc<Envelope>> {
        match self.receiver.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued without waiting
    pub fn drain(&mut self) -> Vec<Arc<Envelope>> {
        let mut out = Vec::new();
        while let Some(envelope) = self.try_next() {
            out.push(envelope);
        }
        out
    }

    /// Close the subscription
    ///
    /// Idempotent. No envelope is enqueued after this returns; envelopes
    /// already queued remain readable through `next`.
    pub fn close(&mut self) {
        if self.state.close() {
            debug!(subscription_id = self.id, "subscription closed");
        }
        self.receiver.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.state.close();
    }
}

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;
