//! One-shot, ordered delivery of transient effects to a single consumer.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

/// Effects are queued for whichever consumer is attached at emission time.
/// Nothing is buffered for consumers that attach later.
pub struct EffectChannel<E> {
    consumer: Mutex<Option<UnboundedSender<E>>>,
}

impl<E: Send + 'static> EffectChannel<E> {
    pub fn new() -> Self {
        Self {
            consumer: Mutex::new(None),
        }
    }

    /// Queues `effect` for the attached consumer. Returns `false` when no
    /// consumer is attached and the effect was dropped.
    pub fn emit(&self, effect: E) -> bool {
        let mut consumer = self.consumer.lock();
        let Some(sender) = consumer.as_ref() else {
            debug!("no effect consumer attached; effect dropped");
            return false;
        };
        if sender.send(effect).is_err() {
            debug!("effect consumer went away; effect dropped");
            *consumer = None;
            return false;
        }
        true
    }

    /// Attaches a new consumer, replacing (and ending) any previous one.
    pub fn consume(&self) -> EffectStream<E> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.consumer.lock() = Some(sender);
        EffectStream {
            inner: UnboundedReceiverStream::new(receiver),
        }
    }

    pub fn has_consumer(&self) -> bool {
        self.consumer
            .lock()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }
}

impl<E: Send + 'static> Default for EffectChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer side of an [`EffectChannel`]. Yields effects in emission order and
/// ends only when the channel is dropped or another consumer attaches.
pub struct EffectStream<E> {
    inner: UnboundedReceiverStream<E>,
}

impl<E> EffectStream<E> {
    /// Takes the next already-queued effect without waiting.
    pub fn try_next(&mut self) -> Option<E> {
        match self.inner.as_mut().try_recv() {
            Ok(effect) => Some(effect),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains every effect queued so far.
    pub fn drain_ready(&mut self) -> Vec<E> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl<E> Stream for EffectStream<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
