//! The [`ResponseSource`] trait.
//!
//! A source is the only effect an interpreter needs: fetching the next backend message, and
//! explicitly releasing a message that is not consumed.
use futures_core::Stream;
use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll, ready},
};

use crate::{backend::Response, common::verbose};

/// A source of already decoded backend messages.
pub trait ResponseSource: Unpin {
    /// Poll to fetch the next message.
    ///
    /// Messages must be returned in the order the backend sends them.
    fn poll_fetch(&mut self, cx: &mut Context) -> Poll<io::Result<Response>>;

    /// Release a message that is not consumed by the interpreter.
    ///
    /// Implementor may reclaim any resource tied to the message.
    fn discard(&mut self, response: Response);
}

impl<S> ResponseSource for &mut S where S: ResponseSource {
    fn poll_fetch(&mut self, cx: &mut Context) -> Poll<io::Result<Response>> {
        S::poll_fetch(self, cx)
    }

    fn discard(&mut self, response: Response) {
        S::discard(self, response);
    }
}

/// An extension trait to provide `Future` API for [`ResponseSource`].
pub trait ResponseSourceExt: ResponseSource {
    /// Fetch the next message.
    fn fetch(&mut self) -> impl Future<Output = io::Result<Response>> {
        std::future::poll_fn(|cx|self.poll_fetch(cx))
    }
}

impl<T> ResponseSourceExt for T where T: ResponseSource { }

/// In memory [`ResponseSource`].
///
/// Returns queued messages in order, and keep every discarded message. When the queue is
/// exhausted, fetch returns [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug, Default)]
pub struct Replay {
    queue: VecDeque<Response>,
    discarded: Vec<Response>,
    fetched: usize,
}

impl Replay {
    /// Create new [`Replay`] that returns `responses` in order.
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Self {
        Self {
            queue: responses.into_iter().collect(),
            discarded: Vec::new(),
            fetched: 0,
        }
    }

    /// Queue another message.
    pub fn push(&mut self, response: Response) {
        self.queue.push_back(response);
    }

    /// Messages that have not been fetched.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of messages fetched so far.
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Messages released through [`ResponseSource::discard`], in order.
    pub fn discarded(&self) -> &[Response] {
        &self.discarded
    }
}

impl ResponseSource for Replay {
    fn poll_fetch(&mut self, _: &mut Context) -> Poll<io::Result<Response>> {
        match self.queue.pop_front() {
            Some(response) => {
                self.fetched += 1;
                Poll::Ready(Ok(response))
            },
            None => Poll::Ready(Err(io::ErrorKind::UnexpectedEof.into())),
        }
    }

    fn discard(&mut self, response: Response) {
        self.discarded.push(response);
    }
}

/// [`ResponseSource`] from a [`Stream`] of messages.
///
/// Discarded messages are dropped. End of stream is [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S> {
    /// Create new [`StreamSource`] over `stream`.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> ResponseSource for StreamSource<S>
where
    S: Stream<Item = Response> + Unpin,
{
    fn poll_fetch(&mut self, cx: &mut Context) -> Poll<io::Result<Response>> {
        match ready!(Pin::new(&mut self.stream).poll_next(cx)) {
            Some(response) => Poll::Ready(Ok(response)),
            None => Poll::Ready(Err(io::ErrorKind::UnexpectedEof.into())),
        }
    }

    fn discard(&mut self, response: Response) {
        verbose!(response = response.name(), "dropped");
        drop(response);
    }
}

#[cfg(feature = "tokio")]
pub use channel::ChannelSource;

#[cfg(feature = "tokio")]
mod channel {
    use std::{
        io,
        task::{Context, Poll, ready},
    };
    use tokio::sync::mpsc::Receiver;

    use super::ResponseSource;
    use crate::{backend::Response, common::verbose};

    /// [`ResponseSource`] from a [`tokio`] channel, fed by a transport task.
    ///
    /// Discarded messages are dropped. Closed channel is [`io::ErrorKind::UnexpectedEof`].
    #[derive(Debug)]
    pub struct ChannelSource {
        recv: Receiver<Response>,
    }

    impl ChannelSource {
        /// Create new [`ChannelSource`] receiving from `recv`.
        pub fn new(recv: Receiver<Response>) -> Self {
            Self { recv }
        }
    }

    impl ResponseSource for ChannelSource {
        fn poll_fetch(&mut self, cx: &mut Context) -> Poll<io::Result<Response>> {
            match ready!(self.recv.poll_recv(cx)) {
                Some(response) => Poll::Ready(Ok(response)),
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "transport channel closed",
                ))),
            }
        }

        fn discard(&mut self, response: Response) {
            verbose!(response = response.name(), "dropped");
            drop(response);
        }
    }
}
