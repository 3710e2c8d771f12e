use crate::prelude::*;

/// Yields the current terminal size once up front and again after every
/// SIGWINCH.
pub struct Resizer {
    winches:
        Box<dyn futures::stream::Stream<Item = (), Error = Error> + Send>,
    sent_initial_size: bool,
}

impl Resizer {
    pub fn new() -> Self {
        let winches = tokio_signal::unix::Signal::new(
            tokio_signal::unix::libc::SIGWINCH,
        )
        .flatten_stream()
        .map(|_| ())
        .context(crate::error::SigWinchHandler);
        Self {
            winches: Box::new(winches),
            sent_initial_size: false,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use = "streams do nothing unless polled"]
impl futures::stream::Stream for Resizer {
    type Item = crate::term::Size;
    type Error = Error;

    fn poll(&mut self) -> futures::Poll<Option<Self::Item>, Self::Error> {
        if !self.sent_initial_size {
            self.sent_initial_size = true;
            return Ok(futures::Async::Ready(Some(crate::term::Size::get()?)));
        }
        let _ = futures::try_ready!(self.winches.poll());
        Ok(futures::Async::Ready(Some(crate::term::Size::get()?)))
    }
}
