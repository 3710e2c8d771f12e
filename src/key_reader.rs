use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    // zero based index into the candidate list
    Select(usize),
    Submit,
    Quit,
}

impl Key {
    fn from_event(event: &crossterm::input::InputEvent) -> Option<Self> {
        match event {
            crossterm::input::InputEvent::Keyboard(key) => match key {
                crossterm::input::KeyEvent::Char(c) => Self::from_char(*c),
                crossterm::input::KeyEvent::Ctrl('c') => Some(Self::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='9' => c
                .to_digit(10)
                .map(|digit| Self::Select(digit as usize - 1)),
            ' ' | '\r' | '\n' => Some(Self::Submit),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

pub struct KeyReader {
    events: Option<tokio::sync::mpsc::UnboundedReceiver<Key>>,
    quit: Option<tokio::sync::oneshot::Sender<()>>,
}

impl KeyReader {
    pub fn new() -> Self {
        Self {
            events: None,
            quit: None,
        }
    }

    fn start(&mut self) -> Result<()> {
        let task = futures::task::current();
        let reader = crossterm::input::input().read_sync();
        let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut events_tx = events_tx.wait();
        let (quit_tx, mut quit_rx) = tokio::sync::oneshot::channel();
        // crossterm only gives us a blocking reader, so it gets its own
        // thread
        std::thread::Builder::new()
            .spawn(move || {
                for event in reader {
                    if let Some(key) = Key::from_event(&event) {
                        if events_tx.send(key).is_err() {
                            break;
                        }
                        task.notify();
                    }
                    if quit_rx.try_recv().is_ok() {
                        break;
                    }
                }
            })
            .context(crate::error::TerminalInputReadingThread)?;

        self.events = Some(events_rx);
        self.quit = Some(quit_tx);
        Ok(())
    }
}

impl Default for KeyReader {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use = "streams do nothing unless polled"]
impl futures::stream::Stream for KeyReader {
    type Item = Key;
    type Error = Error;

    fn poll(&mut self) -> futures::Poll<Option<Self::Item>, Self::Error> {
        if self.events.is_none() {
            self.start()?;
        }

        match &mut self.events {
            Some(events) => events.poll().context(crate::error::ReadChannel),
            None => Ok(futures::Async::Ready(None)),
        }
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        if let Some(quit_tx) = self.quit.take() {
            // the thread may already be gone if the input stream ended
            let _ = quit_tx.send(());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_char('1'), Some(Key::Select(0)));
        assert_eq!(Key::from_char('9'), Some(Key::Select(8)));
        assert_eq!(Key::from_char('0'), None);
        assert_eq!(Key::from_char(' '), Some(Key::Submit));
        assert_eq!(Key::from_char('\r'), Some(Key::Submit));
        assert_eq!(Key::from_char('q'), Some(Key::Quit));
        assert_eq!(Key::from_char('x'), None);
        assert_eq!(
            Key::from_event(&crossterm::input::InputEvent::Keyboard(
                crossterm::input::KeyEvent::Ctrl('c')
            )),
            Some(Key::Quit)
        );
    }
}
