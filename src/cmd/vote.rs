use crate::prelude::*;

const TICK: std::time::Duration = std::time::Duration::from_millis(100);

#[derive(serde::Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    client: crate::config::Client,

    #[serde(default)]
    poll: crate::config::Poll,

    #[serde(default)]
    ballot: crate::config::Ballot,
}

impl crate::config::Config for Config {
    fn merge_args<'a>(
        &mut self,
        matches: &clap::ArgMatches<'a>,
    ) -> Result<()> {
        self.client.merge_args(matches)?;
        self.poll.merge_args(matches)?;
        self.ballot.merge_args(matches)?;
        Ok(())
    }

    fn run(
        &self,
    ) -> Box<dyn futures::Future<Item = (), Error = Error> + Send> {
        let transport =
            match crate::client::Http::new(&self.client.server_address) {
                Ok(transport) => transport,
                Err(e) => return Box::new(futures::future::err(e)),
            };
        log::info!("connecting to {}", self.client.server_address);
        Box::new(VoteSession::new(
            transport,
            self.poll.intervals(),
            &self.ballot.candidates,
        ))
    }
}

pub fn cmd<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    crate::config::Client::cmd(crate::config::Poll::cmd(
        crate::config::Ballot::cmd(app.about("Join the vote")),
    ))
}

pub fn config(
    config: Option<config::Config>,
) -> Result<Box<dyn crate::config::Config>> {
    let config: Config = if let Some(config) = config {
        config
            .try_into()
            .context(crate::error::CouldntParseConfig)?
    } else {
        Config::default()
    };
    Ok(Box::new(config))
}

// requests the session has asked for, along with the responses we are
// still waiting on
struct Dispatcher<T: crate::client::Transport> {
    transport: T,
    in_flight: Vec<(crate::session::Request, crate::client::ResponseFuture)>,
}

impl<T: crate::client::Transport> Dispatcher<T> {
    fn new(transport: T) -> Self {
        Self {
            transport,
            in_flight: vec![],
        }
    }

    fn send_requests(
        &mut self,
        session: &mut crate::session::Session,
    ) -> component_future::Poll<(), Error> {
        let mut did_work = false;
        while let Some(request) = session.next_request() {
            log::debug!("dispatching {}", request.endpoint());
            let fut = self.transport.send(&request);
            self.in_flight.push((request, fut));
            did_work = true;
        }
        if did_work {
            Ok(component_future::Async::DidWork)
        } else {
            Ok(component_future::Async::NothingToDo)
        }
    }

    // a failed request never ends the session, it only means this tick
    // had no effect
    fn poll_responses(
        &mut self,
        session: &mut crate::session::Session,
    ) -> component_future::Poll<(), Error> {
        if self.in_flight.is_empty() {
            return Ok(component_future::Async::NothingToDo);
        }

        let mut did_work = false;
        let mut i = 0;
        while i < self.in_flight.len() {
            let res = match self.in_flight[i].1.poll() {
                Ok(futures::Async::Ready(body)) => Ok(body),
                Ok(futures::Async::NotReady) => {
                    i += 1;
                    continue;
                }
                Err(e) => Err(e),
            };
            let (request, _) = self.in_flight.swap_remove(i);
            let now = std::time::Instant::now();
            match res {
                Ok(body) => session.handle_response(&request, &body, now),
                Err(e) => session.handle_failure(&request, &e, now),
            }
            did_work = true;
        }

        if did_work {
            Ok(component_future::Async::DidWork)
        } else {
            Ok(component_future::Async::NotReady)
        }
    }
}

struct VoteSession<T: crate::client::Transport> {
    session: crate::session::Session,
    dispatcher: Dispatcher<T>,
    ticks: tokio::timer::Interval,

    key_reader: crate::key_reader::KeyReader,
    resizer: crate::resize::Resizer,
    terminal: crate::term::Terminal,
}

impl<T: crate::client::Transport> VoteSession<T> {
    fn new(
        transport: T,
        intervals: crate::session::Intervals,
        candidates: &[String],
    ) -> Self {
        let now = std::time::Instant::now();
        Self {
            session: crate::session::Session::new(intervals, candidates, now),
            dispatcher: Dispatcher::new(transport),
            ticks: tokio::timer::Interval::new(now, TICK),

            key_reader: crate::key_reader::KeyReader::new(),
            resizer: crate::resize::Resizer::new(),
            terminal: crate::term::Terminal::new(),
        }
    }

    fn handle_key(&mut self, key: crate::key_reader::Key) {
        // choosing and submitting only make sense while the form is up
        if self.session.screen().active() != crate::screen::Screen::Voting {
            return;
        }
        match key {
            crate::key_reader::Key::Select(idx) => {
                self.session.select_candidate(idx);
            }
            crate::key_reader::Key::Submit => {
                if let Err(e) = self.session.submit_selected() {
                    log::info!("not submitting vote: {}", e);
                }
            }
            crate::key_reader::Key::Quit => {}
        }
    }
}

impl<T: crate::client::Transport + 'static> VoteSession<T> {
    const POLL_FNS:
        &'static [&'static dyn for<'a> Fn(
            &'a mut Self,
        )
            -> component_future::Poll<
            (),
            Error,
        >] = &[
        &Self::poll_input,
        &Self::poll_tick,
        &Self::poll_send_requests,
        &Self::poll_responses,
        &Self::poll_resize,
        &Self::poll_draw,
    ];

    fn poll_input(&mut self) -> component_future::Poll<(), Error> {
        match component_future::try_ready!(self.key_reader.poll()) {
            Some(crate::key_reader::Key::Quit) => {
                self.terminal.finish()?;
                Ok(component_future::Async::Ready(()))
            }
            Some(key) => {
                self.handle_key(key);
                Ok(component_future::Async::DidWork)
            }
            // stdin closed, so the only thing left to do is watch
            None => Ok(component_future::Async::NothingToDo),
        }
    }

    fn poll_tick(&mut self) -> component_future::Poll<(), Error> {
        let _ = component_future::try_ready!(self
            .ticks
            .poll()
            .context(crate::error::Timer));
        self.session.tick(std::time::Instant::now());
        Ok(component_future::Async::DidWork)
    }

    fn poll_send_requests(&mut self) -> component_future::Poll<(), Error> {
        self.dispatcher.send_requests(&mut self.session)
    }

    fn poll_responses(&mut self) -> component_future::Poll<(), Error> {
        self.dispatcher.poll_responses(&mut self.session)
    }

    fn poll_resize(&mut self) -> component_future::Poll<(), Error> {
        match component_future::try_ready!(self.resizer.poll()) {
            Some(size) => {
                self.terminal.resize(size);
                self.session.screen_mut().mark_dirty();
                Ok(component_future::Async::DidWork)
            }
            None => Ok(component_future::Async::NothingToDo),
        }
    }

    fn poll_draw(&mut self) -> component_future::Poll<(), Error> {
        if !self.session.screen_mut().take_dirty() {
            return Ok(component_future::Async::NothingToDo);
        }
        self.terminal
            .draw(self.session.screen(), self.session.form())?;
        Ok(component_future::Async::DidWork)
    }
}

#[must_use = "futures do nothing unless polled"]
impl<T: crate::client::Transport + 'static> futures::Future
    for VoteSession<T>
{
    type Item = ();
    type Error = Error;

    fn poll(&mut self) -> futures::Poll<Self::Item, Self::Error> {
        component_future::poll_future(self, Self::POLL_FNS)
    }
}
