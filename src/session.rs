use crate::prelude::*;
use std::convert::TryFrom as _;

const MIN_PERIOD: std::time::Duration = std::time::Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Poller {
    Phase,
    Countdown,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    Connect,
    PhaseStatus,
    CountdownStatus,
    Stats,
    Vote(crate::protocol::Ballot),
    Results,
}

impl Request {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Connect => "/connect",
            Self::PhaseStatus | Self::CountdownStatus => "/status",
            Self::Stats => "/stats",
            Self::Vote(..) => "/vote",
            Self::Results => "/results",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub status: std::time::Duration,
    pub countdown: std::time::Duration,
    pub stats: std::time::Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            status: std::time::Duration::from_secs(3),
            countdown: std::time::Duration::from_secs(1),
            stats: std::time::Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    period: std::time::Duration,
    next: std::time::Instant,
}

impl Timer {
    // fires on the first tick at or after `now`
    fn start(period: std::time::Duration, now: std::time::Instant) -> Self {
        Self {
            period: std::cmp::max(period, MIN_PERIOD),
            next: now,
        }
    }

    fn fire(&mut self, now: std::time::Instant) -> bool {
        if now < self.next {
            return false;
        }
        // ticks we slept through are dropped rather than fired in a burst
        while self.next <= now {
            self.next += self.period;
        }
        true
    }
}

#[derive(Debug, Default)]
struct PollingHandles {
    phase: Option<Timer>,
    countdown: Option<Timer>,
    stats: Option<Timer>,
}

impl PollingHandles {
    fn handle(&mut self, poller: Poller) -> &mut Option<Timer> {
        match poller {
            Poller::Phase => &mut self.phase,
            Poller::Countdown => &mut self.countdown,
            Poller::Stats => &mut self.stats,
        }
    }

    fn start(
        &mut self,
        poller: Poller,
        period: std::time::Duration,
        now: std::time::Instant,
    ) {
        let handle = self.handle(poller);
        if handle.is_none() {
            log::debug!("starting {:?} poller", poller);
            *handle = Some(Timer::start(period, now));
        }
    }

    fn cancel(&mut self, poller: Poller) {
        if self.handle(poller).take().is_some() {
            log::debug!("cancelled {:?} poller", poller);
        }
    }

    fn fire(&mut self, poller: Poller, now: std::time::Instant) -> bool {
        self.handle(poller)
            .as_mut()
            .map(|timer| timer.fire(now))
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn is_active(&self, poller: Poller) -> bool {
        match poller {
            Poller::Phase => self.phase.is_some(),
            Poller::Countdown => self.countdown.is_some(),
            Poller::Stats => self.stats.is_some(),
        }
    }
}

/// Client side state of one participant's voting session.
///
/// The session never performs any I/O itself. The driver calls `tick`
/// periodically, drains the requests it queues with `next_request`, and
/// reports each request's outcome back through `handle_response` or
/// `handle_failure`. Responses may arrive in any order and requests of the
/// same kind may overlap; every handler fully replaces what it renders, so
/// the last response to arrive wins.
pub struct Session {
    intervals: Intervals,

    identity: Option<String>,
    connecting: bool,

    vote_in_flight: bool,
    submitted: bool,

    finalized: bool,
    results_retry: Option<std::time::Instant>,

    timers: PollingHandles,
    screen: crate::screen::Controller,
    form: crate::screen::Form,

    to_send: std::collections::VecDeque<Request>,
}

impl Session {
    pub fn new(
        intervals: Intervals,
        candidates: &[String],
        now: std::time::Instant,
    ) -> Self {
        let mut timers = PollingHandles::default();
        timers.start(Poller::Phase, intervals.status, now);

        let mut to_send = std::collections::VecDeque::new();
        to_send.push_back(Request::Connect);

        Self {
            intervals,

            identity: None,
            connecting: true,

            vote_in_flight: false,
            submitted: false,

            finalized: false,
            results_retry: None,

            timers,
            screen: crate::screen::Controller::new(),
            form: crate::screen::Form::new(candidates),

            to_send,
        }
    }

    pub fn tick(&mut self, now: std::time::Instant) {
        if self.timers.fire(Poller::Phase, now) {
            if self.identity.is_none() && !self.connecting {
                self.connecting = true;
                self.to_send.push_back(Request::Connect);
            }
            self.to_send.push_back(Request::PhaseStatus);
        }
        if self.timers.fire(Poller::Countdown, now) {
            self.to_send.push_back(Request::CountdownStatus);
        }
        if self.timers.fire(Poller::Stats, now) {
            self.to_send.push_back(Request::Stats);
        }
        if let Some(retry) = self.results_retry {
            if now >= retry {
                self.results_retry = None;
                self.to_send.push_back(Request::Results);
            }
        }
    }

    pub fn next_request(&mut self) -> Option<Request> {
        self.to_send.pop_front()
    }

    pub fn select_candidate(&mut self, idx: usize) {
        if self.form.select(idx) {
            self.screen.mark_dirty();
        }
    }

    pub fn submit_selected(&mut self) -> Result<()> {
        let candidate = match self.form.selected() {
            Some(candidate) => candidate.to_string(),
            None => {
                self.screen
                    .notify(&Error::NoCandidateSelected.to_string());
                return Err(Error::NoCandidateSelected);
            }
        };
        self.submit_vote(&candidate)
    }

    pub fn submit_vote(&mut self, candidate: &str) -> Result<()> {
        if self.finalized {
            return Err(Error::VotingClosed);
        }
        let identity = match &self.identity {
            Some(identity) => identity,
            None => {
                log::warn!("refusing to vote without a client id");
                self.screen.notify(&Error::IdentityMissing.to_string());
                return Err(Error::IdentityMissing);
            }
        };
        if self.submitted || self.vote_in_flight {
            return Err(Error::AlreadyVoted);
        }

        log::info!("voting for {}", candidate);
        self.vote_in_flight = true;
        self.to_send.push_back(Request::Vote(crate::protocol::Ballot::new(
            identity, candidate,
        )));
        Ok(())
    }

    pub fn handle_response(
        &mut self,
        request: &Request,
        body: &str,
        now: std::time::Instant,
    ) {
        match request {
            Request::Connect => self.identity_acquired(body),
            Request::PhaseStatus => self.phase_status(body),
            Request::CountdownStatus => self.countdown_status(body),
            Request::Stats => self.live_stats(body),
            Request::Vote(ballot) => self.vote_accepted(ballot, now),
            Request::Results => self.final_results(body, now),
        }
    }

    pub fn handle_failure(
        &mut self,
        request: &Request,
        e: &Error,
        now: std::time::Instant,
    ) {
        log::warn!("{} failed: {}", request.endpoint(), e);
        match request {
            Request::Connect => {
                self.connecting = false;
            }
            Request::Vote(..) => {
                self.vote_in_flight = false;
                if !self.finalized {
                    self.screen
                        .notify(&format!("Failed to submit vote: {}", e));
                }
            }
            Request::Results => {
                self.results_retry = Some(now + self.intervals.status);
            }
            Request::PhaseStatus
            | Request::CountdownStatus
            | Request::Stats => {}
        }
    }

    #[cfg(test)]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_ref().map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[cfg(test)]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[cfg(test)]
    pub fn is_polling(&self, poller: Poller) -> bool {
        self.timers.is_active(poller)
    }

    pub fn screen(&self) -> &crate::screen::Controller {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut crate::screen::Controller {
        &mut self.screen
    }

    pub fn form(&self) -> &crate::screen::Form {
        &self.form
    }

    fn identity_acquired(&mut self, body: &str) {
        self.connecting = false;
        if self.identity.is_some() {
            log::debug!("ignoring extra client id");
            return;
        }
        let identity = body.trim();
        if identity.is_empty() {
            log::warn!("{}", Error::EmptyIdentity);
            return;
        }
        log::info!("connected as {}", identity);
        self.identity = Some(identity.to_string());
    }

    fn phase_status(&mut self, body: &str) {
        if self.finalized {
            return;
        }
        let status = match crate::protocol::PhaseStatus::try_from(body) {
            Ok(status) => status,
            Err(e) => {
                log::warn!("ignoring status: {}", e);
                return;
            }
        };
        match status {
            crate::protocol::PhaseStatus::Ended => self.finalize(),
            // after a vote the countdown and stats pollers own the screen
            _ if self.submitted => {}
            crate::protocol::PhaseStatus::Waiting => {
                self.screen.show(crate::screen::Screen::Waiting)
            }
            crate::protocol::PhaseStatus::Voting { .. } => {
                self.screen.show(crate::screen::Screen::Voting)
            }
        }
    }

    fn countdown_status(&mut self, body: &str) {
        if self.finalized {
            return;
        }
        match crate::protocol::PhaseStatus::try_from(body) {
            Ok(crate::protocol::PhaseStatus::Voting { seconds_remaining }) => {
                self.screen.set_countdown(seconds_remaining);
            }
            Ok(crate::protocol::PhaseStatus::Ended) => self.finalize(),
            Ok(status) => {
                log::debug!("countdown ignoring {} status", status.name());
            }
            Err(e) => {
                log::warn!("ignoring countdown status: {}", e);
            }
        }
    }

    fn live_stats(&mut self, body: &str) {
        if self.finalized {
            return;
        }
        let stats = match crate::protocol::LiveTally::parse(body) {
            Ok(stats) => stats,
            Err(e) => {
                log::warn!("ignoring stats: {}", e);
                return;
            }
        };
        if let Some(chart) = self.screen.live_stats_mut() {
            chart.draw(&stats.votes);
        }
    }

    fn vote_accepted(
        &mut self,
        ballot: &crate::protocol::Ballot,
        now: std::time::Instant,
    ) {
        self.vote_in_flight = false;
        if self.submitted {
            return;
        }
        log::info!("vote for {} accepted", ballot.candidate());
        self.submitted = true;
        if self.finalized {
            return;
        }
        self.screen.show(crate::screen::Screen::Submitted);
        self.timers
            .start(Poller::Countdown, self.intervals.countdown, now);
        self.timers.start(Poller::Stats, self.intervals.stats, now);
    }

    fn final_results(&mut self, body: &str, now: std::time::Instant) {
        match crate::protocol::FinalTally::parse(body) {
            Ok(results) => {
                log::info!(
                    "final results: {} votes, winner {:?}",
                    results.votes.total(),
                    results.winner
                );
                self.screen.show_results(&results);
            }
            Err(e) => {
                log::warn!("ignoring results: {}", e);
                self.results_retry = Some(now + self.intervals.status);
            }
        }
    }

    // whichever poller sees the end first gets here; everyone after that is
    // a no-op
    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        log::info!("voting has ended");
        self.finalized = true;
        self.timers.cancel(Poller::Phase);
        self.timers.cancel(Poller::Countdown);
        self.timers.cancel(Poller::Stats);
        if let Some(chart) = self.screen.live_stats_mut() {
            chart.clear();
        }
        self.screen.show(crate::screen::Screen::Results);
        self.to_send.push_back(Request::Results);
    }
}
