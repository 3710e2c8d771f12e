#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Waiting,
    Voting,
    Submitted,
    Results,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Voting => "voting",
            Self::Submitted => "submitted",
            Self::Results => "results",
        }
    }
}

/// Everything the participant can currently see.
///
/// Exactly one screen is visible at a time. The controller has no notion of
/// which transitions are legal; the session only calls `show` at the points
/// where a transition is allowed.
#[derive(Debug)]
pub struct Controller {
    active: Screen,
    countdown: Option<String>,
    live_stats: crate::chart::Chart,
    winner: Option<String>,
    results: crate::chart::Chart,
    notice: Option<String>,
    dirty: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            active: Screen::Waiting,
            countdown: None,
            live_stats: crate::chart::Chart::new(crate::chart::LIVE_STATS),
            winner: None,
            results: crate::chart::Chart::new(crate::chart::FINAL_RESULTS),
            notice: None,
            dirty: true,
        }
    }

    pub fn show(&mut self, screen: Screen) {
        if self.active == screen {
            return;
        }
        log::debug!(
            "switching screen: {} -> {}",
            self.active.name(),
            screen.name()
        );
        self.active = screen;
        self.notice = None;
        self.dirty = true;
    }

    pub fn active(&self) -> Screen {
        self.active
    }

    pub fn set_countdown(&mut self, seconds_remaining: u64) {
        let text = format!(
            "Voting ends in {}",
            crate::protocol::format_countdown(seconds_remaining)
        );
        if self.countdown.as_ref() != Some(&text) {
            self.countdown = Some(text);
            self.dirty = true;
        }
    }

    pub fn countdown(&self) -> Option<&str> {
        self.countdown.as_ref().map(String::as_str)
    }

    // the live chart only exists on the submitted screen
    pub fn live_stats_mut(&mut self) -> Option<&mut crate::chart::Chart> {
        if self.active == Screen::Submitted {
            self.dirty = true;
            Some(&mut self.live_stats)
        } else {
            None
        }
    }

    pub fn live_stats(&self) -> &crate::chart::Chart {
        &self.live_stats
    }

    pub fn show_results(&mut self, results: &crate::protocol::FinalTally) {
        self.winner = Some(match &results.winner {
            Some(winner) => format!("Winner: {}", winner),
            None => "No votes were cast.".to_string(),
        });
        self.results.draw(&results.votes);
        self.dirty = true;
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_ref().map(String::as_str)
    }

    pub fn results(&self) -> &crate::chart::Chart {
        &self.results
    }

    pub fn notify(&mut self, notice: &str) {
        self.notice = Some(notice.to_string());
        self.dirty = true;
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(String::as_str)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// The single-choice candidate form on the voting screen.
#[derive(Debug, Clone)]
pub struct Form {
    candidates: Vec<String>,
    selected: Option<usize>,
}

impl Form {
    pub fn new(candidates: &[String]) -> Self {
        Self {
            candidates: candidates.to_vec(),
            selected: None,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    // selecting a new candidate replaces the previous choice
    pub fn select(&mut self, idx: usize) -> bool {
        if idx < self.candidates.len() && self.selected != Some(idx) {
            self.selected = Some(idx);
            true
        } else {
            false
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.candidates.get(idx))
            .map(String::as_str)
    }
}
