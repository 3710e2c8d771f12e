use crate::prelude::*;
use std::io::Write as _;

const PX_PER_COLUMN: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub rows: u16,
    pub cols: u16,
}

impl Size {
    pub fn get() -> Result<Self> {
        let (cols, rows) = crossterm::terminal::size()
            .context(crate::error::GetTerminalSize)?;
        Ok(Self { rows, cols })
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&format!("{}x{}", self.cols, self.rows), f)
    }
}

/// Owns the terminal for the duration of an interactive session.
///
/// Raw mode is entered on the first draw and left again when this is
/// dropped.
pub struct Terminal {
    raw_screen: Option<crossterm::screen::RawScreen>,
    size: Size,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            raw_screen: None,
            size: Size { rows: 24, cols: 80 },
        }
    }

    pub fn resize(&mut self, size: Size) {
        log::debug!("terminal resized to {}", size);
        self.size = size;
    }

    pub fn draw(
        &mut self,
        screen: &crate::screen::Controller,
        form: &crate::screen::Form,
    ) -> Result<()> {
        if self.raw_screen.is_none() {
            self.raw_screen = Some(
                crossterm::screen::RawScreen::into_raw_mode()
                    .context(crate::error::ToRawMode)?,
            );
        }

        let frame = render(screen, form, self.size);
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        stdout
            .write_all(frame.as_bytes())
            .context(crate::error::WriteTerminal)?;
        stdout.flush().context(crate::error::FlushTerminal)?;
        Ok(())
    }

    // leaves the cursor on a fresh line so the shell prompt isn't drawn
    // over the last frame
    pub fn finish(&mut self) -> Result<()> {
        if self.raw_screen.take().is_some() {
            let stdout = std::io::stdout();
            let mut stdout = stdout.lock();
            stdout
                .write_all(b"\r\n")
                .context(crate::error::WriteTerminal)?;
            stdout.flush().context(crate::error::FlushTerminal)?;
        }
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(
    screen: &crate::screen::Controller,
    form: &crate::screen::Form,
    size: Size,
) -> String {
    let mut out = String::new();
    out.push_str("\x1b[H\x1b[2J");
    let mut line = |s: &str| {
        out.push_str(s);
        out.push_str("\r\n");
    };

    match screen.active() {
        crate::screen::Screen::Waiting => {
            line("Waiting for voting to begin...");
        }
        crate::screen::Screen::Voting => {
            line("Cast your vote:");
            line("");
            for (i, candidate) in form.candidates().iter().enumerate() {
                let mark = if form.selected_index() == Some(i) {
                    "*"
                } else {
                    " "
                };
                line(&format!("{} {}) {}", mark, i + 1, candidate));
            }
            line("");
            line("1-9: choose, space: vote, q: quit");
        }
        crate::screen::Screen::Submitted => {
            line("Thanks, your vote has been recorded.");
            if let Some(countdown) = screen.countdown() {
                line(countdown);
            }
            line("");
            for bar_line in chart_lines(screen.live_stats(), size) {
                line(&bar_line);
            }
        }
        crate::screen::Screen::Results => {
            line("Voting has ended.");
            match screen.winner() {
                Some(winner) => line(winner),
                None => line("Loading results..."),
            }
            line("");
            for bar_line in chart_lines(screen.results(), size) {
                line(&bar_line);
            }
            line("");
            line("q: quit");
        }
    }

    if let Some(notice) = screen.notice() {
        line("");
        // XXX i should be able to use crossterm::style here, but it has bugs
        line(&format!("\x1b[31m{}\x1b[m", notice));
    }

    out
}

fn chart_lines(chart: &crate::chart::Chart, size: Size) -> Vec<String> {
    let mut lines = vec![];
    for bar in chart.bars() {
        lines.push(bar.label.clone());
        let cols = bar_columns(bar.width, size.cols);
        // one terminal row per ten pixels of bar height
        let rows = std::cmp::max(bar.height / PX_PER_COLUMN, 1);
        for _ in 0..rows {
            lines.push(format!(
                "\x1b[48;2;{};{};{}m{}\x1b[m",
                bar.color.r,
                bar.color.g,
                bar.color.b,
                " ".repeat(cols)
            ));
        }
    }
    lines
}

fn bar_columns(width: u64, max_cols: u16) -> usize {
    if width == 0 {
        return 0;
    }
    let cols = std::cmp::max(width / PX_PER_COLUMN, 1);
    std::cmp::min(cols, u64::from(max_cols)) as usize
}

#[cfg(test)]
mod test {
    use super::*;

    fn size() -> Size {
        Size { rows: 24, cols: 80 }
    }

    fn form() -> crate::screen::Form {
        crate::screen::Form::new(&["Alice".to_string(), "Bob".to_string()])
    }

    #[test]
    fn test_bar_columns() {
        assert_eq!(bar_columns(0, 80), 0);
        assert_eq!(bar_columns(5, 80), 1);
        assert_eq!(bar_columns(90, 80), 9);
        assert_eq!(bar_columns(150, 80), 15);
        assert_eq!(bar_columns(40 * 1000, 80), 80);
    }

    #[test]
    fn test_render_voting() {
        let mut screen = crate::screen::Controller::new();
        screen.show(crate::screen::Screen::Voting);
        let mut form = form();
        form.select(1);
        let frame = render(&screen, &form, size());
        assert!(frame.contains("  1) Alice\r\n"));
        assert!(frame.contains("* 2) Bob\r\n"));
    }

    #[test]
    fn test_render_submitted() {
        let mut screen = crate::screen::Controller::new();
        screen.show(crate::screen::Screen::Submitted);
        screen.set_countdown(61);
        if let Some(chart) = screen.live_stats_mut() {
            chart.draw(&crate::protocol::Tally::new(&[("Alice", 3)]));
        }
        let frame = render(&screen, &form(), size());
        assert!(frame.contains("Voting ends in 01:01\r\n"));
        assert!(frame.contains("Alice: 3\r\n"));
        // 90px wide, 20px high
        let bar = format!("\x1b[48;2;76;175;80m{}\x1b[m\r\n", " ".repeat(9));
        assert_eq!(frame.matches(&bar).count(), 2);
    }

    #[test]
    fn test_render_results() {
        let mut screen = crate::screen::Controller::new();
        screen.show(crate::screen::Screen::Results);
        assert!(render(&screen, &form(), size()).contains("Loading results"));

        screen.show_results(&crate::protocol::FinalTally {
            winner: Some("Bob".to_string()),
            votes: crate::protocol::Tally::new(&[("Alice", 1), ("Bob", 2)]),
        });
        let frame = render(&screen, &form(), size());
        assert!(frame.contains("Winner: Bob\r\n"));
        assert!(frame.contains("Bob (2)\r\n"));
        let bar = format!("\x1b[48;2;33;150;243m{}\x1b[m\r\n", " ".repeat(8));
        assert_eq!(frame.matches(&bar).count(), 3);
    }

    #[test]
    fn test_render_notice() {
        let mut screen = crate::screen::Controller::new();
        screen.notify("Failed to submit vote");
        let frame = render(&screen, &form(), size());
        assert!(frame.contains("Failed to submit vote"));
    }
}
