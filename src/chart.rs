pub const PALETTE: &[Color] = &[
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0xff, 0x98, 0x00),
    Color::rgb(0x9c, 0x27, 0xb0),
    Color::rgb(0xf4, 0x43, 0x36),
];

pub const LIVE_STATS: Style = Style {
    px_per_vote: 30,
    height: 20,
    label: Label::Colon,
};

pub const FINAL_RESULTS: Style = Style {
    px_per_vote: 40,
    height: 30,
    label: Label::Parenthesized,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    // "Alice: 3"
    Colon,
    // "Alice (3)"
    Parenthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub px_per_vote: u64,
    pub height: u64,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub votes: u64,
    pub width: u64,
    pub height: u64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    style: Style,
    bars: Vec<Bar>,
}

impl Chart {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            bars: vec![],
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn clear(&mut self) {
        self.bars.clear();
    }

    // always a full redraw, so applying the same tally twice (or an older
    // tally after a newer one) leaves exactly that tally on screen
    pub fn draw(&mut self, tally: &crate::protocol::Tally) {
        self.bars = tally
            .iter()
            .enumerate()
            .map(|(i, (name, votes))| Bar {
                label: match self.style.label {
                    Label::Colon => format!("{}: {}", name, votes),
                    Label::Parenthesized => format!("{} ({})", name, votes),
                },
                votes,
                width: votes.saturating_mul(self.style.px_per_vote),
                height: self.style.height,
                color: PALETTE[i % PALETTE.len()],
            })
            .collect();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_live_stats_bars() {
        let mut chart = Chart::new(LIVE_STATS);
        chart.draw(&crate::protocol::Tally::new(&[("A", 3), ("B", 5)]));
        let bars = chart.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].width, 90);
        assert_eq!(bars[1].width, 150);
        assert_eq!(bars[0].height, 20);
        assert_eq!(bars[0].color, PALETTE[0]);
        assert_eq!(bars[1].color, PALETTE[1]);
        assert_eq!(bars[0].label, "A: 3");
    }

    #[test]
    fn test_final_results_bars() {
        let mut chart = Chart::new(FINAL_RESULTS);
        chart.draw(&crate::protocol::Tally::new(&[("A", 3), ("B", 5)]));
        let bars = chart.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].width, 120);
        assert_eq!(bars[1].width, 200);
        assert_eq!(bars[1].height, 30);
        assert_eq!(bars[1].label, "B (5)");
    }

    #[test]
    fn test_palette_wraps() {
        let mut chart = Chart::new(LIVE_STATS);
        chart.draw(&crate::protocol::Tally::new(&[
            ("a", 1),
            ("b", 1),
            ("c", 1),
            ("d", 1),
            ("e", 1),
            ("f", 0),
            ("g", 2),
        ]));
        let colors: Vec<_> = chart.bars().iter().map(|bar| bar.color).collect();
        assert_eq!(colors[5], PALETTE[0]);
        assert_eq!(colors[6], PALETTE[1]);
        assert_eq!(chart.bars()[5].width, 0);
        assert_eq!(PALETTE[4].to_string(), "#f44336");
    }

    #[test]
    fn test_width_saturates() {
        let mut chart = Chart::new(FINAL_RESULTS);
        chart.draw(&crate::protocol::Tally::new(&[
            ("A", u64::max_value()),
            ("B", u64::max_value() / 40),
        ]));
        assert_eq!(chart.bars()[0].width, u64::max_value());
        assert_eq!(chart.bars()[1].width, u64::max_value() / 40 * 40);
    }

    #[test]
    fn test_redraw_replaces() {
        let mut chart = Chart::new(LIVE_STATS);
        chart.draw(&crate::protocol::Tally::new(&[("A", 3), ("B", 5)]));
        chart.draw(&crate::protocol::Tally::new(&[("C", 1)]));
        assert_eq!(chart.bars().len(), 1);
        assert_eq!(chart.bars()[0].label, "C: 1");
        assert_eq!(chart.bars()[0].color, PALETTE[0]);

        chart.clear();
        assert!(chart.bars().is_empty());
    }
}
