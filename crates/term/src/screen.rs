//! Character grid the host view paints into.
//!
//! Characters and inks are kept in two parallel row-major arrays so the
//! renderer can compare whole rows and emit them as runs of equal ink.

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
    Dim,
}

/// Foreground, background and weight of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ink {
    pub fg: Rgb,
    pub bg: Rgb,
    pub weight: Weight,
}

const BLACK: Rgb = Rgb(0, 0, 0);

impl Ink {
    /// Light grey on black; what a blank screen is filled with
    pub const PLAIN: Ink = Ink::on(Rgb(220, 220, 220), BLACK);

    pub const fn on(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            weight: Weight::Normal,
        }
    }

    pub const fn fg(fg: Rgb) -> Self {
        Self::on(fg, BLACK)
    }

    pub const fn weight(self, weight: Weight) -> Self {
        Self { weight, ..self }
    }
}

/// A run of equally inked characters on one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub ink: Ink,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    width: u16,
    height: u16,
    chars: Vec<char>,
    inks: Vec<Ink>,
}

impl Screen {
    pub fn blank(width: u16, height: u16) -> Self {
        let mut screen = Self::default();
        screen.reset(width, height);
        screen
    }

    /// Resize to `width` x `height` and blank every position.
    pub fn reset(&mut self, width: u16, height: u16) {
        let len = usize::from(width) * usize::from(height);
        self.width = width;
        self.height = height;
        self.chars.clear();
        self.chars.resize(len, ' ');
        self.inks.clear();
        self.inks.resize(len, Ink::PLAIN);
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn at(&self, x: u16, y: u16) -> Option<(char, Ink)> {
        self.offset(x, y).map(|i| (self.chars[i], self.inks[i]))
    }

    /// Place one character. Positions off the screen are ignored.
    pub fn plot(&mut self, x: u16, y: u16, ch: char, ink: Ink) {
        if let Some(i) = self.offset(x, y) {
            self.chars[i] = ch;
            self.inks[i] = ink;
        }
    }

    /// Horizontal run of `len` copies of `ch`, clipped at the right edge
    pub fn hline(&mut self, x: u16, y: u16, len: u16, ch: char, ink: Ink) {
        let end = x.saturating_add(len).min(self.width);
        for cx in x..end {
            self.plot(cx, y, ch, ink);
        }
    }

    pub fn vline(&mut self, x: u16, y: u16, len: u16, ch: char, ink: Ink) {
        let end = y.saturating_add(len).min(self.height);
        for cy in y..end {
            self.plot(x, cy, ch, ink);
        }
    }

    /// Write `text` starting at (x, y), clipped at the right edge
    pub fn write(&mut self, x: u16, y: u16, text: &str, ink: Ink) {
        let columns = (x..self.width).zip(text.chars());
        for (cx, ch) in columns {
            self.plot(cx, y, ch, ink);
        }
    }

    fn row_range(&self, y: u16) -> std::ops::Range<usize> {
        let width = usize::from(self.width);
        let start = usize::from(y) * width;
        start..start + width
    }

    /// Whether row `y` holds the same characters and inks in both screens
    pub fn row_matches(&self, other: &Screen, y: u16) -> bool {
        if self.size() != other.size() || y >= self.height {
            return false;
        }
        let range = self.row_range(y);
        self.chars[range.clone()] == other.chars[range.clone()]
            && self.inks[range.clone()] == other.inks[range]
    }

    /// Row `y` split into runs of equal ink, left to right
    pub fn spans(&self, y: u16) -> Vec<Span> {
        if y >= self.height {
            return Vec::new();
        }
        let range = self.row_range(y);
        let mut spans: Vec<Span> = Vec::new();
        for (x, (&ch, &ink)) in self.chars[range.clone()]
            .iter()
            .zip(&self.inks[range])
            .enumerate()
        {
            match spans.last_mut() {
                Some(span) if span.ink == ink => span.text.push(ch),
                _ => spans.push(Span {
                    x: x as u16,
                    ink,
                    text: ch.to_string(),
                }),
            }
        }
        spans
    }

    /// Characters of row `y`
    pub fn line(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        self.chars[self.row_range(y)].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_is_clipped() {
        let mut screen = Screen::blank(5, 2);
        screen.write(2, 1, "abcdef", Ink::PLAIN);
        screen.write(9, 0, "zz", Ink::PLAIN);
        assert_eq!(screen.line(1), "  abc");
        assert_eq!(screen.line(0), "     ");
    }

    #[test]
    fn test_lines_stop_at_edges() {
        let mut screen = Screen::blank(3, 3);
        screen.hline(1, 0, 10, '-', Ink::PLAIN);
        screen.vline(2, 1, 10, '|', Ink::PLAIN);
        assert_eq!(screen.line(0), " --");
        assert_eq!(screen.line(2), "  |");
        assert_eq!(screen.at(3, 0), None);
    }

    #[test]
    fn test_spans_group_equal_ink() {
        let red = Ink::fg(Rgb(255, 0, 0)).weight(Weight::Bold);
        let mut screen = Screen::blank(6, 1);
        screen.write(1, 0, "ab", red);

        let spans = screen.spans(0);
        let layout: Vec<(u16, &str)> = spans.iter().map(|s| (s.x, s.text.as_str())).collect();
        assert_eq!(layout, vec![(0, " "), (1, "ab"), (3, "   ")]);
        assert_eq!(spans[1].ink, red);
    }

    #[test]
    fn test_row_matches_compares_inks() {
        let a = Screen::blank(4, 2);
        let mut b = a.clone();
        assert!(a.row_matches(&b, 0));

        b.plot(0, 1, ' ', Ink::fg(Rgb(1, 2, 3)));
        assert!(a.row_matches(&b, 0));
        assert!(!a.row_matches(&b, 1));
        assert!(!a.row_matches(&Screen::blank(5, 2), 0));
    }

    #[test]
    fn test_reset_blanks_and_resizes() {
        let mut screen = Screen::blank(2, 2);
        screen.plot(1, 1, 'x', Ink::PLAIN);
        screen.reset(3, 1);
        assert_eq!(screen.size(), (3, 1));
        assert_eq!(screen.line(0), "   ");
        assert_eq!(screen.at(0, 1), None);
    }
}
