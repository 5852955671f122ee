//! Terminal display adapter.
//!
//! Each render rewrites the current line with one glyph in ANSI 24-bit
//! colour.  Stands in for the LED matrix when running on a host.

use std::io::{self, Write};

use log::warn;

use crate::app::ports::DisplayPort;
use crate::config::Rgb;

pub struct ConsoleDisplay<W: Write> {
    out: W,
    renders: u64,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, renders: 0 }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_glyph(&mut self, symbol: char, (r, g, b): Rgb) -> io::Result<()> {
        write!(self.out, "\r\x1b[1;38;2;{r};{g};{b}m {symbol} \x1b[0m")?;
        self.out.flush()
    }
}

impl<W: Write> DisplayPort for ConsoleDisplay<W> {
    fn render(&mut self, symbol: char, colour: Rgb) {
        self.renders += 1;
        if let Err(e) = self.write_glyph(symbol, colour) {
            warn!("Display: write failed: {}", e);
        }
    }
}
