//! Terminal bar rendering.
//!
//! One carriage-return line per cycle, coloured from a fixed rainbow table
//! that optionally rotates by one colour each cycle.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{self, Write};

use crate::audio::NormalizedBars;
use crate::params::{RenderConfig, RenderStyle};

/// Rainbow palette, red through magenta
pub const RAINBOW: [Color; 7] = [
    Color::Red,
    Color::Rgb {
        r: 255,
        g: 175,
        b: 0,
    },
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

const FILLED: char = '█';

/// Draws normalized bars and owns the palette rotation
pub struct BarRenderer {
    config: RenderConfig,
    shift: usize,
}

impl BarRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, shift: 0 }
    }

    /// Filled cells for `amplitude`, truncated like an integer cast
    pub fn filled_cells(&self, amplitude: f32) -> usize {
        let amplitude = if amplitude.is_nan() {
            0.0
        } else {
            amplitude.clamp(0.0, 1.0)
        };
        (amplitude * self.config.bar_height as f32) as usize
    }

    /// Colour for `band` at the current palette rotation
    pub fn color_for(&self, band: usize) -> Color {
        RAINBOW[(band + self.shift) % RAINBOW.len()]
    }

    /// Draw one cycle and advance the palette
    pub fn render<W: Write>(&mut self, out: &mut W, bars: &NormalizedBars) -> io::Result<()> {
        match self.config.style {
            RenderStyle::Bars => {
                for (band, &amplitude) in bars.iter().enumerate() {
                    self.draw_bar(out, self.color_for(band), amplitude)?;
                }
            }
            RenderStyle::Level => {
                self.draw_bar(out, self.color_for(0), bars.mean())?;
            }
        }
        queue!(out, ResetColor, Print('\r'))?;
        out.flush()?;

        if self.config.scroll_palette {
            self.shift = (self.shift + 1) % RAINBOW.len();
        }
        Ok(())
    }

    /// Move past the last bar line
    pub fn finish<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, ResetColor, Print('\n'))?;
        out.flush()
    }

    fn draw_bar<W: Write>(&self, out: &mut W, color: Color, amplitude: f32) -> io::Result<()> {
        let filled = self.filled_cells(amplitude);
        let empty = self.config.bar_height - filled;
        queue!(
            out,
            SetForegroundColor(color),
            Print(FILLED.to_string().repeat(filled)),
            Print(" ".repeat(empty))
        )
    }
}
