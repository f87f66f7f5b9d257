//! Terminal rendering of the markdown produced by `waypoint_core::display`.
//!
//! Rich output goes through termimad; `--no-color` prints the markdown as is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.strikeout.set_fg(Color::DarkGrey);

        Self { rich_enabled, skin }
    }

    /// Prints markdown to stdout.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for block in blocks(markdown) {
            match block {
                Block::Table(lines) => self.skin.print_text(&lines.join("\n")),
                // Headers keep their hash marks so the output reads like the source.
                Block::Line(line) if line.starts_with('#') => println!("\x1b[34m{line}\x1b[0m"),
                Block::Line(line) => {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Debug, PartialEq)]
enum Block<'a> {
    Line(&'a str),
    Table(Vec<&'a str>),
}

/// Groups consecutive table rows so termimad can align their columns.
fn blocks(markdown: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    for line in markdown.lines() {
        if line.starts_with('|') {
            if let Some(Block::Table(rows)) = blocks.last_mut() {
                rows.push(line);
                continue;
            }
            blocks.push(Block::Table(vec![line]));
        } else {
            blocks.push(Block::Line(line));
        }
    }
    blocks
}
