//! Terminal styling for `gtc` output.
//!
//! Uses the anstyle ecosystem: anstream strips escape codes when the stream
//! is not a terminal, and the style constants below compose with `{style}` /
//! `{style:#}` in format strings.
//!
//! Results go to stdout; errors go to stderr.

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprintln, println};

use anstyle::{AnsiColor, Color, Style};

pub const SUCCESS_EMOJI: &str = "✅";
pub const ERROR_EMOJI: &str = "❌";
pub const INFO_EMOJI: &str = "⚪";

pub const SUCCESS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
pub const BOLD: Style = Style::new().bold();
pub const DIM: Style = Style::new().dimmed();
