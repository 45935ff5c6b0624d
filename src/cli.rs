use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Styles};
use std::path::{Path, PathBuf};

/// Custom styles for help output
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

#[derive(Parser, Debug)]
#[command(name = "gtc")]
#[command(about = "Convert a Gradle build operation trace log into a Perfetto trace", long_about = None)]
#[command(version)]
#[command(styles = help_styles())]
#[command(
    after_long_help = r#"Record a log with `-Dorg.gradle.internal.operations.trace=<path>`, then open the
resulting .perfetto.proto file in https://ui.perfetto.dev"#
)]
pub struct Cli {
    /// Build operation trace log (`*-log.txt`)
    #[arg(value_name = "LOG")]
    pub input: PathBuf,

    /// Where to write the trace [default: next to LOG, as <name>.perfetto.proto]
    #[arg(short, long, value_name = "path")]
    pub output: Option<PathBuf>,

    /// User config file path
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Show debug info
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `build/trace/help-log.txt` becomes `build/trace/help.perfetto.proto`.
///
/// Gradle always appends `-log` when it writes the log, so that suffix is
/// dropped along with the last extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
    let base = stem.strip_suffix("-log").unwrap_or(stem);
    input.with_file_name(format!("{base}.perfetto.proto"))
}
