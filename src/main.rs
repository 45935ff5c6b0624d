use clap::Parser;
use std::path::Path;
use std::process;

use gradle_trace_converter::ConverterConfig;
use gradle_trace_converter::styling::{
    BOLD, DIM, ERROR, ERROR_EMOJI, INFO_EMOJI, SUCCESS, SUCCESS_EMOJI, WARNING, eprintln,
    println,
};

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --verbose flag or RUST_LOG env var
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "off" }),
    )
    .format(|buf, record| {
        use std::io::Write;

        let level = match record.level() {
            log::Level::Error => ERROR,
            log::Level::Warn => WARNING,
            _ => DIM,
        };
        writeln!(
            buf,
            "{level}[{}]{level:#} {}",
            record.level().as_str().to_lowercase(),
            record.args()
        )
    })
    .init();

    if let Err(e) = run(&cli) {
        eprintln!("{ERROR_EMOJI} {ERROR}{e}{ERROR:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ConverterConfig::load_from(path)?,
        None => ConverterConfig::load()?,
    };
    let input = absolute(&cli.input);
    let output = absolute(&cli.output_path());
    log::debug!("Converting {} to {}", input.display(), output.display());

    let summary = gradle_trace_converter::convert_with(&input, &output, &config)?;

    println!(
        "{SUCCESS_EMOJI} {SUCCESS}Written {BOLD}{}{BOLD:#}{SUCCESS} packets to {}{SUCCESS:#}",
        summary.packet_count,
        output.display()
    );
    if let Some(url) = summary.build_scan_url {
        println!("{INFO_EMOJI} Build scan URL: {url}");
    }
    Ok(())
}

/// Paths are reported absolute so they can be opened from anywhere.
fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
