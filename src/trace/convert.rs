//! Convert a build operation log file into a Perfetto trace file.

use std::path::Path;

use anyhow::Result;

use super::dispatch::visit_records;
use super::parse::RecordReader;
use super::perfetto::{ConversionSummary, PerfettoEncoder};
use crate::config::ConverterConfig;

/// Convert `input` into `output` using the default track names.
///
/// The input is streamed line by line and packets are appended to the output
/// as they are produced. If a record fails, the packets written before it are
/// flushed and the output is left as a valid, truncated trace.
pub fn convert(input: &Path, output: &Path) -> Result<ConversionSummary> {
    convert_with(input, output, &ConverterConfig::default())
}

/// Like [`convert`], with explicit configuration.
pub fn convert_with(
    input: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<ConversionSummary> {
    // Open the input first so a missing log never truncates an existing trace
    let reader = RecordReader::open(input)?;
    let mut encoder = PerfettoEncoder::create(output, config)?;

    let stats = match visit_records(reader, &mut encoder) {
        Ok(stats) => stats,
        Err(e) => {
            if let Err(flush) = encoder.flush() {
                log::debug!("Flushing partial trace failed: {flush}");
            }
            return Err(e);
        }
    };
    log::debug!(
        "Visited {} records ({} starts, {} finishes, {} progress), at most {} open",
        stats.records,
        stats.starts,
        stats.finishes,
        stats.progress,
        stats.max_open
    );
    if stats.unmatched_finishes > 0 {
        log::debug!("{} finishes had no open start", stats.unmatched_finishes);
    }
    if stats.before_first_start > 0 {
        log::debug!(
            "{} records preceded the first start",
            stats.before_first_start
        );
    }
    if stats.still_open > 0 {
        log::debug!("{} operations never finished", stats.still_open);
    }

    let summary = encoder.finish()?;
    log::debug!(
        "Wrote {} packets to {}",
        summary.packet_count,
        output.display()
    );
    Ok(summary)
}
