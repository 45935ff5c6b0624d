//! Convert Gradle build operation trace logs into Perfetto traces.
//!
//! Gradle can write a log of every build operation it runs
//! (`-Dorg.gradle.internal.operations.trace=<path>`). Each line is a JSON
//! record: an operation start, its finish, or a progress event in between.
//! This crate replays that log once, front to back, and writes a binary
//! Perfetto trace that shows the nested operations on a timeline.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let summary = gradle_trace_converter::convert(
//!     Path::new("build-log.txt"),
//!     Path::new("build.perfetto.proto"),
//! )?;
//! println!("Written {} packets", summary.packet_count);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod styling;
pub mod trace;

pub use config::ConverterConfig;
pub use error::ConvertError;
pub use trace::{ConversionSummary, convert, convert_with};
