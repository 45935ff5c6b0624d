//! Build operation log parsing and Perfetto trace export.
//!
//! The pipeline is a single forward pass:
//!
//! 1. [`parse`] reads the log lazily, one JSON record per line.
//! 2. [`dispatch`] pairs every finish with the start it closes and drives a
//!    [`BuildOperationVisitor`].
//! 3. [`perfetto`] is the visitor that writes the binary trace, inventing
//!    lanes for concurrent operations along the way.
//!
//! # Usage
//!
//! ```bash
//! # Record a build operation log
//! ./gradle help -Dorg.gradle.internal.operations.trace=/tmp/help
//!
//! # Convert it (writes /tmp/help.perfetto.proto)
//! gtc /tmp/help-log.txt
//!
//! # Visualize: open the .perfetto.proto file in https://ui.perfetto.dev
//!
//! # Analyze with SQL (requires: curl -LO https://get.perfetto.dev/trace_processor)
//! trace_processor /tmp/help.perfetto.proto -Q 'SELECT name, dur/1e6 as ms FROM slice ORDER BY dur DESC LIMIT 20'
//! ```

pub mod annotation;
pub mod build_scan;
pub mod convert;
pub mod dispatch;
pub mod lanes;
pub mod parse;
pub mod perfetto;
pub mod proto;
pub mod record;
pub mod sink;

// Re-export main types for convenience
pub use convert::{convert, convert_with};
pub use dispatch::{BuildOperationVisitor, DispatchStats, Dispatcher, visit_records};
pub use parse::{RecordKind, RecordReader, parse_line};
pub use perfetto::{ConversionSummary, PendingSlice, PerfettoEncoder};
pub use record::{
    BuildOperationFinish, BuildOperationProgress, BuildOperationRecord, BuildOperationStart,
    Details, OperationId, Value,
};
