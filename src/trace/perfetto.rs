//! Perfetto output for build operation logs.
//!
//! Converts paired build operations into Perfetto `TrackEvent` slices which
//! can be opened in <https://ui.perfetto.dev>.
//!
//! # Track layout
//!
//! - One process track (uuid 0) named after the build.
//! - One "abstract thread" track per lane, created on first use. Lanes are
//!   reconstructed from parent ids by [`LaneTable`]; the log records no real
//!   thread identity.
//! - One extra track per captured build scan URL, holding a single instant.
//!
//! # Clock
//!
//! The first start defines the origin. A clock snapshot maps a custom
//! millisecond clock (id 64) at 0 to BOOTTIME at the origin, and every event is
//! stamped on that clock with `time - origin`. Times are in whole milliseconds
//! in the log, so no precision is lost.
//!
//! # Format Reference
//!
//! - [TrackEvent](https://perfetto.dev/docs/instrumentation/track-events)
//! - [Clock sync](https://perfetto.dev/docs/concepts/clock-sync)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;

use super::annotation::{named_dict, named_entries};
use super::build_scan::BuildScanDetector;
use super::dispatch::BuildOperationVisitor;
use super::lanes::LaneTable;
use super::proto::{
    BuiltinClock, CUSTOM_CLOCK_ID, Clock, ClockSnapshot, ProcessDescriptor, ThreadDescriptor,
    TracePacket, TrackDescriptor, TrackEvent, TrackEventType,
};
use super::record::{
    BuildOperationFinish, BuildOperationProgress, BuildOperationStart, OperationId, Value,
};
use super::sink::PacketSink;
use crate::config::ConverterConfig;

/// All packets share one writer sequence.
const SEQUENCE_ID: u32 = 1;

/// uuid of the process track.
const PROCESS_TRACK_UUID: u64 = 0;

/// pid of the process track and every lane.
const PID: i32 = 0;

/// Nanoseconds per tick of the custom clock.
const MILLISECOND_NS: u64 = 1_000_000;

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversionSummary {
    pub packet_count: usize,
    pub build_scan_url: Option<String>,
}

/// State carried from a start to its finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSlice {
    pub lane: u32,
    pub track_uuid: u64,
    /// What the lane hosted before this operation started
    pub previous: Option<OperationId>,
}

/// Streams a Perfetto trace as build operations are visited.
pub struct PerfettoEncoder<W: Write> {
    sink: PacketSink<W>,
    process_name: String,
    lane_name: String,
    next_uuid: u64,
    origin: Option<i64>,
    process_written: bool,
    lanes: LaneTable,
    /// Track uuid per lane; slot `i` is lane `i + 1`
    lane_tracks: Vec<u64>,
    build_scan: BuildScanDetector,
    build_scan_url: Option<String>,
}

impl PerfettoEncoder<BufWriter<File>> {
    /// Create the output file and an encoder writing to it.
    pub fn create(path: &Path, config: &ConverterConfig) -> Result<Self> {
        Ok(Self::with_sink(PacketSink::create(path)?, config))
    }
}

impl<W: Write> PerfettoEncoder<W> {
    pub fn new(out: W, path: impl Into<std::path::PathBuf>, config: &ConverterConfig) -> Self {
        Self::with_sink(PacketSink::new(out, path), config)
    }

    fn with_sink(sink: PacketSink<W>, config: &ConverterConfig) -> Self {
        Self {
            sink,
            process_name: config.process_name.clone(),
            lane_name: config.lane_name.clone(),
            next_uuid: 1,
            origin: None,
            process_written: false,
            lanes: LaneTable::new(),
            lane_tracks: Vec::new(),
            build_scan: BuildScanDetector::new(),
            build_scan_url: None,
        }
    }

    pub fn summary(&self) -> ConversionSummary {
        ConversionSummary {
            packet_count: self.sink.packet_count(),
            build_scan_url: self.build_scan_url.clone(),
        }
    }

    /// Push buffered packets to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    /// Flush everything and report what was written.
    pub fn finish(mut self) -> Result<ConversionSummary> {
        self.flush()?;
        Ok(self.summary())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.sink.into_inner()
    }

    fn allocate_uuid(&mut self) -> u64 {
        let uuid = self.next_uuid;
        self.next_uuid += 1;
        uuid
    }

    /// The origin, establishing it (and writing the clock snapshot) on first use.
    fn origin_for(&mut self, start: &BuildOperationStart) -> Result<i64> {
        if let Some(origin) = self.origin {
            return Ok(origin);
        }
        let origin = start.start_time;
        log::debug!("Clock origin is {origin} ms (operation {})", start.id);
        self.sink.write(&TracePacket {
            trusted_packet_sequence_id: Some(SEQUENCE_ID),
            clock_snapshot: Some(ClockSnapshot {
                clocks: vec![
                    Clock {
                        clock_id: Some(CUSTOM_CLOCK_ID),
                        timestamp: Some(0),
                        unit_multiplier_ns: Some(MILLISECOND_NS),
                    },
                    Clock {
                        clock_id: Some(BuiltinClock::Boottime as u32),
                        // Epoch milliseconds stand in for boot time; only the offset matters
                        timestamp: Some(origin as u64),
                        unit_multiplier_ns: None,
                    },
                ],
            }),
            ..Default::default()
        })?;
        self.origin = Some(origin);
        Ok(origin)
    }

    fn write_process_track(&mut self) -> Result<()> {
        if self.process_written {
            return Ok(());
        }
        self.sink.write(&TracePacket {
            trusted_packet_sequence_id: Some(SEQUENCE_ID),
            track_descriptor: Some(TrackDescriptor {
                uuid: Some(PROCESS_TRACK_UUID),
                process: Some(ProcessDescriptor {
                    pid: Some(PID),
                    process_name: Some(self.process_name.clone()),
                }),
                thread: None,
            }),
            ..Default::default()
        })?;
        self.process_written = true;
        Ok(())
    }

    /// Track uuid of `lane`, writing its descriptor when the lane is new.
    fn lane_track(&mut self, lane: u32, is_new: bool) -> Result<u64> {
        if !is_new {
            return Ok(self.lane_tracks[lane as usize - 1]);
        }
        let uuid = self.allocate_uuid();
        log::debug!("Lane {lane} opened on track {uuid}");
        self.sink.write(&TracePacket {
            trusted_packet_sequence_id: Some(SEQUENCE_ID),
            track_descriptor: Some(TrackDescriptor {
                uuid: Some(uuid),
                process: None,
                thread: Some(ThreadDescriptor {
                    pid: Some(PID),
                    tid: Some(lane as i32),
                    thread_name: Some(self.lane_name.clone()),
                }),
            }),
            ..Default::default()
        })?;
        self.lane_tracks.push(uuid);
        Ok(uuid)
    }

    /// Write a track event stamped on the custom clock.
    fn write_event(&mut self, timestamp: u64, event: TrackEvent) -> Result<()> {
        self.sink.write(&TracePacket {
            timestamp: Some(timestamp),
            trusted_packet_sequence_id: Some(SEQUENCE_ID),
            track_event: Some(event),
            timestamp_clock_id: Some(CUSTOM_CLOCK_ID),
            ..Default::default()
        })
    }

    fn on_build_scan_url(&mut self, url: String) -> Result<()> {
        log::debug!("Build scan URL: {url}");
        let track_uuid = self.allocate_uuid();
        self.write_event(
            0,
            TrackEvent {
                track_uuid: Some(track_uuid),
                name: Some(format!("Build scan: {url}")),
                r#type: Some(TrackEventType::Instant as i32),
                ..Default::default()
            },
        )?;
        self.build_scan_url = Some(url);
        Ok(())
    }

    fn relative(&self, time: i64) -> u64 {
        let origin = self.origin.unwrap_or(time);
        time.wrapping_sub(origin) as u64
    }
}

impl<W: Write> BuildOperationVisitor for PerfettoEncoder<W> {
    type Pending = PendingSlice;

    fn on_start(&mut self, start: &BuildOperationStart) -> Result<PendingSlice> {
        self.origin_for(start)?;
        self.write_process_track()?;

        let choice = self.lanes.assign(start.parent_id);
        let track_uuid = self.lane_track(choice.index, choice.is_new)?;

        self.write_event(
            self.relative(start.start_time),
            TrackEvent {
                debug_annotations: vec![named_dict("details", start.details.as_ref())],
                r#type: Some(TrackEventType::SliceBegin as i32),
                track_uuid: Some(track_uuid),
                categories: vec![start.details_class_name.clone().unwrap_or_default()],
                name: Some(start.display_name.clone()),
            },
        )?;

        let previous = self.lanes.open(choice.index, start.id);
        Ok(PendingSlice {
            lane: choice.index,
            track_uuid,
            previous,
        })
    }

    fn on_finish(
        &mut self,
        pending: PendingSlice,
        start: &BuildOperationStart,
        finish: &BuildOperationFinish,
    ) -> Result<()> {
        self.lanes.restore(pending.lane, pending.previous);

        let operation = named_entries(
            "operation",
            [
                ("id", Value::Int(start.id.0)),
                (
                    "parentId",
                    start.parent_id.map_or(Value::Null, |p| Value::Int(p.0)),
                ),
            ],
        );
        self.write_event(
            self.relative(finish.end_time),
            TrackEvent {
                debug_annotations: vec![operation, named_dict("result", finish.result.as_ref())],
                r#type: Some(TrackEventType::SliceEnd as i32),
                track_uuid: Some(pending.track_uuid),
                ..Default::default()
            },
        )
    }

    fn on_progress(&mut self, progress: &BuildOperationProgress) -> Result<()> {
        match self.build_scan.observe(progress) {
            Some(url) => self.on_build_scan_url(url),
            None => Ok(()),
        }
    }
}
