//! The subset of the Perfetto trace schema this converter writes.
//!
//! Field numbers follow `protos/perfetto/trace/*.proto` upstream. Only the
//! fields we set are declared; upstream `oneof` members are declared as plain
//! optional fields, which is identical on the wire. prost encodes fields in
//! tag order and writes every `Some` value, including explicit zeros, so the
//! bytes match what protoc-generated proto2 code writes for the same packet.

/// The outer container. A trace file is a sequence of `packet` fields.
///
/// Writing goes packet by packet through [`super::sink::PacketSink`]; this
/// message is what reads a finished file back.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Trace {
    #[prost(message, repeated, tag = "1")]
    pub packet: ::prost::alloc::vec::Vec<TracePacket>,
}

/// Field number of `Trace.packet`.
pub const TRACE_PACKET_FIELD: u32 = 1;

/// First user-defined clock id; sequence-scoped.
pub const CUSTOM_CLOCK_ID: u32 = 64;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TracePacket {
    #[prost(message, optional, tag = "6")]
    pub clock_snapshot: ::core::option::Option<ClockSnapshot>,
    /// Interpreted in the domain of `timestamp_clock_id` (BOOTTIME if unset).
    #[prost(uint64, optional, tag = "8")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(uint32, optional, tag = "10")]
    pub trusted_packet_sequence_id: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "11")]
    pub track_event: ::core::option::Option<TrackEvent>,
    #[prost(uint32, optional, tag = "58")]
    pub timestamp_clock_id: ::core::option::Option<u32>,
    #[prost(message, optional, tag = "60")]
    pub track_descriptor: ::core::option::Option<TrackDescriptor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BuiltinClock {
    Unknown = 0,
    Realtime = 1,
    RealtimeCoarse = 2,
    Monotonic = 3,
    MonotonicCoarse = 4,
    MonotonicRaw = 5,
    Boottime = 6,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClockSnapshot {
    #[prost(message, repeated, tag = "1")]
    pub clocks: ::prost::alloc::vec::Vec<Clock>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Clock {
    /// \[1, 63\] builtin clocks, \[64, 127\] user-defined sequence-scoped clocks.
    #[prost(uint32, optional, tag = "1")]
    pub clock_id: ::core::option::Option<u32>,
    /// Unit is ns unless `unit_multiplier_ns` says otherwise.
    #[prost(uint64, optional, tag = "2")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(uint64, optional, tag = "4")]
    pub unit_multiplier_ns: ::core::option::Option<u64>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct TrackDescriptor {
    #[prost(uint64, optional, tag = "1")]
    pub uuid: ::core::option::Option<u64>,
    #[prost(message, optional, tag = "3")]
    pub process: ::core::option::Option<ProcessDescriptor>,
    #[prost(message, optional, tag = "4")]
    pub thread: ::core::option::Option<ThreadDescriptor>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ProcessDescriptor {
    #[prost(int32, optional, tag = "1")]
    pub pid: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "6")]
    pub process_name: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ThreadDescriptor {
    #[prost(int32, optional, tag = "1")]
    pub pid: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub tid: ::core::option::Option<i32>,
    #[prost(string, optional, tag = "5")]
    pub thread_name: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrackEvent {
    #[prost(message, repeated, tag = "4")]
    pub debug_annotations: ::prost::alloc::vec::Vec<DebugAnnotation>,
    #[prost(enumeration = "TrackEventType", optional, tag = "9")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(uint64, optional, tag = "11")]
    pub track_uuid: ::core::option::Option<u64>,
    #[prost(string, repeated, tag = "22")]
    pub categories: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "23")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TrackEventType {
    Unspecified = 0,
    SliceBegin = 1,
    SliceEnd = 2,
    Instant = 3,
}

/// A named, possibly nested argument shown when an event is selected.
///
/// Dictionary entries carry a `name`; array elements do not.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DebugAnnotation {
    #[prost(string, optional, tag = "6")]
    pub string_value: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "10")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, repeated, tag = "11")]
    pub dict_entries: ::prost::alloc::vec::Vec<DebugAnnotation>,
    #[prost(message, repeated, tag = "12")]
    pub array_values: ::prost::alloc::vec::Vec<DebugAnnotation>,
}

impl DebugAnnotation {
    /// Look up a dictionary entry by name.
    pub fn entry(&self, name: &str) -> Option<&DebugAnnotation> {
        self.dict_entries
            .iter()
            .find(|e| e.name.as_deref() == Some(name))
    }
}

impl TrackEvent {
    pub fn event_type(&self) -> Option<TrackEventType> {
        self.r#type.and_then(|t| TrackEventType::try_from(t).ok())
    }

    pub fn annotation(&self, name: &str) -> Option<&DebugAnnotation> {
        self.debug_annotations
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
    }
}
