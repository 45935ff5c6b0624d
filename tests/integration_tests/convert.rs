//! End-to-end conversion through the library API.

use crate::common::{
    SAMPLE_BUILD_SCAN_URL, SAMPLE_PACKETS, TestLog, build_scan_progress, read_trace, sample_log,
    slice_begins, track_events,
};
use gradle_trace_converter::trace::proto::TrackEventType;
use gradle_trace_converter::{ConvertError, ConverterConfig, convert, convert_with};
use rstest::rstest;

#[rstest]
fn test_sample_log(sample_log: TestLog) {
    let output = sample_log.dir().join("build.perfetto.proto");
    let summary = convert(sample_log.path(), &output).unwrap();

    assert_eq!(summary.packet_count, SAMPLE_PACKETS);
    assert_eq!(summary.build_scan_url.as_deref(), Some(SAMPLE_BUILD_SCAN_URL));

    let trace = read_trace(&output);
    assert_eq!(trace.packet.len(), SAMPLE_PACKETS);
    assert!(
        trace
            .packet
            .iter()
            .all(|p| p.trusted_packet_sequence_id == Some(1))
    );

    // The two tasks overlap, so the second one needs its own lane
    assert_eq!(
        slice_begins(&trace),
        [
            ("Run build".to_string(), 1),
            ("Configure build".to_string(), 1),
            ("Task :app:compileJava".to_string(), 1),
            ("Task :lib:jar".to_string(), 2),
        ]
    );
}

#[rstest]
fn test_slices_balance_per_track(sample_log: TestLog) {
    let output = sample_log.dir().join("out.proto");
    convert(sample_log.path(), &output).unwrap();
    let trace = read_trace(&output);

    for track in [1, 2] {
        let mut depth = 0i32;
        for event in track_events(&trace)
            .into_iter()
            .filter(|e| e.track_uuid == Some(track))
        {
            match event.event_type() {
                Some(TrackEventType::SliceBegin) => depth += 1,
                Some(TrackEventType::SliceEnd) => depth -= 1,
                other => panic!("unexpected {other:?} on lane track {track}"),
            }
            assert!(depth >= 0, "track {track} closed more slices than it opened");
        }
        assert_eq!(depth, 0, "track {track} left slices open");
    }
}

#[rstest]
fn test_timestamps_relative_to_first_start(sample_log: TestLog) {
    let output = sample_log.dir().join("out.proto");
    convert(sample_log.path(), &output).unwrap();
    let trace = read_trace(&output);

    let stamped: Vec<u64> = trace
        .packet
        .iter()
        .filter(|p| p.track_event.is_some())
        .map(|p| p.timestamp.unwrap())
        .collect();
    // begin 1, begin 2, end 2, begin 3, begin 4, end 4, end 3, build scan, end 1
    assert_eq!(stamped, [0, 10, 100, 110, 120, 200, 300, 0, 500]);

    let snapshot = trace.packet[0].clock_snapshot.as_ref().unwrap();
    assert_eq!(snapshot.clocks[1].timestamp, Some(1700000001000));
}

#[test]
fn test_nested_details_survive() {
    let log = TestLog::new(
        "nested-log.txt",
        r#"{"displayName":"Resolve","details":{"configuration":{"name":"compileClasspath","project":{"path":":app","build":":"}},"isScriptConfiguration":false},"id":7,"startTime":50}
{"result":{"resolvedDependenciesCount":3},"id":7,"endTime":60}
"#,
    );
    let output = log.dir().join("out.proto");
    convert(log.path(), &output).unwrap();

    let trace = read_trace(&output);
    let events = track_events(&trace);
    let details = events[0].annotation("details").unwrap();
    let project = details
        .entry("configuration")
        .and_then(|c| c.entry("project"))
        .unwrap();
    assert_eq!(
        project.entry("path").and_then(|p| p.string_value.as_deref()),
        Some(":app")
    );
    assert_eq!(
        details
            .entry("isScriptConfiguration")
            .and_then(|e| e.string_value.as_deref()),
        Some("false")
    );

    let result = events[1].annotation("result").unwrap();
    assert_eq!(
        result
            .entry("resolvedDependenciesCount")
            .and_then(|e| e.string_value.as_deref()),
        Some("3")
    );
    let operation = events[1].annotation("operation").unwrap();
    assert_eq!(
        operation.entry("id").and_then(|e| e.string_value.as_deref()),
        Some("7")
    );
}

#[test]
fn test_empty_log() {
    let log = TestLog::new("empty-log.txt", "");
    let output = log.dir().join("empty.perfetto.proto");
    let summary = convert(log.path(), &output).unwrap();

    assert_eq!(summary.packet_count, 0);
    assert_eq!(summary.build_scan_url, None);
    assert_eq!(std::fs::read(&output).unwrap(), b"");
}

#[test]
fn test_unfinished_operations_still_convert() {
    let log = TestLog::new(
        "crashed-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n{\"id\":99,\"endTime\":5}\n",
    );
    let output = log.dir().join("out.proto");
    let summary = convert(log.path(), &output).unwrap();
    // Clock snapshot, process, lane and the lone begin
    assert_eq!(summary.packet_count, 4);
}

#[test]
fn test_missing_required_field_fails() {
    let log = TestLog::new(
        "bad-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n{\"displayName\":\"x\",\"startTime\":3}\n",
    );
    let err = convert(log.path(), &log.dir().join("out.proto")).unwrap_err();
    match err.downcast_ref::<ConvertError>() {
        Some(ConvertError::Decode { line, message, .. }) => {
            assert_eq!(*line, 2);
            assert!(message.contains("id"), "{message}");
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn test_custom_names() {
    let log = TestLog::new(
        "named-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n",
    );
    let output = log.dir().join("out.proto");
    let config = ConverterConfig {
        process_name: "nightly".into(),
        lane_name: "worker".into(),
    };
    convert_with(log.path(), &output, &config).unwrap();

    let trace = read_trace(&output);
    let process = trace.packet[1].track_descriptor.as_ref().unwrap();
    assert_eq!(
        process.process.as_ref().unwrap().process_name.as_deref(),
        Some("nightly")
    );
    let lane = trace.packet[2].track_descriptor.as_ref().unwrap();
    assert_eq!(
        lane.thread.as_ref().unwrap().thread_name.as_deref(),
        Some("worker")
    );
}

#[test]
fn test_output_directory_missing() {
    let log = TestLog::new("a-log.txt", "");
    let err = convert(log.path(), &log.dir().join("missing/out.proto")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::Create { .. })
    ));
}

#[test]
fn test_decode_error_keeps_flushed_packets() {
    let log = TestLog::new(
        "partial-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n{\"id\":1,\"endTime\":\n",
    );
    let output = log.dir().join("partial.perfetto.proto");
    let err = convert(log.path(), &output).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::Decode { line: 2, .. })
    ));

    // Clock snapshot, process, lane and the begin written before line 2
    let trace = read_trace(&output);
    assert_eq!(trace.packet.len(), 4);
    assert_eq!(slice_begins(&trace), [("Run build".to_string(), 1)]);
}

#[test]
fn test_repeated_build_scan_last_wins() {
    let contents = [
        r#"{"displayName":"Run build","id":1,"startTime":0}"#.to_string(),
        build_scan_progress("Publishing Build Scan to Develocity...\n"),
        build_scan_progress("https://a"),
        build_scan_progress("Publishing Build Scan to Develocity...\n"),
        build_scan_progress("https://b"),
        r#"{"id":1,"endTime":9}"#.to_string(),
    ]
    .join("\n");
    let log = TestLog::new("rescan-log.txt", &contents);
    let output = log.dir().join("out.proto");
    let summary = convert(log.path(), &output).unwrap();

    assert_eq!(summary.build_scan_url.as_deref(), Some("https://b"));
    let trace = read_trace(&output);
    let instants: Vec<_> = track_events(&trace)
        .into_iter()
        .filter(|e| e.event_type() == Some(TrackEventType::Instant))
        .map(|e| (e.name.clone().unwrap_or_default(), e.track_uuid.unwrap_or_default()))
        .collect();
    assert_eq!(
        instants,
        [
            ("Build scan: https://a".to_string(), 2),
            ("Build scan: https://b".to_string(), 3),
        ]
    );
}
