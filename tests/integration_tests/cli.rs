//! Tests for the `gtc` binary.

use crate::common::{SAMPLE_PACKETS, TestLog, gtc_command, read_trace, sample_log};
use insta::assert_snapshot;
use rstest::rstest;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[rstest]
fn test_converts_next_to_log(sample_log: TestLog) {
    let output = gtc_command(&sample_log)
        .arg(sample_log.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    sample_log.snapshot_settings().bind(|| {
        assert_snapshot!(stdout(&output), @r"
        ✅ Written 13 packets to [TMP]/build.perfetto.proto
        ⚪ Build scan URL: https://gradle.com/s/abc123
        ");
    });
    assert_eq!(
        read_trace(&sample_log.default_output()).packet.len(),
        SAMPLE_PACKETS
    );
}

#[rstest]
fn test_relative_input_is_reported_absolute(sample_log: TestLog) {
    let output = gtc_command(&sample_log)
        .arg("build-log.txt")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    sample_log.snapshot_settings().bind(|| {
        assert_snapshot!(stdout(&output).lines().next().unwrap(), @"✅ Written 13 packets to [TMP]/build.perfetto.proto");
    });
}

#[rstest]
fn test_explicit_output(sample_log: TestLog) {
    let target = sample_log.dir().join("custom.pftrace");
    let output = gtc_command(&sample_log)
        .arg(sample_log.path())
        .arg("-o")
        .arg(&target)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    assert!(target.exists());
    assert!(!sample_log.default_output().exists());
}

#[test]
fn test_no_build_scan_line_without_url() {
    let log = TestLog::new(
        "help-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n{\"id\":1,\"endTime\":3}\n",
    );
    let output = gtc_command(&log).arg(log.path()).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    log.snapshot_settings().bind(|| {
        assert_snapshot!(stdout(&output), @"✅ Written 5 packets to [TMP]/help.perfetto.proto");
    });
}

#[test]
fn test_missing_input() {
    let log = TestLog::new("other-log.txt", "");
    let output = gtc_command(&log)
        .arg(log.dir().join("missing-log.txt"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    log.snapshot_settings().bind(|| {
        assert_snapshot!(stderr(&output), @"❌ File not found: [TMP]/missing-log.txt");
    });
    assert!(!log.dir().join("missing.perfetto.proto").exists());
}

#[test]
fn test_directory_input() {
    let log = TestLog::new("other-log.txt", "");
    let output = gtc_command(&log).arg(log.dir()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("File not found"));
}

#[test]
fn test_malformed_record() {
    let log = TestLog::new(
        "broken-log.txt",
        "{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n{\"id\":1,\"endTime\":\"later\"}\n",
    );
    let output = gtc_command(&log).arg(log.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(
        stderr.contains("Malformed build operation record at"),
        "{stderr}"
    );
    assert!(stderr.contains("broken-log.txt:2"), "{stderr}");
}

#[test]
fn test_missing_argument() {
    let log = TestLog::new("other-log.txt", "");
    let output = gtc_command(&log).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage"));
}

#[rstest]
fn test_config_file(sample_log: TestLog) {
    let config = sample_log.dir().join("gtc.toml");
    std::fs::write(&config, "process-name = \"from config\"\n").unwrap();

    let output = gtc_command(&sample_log)
        .arg("--config")
        .arg(&config)
        .arg(sample_log.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let trace = read_trace(&sample_log.default_output());
    let process = trace.packet[1].track_descriptor.as_ref().unwrap();
    assert_eq!(
        process.process.as_ref().unwrap().process_name.as_deref(),
        Some("from config")
    );
}

#[rstest]
#[cfg(unix)]
fn test_default_config_location(sample_log: TestLog) {
    let config_home = sample_log.dir().join("xdg");
    std::fs::create_dir_all(config_home.join("gtc")).unwrap();
    std::fs::write(
        config_home.join("gtc/config.toml"),
        "process-name = \"from user config\"\n",
    )
    .unwrap();

    let output = gtc_command(&sample_log)
        .env_remove("GTC_CONFIG_PATH")
        .env("XDG_CONFIG_HOME", &config_home)
        .arg(sample_log.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let trace = read_trace(&sample_log.default_output());
    let process = trace.packet[1].track_descriptor.as_ref().unwrap();
    assert_eq!(
        process.process.as_ref().unwrap().process_name.as_deref(),
        Some("from user config")
    );
}

#[test]
fn test_warns_about_records_before_first_start() {
    let log = TestLog::new(
        "early-log.txt",
        "{\"id\":9,\"endTime\":1}\n{\"displayName\":\"Run build\",\"id\":1,\"startTime\":0}\n",
    );
    let output = gtc_command(&log).arg("-v").arg(log.path()).output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let stderr = stderr(&output);
    assert!(
        stderr.contains("Record for operation 9 precedes the first operation start"),
        "{stderr}"
    );
}

#[rstest]
fn test_env_overrides_lane_name(sample_log: TestLog) {
    let output = gtc_command(&sample_log)
        .env("GTC_LANE_NAME", "worker")
        .arg(sample_log.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let trace = read_trace(&sample_log.default_output());
    let lanes: Vec<_> = trace
        .packet
        .iter()
        .filter_map(|p| p.track_descriptor.as_ref()?.thread.as_ref()?.thread_name.clone())
        .collect();
    assert_eq!(lanes, ["worker", "worker"]);
}

#[rstest]
fn test_empty_name_is_rejected(sample_log: TestLog) {
    let output = gtc_command(&sample_log)
        .env("GTC_PROCESS_NAME", "")
        .arg(sample_log.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("process-name cannot be empty"));
    assert!(!sample_log.default_output().exists());
}

#[rstest]
fn test_verbose_logs_to_stderr(sample_log: TestLog) {
    let output = gtc_command(&sample_log)
        .arg("-v")
        .arg(sample_log.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = stderr(&output);
    assert!(stderr.contains("Clock origin is 1700000001000 ms"), "{stderr}");
    assert!(stderr.contains("Build scan URL: https://gradle.com/s/abc123"));
}
