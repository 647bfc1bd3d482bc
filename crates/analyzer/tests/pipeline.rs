//! End-to-end pipeline tests: raw lines in, report out.

use analyzer::anomaly::Finding;
use analyzer::conf::AnalyzerConfig;
use analyzer::logs::LineProcessor;
use analyzer::parser::{FormatHint, GrammarTable, LineOrigin, LogFormat, Severity};
use analyzer::runtime::{analyze_lines, boot, Analysis};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

const SSH_FAILURE: &str =
    "Jan 17 10:15:32 webserver sshd[1234]: Failed password for user from 192.168.1.100";
const ACCESS_OK: &str = r#"192.168.1.101 - - [17/Jan/2026:10:15:32 +0000] "GET /api/users HTTP/1.1" 200 1234 "-" "Mozilla/5.0""#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
}

fn analysis_with(config: AnalyzerConfig) -> Analysis {
    boot(config, now()).unwrap()
}

fn analysis() -> Analysis {
    analysis_with(AnalyzerConfig::default())
}

fn processor() -> LineProcessor {
    LineProcessor::from_table(
        Arc::new(GrammarTable::standard().unwrap()),
        FormatHint::Auto,
        2026,
    )
}

fn kinds(findings: &[Finding]) -> Vec<&'static str> {
    findings.iter().map(Finding::kind).collect()
}

/// `errors` ERROR lines out of `total`, all inside one hour.
fn app_lines(total: usize, errors: usize) -> Vec<String> {
    (0..total)
        .map(|i| {
            let level = if i < errors { "ERROR" } else { "INFO" };
            format!(
                "2026-01-17 10:{:02}:{:02} {} [worker] job {} done",
                i / 60,
                i % 60,
                level,
                i
            )
        })
        .collect()
}

#[test]
fn test_syslog_example() {
    let record = processor()
        .process(SSH_FAILURE, LineOrigin::new("auth.log", 1))
        .unwrap();
    assert_eq!(record.source_format, LogFormat::Syslog);
    assert_eq!(record.ip.as_deref(), Some("192.168.1.100"));
    assert_eq!(record.severity, Severity::Error);
}

#[test]
fn test_access_example() {
    let record = processor()
        .process(ACCESS_OK, LineOrigin::new("access.log", 1))
        .unwrap();
    assert_eq!(record.source_format, LogFormat::WebAccess);
    assert_eq!(record.ip.as_deref(), Some("192.168.1.101"));
    assert_eq!(record.status_code, Some(200));
    assert_eq!(record.endpoint.as_deref(), Some("/api/users"));
    assert_eq!(record.severity, Severity::Info);
}

#[test]
fn test_high_error_rate_fires_above_ten_percent() {
    let report = analyze_lines(&analysis(), "app.log", app_lines(100, 15));
    assert_eq!(report.summary.error_count, 15);
    assert_eq!(report.summary.parsed_lines, 100);
    assert!(report.notable_findings.has_findings);
    assert_eq!(
        report.notable_findings.findings,
        vec![Finding::HighErrorRate {
            error_count: 15,
            parsed_count: 100,
            error_rate: 0.15,
        }]
    );
}

#[test]
fn test_high_error_rate_boundary_is_exclusive() {
    let report = analyze_lines(&analysis(), "app.log", app_lines(100, 10));
    assert_eq!(report.summary.error_count, 10);
    assert!(!kinds(&report.notable_findings.findings).contains(&"high_error_rate"));
    assert!(!report.notable_findings.has_findings);
}

#[test]
fn test_unmatched_error_lines_stay_out_of_error_rate() {
    let lines = [
        "2026-01-17 10:00:00 INFO [api] ok",
        "error one",
        "error two",
        "error three",
    ];
    let report = analyze_lines(&analysis(), "mixed.log", lines);
    assert_eq!(report.summary.parsed_lines, 1);
    assert_eq!(report.summary.error_count, 3);
    let findings = kinds(&report.notable_findings.findings);
    assert!(!findings.contains(&"high_error_rate"));
    assert!(findings.contains(&"low_parse_rate"));
}

#[test]
fn test_error_spike_example() {
    let mut lines = Vec::new();
    for (hour, count) in [2, 2, 2, 2, 2, 20].into_iter().enumerate() {
        for minute in 0..count {
            lines.push(format!(
                "2026-01-17 {:02}:{:02}:00 INFO [web] tick",
                hour, minute
            ));
        }
    }

    let report = analyze_lines(&analysis(), "app.log", lines);
    assert_eq!(report.timeline_by_hour.len(), 6);
    assert_eq!(
        report.notable_findings.findings,
        vec![Finding::ErrorSpike {
            hour: "2026-01-17 05:00".to_string(),
            count: 20,
            mean: 5.0,
            buckets: 6,
        }]
    );
}

#[test]
fn test_mixed_formats_in_one_stream() {
    let lines = [
        SSH_FAILURE,
        ACCESS_OK,
        "2026/01/17 10:16:00 [error] 77#0: *9 connect() failed (111: Connection refused) while connecting to upstream, client: 10.0.0.7",
        "2026-01-17 10:17:00,250 WARNING [billing] retry 3 of 5",
        "",
        "totally free-form text",
    ];
    let report = analyze_lines(&analysis(), "mixed.log", lines);

    let s = &report.summary;
    assert_eq!(s.total_lines, 6);
    assert_eq!(s.parsed_lines, 4);
    assert_eq!(s.blank_lines, 1);
    assert_eq!(s.unparsed_lines, 1);
    assert_eq!(s.total_lines, s.parsed_lines + s.skipped_lines);
    assert_eq!(s.error_count, 2);
    assert_eq!(s.total_warnings, 1);
    assert_eq!(s.total_unknown, 1);
    assert_eq!(s.parse_rate, 66.67);
    assert_eq!(
        s.time_range.start,
        Some(Utc.with_ymd_and_hms(2026, 1, 17, 10, 15, 32).unwrap())
    );
    assert!(kinds(&report.notable_findings.findings).contains(&"low_parse_rate"));
}

#[test]
fn test_message_grouping_collapses_variables() {
    let lines = [
        "2026-01-17 10:00:00 ERROR [db] Timeout after 30 seconds",
        "2026-01-17 10:00:01 ERROR [db] Timeout after 45 seconds",
        "2026-01-17 10:00:02 INFO [db] Connected to 10.0.0.1",
    ];
    let report = analyze_lines(&analysis(), "db.log", lines);
    assert_eq!(report.top_messages[0].message, "Timeout after <num> seconds");
    assert_eq!(report.top_messages[0].count, 2);
    assert_eq!(report.summary.unique_messages, 2);
}

#[test]
fn test_time_window_excludes_but_keeps_untimed() {
    let config = AnalyzerConfig {
        from: Some("2026-01-17 10:00:00".to_string()),
        to: Some("2026-01-17 11:00:00".to_string()),
        ..Default::default()
    };
    let lines = [
        "2026-01-17 09:59:59 INFO [a] early",
        "2026-01-17 10:30:00 INFO [a] inside",
        "2026-01-17 11:00:00 INFO [a] late",
        r#"10.0.0.1 - - [garbled] "GET / HTTP/1.1" 500 0"#,
    ];
    let report = analyze_lines(&analysis_with(config), "w.log", lines);
    let s = &report.summary;
    assert_eq!(s.parsed_lines, 1);
    assert_eq!(s.filtered_lines, 2);
    assert_eq!(s.untimed_lines, 1);
    // untimed record still counts toward severities and status codes
    assert_eq!(s.error_count, 1);
    assert_eq!(report.top_status_codes[0].status_code, 500);
    assert_eq!(report.timeline_by_hour.len(), 1);
}

#[test]
fn test_line_cap() {
    let config = AnalyzerConfig {
        max_lines: Some(10),
        ..Default::default()
    };
    let report = analyze_lines(&analysis_with(config), "app.log", app_lines(50, 0));
    assert_eq!(report.summary.total_lines, 10);
}

#[test]
fn test_format_hint_turns_mismatches_into_unknown() {
    let config = AnalyzerConfig {
        format: FormatHint::Fixed(LogFormat::WebAccess),
        ..Default::default()
    };
    let report = analyze_lines(&analysis_with(config), "x.log", [ACCESS_OK, SSH_FAILURE]);
    assert_eq!(report.summary.parsed_lines, 1);
    assert_eq!(report.summary.unparsed_lines, 1);
}

#[test]
fn test_report_is_deterministic() {
    let lines = app_lines(200, 37);
    let a = analyze_lines(&analysis(), "app.log", &lines);
    let b = analyze_lines(&analysis(), "app.log", &lines);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}
