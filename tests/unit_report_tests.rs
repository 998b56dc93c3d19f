use xcmatrix::core::report::{OptionSet, ReportLine, TestReport};

#[test]
fn test_one_failure_among_five_outcomes() {
    let mut report = TestReport::new();
    report.record_result("unit", OptionSet::ios("7.0"), true);
    report.record_result("unit", OptionSet::ios("7.1"), true);
    report.record_result("functional", OptionSet::ios("7.0"), false);
    report.record_result("functional", OptionSet::ios("7.1"), true);
    report.record_result("performance", OptionSet::unversioned(), true);

    assert_eq!(report.len(), 5);
    assert!(report.is_failure());
    assert_eq!(
        report.report(),
        vec![ReportLine::Failure {
            subtask: "functional".to_string(),
            options: OptionSet::ios("7.0"),
        }]
    );
}

#[test]
fn test_all_passing_run_reports_success() {
    let mut report = TestReport::new();
    report.record_result("unit", OptionSet::unversioned(), true);
    report.record_result("functional", OptionSet::unversioned(), true);

    assert!(report.is_success());
    assert_eq!(report.report(), vec![ReportLine::Success]);
}

#[test]
fn test_failures_keep_recording_order() {
    let mut report = TestReport::new();
    report.record_result("functional", OptionSet::unversioned(), false);
    report.record_result("unit", OptionSet::ios("7.1"), false);
    report.record_result("functional", OptionSet::ios("7.0"), false);

    let subtasks: Vec<(String, OptionSet)> = report
        .report()
        .into_iter()
        .filter_map(|line| match line {
            ReportLine::Failure { subtask, options } => Some((subtask, options)),
            ReportLine::Success => None,
        })
        .collect();
    assert_eq!(
        subtasks,
        vec![
            ("functional".to_string(), OptionSet::unversioned()),
            ("functional".to_string(), OptionSet::ios("7.0")),
            ("unit".to_string(), OptionSet::ios("7.1")),
        ]
    );
}

#[test]
fn test_empty_report_is_success() {
    let report = TestReport::new();
    assert!(report.is_success());
    assert_eq!(report.report(), vec![ReportLine::Success]);
}

#[test]
fn test_failure_is_monotonic() {
    let mut report = TestReport::new();
    report.record_result("unit", OptionSet::ios("7.0"), false);
    report.record_result("unit", OptionSet::ios("7.0"), true);
    assert!(report.is_failure());
    assert_eq!(report.outcome("unit", &OptionSet::ios("7.0")), Some(false));
    assert_eq!(report.report().len(), 1);
}

#[test]
fn test_option_set_display() {
    assert_eq!(OptionSet::ios("7.1").to_string(), "{ios_version: 7.1}");
    assert_eq!(OptionSet::unversioned().to_string(), "{}");
}
