//! End-to-end: config file → loaded CSVs → pipeline → exported artifacts.

use std::path::Path;

use corrlab_core::{Remark, RollupPolicy, Verdict};
use corrlab_runner::{
    load_inputs, run_pipeline, run_report, save_report, write_report_files, ConfigError,
    ReportConfig, RunError,
};

const LIMITS: &str = "Test #,Description,Low Limit,High Limit,SDLOT\n\
1,VOUT,0,10,0.5\n\
2,IQ,,,0.02\n";

const REFERENCE: &str = "Test #,Description,Units,S1,S2,S3\n\
1,VOUT,V,5,5.1,4.9\n\
2,IQ,mA,1,1.01,0.99\n";

const SHIFTED: &str = "Test #,Description,Units,S1,S2,S3\n\
1,VOUT,V,6,6.1,5.9\n\
2,IQ,mA,1,1.01,0.99\n";

fn config_toml(rollup: &str) -> String {
    format!(
        r#"
[product]
test_card_name = "TC-0001"
part_name = "PART-X"
package = "QFN"
lead_count = "32"
description = "Correlation"

[setup]
tester_id = "T01"
reference_board = "RB-01"
new_board_id = "NB-01"
test_program = "PROG_V1"

[inputs]
limit_file = "limits.csv"
reference_units = ["rb/u1.csv", "rb/u2.csv"]

[[inputs.boards]]
files = ["nb1/u1.csv", "nb1/u2.csv"]

[[inputs.boards]]
files = ["nb2/u1.csv", "nb2/u2.csv"]

[evaluation]
board_rollup = "{rollup}"
"#
    )
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn fixture(rollup: &str) -> (tempfile::TempDir, ReportConfig) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "limits.csv", LIMITS);
    for unit in ["u1", "u2"] {
        write(dir.path(), &format!("rb/{unit}.csv"), REFERENCE);
        write(dir.path(), &format!("nb1/{unit}.csv"), REFERENCE);
        write(dir.path(), &format!("nb2/{unit}.csv"), SHIFTED);
    }
    write(dir.path(), "report.toml", &config_toml(rollup));
    let config = ReportConfig::from_file(&dir.path().join("report.toml")).unwrap();
    (dir, config)
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn lenient_report_end_to_end() {
    let (dir, config) = fixture("lenient");
    let report = run_report(&config).unwrap();

    assert_eq!(report.boards.len(), 2);
    assert_eq!(report.summary[0].test_card, "TC-0001_NB1");
    assert_eq!(report.summary[0].overall.passed, 2);
    let nb2 = &report.boards[1].evaluation;
    assert_eq!(nb2.units[0].rows[0].unit_status, Verdict::Failed);
    assert_eq!(nb2.board_status, vec![Verdict::ForCheck, Verdict::Passed]);
    // Lenient rollup never surfaces Failed at board level.
    assert_eq!(report.summary[1].remark, Remark::GoodToRelease);

    let out = dir.path().join("out");
    write_report_files(&report, &config, &out).unwrap();

    let summary = read(&out, "correlation_summary.csv");
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines[0], "Test Card,TC-0001_NB1,TC-0001_NB2");
    assert_eq!(lines[1], "Passed test all units,2,1");
    assert_eq!(lines[2], "For Check test all units,0,1");
    assert_eq!(lines[3], "Failed test all units,0,0");
    assert_eq!(lines[4], "Passed test U1,2,1");
    assert_eq!(lines[6], "Failed test U1,0,1");
    assert_eq!(lines[10], "Total test,2,2");
    assert_eq!(
        lines[11],
        "Remarks,Good to release if no concern,Good to release if no concern"
    );

    let results = read(&out, "NB2_correlation_results.csv");
    let mut rows = results.lines();
    let header = rows.next().unwrap();
    assert!(header.starts_with(
        "Test #,Description,Low Limit,High Limit,SDLOT,NB2 Result,Mean RB U1,SD RB U1,Mean NB2 U1,SD NB2 U1,Delta Mean"
    ));
    assert!(header.ends_with("SD Ratio Criteria,Result Unit 2"));
    assert!(rows.next().unwrap().starts_with("1,VOUT,0,10,0.5,For check,5,"));
    assert!(rows.next().unwrap().starts_with("2,IQ,NaN,NaN,0.02,Passed,"));

    let cpk = read(&out, "NB1_cpk.csv");
    let cpk_rows: Vec<&str> = cpk.lines().collect();
    assert!(cpk_rows[1].ends_with("Good capable"));
    assert!(cpk_rows[2].ends_with("N/A"));

    let manifest: serde_json::Value = serde_json::from_str(&read(&out, "manifest.json")).unwrap();
    assert_eq!(manifest["digest"], report.digest().unwrap());
    assert_eq!(manifest["product"]["test_card_name"], "TC-0001");

    let md = read(&out, "report.md");
    assert!(md.contains("| TC-0001_NB2 | 1 | 1 | 0 | 2 | Good to release if no concern |"));
    assert!(out.join("info.csv").exists());
}

#[test]
fn strict_rollup_rejects_failed_board() {
    let (_dir, config) = fixture("strict");
    assert_eq!(config.evaluation.board_rollup, RollupPolicy::Strict);
    let report = run_report(&config).unwrap();
    assert_eq!(report.boards[1].evaluation.board_status[0], Verdict::Failed);
    assert_eq!(report.summary[0].remark, Remark::GoodToRelease);
    assert_eq!(report.summary[1].remark, Remark::NotAcceptable);
}

#[test]
fn identical_inputs_produce_identical_artifacts() {
    let (dir, config) = fixture("lenient");
    let inputs = load_inputs(&config).unwrap();
    let first = run_pipeline(&inputs, &config.evaluation).unwrap();
    let second = run_pipeline(&inputs, &config.evaluation).unwrap();

    let (a, b) = (dir.path().join("a"), dir.path().join("b"));
    write_report_files(&first, &config, &a).unwrap();
    write_report_files(&second, &config, &b).unwrap();

    for entry in std::fs::read_dir(&a).unwrap() {
        let name = entry.unwrap().file_name();
        assert_eq!(
            std::fs::read(a.join(&name)).unwrap(),
            std::fs::read(b.join(&name)).unwrap(),
            "{name:?} differs"
        );
    }
}

#[test]
fn save_report_creates_dated_directory() {
    let (dir, config) = fixture("lenient");
    let report = run_report(&config).unwrap();
    let run_dir = save_report(&report, &config, &config.output_dir()).unwrap();
    assert!(run_dir.starts_with(dir.path().join("reports")));
    let name = run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("TC-0001_Correlation_Report_"));
    assert!(run_dir.join("manifest.json").exists());
}

#[test]
fn missing_candidate_file_names_the_file() {
    let (dir, config) = fixture("lenient");
    std::fs::remove_file(dir.path().join("nb2/u2.csv")).unwrap();
    let err = run_report(&config).unwrap_err();
    assert!(matches!(err, RunError::Load(_)));
    assert!(err.to_string().contains("u2.csv"));
}

#[test]
fn missing_config_file_is_io_error() {
    let err = ReportConfig::from_file(Path::new("/nonexistent/report.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
