//! Reporting and export — CSV result tables, JSON manifest, Markdown summary.
//!
//! Every table is plain data with no styling. Undefined values print as
//! `NaN`, undefined capability decisions as `N/A`.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use corrlab_core::{BoardReport, CorrelationReport, Parameter, SCHEMA_VERSION};

use crate::config::{ProductInfo, ReportConfig, SetupInfo};

fn num(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), num)
}

fn limit_cells(param: &Parameter) -> [String; 5] {
    [
        param.test_id.clone(),
        param.name.clone(),
        opt(param.low_limit),
        opt(param.high_limit),
        opt(param.shift_std_threshold),
    ]
}

const LIMIT_HEADERS: [&str; 5] = ["Test #", "Description", "Low Limit", "High Limit", "SDLOT"];

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Product and setup key/value blocks.
pub fn export_info_csv(product: &ProductInfo, setup: &SetupInfo) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Product Info", "Details"])?;
    for (label, value) in product.entries() {
        wtr.write_record([label, value])?;
    }
    wtr.write_record(["", ""])?;
    wtr.write_record(["Setup Info", "Details"])?;
    for (label, value) in setup.entries() {
        wtr.write_record([label, value])?;
    }
    finish(wtr)
}

/// Cross-board summary, transposed: one row per metric, one column per test card.
pub fn export_summary_csv(report: &CorrelationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let summary = &report.summary;

    let mut header = vec!["Test Card".to_string()];
    header.extend(summary.iter().map(|s| s.test_card.clone()));
    wtr.write_record(&header)?;

    let mut row = |label: String, cells: Vec<String>| -> Result<()> {
        let mut record = vec![label];
        record.extend(cells);
        wtr.write_record(&record)?;
        Ok(())
    };

    row(
        "Passed test all units".into(),
        summary.iter().map(|s| s.overall.passed.to_string()).collect(),
    )?;
    row(
        "For Check test all units".into(),
        summary.iter().map(|s| s.overall.for_check.to_string()).collect(),
    )?;
    row(
        "Failed test all units".into(),
        summary.iter().map(|s| s.overall.failed.to_string()).collect(),
    )?;

    let unit_count = summary.iter().map(|s| s.per_unit.len()).max().unwrap_or(0);
    for j in 0..unit_count {
        let per_unit = |pick: fn(&corrlab_core::VerdictCounts) -> usize| -> Vec<String> {
            summary
                .iter()
                .map(|s| {
                    s.per_unit
                        .get(j)
                        .map(|u| pick(&u.counts).to_string())
                        .unwrap_or_default()
                })
                .collect()
        };
        row(format!("Passed test U{}", j + 1), per_unit(|c| c.passed))?;
        row(format!("For Check test U{}", j + 1), per_unit(|c| c.for_check))?;
        row(format!("Failed test U{}", j + 1), per_unit(|c| c.failed))?;
    }

    row(
        "Total test".into(),
        summary.iter().map(|s| s.total_test.to_string()).collect(),
    )?;
    row(
        "Remarks".into(),
        summary.iter().map(|s| s.remark.as_str().to_string()).collect(),
    )?;

    finish(wtr)
}

/// Per-parameter correlation table for one board.
pub fn export_results_csv(report: &CorrelationReport, board: &BoardReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let nb = board.board();
    let evaluation = &board.evaluation;

    let mut header: Vec<String> = LIMIT_HEADERS.iter().map(|h| h.to_string()).collect();
    header.push(format!("{nb} Result"));
    for unit in &evaluation.units {
        let u = unit.unit;
        header.extend([
            format!("Mean RB {u}"),
            format!("SD RB {u}"),
            format!("Mean {nb} {u}"),
            format!("SD {nb} {u}"),
            "Delta Mean".to_string(),
            "Mean Shift".to_string(),
            "Mean Shift Criteria".to_string(),
            "SD Ratio".to_string(),
            "SD Ratio Criteria".to_string(),
            format!("Result Unit {}", u.0),
        ]);
    }
    wtr.write_record(&header)?;

    for (p, param) in report.limits.iter().enumerate() {
        let mut record: Vec<String> = limit_cells(param).into();
        let status = evaluation
            .board_status
            .get(p)
            .with_context(|| format!("{nb} has no board status for parameter #{}", p + 1))?;
        record.push(status.to_string());
        for unit in &evaluation.units {
            let r = unit.rows.get(p).with_context(|| {
                format!("{nb} {} has no row for parameter #{}", unit.unit, p + 1)
            })?;
            record.extend([
                num(r.reference.mean),
                num(r.reference.std),
                num(r.candidate.mean),
                num(r.candidate.std),
                num(r.delta_mean),
                opt(r.mean_shift_pct),
                r.mean_shift_criteria.to_string(),
                num(r.sd_ratio),
                r.sd_ratio_criteria.to_string(),
                r.unit_status.to_string(),
            ]);
        }
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Reference and candidate capability table for one board.
pub fn export_cpk_csv(report: &CorrelationReport, board: &BoardReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let nb = board.board();

    let mut header: Vec<String> = LIMIT_HEADERS.iter().map(|h| h.to_string()).collect();
    header.extend([
        "Mean RB".to_string(),
        "SD RB".to_string(),
        "Cp RB".to_string(),
        "Cpk RB".to_string(),
        "Cpk RB Result".to_string(),
        format!("Mean {nb}"),
        format!("SD {nb}"),
        format!("Cp {nb}"),
        format!("Cpk {nb}"),
        format!("Cpk {nb} Result"),
    ]);
    wtr.write_record(&header)?;

    ensure!(
        board.capability.rows.len() == report.limits.len(),
        "{nb} has {} capability rows for {} parameters",
        board.capability.rows.len(),
        report.limits.len()
    );
    for (param, row) in report.limits.iter().zip(&board.capability.rows) {
        let mut record: Vec<String> = limit_cells(param).into();
        record.extend([
            num(row.reference_stats.mean),
            num(row.reference_stats.std),
            opt(row.reference.cp),
            opt(row.reference.cpk),
            row.reference.decision.to_string(),
            num(row.candidate_stats.mean),
            num(row.candidate_stats.std),
            opt(row.candidate.cp),
            opt(row.candidate.cpk),
            row.candidate.decision.to_string(),
        ]);
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

// ─── JSON export ────────────────────────────────────────────────────

/// Everything needed to reproduce or audit a report.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub schema_version: u32,
    pub product: &'a ProductInfo,
    pub setup: &'a SetupInfo,
    /// BLAKE3 digest of the serialized report.
    pub digest: String,
    pub report: &'a CorrelationReport,
}

pub fn export_manifest(report: &CorrelationReport, config: &ReportConfig) -> Result<String> {
    let manifest = Manifest {
        schema_version: SCHEMA_VERSION,
        product: &config.product,
        setup: &config.setup,
        digest: report.digest().context("failed to digest report")?,
        report,
    };
    serde_json::to_string_pretty(&manifest).context("failed to serialize manifest to JSON")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Human-readable summary of a report.
pub fn generate_report(report: &CorrelationReport, config: &ReportConfig) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str(&format!(
        "# {} Correlation Report\n\n",
        config.product.test_card_name
    ));

    md.push_str("## Product Info\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    for (label, value) in config.product.entries() {
        md.push_str(&format!("| {label} | {value} |\n"));
    }
    md.push('\n');

    md.push_str("## Setup Info\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    for (label, value) in config.setup.entries() {
        md.push_str(&format!("| {label} | {value} |\n"));
    }
    md.push('\n');

    md.push_str("## Correlation Summary\n\n");
    md.push_str("| Test Card | Passed | For Check | Failed | Total | Remarks |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: | --- |\n");
    for s in &report.summary {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            s.test_card,
            s.overall.passed,
            s.overall.for_check,
            s.overall.failed,
            s.total_test,
            s.remark
        ));
    }
    md.push('\n');

    md.push_str("## Capability\n\n");
    md.push_str("| Board | Good capable | Not capable | N/A |\n");
    md.push_str("| --- | ---: | ---: | ---: |\n");
    for board in &report.boards {
        let (mut good, mut not, mut na) = (0, 0, 0);
        for decision in board.capability.decisions() {
            match decision {
                corrlab_core::CpkDecision::GoodCapable => good += 1,
                corrlab_core::CpkDecision::NotCapable => not += 1,
                corrlab_core::CpkDecision::NotApplicable => na += 1,
            }
        }
        md.push_str(&format!("| {} | {good} | {not} | {na} |\n", board.board()));
    }
    md.push('\n');

    if !report.alignment_warnings.is_empty() {
        md.push_str("## Alignment Warnings\n\n");
        for w in &report.alignment_warnings {
            md.push_str(&format!(
                "- `{}` parameter #{}: expected `{}`, found `{}`\n",
                w.table, w.position, w.expected, w.found
            ));
        }
        md.push('\n');
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// `{test card}_Correlation_Report_{DD-MM-YYYY}` with path separators replaced.
pub fn report_dir_name(test_card_name: &str, date: NaiveDate) -> String {
    let safe: String = test_card_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{safe}_Correlation_Report_{}", date.format("%d-%m-%Y"))
}

/// Write every artifact into `dir`, creating it if needed.
pub fn write_report_files(
    report: &CorrelationReport,
    config: &ReportConfig,
    dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report dir: {}", dir.display()))?;

    let write = |name: &str, content: String| -> Result<()> {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))
    };

    write("info.csv", export_info_csv(&config.product, &config.setup)?)?;
    write("correlation_summary.csv", export_summary_csv(report)?)?;
    for board in &report.boards {
        let nb = board.board();
        write(
            &format!("{nb}_correlation_results.csv"),
            export_results_csv(report, board)?,
        )?;
        write(&format!("{nb}_cpk.csv"), export_cpk_csv(report, board)?)?;
    }
    write("manifest.json", export_manifest(report, config)?)?;
    if config.output.markdown {
        write("report.md", generate_report(report, config))?;
    }
    Ok(())
}

/// Save the full artifact set under a dated directory in `output_dir`.
///
/// Returns the path to the created directory.
pub fn save_report(
    report: &CorrelationReport,
    config: &ReportConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    let run_dir = output_dir.join(report_dir_name(&config.product.test_card_name, today));
    write_report_files(report, config, &run_dir)?;
    Ok(run_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_name_uses_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            report_dir_name("TC-01", date),
            "TC-01_Correlation_Report_07-03-2024"
        );
        assert_eq!(
            report_dir_name("A/B", date),
            "A_B_Correlation_Report_07-03-2024"
        );
    }

    #[test]
    fn undefined_values_print_as_nan() {
        assert_eq!(num(f64::NAN), "NaN");
        assert_eq!(opt(None), "NaN");
        assert_eq!(opt(Some(1.67)), "1.67");
        assert_eq!(num(0.0), "0");
    }

    #[test]
    fn info_csv_has_both_blocks() {
        let config = ReportConfig::from_toml(crate::config::TEMPLATE, "/work").unwrap();
        let csv = export_info_csv(&config.product, &config.setup).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Product Info,Details");
        assert_eq!(lines[1], "Test Card Name,TC-0001");
        assert_eq!(lines[6], ",");
        assert_eq!(lines[7], "Setup Info,Details");
        assert_eq!(lines[8], "Tester ID,T01");
    }

    fn single_board_report() -> CorrelationReport {
        use corrlab_core::{
            BoardCapability, BoardEvaluation, BoardId, LimitTable, PooledStatistics,
        };
        let limits = LimitTable::new(vec![Parameter {
            index: 0,
            test_id: "1".into(),
            name: "VOUT".into(),
            low_limit: Some(0.0),
            high_limit: Some(10.0),
            shift_std_threshold: Some(0.5),
        }]);
        let board = BoardReport {
            evaluation: BoardEvaluation {
                board: BoardId(1),
                units: vec![],
                board_status: vec![],
            },
            capability: BoardCapability {
                board: BoardId(1),
                rows: vec![],
            },
        };
        CorrelationReport::assemble(
            "TC",
            limits,
            vec![],
            PooledStatistics { columns: vec![] },
            vec![board],
            vec![],
        )
    }

    #[test]
    fn inconsistent_report_is_an_error_not_a_panic() {
        let report = single_board_report();
        let board = &report.boards[0];
        let err = export_results_csv(&report, board).unwrap_err();
        assert!(err.to_string().contains("NB1"));
        assert!(export_cpk_csv(&report, board).is_err());
    }
}
