use crate::domain::model::{BatchReport, Outcome};
use crate::utils::error::{Result, SwitchError};
use chrono::{DateTime, TimeZone};
use csv::{ReaderBuilder, WriterBuilder};

pub const REPORT_COLUMNS: [&str; 8] = [
    "Row Number",
    "First Name",
    "Last Name",
    "Phone",
    "Target Profile",
    "Lead ID",
    "Status",
    "Error Message",
];

/// 每筆 Outcome 一列；即使沒有資料也會輸出標頭
pub fn to_csv(report: &BatchReport) -> Result<String> {
    outcomes_to_csv(&report.outcomes)
}

pub fn outcomes_to_csv<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(REPORT_COLUMNS)?;
    for outcome in outcomes {
        writer.serialize(outcome)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SwitchError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SwitchError::ProcessingError {
        message: format!("Report is not valid UTF-8: {}", e),
    })
}

pub fn from_csv(data: &str) -> Result<Vec<Outcome>> {
    let mut reader = ReaderBuilder::new().from_reader(data.as_bytes());
    reader
        .deserialize::<Outcome>()
        .map(|record| record.map_err(SwitchError::from))
        .collect()
}

/// 例如 `profile_switch_results_20250101_093000.csv`
pub fn results_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("profile_switch_results_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn summary(report: &BatchReport) -> String {
    let mut lines = vec![
        format!("Total Processed: {}", report.total),
        format!("Successful: {}", report.successful),
        format!("Failed: {}", report.failed),
        format!("Duration: {}", report.elapsed_display()),
    ];
    if report.cancelled {
        lines.push("Batch was cancelled before all rows were processed".to_string());
    }
    lines.join("\n")
}

/// 摘要加上每筆失敗資料一行，兩個執行檔共用
pub fn completion_text(report: &BatchReport) -> String {
    let mut text = summary(report);
    if report.failed > 0 {
        text.push_str(&format!("\n⚠️ {} leads failed to process", report.failed));
        for outcome in report.failed_outcomes() {
            text.push_str(&format!(
                "\n  Row {}: {} {} ({}) - {}",
                outcome.row_number,
                outcome.first_name,
                outcome.last_name,
                outcome.phone,
                outcome.error_message
            ));
        }
    }
    text
}
