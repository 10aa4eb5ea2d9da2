use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const FIELD_FIRST_NAME: &str = "First Name";
pub const FIELD_LAST_NAME: &str = "Last Name";
pub const FIELD_MOBILE_PHONE: &str = "Mobile Phone";
pub const FIELD_CUSTOMER_PROFILE: &str = "Customer Profile";
pub const FIELD_CUSTOMER_PROFILE_MOVE: &str = "Customer Profile - MOVE";

/// 輸入資料集的一列，欄位名稱對應原始 CSV 標頭
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub data: HashMap<String, String>,
}

impl InputRow {
    /// 缺少的欄位視為空字串
    pub fn field(&self, name: &str) -> &str {
        self.data.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn first_name(&self) -> &str {
        self.field(FIELD_FIRST_NAME)
    }

    pub fn last_name(&self) -> &str {
        self.field(FIELD_LAST_NAME)
    }

    pub fn raw_phone(&self) -> &str {
        self.field(FIELD_MOBILE_PHONE)
    }

    pub fn primary_profile(&self) -> &str {
        self.field(FIELD_CUSTOMER_PROFILE)
    }

    pub fn move_profile(&self) -> &str {
        self.field(FIELD_CUSTOMER_PROFILE_MOVE)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
            .trim()
            .to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// 只含數字
    pub phone: String,
    pub target_profile: String,
    pub first_name: String,
    pub last_name: String,
}

/// lookup 回傳的遠端識別碼，僅在處理單筆資料期間持有
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeadId(String);

impl LeadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => f.write_str("SUCCESS"),
            OutcomeStatus::Failed => f.write_str("FAILED"),
        }
    }
}

/// 每一列輸入恰好對應一筆 Outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(rename = "Row Number")]
    pub row_number: usize,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Target Profile")]
    pub target_profile: String,
    #[serde(rename = "Lead ID")]
    pub lead_id: String,
    #[serde(rename = "Status")]
    pub status: OutcomeStatus,
    #[serde(rename = "Error Message")]
    pub error_message: String,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// 批次中途被取消時為 true，剩餘的列仍各有一筆 FAILED
    pub cancelled: bool,
}

impl BatchReport {
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// 例如 `0:01:07`，捨去小數秒
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// 給呈現層的進度通知
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub current: usize,
    pub total: usize,
    pub fraction: f64,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(current: usize, total: usize, name: &str) -> Self {
        let fraction = if total == 0 {
            1.0
        } else {
            current as f64 / total as f64
        };
        Self {
            current,
            total,
            fraction,
            message: format!("Processing {}/{}: {}", current, total, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_row_missing_field_is_empty() {
        let row: InputRow = [(FIELD_FIRST_NAME, "Ada")].into_iter().collect();
        assert_eq!(row.first_name(), "Ada");
        assert_eq!(row.last_name(), "");
        assert_eq!(row.display_name(), "Ada");
    }

    #[test]
    fn test_progress_update_fraction_and_message() {
        let update = ProgressUpdate::new(1, 4, "Ada Lovelace");
        assert_eq!(update.fraction, 0.25);
        assert_eq!(update.message, "Processing 1/4: Ada Lovelace");
    }

    #[test]
    fn test_elapsed_display_drops_fraction() {
        let report = BatchReport {
            outcomes: vec![],
            total: 0,
            successful: 0,
            failed: 0,
            elapsed: Duration::from_millis(3_725_900),
            cancelled: false,
        };
        assert_eq!(report.elapsed_display(), "1:02:05");
    }
}
