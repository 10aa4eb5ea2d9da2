use crate::domain::model::{
    InputRow, FIELD_CUSTOMER_PROFILE, FIELD_CUSTOMER_PROFILE_MOVE, FIELD_FIRST_NAME,
    FIELD_LAST_NAME, FIELD_MOBILE_PHONE,
};
use crate::utils::error::{Result, SwitchError};
use csv::{ReaderBuilder, StringRecord, Trim};

pub const REQUIRED_COLUMNS: [&str; 3] = [FIELD_FIRST_NAME, FIELD_LAST_NAME, FIELD_MOBILE_PHONE];
pub const PROFILE_COLUMNS: [&str; 2] = [FIELD_CUSTOMER_PROFILE, FIELD_CUSTOMER_PROFILE_MOVE];

/// 整個資料集的前置檢查；失敗時整批不處理
pub fn check_schema(headers: &StringRecord) -> Result<()> {
    let has_column = |name: &str| headers.iter().any(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&column| !has_column(column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SwitchError::MissingColumns { columns: missing });
    }

    if !PROFILE_COLUMNS.iter().any(|&column| has_column(column)) {
        return Err(SwitchError::MissingProfileColumn);
    }

    Ok(())
}

/// 解析 CSV 內容；欄位數不足的列以空字串補齊
pub fn parse_rows(data: &[u8]) -> Result<Vec<InputRow>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    check_schema(&headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: InputRow = headers.iter().zip(record.iter()).collect();
        rows.push(row);
    }

    tracing::debug!("📄 Parsed {} rows with columns {:?}", rows.len(), headers);
    Ok(rows)
}
