use crate::domain::model::{InputRow, NormalizedRecord};
use crate::utils::error::ValidationError;

/// 只保留數字，例如 `(555) 123-4567` -> `5551234567`
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 先取 `Customer Profile`，空白則退回 `Customer Profile - MOVE`
pub fn resolve_profile(row: &InputRow) -> Option<String> {
    [row.primary_profile(), row.move_profile()]
        .into_iter()
        .map(str::trim)
        .find(|profile| !profile.is_empty())
        .map(str::to_string)
}

/// 依序檢查電話、目標 profile，只回報第一個失敗
pub fn normalize(row: &InputRow) -> Result<NormalizedRecord, ValidationError> {
    let phone = normalize_phone(row.raw_phone());
    if phone.is_empty() {
        return Err(ValidationError::InvalidPhone);
    }

    let target_profile = resolve_profile(row).ok_or(ValidationError::MissingProfile)?;

    Ok(NormalizedRecord {
        phone,
        target_profile,
        first_name: row.first_name().to_string(),
        last_name: row.last_name().to_string(),
    })
}
