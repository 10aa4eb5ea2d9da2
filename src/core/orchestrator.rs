use crate::core::aggregator::ResultAggregator;
use crate::core::validator;
use crate::domain::model::{
    BatchReport, InputRow, LeadId, NormalizedRecord, Outcome, OutcomeStatus, ProgressUpdate,
};
use crate::domain::ports::{BatchOptions, LeadProcessor, ProgressSink, UnauthorizedPolicy};
use crate::utils::error::{ClassifiedError, ValidationError};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub const CANCELLED_MESSAGE: &str = "Cancelled before processing";

/// 逐列依序處理：驗證 -> 遠端流程 -> 記錄結果。
/// 單列失敗永遠不會中止批次，每一列恰好產生一筆 Outcome。
pub struct BatchOrchestrator<P: LeadProcessor> {
    processor: P,
    options: BatchOptions,
}

impl<P: LeadProcessor> BatchOrchestrator<P> {
    pub fn new(processor: P, options: BatchOptions) -> Self {
        Self { processor, options }
    }

    pub async fn run(&self, rows: &[InputRow], progress: &dyn ProgressSink) -> BatchReport {
        self.run_with_cancel(rows, progress, &CancellationToken::new())
            .await
    }

    /// 取消訊號在每列開始前檢查；取消後剩餘列直接記為 FAILED
    pub async fn run_with_cancel(
        &self,
        rows: &[InputRow],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let total = rows.len();
        let mut aggregator = ResultAggregator::new(total);
        let mut credential_rejected = false;
        let mut cancelled = false;

        tracing::info!("🚀 Processing {} rows", total);

        for (index, row) in rows.iter().enumerate() {
            let row_number = index + self.options.row_number_offset;

            if !cancelled && cancel.is_cancelled() {
                cancelled = true;
                tracing::warn!(
                    "🛑 Batch cancelled at row {}, {} rows left unprocessed",
                    row_number,
                    total - index
                );
            }

            // JSON 日誌中每筆事件都帶 row 欄位
            let span = tracing::info_span!("row", row = row_number);
            let outcome = if cancelled {
                cancelled_outcome(row_number, row)
            } else {
                self.process_row(row_number, row, &mut credential_rejected)
                    .instrument(span.clone())
                    .await
            };

            if !cancelled {
                span.in_scope(|| log_outcome(&outcome));
            }
            aggregator.record(outcome);

            progress.report(&ProgressUpdate::new(index + 1, total, &row.display_name()));

            // 避免觸發上游限流，最後一列之後不等待
            if !cancelled && index + 1 < total {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.row_delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        let report = aggregator.finish(cancelled);
        tracing::info!(
            "🏁 Batch finished: {} total, {} successful, {} failed in {}",
            report.total,
            report.successful,
            report.failed,
            report.elapsed_display()
        );
        report
    }

    async fn process_row(
        &self,
        row_number: usize,
        row: &InputRow,
        credential_rejected: &mut bool,
    ) -> Outcome {
        let record = match validator::normalize(row) {
            Ok(record) => record,
            Err(error) => return rejected_outcome(row_number, row, error),
        };

        if *credential_rejected {
            return record_outcome(
                row_number,
                &record,
                None,
                Some(&ClassifiedError::Unauthorized),
            );
        }

        tracing::debug!(
            "📡 Row {}: switching {} ({}) to '{}'",
            row_number,
            row.display_name(),
            record.phone,
            record.target_profile
        );

        match self.processor.process(&record).await {
            Ok(lead_id) => record_outcome(row_number, &record, Some(&lead_id), None),
            Err(failure) => {
                if failure.error == ClassifiedError::Unauthorized
                    && self.options.unauthorized_policy == UnauthorizedPolicy::FailFast
                {
                    tracing::error!("🔒 API key rejected; remaining rows will not be sent");
                    *credential_rejected = true;
                }
                record_outcome(
                    row_number,
                    &record,
                    failure.lead_id.as_ref(),
                    Some(&failure.error),
                )
            }
        }
    }
}

fn log_outcome(outcome: &Outcome) {
    match outcome.status {
        OutcomeStatus::Success => tracing::info!(
            "✅ Row {}: lead {} switched to '{}'",
            outcome.row_number,
            outcome.lead_id,
            outcome.target_profile
        ),
        OutcomeStatus::Failed => tracing::warn!(
            "❌ Row {}: {}",
            outcome.row_number,
            outcome.error_message
        ),
    }
}

fn record_outcome(
    row_number: usize,
    record: &NormalizedRecord,
    lead_id: Option<&LeadId>,
    error: Option<&ClassifiedError>,
) -> Outcome {
    Outcome {
        row_number,
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        phone: record.phone.clone(),
        target_profile: record.target_profile.clone(),
        lead_id: lead_id.map(|id| id.to_string()).unwrap_or_default(),
        status: if error.is_none() {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::Failed
        },
        error_message: error.map(|e| e.to_string()).unwrap_or_default(),
    }
}

/// 電話無效時回報原始電話；缺 profile 時回報正規化後的電話
fn rejected_outcome(row_number: usize, row: &InputRow, error: ValidationError) -> Outcome {
    let (phone, target_profile) = match error {
        ValidationError::InvalidPhone => {
            (row.raw_phone().to_string(), row.primary_profile().to_string())
        }
        ValidationError::MissingProfile => {
            (validator::normalize_phone(row.raw_phone()), String::new())
        }
    };

    Outcome {
        row_number,
        first_name: row.first_name().to_string(),
        last_name: row.last_name().to_string(),
        phone,
        target_profile,
        lead_id: String::new(),
        status: OutcomeStatus::Failed,
        error_message: error.to_string(),
    }
}

fn cancelled_outcome(row_number: usize, row: &InputRow) -> Outcome {
    Outcome {
        row_number,
        first_name: row.first_name().to_string(),
        last_name: row.last_name().to_string(),
        phone: row.raw_phone().to_string(),
        target_profile: row.primary_profile().to_string(),
        lead_id: String::new(),
        status: OutcomeStatus::Failed,
        error_message: CANCELLED_MESSAGE.to_string(),
    }
}
