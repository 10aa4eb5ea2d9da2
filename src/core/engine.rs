use crate::core::dataset;
use crate::core::orchestrator::BatchOrchestrator;
use crate::core::report;
use crate::core::validator;
use crate::core::workflow::LeadApi;
use crate::domain::model::{BatchReport, InputRow};
use crate::domain::ports::{ConfigProvider, ProgressSink, Storage};
use crate::utils::error::{Result, ValidationError};
use std::fmt;
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: BatchReport,
    pub output_path: String,
}

/// 不呼叫 API 的本地檢查結果
#[derive(Debug, Clone, Default)]
pub struct DryRunSummary {
    pub total: usize,
    pub valid: usize,
    pub rejected: Vec<(usize, ValidationError)>,
}

impl fmt::Display for DryRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🔍 Dry Run Analysis:")?;
        writeln!(f, "  Total rows: {}", self.total)?;
        writeln!(f, "  Ready to process: {}", self.valid)?;
        write!(f, "  Would fail validation: {}", self.rejected.len())?;
        for (row_number, error) in &self.rejected {
            write!(f, "\n  Row {}: {}", row_number, error)?;
        }
        Ok(())
    }
}

/// 讀取資料集 -> 逐列處理 -> 寫出結果報表
pub struct SwitchEngine<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SwitchEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// 資料集無法讀取或欄位不符時在處理任何一列之前就失敗
    pub async fn load_rows(&self) -> Result<Vec<InputRow>> {
        tracing::info!("📁 Reading input from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        let rows = dataset::parse_rows(&data)?;
        tracing::info!("📊 Loaded {} rows", rows.len());
        Ok(rows)
    }

    pub async fn run(
        &self,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<RunSummary> {
        let rows = self.load_rows().await?;

        let api = LeadApi::new(&self.config.api_settings())?;
        let orchestrator = BatchOrchestrator::new(api, self.config.batch_options());
        let report = orchestrator.run_with_cancel(&rows, progress, cancel).await;

        let output_path = self.save_report(&report).await?;
        Ok(RunSummary {
            report,
            output_path,
        })
    }

    pub async fn save_report(&self, report: &BatchReport) -> Result<String> {
        let filename = report::results_filename(&chrono::Local::now());
        let output_path = Path::new(self.config.output_path())
            .join(filename)
            .to_string_lossy()
            .into_owned();

        let csv = report::to_csv(report)?;
        tracing::debug!("Writing report ({} bytes) to storage", csv.len());
        self.storage.write_file(&output_path, csv.as_bytes()).await?;

        tracing::info!("📁 Results saved to: {}", output_path);
        Ok(output_path)
    }

    pub async fn dry_run(&self) -> Result<DryRunSummary> {
        let rows = self.load_rows().await?;
        let offset = self.config.batch_options().row_number_offset;

        let mut summary = DryRunSummary {
            total: rows.len(),
            ..DryRunSummary::default()
        };
        for (index, row) in rows.iter().enumerate() {
            match validator::normalize(row) {
                Ok(_) => summary.valid += 1,
                Err(error) => summary.rejected.push((index + offset, error)),
            }
        }
        Ok(summary)
    }
}
