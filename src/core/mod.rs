pub mod aggregator;
pub mod dataset;
pub mod engine;
pub mod orchestrator;
pub mod report;
pub mod transport;
pub mod validator;
pub mod workflow;

pub use crate::domain::model::{BatchReport, InputRow, NormalizedRecord, Outcome, OutcomeStatus};
pub use crate::domain::ports::{
    ApiSettings, BatchOptions, ConfigProvider, LeadProcessor, ProgressSink, Storage,
};
pub use crate::utils::error::Result;
