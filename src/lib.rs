pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LocalStorage, TomlConfig};

pub use core::{
    engine::{RunSummary, SwitchEngine},
    orchestrator::BatchOrchestrator,
    workflow::LeadApi,
};
pub use utils::error::{ClassifiedError, Result, SwitchError, ValidationError};
