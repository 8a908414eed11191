pub mod client;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod market;
pub mod signals;

pub use client::{IntelClient, SignalQuery, SignalSource};
pub use error::{Result, TokenSeerError};
pub use evaluator::{RiskAnalyzer, RiskAssessment, RiskLevel};
pub use signals::{Signal, SignalSeverity, SignalType};
