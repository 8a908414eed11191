use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{RiskAssessment, RiskLevel};
use crate::client::{SignalQuery, SignalSource};
use crate::error::Result;
use crate::signals::{Signal, SignalSeverity, SignalType};

/// Scores at or above this are high risk regardless of signal types.
pub const HIGH_RISK_THRESHOLD: u8 = 70;

const AVERAGE_WEIGHT: f64 = 0.6;
const PEAK_WEIGHT: f64 = 0.4;

fn signal_score(signal: &Signal) -> f64 {
    f64::from(signal.severity.weight()) * signal.signal_type.risk_factor()
}

/// Aggregate risk score in `0..=100`. An empty collection scores 0.
///
/// Each signal scores `severity weight × type factor`; the collection blends
/// the mean (60%) with the single worst signal (40%) and scales by 10.
pub fn calculate_risk_score(signals: &[Signal]) -> u8 {
    if signals.is_empty() {
        return 0;
    }

    let (sum, max) = signals
        .iter()
        .map(signal_score)
        .fold((0.0_f64, 0.0_f64), |(sum, max), s| (sum + s, max.max(s)));
    let avg = sum / signals.len() as f64;

    let combined = AVERAGE_WEIGHT * avg + PEAK_WEIGHT * max;
    (combined * 10.0).min(100.0).round() as u8
}

pub fn get_risk_level(score: u8) -> RiskLevel {
    match score {
        0..=19 => RiskLevel::Safe,
        20..=39 => RiskLevel::Low,
        40..=59 => RiskLevel::Medium,
        60..=79 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

/// True when the score crosses [`HIGH_RISK_THRESHOLD`] or any signal is a
/// honeypot, a rugpull risk, or critical severity.
pub fn is_high_risk(signals: &[Signal]) -> bool {
    let disqualified = signals.iter().any(|s| {
        matches!(s.signal_type, SignalType::Honeypot | SignalType::RugpullRisk)
            || s.severity == SignalSeverity::Critical
    });

    disqualified || calculate_risk_score(signals) >= HIGH_RISK_THRESHOLD
}

/// Signals whose severity weight is at least `min_severity`'s weight.
pub fn filter_by_severity(signals: &[Signal], min_severity: SignalSeverity) -> Vec<&Signal> {
    let min_weight = min_severity.weight();
    signals
        .iter()
        .filter(|s| s.severity.weight() >= min_weight)
        .collect()
}

pub fn filter_by_type<'a>(signals: &'a [Signal], types: &[SignalType]) -> Vec<&'a Signal> {
    signals
        .iter()
        .filter(|s| types.contains(&s.signal_type))
        .collect()
}

/// High and critical severity signals.
pub fn get_critical_signals(signals: &[Signal]) -> Vec<&Signal> {
    signals
        .iter()
        .filter(|s| matches!(s.severity, SignalSeverity::High | SignalSeverity::Critical))
        .collect()
}

/// Descending severity weight; ties keep their input order.
pub fn sort_by_severity(signals: &[Signal]) -> Vec<&Signal> {
    let mut sorted: Vec<&Signal> = signals.iter().collect();
    sorted.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));
    sorted
}

pub fn group_by_type(signals: &[Signal]) -> BTreeMap<SignalType, Vec<&Signal>> {
    let mut groups: BTreeMap<SignalType, Vec<&Signal>> = BTreeMap::new();
    for signal in signals {
        groups.entry(signal.signal_type).or_default().push(signal);
    }
    groups
}

pub fn format_signal(signal: &Signal) -> String {
    format!(
        "{} [{}] {}: {}",
        signal.severity.indicator(),
        signal.severity.label(),
        signal.title,
        signal.summary
    )
}

/// Fetches a token's signals and scores them against a risk tolerance.
pub struct RiskAnalyzer<S> {
    source: S,
    max_risk_level: RiskLevel,
}

impl<S: SignalSource> RiskAnalyzer<S> {
    pub fn new(source: S, max_risk_level: RiskLevel) -> Self {
        Self {
            source,
            max_risk_level,
        }
    }

    pub async fn assess(&self, address: &str) -> Result<RiskAssessment> {
        info!("Analyzing risk for token {}", address);

        let signals = self
            .source
            .fetch_signals(address, &SignalQuery::default())
            .await?;
        let assessment = RiskAssessment::from_signals(&signals);

        debug!(
            "Token {}: {} signals, score {} ({})",
            address, assessment.signal_count, assessment.score, assessment.level
        );

        Ok(assessment)
    }

    pub fn is_within_tolerance(&self, assessment: &RiskAssessment) -> bool {
        !assessment.high_risk && assessment.level <= self.max_risk_level
    }

    pub fn max_risk_level(&self) -> RiskLevel {
        self.max_risk_level
    }
}
