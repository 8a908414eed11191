//! Display formatting for market metrics.

use chrono::{TimeZone, Utc};

use crate::client::MarketData;

const MAX_PRICE_DECIMALS: usize = 12;

/// Formats a USD price. Sub-cent prices keep four significant digits.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "-".to_string();
    }
    if price == 0.0 {
        return "$0.00".to_string();
    }

    let sign = if price < 0.0 { "-" } else { "" };
    let abs = price.abs();

    let body = if abs >= 1.0 {
        group_thousands(&format!("{:.2}", abs))
    } else if abs >= 0.01 {
        format!("{:.4}", abs)
    } else {
        let leading_zeros = (-abs.log10()).ceil() as usize;
        let decimals = (leading_zeros + 3).min(MAX_PRICE_DECIMALS);
        format!("{:.*}", decimals, abs)
    };

    format!("{}${}", sign, body)
}

const SUFFIXES: [(f64, &str); 5] = [(1.0, ""), (1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

/// Compact form with K/M/B/T suffixes, two decimals.
pub fn format_large_number(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let abs = value.abs();
    let mut tier = SUFFIXES
        .iter()
        .rposition(|(divisor, _)| abs >= *divisor)
        .unwrap_or(0);

    // 999_999 would print as 1000.00K, so move up once rounding reaches 1000
    if tier + 1 < SUFFIXES.len() && ((abs / SUFFIXES[tier].0) * 100.0).round() >= 100_000.0 {
        tier += 1;
    }

    let (divisor, suffix) = SUFFIXES[tier];
    format!("{:.2}{}", value / divisor, suffix)
}

pub fn format_market_cap(value: f64) -> String {
    format!("${}", format_large_number(value))
}

pub fn format_volume(value: f64) -> String {
    format!("${}", format_large_number(value))
}

pub fn format_percent_change(change: f64) -> String {
    if !change.is_finite() {
        return "-".to_string();
    }
    if change > 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// Shortens an address for display, e.g. `So1111...111112`.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        address.to_string()
    }
}

/// Epoch milliseconds as a UTC date-time.
pub fn format_timestamp(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn group_thousands(fixed: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

impl MarketData {
    /// One line per available metric, for terminal output.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Price: {}", format_price(self.price_usd))];

        if let Some(change) = self.price_change_24h {
            lines.push(format!("24h Change: {}", format_percent_change(change)));
        }
        if let Some(market_cap) = self.market_cap {
            lines.push(format!("Market Cap: {}", format_market_cap(market_cap)));
        }
        if let Some(fdv) = self.fdv {
            lines.push(format!("FDV: {}", format_market_cap(fdv)));
        }
        if let Some(volume) = self.volume_24h {
            lines.push(format!("24h Volume: {}", format_volume(volume)));
        }
        if let Some(liquidity) = self.liquidity_usd {
            lines.push(format!("Liquidity: {}", format_volume(liquidity)));
        }
        if let Some(holders) = self.holders {
            lines.push(format!("Holders: {}", group_thousands(&holders.to_string())));
        }
        lines.push(format!("Updated: {}", format_timestamp(self.updated_at)));

        lines
    }
}
