//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

use cs_console_core::Rupiah;

/// Format a decimal amount as rupiah: `Rp 1.250.000`.
///
/// Input that is not a number is shown as-is.
///
/// Usage in templates: `{{ product.harga|rupiah }}`
#[askama::filter_fn]
pub fn rupiah(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(text
        .trim()
        .parse::<Decimal>()
        .map_or(text, |amount| Rupiah::new(amount).to_string()))
}

/// Compact a count: `950`, `1.5K`, `3.4M`.
///
/// Usage in templates: `{{ report.total|compact }}`
#[askama::filter_fn]
pub fn compact(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(text
        .parse::<i64>()
        .map_or(text, crate::services::token_usage::format_compact))
}
