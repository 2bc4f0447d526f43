// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Timestamp normalisation, display formatting, and default output names.

use chrono::{DateTime, Local, TimeZone};

/// Values below this are taken to be seconds, not milliseconds.
pub const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalise a source timestamp to milliseconds since the epoch.
///
/// Media stores report seconds, file systems milliseconds. `0` stays `0`
/// (unknown).
pub fn normalize_timestamp_millis(value: i64) -> i64 {
    if value == 0 {
        return 0;
    }
    if value < MILLIS_THRESHOLD {
        value.saturating_mul(1000)
    } else {
        value
    }
}

/// Render a millisecond timestamp as `d-M-yyyy HH:mm` in local time.
///
/// Unknown (non-positive) timestamps render as an empty string.
pub fn format_timestamp(millis: i64) -> String {
    if millis <= 0 {
        return String::new();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%-d-%-m-%Y %H:%M").to_string(),
        None => String::new(),
    }
}

/// Base name used when the caller does not supply one.
pub fn default_output_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("scanned_{}", now.format("%Y%m%d_%H%M%S"))
}

/// The caller's name when it is non-blank, otherwise a timestamped default.
pub fn resolve_output_name(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_output_name(&Local::now()),
    }
}
