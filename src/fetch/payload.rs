// src/fetch/payload.rs

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use super::FetchError;
use crate::types::IndicatorRecord;

/// Turn an indicator API body (`[metadata, [observation, ...]]`) into a
/// cleaned series: nulls dropped, one record per year, ascending by year.
pub fn parse_payload(body: &Value) -> Result<Vec<IndicatorRecord>, FetchError> {
    let top = match body {
        Value::Array(items) => items,
        _ => return Err(FetchError::ShortPayload { len: 0 }),
    };
    if top.len() < 2 {
        return Err(FetchError::ShortPayload { len: top.len() });
    }
    let data = match &top[1] {
        Value::Array(items) => items,
        // an empty result set comes back as `[metadata, null]`
        Value::Null => return Ok(Vec::new()),
        _ => return Err(FetchError::Malformed),
    };

    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut dropped = 0usize;
    for item in data {
        match coerce(item) {
            Some(rec) => {
                by_year.entry(rec.year).or_insert(rec.value);
            }
            None => dropped += 1,
        }
    }
    debug!(kept = by_year.len(), dropped, "cleaned observations");

    Ok(by_year
        .into_iter()
        .map(|(year, value)| IndicatorRecord { year, value })
        .collect())
}

fn coerce(item: &Value) -> Option<IndicatorRecord> {
    let value = match item.get("value") {
        None | Some(Value::Null) => return None,
        Some(v) => as_f64(v)?,
    };
    let year = match item.get("date")? {
        Value::String(s) => s.trim().parse::<i32>().ok(),
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        _ => None,
    };
    if year.is_none() {
        trace!(date = ?item.get("date"), "unparseable date");
    }
    Some(IndicatorRecord {
        year: year?,
        value,
    })
}

/// Numbers or numeric strings; `"NaN"` and `"inf"` parse as floats but are
/// not observations.
fn as_f64(v: &Value) -> Option<f64> {
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
