use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

// Canonical form used for hashing:
// - keys sorted lexicographically at every depth
// - no insignificant whitespace
// - integers as-is; floats rounded to FLOAT_DECIMALS places
const FLOAT_DECIMALS: i32 = 6;

pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    let normalized = normalize_value(v)?;
    let s = serde_json::to_string(&normalized)?;
    Ok(s.into_bytes())
}

fn normalize_value(v: Value) -> CoreResult<Value> {
    match v {
        Value::Object(map) => {
            let mut sorted: BTreeMap<String, Value> = BTreeMap::new();
            for (k, vv) in map {
                sorted.insert(k, normalize_value(vv)?);
            }
            Ok(Value::Object(sorted.into_iter().collect()))
        }
        Value::Array(arr) => arr
            .into_iter()
            .map(normalize_value)
            .collect::<CoreResult<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        Value::Number(n) => {
            let f = n.as_f64().ok_or_else(|| {
                CoreError::DeterminismViolation(format!("unrepresentable number {}", n))
            })?;
            round_float(f)
        }
        other => Ok(other),
    }
}

fn round_float(f: f64) -> CoreResult<Value> {
    if !f.is_finite() {
        return Err(CoreError::DeterminismViolation(
            "canonical JSON forbids non-finite numbers".to_string(),
        ));
    }
    let scale = 10f64.powi(FLOAT_DECIMALS);
    let rounded = (f * scale).round() / scale;
    // -0.0 and 0.0 must hash the same.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    Number::from_f64(rounded)
        .map(Value::Number)
        .ok_or_else(|| CoreError::DeterminismViolation(format!("cannot encode float {}", f)))
}
