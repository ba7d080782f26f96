use serde::{Deserialize, Deserializer};

/// Deserialize an optional concurrency limit that may be written as an
/// integer or a float.
///
/// Finite floats are floored (`2.7` → `2`); `nan` / `inf` map to `0`, which
/// the lane scheduler later clamps to `1` with a warning.  Range checks are
/// left to the scheduler.
pub(crate) fn de_limit<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLimit {
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawLimit>::deserialize(deserializer)?.map(|raw| match raw {
        RawLimit::Int(n) => n,
        RawLimit::Float(f) if f.is_finite() => f.floor() as i64,
        RawLimit::Float(_) => 0,
    }))
}
