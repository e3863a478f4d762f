// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crate::errors::PointError;

/// A value stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point. Must be finite.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// Boolean value.
    Boolean(bool),
    /// UTF-8 string.
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// One timestamped metric observation. Immutable once constructed; the
/// timestamp is set at enqueue time and is the sole basis for expiry
/// decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    name: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: SystemTime,
}

impl Point {
    /// Builds a point stamped with the current wall clock.
    ///
    /// Fails for an empty series name, an empty field set, and non-finite
    /// float fields (InfluxDB rejects NaN and infinities).
    pub fn new(
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Self, PointError> {
        Self::new_at(name, tags, fields, SystemTime::now())
    }

    pub(crate) fn new_at(
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        timestamp: SystemTime,
    ) -> Result<Self, PointError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PointError::EmptyName);
        }
        if fields.is_empty() {
            return Err(PointError::NoFields);
        }
        for (key, value) in &fields {
            if let FieldValue::Float(v) = value {
                if !v.is_finite() {
                    return Err(PointError::NonFiniteField(key.clone()));
                }
            }
        }

        Ok(Point {
            name,
            tags,
            fields,
            timestamp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Age of the point relative to `now`. Zero if the clock stepped
    /// backwards past the capture time.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.timestamp).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn one_field() -> BTreeMap<String, FieldValue> {
        BTreeMap::from([("count".to_string(), FieldValue::Integer(1))])
    }

    #[test]
    fn test_point_construction() {
        let point = Point::new("dns_query", tags(&[("client", "10.0.0.1")]), one_field())
            .expect("valid point");
        assert_eq!(point.name(), "dns_query");
        assert_eq!(point.tags().get("client").map(String::as_str), Some("10.0.0.1"));
        assert_eq!(point.fields().len(), 1);
    }

    #[test]
    fn test_point_rejects_empty_name() {
        assert_eq!(
            Point::new("", BTreeMap::new(), one_field()).unwrap_err(),
            PointError::EmptyName
        );
    }

    #[test]
    fn test_point_rejects_empty_fields() {
        assert_eq!(
            Point::new("dns_query", BTreeMap::new(), BTreeMap::new()).unwrap_err(),
            PointError::NoFields
        );
    }

    #[test]
    fn test_point_rejects_non_finite_fields() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let fields = BTreeMap::from([("value".to_string(), FieldValue::Float(bad))]);
            assert_eq!(
                Point::new("m", BTreeMap::new(), fields).unwrap_err(),
                PointError::NonFiniteField("value".to_string())
            );
        }
    }

    #[test]
    fn test_point_age() {
        let now = SystemTime::now();
        let point = Point::new_at("m", BTreeMap::new(), one_field(), now - Duration::from_secs(90))
            .expect("valid point");
        assert_eq!(point.age(now), Duration::from_secs(90));
        // Clock stepped backwards: age saturates at zero.
        assert_eq!(point.age(now - Duration::from_secs(120)), Duration::ZERO);
    }
}
