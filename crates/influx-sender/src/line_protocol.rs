// SPDX-License-Identifier: Apache-2.0

//! InfluxDB v1 Line Protocol encoding.
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use std::fmt::Write as _;
use std::time::UNIX_EPOCH;

use crate::point::{FieldValue, Point};

/// Encodes a batch of points into one request body, one line per point.
///
/// Tag keys come out sorted because points store them in a `BTreeMap`,
/// matching the canonical form the server indexes fastest.
pub fn encode(points: &[Point]) -> String {
    let mut body = String::new();
    for point in points {
        if !body.is_empty() {
            body.push('\n');
        }
        encode_point(&mut body, point);
    }
    body
}

fn encode_point(out: &mut String, point: &Point) {
    escape_measurement(out, point.name());

    for (key, value) in point.tags() {
        out.push(',');
        escape_key(out, key);
        out.push('=');
        escape_key(out, value);
    }

    out.push(' ');
    for (i, (key, value)) in point.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_key(out, key);
        out.push('=');
        encode_field_value(out, value);
    }

    let timestamp_ns = point
        .timestamp()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let _ = write!(out, " {timestamp_ns}");
}

fn encode_field_value(out: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Float(v) => {
            let _ = write!(out, "{v}");
        }
        FieldValue::Integer(v) => {
            let _ = write!(out, "{v}i");
        }
        FieldValue::Boolean(v) => {
            let _ = write!(out, "{v}");
        }
        FieldValue::Text(v) => {
            out.push('"');
            for c in v.chars() {
                if c == '\\' || c == '"' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
}

/// Measurement names escape commas and spaces.
fn escape_measurement(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Tag keys, tag values and field keys escape commas, equals signs and
/// spaces.
fn escape_key(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == '=' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}
