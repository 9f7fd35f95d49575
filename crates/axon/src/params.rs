//! Typed parameter values and mappings.
//!
//! The kernel is strongly typed internally: an integer is not a float, and a
//! float is not text. [`ParamValue`] keeps that distinction on the wire with
//! an adjacently tagged encoding (`{"t": "float", "v": 10.0}`), so a mismatch
//! is caught when a frame is decoded instead of surfacing as a silent
//! coercion later. The plain-JSON rendering used for display ([`to_json`])
//! drops the tags and is strictly one-way.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An unordered parameter mapping: name to typed value.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single parameter value in the kernel's native representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Map(ParamMap),
}

impl ParamValue {
    /// Scalars are everything except nested mappings.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ParamValue::Map(_))
    }

    /// Short name of the value's type, as it appears in kernel messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Text(_) => "text",
            ParamValue::Map(_) => "map",
        }
    }

    /// Render into plain JSON, dropping the type tags.
    ///
    /// Integers stay JSON integers, floats stay JSON numbers, nested
    /// mappings become objects. Non-finite floats have no JSON form and
    /// render as null.
    pub fn to_plain_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Int(n) => serde_json::Value::from(*n),
            ParamValue::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::Map(map) => plain_object(map),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_json())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(value: ParamMap) -> Self {
        ParamValue::Map(value)
    }
}

fn plain_object(map: &ParamMap) -> serde_json::Value {
    serde_json::Value::Object(
        map.iter()
            .map(|(name, value)| (name.clone(), value.to_plain_json()))
            .collect(),
    )
}

/// Render a parameter mapping as JSON text.
///
/// A pure function of the mapping: the top-level value is a JSON object
/// mirroring the mapping's keys and values. Never talks to the kernel.
pub fn to_json(map: &ParamMap) -> String {
    plain_object(map).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(entries: &[(&str, ParamValue)]) -> ParamMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn wire_form_tags_every_scalar_type() {
        assert_eq!(
            serde_json::to_value(ParamValue::Int(3)).unwrap(),
            json!({"t": "int", "v": 3})
        );
        assert_eq!(
            serde_json::to_value(ParamValue::Float(10.0)).unwrap(),
            json!({"t": "float", "v": 10.0})
        );
        assert_eq!(
            serde_json::to_value(ParamValue::Bool(false)).unwrap(),
            json!({"t": "bool", "v": false})
        );
        assert_eq!(
            serde_json::to_value(ParamValue::Text("memory".into())).unwrap(),
            json!({"t": "text", "v": "memory"})
        );
    }

    #[test]
    fn int_and_float_stay_distinct_on_the_wire() {
        let int = serde_json::to_value(ParamValue::Int(5)).unwrap();
        let float = serde_json::to_value(ParamValue::Float(5.0)).unwrap();
        assert_ne!(int, float);
        assert_eq!(
            serde_json::from_value::<ParamValue>(int).unwrap(),
            ParamValue::Int(5)
        );
        assert_eq!(
            serde_json::from_value::<ParamValue>(float).unwrap(),
            ParamValue::Float(5.0)
        );
    }

    #[test]
    fn nested_mappings_round_trip() {
        let value = ParamValue::Map(map(&[
            ("tau_m", ParamValue::Float(10.0)),
            (
                "recordables",
                ParamValue::Map(map(&[("V_m", ParamValue::Bool(true))])),
            ),
        ]));
        let wire = serde_json::to_value(&value).unwrap();
        assert_eq!(serde_json::from_value::<ParamValue>(wire).unwrap(), value);
    }

    #[test]
    fn nested_wire_shape() {
        let value = ParamValue::Map(map(&[("tau_m", ParamValue::Float(10.0))]));
        insta::assert_json_snapshot!(value, @r###"
        {
          "t": "map",
          "v": {
            "tau_m": {
              "t": "float",
              "v": 10.0
            }
          }
        }
        "###);
    }

    #[test]
    fn mistyped_wire_payloads_fail_to_decode() {
        let err = serde_json::from_value::<ParamValue>(json!({"t": "float", "v": "fast"}));
        assert!(err.is_err());
        let err = serde_json::from_value::<ParamValue>(json!({"t": "voltage", "v": 1.0}));
        assert!(err.is_err());
    }

    #[test]
    fn only_mappings_are_non_scalar() {
        assert!(ParamValue::Int(1).is_scalar());
        assert!(ParamValue::Float(1.0).is_scalar());
        assert!(ParamValue::Bool(true).is_scalar());
        assert!(ParamValue::Text("x".into()).is_scalar());
        assert!(!ParamValue::Map(ParamMap::new()).is_scalar());
    }

    #[test]
    fn from_impls_pick_the_matching_variant() {
        assert_eq!(ParamValue::from(5), ParamValue::Int(5));
        assert_eq!(ParamValue::from(15.0), ParamValue::Float(15.0));
        assert_eq!(ParamValue::from(true), ParamValue::Bool(true));
        assert_eq!(ParamValue::from("spike_recorder"), ParamValue::Text("spike_recorder".into()));
    }

    #[test]
    fn to_json_renders_plain_values() {
        let defaults = map(&[
            ("C_m", ParamValue::Float(250.0)),
            ("label", ParamValue::Text(String::new())),
            ("n_events", ParamValue::Int(0)),
            ("time_in_steps", ParamValue::Bool(false)),
            (
                "events",
                ParamValue::Map(map(&[("senders", ParamValue::Int(0))])),
            ),
        ]);
        let rendered: serde_json::Value = serde_json::from_str(&to_json(&defaults)).unwrap();
        assert_eq!(
            rendered,
            json!({
                "C_m": 250.0,
                "label": "",
                "n_events": 0,
                "time_in_steps": false,
                "events": {"senders": 0}
            })
        );
    }

    #[test]
    fn to_json_keeps_integers_integral() {
        let defaults = map(&[("n_events", ParamValue::Int(12))]);
        assert_eq!(to_json(&defaults), r#"{"n_events":12}"#);
        let defaults = map(&[("interval", ParamValue::Float(1.0))]);
        assert_eq!(to_json(&defaults), r#"{"interval":1.0}"#);
    }

    #[test]
    fn display_uses_the_plain_rendering() {
        let value = ParamValue::Map(map(&[("delay", ParamValue::Float(1.5))]));
        assert_eq!(value.to_string(), r#"{"delay":1.5}"#);
    }
}
