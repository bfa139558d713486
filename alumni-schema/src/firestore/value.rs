use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A Firestore field value as it appears on the REST wire.
///
/// Kinds this crate does not model are kept verbatim in `Unknown` so one odd field never
/// fails the page it arrived in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FirestoreValue {
    Typed(TypedValue),
    Unknown(Value),
}

/// A value kind known to this crate, e.g. `{"stringValue": "Acme"}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    NullValue(()),
    BooleanValue(bool),
    /// int64 values are transported as decimal strings.
    IntegerValue(String),
    DoubleValue(WireDouble),
    /// RFC3339 timestamp.
    TimestampValue(String),
    StringValue(String),
    /// Base64-encoded bytes.
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// proto3 JSON sends finite doubles as numbers and `NaN`/`Infinity`/`-Infinity` as strings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum WireDouble {
    Number(f64),
    Text(String),
}

impl WireDouble {
    fn into_json(self) -> Value {
        let f = match self {
            Self::Number(f) => f,
            Self::Text(raw) => raw.parse::<f64>().unwrap_or(f64::NAN),
        };
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl FirestoreValue {
    /// Flattens the wire value into plain JSON.
    ///
    /// Integers that fit in `i64` become JSON numbers and everything string-shaped on the wire
    /// (timestamps, bytes, references) stays a JSON string. Non-finite doubles and unknown
    /// kinds become `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Typed(typed) => typed.into_json(),
            Self::Unknown(_) => Value::Null,
        }
    }
}

impl TypedValue {
    fn into_json(self) -> Value {
        match self {
            Self::NullValue(()) => Value::Null,
            Self::BooleanValue(b) => Value::Bool(b),
            Self::IntegerValue(raw) => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(raw)),
            Self::DoubleValue(d) => d.into_json(),
            Self::TimestampValue(s)
            | Self::StringValue(s)
            | Self::BytesValue(s)
            | Self::ReferenceValue(s) => Value::String(s),
            Self::GeoPointValue(p) => {
                let mut obj = Map::new();
                obj.insert("latitude".to_string(), Value::from(p.latitude));
                obj.insert("longitude".to_string(), Value::from(p.longitude));
                Value::Object(obj)
            }
            Self::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FirestoreValue::into_json).collect())
            }
            Self::MapValue(m) => Value::Object(fields_into_json(m.fields)),
        }
    }
}

pub(crate) fn fields_into_json(fields: BTreeMap<String, FirestoreValue>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name, value.into_json()))
        .collect()
}
