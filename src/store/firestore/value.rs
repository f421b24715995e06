//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type, e.g. `{"stringValue": "Tahoe"}` or `{"integerValue": "250000"}`.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

use crate::models::Fields;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings.
    IntegerValue(String),
    /// A number, or one of the strings `"NaN"`, `"Infinity"`, `"-Infinity"`.
    DoubleValue(Value),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FirestoreValue>,
}

/// A document as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// `projects/{p}/databases/{d}/documents/{collection}/{id}`
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl Document {
    /// Last path segment of the document name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn into_fields(self) -> Result<Fields, StoreError> {
        decode_fields(self.fields)
    }
}

/// One page of `documents.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Body of `documents.createDocument`.
#[derive(Debug, Serialize)]
pub struct WriteDocument {
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl From<&Value> for FirestoreValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FirestoreValue::NullValue(()),
            Value::Bool(b) => FirestoreValue::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FirestoreValue::IntegerValue(i.to_string()),
                None => FirestoreValue::DoubleValue(Value::Number(n.clone())),
            },
            Value::String(s) => FirestoreValue::StringValue(s.clone()),
            Value::Array(items) => FirestoreValue::ArrayValue(ArrayValue {
                values: items.iter().map(FirestoreValue::from).collect(),
            }),
            Value::Object(map) => FirestoreValue::MapValue(MapValue {
                fields: encode_fields(map),
            }),
        }
    }
}

impl FirestoreValue {
    /// Plain JSON for this value.
    ///
    /// Timestamps, bytes and references come back as their string form;
    /// non-finite doubles become `null`.
    pub fn into_json(self) -> Result<Value, StoreError> {
        Ok(match self {
            FirestoreValue::NullValue(()) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            FirestoreValue::IntegerValue(s) => {
                let i: i64 = s
                    .parse()
                    .map_err(|_| StoreError::Decode(format!("invalid integerValue {:?}", s)))?;
                Value::from(i)
            }
            FirestoreValue::DoubleValue(v) => match v {
                Value::Number(n) => Value::Number(n),
                // "NaN" / "Infinity" have no JSON form
                _ => Value::Null,
            },
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(p) => {
                let mut map = serde_json::Map::new();
                map.insert("latitude".to_string(), float(p.latitude));
                map.insert("longitude".to_string(), float(p.longitude));
                Value::Object(map)
            }
            FirestoreValue::ArrayValue(a) => Value::Array(
                a.values
                    .into_iter()
                    .map(FirestoreValue::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            FirestoreValue::MapValue(m) => Value::Object(decode_fields(m.fields)?),
        })
    }
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

pub fn encode_fields(fields: &Fields) -> BTreeMap<String, FirestoreValue> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), FirestoreValue::from(v)))
        .collect()
}

pub fn decode_fields(fields: BTreeMap<String, FirestoreValue>) -> Result<Fields, StoreError> {
    fields
        .into_iter()
        .map(|(k, v)| v.into_json().map(|v| (k, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encodes_listing_document() {
        let doc = json!({
            "name": "Lakeview Cottage",
            "price": 250000,
            "ratio": 0.5,
            "sold": false,
            "tags": ["lake"],
            "owner": null,
            "address": { "city": "Tahoe" }
        });
        let Value::Object(fields) = doc else { unreachable!() };

        let encoded = serde_json::to_value(WriteDocument {
            fields: encode_fields(&fields),
        })
        .unwrap();

        assert_eq!(
            encoded,
            json!({
                "fields": {
                    "name": { "stringValue": "Lakeview Cottage" },
                    "price": { "integerValue": "250000" },
                    "ratio": { "doubleValue": 0.5 },
                    "sold": { "booleanValue": false },
                    "tags": { "arrayValue": { "values": [{ "stringValue": "lake" }] } },
                    "owner": { "nullValue": null },
                    "address": { "mapValue": { "fields": { "city": { "stringValue": "Tahoe" } } } }
                }
            })
        );
    }

    #[test]
    fn test_decodes_document_from_rest_response() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/properties/abc123",
            "fields": {
                "price": { "integerValue": "250000" },
                "listed": { "timestampValue": "2024-01-01T00:00:00Z" },
                "spot": { "geoPointValue": { "latitude": 39.1, "longitude": -120.0 } },
                "empty": { "arrayValue": {} },
                "nested": { "mapValue": {} },
                "weird": { "doubleValue": "NaN" }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(doc.id(), "abc123");
        let fields = doc.into_fields().unwrap();
        assert_eq!(fields["price"], json!(250000));
        assert_eq!(fields["listed"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(fields["spot"], json!({ "latitude": 39.1, "longitude": -120.0 }));
        assert_eq!(fields["empty"], json!([]));
        assert_eq!(fields["nested"], json!({}));
        assert_eq!(fields["weird"], Value::Null);
    }

    #[test]
    fn test_bad_integer_is_decode_error() {
        let value = FirestoreValue::IntegerValue("twelve".to_string());
        assert!(matches!(value.into_json(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_unknown_value_kind_is_rejected() {
        let result: Result<FirestoreValue, _> =
            serde_json::from_value(json!({ "vectorValue": [1, 2] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_large_unsigned_becomes_double() {
        let value = FirestoreValue::from(&json!(u64::MAX));
        assert!(matches!(value, FirestoreValue::DoubleValue(_)));
    }
}
