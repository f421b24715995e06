use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A listing document as stored: an open map of caller-supplied fields.
pub type Fields = serde_json::Map<String, Value>;

/// Fields that must be present and truthy for a listing to be created.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "price", "location"];

/// Prefix of the generated image URL used when a listing has no image.
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x400/cccccc/333?text=";

/// A stored listing: the store-assigned `id` plus the document's fields.
///
/// Serializes as one flat object, e.g.
/// `{"id":"abc","name":"Lakeview Cottage","price":250000,...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Listing {
    /// Builds a listing from a stored document.
    ///
    /// Any `id` key inside the document is dropped so it can never shadow the
    /// store-assigned identifier.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Creation input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    fields: Fields,
}

/// The required fields a creation request lacked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct MissingFields {
    pub missing: Vec<&'static str>,
}

impl NewListing {
    /// Validates a request body.
    ///
    /// Anything other than a JSON object is treated as missing every required field.
    pub fn from_body(body: Value) -> Result<Self, MissingFields> {
        let Value::Object(fields) = body else {
            return Err(MissingFields {
                missing: REQUIRED_FIELDS.to_vec(),
            });
        };

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| !fields.get(*key).is_some_and(is_truthy))
            .collect();

        if !missing.is_empty() {
            return Err(MissingFields { missing });
        }

        Ok(Self { fields })
    }

    /// Produces the document to insert, with `image` defaulted when absent or falsy.
    pub fn into_document(self) -> Fields {
        let mut fields = self.fields;
        fields.remove("id");

        let has_image = fields.get("image").is_some_and(is_truthy);
        if !has_image {
            let image = fields
                .get("name")
                .map(placeholder_image)
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_BASE.to_string());
            fields.insert("image".to_string(), Value::String(image));
        }

        fields
    }
}

/// Truthiness of a loosely-typed field value.
///
/// `null`, `false`, zero and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Placeholder image URL derived from a listing name.
pub fn placeholder_image(name: &Value) -> String {
    let text = match name {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{}{}", PLACEHOLDER_IMAGE_BASE, text.replace(' ', "+"))
}

/// OpenAPI shape of a stored listing. Extra fields are passed through as-is.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingSchema {
    /// Store-assigned identifier.
    pub id: String,
    pub name: String,
    #[schema(value_type = Object)]
    pub price: Value,
    pub location: String,
    pub image: String,
}

/// OpenAPI shape of a creation request.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewListingSchema {
    pub name: String,
    #[schema(value_type = Object)]
    pub price: Value,
    pub location: String,
    /// Defaults to a placeholder when omitted.
    pub image: Option<String>,
}

/// `{"error": "..."}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"message": "..."}`
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_placeholder_replaces_every_space() {
        assert_eq!(
            placeholder_image(&json!("Lakeview Cottage")),
            "https://placehold.co/600x400/cccccc/333?text=Lakeview+Cottage"
        );
        assert_eq!(
            placeholder_image(&json!("A  B C")),
            "https://placehold.co/600x400/cccccc/333?text=A++B+C"
        );
    }

    #[test]
    fn test_placeholder_for_non_string_name() {
        assert_eq!(
            placeholder_image(&json!(42)),
            "https://placehold.co/600x400/cccccc/333?text=42"
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_valid_body_gets_placeholder_image() {
        let listing = NewListing::from_body(json!({
            "name": "Lakeview Cottage",
            "price": 250000,
            "location": "Tahoe",
            "bedrooms": 3
        }))
        .unwrap();

        let doc = listing.into_document();
        assert_eq!(
            doc["image"],
            json!("https://placehold.co/600x400/cccccc/333?text=Lakeview+Cottage")
        );
        assert_eq!(doc["bedrooms"], json!(3));
        assert_eq!(doc["price"], json!(250000));
    }

    #[test]
    fn test_caller_image_is_kept() {
        let doc = NewListing::from_body(json!({
            "name": "Loft",
            "price": "1.2M",
            "location": "NYC",
            "image": "https://img.example/loft.png"
        }))
        .unwrap()
        .into_document();

        assert_eq!(doc["image"], json!("https://img.example/loft.png"));
    }

    #[test]
    fn test_empty_image_is_replaced() {
        let doc = NewListing::from_body(json!({
            "name": "Loft",
            "price": 1,
            "location": "NYC",
            "image": ""
        }))
        .unwrap()
        .into_document();

        assert_eq!(
            doc["image"],
            json!("https://placehold.co/600x400/cccccc/333?text=Loft")
        );
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let err = NewListing::from_body(json!({ "name": "X" })).unwrap_err();
        assert_eq!(err.missing, vec!["price", "location"]);
        assert_eq!(err.to_string(), "missing required fields: price, location");

        let err = NewListing::from_body(json!({
            "name": "",
            "price": 0,
            "location": "Tahoe"
        }))
        .unwrap_err();
        assert_eq!(err.missing, vec!["name", "price"]);
    }

    #[test]
    fn test_non_object_body_misses_everything() {
        let err = NewListing::from_body(json!(["name", "price"])).unwrap_err();
        assert_eq!(err.missing, REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn test_caller_id_is_dropped() {
        let doc = NewListing::from_body(json!({
            "id": "forged",
            "name": "A",
            "price": 1,
            "location": "B"
        }))
        .unwrap()
        .into_document();

        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn test_listing_serializes_flat() {
        let listing = Listing::new(
            "abc",
            fields(json!({ "id": "shadow", "name": "A", "price": 1 })),
        );
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value, json!({ "id": "abc", "name": "A", "price": 1 }));
    }
}
