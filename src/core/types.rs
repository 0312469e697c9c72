use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as JsonValue};

/// Identifier of a record inside its collection.
pub type RecordId = String;

/// An application value that can live inside a collection.
///
/// The store only needs to read and assign the identifier; everything else
/// about the record is opaque and travels through serde.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: RecordId);

    /// Identifier if present and non-empty.
    fn record_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }
}

/// Schemaless record backed by a JSON object.
///
/// The identifier lives under the `"id"` key; a missing key, an empty string
/// or a non-string value all count as "no identifier".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, JsonValue>,
}

impl Document {
    pub const ID_FIELD: &'static str = "id";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    /// Builds a document from any JSON value; non-objects yield `None`.
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.fields)
    }
}

impl Record for Document {
    fn id(&self) -> Option<&str> {
        self.fields.get(Self::ID_FIELD).and_then(JsonValue::as_str)
    }

    fn set_id(&mut self, id: RecordId) {
        self.fields
            .insert(Self::ID_FIELD.to_string(), JsonValue::String(id));
    }
}
