//! Record schema model
//!
//! A schema is the ordered field list of a top-level Avro record. Everything
//! about a field other than its name (type, default, doc, aliases, order,
//! custom attributes) is kept as opaque JSON and passed through unchanged.

use std::collections::HashSet;
use std::sync::Once;

use apache_avro::validator::{set_record_field_name_validator, RecordFieldNameValidator};
use apache_avro::{AvroResult, Schema as AvroSchema};
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};

/// Accepts any record field name.
///
/// Legacy files carry names such as `Type 1` or `Sp.Atk`, which the default
/// Avro name grammar rejects. They must be readable before they can be fixed.
struct LenientFieldNames;

impl RecordFieldNameValidator for LenientFieldNames {
    fn validate(&self, _name: &str) -> AvroResult<()> {
        Ok(())
    }
}

static LENIENT_FIELD_NAMES: Once = Once::new();

/// Installs the lenient field name validator for the whole process.
///
/// Safe to call repeatedly; only the first call has an effect.
pub fn allow_legacy_field_names() {
    LENIENT_FIELD_NAMES.call_once(|| {
        // Err means a validator was already installed elsewhere.
        let _ = set_record_field_name_validator(Box::new(LenientFieldNames));
    });
}

/// One field of a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its schema
    pub name: String,
    /// Every other attribute of the field, verbatim
    pub attributes: Map<String, Value>,
}

impl FieldDescriptor {
    /// Create a descriptor from a name and its remaining attributes.
    pub fn new(name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Create a descriptor carrying only a type specification.
    pub fn with_type(name: impl Into<String>, type_spec: Value) -> Self {
        let mut attributes = Map::new();
        attributes.insert("type".into(), type_spec);
        Self::new(name, attributes)
    }

    /// Returns the type specification, if declared
    pub fn type_spec(&self) -> Option<&Value> {
        self.attributes.get("type")
    }

    /// Same descriptor under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.attributes.clone())
    }

    fn from_json(value: &Value) -> SchemaResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SchemaError::malformed("field descriptor is not a JSON object"))?;

        let name = match object.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(Value::String(_)) => return Err(SchemaError::malformed("field name is empty")),
            _ => return Err(SchemaError::malformed("field descriptor has no string 'name'")),
        };

        let attributes = object
            .iter()
            .filter(|(key, _)| key.as_str() != "name")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self::new(name, attributes))
    }

    fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".into(), Value::String(self.name.clone()));
        for (key, value) in &self.attributes {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Schema of a top-level Avro record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Record-level attributes (type, name, namespace, doc, ...)
    pub attributes: Map<String, Value>,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    /// Create a record schema with the given record name.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let mut attributes = Map::new();
        attributes.insert("type".into(), Value::String("record".into()));
        attributes.insert("name".into(), Value::String(name.into()));
        Self { attributes, fields }
    }

    /// Returns the record name, if declared
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Same record-level attributes with a new field list.
    pub fn with_fields(&self, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            attributes: self.attributes.clone(),
            fields,
        }
    }

    /// Rejects schemas that declare a field name twice.
    pub fn ensure_unique_names(&self) -> SchemaResult<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::duplicate_field(&field.name));
            }
        }
        Ok(())
    }

    /// Interprets the JSON form of an Avro record schema.
    pub fn from_json(value: &Value) -> SchemaResult<Self> {
        let object = match value {
            Value::Object(object) => object,
            Value::String(primitive) => return Err(SchemaError::unsupported(primitive.clone())),
            Value::Array(_) => return Err(SchemaError::unsupported("union")),
            other => return Err(SchemaError::malformed(format!("unexpected schema JSON: {}", other))),
        };

        match object.get("type").and_then(Value::as_str) {
            Some("record") => {}
            Some(kind) => return Err(SchemaError::unsupported(kind)),
            None => return Err(SchemaError::malformed("schema has no 'type'")),
        }

        let fields = object
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::malformed("record schema has no 'fields' array"))?
            .iter()
            .map(FieldDescriptor::from_json)
            .collect::<SchemaResult<Vec<_>>>()?;

        let attributes = object
            .iter()
            .filter(|(key, _)| key.as_str() != "fields")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let schema = Self { attributes, fields };
        schema.ensure_unique_names()?;
        Ok(schema)
    }

    /// JSON form of this schema, fields in declaration order.
    pub fn to_json(&self) -> Value {
        let mut object = self.attributes.clone();
        object.insert(
            "fields".into(),
            Value::Array(self.fields.iter().map(FieldDescriptor::to_json).collect()),
        );
        Value::Object(object)
    }

    /// Converts a parsed Avro writer schema.
    pub fn from_avro(schema: &AvroSchema) -> SchemaResult<Self> {
        let json = serde_json::to_value(schema)
            .map_err(|e| SchemaError::malformed(format!("cannot serialize writer schema: {}", e)))?;
        Self::from_json(&json)
    }

    /// Parses this schema into an Avro schema usable by the container writer.
    pub fn to_avro(&self) -> SchemaResult<AvroSchema> {
        allow_legacy_field_names();
        AvroSchema::parse(&self.to_json())
            .map_err(|e| SchemaError::malformed(format!("schema rejected by Avro parser: {}", e)))
    }
}
