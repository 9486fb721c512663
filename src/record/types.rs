use std::fmt;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

/// Opaque, stable identifier of a record.
///
/// The id is structural: it is never part of a record's visible field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Build an id from 16 random bytes, stamping the v4 layout bits.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, enough to tell cards apart on screen.
    pub fn short(&self) -> String {
        let mut text = self.0.simple().to_string();
        text.truncate(8);
        text
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Lower-cased string form used by value-term matching.
    pub fn search_text(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => match whole_number(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => match whole_number(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

// Integral values print without a trailing ".0".
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_number(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

/// One named field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

/// A record: an id plus fields in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: Vec<Field>,
}

impl Record {
    pub const fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: Vec::new(),
        }
    }

    pub const fn id(&self) -> RecordId {
        self.id
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of visible fields (the id is not counted).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Set a field, replacing the value in place when the name exists and
    /// appending otherwise.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    /// Replace an existing field's value. Returns false when absent.
    pub fn replace_field(&mut self, name: &str, value: FieldValue) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(42.0).to_string(), "42");
        assert_eq!(FieldValue::Number(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Number(-3.0).to_string(), "-3");
    }

    #[test]
    fn test_search_text_is_lowercase() {
        assert_eq!(FieldValue::Text("Person 7".into()).search_text(), "person 7");
        assert_eq!(FieldValue::Bool(true).search_text(), "true");
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        assert_eq!(FieldValue::Date(date).search_text(), "2021-03-09");
    }

    #[test]
    fn test_set_field_preserves_order_and_replaces() {
        let mut record = Record::new(RecordId::from_random_bytes([7; 16]));
        record.set_field("name", FieldValue::Text("a".into()));
        record.set_field("age", FieldValue::Number(30.0));
        record.set_field("name", FieldValue::Text("b".into()));
        let names: Vec<_> = record.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["name", "age"]);
        assert_eq!(record.field("name"), Some(&FieldValue::Text("b".into())));
    }

    #[test]
    fn test_replace_field_rejects_unknown_name() {
        let mut record = Record::new(RecordId::from_random_bytes([1; 16]));
        assert!(!record.replace_field("missing", FieldValue::Bool(true)));
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_serializes_fields_in_order() {
        let mut record = Record::new(RecordId::from_random_bytes([2; 16]));
        record.set_field("zeta", FieldValue::Number(3.0));
        record.set_field("alpha", FieldValue::Bool(false));
        record.set_field(
            "joined",
            FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"zeta":3,"alpha":false,"joined":"2020-01-02"}"#);
    }

    #[test]
    fn test_random_ids_carry_v4_layout() {
        let id = RecordId::from_random_bytes([0xff; 16]);
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.short().len(), 8);
    }
}
