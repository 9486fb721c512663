//! Field-level edit writeback.
//!
//! Raw text from an input control is parsed according to the control's
//! [`TypeTag`] before it is written into the record.

use std::fmt;

use chrono::NaiveDate;

use super::types::{FieldValue, RecordId};

/// Type tag carried by every rendered input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Number,
    Boolean,
    Date,
    Text,
    Email,
}

impl TypeTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Text => "text",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("record {0} does not exist")]
    UnknownRecord(RecordId),
    #[error("record {record} has no field `{field}`")]
    UnknownField { record: RecordId, field: String },
    #[error("no input #{0} on screen")]
    UnknownBinding(usize),
    #[error("field `{0}` is read-only")]
    ReadOnly(String),
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
    #[error("`{0}` is not true or false")]
    InvalidBoolean(String),
    #[error("`{0}` is not a YYYY-MM-DD date")]
    InvalidDate(String),
}

/// Parse raw input text for a field of the given type.
///
/// # Errors
///
/// Returns an error when the text cannot be read as the tagged type.
pub fn parse_edit(tag: TypeTag, raw: &str) -> Result<FieldValue, EditError> {
    match tag {
        TypeTag::Number => {
            let trimmed = raw.trim();
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(FieldValue::Number)
                .ok_or_else(|| EditError::InvalidNumber(raw.to_string()))
        }
        TypeTag::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ => Err(EditError::InvalidBoolean(raw.to_string())),
        },
        TypeTag::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(FieldValue::Date)
            .map_err(|_| EditError::InvalidDate(raw.to_string())),
        TypeTag::Text | TypeTag::Email => Ok(FieldValue::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_edit(TypeTag::Number, " 42 "), Ok(FieldValue::Number(42.0)));
        assert_eq!(parse_edit(TypeTag::Number, "2.5"), Ok(FieldValue::Number(2.5)));
        assert!(matches!(
            parse_edit(TypeTag::Number, "forty"),
            Err(EditError::InvalidNumber(_))
        ));
        assert!(parse_edit(TypeTag::Number, "NaN").is_err());
        assert!(parse_edit(TypeTag::Number, "").is_err());
    }

    #[test]
    fn test_parse_boolean_is_case_insensitive() {
        assert_eq!(parse_edit(TypeTag::Boolean, "TRUE"), Ok(FieldValue::Bool(true)));
        assert_eq!(parse_edit(TypeTag::Boolean, "false"), Ok(FieldValue::Bool(false)));
        assert!(parse_edit(TypeTag::Boolean, "yes").is_err());
    }

    #[test]
    fn test_parse_date_rejects_impossible_days() {
        assert_eq!(
            parse_edit(TypeTag::Date, "2024-02-29"),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert!(matches!(
            parse_edit(TypeTag::Date, "2023-02-29"),
            Err(EditError::InvalidDate(_))
        ));
        assert!(parse_edit(TypeTag::Date, "03/09/2021").is_err());
    }

    #[test]
    fn test_text_and_email_keep_raw_input() {
        assert_eq!(
            parse_edit(TypeTag::Email, "x@y.io"),
            Ok(FieldValue::Text("x@y.io".into()))
        );
        assert_eq!(parse_edit(TypeTag::Text, ""), Ok(FieldValue::Text(String::new())));
    }
}
