//! Records and the record store.
//!
//! This module handles:
//! - The `(id, fields)` record shape and typed field values
//! - The ordered [`RecordStore`] and its JSON export
//! - Cooperative synthetic generation ([`GenerationJob`])
//! - Parsing edited field text back into typed values

mod edit;
mod generator;
mod store;
mod types;

pub use edit::{EditError, TypeTag, parse_edit};
pub use generator::{DEFAULT_BATCH_SIZE, FieldKind, GenerationJob, GenerationSettings};
pub use store::{ExportError, RecordStore};
pub use types::{Field, FieldValue, Record, RecordId};
