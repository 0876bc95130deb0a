//! Invocation payload parsing and validation.
//!
//! The workflow engine hands each handler a JSON document. Payloads are
//! checked against an embedded JSON Schema, then deserialized.

mod parser;
mod schema;

pub use parser::{
    DataSection, InitialiseEvent, ModelPrefixSection, PayloadError, Threshold, TrainingSection,
    ValidationEvent, ValidationSection,
};
pub use schema::{validate_payload_schema, PayloadSchema, SchemaError};
