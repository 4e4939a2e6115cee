//! Parsing of the comma-separated expertise list typed after `/set_expertise`.
//!
//! Fields are the raw substrings between commas. They are never trimmed, so
//! `"rust, go"` is stored as `["rust", " go"]` and re-joins to the same text.
//! A field may only contain ASCII letters, hyphens and spaces, and must not be
//! blank. One bad field rejects the whole request.

use thiserror::Error;

pub const FIELD_SEPARATOR: char = ',';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpertiseFields(Vec<String>);

impl ExpertiseFields {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("no expertise fields were provided")]
    Empty,
    #[error("expertise field #{position} is blank")]
    BlankField { position: usize },
    #[error("expertise field `{field}` contains unsupported character `{character}`")]
    UnsupportedCharacter { field: String, character: char },
}

pub fn parse_expertise_fields(raw: &str) -> Result<ExpertiseFields, FieldValidationError> {
    let fields: Vec<String> = raw.split(FIELD_SEPARATOR).map(str::to_owned).collect();
    if fields.is_empty() {
        return Err(FieldValidationError::Empty);
    }

    for (index, field) in fields.iter().enumerate() {
        validate_field(field, index + 1)?;
    }

    Ok(ExpertiseFields(fields))
}

fn validate_field(field: &str, position: usize) -> Result<(), FieldValidationError> {
    if let Some(character) = field.chars().find(|ch| !is_allowed_character(*ch)) {
        return Err(FieldValidationError::UnsupportedCharacter {
            field: field.to_owned(),
            character,
        });
    }

    if field.chars().all(|ch| ch == ' ') {
        return Err(FieldValidationError::BlankField { position });
    }

    Ok(())
}

fn is_allowed_character(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '-' || ch == ' '
}
