//! Person schema validation.
//!
//! Validation is synchronous and total: every call returns either a fully
//! typed value or a non-empty, ordered list of field errors. Errors are
//! listed in schema order (`name`, `language`, `bio`, `version`), followed by
//! any keys the schema does not know.

use std::fmt;

use serde_json::{Map, Value};

use crate::person::{Language, PersonDraft, PersonField, PersonPatch};

/// Field path reported when the candidate itself is not an object.
pub const ROOT_FIELD: &str = "(root)";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON key of the offending field
    pub field: String,
    /// Message suitable for inline display
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A non-empty list of field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Wraps a list of errors; callers never pass an empty list.
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    /// All errors, in report order.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first message reported for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates a complete person candidate, as submitted by the add dialog.
///
/// # Errors
///
/// Returns every rule the candidate breaks.
pub fn validate(candidate: &Value) -> Result<PersonDraft, ValidationErrors> {
    let object = as_object(candidate)?;
    let mut errors = Vec::new();

    let name = collect(&mut errors, PersonField::Name, check_name(object.get("name")));
    let language = collect(
        &mut errors,
        PersonField::Language,
        check_language(object.get("language")),
    );
    let bio = collect(&mut errors, PersonField::Bio, check_bio(object.get("bio")));
    let version = collect(
        &mut errors,
        PersonField::Version,
        check_version(object.get("version")),
    );

    match (name, language, bio, version) {
        (Some(name), Some(language), Some(bio), Some(version)) if errors.is_empty() => {
            Ok(PersonDraft {
                name,
                language,
                bio,
                version,
            })
        }
        _ => Err(ValidationErrors::new(errors)),
    }
}

/// Validates only the keys present in `candidate`, as submitted by an
/// inline cell editor.
///
/// An empty object yields an empty patch.
///
/// # Errors
///
/// Returns an error for each present field that breaks its rule, for `id`
/// (never editable), and for keys outside the schema.
pub fn validate_partial(candidate: &Value) -> Result<PersonPatch, ValidationErrors> {
    let object = as_object(candidate)?;
    let mut errors = Vec::new();
    let mut patch = PersonPatch::default();

    for field in PersonField::ALL {
        let Some(value) = object.get(field.as_str()) else {
            continue;
        };
        match field {
            PersonField::Id => errors.push(FieldError::new(field.as_str(), "Field is not editable")),
            PersonField::Name => patch.name = collect(&mut errors, field, check_name(Some(value))),
            PersonField::Language => {
                patch.language = collect(&mut errors, field, check_language(Some(value)));
            }
            PersonField::Bio => {
                patch.bio = collect(&mut errors, field, check_bio_edit(value));
            }
            PersonField::Version => {
                patch.version = collect(&mut errors, field, check_version(Some(value)));
            }
        }
    }

    for key in object.keys() {
        if PersonField::parse(key).is_none() {
            errors.push(FieldError::new(key.as_str(), format!("Unrecognized key '{key}'")));
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationErrors::new(errors))
    }
}

fn as_object(candidate: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    candidate.as_object().ok_or_else(|| {
        ValidationErrors::new(vec![FieldError::new(
            ROOT_FIELD,
            format!("Expected object, received {}", type_name(candidate)),
        )])
    })
}

fn collect<T>(
    errors: &mut Vec<FieldError>,
    field: PersonField,
    result: Result<T, String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(FieldError::new(field.as_str(), message));
            None
        }
    }
}

fn check_name(value: Option<&Value>) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Err("Required".to_string()),
        Some(Value::String(s)) if s.is_empty() => Err("Name is required".to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("Expected string, received {}", type_name(other))),
    }
}

fn check_language(value: Option<&Value>) -> Result<Language, String> {
    let expected = Language::ALL
        .iter()
        .map(|l| format!("'{}'", l.as_str()))
        .collect::<Vec<_>>()
        .join(" | ");
    match value {
        None | Some(Value::Null) => Err("Required".to_string()),
        Some(Value::String(s)) => Language::parse(s)
            .ok_or_else(|| format!("Invalid enum value. Expected {expected}, received '{s}'")),
        Some(other) => Err(format!(
            "Invalid enum value. Expected {expected}, received {}",
            type_name(other)
        )),
    }
}

fn check_bio(value: Option<&Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("Expected string, received {}", type_name(other))),
    }
}

/// An edit replaces the bio, so it must carry a string; `""` clears it.
fn check_bio_edit(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(format!("Expected string, received {}", type_name(other))),
    }
}

fn check_version(value: Option<&Value>) -> Result<f64, String> {
    match value {
        None | Some(Value::Null) => Err("Required".to_string()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() && v >= 1.0 => Ok(v),
            Some(v) if v.is_finite() => Err("Version must be >= 1".to_string()),
            _ => Err("Expected number, received nan".to_string()),
        },
        Some(other) => Err(format!("Expected number, received {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_person() {
        let draft = validate(&json!({
            "name": "Ayesha",
            "language": "Sindhi",
            "bio": "Poet",
            "version": 2
        }))
        .unwrap();
        assert_eq!(draft.name, "Ayesha");
        assert_eq!(draft.language, Language::Sindhi);
        assert_eq!(draft.bio.as_deref(), Some("Poet"));
        assert!((draft.version - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bio_optional() {
        let draft = validate(&json!({"name": "A", "language": "English", "version": 1})).unwrap();
        assert_eq!(draft.bio, None);
        let draft =
            validate(&json!({"name": "A", "language": "English", "bio": null, "version": 1}))
                .unwrap();
        assert_eq!(draft.bio, None);
    }

    #[test]
    fn test_empty_name_rejected() {
        let errors = validate(&json!({"name": "", "language": "English", "version": 1}))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.message_for("name"), Some("Name is required"));
    }

    #[test]
    fn test_language_must_be_enumerated() {
        let errors = validate(&json!({"name": "A", "language": "Uyghur", "version": 1}))
            .unwrap_err();
        let msg = errors.message_for("language").unwrap();
        assert!(msg.contains("'English' | 'Sindhi' | 'Vietnamese'"));
        assert!(msg.contains("Uyghur"));
    }

    #[test]
    fn test_version_below_one() {
        let errors = validate(&json!({"name": "A", "language": "English", "version": 0}))
            .unwrap_err();
        assert_eq!(errors.message_for("version"), Some("Version must be >= 1"));
    }

    #[test]
    fn test_version_not_a_number() {
        let errors = validate(&json!({"name": "A", "language": "English", "version": "3"}))
            .unwrap_err();
        assert_eq!(
            errors.message_for("version"),
            Some("Expected number, received string")
        );
    }

    #[test]
    fn test_errors_in_schema_order() {
        let errors = validate(&json!({"name": "", "language": 4, "bio": 7})).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "language", "bio", "version"]);
    }

    #[test]
    fn test_non_object_rejected() {
        let errors = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, ROOT_FIELD);
        assert!(errors.to_string().contains("received array"));
    }

    #[test]
    fn test_partial_only_checks_present_keys() {
        let patch = validate_partial(&json!({"version": 4})).unwrap();
        assert_eq!(patch.version, Some(4.0));
        assert_eq!(patch.name, None);
    }

    #[test]
    fn test_partial_rejects_bad_value() {
        let errors = validate_partial(&json!({"version": 0})).unwrap_err();
        assert_eq!(errors.message_for("version"), Some("Version must be >= 1"));
    }

    #[test]
    fn test_partial_rejects_id_and_unknown() {
        let errors = validate_partial(&json!({"id": "x", "colour": "red"})).unwrap_err();
        assert_eq!(errors.message_for("id"), Some("Field is not editable"));
        assert!(errors.message_for("colour").is_some());
    }

    #[test]
    fn test_partial_bio_null_rejected() {
        let errors = validate_partial(&json!({"bio": null})).unwrap_err();
        assert_eq!(
            errors.message_for("bio"),
            Some("Expected string, received null")
        );
    }

    #[test]
    fn test_partial_bio_empty_string_clears() {
        let patch = validate_partial(&json!({"bio": ""})).unwrap();
        assert_eq!(patch.bio.as_deref(), Some(""));
    }

    #[test]
    fn test_partial_empty_object() {
        let patch = validate_partial(&json!({})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_rejections_always_carry_errors() {
        for candidate in [json!(null), json!({}), json!({"name": 1}), json!({"bio": null})] {
            assert!(!validate(&candidate).unwrap_err().is_empty());
        }
        for candidate in [json!("x"), json!({"id": "1"}), json!({"bio": 2})] {
            assert!(!validate_partial(&candidate).unwrap_err().is_empty());
        }
    }

    #[test]
    fn test_display_joins_errors() {
        let errors = ValidationErrors::new(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("version", "Version must be >= 1"),
        ]);
        assert_eq!(
            errors.to_string(),
            "name: Name is required; version: Version must be >= 1"
        );
    }
}
