//! The `Person` record shown in each table row, plus its partial forms.
//!
//! Rows that come from the remote dataset are kept as delivered: `language`
//! is free text and `version` may be fractional. Only input entered through
//! [`crate::validate`] is restricted to the [`Language`] enumeration and
//! `version >= 1`.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Languages accepted when creating or editing a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Sindhi
    Sindhi,
    /// Vietnamese
    Vietnamese,
}

impl Language {
    /// All accepted languages, in display order.
    pub const ALL: [Self; 3] = [Self::English, Self::Sindhi, Self::Vietnamese];

    /// Returns the canonical label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Sindhi => "Sindhi",
            Self::Vietnamese => "Vietnamese",
        }
    }

    /// Parses an exact, case-sensitive label.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the person table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonField {
    /// Row identity
    Id,
    /// Display name
    Name,
    /// Spoken language
    Language,
    /// Free-text biography
    Bio,
    /// Record version
    Version,
}

impl PersonField {
    /// All fields in schema order.
    pub const ALL: [Self; 5] = [
        Self::Id,
        Self::Name,
        Self::Language,
        Self::Bio,
        Self::Version,
    ];

    /// Fields a user may edit; `id` is fixed once assigned.
    pub const EDITABLE: [Self; 4] = [Self::Name, Self::Language, Self::Bio, Self::Version];

    /// Returns the JSON key of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Language => "language",
            Self::Bio => "bio",
            Self::Version => "version",
        }
    }

    /// Parses a JSON key.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == key)
    }

    /// Returns true if this field may be changed by an edit.
    pub fn is_editable(self) -> bool {
        !matches!(self, Self::Id)
    }
}

impl fmt::Display for PersonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell value, used for sorting and for seeding inline editors.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Field has no value (an absent `bio`)
    Missing,
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Total order used by the remote sort.
    ///
    /// Missing values sort before everything else; numbers before text.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique row identity
    pub id: String,
    /// Display name
    pub name: String,
    /// Spoken language, as delivered by the source
    pub language: String,
    /// Optional biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Record version
    pub version: f64,
}

impl Person {
    /// Creates a person without a bio.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
        version: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            bio: None,
            version,
        }
    }

    /// Sets the bio.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Reads one field as a comparable value.
    pub fn field(&self, field: PersonField) -> FieldValue {
        match field {
            PersonField::Id => FieldValue::Text(self.id.clone()),
            PersonField::Name => FieldValue::Text(self.name.clone()),
            PersonField::Language => FieldValue::Text(self.language.clone()),
            PersonField::Bio => self
                .bio
                .clone()
                .map_or(FieldValue::Missing, FieldValue::Text),
            PersonField::Version => FieldValue::Number(self.version),
        }
    }
}

/// A fully validated person that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDraft {
    /// Display name, non-empty
    pub name: String,
    /// One of the accepted languages
    pub language: Language,
    /// Optional biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Record version, at least 1
    pub version: f64,
}

impl Default for PersonDraft {
    /// Values an empty add/edit form starts with.
    fn default() -> Self {
        Self {
            name: String::new(),
            language: Language::English,
            bio: None,
            version: 1.0,
        }
    }
}

impl PersonDraft {
    /// Attaches an id, producing a table row.
    pub fn into_person(self, id: impl Into<String>) -> Person {
        Person {
            id: id.into(),
            name: self.name,
            language: self.language.as_str().to_string(),
            bio: self.bio,
            version: self.version,
        }
    }
}

/// Sparse field edits for one row.
///
/// Absent fields leave the underlying row untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonPatch {
    /// Replacement name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    /// Replacement bio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Replacement version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
}

impl PersonPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.language.is_none() && self.bio.is_none() && self.version.is_none()
    }

    /// Shallow merge: fields set in `newer` override fields set here.
    pub fn merge(&mut self, newer: Self) {
        if newer.name.is_some() {
            self.name = newer.name;
        }
        if newer.language.is_some() {
            self.language = newer.language;
        }
        if newer.bio.is_some() {
            self.bio = newer.bio;
        }
        if newer.version.is_some() {
            self.version = newer.version;
        }
    }

    /// Returns a copy of `row` with this patch applied.
    pub fn apply_to(&self, row: &Person) -> Person {
        let mut out = row.clone();
        if let Some(name) = &self.name {
            out.name.clone_from(name);
        }
        if let Some(language) = self.language {
            out.language = language.as_str().to_string();
        }
        if let Some(bio) = &self.bio {
            out.bio = Some(bio.clone());
        }
        if let Some(version) = self.version {
            out.version = version;
        }
        out
    }

    /// Reads a patched field, if this patch sets it.
    pub fn get(&self, field: PersonField) -> Option<FieldValue> {
        match field {
            PersonField::Id => None,
            PersonField::Name => self.name.clone().map(FieldValue::Text),
            PersonField::Language => self
                .language
                .map(|l| FieldValue::Text(l.as_str().to_string())),
            PersonField::Bio => self.bio.clone().map(FieldValue::Text),
            PersonField::Version => self.version.map(FieldValue::Number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_exact() {
        assert_eq!(Language::parse("Sindhi"), Some(Language::Sindhi));
        assert_eq!(Language::parse("sindhi"), None);
        assert_eq!(Language::parse("Uyghur"), None);
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(PersonField::parse("version"), Some(PersonField::Version));
        assert_eq!(PersonField::parse("stt"), None);
        assert!(!PersonField::Id.is_editable());
        assert!(PersonField::Bio.is_editable());
    }

    #[test]
    fn test_person_deserialize_remote_shape() {
        let json = r#"{"name":"Adeel Solangi","language":"Sindhi","id":"V59OF92YF627HFY0","bio":"Donec lobortis.","version":6.1}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.id, "V59OF92YF627HFY0");
        assert_eq!(person.language, "Sindhi");
        assert_eq!(person.bio.as_deref(), Some("Donec lobortis."));
        assert!((person.version - 6.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_person_deserialize_without_bio() {
        let json = r#"{"id":"a","name":"A","language":"Galician","version":1}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.bio, None);
        assert_eq!(person.field(PersonField::Bio), FieldValue::Missing);
    }

    #[test]
    fn test_field_value_order() {
        let missing = FieldValue::Missing;
        let one = FieldValue::Number(1.0);
        let two = FieldValue::Number(2.0);
        let text = FieldValue::Text("a".to_string());
        assert_eq!(missing.compare(&one), Ordering::Less);
        assert_eq!(one.compare(&two), Ordering::Less);
        assert_eq!(two.compare(&text), Ordering::Less);
        assert_eq!(text.compare(&text.clone()), Ordering::Equal);
    }

    #[test]
    fn test_patch_merge_later_wins() {
        let mut patch = PersonPatch {
            name: Some("First".to_string()),
            version: Some(2.0),
            ..PersonPatch::default()
        };
        patch.merge(PersonPatch {
            name: Some("Second".to_string()),
            ..PersonPatch::default()
        });
        assert_eq!(patch.name.as_deref(), Some("Second"));
        assert_eq!(patch.version, Some(2.0));
    }

    #[test]
    fn test_patch_apply() {
        let row = Person::new("r1", "Ann", "Galician", 3.5).with_bio("hi");
        let patch = PersonPatch {
            language: Some(Language::Vietnamese),
            ..PersonPatch::default()
        };
        let out = patch.apply_to(&row);
        assert_eq!(out.language, "Vietnamese");
        assert_eq!(out.name, "Ann");
        assert_eq!(out.bio.as_deref(), Some("hi"));
        assert_eq!(row.language, "Galician");
    }

    #[test]
    fn test_draft_into_person() {
        let draft = PersonDraft {
            name: "Bao".to_string(),
            language: Language::Vietnamese,
            bio: None,
            version: 1.0,
        };
        let person = draft.into_person("id-1");
        assert_eq!(person.language, "Vietnamese");
        assert_eq!(person.id, "id-1");
    }

    #[test]
    fn test_draft_default_matches_empty_form() {
        let draft = PersonDraft::default();
        assert!(draft.name.is_empty());
        assert_eq!(draft.language, Language::English);
        assert!((draft.version - 1.0).abs() < f64::EPSILON);
    }
}
