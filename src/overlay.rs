//! Local additions, inline edits, and the merged row view.
//!
//! Edits never touch the data source's cache: they live in a sparse
//! per-row overlay and are re-applied each time the view is materialized.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    person::{FieldValue, Person, PersonDraft, PersonField, PersonPatch},
    source::Page,
    validate::{validate_partial, ValidationErrors},
};

/// The cell currently open in an inline editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditingCell {
    /// Row being edited
    pub row_id: String,
    /// Column being edited
    pub field: PersonField,
}

/// Locally added rows plus per-row field edits.
#[derive(Debug, Clone, Default)]
pub struct EditOverlay {
    /// Newest first
    local: Vec<Person>,
    edits: HashMap<String, PersonPatch>,
    editing: Option<EditingCell>,
    errors: Option<ValidationErrors>,
}

impl EditOverlay {
    /// Creates an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows added in this session, newest first.
    pub fn local_additions(&self) -> &[Person] {
        &self.local
    }

    /// The overlay recorded for `row_id`, if any.
    pub fn edits_for(&self, row_id: &str) -> Option<&PersonPatch> {
        self.edits.get(row_id)
    }

    /// Number of rows with recorded edits.
    pub fn edited_rows(&self) -> usize {
        self.edits.len()
    }

    /// The open editor, if any.
    pub fn editing(&self) -> Option<&EditingCell> {
        self.editing.as_ref()
    }

    /// Errors from the last rejected commit, if the editor is still open.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    /// Prepends a validated person under a fresh id and returns the row.
    pub fn add_local(&mut self, draft: PersonDraft) -> Person {
        let person = draft.into_person(Uuid::new_v4().to_string());
        tracing::debug!(id = %person.id, "local row added");
        self.local.insert(0, person.clone());
        person
    }

    /// Opens the editor on one cell, closing any other.
    pub fn begin_edit(&mut self, row_id: impl Into<String>, field: PersonField) {
        self.editing = Some(EditingCell {
            row_id: row_id.into(),
            field,
        });
        self.errors = None;
    }

    /// Closes the editor without recording anything.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.errors = None;
    }

    /// Validates the keys present in `values` and merges them into the
    /// row's overlay.
    ///
    /// On success the editor closes. On failure the overlay is unchanged,
    /// the editor stays open, and the errors are kept for display.
    ///
    /// # Errors
    ///
    /// Returns the validation errors for the rejected fields.
    pub fn commit_edit(&mut self, row_id: &str, values: &Value) -> std::result::Result<(), ValidationErrors> {
        match validate_partial(values) {
            Ok(patch) => {
                self.commit_patch(row_id, patch);
                Ok(())
            }
            Err(errors) => {
                tracing::debug!(row_id, %errors, "edit rejected");
                self.errors = Some(errors.clone());
                Err(errors)
            }
        }
    }

    /// Merges an already validated patch and closes the editor.
    pub fn commit_patch(&mut self, row_id: &str, patch: PersonPatch) {
        if !patch.is_empty() {
            self.edits.entry(row_id.to_string()).or_default().merge(patch);
            tracing::debug!(row_id, "edit committed");
        }
        self.editing = None;
        self.errors = None;
    }

    /// The value an editor for `field` on `row` starts with.
    pub fn current_value(&self, row: &Person, field: PersonField) -> FieldValue {
        self.edits
            .get(&row.id)
            .and_then(|patch| patch.get(field))
            .unwrap_or_else(|| row.field(field))
    }

    /// Finds a row by id among local additions and `pages`, without edits.
    pub fn find_origin<'a>(&'a self, pages: &'a [Page], row_id: &str) -> Option<&'a Person> {
        self.local
            .iter()
            .chain(pages.iter().flat_map(|p| p.rows.iter()))
            .find(|p| p.id == row_id)
    }

    /// Local additions followed by fetched rows in page order, each with
    /// its overlay applied.
    ///
    /// Pure: the same inputs always give the same rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRowId`] if two rows share an id.
    pub fn materialize_view(&self, pages: &[Page]) -> Result<Vec<Person>> {
        let fetched = pages.iter().map(Page::len).sum::<usize>();
        let mut seen = HashSet::with_capacity(self.local.len() + fetched);
        let mut view = Vec::with_capacity(self.local.len() + fetched);

        for row in self
            .local
            .iter()
            .chain(pages.iter().flat_map(|p| p.rows.iter()))
        {
            if !seen.insert(row.id.as_str()) {
                return Err(Error::duplicate_row_id(row.id.clone()));
            }
            view.push(match self.edits.get(&row.id) {
                Some(patch) => patch.apply_to(row),
                None => row.clone(),
            });
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::person::Language;

    fn draft(name: &str) -> PersonDraft {
        PersonDraft {
            name: name.to_string(),
            language: Language::English,
            bio: None,
            version: 1.0,
        }
    }

    fn page(ids: &[&str]) -> Page {
        Page {
            rows: ids
                .iter()
                .map(|id| Person::new(*id, format!("name-{id}"), "Galician", 2.5))
                .collect(),
            total_row_count: ids.len(),
        }
    }

    #[test]
    fn test_local_additions_newest_first() {
        let mut overlay = EditOverlay::new();
        let first = overlay.add_local(draft("first"));
        let second = overlay.add_local(draft("second"));
        assert_ne!(first.id, second.id);

        let view = overlay.materialize_view(&[page(&["a", "b"])]).unwrap();
        let names: Vec<&str> = view.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first", "name-a", "name-b"]);
    }

    #[test]
    fn test_commit_applies_overlay() {
        let mut overlay = EditOverlay::new();
        overlay.begin_edit("a", PersonField::Name);
        overlay.commit_edit("a", &json!({"name": "Renamed"})).unwrap();
        assert!(overlay.editing().is_none());

        let view = overlay.materialize_view(&[page(&["a", "b"])]).unwrap();
        assert_eq!(view[0].name, "Renamed");
        assert_eq!(view[0].language, "Galician");
        assert_eq!(view[1].name, "name-b");
    }

    #[test]
    fn test_later_commit_wins_per_field() {
        let mut overlay = EditOverlay::new();
        overlay.commit_edit("a", &json!({"name": "One", "version": 3})).unwrap();
        overlay.commit_edit("a", &json!({"name": "Two"})).unwrap();
        let patch = overlay.edits_for("a").unwrap();
        assert_eq!(patch.name.as_deref(), Some("Two"));
        assert_eq!(patch.version, Some(3.0));
    }

    #[test]
    fn test_invalid_commit_keeps_state() {
        let mut overlay = EditOverlay::new();
        overlay.commit_edit("a", &json!({"version": 2})).unwrap();
        overlay.begin_edit("a", PersonField::Version);

        let errors = overlay.commit_edit("a", &json!({"version": 0})).unwrap_err();
        assert_eq!(errors.message_for("version"), Some("Version must be >= 1"));
        assert_eq!(overlay.edits_for("a").unwrap().version, Some(2.0));
        assert_eq!(
            overlay.editing(),
            Some(&EditingCell {
                row_id: "a".to_string(),
                field: PersonField::Version
            })
        );
        assert!(overlay.errors().is_some());
    }

    #[test]
    fn test_begin_edit_replaces_other_edit() {
        let mut overlay = EditOverlay::new();
        overlay.begin_edit("a", PersonField::Name);
        overlay.begin_edit("b", PersonField::Language);
        let cell = overlay.editing().unwrap();
        assert_eq!(cell.row_id, "b");
        assert_eq!(cell.field, PersonField::Language);
    }

    #[test]
    fn test_cancel_edit() {
        let mut overlay = EditOverlay::new();
        overlay.begin_edit("a", PersonField::Name);
        let _ = overlay.commit_edit("a", &json!({"name": ""}));
        overlay.cancel_edit();
        assert!(overlay.editing().is_none());
        assert!(overlay.errors().is_none());
        assert_eq!(overlay.edited_rows(), 0);
    }

    #[test]
    fn test_edit_local_row() {
        let mut overlay = EditOverlay::new();
        let person = overlay.add_local(draft("local"));
        overlay
            .commit_edit(&person.id, &json!({"language": "Sindhi"}))
            .unwrap();
        let view = overlay.materialize_view(&[]).unwrap();
        assert_eq!(view[0].language, "Sindhi");
        assert_eq!(overlay.local_additions()[0].language, "English");
    }

    #[test]
    fn test_current_value_prefers_overlay() {
        let mut overlay = EditOverlay::new();
        let row = Person::new("a", "Origin", "Galician", 4.0);
        assert_eq!(
            overlay.current_value(&row, PersonField::Name),
            FieldValue::Text("Origin".to_string())
        );
        overlay.commit_edit("a", &json!({"name": "Edited"})).unwrap();
        assert_eq!(
            overlay.current_value(&row, PersonField::Name),
            FieldValue::Text("Edited".to_string())
        );
        assert_eq!(
            overlay.current_value(&row, PersonField::Version),
            FieldValue::Number(4.0)
        );
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let mut overlay = EditOverlay::new();
        overlay.add_local(draft("x"));
        overlay.commit_edit("b", &json!({"bio": "edited"})).unwrap();
        let pages = [page(&["a", "b"]), page(&["c"])];
        let first = overlay.materialize_view(&pages).unwrap();
        let second = overlay.materialize_view(&pages).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_duplicate_id_fails() {
        let overlay = EditOverlay::new();
        let err = overlay
            .materialize_view(&[page(&["a", "b"]), page(&["b"])])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRowId { ref id } if id == "b"));
    }

    #[test]
    fn test_overlay_for_unloaded_row_is_kept() {
        let mut overlay = EditOverlay::new();
        overlay.commit_edit("later", &json!({"name": "Z"})).unwrap();
        assert!(overlay.materialize_view(&[page(&["a"])]).unwrap()[0].name != "Z");
        let view = overlay.materialize_view(&[page(&["a"]), page(&["later"])]).unwrap();
        assert_eq!(view[1].name, "Z");
    }

    #[test]
    fn test_find_origin() {
        let overlay = EditOverlay::new();
        let pages = [page(&["a"]), page(&["b"])];
        assert_eq!(overlay.find_origin(&pages, "b").unwrap().id, "b");
        assert!(overlay.find_origin(&pages, "zz").is_none());
    }
}
