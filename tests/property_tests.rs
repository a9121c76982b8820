#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]
//! Property-based tests for sorting, paging and the merged view.
//!
//! Uses proptest to check invariants across random datasets and edits.

use proptest::prelude::*;
use scrollgrid::{
    validate, validate_partial, EditOverlay, Page, Person, PersonField, SortSpec,
};
use serde_json::json;

fn people_strategy() -> impl Strategy<Value = Vec<Person>> {
    prop::collection::vec(("[a-z]{1,8}", 1.0f64..100.0), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, version))| Person::new(format!("row-{i}"), name, "English", version))
            .collect()
    })
}

fn paged(rows: &[Person], size: usize) -> Vec<Page> {
    rows.chunks(size.max(1))
        .map(|chunk| Page {
            rows: chunk.to_vec(),
            total_row_count: rows.len(),
        })
        .collect()
}

proptest! {
    /// Property: descending order is the exact reverse of ascending order
    /// when keys are distinct
    #[test]
    fn prop_desc_reverses_asc(rows in people_strategy()) {
        let mut asc = rows.clone();
        SortSpec::ascending(PersonField::Id).apply(&mut asc);
        let mut desc = rows;
        SortSpec::descending(PersonField::Id).apply(&mut desc);
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    /// Property: ascending sort by version is non-decreasing
    #[test]
    fn prop_sort_orders_versions(rows in people_strategy()) {
        let mut sorted = rows;
        SortSpec::ascending(PersonField::Version).apply(&mut sorted);
        prop_assert!(sorted.windows(2).all(|w| w[0].version <= w[1].version));
    }

    /// Property: materializing twice gives identical rows
    #[test]
    fn prop_materialize_idempotent(
        rows in people_strategy(),
        page_size in 1usize..20,
        edits in prop::collection::vec((0usize..60, "[A-Z][a-z]{0,6}"), 0..10),
    ) {
        let mut overlay = EditOverlay::new();
        for (idx, name) in &edits {
            overlay.commit_edit(&format!("row-{idx}"), &json!({ "name": name })).unwrap();
        }
        let pages = paged(&rows, page_size);
        let first = overlay.materialize_view(&pages).unwrap();
        let second = overlay.materialize_view(&pages).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), rows.len());
    }

    /// Property: paging does not change the merged order
    #[test]
    fn prop_view_independent_of_page_size(rows in people_strategy(), a in 1usize..20, b in 1usize..20) {
        let overlay = EditOverlay::new();
        let left = overlay.materialize_view(&paged(&rows, a)).unwrap();
        let right = overlay.materialize_view(&paged(&rows, b)).unwrap();
        prop_assert_eq!(left, right);
    }

    /// Property: any version below 1 is rejected, any at or above accepted
    #[test]
    fn prop_version_bound(version in -1000.0f64..1000.0) {
        let full = validate(&json!({"name": "A", "language": "Sindhi", "version": version}));
        let partial = validate_partial(&json!({ "version": version }));
        if version >= 1.0 {
            prop_assert!(full.is_ok());
            prop_assert!(partial.is_ok());
        } else {
            prop_assert!(full.is_err());
            prop_assert!(partial.is_err());
        }
    }

    /// Property: only the three enumerated languages validate
    #[test]
    fn prop_language_enum(language in "[A-Za-z]{0,12}") {
        let result = validate(&json!({"name": "A", "language": language, "version": 1}));
        let expected = matches!(language.as_str(), "English" | "Sindhi" | "Vietnamese");
        prop_assert_eq!(result.is_ok(), expected);
    }

    /// Property: a rejected edit never changes the view
    #[test]
    fn prop_rejected_edit_is_noop(rows in people_strategy(), bad in -5.0f64..0.99) {
        let mut overlay = EditOverlay::new();
        let pages = paged(&rows, 7);
        let before = overlay.materialize_view(&pages).unwrap();
        overlay.begin_edit("row-0", PersonField::Version);
        let commit = overlay.commit_edit("row-0", &json!({ "version": bad }));
        prop_assert!(commit.is_err());
        prop_assert!(overlay.editing().is_some());
        prop_assert_eq!(overlay.materialize_view(&pages).unwrap(), before);
    }
}
