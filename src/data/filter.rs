use std::collections::BTreeSet;

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Filter predicate: which distinct values of one column are selected
// ---------------------------------------------------------------------------

/// Selection on a single column. A row passes when its cell is one of the
/// selected values; an empty selection passes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub column: String,
    pub selected: BTreeSet<Value>,
}

impl FilterSelection {
    /// Select every distinct non-null value of `column` (i.e. the default).
    pub fn all_of(dataset: &Dataset, column: &str) -> Self {
        FilterSelection {
            column: column.to_string(),
            selected: dataset.distinct_values(column).cloned().unwrap_or_default(),
        }
    }

    /// Default selection for a freshly loaded dataset: first column, all values.
    pub fn initial(dataset: &Dataset) -> Option<Self> {
        dataset
            .columns
            .first()
            .map(|c| FilterSelection::all_of(dataset, &c.name))
    }

    pub fn toggle(&mut self, value: &Value, on: bool) {
        if on {
            self.selected.insert(value.clone());
        } else {
            self.selected.remove(value);
        }
    }
}

/// Return indices of rows whose `selection.column` value is selected.
///
/// An unknown column yields no rows. Null cells never pass because nulls are
/// not offered as selectable values.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    let Some(col) = dataset.column_index(&selection.column) else {
        return Vec::new();
    };
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| selection.selected.contains(&row[col]))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – borrowed row subset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    pub dataset: &'a Dataset,
    pub indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, indices: &'a [usize]) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [Value]> + 'a {
        let dataset = self.dataset;
        let indices = self.indices;
        indices.iter().map(move |&i| dataset.rows[i].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_delimited;
    use proptest::prelude::*;

    fn sample() -> Dataset {
        parse_delimited("a,b\n1,x\n2,y\n3,x\n".as_bytes(), b',').expect("valid csv")
    }

    #[test]
    fn selecting_one_value_keeps_matching_rows() {
        let ds = sample();
        let mut sel = FilterSelection::all_of(&ds, "b");
        sel.toggle(&Value::String("y".into()), false);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 2]);
    }

    #[test]
    fn default_selection_is_identity() {
        let ds = sample();
        let sel = FilterSelection::initial(&ds).expect("has columns");
        assert_eq!(sel.column, "a");
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1, 2]);
    }

    #[test]
    fn empty_selection_is_empty_view() {
        let ds = sample();
        let sel = FilterSelection {
            column: "b".into(),
            selected: BTreeSet::new(),
        };
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn null_cells_are_excluded_even_with_all_selected() {
        let ds = parse_delimited("a,b\n1,p\n,q\n2,r\nNA,s\n".as_bytes(), b',').expect("valid csv");
        let sel = FilterSelection::all_of(&ds, "a");
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 2]);
    }

    #[test]
    fn view_exposes_selected_rows() {
        let ds = sample();
        let idx = vec![2];
        let view = FilteredView::new(&ds, &idx);
        let rows: Vec<&[Value]> = view.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Value::Integer(3));
    }

    proptest! {
        #[test]
        fn membership_decides_inclusion(
            cells in prop::collection::vec(0u8..5, 0..40),
            keep in prop::collection::btree_set(0u8..5, 0..5),
        ) {
            let mut text = String::from("k\n");
            for c in &cells {
                text.push_str(&format!("v{c}\n"));
            }
            let ds = parse_delimited(text.as_bytes(), b',').expect("valid csv");
            let selection = FilterSelection {
                column: "k".into(),
                selected: keep.iter().map(|k| Value::String(format!("v{k}"))).collect(),
            };
            let idx = filtered_indices(&ds, &selection);

            for (i, c) in cells.iter().enumerate() {
                prop_assert_eq!(idx.contains(&i), keep.contains(c));
            }
            prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
