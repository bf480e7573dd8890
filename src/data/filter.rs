use std::fmt;

use super::model::{Dataset, Dimension, Record};

// ---------------------------------------------------------------------------
// Selection: which value is chosen per dimension
// ---------------------------------------------------------------------------

/// Dropdown label shown for [`Selection::All`].
pub const ALL_VALUES_LABEL: &str = "Total";

/// Selection for one dimension: no constraint, or exact equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Whether a record's value passes this selection. Missing values only
    /// pass [`Selection::All`].
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL_VALUES_LABEL),
            Selection::Only(v) => f.write_str(v),
        }
    }
}

/// The three dropdown selections. Default selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSelection {
    pub category: Selection,
    pub mileage: Selection,
    pub age: Selection,
}

impl FilterSelection {
    pub fn get(&self, dimension: Dimension) -> &Selection {
        match dimension {
            Dimension::Category => &self.category,
            Dimension::Mileage => &self.mileage,
            Dimension::Age => &self.age,
        }
    }

    pub fn set(&mut self, dimension: Dimension, selection: Selection) {
        match dimension {
            Dimension::Category => self.category = selection,
            Dimension::Mileage => self.mileage = selection,
            Dimension::Age => self.age = selection,
        }
    }

    /// A record passes when every dimension matches (conjunction).
    pub fn matches(&self, record: &Record) -> bool {
        Dimension::ALL
            .iter()
            .all(|dim| self.get(*dim).matches(record.dimension_value(*dim)))
    }
}

// ---------------------------------------------------------------------------
// FilteredView: indices into the shared dataset
// ---------------------------------------------------------------------------

/// Subset of a [`Dataset`] passing a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every record.
    pub fn full(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Apply `selection` on top of this view.
    pub fn refine(&self, selection: &FilterSelection) -> FilteredView<'a> {
        let records = self.dataset.records();
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| selection.matches(&records[i]))
            .collect();
        FilteredView {
            dataset: self.dataset,
            indices,
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the records of `dataset` that pass all active selections.
///
/// Pure: the dataset is only read. Unknown values give an empty view.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| selection.matches(record))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}
