use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Quarter – calendar quarter label "YYYYQn"
// ---------------------------------------------------------------------------

/// A calendar quarter. Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    year: i32,
    quarter: u8,
}

impl Quarter {
    /// Panics on a quarter outside `1..=4`; only used for constants and tests.
    pub const fn new(year: i32, quarter: u8) -> Self {
        assert!(quarter >= 1 && quarter <= 4, "quarter must be in 1..=4");
        Quarter { year, quarter }
    }

    /// The calendar quarter containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Quarter {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid quarter label '{0}', expected YYYYQn")]
pub struct ParseQuarterError(String);

impl FromStr for Quarter {
    type Err = ParseQuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQuarterError(s.to_string());
        let (year, quarter) = s.trim().split_once(['Q', 'q']).ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let quarter: u8 = quarter.parse().map_err(|_| err())?;
        if !(1..=4).contains(&quarter) {
            return Err(err());
        }
        Ok(Quarter { year, quarter })
    }
}

// ---------------------------------------------------------------------------
// Dimension – the three filterable columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// Vehicle type.
    Category,
    /// Mileage bucket.
    Mileage,
    /// Vehicle age bucket.
    Age,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Category, Dimension::Mileage, Dimension::Age];

    /// Heading shown above the dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Category => "Fahrzeugtyp",
            Dimension::Mileage => "Kilometerstand",
            Dimension::Age => "Alter des Fahrzeugs",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the sale table
// ---------------------------------------------------------------------------

/// A single vehicle sale observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub category: Option<String>,
    pub mileage: Option<String>,
    pub age: Option<String>,
    pub sale_date: NaiveDate,
    pub asking_price: Option<f64>,
    pub sale_price: Option<f64>,
    quarter: Quarter,
}

impl Record {
    /// Build a record, deriving its quarter from `sale_date`.
    pub fn new(
        sale_date: NaiveDate,
        category: Option<String>,
        mileage: Option<String>,
        age: Option<String>,
        asking_price: Option<f64>,
        sale_price: Option<f64>,
    ) -> Self {
        Record {
            category,
            mileage,
            age,
            sale_date,
            asking_price,
            sale_price,
            quarter: Quarter::from_date(sale_date),
        }
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    /// Value of the record in the given filter dimension.
    pub fn dimension_value(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Category => self.category.as_deref(),
            Dimension::Mileage => self.mileage.as_deref(),
            Dimension::Age => self.age.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed dropdown options.
///
/// Never mutated after construction; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// For each dimension the sorted set of distinct non-empty values.
    unique_values: BTreeMap<Dimension, BTreeSet<String>>,
}

impl Dataset {
    /// Build dimension indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = Dimension::ALL
            .iter()
            .map(|dim| (*dim, BTreeSet::new()))
            .collect();

        for record in &records {
            for dim in Dimension::ALL {
                if let Some(value) = record.dimension_value(dim) {
                    unique_values
                        .entry(dim)
                        .or_default()
                        .insert(value.to_string());
                }
            }
        }

        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct values available for a dimension, sorted.
    pub fn options(&self, dimension: Dimension) -> impl Iterator<Item = &str> {
        self.unique_values
            .get(&dimension)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
