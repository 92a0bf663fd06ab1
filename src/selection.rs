use crate::dataset::{Column, Gender, PassengerRecord, Port};
use crate::error::{Error, Result};

/// A single drill-down condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Inclusive bounds on a column's numeric form; either bound may be open.
    Range {
        column: Column,
        min: Option<f64>,
        max: Option<f64>,
    },
    Equals { column: Column, value: String },
}

impl Constraint {
    pub fn range(column: Column, min: Option<f64>, max: Option<f64>) -> Self {
        Constraint::Range { column, min, max }
    }

    pub fn equals(column: Column, value: impl Into<String>) -> Self {
        Constraint::Equals {
            column,
            value: value.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Constraint::Range { column, .. } if matches!(column, Column::Gender | Column::Port) => {
                Err(Error::InvalidColumn(column.name().to_string()))
            }
            _ => Ok(()),
        }
    }

    /// A record whose value for the constrained column is missing never matches.
    pub fn matches(&self, record: &PassengerRecord) -> bool {
        match self {
            Constraint::Range { column, min, max } => match record.numeric(*column) {
                Some(v) => min.map_or(true, |lo| v >= lo) && max.map_or(true, |hi| v <= hi),
                None => false,
            },
            Constraint::Equals { column, value } => equals(record, *column, value.trim()),
        }
    }
}

fn equals(record: &PassengerRecord, column: Column, value: &str) -> bool {
    match column {
        Column::Gender => {
            if let Ok(gender) = value.parse::<Gender>() {
                return record.gender == gender;
            }
        }
        Column::Port => {
            if let Ok(port) = value.parse::<Port>() {
                return record.port == Some(port);
            }
        }
        _ => {
            if let (Some(actual), Ok(expected)) = (record.numeric(column), value.parse::<f64>()) {
                return actual == expected;
            }
        }
    }
    record
        .label(column)
        .map_or(false, |label| label.eq_ignore_ascii_case(value))
}

/// Conjunction of constraints. The empty selection matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    constraints: Vec<Constraint>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn validate(&self) -> Result<()> {
        self.constraints.iter().try_for_each(Constraint::validate)
    }

    pub fn matches(&self, record: &PassengerRecord) -> bool {
        self.constraints.iter().all(|c| c.matches(record))
    }
}
