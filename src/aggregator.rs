//! Survival statistics over a [`PassengerTable`].
//!
//! Every function here is a pure transform of its arguments. Groups are
//! counted in ordered maps so the output never depends on hash order, and a
//! group without rows is left out instead of producing a `NaN` rate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::{Column, PassengerRecord, PassengerTable};
use crate::error::{Error, Result};
use crate::selection::Selection;
use crate::stats::quantile;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Counts {
    survived: u64,
    total: u64,
}

impl Counts {
    fn add(&mut self, record: &PassengerRecord) {
        self.total += 1;
        if record.survived {
            self.survived += 1;
        }
    }
}

/// Survivors and total for one category. `total` is never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRate {
    pub label: String,
    pub survived: u64,
    pub total: u64,
    /// `survived / total`, in `[0, 1]`.
    pub rate: f64,
}

impl CategoryRate {
    fn from_counts(label: impl Into<String>, counts: Counts) -> Option<Self> {
        (counts.total > 0).then(|| Self {
            label: label.into(),
            survived: counts.survived,
            total: counts.total,
            rate: counts.survived as f64 / counts.total as f64,
        })
    }

    pub fn died(&self) -> u64 {
        self.total - self.survived
    }

    pub fn percent(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Survival rate per value of a categorical column (gender, class, port).
///
/// Rows missing a value for `column` are skipped. Categories come out by
/// descending total, ties broken by label.
pub fn rate_by_category(table: &PassengerTable, column: Column) -> Result<Vec<CategoryRate>> {
    if !column.is_categorical() {
        return Err(Error::InvalidColumn(column.name().to_string()));
    }

    let mut groups: BTreeMap<String, Counts> = BTreeMap::new();
    for record in table.iter() {
        if let Some(label) = record.label(column) {
            groups.entry(label).or_default().add(record);
        }
    }

    let mut rates = groups
        .into_iter()
        .filter_map(|(label, counts)| CategoryRate::from_counts(label, counts))
        .collect::<Vec<_>>();
    rates.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    Ok(rates)
}

/// Ages of survivors and of non-survivors, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeDistribution {
    pub survived: Vec<f64>,
    pub died: Vec<f64>,
}

impl AgeDistribution {
    pub fn len(&self) -> usize {
        self.survived.len() + self.died.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_age(&self) -> Option<f64> {
        self.survived
            .iter()
            .chain(&self.died)
            .copied()
            .max_by(f64::total_cmp)
    }
}

pub fn age_distribution(table: &PassengerTable) -> AgeDistribution {
    let mut distribution = AgeDistribution::default();
    for record in table.iter() {
        let Some(age) = record.age else { continue };
        if record.survived {
            distribution.survived.push(age);
        } else {
            distribution.died.push(age);
        }
    }
    distribution
}

/// Ascending fares per group of `column` (a categorical column or `survived`).
///
/// Zero and missing fares are left out of a group's values; the group
/// itself is still present.
pub fn fare_distribution(
    table: &PassengerTable,
    column: Column,
) -> Result<BTreeMap<String, Vec<f64>>> {
    if !(column.is_categorical() || column == Column::Survived) {
        return Err(Error::InvalidColumn(column.name().to_string()));
    }

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in table.iter() {
        let Some(label) = record.label(column) else { continue };
        let fares = groups.entry(label).or_default();
        if let Some(fare) = record.fare.filter(|f| *f > 0.0) {
            fares.push(fare);
        }
    }
    for fares in groups.values_mut() {
        fares.sort_by(f64::total_cmp);
    }
    Ok(groups)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FamilyBand {
    Alone,
    Small,
    Large,
}

impl FamilyBand {
    pub fn from_size(size: u32) -> Self {
        match size {
            0 | 1 => FamilyBand::Alone,
            2..=4 => FamilyBand::Small,
            _ => FamilyBand::Large,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FamilyBand::Alone => "Alone (1)",
            FamilyBand::Small => "Small (2-4)",
            FamilyBand::Large => "Large (5+)",
        }
    }
}

/// Survival rate per family-size band, in band order.
pub fn family_size_rate(table: &PassengerTable) -> Vec<CategoryRate> {
    let mut bands: BTreeMap<FamilyBand, Counts> = BTreeMap::new();
    for record in table.iter() {
        bands
            .entry(FamilyBand::from_size(record.family_size()))
            .or_default()
            .add(record);
    }
    bands
        .into_iter()
        .filter_map(|(band, counts)| CategoryRate::from_counts(band.label(), counts))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgeBand {
    Child,
    Teen,
    Adult,
    MiddleAge,
    Senior,
    Missing,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Child,
        AgeBand::Teen,
        AgeBand::Adult,
        AgeBand::MiddleAge,
        AgeBand::Senior,
        AgeBand::Missing,
    ];

    /// Upper bounds are inclusive: 12 is a child, 12.5 a teen.
    pub fn from_age(age: Option<f64>) -> Self {
        match age {
            None => AgeBand::Missing,
            Some(a) if a <= 12.0 => AgeBand::Child,
            Some(a) if a <= 18.0 => AgeBand::Teen,
            Some(a) if a <= 35.0 => AgeBand::Adult,
            Some(a) if a <= 50.0 => AgeBand::MiddleAge,
            Some(_) => AgeBand::Senior,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Child => "Child (0-12)",
            AgeBand::Teen => "Teen (13-18)",
            AgeBand::Adult => "Adult (19-35)",
            AgeBand::MiddleAge => "Middle Age (36-50)",
            AgeBand::Senior => "Senior (50+)",
            AgeBand::Missing => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBucket {
    pub label: String,
    pub survived: u64,
    pub total: u64,
}

impl AgeBucket {
    /// `None` for an empty bucket.
    pub fn rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.survived as f64 / self.total as f64)
    }
}

/// Every age band, including empty ones and the missing-age band.
pub fn age_group_rate(table: &PassengerTable) -> Vec<AgeBucket> {
    let mut bands: BTreeMap<AgeBand, Counts> = BTreeMap::new();
    for record in table.iter() {
        bands
            .entry(AgeBand::from_age(record.age))
            .or_default()
            .add(record);
    }
    AgeBand::ALL
        .iter()
        .map(|band| {
            let counts = bands.get(band).copied().unwrap_or_default();
            AgeBucket {
                label: band.label().to_string(),
                survived: counts.survived,
                total: counts.total,
            }
        })
        .collect()
}

const FARE_QUARTILES: [&str; 4] = ["Low", "Medium-Low", "Medium-High", "High"];

/// Survival rate per fare quartile of the table's own fares.
///
/// Quartile edges are inclusive upper bounds; passengers without a fare are
/// left out and empty quartiles are omitted.
pub fn fare_quartile_rate(table: &PassengerTable) -> Vec<CategoryRate> {
    let mut fares = table.iter().filter_map(|r| r.fare).collect::<Vec<_>>();
    fares.sort_by(f64::total_cmp);
    let edges = [0.25, 0.5, 0.75].map(|q| quantile(&fares, q));
    let [Some(q1), Some(q2), Some(q3)] = edges else {
        return Vec::new();
    };

    let mut bands = [Counts::default(); 4];
    for record in table.iter() {
        let Some(fare) = record.fare else { continue };
        let index = if fare <= q1 {
            0
        } else if fare <= q2 {
            1
        } else if fare <= q3 {
            2
        } else {
            3
        };
        bands[index].add(record);
    }

    FARE_QUARTILES
        .iter()
        .zip(bands)
        .filter_map(|(label, counts)| CategoryRate::from_counts(*label, counts))
        .collect()
}

/// Head-line numbers for the whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: u64,
    pub survived: u64,
    /// `None` for an empty table.
    pub rate: Option<f64>,
    pub dropped: usize,
}

impl Summary {
    pub fn died(&self) -> u64 {
        self.total - self.survived
    }
}

pub fn summary(table: &PassengerTable) -> Summary {
    let mut counts = Counts::default();
    for record in table.iter() {
        counts.add(record);
    }
    Summary {
        total: counts.total,
        survived: counts.survived,
        rate: CategoryRate::from_counts("all", counts).map(|c| c.rate),
        dropped: table.dropped(),
    }
}

/// Passengers matching every constraint of `selection`.
///
/// Fails with [`Error::InvalidColumn`] when a range constraint targets a
/// column that has no numeric form.
pub fn filter_by_selection(
    table: &PassengerTable,
    selection: &Selection,
) -> Result<PassengerTable> {
    selection.validate()?;
    Ok(table
        .iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect())
}
