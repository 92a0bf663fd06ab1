use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::{
    age_distribution, age_group_rate, fare_distribution, fare_quartile_rate, family_size_rate,
    rate_by_category, summary, AgeBucket, AgeDistribution, CategoryRate, Summary,
};
use crate::dataset::{Column, PassengerTable};
use crate::error::Result;
use crate::stats::{FiveNumberSummary, Histogram};

/// Bins of the overlaid age histogram.
pub const AGE_BINS: usize = 25;

/// Everything the overview shows, computed once per table.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub by_gender: Vec<CategoryRate>,
    pub by_class: Vec<CategoryRate>,
    pub by_port: Vec<CategoryRate>,
    pub family_size: Vec<CategoryRate>,
    pub age_groups: Vec<AgeBucket>,
    pub fare_quartiles: Vec<CategoryRate>,
    pub fares_by_outcome: BTreeMap<String, Option<FiveNumberSummary>>,
    #[serde(skip)]
    pub ages: AgeDistribution,
}

impl Report {
    pub fn build(table: &PassengerTable) -> Result<Self> {
        let mut by_class = rate_by_category(table, Column::Class)?;
        // Bars read better in class order than by passenger count.
        by_class.sort_by(|a, b| a.label.cmp(&b.label));

        let fares_by_outcome = fare_distribution(table, Column::Survived)?
            .into_iter()
            .map(|(label, fares)| (label, FiveNumberSummary::from_sorted(&fares)))
            .collect();

        Ok(Self {
            generated_at: Utc::now(),
            summary: summary(table),
            by_gender: rate_by_category(table, Column::Gender)?,
            by_class,
            by_port: rate_by_category(table, Column::Port)?,
            family_size: family_size_rate(table),
            age_groups: age_group_rate(table),
            fare_quartiles: fare_quartile_rate(table),
            fares_by_outcome,
            ages: age_distribution(table),
        })
    }

    /// Survivor and non-survivor age histograms over a shared range.
    pub fn age_histograms(&self) -> (Histogram, Histogram) {
        let upper = if self.ages.is_empty() {
            1.0
        } else {
            self.ages.max_age().unwrap_or(0.0).ceil().max(1.0)
        };
        (
            Histogram::new(self.ages.survived.iter().copied(), AGE_BINS, 0.0..upper),
            Histogram::new(self.ages.died.iter().copied(), AGE_BINS, 0.0..upper),
        )
    }

    /// One-line headline, e.g. "342 of 891 passengers survived (38.4%)".
    pub fn headline(&self) -> String {
        let rate = self.summary.rate.map_or(0.0, |r| r * 100.0);
        format!(
            "{} of {} passengers survived ({rate:.1}%)",
            self.summary.survived, self.summary.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::titanic_like_table;

    #[test]
    fn report_orders_classes_by_rank() {
        let report = Report::build(&titanic_like_table()).unwrap();
        assert_eq!(
            report
                .by_class
                .iter()
                .map(|r| r.label.as_str())
                .collect::<Vec<_>>(),
            vec!["1st Class", "2nd Class", "3rd Class"]
        );
        assert_eq!(report.headline(), "342 of 891 passengers survived (38.4%)");
    }

    #[test]
    fn age_histograms_hold_every_known_age() {
        let report = Report::build(&titanic_like_table()).unwrap();
        let (survived, died) = report.age_histograms();
        assert_eq!(survived.bins.len(), AGE_BINS);
        assert_eq!(
            (survived.total() + died.total()) as usize,
            report.ages.len()
        );
    }

    #[test]
    fn fare_summaries_per_outcome() {
        let report = Report::build(&titanic_like_table()).unwrap();
        assert_eq!(report.fares_by_outcome.len(), 2);
        let survived = report.fares_by_outcome["Survived"].unwrap();
        assert!(survived.min > 0.0);
        assert!(survived.q1 <= survived.median && survived.median <= survived.q3);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = Report::build(&titanic_like_table()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total"], 891);
        assert_eq!(json["by_gender"][1]["label"], "Female");
        assert!(json.get("ages").is_none());
    }

    #[test]
    fn empty_table_still_reports() {
        let report = Report::build(&PassengerTable::default()).unwrap();
        assert_eq!(report.headline(), "0 of 0 passengers survived (0.0%)");
        assert!(report.by_gender.is_empty());
        let (survived, _) = report.age_histograms();
        assert_eq!(survived.total(), 0);
    }
}
