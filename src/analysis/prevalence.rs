//! Industry prevalence rates and their year-over-year difference.

use crate::dataset::Dataset;
use crate::models::{CategorySelector, HeatmapComparison, PrevalenceMatrix};
use crate::taxonomy::Taxonomy;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Fraction of an industry's reports for `year` with a strictly positive
/// value, per indicator. Nulls count as not disclosed. Industries come out
/// sorted by name; reports without an industry are skipped.
pub fn industry_prevalence(dataset: &Dataset, indicators: &[String], year: i32) -> PrevalenceMatrix {
    let indicators: Vec<String> = indicators
        .iter()
        .filter(|name| dataset.column_index(name).is_some())
        .cloned()
        .collect();
    let columns = dataset.column_indices(&indicators);

    // industry -> (reports, positives per indicator)
    let mut groups: BTreeMap<&str, (usize, Vec<usize>)> = BTreeMap::new();
    for record in dataset.records().iter().filter(|r| r.year == year) {
        let Some(industry) = record.industry.as_deref() else {
            continue;
        };
        let (reports, positives) = groups
            .entry(industry)
            .or_insert_with(|| (0, vec![0; columns.len()]));
        *reports += 1;
        for (slot, &col) in positives.iter_mut().zip(&columns) {
            if record.value(col).is_some_and(|v| v > 0.0) {
                *slot += 1;
            }
        }
    }

    let industries: Vec<String> = groups.keys().map(|s| s.to_string()).collect();
    let values: Vec<Vec<f64>> = groups
        .values()
        .map(|(reports, positives)| {
            positives
                .iter()
                .map(|&p| p as f64 / *reports as f64)
                .collect::<Vec<f64>>()
        })
        .collect();

    PrevalenceMatrix {
        year: Some(year),
        indicators,
        industries,
        values,
    }
}

/// `second - first`, over the union of both matrices' industries.
///
/// An industry missing from one side counts as all zeros on that side. Rows
/// are aligned by industry name and columns by indicator name; the result
/// uses `first`'s indicator order followed by any indicators only `second`
/// has.
pub fn difference(first: &PrevalenceMatrix, second: &PrevalenceMatrix) -> PrevalenceMatrix {
    let mut indicators = first.indicators.clone();
    for name in &second.indicators {
        if !indicators.contains(name) {
            indicators.push(name.clone());
        }
    }

    let industries: Vec<String> = first
        .industries
        .iter()
        .chain(&second.industries)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let lookup = |matrix: &PrevalenceMatrix, industry: &str, indicator: &str| -> f64 {
        let col = matrix.indicators.iter().position(|n| n == indicator);
        match (matrix.row(industry), col) {
            (Some(row), Some(col)) => row.get(col).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    };

    let values: Vec<Vec<f64>> = industries
        .iter()
        .map(|industry| {
            indicators
                .iter()
                .map(|indicator| {
                    lookup(second, industry.as_str(), indicator.as_str())
                        - lookup(first, industry.as_str(), indicator.as_str())
                })
                .collect::<Vec<f64>>()
        })
        .collect();

    PrevalenceMatrix {
        year: None,
        indicators,
        industries,
        values,
    }
}

/// Prevalence heatmaps for two years plus their difference.
pub fn compare_years(
    dataset: &Dataset,
    taxonomy: &Taxonomy,
    selector: CategorySelector,
    year1: i32,
    year2: i32,
) -> HeatmapComparison {
    let indicators = taxonomy.indicators(selector);
    let first = industry_prevalence(dataset, &indicators, year1);
    let second = industry_prevalence(dataset, &indicators, year2);
    let difference = difference(&first, &second);

    debug!(
        "Heatmaps for {} vs {}: {} / {} industries, {} indicators",
        year1,
        year2,
        first.industries.len(),
        second.industries.len(),
        difference.indicators.len()
    );

    HeatmapComparison {
        selector,
        year1,
        year2,
        first,
        second,
        difference,
    }
}
