//! Top-N indicator selection for a single company.
//!
//! Sums each indicator over the company's reports, ranks them and turns the
//! winners into year-ordered time series for the line chart.

use crate::dataset::{AliasTable, Dataset};
use crate::models::{CategorySelector, FrequencyChart, IndicatorSeries, IndicatorTotal, SeriesPoint};
use crate::taxonomy::Taxonomy;
use tracing::debug;

/// Sum every indicator over a company's reports. Nulls are skipped, so an
/// indicator that was never disclosed totals 0. Indicators that are not
/// dataset columns are left out.
pub fn indicator_totals(
    dataset: &Dataset,
    company: &str,
    indicators: &[String],
) -> Vec<IndicatorTotal> {
    let rows: Vec<_> = dataset
        .records()
        .iter()
        .filter(|r| r.company == company)
        .collect();

    indicators
        .iter()
        .filter_map(|name| {
            let column = dataset.column_index(name)?;
            let total: f64 = rows.iter().filter_map(|r| r.value(column)).sum();
            Some(IndicatorTotal {
                indicator: name.clone(),
                total,
            })
        })
        .collect()
}

/// Rank totals highest first, breaking ties alphabetically, and keep `n`.
pub fn rank_totals(mut totals: Vec<IndicatorTotal>, n: usize) -> Vec<IndicatorTotal> {
    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.indicator.cmp(&b.indicator))
    });
    totals.truncate(n);
    totals
}

/// The `n` indicators with the highest totals for a company.
pub fn top_indicators(
    dataset: &Dataset,
    company: &str,
    indicators: &[String],
    n: usize,
) -> Vec<IndicatorTotal> {
    rank_totals(indicator_totals(dataset, company, indicators), n)
}

/// Legend label for an indicator. The category tag is only added when all
/// categories are shown together.
pub fn series_label(
    indicator: &str,
    selector: CategorySelector,
    taxonomy: &Taxonomy,
    aliases: &AliasTable,
) -> String {
    let label = aliases.display_label(indicator);
    match (selector, taxonomy.category_of(indicator)) {
        (CategorySelector::All, Some(category)) => format!("{} ({})", label, category.tag()),
        _ => label,
    }
}

/// Build the frequency line chart for a company.
///
/// `taxonomy` is expected to be restricted to the dataset's columns already.
pub fn frequency_chart(
    dataset: &Dataset,
    taxonomy: &Taxonomy,
    aliases: &AliasTable,
    company: &str,
    selector: CategorySelector,
    n: usize,
) -> FrequencyChart {
    let indicators = taxonomy.indicators(selector);
    let top = top_indicators(dataset, company, &indicators, n);
    debug!(
        "Top {} {} indicators for {}: {:?}",
        n,
        selector.as_str(),
        company,
        top.iter().map(|t| t.indicator.as_str()).collect::<Vec<_>>()
    );

    let mut rows: Vec<_> = dataset
        .records()
        .iter()
        .filter(|r| r.company == company)
        .collect();
    // Stable, so same-year reports keep file order.
    rows.sort_by_key(|r| r.year);

    let series = top
        .into_iter()
        .filter_map(|entry| {
            let column = dataset.column_index(&entry.indicator)?;
            Some(IndicatorSeries {
                label: series_label(&entry.indicator, selector, taxonomy, aliases),
                category: taxonomy.category_of(&entry.indicator),
                total: entry.total,
                points: rows
                    .iter()
                    .map(|r| SeriesPoint {
                        year: r.year,
                        value: r.value(column),
                    })
                    .collect(),
                indicator: entry.indicator,
            })
        })
        .collect();

    FrequencyChart {
        company: company.to_string(),
        selector,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::testing::{dataset_from, fixture_aliases, fixture_dataset, fixture_taxonomy};

    fn total(indicator: &str, total: f64) -> IndicatorTotal {
        IndicatorTotal {
            indicator: indicator.to_string(),
            total,
        }
    }

    #[test]
    fn test_rank_drops_only_the_smallest() {
        let totals = vec![
            total("f", 0.0),
            total("a", 10.0),
            total("d", 7.0),
            total("c", 7.0),
            total("b", 3.0),
            total("e", 1.0),
        ];

        let top = rank_totals(totals, 5);

        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|t| t.total != 0.0));
        assert!(top.windows(2).all(|w| w[0].total >= w[1].total));
        // Equal totals are ordered by name.
        assert_eq!(top[1].indicator, "c");
        assert_eq!(top[2].indicator, "d");
    }

    #[test]
    fn test_totals_skip_nulls() {
        let dataset = fixture_dataset();
        let indicators = vec!["total_ghg_emissions".to_string(), "scope_2".to_string()];

        let totals = indicator_totals(&dataset, "Acme Energy", &indicators);

        // 1 + 2 + NA
        assert_eq!(totals[0], total("total_ghg_emissions", 3.0));
        // 2 + empty + 3
        assert_eq!(totals[1], total("scope_2", 5.0));
    }

    #[test]
    fn test_totals_ignore_missing_columns() {
        let dataset = fixture_dataset();
        let indicators = vec!["scope_3".to_string(), "scope_1".to_string()];

        let totals = indicator_totals(&dataset, "Acme Energy", &indicators);

        assert_eq!(totals, vec![total("scope_1", 15.0)]);
    }

    #[test]
    fn test_frequency_chart_all_categories() {
        let dataset = fixture_dataset();
        let chart = frequency_chart(
            &dataset,
            &fixture_taxonomy(),
            &fixture_aliases(),
            "Acme Energy",
            CategorySelector::All,
            5,
        );

        assert_eq!(chart.series.len(), 5);
        let first = &chart.series[0];
        assert_eq!(first.indicator, "scope_1");
        assert_eq!(first.label, "Scope 1 Emissions (E)");
        assert_eq!(
            first.points.iter().map(|p| p.year).collect::<Vec<_>>(),
            vec![2019, 2020, 2021]
        );
        assert_eq!(chart.series[1].indicator, "number_of_employees");
        assert_eq!(chart.series[1].label, "Headcount (S)");
    }

    #[test]
    fn test_frequency_chart_single_category_has_no_tag() {
        let dataset = fixture_dataset();
        let chart = frequency_chart(
            &dataset,
            &fixture_taxonomy(),
            &fixture_aliases(),
            "Acme Energy",
            CategorySelector::Governance,
            5,
        );

        let labels: Vec<_> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["disclosure_on_corruption_and_bribery", "Whistleblower Protection"]
        );
    }

    #[test]
    fn test_frequency_chart_keeps_gaps() {
        let dataset = fixture_dataset();
        let chart = frequency_chart(
            &dataset,
            &fixture_taxonomy(),
            &fixture_aliases(),
            "Acme Energy",
            CategorySelector::Environmental,
            5,
        );

        let ghg = chart
            .series
            .iter()
            .find(|s| s.indicator == "total_ghg_emissions")
            .unwrap();
        assert_eq!(ghg.points[2], SeriesPoint { year: 2021, value: None });
    }

    #[test]
    fn test_frequency_chart_unknown_company() {
        let dataset = fixture_dataset();
        let chart = frequency_chart(
            &dataset,
            &fixture_taxonomy(),
            &AliasTable::empty(),
            "Nobody Inc",
            CategorySelector::All,
            5,
        );

        assert!(chart.series.iter().all(|s| s.points.is_empty()));
        assert!(chart.years().is_empty());
    }

    #[test]
    fn test_points_follow_year_order() {
        let dataset = dataset_from(
            "company,year,scope_1\n\
             Acme,2022,3\n\
             Acme,2020,1\n\
             Acme,2021,2\n",
        );
        let taxonomy = Taxonomy::default().restrict_to(dataset.columns());
        let chart = frequency_chart(
            &dataset,
            &taxonomy,
            &AliasTable::empty(),
            "Acme",
            CategorySelector::All,
            5,
        );

        let values: Vec<_> = chart.series[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }
}
