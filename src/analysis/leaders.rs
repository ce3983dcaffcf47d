//! Per-company category scores within an industry.
//!
//! For every report the number of disclosed (non-null) indicators is counted
//! per category. Those counts are averaged per company, rounded, summed and
//! ranked.

use crate::dataset::Dataset;
use crate::models::{Category, CompanyScore, LeaderBoard};
use crate::taxonomy::Taxonomy;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Disclosed-indicator counts of a single report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCounts {
    pub company: String,
    pub year: i32,
    pub environmental: usize,
    pub social: usize,
    pub governance: usize,
}

impl RowCounts {
    fn count(&self, category: Category) -> usize {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }
}

/// Count disclosed indicators per category for every report in an industry.
///
/// Returns new values; the dataset is left untouched.
pub fn row_counts(dataset: &Dataset, taxonomy: &Taxonomy, industry: &str) -> Vec<RowCounts> {
    let columns: HashMap<Category, Vec<usize>> = Category::ALL
        .iter()
        .map(|c| (*c, dataset.column_indices(taxonomy.list(*c))))
        .collect();
    let disclosed = |record: &crate::dataset::DisclosureRecord, category: Category| {
        columns[&category]
            .iter()
            .filter(|&&col| record.value(col).is_some())
            .count()
    };

    dataset
        .records()
        .iter()
        .filter(|r| r.industry.as_deref() == Some(industry))
        .map(|r| RowCounts {
            company: r.company.clone(),
            year: r.year,
            environmental: disclosed(r, Category::Environmental),
            social: disclosed(r, Category::Social),
            governance: disclosed(r, Category::Governance),
        })
        .collect()
}

#[derive(Default)]
struct CompanyAccumulator {
    reports: usize,
    sums: [usize; 3],
    years: BTreeSet<i32>,
}

/// Round half to even.
fn round_score(mean: f64) -> u32 {
    mean.round_ties_even().max(0.0) as u32
}

/// Rank companies of an industry by their average disclosure counts.
///
/// Companies with fewer than `min_years` distinct reporting years are left
/// out. Ranking is by Total, then E, then years reported (all descending),
/// then by company name.
pub fn category_scores(
    dataset: &Dataset,
    taxonomy: &Taxonomy,
    industry: &str,
    min_years: usize,
) -> LeaderBoard {
    let counts = row_counts(dataset, taxonomy, industry);

    // Keep first-seen company order for deterministic grouping.
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, CompanyAccumulator> = HashMap::new();
    for row in &counts {
        let acc = groups.entry(row.company.as_str()).or_insert_with(|| {
            order.push(row.company.as_str());
            CompanyAccumulator::default()
        });
        acc.reports += 1;
        for (i, category) in Category::ALL.iter().enumerate() {
            acc.sums[i] += row.count(*category);
        }
        acc.years.insert(row.year);
    }

    let mut companies: Vec<CompanyScore> = order
        .into_iter()
        .filter_map(|company| {
            let acc = groups.get(company)?;
            if acc.years.len() < min_years {
                debug!(
                    "Skipping {} ({} years reported, {} required)",
                    company,
                    acc.years.len(),
                    min_years
                );
                return None;
            }
            let mean = |i: usize| round_score(acc.sums[i] as f64 / acc.reports as f64);
            let (environmental, social, governance) = (mean(0), mean(1), mean(2));
            Some(CompanyScore {
                company: company.to_string(),
                environmental,
                social,
                governance,
                years_reported: acc.years.len(),
                total: environmental + social + governance,
            })
        })
        .collect();

    companies.sort_by(|a, b| {
        (Reverse(a.total), Reverse(a.environmental), Reverse(a.years_reported))
            .cmp(&(Reverse(b.total), Reverse(b.environmental), Reverse(b.years_reported)))
            .then_with(|| a.company.cmp(&b.company))
    });

    LeaderBoard {
        industry: industry.to_string(),
        min_years_reported: min_years,
        companies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::testing::{dataset_from, fixture_dataset, fixture_taxonomy};

    fn taxonomy_for(dataset: &Dataset) -> Taxonomy {
        Taxonomy::default().restrict_to(dataset.columns())
    }

    #[test]
    fn test_row_counts_count_non_null_cells() {
        let dataset = fixture_dataset();
        let counts = row_counts(&dataset, &fixture_taxonomy(), "Energy");

        assert_eq!(counts.len(), 5);
        // Acme 2019: scope_1, scope_2, ghg | employees | whistleblowing
        assert_eq!(
            counts[0],
            RowCounts {
                company: "Acme Energy".to_string(),
                year: 2019,
                environmental: 3,
                social: 1,
                governance: 1,
            }
        );
        // Acme 2021: a 0 is still a disclosure, NA is not.
        assert_eq!(counts[2].environmental, 2);
        assert_eq!(counts[2].governance, 2);
    }

    #[test]
    fn test_fixture_leaders() {
        let dataset = fixture_dataset();
        let board = category_scores(&dataset, &fixture_taxonomy(), "Energy", 3);

        // Borealis only reported 2 years.
        assert_eq!(board.companies.len(), 1);
        let acme = &board.companies[0];
        assert_eq!(acme.company, "Acme Energy");
        // E: (3 + 2 + 2) / 3 = 2.33, S: (1 + 2 + 2) / 3 = 1.67, G: (1 + 2 + 2) / 3 = 1.67
        assert_eq!((acme.environmental, acme.social, acme.governance), (2, 2, 2));
        assert_eq!(acme.total, 6);
        assert_eq!(acme.years_reported, 3);
    }

    #[test]
    fn test_year_threshold_boundary() {
        let dataset = dataset_from(
            "company,industry,year,scope_1\n\
             Two,Energy,2020,1\n\
             Two,Energy,2021,1\n\
             Three,Energy,2019,1\n\
             Three,Energy,2020,1\n\
             Three,Energy,2021,1\n",
        );
        let board = category_scores(&dataset, &taxonomy_for(&dataset), "Energy", 3);

        let names: Vec<_> = board.companies.iter().map(|c| c.company.as_str()).collect();
        assert_eq!(names, vec!["Three"]);
    }

    #[test]
    fn test_years_are_distinct() {
        // Three reports, but only two distinct years.
        let dataset = dataset_from(
            "company,industry,year,scope_1\n\
             Dup,Energy,2020,1\n\
             Dup,Energy,2020,1\n\
             Dup,Energy,2021,1\n",
        );
        let board = category_scores(&dataset, &taxonomy_for(&dataset), "Energy", 3);

        assert!(board.companies.is_empty());
    }

    #[test]
    fn test_sort_breaks_ties_by_years_reported() {
        // Both average E=1, S=1 (Total=2); Long reported four years.
        let dataset = dataset_from(
            "company,industry,year,scope_1,number_of_employees\n\
             Short,Energy,2019,1,1\n\
             Short,Energy,2020,1,1\n\
             Short,Energy,2021,1,1\n\
             Long,Energy,2018,1,1\n\
             Long,Energy,2019,1,1\n\
             Long,Energy,2020,1,1\n\
             Long,Energy,2021,1,1\n",
        );
        let board = category_scores(&dataset, &taxonomy_for(&dataset), "Energy", 3);

        let names: Vec<_> = board.companies.iter().map(|c| c.company.as_str()).collect();
        assert_eq!(names, vec!["Long", "Short"]);
    }

    #[test]
    fn test_sort_prefers_environmental_on_equal_total() {
        let dataset = dataset_from(
            "company,industry,year,scope_1,scope_2,number_of_employees,number_of_board_members\n\
             Social,Energy,2019,1,,1,1\n\
             Social,Energy,2020,1,,1,1\n\
             Social,Energy,2021,1,,1,1\n\
             Green,Energy,2019,1,1,1,\n\
             Green,Energy,2020,1,1,1,\n\
             Green,Energy,2021,1,1,1,\n",
        );
        let board = category_scores(&dataset, &taxonomy_for(&dataset), "Energy", 3);

        assert_eq!(board.companies[0].company, "Green");
        assert_eq!(board.companies[0].total, board.companies[1].total);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_score(2.5), 2);
        assert_eq!(round_score(3.5), 4);
        assert_eq!(round_score(1.67), 2);
    }

    #[test]
    fn test_unknown_industry() {
        let dataset = fixture_dataset();
        let board = category_scores(&dataset, &fixture_taxonomy(), "Aerospace", 3);

        assert!(board.companies.is_empty());
        assert_eq!(board.title(), "Average ESG Indicators Disclosed by Firms (Aerospace)");
    }
}
