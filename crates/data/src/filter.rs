use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::UseCaseRecord;
use crate::slug::slugify;
use crate::store::RecordStore;

/// Sidebar filter selection
///
/// A facet set to `None`, blank or `"All"` does not restrict the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    /// Business function label or slug
    pub business_function: Option<String>,

    /// AI type label or slug
    pub ai_type: Option<String>,

    /// Case-insensitive keyword
    #[serde(alias = "q")]
    pub text: Option<String>,
}

impl FilterCriteria {
    fn facet_slug(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
            .map(slugify)
    }

    fn keyword(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

/// A record that passed the filters, with its store position
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilteredRecord<'a> {
    pub position: usize,
    pub record: &'a UseCaseRecord,
}

fn keyword_matches(record: &UseCaseRecord, needle: &str) -> bool {
    [
        &record.company,
        &record.use_case_name,
        &record.outcome,
        &record.business_function,
        &record.ai_type,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Apply facet and keyword filters, preserving store order
pub fn filter_records<'a>(store: &'a RecordStore, criteria: &FilterCriteria) -> Vec<FilteredRecord<'a>> {
    let business_function = FilterCriteria::facet_slug(&criteria.business_function);
    let ai_type = FilterCriteria::facet_slug(&criteria.ai_type);
    let keyword = criteria.keyword();

    store
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            business_function
                .as_deref()
                .map_or(true, |slug| r.business_function_slug == slug)
        })
        .filter(|(_, r)| ai_type.as_deref().map_or(true, |slug| r.ai_type_slug == slug))
        .filter(|(_, r)| keyword.as_deref().map_or(true, |k| keyword_matches(r, k)))
        .map(|(position, record)| FilteredRecord { position, record })
        .collect()
}

/// One selectable facet value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
    pub label: String,
    pub slug: String,
    pub count: usize,
}

/// Distinct values for both categorical fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct Facets {
    pub business_functions: Vec<FacetValue>,
    pub ai_types: Vec<FacetValue>,
}

fn collect_facet<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<FacetValue> {
    let mut values: BTreeMap<&str, FacetValue> = BTreeMap::new();

    for (label, slug) in pairs {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        values
            .entry(label)
            .or_insert_with(|| FacetValue {
                label: label.to_string(),
                slug: slug.to_string(),
                count: 0,
            })
            .count += 1;
    }

    values.into_values().collect()
}

/// Sorted distinct business functions and AI types with row counts
pub fn facets(store: &RecordStore) -> Facets {
    let records = store.records();

    Facets {
        business_functions: collect_facet(
            records
                .iter()
                .map(|r| (r.business_function.as_str(), r.business_function_slug.as_str())),
        ),
        ai_types: collect_facet(records.iter().map(|r| (r.ai_type.as_str(), r.ai_type_slug.as_str()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(company: &str, name: &str, function: &str, ai_type: &str, outcome: &str) -> UseCaseRecord {
        UseCaseRecord {
            company: company.to_string(),
            use_case_name: name.to_string(),
            business_function: function.to_string(),
            ai_type: ai_type.to_string(),
            outcome: outcome.to_string(),
            source_link: String::new(),
            business_function_slug: slugify(function),
            ai_type_slug: slugify(ai_type),
        }
    }

    fn store() -> RecordStore {
        RecordStore::from_records(vec![
            record("Unilever", "Resume screening", "Human Resources", "NLP", "Faster hiring"),
            record("Siemens", "Predictive maintenance", "Manufacturing", "Computer Vision", "Less downtime"),
            record("Vodafone", "Churn prediction", "Customer Service", "Machine Learning", "Lower churn"),
            record("IBM", "HR chatbot", "Human Resources", "NLP", "Answers employee questions"),
        ])
    }

    #[test]
    fn test_no_criteria_returns_everything_in_order() {
        let store = store();
        let result = filter_records(&store, &FilterCriteria::default());
        let positions: Vec<usize> = result.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_all_disables_facet() {
        let store = store();
        let criteria = FilterCriteria {
            business_function: Some("All".to_string()),
            ai_type: Some("all".to_string()),
            text: Some("  ".to_string()),
        };
        assert_eq!(filter_records(&store, &criteria).len(), 4);
    }

    #[test]
    fn test_facet_accepts_label_or_slug() {
        let store = store();

        let by_label = FilterCriteria {
            business_function: Some("Human Resources".to_string()),
            ..Default::default()
        };
        let by_slug = FilterCriteria {
            business_function: Some("human_resources".to_string()),
            ..Default::default()
        };

        let a: Vec<usize> = filter_records(&store, &by_label).iter().map(|r| r.position).collect();
        let b: Vec<usize> = filter_records(&store, &by_slug).iter().map(|r| r.position).collect();
        assert_eq!(a, vec![0, 3]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_keyword_is_case_insensitive_across_fields() {
        let store = store();
        let criteria = FilterCriteria {
            text: Some("CHURN".to_string()),
            ..Default::default()
        };
        let result = filter_records(&store, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.company, "Vodafone");

        let criteria = FilterCriteria {
            text: Some("manufact".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_records(&store, &criteria)[0].position, 1);
    }

    #[test]
    fn test_facets_combined_with_keyword() {
        let store = store();
        let criteria = FilterCriteria {
            business_function: Some("Human Resources".to_string()),
            ai_type: Some("NLP".to_string()),
            text: Some("chatbot".to_string()),
        };
        let result = filter_records(&store, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].position, 3);
    }

    #[test]
    fn test_facets_sorted_with_counts() {
        let facets = facets(&store());
        let labels: Vec<&str> = facets.business_functions.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Customer Service", "Human Resources", "Manufacturing"]);
        assert_eq!(facets.business_functions[1].count, 2);
        assert_eq!(facets.business_functions[1].slug, "human_resources");
        assert_eq!(facets.ai_types.len(), 3);
    }
}
