//! Navigator dataset layer
//!
//! Use case records loaded from the curated CSV, slug rules, keyword and
//! facet filtering, and the offline cleaning tool that prepares the CSV.

pub mod cleaner;
mod filter;
mod record;
mod slug;
mod store;

pub use cleaner::{clean_csv, normalize_column_name, CleanReport};
pub use filter::{facets, filter_records, FacetValue, Facets, FilterCriteria, FilteredRecord};
pub use record::UseCaseRecord;
pub use slug::{format_slug, slugify};
pub use store::{RecordStore, REQUIRED_COLUMNS};
