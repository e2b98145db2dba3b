use navigator_common::{NavigatorError, Result};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

use crate::record::UseCaseRecord;
use crate::slug::slugify;

/// Columns every dataset must carry
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "company",
    "use_case_name",
    "business_function",
    "ai_type",
    "outcome",
    "source_link",
];

/// Header positions resolved once per file
struct ColumnMap {
    company: usize,
    use_case_name: usize,
    business_function: usize,
    ai_type: usize,
    outcome: usize,
    source_link: usize,
    business_function_slug: Option<usize>,
    ai_type_slug: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |name: &str| names.iter().position(|h| h == name);

        let found = REQUIRED_COLUMNS.map(position);
        let [Some(company), Some(use_case_name), Some(business_function), Some(ai_type), Some(outcome), Some(source_link)] =
            found
        else {
            let missing: Vec<&str> = REQUIRED_COLUMNS
                .iter()
                .zip(found)
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| *name)
                .collect();
            return Err(NavigatorError::data_load(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            company,
            use_case_name,
            business_function,
            ai_type,
            outcome,
            source_link,
            business_function_slug: position("business_function_slug"),
            ai_type_slug: position("ai_type_slug"),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> UseCaseRecord {
        let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();

        let business_function = field(self.business_function);
        let ai_type = field(self.ai_type);

        // Fall back to the slug rule when the column or the cell is blank
        let slug_or_derive = |idx: Option<usize>, source: &str| {
            idx.map(field)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| slugify(source))
        };

        UseCaseRecord {
            company: field(self.company),
            use_case_name: field(self.use_case_name),
            business_function_slug: slug_or_derive(self.business_function_slug, &business_function),
            ai_type_slug: slug_or_derive(self.ai_type_slug, &ai_type),
            business_function,
            ai_type,
            outcome: field(self.outcome),
            source_link: field(self.source_link),
        }
    }
}

/// In-memory, read-only table of use case records
///
/// File order is preserved; a record's index is its key for the lifetime of
/// the process. Reloading builds a new store rather than mutating this one.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<UseCaseRecord>,
}

impl RecordStore {
    /// Load records from a CSV file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            error!("Data file not found: {}", path.display());
            return Err(NavigatorError::data_load("data file not found"));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            error!("Failed to open data file {}: {}", path.display(), e);
            NavigatorError::data_load("data file could not be opened")
        })?;

        let store = Self::from_reader(file).map_err(|e| {
            error!("Failed to load data file {}: {}", path.display(), e);
            e
        })?;

        info!("Loaded {} use cases from {}", store.count(), path.display());
        Ok(store)
    }

    /// Load records from any CSV byte stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| NavigatorError::data_load(format!("unreadable header row: {}", e)))?
            .clone();
        let columns = ColumnMap::resolve(&headers)?;

        let mut records = Vec::new();
        for (row_num, result) in reader.records().enumerate() {
            let row = result.map_err(|e| {
                NavigatorError::data_load(format!("failed to read row {}: {}", row_num + 1, e))
            })?;

            if row.iter().all(|cell| cell.trim().is_empty()) {
                warn!("Skipping blank row {}", row_num + 1);
                continue;
            }

            records.push(columns.record(&row));
        }

        Ok(Self { records })
    }

    /// Build a store from already validated records
    pub fn from_records(records: Vec<UseCaseRecord>) -> Self {
        Self { records }
    }

    /// Number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `position`
    pub fn get(&self, position: usize) -> Option<&UseCaseRecord> {
        self.records.get(position)
    }

    /// All records in file order
    pub fn records(&self) -> &[UseCaseRecord] {
        &self.records
    }

    /// Embedding input for the record at `position`
    pub fn text_for_embedding(&self, position: usize) -> Option<String> {
        self.get(position).map(UseCaseRecord::embedding_text)
    }

    /// Embedding inputs for every record, in store order
    pub fn embedding_texts(&self) -> Vec<String> {
        self.records.iter().map(UseCaseRecord::embedding_text).collect()
    }
}
