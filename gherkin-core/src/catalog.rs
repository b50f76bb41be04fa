//! Read-only lookup tables: the keyword vocabulary and the Rx/Tx signal catalogs.
//!
//! Both are built once from YAML or JSON files and never mutated afterwards, so they can
//! be shared between sessions behind an `Arc`.
//!
//! Vocabulary file:
//!
//! ```yaml
//! key_column: Keyword
//! columns: [Id, Keyword, Signals, Usage]
//! rows:
//!   - [1, ignition is on, IgnitionStatus, Given]
//! ```
//!
//! Signal file:
//!
//! ```yaml
//! rx:
//!   - Object Content: VehicleSpeed
//!     Associated Network Signal: VehSpdAvgDrvn
//! tx: []
//! ```

use crate::table::CellValue;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("key column {0:?} is not one of the vocabulary columns")]
    UnknownKeyColumn(String),
    #[error("duplicate keyword in vocabulary: {0:?}")]
    DuplicateKeyword(String),
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&source)?),
        Some("json") => from_json_str(&source),
        _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Deserialize a JSON document.
///
/// The document is validated as JSON, then read through the YAML reader so that
/// [`CellValue`]s see the same scalar text they would in a YAML file. JSON numbers keep
/// their value but not their spelling (`2.50` reads as `2.5`); quote them to keep it.
pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(serde_yaml::from_str(&serde_yaml::to_string(&value)?)?)
}

// Vocabulary

#[derive(Debug, Deserialize)]
struct VocabularySource {
    #[serde(default = "default_key_column")]
    key_column: String,
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Option<CellValue>>>,
}

fn default_key_column() -> String {
    "Keyword".to_string()
}

/// One keyword and its detail values, aligned with [`Vocabulary::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub details: Vec<Option<CellValue>>,
}

/// Ordered keyword table with unique keys.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    columns: Vec<String>,
    entries: Vec<KeywordEntry>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let source: VocabularySource = load_file(path.as_ref())?;
        Self::from_source(source)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_source(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_source(from_json_str(json)?)
    }

    fn from_source(source: VocabularySource) -> Result<Self, CatalogError> {
        let key = source
            .columns
            .iter()
            .position(|c| *c == source.key_column)
            .ok_or_else(|| CatalogError::UnknownKeyColumn(source.key_column.clone()))?;

        let mut vocabulary = Vocabulary {
            columns: source.columns,
            ..Default::default()
        };
        for mut details in source.rows {
            details.resize(vocabulary.columns.len(), None);
            // Rows without a keyword are spreadsheet padding.
            let keyword = match &details[key] {
                Some(value) => value.to_string().trim().to_string(),
                None => continue,
            };
            if keyword.is_empty() {
                continue;
            }
            if vocabulary.index.contains_key(&keyword) {
                return Err(CatalogError::DuplicateKeyword(keyword));
            }
            vocabulary
                .index
                .insert(keyword.clone(), vocabulary.entries.len());
            vocabulary.entries.push(KeywordEntry { keyword, details });
        }
        tracing::debug!(keywords = vocabulary.len(), "vocabulary loaded");
        Ok(vocabulary)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Keywords in catalog order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordEntry> {
        self.index.get(keyword).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.index.contains_key(keyword)
    }

    pub fn detail(&self, keyword: &str, column: &str) -> Option<&CellValue> {
        let c = self.columns.iter().position(|name| name == column)?;
        self.get(keyword)?.details.get(c)?.as_ref()
    }

    /// Entries whose `column` renders as `value`.
    pub fn rows_where(&self, column: &str, value: &str) -> Vec<&KeywordEntry> {
        let Some(c) = self.columns.iter().position(|name| name == column) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| {
                e.details
                    .get(c)
                    .and_then(Option::as_ref)
                    .is_some_and(|v| v.to_string() == value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Signals

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSheet {
    Rx,
    Tx,
}

impl fmt::Display for SignalSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSheet::Rx => f.write_str("Rx"),
            SignalSheet::Tx => f.write_str("Tx"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalColumn {
    ObjectContent,
    AssociatedNetworkSignal,
}

impl fmt::Display for SignalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalColumn::ObjectContent => f.write_str("Object Content"),
            SignalColumn::AssociatedNetworkSignal => f.write_str("Associated Network Signal"),
        }
    }
}

const OBJECT_CONTENT: &str = "Object Content";
const ASSOCIATED_NETWORK_SIGNAL: &str = "Associated Network Signal";

/// One sheet row. Columns other than the two searched ones land in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<CellValue>>")]
pub struct SignalRow {
    pub object_content: String,
    pub associated_network_signal: String,
    pub extra: BTreeMap<String, Option<CellValue>>,
}

impl From<BTreeMap<String, Option<CellValue>>> for SignalRow {
    fn from(mut cells: BTreeMap<String, Option<CellValue>>) -> Self {
        let mut take = |column: &str| {
            cells
                .remove(column)
                .flatten()
                .map(|value| value.to_string())
                .unwrap_or_default()
        };
        let object_content = take(OBJECT_CONTENT);
        let associated_network_signal = take(ASSOCIATED_NETWORK_SIGNAL);
        SignalRow {
            object_content,
            associated_network_signal,
            extra: cells,
        }
    }
}

impl SignalRow {
    pub fn value(&self, column: SignalColumn) -> &str {
        match column {
            SignalColumn::ObjectContent => &self.object_content,
            SignalColumn::AssociatedNetworkSignal => &self.associated_network_signal,
        }
    }
}

/// Result of [`SignalCatalog::find_signal`]. A miss is an ordinary outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalLookup<'a> {
    Found {
        sheet: SignalSheet,
        column: SignalColumn,
        rows: Vec<&'a SignalRow>,
    },
    NotFound,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalCatalog {
    #[serde(default, alias = "Rx")]
    rx: Vec<SignalRow>,
    #[serde(default, alias = "Tx")]
    tx: Vec<SignalRow>,
}

const SEARCH_ORDER: [(SignalSheet, SignalColumn); 4] = [
    (SignalSheet::Rx, SignalColumn::ObjectContent),
    (SignalSheet::Rx, SignalColumn::AssociatedNetworkSignal),
    (SignalSheet::Tx, SignalColumn::ObjectContent),
    (SignalSheet::Tx, SignalColumn::AssociatedNetworkSignal),
];

impl SignalCatalog {
    pub fn new(rx: Vec<SignalRow>, tx: Vec<SignalRow>) -> Self {
        SignalCatalog { rx, tx }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let catalog: SignalCatalog = load_file(path.as_ref())?;
        tracing::debug!(rx = catalog.rx.len(), tx = catalog.tx.len(), "signal catalog loaded");
        Ok(catalog)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn sheet(&self, sheet: SignalSheet) -> &[SignalRow] {
        match sheet {
            SignalSheet::Rx => &self.rx,
            SignalSheet::Tx => &self.tx,
        }
    }

    /// Locate `name`, checking Rx before Tx and Object Content before Associated
    /// Network Signal. All rows of the first matching sheet/column are returned.
    pub fn find_signal(&self, name: &str) -> SignalLookup<'_> {
        if name.is_empty() {
            return SignalLookup::NotFound;
        }
        for (sheet, column) in SEARCH_ORDER {
            let rows: Vec<&SignalRow> = self
                .sheet(sheet)
                .iter()
                .filter(|row| row.value(column) == name)
                .collect();
            if !rows.is_empty() {
                return SignalLookup::Found { sheet, column, rows };
            }
        }
        SignalLookup::NotFound
    }

    /// Every distinct signal name, grouped in search order.
    pub fn all_signals(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for (sheet, column) in SEARCH_ORDER {
            let mut seen = HashSet::new();
            for row in self.sheet(sheet) {
                let value = row.value(column);
                if !value.is_empty() && seen.insert(value) {
                    names.push(value);
                }
            }
        }
        names
    }
}
