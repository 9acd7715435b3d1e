//! Fitted label tables
//!
//! A label table is the sorted, de-duplicated list of class strings a
//! categorical column was fitted on. Code `i` is the `i`-th class. Encoding
//! an unseen string is an error; there is no fallback code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::{GiziError, Result};

/// Artifact key of the sex table.
pub const SEX_TABLE: &str = "Jenis Kelamin";

/// Artifact key of the nutrition status table.
pub const STATUS_TABLE: &str = "Status Gizi";

/// A fitted, immutable mapping between category strings and integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    name: String,
    classes: Vec<String>,
}

impl LabelTable {
    /// Build a table from its fitted classes.
    ///
    /// Classes must be non-empty, strictly ascending and therefore unique,
    /// which is the shape a fitted encoder always has.
    pub fn new(name: impl Into<String>, classes: Vec<String>) -> Result<Self> {
        let name = name.into();
        if classes.is_empty() {
            return Err(GiziError::InvalidTable {
                table: name,
                reason: "no classes".to_string(),
            });
        }
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(GiziError::InvalidTable {
                table: name,
                reason: format!(
                    "classes must be sorted and unique ('{}' before '{}')",
                    pair[0], pair[1]
                ),
            });
        }
        Ok(Self { name, classes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Map a category string to its fitted code.
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| GiziError::UnknownCategory {
                table: self.name.clone(),
                label: label.to_string(),
            })
    }

    /// Map a fitted code back to its category string.
    pub fn decode(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| GiziError::UnknownCode {
                table: self.name.clone(),
                code,
            })
    }

    /// Encode a whole column, failing on the first unseen label.
    pub fn encode_all<'a, I>(&self, labels: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels.into_iter().map(|label| self.encode(label)).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FittedClasses {
    classes: Vec<String>,
}

/// The pair of tables the classifier was trained with.
#[derive(Debug, Clone)]
pub struct LabelTables {
    pub sex: LabelTable,
    pub status: LabelTable,
}

impl LabelTables {
    pub fn new(sex: LabelTable, status: LabelTable) -> Self {
        Self { sex, status }
    }

    /// Parse the encoder artifact, a JSON object keyed by column name.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut raw: BTreeMap<String, FittedClasses> = serde_json::from_str(json)?;
        let mut take = |name: &str| -> Result<LabelTable> {
            let fitted = raw
                .remove(name)
                .ok_or_else(|| GiziError::MissingTable(name.to_string()))?;
            LabelTable::new(name, fitted.classes)
        };
        let sex = take(SEX_TABLE)?;
        let status = take(STATUS_TABLE)?;
        Ok(Self { sex, status })
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let raw: BTreeMap<&str, FittedClasses> = [&self.sex, &self.status]
            .into_iter()
            .map(|table| {
                (
                    table.name(),
                    FittedClasses {
                        classes: table.classes().to_vec(),
                    },
                )
            })
            .collect();
        Ok(serde_json::to_string(&raw)?)
    }
}
