//! Reference dataset loading
//!
//! Reads the static CSV the classifier was evaluated on. Columns are matched
//! by header name, accepting both the original Indonesian headers and short
//! snake_case names.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::errors::{GiziError, Result};
use crate::label::LabelTables;

/// One labelled row of the reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    #[serde(rename = "Umur (bulan)", alias = "age_months")]
    pub age_months: f64,

    #[serde(rename = "Jenis Kelamin", alias = "sex")]
    pub sex: String,

    #[serde(rename = "Tinggi Badan (cm)", alias = "height_cm")]
    pub height_cm: f64,

    #[serde(rename = "Status Gizi", alias = "status")]
    pub status: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    records: Vec<DatasetRecord>,
}

impl ReferenceDataset {
    pub fn new(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    /// Load dataset from CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse CSV with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut records = Vec::new();
        for (idx, row) in csv_reader.deserialize::<DatasetRecord>().enumerate() {
            let record = row.map_err(|e| GiziError::Dataset(format!("row {}: {}", idx + 1, e)))?;
            if !record.age_months.is_finite() || !record.height_cm.is_finite() {
                return Err(GiziError::Dataset(format!(
                    "row {}: non-finite numeric value",
                    idx + 1
                )));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(GiziError::Dataset("Dataset is empty".to_string()));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Get number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[DatasetRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Classifier rows, with the sex column encoded by the fitted table.
    pub fn feature_rows(&self, tables: &LabelTables) -> Result<Vec<Vec<f64>>> {
        self.records
            .iter()
            .map(|r| {
                let sex_code = tables.sex.encode(&r.sex)?;
                Ok(vec![r.age_months, sex_code as f64, r.height_cm])
            })
            .collect()
    }

    /// Status column encoded by the fitted table.
    pub fn status_codes(&self, tables: &LabelTables) -> Result<Vec<usize>> {
        tables
            .status
            .encode_all(self.records.iter().map(|r| r.status.as_str()))
    }

    /// Values of a numeric column.
    pub fn column(&self, column: NumericColumn) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| match column {
                NumericColumn::AgeMonths => r.age_months,
                NumericColumn::HeightCm => r.height_cm,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericColumn {
    AgeMonths,
    HeightCm,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 2] = [NumericColumn::AgeMonths, NumericColumn::HeightCm];

    pub fn header(self) -> &'static str {
        match self {
            NumericColumn::AgeMonths => "Umur (bulan)",
            NumericColumn::HeightCm => "Tinggi Badan (cm)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{LabelTable, SEX_TABLE, STATUS_TABLE};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tables() -> LabelTables {
        LabelTables::new(
            LabelTable::new(
                SEX_TABLE,
                vec!["laki-laki".to_string(), "perempuan".to_string()],
            )
            .unwrap(),
            LabelTable::new(
                STATUS_TABLE,
                vec!["normal".to_string(), "stunted".to_string()],
            )
            .unwrap(),
        )
    }

    fn create_test_csv() -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Umur (bulan),Jenis Kelamin,Tinggi Badan (cm),Status Gizi")?;
        writeln!(file, "0,laki-laki,44.6,stunted")?;
        writeln!(file, "12, perempuan ,74.2,normal")?;
        writeln!(file, "24,laki-laki,85.0,normal")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv().unwrap();
        let dataset = ReferenceDataset::from_csv(file.path()).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.records()[1].sex, "perempuan");
        assert_eq!(dataset.records()[2].height_cm, 85.0);
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(10).len(), 3);
    }

    #[test]
    fn test_short_headers_accepted() {
        let csv = "age_months,sex,height_cm,status\n6,perempuan,63.1,normal\n";
        let dataset = ReferenceDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0].age_months, 6.0);
        assert_eq!(dataset.records()[0].status, "normal");
    }

    #[test]
    fn test_encoded_columns() {
        let file = create_test_csv().unwrap();
        let dataset = ReferenceDataset::from_csv(file.path()).unwrap();
        let tables = tables();

        let rows = dataset.feature_rows(&tables).unwrap();
        assert_eq!(rows[1], vec![12.0, 1.0, 74.2]);
        assert_eq!(dataset.status_codes(&tables).unwrap(), vec![1, 0, 0]);
    }

    #[test]
    fn test_unknown_label_fails_encoding() {
        let csv = "age_months,sex,height_cm,status\n6,perempuan,63.1,gizi buruk\n";
        let dataset = ReferenceDataset::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            dataset.status_codes(&tables()),
            Err(GiziError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_empty_and_malformed() {
        let empty = "age_months,sex,height_cm,status\n";
        assert!(ReferenceDataset::from_reader(empty.as_bytes()).is_err());

        let bad = "age_months,sex,height_cm,status\nsix,perempuan,63.1,normal\n";
        assert!(matches!(
            ReferenceDataset::from_reader(bad.as_bytes()),
            Err(GiziError::Dataset(_))
        ));
    }
}
