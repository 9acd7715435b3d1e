//! Input layer for the prediction form
//!
//! Form fields arrive as text and are checked here, before anything reaches
//! the core. Field names follow the form: `umur`, `jenis_kelamin`,
//! `tinggi_badan`.

use gizi_core::features::{AGE_MONTHS_RANGE, HEIGHT_CM_RANGE};
use gizi_core::{FeatureRecord, GiziError, Sex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Umur (bulan) harus bilangan bulat {min} sampai {max}")]
    Age { min: u32, max: u32 },

    #[error("Tinggi Badan (cm) harus angka {min} sampai {max}")]
    Height { min: String, max: String },

    #[error("Jenis Kelamin tidak dikenal: {0}")]
    Sex(String),

    #[error("{0}")]
    Invalid(String),
}

/// Raw HTML form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub umur: String,
    #[serde(default)]
    pub jenis_kelamin: String,
    #[serde(default)]
    pub tinggi_badan: String,
}

/// JSON prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub umur: u32,
    pub jenis_kelamin: String,
    pub tinggi_badan: f64,
}

impl PredictForm {
    pub fn to_record(&self) -> Result<FeatureRecord, FormError> {
        let age = self
            .umur
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| AGE_MONTHS_RANGE.contains(age))
            .ok_or_else(age_error)?;

        let height = self
            .tinggi_badan
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && HEIGHT_CM_RANGE.contains(h))
            .ok_or_else(height_error)?;

        let sex = parse_sex(&self.jenis_kelamin)?;
        build(age, sex, height)
    }
}

impl PredictRequest {
    pub fn to_record(&self) -> Result<FeatureRecord, FormError> {
        if !AGE_MONTHS_RANGE.contains(&self.umur) {
            return Err(age_error());
        }
        if !self.tinggi_badan.is_finite() || !HEIGHT_CM_RANGE.contains(&self.tinggi_badan) {
            return Err(height_error());
        }
        let sex = parse_sex(&self.jenis_kelamin)?;
        build(self.umur, sex, self.tinggi_badan)
    }
}

fn parse_sex(value: &str) -> Result<Sex, FormError> {
    value
        .parse::<Sex>()
        .map_err(|_| FormError::Sex(value.trim().to_string()))
}

fn build(age: u32, sex: Sex, height: f64) -> Result<FeatureRecord, FormError> {
    FeatureRecord::new(age, sex, height).map_err(|e: GiziError| FormError::Invalid(e.to_string()))
}

fn age_error() -> FormError {
    FormError::Age {
        min: *AGE_MONTHS_RANGE.start(),
        max: *AGE_MONTHS_RANGE.end(),
    }
}

fn height_error() -> FormError {
    FormError::Height {
        min: format!("{:.1}", HEIGHT_CM_RANGE.start()),
        max: format!("{:.1}", HEIGHT_CM_RANGE.end()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(umur: &str, jk: &str, tb: &str) -> PredictForm {
        PredictForm {
            umur: umur.to_string(),
            jenis_kelamin: jk.to_string(),
            tinggi_badan: tb.to_string(),
        }
    }

    #[test]
    fn test_bounds_accepted() {
        assert!(form("0", "Laki-laki", "30.0").to_record().is_ok());
        assert!(form("60", "Perempuan", "150").to_record().is_ok());
        assert!(form(" 24 ", "laki-laki", "85,5").to_record().is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            form("61", "Laki-laki", "80").to_record(),
            Err(FormError::Age { min: 0, max: 60 })
        );
        assert!(matches!(
            form("12", "Laki-laki", "150.1").to_record(),
            Err(FormError::Height { .. })
        ));
        assert!(matches!(
            form("1.5", "Laki-laki", "80").to_record(),
            Err(FormError::Age { .. })
        ));
        assert!(matches!(
            form("12", "pria", "80").to_record(),
            Err(FormError::Sex(_))
        ));
        assert!(form("", "", "").to_record().is_err());
    }

    #[test]
    fn test_json_request() {
        let request = PredictRequest {
            umur: 10,
            jenis_kelamin: "perempuan".to_string(),
            tinggi_badan: 60.0,
        };
        let record = request.to_record().unwrap();
        assert_eq!(record.sex(), Sex::Female);

        let request = PredictRequest {
            tinggi_badan: f64::INFINITY,
            ..request
        };
        assert!(request.to_record().is_err());
    }
}
