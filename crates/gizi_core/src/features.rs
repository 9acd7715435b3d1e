//! Feature records and their encoded form
//!
//! The classifier was trained on exactly three columns in a fixed order:
//! age in months, the fitted sex code, and height in centimetres.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::errors::{GiziError, Result};
use crate::label::LabelTables;

/// Trained column names, in trained order.
pub const FEATURE_COLUMNS: [&str; 3] = ["Umur (bulan)", "Jenis Kelamin", "Tinggi Badan (cm)"];

/// Number of classifier input columns.
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Accepted age range in months.
pub const AGE_MONTHS_RANGE: RangeInclusive<u32> = 0..=60;

/// Accepted height range in centimetres.
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 30.0..=150.0;

/// Height input granularity in centimetres.
pub const HEIGHT_CM_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "laki-laki")]
    Male,
    #[serde(rename = "perempuan")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Label shown on the form.
    pub fn display_label(self) -> &'static str {
        match self {
            Sex::Male => "Laki-laki",
            Sex::Female => "Perempuan",
        }
    }

    /// Label the sex table was fitted on.
    pub fn raw_label(self) -> &'static str {
        match self {
            Sex::Male => "laki-laki",
            Sex::Female => "perempuan",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl FromStr for Sex {
    type Err = GiziError;

    /// Accepts the display or the raw label, ignoring case and surrounding
    /// whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Sex::ALL
            .into_iter()
            .find(|sex| {
                sex.raw_label().eq_ignore_ascii_case(wanted)
                    || sex.display_label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| GiziError::InvalidInput(format!("unknown sex '{wanted}'")))
    }
}

/// Raw user input for a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    age_months: u32,
    sex: Sex,
    height_cm: f64,
}

impl FeatureRecord {
    /// Validate the numeric bounds and build a record.
    pub fn new(age_months: u32, sex: Sex, height_cm: f64) -> Result<Self> {
        if !AGE_MONTHS_RANGE.contains(&age_months) {
            return Err(GiziError::InvalidInput(format!(
                "age {} months is outside {}..={}",
                age_months,
                AGE_MONTHS_RANGE.start(),
                AGE_MONTHS_RANGE.end()
            )));
        }
        if !height_cm.is_finite() || !HEIGHT_CM_RANGE.contains(&height_cm) {
            return Err(GiziError::InvalidInput(format!(
                "height {} cm is outside {:.1}..={:.1}",
                height_cm,
                HEIGHT_CM_RANGE.start(),
                HEIGHT_CM_RANGE.end()
            )));
        }
        Ok(Self {
            age_months,
            sex,
            height_cm,
        })
    }

    pub fn age_months(&self) -> u32 {
        self.age_months
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// Replace the sex label with its fitted code.
    pub fn encode(&self, tables: &LabelTables) -> Result<EncodedFeatures> {
        let sex_code = tables.sex.encode(self.sex.raw_label())?;
        Ok(EncodedFeatures {
            age_months: f64::from(self.age_months),
            sex_code,
            height_cm: self.height_cm,
        })
    }
}

/// Classifier input: a feature record with the sex column encoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncodedFeatures {
    pub age_months: f64,
    pub sex_code: usize,
    pub height_cm: f64,
}

impl EncodedFeatures {
    /// Columns in trained order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [self.age_months, self.sex_code as f64, self.height_cm]
    }
}
