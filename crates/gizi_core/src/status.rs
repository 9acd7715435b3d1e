//! Nutrition status categories and their explanations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned by [`explain`] for any label outside the fixed table.
pub const EXPLANATION_UNAVAILABLE: &str = "Informasi tidak tersedia";

/// The classifier's output domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NutritionStatus {
    #[serde(rename = "Severely Stunted")]
    SeverelyStunted,
    #[serde(rename = "Stunted")]
    Stunted,
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Tinggi")]
    Tinggi,
}

const EXPLANATIONS: [(NutritionStatus, &str); 4] = [
    (
        NutritionStatus::SeverelyStunted,
        "Kondisi sangat serius (<-3 SD), anak mengalami kekurangan gizi yang parah dan memerlukan intervensi segera.",
    ),
    (
        NutritionStatus::Stunted,
        "Kondisi anak mengalami stunting (-3 SD hingga <-2 SD), yang berarti pertumbuhan terhambat dan memerlukan perhatian lebih.",
    ),
    (
        NutritionStatus::Normal,
        "Status gizi sehat (-2 SD hingga +3 SD), pertumbuhan anak sesuai dengan standar.",
    ),
    (
        NutritionStatus::Tinggi,
        "Pertumbuhan di atas rata-rata (>+3 SD), anak memiliki tinggi badan lebih dari standar untuk usianya.",
    ),
];

impl NutritionStatus {
    pub const ALL: [NutritionStatus; 4] = [
        NutritionStatus::SeverelyStunted,
        NutritionStatus::Stunted,
        NutritionStatus::Normal,
        NutritionStatus::Tinggi,
    ];

    /// Title-cased display label.
    pub fn label(self) -> &'static str {
        match self {
            NutritionStatus::SeverelyStunted => "Severely Stunted",
            NutritionStatus::Stunted => "Stunted",
            NutritionStatus::Normal => "Normal",
            NutritionStatus::Tinggi => "Tinggi",
        }
    }

    /// Match a display label exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }

    pub fn explanation(self) -> &'static str {
        EXPLANATIONS
            .iter()
            .find(|(status, _)| *status == self)
            .map(|(_, text)| *text)
            .unwrap_or(EXPLANATION_UNAVAILABLE)
    }
}

impl fmt::Display for NutritionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Explanation for a display label, or [`EXPLANATION_UNAVAILABLE`].
pub fn explain(label: &str) -> &'static str {
    NutritionStatus::from_label(label)
        .map(NutritionStatus::explanation)
        .unwrap_or(EXPLANATION_UNAVAILABLE)
}

/// Upper-case the first letter of every alphabetic run and lower-case the
/// rest, so `"severely stunted"` becomes `"Severely Stunted"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
