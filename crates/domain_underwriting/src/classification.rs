//! Underwriting classifications
//!
//! Eligibility, health class and table rating are all totally ordered from
//! best to worst. The derived `Ord` follows declaration order, so "worst of"
//! is simply `max` and combining verdicts never depends on input order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the applicant can be auto-issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Can be issued at the verdict's health class
    Eligible,
    /// Needs manual underwriting
    Refer,
    /// Cannot be issued
    Ineligible,
}

impl Eligibility {
    /// Returns the more conservative of two eligibility statuses
    pub fn worst(self, other: Eligibility) -> Eligibility {
        self.max(other)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Eligibility::Eligible => "eligible",
            Eligibility::Refer => "refer",
            Eligibility::Ineligible => "ineligible",
        };
        f.write_str(s)
    }
}

/// Insurability tier, declared best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthClass {
    PreferredPlus,
    Preferred,
    StandardPlus,
    Standard,
    Substandard,
    Refer,
    Unknown,
    Decline,
}

impl HealthClass {
    /// All classes, best first
    pub const ALL: [HealthClass; 8] = [
        HealthClass::PreferredPlus,
        HealthClass::Preferred,
        HealthClass::StandardPlus,
        HealthClass::Standard,
        HealthClass::Substandard,
        HealthClass::Refer,
        HealthClass::Unknown,
        HealthClass::Decline,
    ];

    /// Rank where 1 is best and higher is worse
    pub fn rank(&self) -> u8 {
        *self as u8 + 1
    }

    /// Returns the more conservative of two classes
    pub fn worst(self, other: HealthClass) -> HealthClass {
        self.max(other)
    }

    /// Display label used in reasons
    pub fn label(&self) -> &'static str {
        match self {
            HealthClass::PreferredPlus => "Preferred Plus",
            HealthClass::Preferred => "Preferred",
            HealthClass::StandardPlus => "Standard Plus",
            HealthClass::Standard => "Standard",
            HealthClass::Substandard => "Substandard",
            HealthClass::Refer => "Refer",
            HealthClass::Unknown => "Unknown",
            HealthClass::Decline => "Decline",
        }
    }
}

impl fmt::Display for HealthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Substandard table rating, `None` then `A` (best) through `P` (worst)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TableRating {
    #[default]
    #[serde(rename = "none")]
    None,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
}

impl TableRating {
    const LETTERS: [TableRating; 16] = [
        TableRating::A,
        TableRating::B,
        TableRating::C,
        TableRating::D,
        TableRating::E,
        TableRating::F,
        TableRating::G,
        TableRating::H,
        TableRating::I,
        TableRating::J,
        TableRating::K,
        TableRating::L,
        TableRating::M,
        TableRating::N,
        TableRating::O,
        TableRating::P,
    ];

    /// Table units: 0 for none, 1 for A up to 16 for P
    pub fn units(&self) -> u8 {
        *self as u8
    }

    /// Rating for a unit count; counts above 16 saturate at P
    pub fn from_units(units: u8) -> TableRating {
        match units {
            0 => TableRating::None,
            n => Self::LETTERS[(n.min(16) - 1) as usize],
        }
    }

    pub fn is_rated(&self) -> bool {
        *self != TableRating::None
    }
}

/// Applicant gender as used by rule filters and rate tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flat extra charge: dollars per $1,000 of face amount, for a number of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlatExtra {
    /// Annual charge per thousand of face amount
    pub per_thousand: Decimal,
    /// Duration of the charge in policy years
    #[serde(default = "default_flat_extra_years")]
    pub years: u32,
}

fn default_flat_extra_years() -> u32 {
    1
}

impl FlatExtra {
    pub fn new(per_thousand: Decimal, years: u32) -> Self {
        Self { per_thousand, years }
    }

    /// Total cost weight used to pick the single worst extra
    pub fn total_weight(&self) -> Decimal {
        self.per_thousand * Decimal::from(self.years)
    }
}
