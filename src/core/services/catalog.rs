//! Rule catalog
//!
//! Static bands the detector checks records against: an expected amount band
//! per expense category and an expected age band per education level.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::models::{EducationLevel, ExpenseCategory};

/// Currency suffix used in descriptions
pub const CURRENCY: &str = "FCFA";

/// Expected amount band for one category, in FCFA
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountBand {
    /// Lowest unsurprising amount
    pub min: f64,
    /// Highest unsurprising amount
    pub max: f64,
}

impl AmountBand {
    /// Band accepted for categories the catalog does not list
    pub const FALLBACK: Self = Self::new(0.0, 100_000.0);

    /// Create a band
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Expected age band for one education level, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBand {
    /// Youngest unsurprising age
    pub min_age: u32,
    /// Oldest unsurprising age
    pub max_age: u32,
}

impl AgeBand {
    /// Create a band
    #[must_use]
    pub const fn new(min_age: u32, max_age: u32) -> Self {
        Self { min_age, max_age }
    }

    /// Whether `age` falls inside the band
    #[must_use]
    pub const fn contains(self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// Category and level bands consulted by the detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCatalog {
    amounts: BTreeMap<ExpenseCategory, AmountBand>,
    ages: BTreeMap<EducationLevel, AgeBand>,
    fallback: AmountBand,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleCatalog {
    /// Catalog with no bands at all: every category uses the fallback band
    /// and no level is checked
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            amounts: BTreeMap::new(),
            ages: BTreeMap::new(),
            fallback: AmountBand::FALLBACK,
        }
    }

    /// The field-survey bands
    #[must_use]
    pub fn standard() -> Self {
        use EducationLevel as L;
        use ExpenseCategory as C;

        Self::empty()
            .with_amount_band(C::Housing, AmountBand::new(5_000.0, 50_000.0))
            .with_amount_band(C::Food, AmountBand::new(2_000.0, 30_000.0))
            .with_amount_band(C::Transport, AmountBand::new(1_000.0, 20_000.0))
            .with_amount_band(C::Health, AmountBand::new(1_000.0, 100_000.0))
            .with_amount_band(C::Tuition, AmountBand::new(1_000.0, 50_000.0))
            .with_amount_band(C::Communication, AmountBand::new(500.0, 20_000.0))
            .with_amount_band(C::Clothing, AmountBand::new(1_000.0, 30_000.0))
            .with_amount_band(C::Leisure, AmountBand::new(500.0, 20_000.0))
            .with_amount_band(C::Other, AmountBand::new(0.0, 50_000.0))
            .with_age_band(L::Bachelor1, AgeBand::new(18, 25))
            .with_age_band(L::Bachelor2, AgeBand::new(19, 26))
            .with_age_band(L::Bachelor3, AgeBand::new(20, 27))
            .with_age_band(L::Master1, AgeBand::new(21, 30))
            .with_age_band(L::Master2, AgeBand::new(22, 31))
    }

    /// Set or replace the band for a category
    #[must_use]
    pub fn with_amount_band(mut self, category: ExpenseCategory, band: AmountBand) -> Self {
        self.amounts.insert(category, band);
        self
    }

    /// Set or replace the band for a level
    #[must_use]
    pub fn with_age_band(mut self, level: EducationLevel, band: AgeBand) -> Self {
        self.ages.insert(level, band);
        self
    }

    /// Replace the band used for unlisted categories
    #[must_use]
    pub fn with_fallback(mut self, band: AmountBand) -> Self {
        self.fallback = band;
        self
    }

    /// Band for a category, falling back to the catch-all band
    #[must_use]
    pub fn amount_band(&self, category: ExpenseCategory) -> AmountBand {
        self.amounts.get(&category).copied().unwrap_or(self.fallback)
    }

    /// Band for a level; `None` means the level is not checked
    #[must_use]
    pub fn age_band(&self, level: EducationLevel) -> Option<AgeBand> {
        self.ages.get(&level).copied()
    }

    /// The catch-all band
    #[must_use]
    pub const fn fallback(&self) -> AmountBand {
        self.fallback
    }
}
