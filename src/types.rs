use std::fmt;

use serde::{Deserialize, Serialize};

/// Emission categories, in the fixed order used for display and tie-breaking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Transportation,
    Electricity,
    Diet,
    Waste,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Transportation,
        Category::Electricity,
        Category::Diet,
        Category::Waste,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Transportation => "Transportation",
            Category::Electricity => "Electricity",
            Category::Diet => "Diet",
            Category::Waste => "Waste",
        }
    }

    /// Unit of activity the country coefficient applies to.
    pub fn unit(self) -> &'static str {
        match self {
            Category::Transportation => "km",
            Category::Electricity => "kWh",
            Category::Diet => "meal",
            Category::Waste => "kg",
        }
    }

    /// Periods per year for the raw input: daily, monthly, daily, weekly.
    pub fn annual_multiplier(self) -> f64 {
        match self {
            Category::Transportation => 365.0,
            Category::Electricity => 12.0,
            Category::Diet => 365.0,
            Category::Waste => 52.0,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw form values for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputs {
    pub country: String,
    pub daily_distance_km: f64,
    pub monthly_electricity_kwh: f64,
    pub weekly_waste_kg: f64,
    pub meals_per_day: u32,
}

/// Annual emissions in tonnes CO2, each category rounded to 2 decimals.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEmissions {
    pub transportation: f64,
    pub electricity: f64,
    pub diet: f64,
    pub waste: f64,
    /// Sum of the rounded categories, rounded again.
    pub total: f64,
}

impl CategoryEmissions {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Transportation => self.transportation,
            Category::Electricity => self.electricity,
            Category::Diet => self.diet,
            Category::Waste => self.waste,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SciParameters {
    pub impact_factor: f64,
    pub mitigation_actions: f64,
    pub reduction_potential: f64,
}

/// SCI classification band. Lower scores are better.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum SciBand {
    Good,
    Average,
    Bad,
}

impl SciBand {
    pub fn classify(sci: f64) -> SciBand {
        if sci <= 1.0 {
            SciBand::Good
        } else if sci <= 3.0 {
            SciBand::Average
        } else {
            SciBand::Bad
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SciBand::Good => "Good",
            SciBand::Average => "Average",
            SciBand::Bad => "Bad",
        }
    }

    pub fn range_label(self) -> &'static str {
        match self {
            SciBand::Good => "0.0 - 1.0",
            SciBand::Average => "1.1 - 3.0",
            SciBand::Bad => "3.1 and above",
        }
    }

    /// Score table shown next to the SCI form.
    pub fn table() -> [(SciBand, &'static str); 3] {
        [SciBand::Good, SciBand::Average, SciBand::Bad].map(|b| (b, b.range_label()))
    }
}

impl fmt::Display for SciBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
