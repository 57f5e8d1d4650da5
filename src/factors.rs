use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};
use crate::guards::InputLimits;
use crate::types::Category;

/// Factor table shipped with the crate.
pub const DEFAULT_FACTORS_TOML: &str = include_str!("../config/emission_factors.toml");

/// Per-country coefficients in kgCO2 per unit (km, kWh, meal, kg).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFactors {
    pub transportation: f64,
    pub electricity: f64,
    pub diet: f64,
    pub waste: f64,
}

impl CountryFactors {
    pub fn coefficient(&self, category: Category) -> f64 {
        match category {
            Category::Transportation => self.transportation,
            Category::Electricity => self.electricity,
            Category::Diet => self.diet,
            Category::Waste => self.waste,
        }
    }
}

/// Published per-capita emissions used for comparison in reports.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCapitaReference {
    pub tonnes: f64,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name: String,
    pub factors: CountryFactors,
    pub per_capita_tonnes: Option<f64>,
    pub per_capita_year: Option<u16>,
}

impl CountryEntry {
    pub fn per_capita(&self) -> Option<PerCapitaReference> {
        match (self.per_capita_tonnes, self.per_capita_year) {
            (Some(tonnes), Some(year)) => Some(PerCapitaReference { tonnes, year }),
            _ => None,
        }
    }
}

/// Ordered, validated country to factor mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    entries: Vec<CountryEntry>,
}

impl FactorTable {
    /// Build a table, rejecting empty tables, duplicate or blank names and
    /// negative or non-finite coefficients.
    pub fn new(entries: Vec<CountryEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CalculatorError::InvalidFactorTable(
                "at least one country is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(CalculatorError::InvalidFactorTable(
                    "country name must not be empty".into(),
                ));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(CalculatorError::InvalidFactorTable(format!(
                    "duplicate country {}",
                    entry.name
                )));
            }
            for category in Category::ALL {
                let k = entry.factors.coefficient(category);
                if !k.is_finite() || k < 0.0 {
                    return Err(CalculatorError::InvalidFactorTable(format!(
                        "{} {} factor (kgCO2/{}) must be a non-negative number, got {k}",
                        entry.name,
                        category,
                        category.unit()
                    )));
                }
            }
            if let Some(t) = entry.per_capita_tonnes {
                if !t.is_finite() || t < 0.0 {
                    return Err(CalculatorError::InvalidFactorTable(format!(
                        "{} per-capita reference must be non-negative",
                        entry.name
                    )));
                }
            }
            if entry.per_capita_tonnes.is_some() != entry.per_capita_year.is_some() {
                return Err(CalculatorError::InvalidFactorTable(format!(
                    "{} per_capita_tonnes and per_capita_year must be given together",
                    entry.name
                )));
            }
        }
        Ok(FactorTable { entries })
    }

    pub fn entry(&self, country: &str) -> Result<&CountryEntry> {
        self.entries
            .iter()
            .find(|e| e.name == country)
            .ok_or_else(|| CalculatorError::UnknownCountry(country.to_string()))
    }

    pub fn factors(&self, country: &str) -> Result<&CountryFactors> {
        self.entry(country).map(|e| &e.factors)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One `[[country]]` table as written in the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountryRow {
    name: String,
    transportation: f64,
    electricity: f64,
    diet: f64,
    waste: f64,
    per_capita_tonnes: Option<f64>,
    per_capita_year: Option<u16>,
}

impl From<CountryRow> for CountryEntry {
    fn from(row: CountryRow) -> Self {
        CountryEntry {
            name: row.name,
            factors: CountryFactors {
                transportation: row.transportation,
                electricity: row.electricity,
                diet: row.diet,
                waste: row.waste,
            },
            per_capita_tonnes: row.per_capita_tonnes,
            per_capita_year: row.per_capita_year,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    country: Vec<CountryRow>,
    #[serde(default)]
    limits: InputLimits,
}

/// Everything the calculator reads from its TOML config.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    pub factors: FactorTable,
    pub limits: InputLimits,
}

impl CalculatorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        file.limits.validate()?;
        let entries = file.country.into_iter().map(CountryEntry::from).collect();
        Ok(CalculatorConfig {
            factors: FactorTable::new(entries)?,
            limits: file.limits,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CalculatorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            countries = config.factors.len(),
            "loaded emission factor table"
        );
        Ok(config)
    }

    /// The table compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_FACTORS_TOML)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_has_ten_countries_in_order() {
        let config = CalculatorConfig::embedded().unwrap();
        let names: Vec<_> = config.factors.countries().collect();
        assert_eq!(
            names,
            [
                "India",
                "USA",
                "China",
                "Germany",
                "Brazil",
                "Australia",
                "UK",
                "Japan",
                "Canada",
                "France"
            ]
        );
        assert_eq!(config.limits, InputLimits::default());
    }

    #[test]
    fn test_embedded_values() {
        let config = CalculatorConfig::embedded().unwrap();
        let usa = config.factors.factors("USA").unwrap();
        assert_eq!(usa.transportation, 0.22);
        assert_eq!(usa.electricity, 0.45);
        assert_eq!(usa.diet, 0.9);
        assert_eq!(usa.waste, 1.2);

        let india = config.factors.entry("India").unwrap();
        assert_eq!(
            india.per_capita(),
            Some(PerCapitaReference {
                tonnes: 1.9,
                year: 2021
            })
        );
        assert_eq!(config.factors.entry("France").unwrap().per_capita(), None);
    }

    #[test]
    fn test_every_embedded_factor_non_negative() {
        let config = CalculatorConfig::embedded().unwrap();
        for entry in config.factors.entries() {
            for category in Category::ALL {
                assert!(entry.factors.coefficient(category) >= 0.0);
            }
        }
    }

    #[test]
    fn test_unknown_country() {
        let config = CalculatorConfig::embedded().unwrap();
        assert!(matches!(
            config.factors.factors("Atlantis"),
            Err(CalculatorError::UnknownCountry(name)) if name == "Atlantis"
        ));
    }

    #[test]
    fn test_rejects_negative_factor() {
        let raw = r#"
            [[country]]
            name = "Nowhere"
            transportation = 0.1
            electricity = -0.2
            diet = 0.3
            waste = 0.4
        "#;
        assert!(matches!(
            CalculatorConfig::from_toml_str(raw),
            Err(CalculatorError::InvalidFactorTable(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_and_missing_keys() {
        let dup = r#"
            [[country]]
            name = "A"
            transportation = 0.1
            electricity = 0.2
            diet = 0.3
            waste = 0.4

            [[country]]
            name = "A"
            transportation = 0.1
            electricity = 0.2
            diet = 0.3
            waste = 0.4
        "#;
        assert!(matches!(
            CalculatorConfig::from_toml_str(dup),
            Err(CalculatorError::InvalidFactorTable(_))
        ));

        let missing = r#"
            [[country]]
            name = "A"
            transportation = 0.1
            electricity = 0.2
            diet = 0.3
        "#;
        assert!(matches!(
            CalculatorConfig::from_toml_str(missing),
            Err(CalculatorError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_limits_override() {
        let raw = r#"
            [[country]]
            name = "A"
            transportation = 0.1
            electricity = 0.2
            diet = 0.3
            waste = 0.4

            [limits]
            max_daily_distance_km = 250.0
        "#;
        let config = CalculatorConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.limits.max_daily_distance_km, 250.0);
        assert_eq!(config.limits.max_weekly_waste_kg, 100.0);
    }

    #[test]
    fn test_bad_limits_table_is_config_error() {
        let raw = r#"
            [[country]]
            name = "A"
            transportation = 0.1
            electricity = 0.2
            diet = 0.3
            waste = 0.4

            [limits]
            min_reduction_potential = 0.0
        "#;
        assert!(matches!(
            CalculatorConfig::from_toml_str(raw),
            Err(CalculatorError::InvalidLimits(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = CalculatorConfig::from_path("/nonexistent/factors.toml").unwrap_err();
        assert!(matches!(err, CalculatorError::ConfigRead { .. }));
    }
}
