use serde::{Deserialize, Serialize};

use crate::error::{CalculatorError, Result};
use crate::types::{SciParameters, UserInputs};

/// Hard upper bound on meals per day accepted by the engine.
pub const MAX_MEALS_PER_DAY: u32 = 10;

/// Form ranges for the raw inputs. Overridable from the `[limits]` config table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputLimits {
    pub max_daily_distance_km: f64,
    pub max_monthly_electricity_kwh: f64,
    pub max_weekly_waste_kg: f64,
    pub max_meals_per_day: u32,
    pub max_impact_factor: f64,
    pub max_mitigation_actions: f64,
    pub min_reduction_potential: f64,
    pub max_reduction_potential: f64,
}

impl Default for InputLimits {
    fn default() -> Self {
        InputLimits {
            max_daily_distance_km: 100.0,
            max_monthly_electricity_kwh: 1000.0,
            max_weekly_waste_kg: 100.0,
            max_meals_per_day: MAX_MEALS_PER_DAY,
            max_impact_factor: 10.0,
            max_mitigation_actions: 100.0,
            min_reduction_potential: 0.1,
            max_reduction_potential: 100.0,
        }
    }
}

impl InputLimits {
    pub fn validate(&self) -> Result<()> {
        let maxima = [
            ("max_daily_distance_km", self.max_daily_distance_km),
            ("max_monthly_electricity_kwh", self.max_monthly_electricity_kwh),
            ("max_weekly_waste_kg", self.max_weekly_waste_kg),
            ("max_impact_factor", self.max_impact_factor),
            ("max_mitigation_actions", self.max_mitigation_actions),
        ];
        for (field, value) in maxima {
            if !value.is_finite() || value < 0.0 {
                return Err(CalculatorError::InvalidLimits(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.max_meals_per_day > MAX_MEALS_PER_DAY {
            return Err(CalculatorError::InvalidLimits(format!(
                "max_meals_per_day must be at most {MAX_MEALS_PER_DAY}"
            )));
        }
        if !(self.min_reduction_potential.is_finite() && self.min_reduction_potential > 0.0) {
            return Err(CalculatorError::InvalidLimits(
                "min_reduction_potential must be > 0".into(),
            ));
        }
        if !(self.max_reduction_potential.is_finite()
            && self.max_reduction_potential >= self.min_reduction_potential)
        {
            return Err(CalculatorError::InvalidLimits(
                "max_reduction_potential must be >= min_reduction_potential".into(),
            ));
        }
        Ok(())
    }
}

/// Boundary checks for raw form values. Nothing here clamps; out-of-range
/// values are rejected.
pub struct InputGuard;

impl InputGuard {
    pub fn require_non_negative(field: &str, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(CalculatorError::InvalidInput(format!(
                "{field} must be a finite number"
            )));
        }
        if value < 0.0 {
            return Err(CalculatorError::InvalidInput(format!(
                "{field} must be non-negative, got {value}"
            )));
        }
        Ok(())
    }

    pub fn require_meals(meals_per_day: u32) -> Result<()> {
        if meals_per_day > MAX_MEALS_PER_DAY {
            return Err(CalculatorError::InvalidInput(format!(
                "meals_per_day must be between 0 and {MAX_MEALS_PER_DAY}, got {meals_per_day}"
            )));
        }
        Ok(())
    }

    fn require_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
        if !value.is_finite() || value < min || value > max {
            return Err(CalculatorError::InvalidInput(format!(
                "{field} must be between {min} and {max}, got {value}"
            )));
        }
        Ok(())
    }

    /// Form-level check of the emissions inputs against the widget ranges.
    pub fn validate_form(inputs: &UserInputs, limits: &InputLimits) -> Result<()> {
        if inputs.country.trim().is_empty() {
            return Err(CalculatorError::InvalidInput("country must not be empty".into()));
        }
        Self::require_range(
            "daily_distance_km",
            inputs.daily_distance_km,
            0.0,
            limits.max_daily_distance_km,
        )?;
        Self::require_range(
            "monthly_electricity_kwh",
            inputs.monthly_electricity_kwh,
            0.0,
            limits.max_monthly_electricity_kwh,
        )?;
        Self::require_range(
            "weekly_waste_kg",
            inputs.weekly_waste_kg,
            0.0,
            limits.max_weekly_waste_kg,
        )?;
        if inputs.meals_per_day > limits.max_meals_per_day {
            return Err(CalculatorError::InvalidInput(format!(
                "meals_per_day must be between 0 and {}, got {}",
                limits.max_meals_per_day, inputs.meals_per_day
            )));
        }
        Ok(())
    }

    pub fn validate_sci_form(params: &SciParameters, limits: &InputLimits) -> Result<()> {
        Self::require_range("impact_factor", params.impact_factor, 0.0, limits.max_impact_factor)?;
        Self::require_range(
            "mitigation_actions",
            params.mitigation_actions,
            0.0,
            limits.max_mitigation_actions,
        )?;
        Self::require_range(
            "reduction_potential",
            params.reduction_potential,
            limits.min_reduction_potential,
            limits.max_reduction_potential,
        )
    }

    pub fn parse_number(field: &str, raw: &str) -> Result<f64> {
        let value: f64 = raw.trim().parse().map_err(|_| {
            CalculatorError::InvalidInput(format!("{field} must be a number, got {raw:?}"))
        })?;
        Self::require_non_negative(field, value)?;
        Ok(value)
    }

    /// Parse a form field and check it against `[min, max]`.
    pub fn parse_bounded(field: &str, raw: &str, min: f64, max: f64) -> Result<f64> {
        let value = Self::parse_number(field, raw)?;
        Self::require_range(field, value, min, max)?;
        Ok(value)
    }

    pub fn parse_meals(raw: &str) -> Result<u32> {
        let meals: u32 = raw.trim().parse().map_err(|_| {
            CalculatorError::InvalidInput(format!(
                "meals_per_day must be a whole number, got {raw:?}"
            ))
        })?;
        Self::require_meals(meals)?;
        Ok(meals)
    }
}
