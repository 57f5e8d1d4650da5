use crate::error::{CalculatorError, Result};
use crate::factors::{CalculatorConfig, FactorTable};
use crate::guards::InputGuard;
use crate::types::{Category, CategoryEmissions, SciParameters, UserInputs};

const KG_PER_TONNE: f64 = 1000.0;

/// Round to 2 decimals, half away from zero, on the shortest decimal form of
/// `value`. 1.295 becomes 1.30 even though its binary value lies just below.
pub fn round_2dp(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= 2 {
        return value;
    }
    let digits = frac_part.as_bytes();
    let cents = u64::from((digits[0] - b'0') * 10 + (digits[1] - b'0'));
    let hundredths = int_part
        .parse::<u64>()
        .ok()
        .and_then(|i| i.checked_mul(100))
        .and_then(|i| i.checked_add(cents));
    let Some(mut hundredths) = hundredths else {
        return value;
    };
    if digits[2] >= b'5' {
        hundredths += 1;
    }
    let rounded = hundredths as f64 / 100.0;
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

/// Annual tonnes for one category: annualize, apply the coefficient, convert
/// kg to tonnes, round.
fn category_tonnes(category: Category, coefficient: f64, raw: f64) -> f64 {
    let annual = raw * category.annual_multiplier();
    round_2dp(coefficient * annual / KG_PER_TONNE)
}

/// Per-country emissions calculator. Immutable after construction.
#[derive(Debug, Clone)]
pub struct EmissionsEngine {
    table: FactorTable,
}

impl EmissionsEngine {
    pub fn new(table: FactorTable) -> Self {
        EmissionsEngine { table }
    }

    /// Engine over the factor table compiled into the crate.
    pub fn with_default_factors() -> Result<Self> {
        Ok(Self::new(CalculatorConfig::embedded()?.factors))
    }

    pub fn table(&self) -> &FactorTable {
        &self.table
    }

    /// Annual emissions per category in tonnes CO2.
    ///
    /// Each category is rounded to 2 decimals before the total is summed, so
    /// the total can differ by up to 0.02 from the unrounded sum.
    pub fn compute_category_emissions(
        &self,
        country: &str,
        daily_distance_km: f64,
        monthly_electricity_kwh: f64,
        weekly_waste_kg: f64,
        meals_per_day: u32,
    ) -> Result<CategoryEmissions> {
        let factors = self.table.factors(country)?;
        InputGuard::require_non_negative("daily_distance_km", daily_distance_km)?;
        InputGuard::require_non_negative("monthly_electricity_kwh", monthly_electricity_kwh)?;
        InputGuard::require_non_negative("weekly_waste_kg", weekly_waste_kg)?;
        InputGuard::require_meals(meals_per_day)?;

        let tonnes = |category: Category, raw: f64| {
            category_tonnes(category, factors.coefficient(category), raw)
        };
        let transportation = tonnes(Category::Transportation, daily_distance_km);
        let electricity = tonnes(Category::Electricity, monthly_electricity_kwh);
        let diet = tonnes(Category::Diet, f64::from(meals_per_day));
        let waste = tonnes(Category::Waste, weekly_waste_kg);
        let total = round_2dp(transportation + electricity + diet + waste);

        tracing::debug!(
            country,
            transportation,
            electricity,
            diet,
            waste,
            total,
            "computed category emissions"
        );

        Ok(CategoryEmissions {
            transportation,
            electricity,
            diet,
            waste,
            total,
        })
    }

    pub fn compute(&self, inputs: &UserInputs) -> Result<CategoryEmissions> {
        self.compute_category_emissions(
            &inputs.country,
            inputs.daily_distance_km,
            inputs.monthly_electricity_kwh,
            inputs.weekly_waste_kg,
            inputs.meals_per_day,
        )
    }
}

/// Category with the highest tonnage. Ties go to the earliest category in
/// `Category::ALL` (Transportation, Electricity, Diet, Waste).
pub fn identify_dominant_category(emissions: &CategoryEmissions) -> Category {
    let mut dominant = Category::Transportation;
    let mut highest = emissions.get(dominant);
    for (category, tonnes) in emissions.iter().skip(1) {
        if tonnes > highest {
            dominant = category;
            highest = tonnes;
        }
    }
    dominant
}

/// Sustainability Consumption Index:
/// `round((total * impact + mitigation) / reduction, 2)`.
pub fn calculate_sci(
    total_emissions_tonnes: f64,
    impact_factor: f64,
    mitigation_actions: f64,
    reduction_potential: f64,
) -> Result<f64> {
    InputGuard::require_non_negative("total_emissions_tonnes", total_emissions_tonnes)?;
    InputGuard::require_non_negative("impact_factor", impact_factor)?;
    InputGuard::require_non_negative("mitigation_actions", mitigation_actions)?;
    if reduction_potential.is_nan() || reduction_potential.is_infinite() {
        return Err(CalculatorError::InvalidInput(
            "reduction_potential must be a finite number".into(),
        ));
    }
    if reduction_potential <= 0.0 {
        return Err(CalculatorError::DivisionByZero(reduction_potential));
    }

    let sci = round_2dp(
        (total_emissions_tonnes * impact_factor + mitigation_actions) / reduction_potential,
    );
    tracing::debug!(total_emissions_tonnes, sci, "computed SCI");
    Ok(sci)
}

pub fn calculate_sci_with(total_emissions_tonnes: f64, params: &SciParameters) -> Result<f64> {
    calculate_sci(
        total_emissions_tonnes,
        params.impact_factor,
        params.mitigation_actions,
        params.reduction_potential,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::{CountryEntry, CountryFactors};
    use crate::types::SciBand;

    fn engine() -> EmissionsEngine {
        EmissionsEngine::with_default_factors().unwrap()
    }

    #[test]
    fn test_round_2dp() {
        assert_eq!(round_2dp(0.511), 0.51);
        assert_eq!(round_2dp(0.9855), 0.99);
        assert_eq!(round_2dp(1.295), 1.3);
        assert_eq!(round_2dp(0.125), 0.13);
        assert_eq!(round_2dp(0.124999), 0.12);
        assert_eq!(round_2dp(2.95), 2.95);
        assert_eq!(round_2dp(3.0), 3.0);
        assert_eq!(round_2dp(0.0), 0.0);
        assert_eq!(round_2dp(0.999), 1.0);
        assert_eq!(round_2dp(-1.005), -1.01);
    }

    #[test]
    fn test_india_transportation() {
        let e = engine()
            .compute_category_emissions("India", 10.0, 0.0, 0.0, 0)
            .unwrap();
        assert_eq!(e.transportation, 0.51);
        assert_eq!(e.total, 0.51);
    }

    #[test]
    fn test_usa_end_to_end() {
        let e = engine()
            .compute_category_emissions("USA", 10.0, 100.0, 10.0, 3)
            .unwrap();
        assert_eq!(e.transportation, 0.80);
        assert_eq!(e.electricity, 0.54);
        assert_eq!(e.diet, 0.99);
        assert_eq!(e.waste, 0.62);
        assert_eq!(e.total, 2.95);

        let sci = calculate_sci(e.total, 1.0, 10.0, 10.0).unwrap();
        assert_eq!(sci, 1.30);
        assert_eq!(SciBand::classify(sci), SciBand::Average);
    }

    #[test]
    fn test_all_zero_inputs_give_zero() {
        let engine = engine();
        for country in engine.table().countries() {
            let e = engine.compute_category_emissions(country, 0.0, 0.0, 0.0, 0).unwrap();
            for (_, tonnes) in e.iter() {
                assert_eq!(tonnes, 0.0);
            }
            assert_eq!(e.total, 0.0);
        }
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let engine = engine();
        let base = UserInputs {
            country: "Germany".into(),
            daily_distance_km: 20.0,
            monthly_electricity_kwh: 250.0,
            weekly_waste_kg: 5.0,
            meals_per_day: 3,
        };
        for country in engine.table().countries() {
            let mut prev = engine
                .compute(&UserInputs {
                    country: country.to_string(),
                    ..base.clone()
                })
                .unwrap();
            for step in 1..=20 {
                let bump = f64::from(step) * 3.7;
                let inputs = UserInputs {
                    country: country.to_string(),
                    daily_distance_km: base.daily_distance_km + bump,
                    monthly_electricity_kwh: base.monthly_electricity_kwh + bump,
                    weekly_waste_kg: base.weekly_waste_kg + bump,
                    meals_per_day: base.meals_per_day,
                };
                let next = engine.compute(&inputs).unwrap();
                for category in Category::ALL {
                    assert!(next.get(category) >= prev.get(category));
                }
                assert!(next.total >= prev.total);
                prev = next;
            }
        }

        let mut prev_diet = 0.0;
        for meals in 0..=10 {
            let e = engine
                .compute_category_emissions("Japan", 0.0, 0.0, 0.0, meals)
                .unwrap();
            assert!(e.diet >= prev_diet);
            prev_diet = e.diet;
        }
    }

    #[test]
    fn test_total_is_sum_of_rounded_categories() {
        let table = FactorTable::new(vec![CountryEntry {
            name: "Testland".into(),
            factors: CountryFactors {
                transportation: 0.001,
                electricity: 0.001,
                diet: 0.0,
                waste: 0.0,
            },
            per_capita_tonnes: None,
            per_capita_year: None,
        }])
        .unwrap();
        let engine = EmissionsEngine::new(table);
        // 0.0146 t and 0.0144 t round to 0.01 each; the unrounded sum is 0.029.
        let e = engine
            .compute_category_emissions("Testland", 40.0, 1200.0, 0.0, 0)
            .unwrap();
        assert_eq!(e.transportation, 0.01);
        assert_eq!(e.electricity, 0.01);
        assert_eq!(e.total, 0.02);
    }

    #[test]
    fn test_unknown_country_and_negative_input() {
        let engine = engine();
        assert!(matches!(
            engine.compute_category_emissions("Narnia", 1.0, 1.0, 1.0, 1),
            Err(CalculatorError::UnknownCountry(_))
        ));
        assert!(matches!(
            engine.compute_category_emissions("India", -1.0, 1.0, 1.0, 1),
            Err(CalculatorError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.compute_category_emissions("India", 1.0, f64::NAN, 1.0, 1),
            Err(CalculatorError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.compute_category_emissions("India", 1.0, 1.0, 1.0, 11),
            Err(CalculatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_dominant_category() {
        let engine = engine();
        let e = engine
            .compute_category_emissions("USA", 10.0, 100.0, 10.0, 3)
            .unwrap();
        let dominant = identify_dominant_category(&e);
        assert_eq!(dominant, Category::Diet);
        for (_, tonnes) in e.iter() {
            assert!(e.get(dominant) >= tonnes);
        }
    }

    #[test]
    fn test_dominant_tie_break_uses_fixed_order() {
        let tied = CategoryEmissions {
            transportation: 0.5,
            electricity: 0.9,
            diet: 0.9,
            waste: 0.9,
            total: 3.2,
        };
        assert_eq!(identify_dominant_category(&tied), Category::Electricity);

        let zeros = CategoryEmissions {
            transportation: 0.0,
            electricity: 0.0,
            diet: 0.0,
            waste: 0.0,
            total: 0.0,
        };
        assert_eq!(identify_dominant_category(&zeros), Category::Transportation);
    }

    #[test]
    fn test_sci_errors() {
        assert!(matches!(
            calculate_sci(2.95, 1.0, 10.0, 0.0),
            Err(CalculatorError::DivisionByZero(_))
        ));
        assert!(matches!(
            calculate_sci(2.95, 1.0, 10.0, -2.0),
            Err(CalculatorError::DivisionByZero(_))
        ));
        assert!(matches!(
            calculate_sci(2.95, -1.0, 10.0, 10.0),
            Err(CalculatorError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate_sci(2.95, 1.0, 10.0, f64::NAN),
            Err(CalculatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sci_bands_from_formula() {
        let good = SciParameters {
            impact_factor: 0.0,
            mitigation_actions: 1.0,
            reduction_potential: 2.0,
        };
        assert_eq!(calculate_sci_with(4.0, &good).unwrap(), 0.5);
        assert_eq!(SciBand::classify(0.5), SciBand::Good);

        let bad = calculate_sci(8.0, 2.0, 4.0, 5.0).unwrap();
        assert_eq!(bad, 4.0);
        assert_eq!(SciBand::classify(bad), SciBand::Bad);
    }
}
