#![forbid(unsafe_code)]

//! Personal carbon footprint calculator.
//!
//! Annual emissions per category come from per-country linear factors applied
//! to annualized lifestyle inputs. A Sustainability Consumption Index (SCI) is
//! derived from the total and three user-chosen weights.

pub mod advice;
pub mod engine;
pub mod error;
pub mod factors;
pub mod guards;
pub mod logging;
pub mod session;
pub mod types;

pub use advice::{advice_rng, pick_advice_for, tips_for};
pub use engine::{
    calculate_sci, calculate_sci_with, identify_dominant_category, round_2dp, EmissionsEngine,
};
pub use error::{CalculatorError, Result};
pub use factors::{CalculatorConfig, CountryEntry, CountryFactors, FactorTable, PerCapitaReference};
pub use guards::{InputGuard, InputLimits, MAX_MEALS_PER_DAY};
pub use logging::{init_logging, LogLevel};
pub use session::{ChartRow, Report, SciSummary, Session};
pub use types::{Category, CategoryEmissions, SciBand, SciParameters, UserInputs};
