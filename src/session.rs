use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::advice::pick_advice_for;
use crate::engine::{calculate_sci_with, identify_dominant_category, EmissionsEngine};
use crate::error::Result;
use crate::factors::PerCapitaReference;
use crate::types::{Category, CategoryEmissions, SciBand, SciParameters, UserInputs};

/// Caller-side presentation state: whether the user has asked for the
/// emissions results and for the SCI, plus the tip shown for the current
/// inputs. Flags stay set once raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    emissions_requested: bool,
    sci_requested: bool,
    advice: Option<(UserInputs, &'static str)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_emissions(&mut self) {
        self.emissions_requested = true;
    }

    /// Returns false, leaving the flag unset, until emissions were requested.
    pub fn request_sci(&mut self) -> bool {
        if self.emissions_requested {
            self.sci_requested = true;
        }
        self.sci_requested
    }

    pub fn emissions_requested(&self) -> bool {
        self.emissions_requested
    }

    pub fn sci_requested(&self) -> bool {
        self.sci_requested
    }

    /// Build the report for the current inputs. `None` until emissions were
    /// requested; the SCI section is present only once it was requested too.
    /// The tip is picked once per set of inputs and reused on later renders.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        engine: &EmissionsEngine,
        inputs: &UserInputs,
        sci_params: Option<&SciParameters>,
        rng: &mut R,
    ) -> Result<Option<Report>> {
        if !self.emissions_requested {
            return Ok(None);
        }
        let entry = engine.table().entry(&inputs.country)?;
        let emissions = engine.compute(inputs)?;
        let dominant = identify_dominant_category(&emissions);
        let cached = self
            .advice
            .as_ref()
            .filter(|(seen, _)| seen == inputs)
            .map(|(_, tip)| *tip);
        let advice = match cached {
            Some(tip) => tip,
            None => {
                let tip = pick_advice_for(dominant, rng);
                self.advice = Some((inputs.clone(), tip));
                tip
            }
        };

        let sci = match sci_params {
            Some(params) if self.sci_requested => {
                let score = calculate_sci_with(emissions.total, params)?;
                Some(SciSummary {
                    parameters: *params,
                    score,
                    band: SciBand::classify(score),
                })
            }
            _ => None,
        };

        Ok(Some(Report {
            country: entry.name.clone(),
            emissions,
            dominant,
            advice,
            per_capita: entry.per_capita(),
            sci,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SciSummary {
    pub parameters: SciParameters,
    pub score: f64,
    pub band: SciBand,
}

/// One bar of the emissions-by-category chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartRow {
    pub category: Category,
    pub tonnes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub country: String,
    pub emissions: CategoryEmissions,
    pub dominant: Category,
    pub advice: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_capita: Option<PerCapitaReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sci: Option<SciSummary>,
}

impl Report {
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        self.emissions
            .iter()
            .map(|(category, tonnes)| ChartRow { category, tonnes })
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Results")?;
        writeln!(f)?;
        writeln!(f, "Carbon Emissions by Category")?;
        for (category, tonnes) in self.emissions.iter() {
            writeln!(f, "  {category}: {tonnes:.2} tonnes CO2 per year")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Total Carbon Footprint: {:.2} tonnes CO2 per year",
            self.emissions.total
        )?;
        if let Some(reference) = self.per_capita {
            let relation = if self.emissions.total > reference.tonnes {
                "above"
            } else {
                "at or below"
            };
            writeln!(
                f,
                "  In {}, CO2 emissions per capita for {} were {} tonnes; your footprint is {relation} that.",
                reference.year, self.country, reference.tonnes
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Tips to Reduce Your Carbon Footprint in {}",
            self.dominant
        )?;
        writeln!(f, "  - {}: {}", self.dominant, self.advice)?;

        if let Some(sci) = &self.sci {
            writeln!(f)?;
            writeln!(f, "SCI Score Table")?;
            for (band, range) in SciBand::table() {
                writeln!(f, "  {:<8} {range}", band.label())?;
            }
            writeln!(
                f,
                "Your Sustainability Consumption Index (SCI) is: {:.2} ({})",
                sci.score, sci.band
            )?;
            writeln!(f)?;
            writeln!(f, "Carbon Emissions by Category (tonnes CO2/year)")?;
            let widest = self
                .chart_rows()
                .iter()
                .map(|r| r.tonnes)
                .fold(0.0_f64, f64::max);
            for row in self.chart_rows() {
                let width = if widest > 0.0 {
                    (row.tonnes / widest * 40.0).round() as usize
                } else {
                    0
                };
                writeln!(
                    f,
                    "  {:<15}{} {:.2}",
                    row.category.name(),
                    "#".repeat(width),
                    row.tonnes
                )?;
            }
        }
        Ok(())
    }
}
