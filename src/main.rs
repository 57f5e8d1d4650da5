use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use carbon_calculator::{
    advice_rng, init_logging, CalculatorConfig, EmissionsEngine, FactorTable, InputGuard,
    InputLimits, LogLevel, Report, SciParameters, Session, UserInputs,
};

const USAGE: &str =
    "usage: carbon_calculator [--factors PATH] [--seed N] [--json] [--log-level LEVEL]";

// Form defaults, matching the initial widget values.
const DEFAULT_DISTANCE_KM: &str = "10";
const DEFAULT_ELECTRICITY_KWH: &str = "100";
const DEFAULT_WASTE_KG: &str = "10";
const DEFAULT_MEALS: &str = "3";
const DEFAULT_IMPACT_FACTOR: &str = "1.0";
const DEFAULT_MITIGATION_ACTIONS: &str = "10.0";
const DEFAULT_REDUCTION_POTENTIAL: &str = "10.0";

#[derive(Debug, Default)]
struct Args {
    factors: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
    log_level: LogLevel,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--factors" => args.factors = Some(it.next().ok_or(USAGE)?.into()),
            "--seed" => args.seed = Some(it.next().ok_or(USAGE)?.parse()?),
            "--json" => args.json = true,
            "--log-level" => args.log_level = it.next().ok_or(USAGE)?.parse()?,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unexpected argument {other:?}\n{USAGE}").into()),
        }
    }
    Ok(args)
}

/// Line-oriented form. Prompts go to stderr so stdout carries only results.
struct Form<R: BufRead> {
    lines: R,
}

impl<R: BufRead> Form<R> {
    /// Read one answer; a blank line takes the default. `None` at end of input.
    fn ask(&mut self, prompt: &str, default: &str) -> io::Result<Option<String>> {
        eprint!("{prompt} [{default}]: ");
        io::stderr().flush()?;
        let mut line = String::new();
        if self.lines.read_line(&mut line)? == 0 {
            eprintln!();
            return Ok(None);
        }
        let answer = line.trim();
        Ok(Some(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        }))
    }

    /// Re-prompt until `parse` accepts the answer. At end of input the default
    /// is tried once; if it is rejected, or an earlier answer was rejected,
    /// this fails with `UnexpectedEof`.
    fn ask_until<T>(
        &mut self,
        prompt: &str,
        default: &str,
        parse: impl Fn(&str) -> carbon_calculator::Result<T>,
    ) -> io::Result<T> {
        let mut rejected = false;
        loop {
            let (answer, at_eof) = match self.ask(prompt, default)? {
                Some(answer) => (answer, false),
                None if rejected => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("{prompt}: input ended after a rejected answer"),
                    ));
                }
                None => (default.to_string(), true),
            };
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(%e, "rejected form input");
                    eprintln!("  {e}");
                    if at_eof {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("{prompt}: input ended and the default was rejected: {e}"),
                        ));
                    }
                    rejected = true;
                }
            }
        }
    }

    fn confirm(&mut self, prompt: &str, default_yes: bool) -> io::Result<bool> {
        let default = if default_yes { "y" } else { "n" };
        let answer = self
            .ask(prompt, default)?
            .unwrap_or_else(|| default.to_string());
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn ask_country(&mut self, table: &FactorTable) -> io::Result<String> {
        eprintln!("Your Country");
        for (i, name) in table.countries().enumerate() {
            eprintln!("  {:>2}. {name}", i + 1);
        }
        let default = table.countries().next().unwrap_or_default().to_string();
        self.ask_until("Select", &default, |raw| {
            let name = match raw.parse::<usize>() {
                Ok(n) if n >= 1 => table.countries().nth(n - 1).unwrap_or(raw),
                _ => raw,
            };
            table.entry(name).map(|e| e.name.clone())
        })
    }

    fn ask_inputs(
        &mut self,
        table: &FactorTable,
        limits: &InputLimits,
    ) -> io::Result<UserInputs> {
        let country = self.ask_country(table)?;
        let daily_distance_km = self.ask_until(
            "Daily commute distance (in km)",
            DEFAULT_DISTANCE_KM,
            |raw| {
                InputGuard::parse_bounded("distance", raw, 0.0, limits.max_daily_distance_km)
            },
        )?;
        let monthly_electricity_kwh = self.ask_until(
            "Monthly electricity consumption (in kWh)",
            DEFAULT_ELECTRICITY_KWH,
            |raw| {
                InputGuard::parse_bounded(
                    "electricity",
                    raw,
                    0.0,
                    limits.max_monthly_electricity_kwh,
                )
            },
        )?;
        let weekly_waste_kg = self.ask_until(
            "Waste generated per week (in kg)",
            DEFAULT_WASTE_KG,
            |raw| InputGuard::parse_bounded("waste", raw, 0.0, limits.max_weekly_waste_kg),
        )?;
        let meals_per_day = self.ask_until("Number of meals per day", DEFAULT_MEALS, |raw| {
            let meals = InputGuard::parse_meals(raw)?;
            if meals > limits.max_meals_per_day {
                return Err(carbon_calculator::CalculatorError::InvalidInput(format!(
                    "meals must be at most {}",
                    limits.max_meals_per_day
                )));
            }
            Ok(meals)
        })?;
        Ok(UserInputs {
            country,
            daily_distance_km,
            monthly_electricity_kwh,
            weekly_waste_kg,
            meals_per_day,
        })
    }

    fn ask_sci(&mut self, limits: &InputLimits) -> io::Result<SciParameters> {
        eprintln!("Sustainability Consumption Index (SCI) Calculation");
        let impact_factor = self.ask_until("Impact Factor (I)", DEFAULT_IMPACT_FACTOR, |raw| {
            InputGuard::parse_bounded("impact factor", raw, 0.0, limits.max_impact_factor)
        })?;
        let mitigation_actions = self.ask_until(
            "Mitigation Actions (M)",
            DEFAULT_MITIGATION_ACTIONS,
            |raw| {
                InputGuard::parse_bounded(
                    "mitigation actions",
                    raw,
                    0.0,
                    limits.max_mitigation_actions,
                )
            },
        )?;
        let reduction_potential = self.ask_until(
            "Reduction Potential (R)",
            DEFAULT_REDUCTION_POTENTIAL,
            |raw| {
                InputGuard::parse_bounded(
                    "reduction potential",
                    raw,
                    limits.min_reduction_potential,
                    limits.max_reduction_potential,
                )
            },
        )?;
        Ok(SciParameters {
            impact_factor,
            mitigation_actions,
            reduction_potential,
        })
    }
}

fn emit(report: &Report, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    init_logging(args.log_level);

    let config = match &args.factors {
        Some(path) => CalculatorConfig::from_path(path)?,
        None => CalculatorConfig::embedded()?,
    };
    let limits = config.limits;
    let engine = EmissionsEngine::new(config.factors);
    let mut rng = advice_rng(args.seed);
    let mut session = Session::new();

    eprintln!("Carbon Calculator");
    let stdin = io::stdin();
    let mut form = Form {
        lines: stdin.lock(),
    };

    let inputs = form.ask_inputs(engine.table(), &limits)?;
    InputGuard::validate_form(&inputs, &limits)?;

    if !form.confirm("Calculate CO2 Emissions? (y/n)", true)? {
        return Ok(());
    }
    session.request_emissions();
    let Some(report) = session.render(&engine, &inputs, None, &mut rng)? else {
        return Ok(());
    };
    if !args.json {
        emit(&report, false)?;
    }

    let mut final_report = report;
    if form.confirm("Calculate SCI? (y/n)", false)? {
        let params = form.ask_sci(&limits)?;
        InputGuard::validate_sci_form(&params, &limits)?;
        session.request_sci();
        if let Some(report) = session.render(&engine, &inputs, Some(&params), &mut rng)? {
            if !args.json {
                emit(&report, false)?;
            }
            final_report = report;
        }
    }

    if args.json {
        emit(&final_report, true)?;
    }
    Ok(())
}
