//! One-shot calculator subcommands.
//!
//! Every handler returns a [`Report`]: human-readable text, the same
//! result as JSON, and the history entry to record when `--save` is given.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde::Serialize;

use calc_core::catalog;
use calc_core::conversion::{rate_info, ConversionRequest};
use calc_core::currency::{convert_currency, exchange_rate, CURRENCIES};
use calc_core::dates::{self, date_difference};
use calc_core::everyday::{
    apply_discount, calculate_gpa, fuel_efficiency, percentage_of, random_history_entry, random_integer, split_tip,
    Course, FuelInput, TipInput,
};
use calc_core::expression::{self, apply_function, UnaryFunction};
use calc_core::financial::{
    calculate_compound_interest, calculate_loan, calculate_sales_tax, calculate_simple_interest, CompoundFrequency,
    CompoundInterestInput, LoanInput, SalesTaxInput, SimpleInterestInput, TaxMode, TimeUnit,
};
use calc_core::health::{
    calculate_bmi, calculate_bmr, heart_rate_zones, ActivityLevel, BmrInput, BodyMeasurements, Sex,
};
use calc_core::precision::{format_grouped, format_money, format_number};
use calc_core::programming::{calculate_bitwise, convert_base, BitwiseInput, BitwiseOp, Radix};
use calc_core::scientific::{format_trig_value, logarithm, power, root, trig_table, AngleUnit, LogBase, RootKind};
use calc_core::statistics::{averages, parse_numbers, probability};
use calc_core::timer::{ClockReading, Countdown, Stopwatch};
use calc_core::units::UnitDomain;
use calc_core::HistoryEntryDraft;

/// Output of a calculator command.
#[derive(Debug)]
pub struct Report {
    pub text: String,
    pub json: serde_json::Value,
    pub history: Option<HistoryEntryDraft>,
}

impl Report {
    pub fn new<T: Serialize>(result: &T, text: impl Into<String>) -> Result<Self> {
        Ok(Report {
            text: text.into(),
            json: serde_json::to_value(result).context("failed to serialize result")?,
            history: None,
        })
    }

    pub fn with_history(mut self, draft: HistoryEntryDraft) -> Self {
        self.history = Some(draft);
        self
    }
}

#[derive(Debug, Subcommand)]
pub enum CalcCommand {
    /// Evaluate an arithmetic expression (+ - * / ** and parentheses)
    Eval {
        #[arg(allow_hyphen_values = true, num_args = 1..)]
        expression: Vec<String>,

        /// Divide the result by 100
        #[arg(long)]
        percent: bool,
    },

    /// Apply a function key (sin, cos, tan, ln, log, sqrt, sq, cube, !, pi, e)
    Func {
        function: String,

        #[arg(allow_hyphen_values = true, default_value_t = 0.0)]
        value: f64,
    },

    /// Convert between units of one domain
    Convert {
        /// length, weight, temperature, speed, volume, area, data
        domain: String,
        #[arg(allow_hyphen_values = true)]
        amount: f64,
        from: String,
        to: String,

        /// Also show the rate for one unit
        #[arg(long)]
        rate: bool,
    },

    /// List unit symbols, for one domain or all
    Units { domain: Option<String> },

    /// sin, cos, tan, csc, sec, cot of an angle
    Trig {
        #[arg(allow_hyphen_values = true)]
        angle: f64,

        #[arg(long)]
        radians: bool,
    },

    /// Logarithm (base 10 unless --natural or --base)
    Log {
        number: f64,

        #[arg(long, conflicts_with = "natural")]
        base: Option<f64>,

        #[arg(long)]
        natural: bool,
    },

    /// base ^ exponent
    Power {
        #[arg(allow_hyphen_values = true)]
        base: f64,
        #[arg(allow_hyphen_values = true)]
        exponent: f64,
    },

    /// Square root, or the nth root with --degree
    Root {
        #[arg(allow_hyphen_values = true)]
        number: f64,

        #[arg(long, allow_hyphen_values = true)]
        degree: Option<f64>,
    },

    /// Loan EMI
    Loan {
        principal: f64,
        /// Annual interest rate in percent
        rate: f64,
        tenure: f64,

        /// Tenure is in months rather than years
        #[arg(long)]
        months: bool,
    },

    /// Compound interest
    Compound {
        principal: f64,
        rate: f64,
        time: f64,

        #[arg(long)]
        months: bool,

        /// annually, semi-annually, quarterly, monthly, daily
        #[arg(long, default_value = "monthly")]
        frequency: String,
    },

    /// Simple interest
    Simple {
        principal: f64,
        rate: f64,
        time: f64,

        #[arg(long)]
        months: bool,
    },

    /// Add sales tax to an amount, or extract it with --extract
    Tax {
        amount: f64,
        rate: f64,

        #[arg(long)]
        extract: bool,
    },

    /// Convert between currencies at fixed demonstration rates
    Currency {
        amount: Option<f64>,
        from: Option<String>,
        to: Option<String>,
    },

    /// p% of a number
    Percent { percent: f64, base: f64 },

    /// Price after a percentage discount
    Discount { price: f64, percent: f64 },

    /// Tip and per-person split
    Tip {
        bill: f64,
        percent: f64,

        #[arg(long, default_value_t = 1)]
        people: u32,
    },

    /// Fuel efficiency in km/L
    Fuel {
        distance_km: f64,
        fuel_litres: f64,

        #[arg(long)]
        price: Option<f64>,
    },

    /// Credit-weighted GPA from GRADE:CREDITS or NAME:GRADE:CREDITS
    Gpa {
        #[arg(num_args = 1..)]
        courses: Vec<String>,
    },

    /// Uniform random integer in [min, max]
    Random {
        #[arg(allow_hyphen_values = true)]
        min: i64,
        #[arg(allow_hyphen_values = true)]
        max: i64,
    },

    /// Body mass index (kg and cm, or lb and ft with --imperial)
    Bmi {
        weight: f64,
        height: f64,

        #[arg(long)]
        imperial: bool,

        /// Extra inches on top of feet (imperial only)
        #[arg(long, default_value_t = 0.0)]
        inches: f64,
    },

    /// Basal metabolic rate and daily calories
    Bmr {
        sex: String,
        age: u32,
        weight: f64,
        height: f64,

        /// Weight in lb, height in inches
        #[arg(long)]
        imperial: bool,

        #[arg(long, default_value = "light")]
        activity: String,
    },

    /// Maximum heart rate and training zones
    HeartRate { age: u32 },

    /// Calendar difference between two dates (YYYY-MM-DD[THH:MM])
    DateDiff { from: String, to: String },

    /// Age from a date of birth
    Age { dob: String },

    /// Interactive stopwatch (Enter = lap, p = pause/resume, q = stop)
    Stopwatch,

    /// Countdown timer
    Timer {
        #[arg(long, default_value_t = 0)]
        hours: u64,
        #[arg(long, default_value_t = 0)]
        minutes: u64,
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },

    /// Count, sum, mean, median and mode of a list of numbers
    Stats {
        #[arg(allow_hyphen_values = true, num_args = 1..)]
        numbers: Vec<String>,
    },

    /// Probability of favorable outcomes out of a total
    Probability { favorable: u64, total: u64 },

    /// 32-bit bitwise operation (and, or, xor, not, lshift, rshift)
    Bitwise {
        operation: String,
        #[arg(allow_hyphen_values = true)]
        left: i64,
        #[arg(allow_hyphen_values = true)]
        right: Option<i64>,

        #[arg(long)]
        shift: Option<i64>,
    },

    /// Convert a number between bases 2, 8, 10 and 16
    Base {
        value: String,
        from: String,
        to: String,
    },
}

/// Run a calculator command. `currency` prefixes money amounts.
pub fn run(command: CalcCommand, currency: &str) -> Result<Report> {
    match command {
        CalcCommand::Eval { expression, percent } => {
            let expression = expression.join(" ");
            let value = if percent {
                expression::percent_of_expression(&expression)?
            } else {
                expression::evaluate(&expression)?
            };
            Report::new(&value, format!("{} = {}", expression, format_number(value)))
                .map(|r| r.with_history(expression::history_entry(&expression, value)))
        }

        CalcCommand::Func { function, value } => {
            let func: UnaryFunction = function.parse()?;
            let result = apply_function(func, value)?;
            let text = format!("{} = {}", result.label, format_number(result.value));
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }

        CalcCommand::Convert {
            domain,
            amount,
            from,
            to,
            rate,
        } => {
            let domain: UnitDomain = domain.parse()?;
            let result = ConversionRequest::new(domain, amount, from.as_str(), to.as_str()).execute()?;
            let mut text = result.to_string();
            if rate {
                let info = rate_info(&from, &to, domain.table().units())?;
                text.push_str(&format!("\n{}", info));
            }
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }

        CalcCommand::Units { domain } => {
            let domains = match domain {
                Some(domain) => vec![domain.parse::<UnitDomain>()?],
                None => UnitDomain::ALL.to_vec(),
            };
            let mut text = String::new();
            let mut json = serde_json::Map::new();
            for domain in domains {
                let table = domain.table();
                let symbols: Vec<_> = table.symbols().collect();
                text.push_str(&format!("{:<12} {}\n", domain.name(), symbols.join(", ")));
                json.insert(domain.name().to_string(), serde_json::to_value(table.units())?);
            }
            Report::new(&json, text.trim_end())
        }

        CalcCommand::Trig { angle, radians } => {
            let unit = if radians { AngleUnit::Radians } else { AngleUnit::Degrees };
            let table = trig_table(angle, unit)?;
            let text = table
                .rows()
                .iter()
                .map(|(name, value)| format!("{:<4} {}", name, format_trig_value(*value)))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(Report::new(&table, text)?.with_history(table.history_entry()))
        }

        CalcCommand::Log { number, base, natural } => {
            let base = match (base, natural) {
                (Some(b), _) => LogBase::Custom(b),
                (None, true) => LogBase::Natural,
                (None, false) => LogBase::Common,
            };
            let result = logarithm(number, base)?;
            Ok(Report::new(&result, result.to_string())?.with_history(result.history_entry()))
        }

        CalcCommand::Power { base, exponent } => {
            let result = power(base, exponent)?;
            Ok(Report::new(&result, result.to_string())?.with_history(result.history_entry()))
        }

        CalcCommand::Root { number, degree } => {
            let kind = match degree {
                None => RootKind::Square,
                Some(d) if d == 2.0 => RootKind::Square,
                Some(d) if d == 3.0 => RootKind::Cube,
                Some(d) => RootKind::Nth(d),
            };
            let result = root(number, kind)?;
            Ok(Report::new(&result, result.to_string())?.with_history(result.history_entry()))
        }

        CalcCommand::Loan {
            principal,
            rate,
            tenure,
            months,
        } => {
            let input = LoanInput {
                principal,
                annual_rate_percent: rate,
                tenure,
                tenure_unit: time_unit(months),
            };
            let result = calculate_loan(&input)?;
            let text = format!(
                "Monthly EMI:    {}\nTotal interest: {}\nTotal amount:   {}",
                format_money(currency, result.emi),
                format_money(currency, result.total_interest),
                format_money(currency, result.total_amount)
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input, currency)))
        }

        CalcCommand::Compound {
            principal,
            rate,
            time,
            months,
            frequency,
        } => {
            let frequency: CompoundFrequency = frequency.parse()?;
            let input = CompoundInterestInput {
                principal,
                annual_rate_percent: rate,
                time,
                time_unit: time_unit(months),
                frequency,
            };
            let result = calculate_compound_interest(&input)?;
            let text = interest_text(currency, result.interest, result.total_amount);
            Ok(Report::new(&result, text)?.with_history(result.compound_history_entry(&input, currency)))
        }

        CalcCommand::Simple {
            principal,
            rate,
            time,
            months,
        } => {
            let input = SimpleInterestInput {
                principal,
                annual_rate_percent: rate,
                time,
                time_unit: time_unit(months),
            };
            let result = calculate_simple_interest(&input)?;
            let text = interest_text(currency, result.interest, result.total_amount);
            Ok(Report::new(&result, text)?.with_history(result.simple_history_entry(&input, currency)))
        }

        CalcCommand::Tax { amount, rate, extract } => {
            let input = SalesTaxInput {
                amount,
                rate_percent: rate,
                mode: if extract { TaxMode::Extract } else { TaxMode::Add },
            };
            let result = calculate_sales_tax(&input)?;
            let text = format!(
                "Original amount: {}\nTax amount:      {}\nFinal amount:    {}",
                format_money(currency, result.original_amount),
                format_money(currency, result.tax_amount),
                format_money(currency, result.final_amount)
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input, currency)))
        }

        CalcCommand::Currency { amount, from, to } => match (amount, from, to) {
            (Some(amount), Some(from), Some(to)) => {
                let result = convert_currency(amount, &from, &to)?;
                let rate = exchange_rate(&from, &to)?;
                let text = format!("{}\n{}", result, rate);
                Ok(Report::new(&result, text)?.with_history(result.history_entry()))
            }
            (None, None, None) => {
                let text = CURRENCIES
                    .iter()
                    .map(|c| format!("{}  {}", c.code, c.name))
                    .collect::<Vec<_>>()
                    .join("\n");
                Report::new(&CURRENCIES, text)
            }
            _ => bail!("currency needs AMOUNT FROM TO, or no arguments to list currencies"),
        },

        CalcCommand::Percent { percent, base } => {
            let result = percentage_of(percent, base)?;
            let text = format!("{}% of {} = {}", format_number(percent), format_number(base), format_number(result.value));
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }

        CalcCommand::Discount { price, percent } => {
            let result = apply_discount(price, percent)?;
            let text = format!(
                "You save:    {}\nFinal price: {}",
                format_money(currency, result.amount_saved),
                format_money(currency, result.final_price)
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(currency)))
        }

        CalcCommand::Tip { bill, percent, people } => {
            let input = TipInput {
                bill,
                tip_percent: percent,
                people,
            };
            let result = split_tip(&input)?;
            let mut text = format!(
                "Tip:   {}\nTotal: {}",
                format_money(currency, result.tip_amount),
                format_money(currency, result.total_amount)
            );
            if people > 1 {
                text.push_str(&format!(
                    "\nPer person: {} (tip {})",
                    format_money(currency, result.total_per_person),
                    format_money(currency, result.tip_per_person)
                ));
            }
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input, currency)))
        }

        CalcCommand::Fuel {
            distance_km,
            fuel_litres,
            price,
        } => {
            let input = FuelInput {
                distance_km,
                fuel_litres,
                price_per_litre: price,
            };
            let result = fuel_efficiency(&input)?;
            let mut text = format!("{} km/L", format_grouped(result.km_per_litre, 2));
            if let Some(cost) = result.cost_per_km {
                text.push_str(&format!("\n{} per km", format_money(currency, cost)));
            }
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input)))
        }

        CalcCommand::Gpa { courses } => {
            let courses = courses
                .iter()
                .enumerate()
                .map(|(i, entry)| parse_course(i, entry))
                .collect::<Result<Vec<_>>>()?;
            let result = calculate_gpa(&courses)?;
            let text = format!(
                "GPA: {:.2} ({} credits over {} courses)",
                result.gpa,
                format_number(result.total_credits),
                result.counted_courses
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }

        CalcCommand::Random { min, max } => {
            let value = random_integer(min, max, &mut rand::rng())?;
            Ok(Report::new(&value, value.to_string())?.with_history(random_history_entry(min, max, value)))
        }

        CalcCommand::Bmi {
            weight,
            height,
            imperial,
            inches,
        } => {
            let input = if imperial {
                BodyMeasurements::Imperial {
                    weight_lb: weight,
                    height_ft: height,
                    height_in: inches,
                }
            } else {
                BodyMeasurements::Metric {
                    weight_kg: weight,
                    height_cm: height,
                }
            };
            let result = calculate_bmi(&input)?;
            let text = format!("BMI {:.1} ({})", result.bmi, result.category);
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input)))
        }

        CalcCommand::Bmr {
            sex,
            age,
            weight,
            height,
            imperial,
            activity,
        } => {
            let input = BmrInput {
                sex: sex.parse::<Sex>()?,
                age_years: age,
                weight,
                height,
                imperial,
                activity: activity.parse::<ActivityLevel>()?,
            };
            let result = calculate_bmr(&input)?;
            let text = format!(
                "BMR: {} calories/day\nDaily calories ({}): {}",
                format_grouped(result.bmr.round(), 0),
                input.activity.description(),
                format_grouped(result.daily_calories.round(), 0)
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input)))
        }

        CalcCommand::HeartRate { age } => {
            let result = heart_rate_zones(age)?;
            let mut text = format!("Max heart rate: {} bpm", result.max_heart_rate);
            for zone in &result.zones {
                text.push_str(&format!("\n  {}", zone));
            }
            Ok(Report::new(&result, text)?.with_history(result.history_entry(age)))
        }

        CalcCommand::DateDiff { from, to } => {
            let from = dates::parse_date_time(&from)?;
            let to = dates::parse_date_time(&to)?;
            let diff = date_difference(from, to);
            let text = difference_text(&diff);
            Ok(Report::new(&diff, text)?.with_history(diff.history_entry(from.date(), to.date())))
        }

        CalcCommand::Age { dob } => {
            let dob = dates::parse_date_time(&dob)?;
            let now = chrono::Local::now().naive_local();
            let diff = dates::age(dob, now)?;
            let text = difference_text(&diff);
            Ok(Report::new(&diff, text)?.with_history(diff.age_history_entry(dob.date())))
        }

        CalcCommand::Stopwatch => run_stopwatch(),

        CalcCommand::Timer {
            hours,
            minutes,
            seconds,
        } => run_countdown(Countdown::from_hms(hours, minutes, seconds)?),

        CalcCommand::Stats { numbers } => {
            let numbers = parse_numbers(&numbers.join(" "));
            let result = averages(&numbers)?;
            let mode = if result.mode.is_empty() {
                "none".to_string()
            } else {
                result.mode.iter().map(|m| format_number(*m)).collect::<Vec<_>>().join(", ")
            };
            let text = format!(
                "Count:  {}\nSum:    {}\nMean:   {}\nMedian: {}\nMode:   {}",
                result.count,
                format_number(result.sum),
                format_number(result.mean),
                format_number(result.median),
                mode
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&numbers)))
        }

        CalcCommand::Probability { favorable, total } => {
            let result = probability(favorable, total)?;
            let text = format!(
                "P = {:.4} ({:.2}%)\nOdds for:     {}\nOdds against: {}",
                result.probability, result.percentage, result.odds_for, result.odds_against
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }

        CalcCommand::Bitwise {
            operation,
            left,
            right,
            shift,
        } => {
            let operation: BitwiseOp = operation.parse()?;
            let input = BitwiseInput {
                operation,
                left,
                right,
                shift: shift.or(if operation.is_unary() { right } else { None }),
            };
            let result = calculate_bitwise(&input)?;
            let text = format!(
                "{} = {}\nbin {}\nhex {}",
                input.expression(),
                result.decimal,
                result.binary,
                result.hex
            );
            Ok(Report::new(&result, text)?.with_history(result.history_entry(&input)))
        }

        CalcCommand::Base { value, from, to } => {
            let from: Radix = from.parse()?;
            let to: Radix = to.parse()?;
            let result = convert_base(&value, from, to)?;
            let text = result.output.clone();
            Ok(Report::new(&result, text)?.with_history(result.history_entry()))
        }
    }
}

/// List or search the calculator catalog.
pub fn calculators(query: Option<&str>) -> Result<Report> {
    match query {
        Some(query) => {
            let hits = catalog::search(query);
            let text = if hits.is_empty() {
                format!("No calculators match '{}'", query)
            } else {
                hits.iter()
                    .map(|c| format!("{:<28} {}", c.name, c.path))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            Report::new(&hits, text)
        }
        None => {
            let mut text = String::new();
            for category in catalog::categories() {
                text.push_str(&format!("{}\n", category.name));
                for calc in category.calculators {
                    text.push_str(&format!("  {:<28} {}\n", calc.name, calc.description));
                }
            }
            let json: Vec<_> = catalog::categories()
                .iter()
                .map(|c| serde_json::json!({ "name": c.name, "calculators": c.calculators }))
                .collect();
            Report::new(&json, text.trim_end())
        }
    }
}

fn time_unit(months: bool) -> TimeUnit {
    if months {
        TimeUnit::Months
    } else {
        TimeUnit::Years
    }
}

fn interest_text(currency: &str, interest: f64, total: f64) -> String {
    format!(
        "Interest:     {}\nTotal amount: {}",
        format_money(currency, interest),
        format_money(currency, total)
    )
}

fn difference_text(diff: &dates::DateDifference) -> String {
    format!(
        "{}\nTotal months:  {}\nTotal weeks:   {}\nTotal days:    {}\nTotal hours:   {}\nTotal minutes: {}\nTotal seconds: {}",
        diff.summary(),
        format_grouped(diff.total_months as f64, 0),
        format_grouped(diff.total_weeks as f64, 0),
        format_grouped(diff.total_days as f64, 0),
        format_grouped(diff.total_hours as f64, 0),
        format_grouped(diff.total_minutes as f64, 0),
        format_grouped(diff.total_seconds as f64, 0)
    )
}

/// `A:3` or `Math:A:3`
fn parse_course(index: usize, entry: &str) -> Result<Course> {
    let parts: Vec<&str> = entry.split(':').collect();
    let (name, grade, credits) = match parts.as_slice() {
        [grade, credits] => (format!("Course {}", index + 1), *grade, *credits),
        [name, grade, credits] => (name.to_string(), *grade, *credits),
        _ => bail!("course '{}' must be GRADE:CREDITS or NAME:GRADE:CREDITS", entry),
    };
    let credits: f64 = credits
        .trim()
        .parse()
        .with_context(|| format!("invalid credits in course '{}'", entry))?;
    Ok(Course::new(name, grade.trim(), credits))
}

fn run_stopwatch() -> Result<Report> {
    let mut stopwatch = Stopwatch::new();
    stopwatch.start(Instant::now());
    eprintln!("Stopwatch running. Enter = lap, p = pause/resume, q = stop");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let now = Instant::now();
        match line.trim() {
            "q" | "quit" => break,
            "p" | "pause" => {
                stopwatch.toggle(now);
                let state = if stopwatch.is_running() { "running" } else { "paused" };
                eprintln!("{} {}", ClockReading::from(stopwatch.elapsed(now)), state);
            }
            _ => match stopwatch.lap(now) {
                Some(lap) => eprintln!(
                    "Lap {:>2}  {}  {}",
                    lap.number,
                    ClockReading::from(lap.split),
                    ClockReading::from(lap.total)
                ),
                None => eprintln!("paused; press p to resume"),
            },
        }
    }

    let now = Instant::now();
    stopwatch.pause(now);
    let elapsed = ClockReading::from(stopwatch.elapsed(now));
    let laps: Vec<_> = stopwatch
        .laps()
        .iter()
        .map(|lap| {
            serde_json::json!({
                "lap": lap.number,
                "split": ClockReading::from(lap.split).to_string(),
                "total": ClockReading::from(lap.total).to_string(),
            })
        })
        .collect();
    let json = serde_json::json!({ "elapsed": elapsed.to_string(), "laps": laps });
    Report::new(&json, format!("Elapsed {}", elapsed))
}

fn run_countdown(countdown: Countdown) -> Result<Report> {
    let started = Instant::now();
    let mut stderr = io::stderr();
    loop {
        let elapsed = started.elapsed();
        let remaining = countdown.remaining(elapsed);
        let _ = write!(stderr, "\r{}", ClockReading::from(remaining));
        let _ = stderr.flush();
        if countdown.is_finished(elapsed) {
            break;
        }
        thread::sleep(remaining.min(Duration::from_millis(250)));
    }
    let _ = writeln!(stderr);

    let total = ClockReading::from(countdown.duration());
    let json = serde_json::json!({ "duration": total.to_string(), "finished": true });
    Report::new(&json, format!("Time's up! ({})", total))
}
