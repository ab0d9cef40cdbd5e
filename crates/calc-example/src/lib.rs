//! `calc`: a small arithmetic CLI built on stanza.
//!
//! ```text
//! calc add 2 5                  # 7
//! calc add -v 2 5               # 2 + 5 = 7
//! calc -p 3 div 10 4            # 2.500
//! calc stats summary 3 1 2      # count: 3, sum: 6, ...
//! calc stats --json mean 1 2    # {"mean": 1.5}
//! calc help stats mean          # help for a command
//! ```

use anyhow::{bail, Context};
use serde::Serialize;
use stanza::{App, ArgumentSpecification, Command, Flag, Output, ParsedFlags};

pub const DEFAULT_PRECISION: i64 = 2;

/// Builds the `calc` application.
pub fn app() -> stanza::Result<App> {
    let app = App::builder()
        .name("calc")
        .description("Integer arithmetic from the command line")
        .version(env!("CARGO_PKG_VERSION"))
        .flag(
            Flag::int64("precision")
                .short('p')
                .default_value(DEFAULT_PRECISION)
                .persistent()
                .description("Digits after the decimal point"),
        )?
        .command(add()?)?
        .command(sub()?)?
        .command(mul()?)?
        .command(div()?)?
        .command(stats()?)?
        .build();
    Ok(app)
}

/// Extracts the command path when help was asked for, either as
/// `calc help <path..>` or with a trailing `--help` / `-h`.
pub fn help_path(args: &[String]) -> Option<Vec<&str>> {
    let rest = args.get(1..)?;
    if let Some((first, path)) = rest.split_first() {
        if first == "help" {
            return Some(path.iter().map(String::as_str).collect());
        }
    }
    match rest.split_last() {
        Some((last, path)) if last == "--help" || last == "-h" => {
            Some(path.iter().map(String::as_str).collect())
        }
        _ => None,
    }
}

fn add() -> stanza::Result<Command> {
    Command::executable("add", "Add numbers", |flags: &ParsedFlags, args: &[String]| {
        let values = numbers(args)?;
        let total = values
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .context("overflow")?;
        tracing::debug!(count = values.len(), total, "add");

        if flags.get_bool("verbose") == Some(true) {
            return Ok::<_, anyhow::Error>(format!("{} = {}", args.join(" + "), total));
        }
        Ok(total.to_string())
    })
    .with_alias("plus")?
    .with_flag(Flag::boolean("verbose").short('v').description("Show the whole sum"))?
    .with_argument_spec(ArgumentSpecification::minimum(2))
}

fn sub() -> stanza::Result<Command> {
    Command::executable("sub", "Subtract the second number from the first", |_f: &ParsedFlags, args: &[String]| {
        let values = numbers(args)?;
        let difference = values[0].checked_sub(values[1]).context("overflow")?;
        Ok::<_, anyhow::Error>(difference.to_string())
    })
    .with_alias("minus")?
    .with_argument_spec(ArgumentSpecification::exact(2))
}

fn mul() -> stanza::Result<Command> {
    Command::executable("mul", "Multiply numbers", |_f: &ParsedFlags, args: &[String]| {
        let product = numbers(args)?
            .iter()
            .try_fold(1i64, |acc, v| acc.checked_mul(*v))
            .context("overflow")?;
        Ok::<_, anyhow::Error>(product.to_string())
    })
    .with_alias("times")?
    .with_argument_spec(ArgumentSpecification::end_inclusive(1, 8)?)
}

fn div() -> stanza::Result<Command> {
    let divide = |flags: &ParsedFlags, args: &[String]| -> anyhow::Result<String> {
        let values = numbers(args)?;
        if values[1] == 0 {
            bail!("division by zero");
        }
        let quotient = values[0] as f64 / values[1] as f64;
        Ok(format_decimal(quotient, precision(flags)?))
    };
    Command::executable("div", "Divide the first number by the second", divide)
        .with_argument_spec(ArgumentSpecification::exact(2))
}

#[derive(Debug, Serialize)]
struct Summary {
    count: usize,
    sum: i64,
    min: i64,
    max: i64,
}

fn stats() -> stanza::Result<Command> {
    let summary = Command::executable("summary", "Count, sum and bounds", |flags: &ParsedFlags, args: &[String]| {
        let values = numbers(args)?;
        let sum = values
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .context("overflow")?;
        let summary = Summary {
            count: values.len(),
            sum,
            min: values.iter().copied().min().unwrap_or_default(),
            max: values.iter().copied().max().unwrap_or_default(),
        };
        if flags.get_bool("json") == Some(true) {
            return Ok::<_, anyhow::Error>(Output::Json(serde_json::to_value(&summary)?));
        }
        Ok(Output::Text(format!(
            "count: {}, sum: {}, min: {}, max: {}",
            summary.count, summary.sum, summary.min, summary.max
        )))
    })
    .with_argument_spec(ArgumentSpecification::minimum(1))?;

    let mean = Command::executable("mean", "Arithmetic mean", |flags: &ParsedFlags, args: &[String]| {
        let values = numbers(args)?;
        let mean = values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64;
        if flags.get_bool("json") == Some(true) {
            return Ok::<_, anyhow::Error>(Output::Json(serde_json::json!({ "mean": mean })));
        }
        Ok(Output::Text(format_decimal(mean, precision(flags)?)))
    })
    .with_alias("avg")?
    .with_argument_spec(ArgumentSpecification::minimum(1))?;

    Command::group("stats", "Descriptive statistics")
        .with_alias("st")?
        .with_flag(
            Flag::boolean("json")
                .short('j')
                .persistent()
                .description("Print JSON instead of text"),
        )?
        .with_subcommand(summary)?
        .with_subcommand(mean)
}

fn numbers(args: &[String]) -> anyhow::Result<Vec<i64>> {
    args.iter()
        .map(|arg| {
            arg.parse::<i64>()
                .with_context(|| format!("`{}` is not an integer", arg))
        })
        .collect()
}

fn precision(flags: &ParsedFlags) -> anyhow::Result<usize> {
    let precision = flags.get_int("precision").unwrap_or(DEFAULT_PRECISION);
    usize::try_from(precision).with_context(|| format!("invalid precision {}", precision))
}

fn format_decimal(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}
