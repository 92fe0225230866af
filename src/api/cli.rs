use std::fmt::Display;
use std::io::{BufRead, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Args, Parser, Subcommand};

use super::format::{format_currency, format_percent};
use super::{
    DEFAULT_ANNUAL_RETURN_RATE, DEFAULT_ANNUAL_WITHDRAWAL_RATE, DEFAULT_MONTHLY_CONTRIBUTION,
    DEFAULT_TARGET_MONTHLY_WITHDRAWAL, DEFAULT_YEARS_TO_RETIREMENT, build_project_response,
    build_required_response,
};
use crate::core::{
    CalculationInput, CalculationResult, ComputeError, ContributionGoal, Field,
    RawCalculationInput, RawContributionGoal, RequiredContribution, ValidationError,
    parse_numeric, required_contribution, run_projection,
};

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    version,
    about = "Retirement savings projection (monthly compounding contributions)"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "NESTEGG_LOG",
        default_value = "info",
        help = "Log filter, e.g. info, debug or nestegg=debug"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API and the dashboard
    Serve(ServeArgs),
    /// Project the balance reached by a fixed monthly contribution
    Project(ProjectArgs),
    /// Solve for the monthly contribution that sustains a target withdrawal
    Required(RequiredArgs),
    /// Ask for the inputs on stdin
    Prompt(OutputArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "NESTEGG_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,
    #[arg(long, env = "NESTEGG_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub monthly_contribution: f64,
    #[arg(long, help = "Years of contributions before retirement")]
    pub years: u32,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_hyphen_values = true,
        help = "Expected annual return in percent, e.g. 10"
    )]
    pub annual_return_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        allow_hyphen_values = true,
        help = "Annual withdrawal rate in retirement in percent, e.g. 4"
    )]
    pub annual_withdrawal_rate: f64,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RequiredArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub target_monthly_withdrawal: f64,
    #[arg(long, help = "Years of contributions before retirement")]
    pub years: u32,
    #[arg(
        long,
        default_value_t = 10.0,
        allow_hyphen_values = true,
        help = "Expected annual return in percent, e.g. 10"
    )]
    pub annual_return_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        allow_hyphen_values = true,
        help = "Annual withdrawal rate in retirement in percent, e.g. 4"
    )]
    pub annual_withdrawal_rate: f64,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, default_value = "SGD", help = "Currency symbol used in printed amounts")]
    pub currency: String,
    #[arg(long, help = "Print the JSON response instead of a text report")]
    pub json: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("input ended before all answers were given")]
    UnexpectedEof,
    #[error("unknown mode {0:?}; answer p or r")]
    UnknownMode(String),
}

fn build_input(args: &ProjectArgs) -> Result<CalculationInput, ValidationError> {
    CalculationInput::new(
        args.monthly_contribution,
        args.years,
        args.annual_return_rate / 100.0,
        args.annual_withdrawal_rate / 100.0,
    )
}

fn build_goal(args: &RequiredArgs) -> Result<ContributionGoal, ValidationError> {
    ContributionGoal::new(
        args.target_monthly_withdrawal,
        args.years,
        args.annual_return_rate / 100.0,
        args.annual_withdrawal_rate / 100.0,
    )
}

pub fn run_project(args: &ProjectArgs, out: &mut impl Write) -> Result<(), CliError> {
    let input = build_input(args)?;
    let result = run_projection(&input)?;
    write_projection(&input, &result, &args.output, out)
}

pub fn run_required(args: &RequiredArgs, out: &mut impl Write) -> Result<(), CliError> {
    let goal = build_goal(args)?;
    let solved = required_contribution(&goal)?;
    write_required(&goal, &solved, &args.output, out)
}

fn write_projection(
    input: &CalculationInput,
    result: &CalculationResult,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if output.json {
        serde_json::to_writer_pretty(&mut *out, &build_project_response(input, result))?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_projection(input, result, &output.currency))?;
    }
    Ok(())
}

fn write_required(
    goal: &ContributionGoal,
    solved: &RequiredContribution,
    output: &OutputArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if output.json {
        serde_json::to_writer_pretty(&mut *out, &build_required_response(goal, solved))?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render_required(goal, solved, &output.currency))?;
    }
    Ok(())
}

/// Interactive mode. Empty answers take the dashboard defaults.
pub fn run_prompt(
    output: &OutputArgs,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(out, "=== Retirement planning ===")?;
    let mode = ask_line(
        input,
        out,
        "Mode: [p]roject a contribution or [r]equired contribution for a target withdrawal [p]: ",
    )?;

    match mode.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "project" => {
            let monthly_contribution = ask_number(
                input,
                out,
                "Monthly contribution",
                DEFAULT_MONTHLY_CONTRIBUTION,
                Field::MonthlyContribution,
            )?;
            let (years_to_retirement, annual_return_rate, annual_withdrawal_rate) =
                ask_shared(input, out)?;
            let calc_input = RawCalculationInput {
                monthly_contribution,
                years_to_retirement,
                annual_return_rate,
                annual_withdrawal_rate,
            }
            .validate()?;
            let result = run_projection(&calc_input)?;
            writeln!(out)?;
            write_projection(&calc_input, &result, output, out)
        }
        "r" | "required" => {
            let target_monthly_withdrawal = ask_number(
                input,
                out,
                "Desired monthly withdrawal",
                DEFAULT_TARGET_MONTHLY_WITHDRAWAL,
                Field::TargetMonthlyWithdrawal,
            )?;
            let (years_to_retirement, annual_return_rate, annual_withdrawal_rate) =
                ask_shared(input, out)?;
            let goal = RawContributionGoal {
                target_monthly_withdrawal,
                years_to_retirement,
                annual_return_rate,
                annual_withdrawal_rate,
            }
            .validate()?;
            let solved = required_contribution(&goal)?;
            writeln!(out)?;
            write_required(&goal, &solved, output, out)
        }
        other => Err(CliError::UnknownMode(other.to_string())),
    }
}

/// Years, return rate and withdrawal rate. Rates are asked in percent.
fn ask_shared(input: &mut impl BufRead, out: &mut impl Write) -> Result<(f64, f64, f64), CliError> {
    let years = ask_number(
        input,
        out,
        "Years until retirement",
        DEFAULT_YEARS_TO_RETIREMENT,
        Field::YearsToRetirement,
    )?;
    let return_pct = ask_number(
        input,
        out,
        "Annual return (%)",
        DEFAULT_ANNUAL_RETURN_RATE * 100.0,
        Field::AnnualReturnRate,
    )?;
    let withdrawal_pct = ask_number(
        input,
        out,
        "Annual withdrawal rate (%)",
        DEFAULT_ANNUAL_WITHDRAWAL_RATE * 100.0,
        Field::AnnualWithdrawalRate,
    )?;
    Ok((years, return_pct / 100.0, withdrawal_pct / 100.0))
}

fn ask_number(
    input: &mut impl BufRead,
    out: &mut impl Write,
    question: &str,
    default: f64,
    field: Field,
) -> Result<f64, CliError> {
    let answer = ask_line(input, out, &format!("{question} [{default}]: "))?;
    if answer.trim().is_empty() {
        return Ok(default);
    }
    Ok(parse_numeric(&answer, field)?)
}

fn ask_line(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> Result<String, CliError> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::UnexpectedEof);
    }
    Ok(line)
}

fn row(label: &str, value: impl Display) -> String {
    format!("  {label:<32}{value}")
}

pub fn render_projection(
    input: &CalculationInput,
    result: &CalculationResult,
    currency: &str,
) -> String {
    let money = |value: f64| format_currency(value, currency, 2);
    let mut lines = vec![
        "Retirement projection".to_string(),
        row("Monthly contribution", money(input.monthly_contribution())),
        row("Years to retirement", input.years_to_retirement()),
        row(
            "Annual return rate",
            format!(
                "{} (monthly {})",
                format_percent(input.annual_return_rate(), 2),
                format_percent(result.monthly_rate, 4)
            ),
        ),
        row(
            "Annual withdrawal rate",
            format_percent(input.annual_withdrawal_rate(), 2),
        ),
        String::new(),
        "Results".to_string(),
        row("Final balance", money(result.final_balance)),
        row("Total contributed", money(result.total_contributed)),
        row("Earnings", money(result.earnings)),
        row(
            "Sustainable monthly withdrawal",
            money(result.sustainable_monthly_withdrawal),
        ),
    ];

    let insights = result.insights();
    let mut insight_lines = Vec::new();
    if let Some(multiple) = insights.growth_multiple {
        insight_lines.push(format!(
            "  - Savings grow to {multiple:.1}x the amount contributed"
        ));
    }
    if let Some(share) = insights.earnings_share {
        insight_lines.push(format!(
            "  - Earnings make up {} of the final balance",
            format_percent(share, 1)
        ));
    }
    if let Some(share) = insights.withdrawal_share {
        insight_lines.push(format!(
            "  - The monthly withdrawal is {} of the final balance",
            format_percent(share, 2)
        ));
    }
    if !insight_lines.is_empty() {
        lines.push(String::new());
        lines.push("Insights".to_string());
        lines.extend(insight_lines);
    }

    lines.push(String::new());
    lines.push(format!("{:>5} {:>22} {:>22}", "Year", "Balance", "Contributed"));
    for (year, balance, contributed) in result.yearly_points() {
        lines.push(format!(
            "{:>5} {:>22} {:>22}",
            year,
            money(balance),
            money(contributed)
        ));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn render_required(
    goal: &ContributionGoal,
    solved: &RequiredContribution,
    currency: &str,
) -> String {
    let money = |value: f64| format_currency(value, currency, 2);
    let header = [
        "Required contribution".to_string(),
        row(
            "Desired monthly withdrawal",
            money(goal.target_monthly_withdrawal()),
        ),
        row("Balance needed at retirement", money(solved.required_balance)),
        row(
            "Monthly contribution needed",
            money(solved.required_monthly_contribution),
        ),
    ]
    .join("\n");

    format!(
        "{header}\n\n{}",
        render_projection(&solved.input, &solved.projection, currency)
    )
}
