use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use misclass_rs::expr::{Expr, Formula};
use misclass_rs::oracle::{Oracle, OracleConfig};
use misclass_rs::types::{Assignment, Probabilities, Var};

#[derive(Debug, Parser)]
#[command(author, version, about = "Audit a k-DNF classifier for robustness to input noise")]
struct Cli {
    /// Log level filter (off, error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: simplelog::LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Maximum misclassification probability.
    MaxProb {
        #[command(flatten)]
        input: Input,

        /// Solver time limit (in seconds).
        #[arg(long, value_name = "SECS", default_value = "10")]
        time_limit: f64,

        /// Cross-check against exhaustive enumeration.
        #[arg(long)]
        check: bool,
    },

    /// Risky variables.
    Risky {
        #[command(flatten)]
        input: Input,

        /// Test a single variable instead of all of them.
        #[arg(long, value_name = "VAR")]
        variable: Option<Var>,
    },
}

#[derive(Debug, Args)]
struct Input {
    /// Formula, e.g. `(a & b) | (a & c)`.
    #[arg(long, value_name = "FORMULA")]
    formula: Expr,

    /// Observed assignment, e.g. `a=1,b=0`.
    #[arg(long, value_name = "ASSIGNMENT")]
    assignment: Assignment,

    /// Error probabilities, e.g. `a=0.1,b=0.2,c=0.05`.
    #[arg(long, value_name = "PROBS")]
    probs: Probabilities,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    match args.command {
        Command::MaxProb {
            input,
            time_limit,
            check,
        } => {
            println!("formula = {}", input.formula);
            println!("assignment = {}", input.assignment);
            println!("probs = {}", input.probs);

            let config = OracleConfig::default().with_time_limit(Duration::try_from_secs_f64(time_limit)?);
            let oracle = Oracle::with_config(config);
            let p = oracle.max_misclassification_probability(&input.formula, &input.assignment, &input.probs)?;
            println!("max misclassification probability = {}", p);

            if check {
                let reference =
                    misclass_rs::exhaustive::max_misclassification_probability(&input.formula, &input.assignment, &input.probs)?;
                println!("exhaustive = {}", reference);
                if (p - reference).abs() > 1e-9 {
                    color_eyre::eyre::bail!("oracle ({}) and exhaustive ({}) disagree", p, reference);
                }
            }
        }
        Command::Risky { input, variable } => {
            println!("formula = {}", input.formula);
            println!("assignment = {}", input.assignment);
            println!("probs = {}", input.probs);

            let oracle = Oracle::default();
            match variable {
                Some(var) => {
                    let risky = oracle.is_risky(&input.formula, &input.assignment, &input.probs, &var)?;
                    println!("{} is {}", var, if risky { "risky" } else { "not risky" });
                }
                None => {
                    let risky = oracle.risky_variables(&input.formula, &input.assignment, &input.probs)?;
                    println!(
                        "{} of {} variables are risky",
                        risky.len(),
                        input.formula.atoms().len()
                    );
                    for var in &risky {
                        println!("- {}", var);
                    }
                }
            }
        }
    }

    println!("\nAll done in {:.3}s", time_total.elapsed().as_secs_f64());
    Ok(())
}
