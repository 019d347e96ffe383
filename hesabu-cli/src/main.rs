//! Solves a JSON file of named equations from the command line.
//!
//! The problem file is a single object mapping equation names to formulas:
//!
//! ```json
//! { "price": "2.5", "quantity": 4, "total": "price * quantity" }
//! ```

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use hesabu_solve::{Config, Solution, Solver, Value};
use serde_json::{Map, Value as Json};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hesabu", version, about = "Solve a set of named equations")]
struct Args {
    /// JSON problem file, or `-` to read from stdin
    problem: PathBuf,

    /// Print the solving order instead of solving
    #[arg(long, default_value_t = false)]
    order: bool,

    /// Log each formula's syntax tree and every evaluated equation
    #[arg(long, env = "HESABU_DEBUG", default_value_t = false)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let problem = load_problem(&args.problem)?;

    let started = Instant::now();
    let mut solver = Solver::with_config(Config::default().with_debug(args.debug));
    for (name, formula) in &problem {
        let formula = formula_text(name, formula)?;
        solver.add(name.as_str(), formula.as_deref())?;
    }
    info!(
        equations = solver.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "registered equations"
    );

    let output = if args.order {
        let order = solver.solving_order()?;
        Json::from(order)
    } else {
        let started = Instant::now();
        let solution = solver.solve()?;
        info!(
            values = solution.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "solved equations"
        );
        to_json(&solution)
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_problem(path: &Path) -> Result<Map<String, Json>> {
    let text = if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read problem from stdin")?;
        text
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read problem file {}", path.display()))?
    };

    match serde_json::from_str(&text).context("problem is not valid JSON")? {
        Json::Object(equations) => Ok(equations),
        other => bail!("problem must be a JSON object of equations, found {other}"),
    }
}

/// Returns the formula text of a problem entry.
///
/// Numbers are accepted as constants and `null` is passed through as a
/// missing formula so the solver can report it.
fn formula_text(name: &str, formula: &Json) -> Result<Option<String>> {
    match formula {
        Json::String(text) => Ok(Some(text.clone())),
        Json::Number(number) => Ok(Some(number.to_string())),
        Json::Null => Ok(None),
        other => bail!("formula for {name} must be a string or a number, found {other}"),
    }
}

fn to_json(solution: &Solution) -> Json {
    let values = solution
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect::<Map<_, _>>();
    Json::Object(values)
}

/// Numbers are written with every digit. Any that are not valid JSON
/// number text are written as strings.
fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(flag) => Json::Bool(*flag),
        Value::Number(number) => {
            let text = number.to_string();
            text.parse::<serde_json::Number>()
                .map_or(Json::String(text), Json::Number)
        }
    }
}
