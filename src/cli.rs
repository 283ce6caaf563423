//! Command line driver running the demo programs on guest threads.
use crate::{
    error::Trap,
    intrinsics::{ModuleInstance, threadtest},
    metrics::ThreadMetrics,
    programs,
    runtime::{Compartment, Context, Function, Value, invoke_function},
};
use clap::{Parser, ValueEnum};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Runs guest programs on guest-created threads"
)]
pub struct Args {
    #[arg(short, long, value_enum, default_value_t = Scenario::Factorial)]
    pub scenario: Scenario,
    /// Argument passed to each thread's entry point.
    #[arg(short, long, default_value_t = 10, allow_negative_numbers = true)]
    pub arg: i32,
    /// Number of threads started by the stress scenario.
    #[arg(short, long, default_value_t = 16)]
    pub threads: usize,
    /// Print thread statistics when done.
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "text")]
    pub stats: Option<StatsFormat>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// One thread computing `arg!`.
    Factorial,
    /// One thread forking itself `arg` levels deep.
    FanOut,
    /// One thread leaving through `exitThread` with `arg`.
    Exit,
    /// `threads` threads each summing `1..=arg`.
    Stress,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    Text,
    Json,
}

/// Guest-side view of the thread intrinsics: a host context calling the
/// `threadTest` exports.
struct Driver {
    context: Context,
    module: ModuleInstance,
}

impl Driver {
    fn new() -> Self {
        let compartment = Compartment::new();
        Self {
            context: compartment.create_context(),
            module: threadtest::instantiate(&compartment),
        }
    }

    fn call(&self, export: &str, args: &[Value]) -> Result<Vec<Value>, Trap> {
        let Some(function) = self.module.export(export) else {
            return Err(Trap::Guest(format!("{} has no export {export}", self.module.name())));
        };
        invoke_function(&self.context, function, args)
    }

    fn create(&self, entry: &Function, argument: i32) -> Result<i64, Trap> {
        let results = self.call(
            "createThread",
            &[Value::FuncRef(Some(entry.clone())), Value::I32(argument)],
        )?;
        single_i64(&results)
    }

    fn join(&self, id: i64) -> Result<i64, Trap> {
        let results = self.call("joinThread", &[Value::I64(id)])?;
        single_i64(&results)
    }

    fn run_one(&self, entry: &Function, argument: i32) -> Result<i64, Trap> {
        let id = self.create(entry, argument)?;
        self.join(id)
    }
}

fn single_i64(results: &[Value]) -> Result<i64, Trap> {
    match results {
        [Value::I64(v)] => Ok(*v),
        other => Err(Trap::Guest(format!("expected a single i64, got {other:?}"))),
    }
}

fn run_scenario(args: &Args) -> Result<(), Trap> {
    let driver = Driver::new();
    match args.scenario {
        Scenario::Factorial => {
            let result = driver.run_one(&programs::factorial(), args.arg)?;
            println!("factorial({}) = {}", args.arg, result);
        }
        Scenario::FanOut => {
            let depth = u32::try_from(args.arg).unwrap_or(0).min(8);
            let result = driver.run_one(&programs::fork_fan_out(depth), 0)?;
            println!("fan-out depth {depth}: {result} leaves");
        }
        Scenario::Exit => {
            let code = driver.run_one(&programs::exit_with(), args.arg)?;
            println!("thread exited with {code}");
        }
        Scenario::Stress => {
            let entry = programs::sum_to();
            let ids = (0..args.threads)
                .map(|_| driver.create(&entry, args.arg))
                .collect::<Result<Vec<_>, _>>()?;
            let mut total = 0i64;
            for id in ids {
                total = total.wrapping_add(driver.join(id)?);
            }
            println!(
                "{} threads summing 1..={}: total {}",
                args.threads, args.arg, total
            );
        }
    }
    Ok(())
}

pub fn run_cli() -> ExitCode {
    let args = Args::parse();

    if let Err(trap) = run_scenario(&args) {
        eprintln!("Error running {:?}: {}", args.scenario, trap);
        return ExitCode::from(1);
    }

    match args.stats {
        Some(StatsFormat::Text) => println!("{}", ThreadMetrics::global().snapshot()),
        Some(StatsFormat::Json) => match serde_json::to_string_pretty(&ThreadMetrics::global().snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing statistics: {}", e);
                return ExitCode::from(1);
            }
        },
        None => {}
    }
    ExitCode::SUCCESS
}
