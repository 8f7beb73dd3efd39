extern crate clap;
extern crate mandelbench;
extern crate num_cpus;
extern crate tracing_subscriber;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use mandelbench::{
    catalog, BenchError, Harness, Preset, ResultsLog, StrategyRegistry, Summary, View,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const STRATEGY: &str = "strategy";
const PRESET: &str = "preset";
const VIEW: &str = "view";
const REPEAT: &str = "repeat";
const WORKERS: &str = "workers";
const LOG: &str = "log";

fn log_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(LOG)
        .long(LOG)
        .short("l")
        .takes_value(true)
        .env("MANDELBENCH_LOG")
        .default_value("mandelbrot.log")
        .help("Results log to append to and read from")
}

fn preset_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(PRESET)
        .long(PRESET)
        .short("p")
        .takes_value(true)
        .default_value("easy")
        .possible_values(&["easy", "medium", "hard"])
        .help("Preset to benchmark against")
}

fn repeat_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(REPEAT)
        .long(REPEAT)
        .short("n")
        .takes_value(true)
        .default_value("1")
        .validator(|s| {
            validate_range(
                &s,
                1,
                1000,
                "Could not parse repeat count",
                "Repeat count must be between 1 and 1000",
            )
        })
        .help("Number of timed runs per strategy")
}

fn workers_arg<'a, 'b>(default: &'a str, max_workers: usize) -> Arg<'a, 'b> {
    Arg::with_name(WORKERS)
        .long(WORKERS)
        .short("w")
        .takes_value(true)
        .default_value(default)
        .validator(move |s| {
            validate_range(
                &s,
                1,
                max_workers,
                "Could not parse worker count",
                &format!("Worker count must be between 1 and {}", max_workers),
            )
        })
        .help("Number of worker threads for the parallel strategies")
}

fn args<'a>(default_workers: &'a str) -> ArgMatches<'a> {
    let max_workers = num_cpus::get() * 4;

    App::new("mandelbench")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot strategy benchmarks")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("presets").about("List the preset catalog"))
        .subcommand(
            SubCommand::with_name("run")
                .about("Time one strategy against one preset")
                .arg(
                    Arg::with_name(STRATEGY)
                        .long(STRATEGY)
                        .short("s")
                        .takes_value(true)
                        .required(true)
                        .help("Strategy to time (serial, tiled, row-queue)"),
                )
                .arg(preset_arg())
                .arg(
                    Arg::with_name(VIEW)
                        .long(VIEW)
                        .short("v")
                        .takes_value(true)
                        .default_value("default")
                        .possible_values(&["default", "center", "deep"])
                        .help("Region of the plane to compute"),
                )
                .arg(repeat_arg())
                .arg(workers_arg(default_workers, max_workers))
                .arg(log_arg()),
        )
        .subcommand(
            SubCommand::with_name("run-all")
                .about("Time every strategy against every view of a preset")
                .arg(preset_arg())
                .arg(repeat_arg())
                .arg(workers_arg(default_workers, max_workers))
                .arg(log_arg()),
        )
        .subcommand(
            SubCommand::with_name("stats")
                .about("Summarize the results log")
                .arg(log_arg()),
        )
        .get_matches()
}

fn print_header(title: &str, preset: &Preset) {
    let bar = "=".repeat(title.len() + 22);
    println!("\n{}", bar);
    println!("  Mandelbrot Runner: {}  ", title);
    println!("  Config Preset: {}  ", preset.name());
    println!("{}\n", bar);
}

// Runs and reports; returns how many records failed to reach the log.
fn bench(
    harness: &Harness,
    strategy: &str,
    preset: &Preset,
    repeat: usize,
) -> Result<usize, BenchError> {
    print_header(strategy, preset);
    let mut unlogged = 0;
    for _ in 0..repeat {
        let outcome = harness.run(strategy, preset)?;
        println!(
            "[{}] Compute Mandelbrot ✔ ({:.3}s, {} interior pixels)",
            outcome.record.implementation(),
            outcome.record.elapsed_seconds(),
            outcome.interior
        );
        if let Some(e) = outcome.log_error {
            eprintln!("Warning: {}", e);
            unlogged += 1;
        }
    }
    Ok(unlogged)
}

fn execute(matches: &ArgMatches) -> Result<usize, BenchError> {
    match matches.subcommand() {
        ("presets", Some(_)) => {
            for preset in catalog()? {
                println!("{}", preset);
            }
            Ok(0)
        }
        ("run", Some(sub)) => {
            let workers = usize::from_str(sub.value_of(WORKERS).unwrap_or("1")).unwrap_or(1);
            let registry = StrategyRegistry::builtin(workers)?;
            let log = ResultsLog::open(sub.value_of(LOG).unwrap_or("mandelbrot.log"));
            let harness = Harness::new(&registry, &log);
            let view = View::from_str(sub.value_of(VIEW).unwrap_or("default"))?;
            let preset = Preset::named(sub.value_of(PRESET).unwrap_or("easy"))?.with_view(view)?;
            let repeat = usize::from_str(sub.value_of(REPEAT).unwrap_or("1")).unwrap_or(1);
            let strategy = sub.value_of(STRATEGY).unwrap_or_default();
            bench(&harness, strategy, &preset, repeat)
        }
        ("run-all", Some(sub)) => {
            let workers = usize::from_str(sub.value_of(WORKERS).unwrap_or("1")).unwrap_or(1);
            let registry = StrategyRegistry::builtin(workers)?;
            let log = ResultsLog::open(sub.value_of(LOG).unwrap_or("mandelbrot.log"));
            let harness = Harness::new(&registry, &log);
            let base = Preset::named(sub.value_of(PRESET).unwrap_or("easy"))?;
            let repeat = usize::from_str(sub.value_of(REPEAT).unwrap_or("1")).unwrap_or(1);
            let mut unlogged = 0;
            for strategy in registry.names() {
                for view in View::ALL.iter() {
                    let preset = base.with_view(*view)?;
                    unlogged += bench(&harness, strategy, &preset, repeat)?;
                }
            }
            Ok(unlogged)
        }
        ("stats", Some(sub)) => {
            let log = ResultsLog::open(sub.value_of(LOG).unwrap_or("mandelbrot.log"));
            print!("{}", Summary::from_log(&log)?);
            Ok(0)
        }
        _ => Ok(0),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let default_workers = num_cpus::get().to_string();
    let matches = args(&default_workers);

    match execute(&matches) {
        Err(e) => {
            eprintln!("Benchmark failure: {}", e);
            std::process::exit(1);
        }
        Ok(0) => {}
        Ok(unlogged) => {
            eprintln!("{} record(s) could not be written to the results log", unlogged);
            std::process::exit(2);
        }
    }
}
