mod report;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{info, LevelFilter};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use cpu_schedule::loader::{load_processes, parse_inline_spec};
use cpu_schedule::models::ProcessSpec;
use cpu_schedule::policies::{PolicyKind, Variant};
use cpu_schedule::simulator::{SimulationConfig, SimulationOutcome, SimulationRequest, Simulator};
use cpu_schedule::workload::WorkloadGenerator;

fn input_args() -> [Arg; 5] {
    [
        Arg::new("process")
            .short('p')
            .long("process")
            .value_name("ARRIVAL,BURST[,PRIORITY]")
            .action(ArgAction::Append)
            .help("Process given inline (repeatable)"),
        Arg::new("file")
            .short('f')
            .long("file")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .help("Process file, one 'pid arrival burst priority' line per process"),
        Arg::new("strict")
            .long("strict")
            .action(ArgAction::SetTrue)
            .help("Reject the whole file on the first malformed line"),
        Arg::new("max_processes")
            .long("max-processes")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .default_value("10")
            .help("Maximum number of processes (0 = unlimited)"),
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print the result as JSON"),
    ]
}

fn quantum_arg() -> Arg {
    Arg::new("quantum")
        .short('q')
        .long("quantum")
        .value_name("UNITS")
        .value_parser(value_parser!(i64))
        .allow_negative_numbers(true)
        .help("Round-Robin time quantum")
}

fn variant_arg() -> Arg {
    Arg::new("variant")
        .long("variant")
        .value_name("legacy|classic")
        .value_parser(|s: &str| s.parse::<Variant>())
        .default_value("legacy")
        .help("Selection-rule flavor for SJF, RR and NPP")
}

fn command_name(kind: PolicyKind) -> &'static str {
    match kind {
        PolicyKind::Fcfs => "fcfs",
        PolicyKind::Sjf => "sjf",
        PolicyKind::Srtf => "srtf",
        PolicyKind::RoundRobin => "rr",
        PolicyKind::NonPreemptivePriority => "npp",
        PolicyKind::PreemptivePriority => "pp",
    }
}

fn policy_command(kind: PolicyKind) -> Command {
    let mut cmd = Command::new(command_name(kind))
        .about(kind.description())
        .args(input_args());
    if kind.requires_quantum() {
        cmd = cmd.arg(quantum_arg().required(true));
    }
    if kind.has_variants() {
        cmd = cmd.arg(variant_arg());
    }
    cmd
}

fn cli() -> Command {
    Command::new("cpu-schedule")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Uniprocessor CPU scheduling simulator")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommands(PolicyKind::ALL.into_iter().map(policy_command))
        .subcommand(
            Command::new("compare")
                .about("Run every applicable policy on the same processes")
                .args(input_args())
                .arg(quantum_arg())
                .arg(variant_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Run a JSON simulation request")
                .arg(
                    Arg::new("request")
                        .required(true)
                        .value_name("REQUEST.json")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Print a random process file")
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                )
                .arg(Arg::new("seed").long("seed").value_parser(value_parser!(u64)))
                .arg(
                    Arg::new("max_arrival")
                        .long("max-arrival")
                        .value_parser(value_parser!(i64))
                        .default_value("10"),
                )
                .arg(
                    Arg::new("min_burst")
                        .long("min-burst")
                        .value_parser(value_parser!(i64))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("max_burst")
                        .long("max-burst")
                        .value_parser(value_parser!(i64))
                        .default_value("10"),
                )
                .arg(
                    Arg::new("max_priority")
                        .long("max-priority")
                        .value_parser(value_parser!(i64))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the process set as JSON"),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = dispatch(&matches) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("compare", sub)) => compare(sub),
        Some(("run", sub)) => run_request_file(sub),
        Some(("generate", sub)) => generate(sub),
        Some((name, sub)) => {
            let kind: PolicyKind = name.parse().map_err(anyhow::Error::msg)?;
            simulate(kind, sub)
        }
        None => bail!("no subcommand given"),
    }
}

fn collect_processes(matches: &ArgMatches) -> Result<Vec<ProcessSpec>> {
    let mut specs = Vec::new();
    if let Some(path) = matches.get_one::<PathBuf>("file") {
        let loaded = load_processes(path, matches.get_flag("strict"))
            .with_context(|| format!("failed to load {}", path.display()))?;
        for e in &loaded.errors {
            eprintln!("warning: {}: skipped {e}", path.display());
        }
        info!(
            "loaded {} process(es) from {}",
            loaded.processes.len(),
            path.display()
        );
        specs.extend(loaded.processes);
    }
    if let Some(values) = matches.get_many::<String>("process") {
        for value in values {
            let spec = parse_inline_spec(value)
                .with_context(|| format!("invalid process '{value}'"))?;
            specs.push(spec);
        }
    }
    Ok(specs)
}

fn config_from(matches: &ArgMatches) -> SimulationConfig {
    match matches.get_one::<usize>("max_processes").copied() {
        Some(0) | None => SimulationConfig::new(),
        Some(max) => SimulationConfig::new().with_max_processes(max),
    }
}

fn variant_from(matches: &ArgMatches) -> Variant {
    matches
        .try_get_one::<Variant>("variant")
        .ok()
        .flatten()
        .copied()
        .unwrap_or_default()
}

fn quantum_from(matches: &ArgMatches) -> Option<i64> {
    matches.try_get_one::<i64>("quantum").ok().flatten().copied()
}

fn print_outcome(outcome: &SimulationOutcome, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", report::render_outcome(outcome));
    }
    Ok(())
}

fn simulate(kind: PolicyKind, matches: &ArgMatches) -> Result<()> {
    let mut request = SimulationRequest::new(collect_processes(matches)?, kind)
        .with_variant(variant_from(matches))
        .with_config(config_from(matches));
    request.quantum = quantum_from(matches);

    let outcome = Simulator::new()
        .run_request(&request)
        .with_context(|| format!("{} simulation failed", kind.name()))?;
    print_outcome(&outcome, matches.get_flag("json"))
}

fn compare(matches: &ArgMatches) -> Result<()> {
    let specs = collect_processes(matches)?;
    let simulator = Simulator::with_config(config_from(matches));
    let results = simulator.compare(&specs, quantum_from(matches), variant_from(matches));

    // Bad input fails the whole comparison; scheduling faults stay per row
    for (kind, result) in &results {
        if let Err(e) = result {
            if e.is_input_error() {
                bail!("comparison failed ({}): {e}", kind.name());
            }
        }
    }

    if matches.get_flag("json") {
        let entries: Vec<_> = results
            .iter()
            .map(|(kind, result)| match result {
                Ok(outcome) => json!({ "policy": kind, "outcome": outcome }),
                Err(e) => json!({ "policy": kind, "error": e.to_string() }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", report::render_comparison(&results));
    }
    Ok(())
}

fn run_request_file(matches: &ArgMatches) -> Result<()> {
    let Some(path) = matches.get_one::<PathBuf>("request") else {
        bail!("missing request file");
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request: SimulationRequest = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let outcome = Simulator::new()
        .run_request(&request)
        .with_context(|| format!("{} simulation failed", request.policy.name()))?;
    print_outcome(&outcome, matches.get_flag("json"))
}

fn generate(matches: &ArgMatches) -> Result<()> {
    let get = |name: &str| matches.get_one::<i64>(name).copied().unwrap_or_default();
    let count = matches.get_one::<usize>("count").copied().unwrap_or(5);
    let seed = matches
        .get_one::<u64>("seed")
        .copied()
        .unwrap_or_else(rand::random);
    info!("generating {count} process(es) with seed {seed}");

    let specs = WorkloadGenerator::new(count)
        .with_max_arrival(get("max_arrival"))
        .with_burst_range(get("min_burst"), get("max_burst"))
        .with_priority_range(1, get("max_priority").max(1))
        .generate_seeded(seed);

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&specs)?);
    } else {
        for s in &specs {
            println!(
                "{} {} {} {}",
                s.pid.unwrap_or_default(),
                s.arrival_time,
                s.burst_time,
                s.priority.unwrap_or_default()
            );
        }
    }
    Ok(())
}
