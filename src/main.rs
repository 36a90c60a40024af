use clap::{Args, Parser, Subcommand};
use flowline::analysis::{parse_rows, BottleneckDetector, BottleneckTable, RawEventRow};
use flowline::core::observers::LoggingObserver;
use flowline::{
    replicate, ConcurrencyMode, ExecutionConfig, FlowlineError, Scenario, SimulationEngine,
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "flowline", version, about = "Serial production line simulator with bottleneck detection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a scenario and detect its bottlenecks
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Directory for events.json, buffer.json and active_periods.json
        #[arg(long)]
        output: Option<PathBuf>,
        /// Log line state every n ticks at debug level
        #[arg(long, default_value_t = 0)]
        trace_every: u64,
    },
    /// Detect bottlenecks in a previously recorded event log
    Analyze {
        /// JSON array of event rows
        #[arg(long)]
        events: PathBuf,
        /// Number of stations on the line
        #[arg(long)]
        stations: usize,
        /// Number of steps to analyse, defaults to the latest event time
        #[arg(long)]
        horizon: Option<u64>,
        /// Directory for active_periods.json
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run several seeded replications and compare their bottlenecks
    Replicate {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Seeds to run, one replication each
        #[arg(long, value_delimiter = ',', required = true)]
        seeds: Vec<u64>,
        /// Spread replications over a thread pool
        #[arg(long)]
        parallel: bool,
        /// Thread pool size when running in parallel
        #[arg(long)]
        threads: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Scenario JSON file; overrides the inline options below
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Comma separated mean process time per station
    #[arg(long, value_delimiter = ',')]
    process_times: Vec<f64>,
    #[arg(long, default_value_t = Scenario::DEFAULT_HORIZON)]
    horizon: u64,
    /// Capacity of the interior buffers
    #[arg(long, default_value_t = Scenario::DEFAULT_CAPACITY)]
    capacity: u64,
    /// Initial level of the interior buffers
    #[arg(long, default_value_t = 0)]
    initial_level: u64,
    /// Level the supply buffer is restocked to every tick
    #[arg(long, default_value_t = Scenario::DEFAULT_SUPPLY_TARGET)]
    supply_target: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl ScenarioArgs {
    fn load(&self) -> Result<Scenario, FlowlineError> {
        let scenario = match &self.scenario {
            Some(path) => Scenario::from_json_file(path)?,
            None => Scenario::new(self.process_times.clone())
                .with_horizon(self.horizon)
                .with_buffer_capacity(self.capacity)
                .with_initial_level(self.initial_level)
                .with_supply_target(self.supply_target)
                .with_seed(self.seed),
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

fn write_json<T: serde::Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<(), FlowlineError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn print_frequency(table: &BottleneckTable) {
    let counts = table.bottleneck_frequency();
    let shares = table.bottleneck_shares();
    println!("{:<8} {:>8} {:>8}", "station", "steps", "share");
    for ((name, count), share) in table.station_names().iter().zip(counts).zip(shares) {
        println!("{:<8} {:>8} {:>7.1}%", name, count, share * 100.0);
    }
}

fn run(cli: Cli) -> Result<(), FlowlineError> {
    match cli.command {
        Command::Run {
            scenario,
            output,
            trace_every,
        } => {
            let scenario = scenario.load()?;
            let mut engine = SimulationEngine::new(&scenario)?;
            if trace_every > 0 {
                engine.add_observer(Box::new(LoggingObserver::every(trace_every)));
            }
            let result = engine.run();
            let table = BottleneckDetector::new(&result.events)?.detect();

            if let Some(dir) = output {
                write_json(&dir, "events.json", result.events.records())?;
                write_json(&dir, "buffer.json", &result.buffer_levels)?;
                write_json(&dir, "active_periods.json", &table)?;
            }
            print_frequency(&table);
        }
        Command::Analyze {
            events,
            stations,
            horizon,
            output,
        } => {
            let rows: Vec<RawEventRow> = serde_json::from_str(&fs::read_to_string(&events)?)?;
            let mut log = parse_rows(stations, &rows)?;
            if let Some(horizon) = horizon {
                log = log.with_horizon(horizon);
            }
            let table = BottleneckDetector::new(&log)?.detect();

            if let Some(dir) = output {
                write_json(&dir, "active_periods.json", &table)?;
            }
            print_frequency(&table);
        }
        Command::Replicate {
            scenario,
            seeds,
            parallel,
            threads,
        } => {
            let scenario = scenario.load()?;
            let mut config = ExecutionConfig::new();
            if parallel {
                config = config.with_concurrency(ConcurrencyMode::Rayon);
            }
            if let Some(threads) = threads {
                config = config.with_thread_pool_size(threads);
            }

            for replication in replicate(&scenario, &seeds, &config)? {
                println!("seed {}:", replication.seed);
                print_frequency(&replication.bottlenecks);
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
