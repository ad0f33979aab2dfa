//! tpqbogo: command-line front end.
//!
//! ```bash
//! # Sort a shuffled array of 5 elements and print statistics
//! tpqbogo 5
//!
//! # Only print the elapsed nanoseconds
//! tpqbogo -N 6
//!
//! # CSV timings for sizes 1..=8, also saved as a Links Notation report
//! tpqbogo -S 8 --lino speedtest.lino
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tpqbogo::report::{render_display, render_nanoseconds, SpeedtestReport, CSV_HEADER};
use tpqbogo::{
    run_size, speedtest, BogoError, EvaluatorConfig, ParallelEvaluator, Scheduler, TracingObserver,
};

/// An implementation of Threaded Pseudo-Quantum Bogosort.
#[derive(Parser, Debug)]
#[command(name = "tpqbogo")]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// The size of the array to sort. Must be a positive non-zero integer.
    size: i64,

    /// Print debug messages to stderr.
    #[arg(short = 'D', long)]
    debug: bool,

    /// Only output the elapsed time in nanoseconds.
    #[arg(short = 'N', long)]
    nanoseconds: bool,

    /// Test sort speeds for arrays of lengths 1 to <SIZE>. Outputs results as
    /// CSV with headings.
    #[arg(short = 'S', long)]
    speedtest: bool,

    /// How permutation tasks are mapped onto threads.
    #[arg(long, value_enum, default_value_t = SchedulerArg::Threads)]
    scheduler: SchedulerArg,

    /// Also save the speedtest as a Links Notation report.
    #[arg(long, requires = "speedtest")]
    lino: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchedulerArg {
    /// One OS thread per permutation
    Threads,
    /// One rayon task per permutation
    Pool,
}

impl From<SchedulerArg> for Scheduler {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::Threads => Scheduler::Threads,
            SchedulerArg::Pool => Scheduler::Pool,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sort(#[from] BogoError),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tpqbogo: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let scheduler = Scheduler::from(args.scheduler);
    let config = EvaluatorConfig::default().with_scheduler(scheduler);
    let evaluator = if args.debug {
        ParallelEvaluator::with_observer(config, TracingObserver)
    } else {
        ParallelEvaluator::new(config)
    };
    let mut rng = rand::thread_rng();

    if args.speedtest {
        println!("{}", CSV_HEADER);
        let mut rows = Vec::new();
        let mut failure = None;
        for row in speedtest(&evaluator, args.size, &mut rng)? {
            match row {
                Ok(row) => {
                    println!("{}", row.to_csv_row());
                    rows.push(row);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(path) = &args.lino {
            if !rows.is_empty() {
                let report = SpeedtestReport::new(
                    "Threaded Pseudo-Quantum Bogosort speedtest",
                    scheduler,
                    rows,
                );
                report.save_lino(path)?;
                info!(path = %path.display(), "Lino report written");
            }
        }
        return match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        };
    }

    let result = run_size(&evaluator, args.size, &mut rng)?;
    if args.nanoseconds {
        println!("{}", render_nanoseconds(&result));
    } else {
        print!("{}", render_display(&result));
    }
    Ok(())
}
