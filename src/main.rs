use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::parser::ValueSource;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use log::{info, LevelFilter};

use lp_simplex::{
    parse, read_file, write_lp, Direction, LinearProgram, LpResult, SimplexEngine, SolveStatus, SolverSettings,
};

/// Solve linear programs with the Big-M simplex method.
#[derive(Parser, Debug)]
#[command(name = "lp-simplex", version, about, args_override_self = true)]
struct Cli {
    /// LP files, read in order; the last one is solved. Reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Minimize the objective (also -min, -minimize)
    #[arg(long, visible_alias = "min", overrides_with = "maximize")]
    minimize: bool,

    /// Maximize the objective (also -max, -maximize)
    #[arg(long, visible_alias = "max", overrides_with = "minimize")]
    maximize: bool,

    /// Give up after this many pivots
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Epsilon used by the optimality and ratio tests
    #[arg(long, default_value_t = 1e-9)]
    tolerance: f64,

    /// Print the program in LP file format instead of solving it
    #[arg(long)]
    write: bool,

    /// More log output, repeat for more detail (RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let matches = Cli::command().get_matches_from(normalize_legacy_flags(std::env::args()));
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_logger(cli.verbose);

    match run(&cli, &matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lp-simplex: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli, matches: &ArgMatches) -> LpResult<()> {
    let mut program = load_program(&cli.files)?;
    if let Some(direction) = requested_direction(matches) {
        program.set_direction(direction);
    }

    if cli.write {
        write_lp(&program, &mut io::stdout().lock())?;
        return Ok(());
    }

    println!("{}", program);

    let settings = SolverSettings {
        max_iterations: cli.max_iterations,
        tolerance: cli.tolerance,
    };
    let direction = program.direction();
    let status = {
        let mut engine = SimplexEngine::with_settings(&mut program, settings);
        let status = engine.optimize(direction)?;
        if let Some(tableau) = engine.tableau() {
            println!("{}", tableau);
        }
        info!("{:?} after {} pivots", status, engine.iterations());
        status
    };

    report(&program, status);
    Ok(())
}

fn load_program(files: &[PathBuf]) -> LpResult<LinearProgram> {
    let mut program = None;
    for path in files {
        info!("reading {}", path.display());
        program = Some(read_file(path)?);
    }
    match program {
        Some(p) => Ok(p),
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            parse(&content)
        }
    }
}

fn report(program: &LinearProgram, status: SolveStatus) {
    match status {
        SolveStatus::Solution => {
            println!(
                "{} = {}",
                program.objective_label().unwrap_or("Z"),
                program.objective_value()
            );
            let x: Vec<String> = program.solution().iter().map(|v| v.to_string()).collect();
            println!("x = {}", x.join(" "));
        }
        SolveStatus::NoSolution => println!("No Solution"),
        SolveStatus::Unbounded => println!("Unbounded Solution"),
    }
}

/// Rewrites the single-dash spellings `-min`, `-minimize`, `-max` and
/// `-maximize` (any case) into their long forms.
fn normalize_legacy_flags(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.to_lowercase().as_str() {
            "-min" | "-minimize" => "--minimize".to_string(),
            "-max" | "-maximize" => "--maximize".to_string(),
            _ => arg,
        })
        .collect()
}

/// A direction flag only wins over the file's own direction when it comes
/// after the last file on the command line.
fn requested_direction(matches: &ArgMatches) -> Option<Direction> {
    let last_file = matches.indices_of("files").and_then(|indices| indices.last());
    let flag = [("minimize", Direction::Minimize), ("maximize", Direction::Maximize)]
        .into_iter()
        .filter(|(id, _)| matches.value_source(id) == Some(ValueSource::CommandLine))
        .filter_map(|(id, direction)| matches.index_of(id).map(|index| (index, direction)))
        .max_by_key(|(index, _)| *index);

    match (flag, last_file) {
        (Some((flag_index, direction)), Some(file_index)) if flag_index > file_index => Some(direction),
        (Some((_, direction)), None) => Some(direction),
        _ => None,
    }
}
