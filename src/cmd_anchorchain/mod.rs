//! Subcommand modules for the `anchorchain` binary.

pub mod chains;
pub mod overlap;

use anchorchain::libs::anchor::{read_anchor_records, AnchorBatch};
use anchorchain::libs::chaining::{ChainEngine, ChainOutput, EngineOpts, MaterializeMode};
use anchorchain::libs::overlap::OverlapFilter;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

pub fn init_logger(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(filter_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Input, output and engine arguments shared by every subcommand.
pub fn engine_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .required(true)
            .num_args(1)
            .index(1)
            .help("Anchor file. [stdin] for standard input"),
    )
    .arg(
        Arg::new("outfile")
            .long("outfile")
            .short('o')
            .num_args(1)
            .default_value("stdout")
            .help("Output filename. [stdout] for screen"),
    )
    .arg(
        Arg::new("min_score")
            .long("min-score")
            .num_args(1)
            .default_value("0")
            .value_parser(value_parser!(f32))
            .help("Anchors scoring below this never end a chain"),
    )
    .arg(
        Arg::new("parallel")
            .long("parallel")
            .short('p')
            .num_args(1)
            .default_value("1")
            .value_parser(value_parser!(usize))
            .help("Number of threads, 0 for one per core"),
    )
    .arg(
        Arg::new("contiguous")
            .long("contiguous")
            .action(ArgAction::SetTrue)
            .help("Every chain is a run of consecutive anchors; skip the link walk"),
    )
    .arg(
        Arg::new("min_residues")
            .long("min-residues")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Drop overlaps with fewer anchors"),
    )
    .arg(
        Arg::new("min_overlap_len")
            .long("min-overlap-len")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .help("Drop overlaps whose shorter span is below this"),
    )
}

pub fn engine_opts(args: &ArgMatches) -> EngineOpts {
    let min_residues = args.get_one::<u32>("min_residues").copied();
    let min_overlap_len = args.get_one::<u32>("min_overlap_len").copied();

    let filter = if min_residues.is_some() || min_overlap_len.is_some() {
        Some(OverlapFilter {
            min_residues: min_residues.unwrap_or(0),
            min_overlap_len: min_overlap_len.unwrap_or(0),
        })
    } else {
        None
    };

    EngineOpts {
        min_score: *args.get_one::<f32>("min_score").unwrap(),
        threads: *args.get_one::<usize>("parallel").unwrap(),
        mode: if args.get_flag("contiguous") {
            MaterializeMode::Contiguous
        } else {
            MaterializeMode::Backtrace
        },
        filter,
    }
}

/// Reads the anchors named by `infile` and runs the engine over them.
pub fn run_engine(args: &ArgMatches) -> anyhow::Result<ChainOutput> {
    let infile = args.get_one::<String>("infile").unwrap();
    let reader = intspan::reader(infile);
    let batch: AnchorBatch = read_anchor_records(reader)?;
    log::info!("Read {} anchors from {}", batch.len(), infile);

    let engine = ChainEngine::new(engine_opts(args))?;
    let output = engine.run(&batch.anchors, &batch.score, &batch.predecessor)?;

    Ok(output)
}
