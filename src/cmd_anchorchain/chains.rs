use clap::*;
use itertools::Itertools;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("chains")
        .about("Output overlaps with the anchors of their chains")
        .after_help(
            r###"
Each line is an overlap followed by a ninth column: the anchor indices (0-based input
line numbers, comments excluded) of its chain, start to end, comma separated.

Examples:
  anchorchain chains anchors.tsv --min-score 20
  anchorchain chains anchors.tsv --contiguous --min-residues 3

"###,
        );

    super::engine_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let output = super::run_engine(args)?;

    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    for (overlap, chain) in output.chains() {
        writeln!(writer, "{}\t{}", overlap, chain.iter().join(","))?;
    }

    Ok(())
}
