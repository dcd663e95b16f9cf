use clap::*;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("overlap")
        .about("Summarize retained chains as overlaps")
        .after_help(
            r###"
Output columns (tab separated):

    qid qstart qend strand tid tstart tend residues

Starts never exceed ends; strand is `-` when the target runs backwards along the chain.

Examples:
  anchorchain overlap anchors.tsv --min-score 20 -p 4 -o overlaps.tsv

"###,
        );

    super::engine_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let output = super::run_engine(args)?;

    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    for overlap in &output.overlaps {
        writeln!(writer, "{}", overlap)?;
    }

    Ok(())
}
