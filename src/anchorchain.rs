extern crate clap;
use clap::*;

mod cmd_anchorchain;

fn main() -> anyhow::Result<()> {
    let app = Command::new("anchorchain")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`anchorchain` - Chains scored anchors into read overlaps")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(cmd_anchorchain::overlap::make_subcommand())
        .subcommand(cmd_anchorchain::chains::make_subcommand())
        .after_help(
            r###"Subcommands:

* overlap - Summarize each retained chain as one overlap
* chains  - Overlaps together with the anchor indices of their chains

Input is one anchor per line, as produced by the DP pass:

    query_read_id target_read_id query_pos target_pos score predecessor

A predecessor of -1 starts a chain; any other value must be a lower line index.

"###,
        );

    let matches = app.get_matches();
    cmd_anchorchain::init_logger(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("overlap", sub_matches)) => cmd_anchorchain::overlap::execute(sub_matches),
        Some(("chains", sub_matches)) => cmd_anchorchain::chains::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
