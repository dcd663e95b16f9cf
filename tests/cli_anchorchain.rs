use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

// qid tid qpos tpos score pred
const ANCHORS: &str = "\
# forward chain on reads 0/0
0 0 5 10 1 -1
0 0 20 25 2 0
0 0 35 40 3 1
# reverse pair on reads 1/2
1 2 0 40 1 -1
1 2 30 10 2 3
";

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_help() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("overlap").arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Summarize retained chains"));

    Ok(())
}

#[test]
fn command_overlap() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("anchors.tsv");
    fs::write(&infile, ANCHORS)?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    let output = cmd
        .arg("overlap")
        .arg(&infile)
        .arg("--min-score")
        .arg("2")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 2);
    assert_eq!(
        stdout,
        "0\t5\t35\t+\t0\t10\t40\t3\n1\t0\t30\t-\t2\t10\t40\t2\n"
    );

    Ok(())
}

#[test]
fn command_overlap_threshold() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("anchors.tsv");
    fs::write(&infile, ANCHORS)?;

    // only the forward terminal reaches 3
    let mut cmd = Command::cargo_bin("anchorchain")?;
    let output = cmd
        .arg("overlap")
        .arg(&infile)
        .arg("--min-score=3")
        .arg("-p")
        .arg("2")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "0\t5\t35\t+\t0\t10\t40\t3\n");

    Ok(())
}

#[test]
fn command_overlap_outfile() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("anchors.tsv");
    let outfile = dir.path().join("overlaps.tsv");
    fs::write(&infile, ANCHORS)?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("overlap")
        .arg(&infile)
        .arg("--min-score=2")
        .arg("--min-residues=3")
        .arg("-o")
        .arg(&outfile);
    cmd.assert().success();

    let content = fs::read_to_string(&outfile)?;
    assert_eq!(content, "0\t5\t35\t+\t0\t10\t40\t3\n");

    Ok(())
}

#[test]
fn command_chains() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("anchors.tsv");
    fs::write(&infile, ANCHORS)?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    let output = cmd
        .arg("chains")
        .arg(&infile)
        .arg("--min-score=2")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("\t3\t0,1,2"));
    assert!(lines[1].ends_with("\t2\t3,4"));

    Ok(())
}

#[test]
fn command_chains_contiguous() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("anchors.tsv");
    fs::write(&infile, ANCHORS)?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    let output = cmd
        .arg("chains")
        .arg(&infile)
        .arg("--min-score=2")
        .arg("--contiguous")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("\t0,1,2\n"));
    assert!(stdout.contains("\t3,4\n"));

    Ok(())
}

#[test]
fn command_empty_input() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("empty.tsv");
    fs::write(&infile, "# nothing here\n")?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("chains").arg(&infile);
    cmd.assert().success().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn command_bad_predecessor() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("bad.tsv");
    fs::write(&infile, "0 0 5 10 1 -1\n0 0 20 25 2 5\n")?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("overlap").arg(&infile);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid predecessor 5 for anchor 1"));

    Ok(())
}

#[test]
fn command_mixed_read_pair() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("mixed.tsv");
    fs::write(&infile, "0 0 5 10 1 -1\n0 1 20 25 2 0\n")?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("overlap").arg(&infile);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Mixed read pairs: anchor 1 links to anchor 0",
        ));

    Ok(())
}

#[test]
fn command_non_finite_score() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let infile = dir.path().join("nan.tsv");
    fs::write(&infile, "0 0 5 10 nan -1\n")?;

    let mut cmd = Command::cargo_bin("anchorchain")?;
    cmd.arg("overlap").arg(&infile).arg("--min-score").arg("5");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 1: score must be finite"));

    Ok(())
}
