//! CLI argument parsing tests

use clap::Parser;
use itemqueue::app::cli::args::*;
use std::path::PathBuf;

static COMMAND_NAME: &str = "itemqueue";

fn parse(args: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once(COMMAND_NAME).chain(args.iter().copied()))
}

#[test]
fn test_negative_numbers_are_values_not_flags() {
    let args = parse(&["-5", "10", "-15"]).unwrap();
    assert_eq!(args.numbers, vec![-5, 10, -15]);
}

#[test]
fn test_all_options() {
    let args = parse(&[
        "--config-file",
        "/etc/itemqueue.toml",
        "--name",
        "totals",
        "--filter",
        "odd",
        "--discard",
        "--log-level",
        "warn",
        "--log-format",
        "ext",
        "--log-file",
        "none",
        "1",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/etc/itemqueue.toml")));
    assert_eq!(args.name.as_deref(), Some("totals"));
    assert_eq!(args.filter, Some(NumberFilter::Odd));
    assert!(args.discard);
    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some(PathBuf::from("none")));
    assert_eq!(args.numbers, vec![1]);
}

#[test]
fn test_short_options() {
    let args = parse(&["-c", "cfg.toml", "-n", "q", "-F", "positive", "-d", "-g"]).unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("cfg.toml")));
    assert_eq!(args.filter, Some(NumberFilter::Positive));
    assert!(args.discard);
    assert_eq!(args.color_override(), Some(true));
}

#[test]
fn test_rejects_unknown_filter_and_non_numbers() {
    let error = parse(&["--filter", "prime"]).unwrap_err();
    assert_eq!(error.kind(), clap::error::ErrorKind::InvalidValue);

    assert!(parse(&["one", "two"]).is_err());
}

#[test]
fn test_version_flag() {
    let error = parse(&["--version"]).unwrap_err();
    assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
}
