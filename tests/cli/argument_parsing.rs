//! Argument parsing through the public crate surface

use clap::Parser;
use queuegate::app::cli::args::{Args, Command};

#[test]
fn test_every_subcommand_parses() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["create-queue", "q"],
        vec!["update-queue", "q"],
        vec!["delete-queue", "q"],
        vec!["lookup-queue"],
        vec!["add-group", "g", "q", "--write"],
        vec!["update-group", "g", "q", "--read"],
        vec!["delete-group", "g", "q"],
        vec!["lookup-group", "--group", "g"],
        vec!["get-group", "g", "q"],
        vec!["send", "q", "g", "payload"],
        vec!["receive", "q", "g", "--timeout", "2"],
        vec!["ack", "q", "g"],
        vec!["send-metrics", "q", "--start", "-60", "--end", "0"],
        vec!["receive-metrics", "q", "--group", "g"],
        vec!["audit"],
        vec!["version"],
    ];

    for case in cases {
        let argv = std::iter::once("queuegate").chain(case.iter().copied());
        let args = Args::try_parse_from(argv)
            .unwrap_or_else(|e| panic!("{:?} failed to parse: {}", case, e));
        assert_eq!(args.command.operation_name(), case[0]);
    }
}

#[test]
fn test_missing_command_is_an_error() {
    assert!(Args::try_parse_from(["queuegate", "--json"]).is_err());
}

#[test]
fn test_send_requires_message() {
    assert!(Args::try_parse_from(["queuegate", "send", "q", "g"]).is_err());
}

#[test]
fn test_negative_metrics_window() {
    let args =
        Args::try_parse_from(["queuegate", "send-metrics", "q", "--start", "-60", "--end", "-1"])
            .unwrap();
    let Command::SendMetrics(metrics) = args.command else {
        panic!("expected send-metrics");
    };
    assert_eq!(metrics.window(0), (-60, -1));
}
