//! Command-line arguments
//!
//! Global options configure logging, output and where state and
//! configuration live; the subcommand selects one service operation.

use crate::service::api::GroupAcl;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default wait for `receive`, in seconds
pub const DEFAULT_RECEIVE_TIMEOUT_SECS: u64 = 5;
/// Default metrics window length, in seconds
pub const DEFAULT_METRICS_WINDOW_SECS: i64 = 3600;

#[derive(Parser, Debug, Clone)]
#[command(name = "queuegate")]
#[command(about = "Managed queues with group access control over a partitioned log broker")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// State file keeping queues, groups and messages between runs
    #[arg(short = 's', long = "state-file", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", overrides_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", overrides_with = "color")]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// `Some(true)` for --color, `Some(false)` for --no-color, `None` when
    /// neither was given
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a queue in the broker and the metadata store
    CreateQueue { queue: String },

    /// Check that a queue exists
    UpdateQueue { queue: String },

    /// Delete a queue and its groups
    DeleteQueue { queue: String },

    /// List queues with their groups
    LookupQueue {
        /// Only this queue
        #[arg(long, default_value = "")]
        queue: String,
        /// Only this group of the queue
        #[arg(long, default_value = "")]
        group: String,
    },

    /// Attach a group to a queue
    AddGroup(GroupArgs),

    /// Replace a group's settings on a queue
    UpdateGroup(GroupArgs),

    /// Detach a group from a queue
    DeleteGroup { group: String, queue: String },

    /// List groups with the queues they are attached to
    LookupGroup {
        /// Only this group
        #[arg(long, default_value = "")]
        group: String,
    },

    /// Show one group's settings on one queue
    GetGroup { group: String, queue: String },

    /// Send a message
    Send {
        queue: String,
        group: String,
        message: String,
    },

    /// Receive the next message for a group
    Receive {
        queue: String,
        group: String,
        /// Seconds to wait for a message
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_RECEIVE_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Acknowledge a message (not supported)
    Ack { queue: String, group: String },

    /// Bucketed send counts
    SendMetrics(MetricsArgs),

    /// Bucketed receive counts
    ReceiveMetrics(MetricsArgs),

    /// Report queues present in only one store
    Audit,

    /// Show version and build information
    Version,
}

impl Command {
    /// Operation label used when reporting a failure
    pub fn operation_name(&self) -> &'static str {
        match self {
            Command::CreateQueue { .. } => "create-queue",
            Command::UpdateQueue { .. } => "update-queue",
            Command::DeleteQueue { .. } => "delete-queue",
            Command::LookupQueue { .. } => "lookup-queue",
            Command::AddGroup(_) => "add-group",
            Command::UpdateGroup(_) => "update-group",
            Command::DeleteGroup { .. } => "delete-group",
            Command::LookupGroup { .. } => "lookup-group",
            Command::GetGroup { .. } => "get-group",
            Command::Send { .. } => "send",
            Command::Receive { .. } => "receive",
            Command::Ack { .. } => "ack",
            Command::SendMetrics(_) => "send-metrics",
            Command::ReceiveMetrics(_) => "receive-metrics",
            Command::Audit => "audit",
            Command::Version => "version",
        }
    }
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct GroupArgs {
    pub group: String,
    pub queue: String,

    /// Allow the group to send
    #[arg(long)]
    pub write: bool,

    /// Allow the group to receive
    #[arg(long)]
    pub read: bool,

    /// Callback URL
    #[arg(long, default_value = "")]
    pub url: String,

    /// Allowed client address (repeatable)
    #[arg(long = "ip", value_name = "IP")]
    pub ips: Vec<String>,
}

impl GroupArgs {
    pub fn acl(&self) -> GroupAcl {
        GroupAcl {
            write: self.write,
            read: self.read,
            url: self.url.clone(),
            ips: self.ips.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct MetricsArgs {
    pub queue: String,

    /// Only this group; all groups when omitted
    #[arg(long, default_value = "")]
    pub group: String,

    /// Window start, Unix seconds (default: one hour before the end)
    #[arg(long, value_name = "SECS", allow_hyphen_values = true)]
    pub start: Option<i64>,

    /// Window end, Unix seconds, exclusive (default: now + 1)
    #[arg(long, value_name = "SECS", allow_hyphen_values = true)]
    pub end: Option<i64>,

    /// Number of buckets
    #[arg(long, default_value_t = 12)]
    pub buckets: u32,
}

impl MetricsArgs {
    /// Resolve the `[start, end)` window; `now` is the current Unix second.
    /// Defaults saturate at the `i64` bounds and are validated by the service.
    pub fn window(&self, now: i64) -> (i64, i64) {
        let end = self.end.unwrap_or_else(|| now.saturating_add(1));
        let start = self
            .start
            .unwrap_or_else(|| end.saturating_sub(DEFAULT_METRICS_WINDOW_SECS));
        (start, end)
    }
}
