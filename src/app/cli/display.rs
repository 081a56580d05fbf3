//! Rendering of command results as text or JSON

use crate::backend::MetricsSeries;
use crate::service::api::{GroupConfig, GroupInfo, QueueAudit, QueueInfo};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text { color: bool },
    Json,
}

impl OutputFormat {
    pub fn new(json: bool, color: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text { color }
        }
    }

    /// Render `value` as pretty JSON, or as text through `text`
    pub fn render<T: Serialize + ?Sized>(
        self,
        value: &T,
        text: impl FnOnce(bool) -> String,
    ) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value),
            OutputFormat::Text { color } => Ok(text(color)),
        }
    }
}

fn label(name: &str, color: bool) -> String {
    if color {
        name.cyan().to_string()
    } else {
        name.to_string()
    }
}

fn heading(name: &str, color: bool) -> String {
    if color {
        name.bold().to_string()
    } else {
        name.to_string()
    }
}

fn format_ctime(ctime: i64) -> String {
    DateTime::<Utc>::from_timestamp(ctime, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ctime.to_string())
}

fn permissions(config: &GroupConfig) -> String {
    format!(
        "{}{}",
        if config.read { "r" } else { "-" },
        if config.write { "w" } else { "-" }
    )
}

fn config_line(name: &str, config: &GroupConfig, color: bool) -> String {
    let mut line = format!("  {} {}", heading(name, color), permissions(config));
    if !config.url.is_empty() {
        line.push_str(&format!(" {} {}", label("url:", color), config.url));
    }
    if !config.ips.is_empty() {
        line.push_str(&format!(" {} {}", label("ips:", color), config.ips.join(",")));
    }
    line
}

pub fn render_queues(queues: &[QueueInfo], color: bool) -> String {
    if queues.is_empty() {
        return "No queues.".to_string();
    }
    let mut lines = Vec::new();
    for info in queues {
        lines.push(format!(
            "{} {} {} {} {}",
            heading(&info.queue, color),
            label("created:", color),
            format_ctime(info.ctime),
            label("length:", color),
            info.length
        ));
        for group in &info.groups {
            let name = group.group.as_deref().unwrap_or("?");
            lines.push(config_line(name, group, color));
        }
    }
    lines.join("\n")
}

pub fn render_groups(groups: &[GroupInfo], color: bool) -> String {
    if groups.is_empty() {
        return "No groups.".to_string();
    }
    let mut lines = Vec::new();
    for info in groups {
        lines.push(heading(&info.group, color));
        for queue in &info.queues {
            let name = queue.queue.as_deref().unwrap_or("?");
            lines.push(config_line(name, queue, color));
        }
    }
    lines.join("\n")
}

pub fn render_group(config: Option<&GroupConfig>, color: bool) -> String {
    match config {
        Some(config) => format!(
            "{} @ {}\n{}",
            heading(config.group.as_deref().unwrap_or("?"), color),
            config.queue.as_deref().unwrap_or("?"),
            config_line("access", config, color)
        ),
        None => "No such group on this queue.".to_string(),
    }
}

pub fn render_series(series: &MetricsSeries, color: bool) -> String {
    let scope = if series.group.is_empty() {
        series.queue.clone()
    } else {
        format!("{}@{}", series.queue, series.group)
    };
    let mut lines = vec![format!(
        "{} {} {} {}",
        heading(&scope, color),
        series.direction,
        label("total:", color),
        series.total()
    )];
    for bucket in &series.buckets {
        lines.push(format!(
            "  [{}, {}) {}",
            bucket.start, bucket.end, bucket.count
        ));
    }
    lines.join("\n")
}

pub fn render_audit(findings: &[QueueAudit], color: bool) -> String {
    if findings.is_empty() {
        return "Broker and metadata store agree.".to_string();
    }
    findings
        .iter()
        .map(|finding| {
            format!(
                "{} {:?}",
                heading(&finding.queue, color),
                finding.state
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
