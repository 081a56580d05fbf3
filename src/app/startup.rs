//! Application startup and command dispatch

use crate::app::cli::args::{Args, Command};
use crate::app::cli::config::ServiceConfig;
use crate::app::cli::display::{
    render_audit, render_group, render_groups, render_queues, render_series, OutputFormat,
};
use crate::app::error::{AppError, AppResult};
use crate::backend::memory::MemoryBackend;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, LogFormat};
use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::core::version::version_line;
use crate::service::api::{install_queue_service, uninstall_queue_service, QueueService};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Parse the process arguments and run one command. Returns the exit code.
pub async fn startup() -> i32 {
    run(Args::parse()).await
}

pub async fn run(args: Args) -> i32 {
    let (config, config_path) = match ServiceConfig::discover(args.config_file.as_deref()).await {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let use_color = args
        .color_choice()
        .or(config.log.color)
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    if let Err(e) = configure_logging(&args, &config, use_color) {
        eprintln!("Error: {}", e);
        return 1;
    }
    match &config_path {
        Some(path) => log::debug!("using configuration {}", path.display()),
        None => log::debug!("no configuration file, using defaults"),
    }

    let state_file = args.state_file.clone().or_else(|| config.state_file.clone());
    let format = OutputFormat::new(args.json, use_color);

    match execute(&args.command, &config, state_file.as_deref(), format).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            log_error_with_context(&e, args.command.operation_name());
            1
        }
    }
}

/// Command-line log options take precedence over the `[log]` table
fn configure_logging(args: &Args, config: &ServiceConfig, use_color: bool) -> AppResult<()> {
    let level = args.log_level.clone().or_else(|| config.log.level.clone());
    let format = match args.log_format.as_deref().or(config.log.format.as_deref()) {
        Some(name) => name.parse::<LogFormat>().map_err(AppError::Logging)?,
        None => LogFormat::default(),
    };
    let file: Option<PathBuf> = args.log_file.clone().or_else(|| config.log.file.clone());
    let file = file.as_ref().map(|p| p.to_string_lossy().into_owned());

    init_logging(level.as_deref(), format, file.as_deref(), use_color)
        .map_err(|e| AppError::Logging(e.to_string()))
}

/// Run `command` against a service built from `config`, loading and saving
/// collaborator state at `state_file` when given. Returns the text to print.
pub async fn execute(
    command: &Command,
    config: &ServiceConfig,
    state_file: Option<&Path>,
    format: OutputFormat,
) -> AppResult<String> {
    if let Command::Version = command {
        return Ok(version_line());
    }
    config.validate()?;

    let backend = match state_file {
        Some(path) => MemoryBackend::load(path).await?,
        None => MemoryBackend::new(),
    };
    let service = Arc::new(QueueService::new(config.settings(), backend.collaborators()));
    install_queue_service(Arc::clone(&service)).await;

    let result = dispatch(&service, command, format).await;
    uninstall_queue_service().await;

    // Partial writes are kept too, so a later audit can see them
    if let Some(path) = state_file {
        if let Err(e) = backend.save(path).await {
            if result.is_ok() {
                return Err(e.into());
            }
            log::error!("cannot save state to {}: {}", path.display(), e);
        }
    }
    result
}

async fn dispatch(
    service: &QueueService,
    command: &Command,
    format: OutputFormat,
) -> AppResult<String> {
    let output = match command {
        Command::CreateQueue { queue } => {
            service.create_queue(queue).await?;
            format.render(&serde_json::json!({ "created": queue }), |_| {
                format!("Created queue {}", queue)
            })?
        }
        Command::UpdateQueue { queue } => {
            service.update_queue(queue).await?;
            format.render(&serde_json::json!({ "updated": queue }), |_| {
                format!("Queue {} is up to date", queue)
            })?
        }
        Command::DeleteQueue { queue } => {
            service.delete_queue(queue).await?;
            format.render(&serde_json::json!({ "deleted": queue }), |_| {
                format!("Deleted queue {}", queue)
            })?
        }
        Command::LookupQueue { queue, group } => {
            let queues = service.lookup_queue(queue, group).await?;
            format.render(&queues, |color| render_queues(&queues, color))?
        }
        Command::AddGroup(args) => {
            service.add_group(&args.group, &args.queue, args.acl()).await?;
            format.render(&args.acl(), |_| {
                format!("Added group {} to queue {}", args.group, args.queue)
            })?
        }
        Command::UpdateGroup(args) => {
            service.update_group(&args.group, &args.queue, args.acl()).await?;
            format.render(&args.acl(), |_| {
                format!("Updated group {} on queue {}", args.group, args.queue)
            })?
        }
        Command::DeleteGroup { group, queue } => {
            service.delete_group(group, queue).await?;
            format.render(&serde_json::json!({ "deleted": group, "queue": queue }), |_| {
                format!("Deleted group {} from queue {}", group, queue)
            })?
        }
        Command::LookupGroup { group } => {
            let groups = service.lookup_group(group).await?;
            format.render(&groups, |color| render_groups(&groups, color))?
        }
        Command::GetGroup { group, queue } => {
            let config = service.get_single_group(group, queue).await?;
            format.render(&config, |color| render_group(config.as_ref(), color))?
        }
        Command::Send {
            queue,
            group,
            message,
        } => {
            service
                .send_message(queue, group, message.as_bytes())
                .await?;
            format.render(&serde_json::json!({ "sent": message.len() }), |_| {
                format!("Sent {} bytes to {}", message.len(), queue)
            })?
        }
        Command::Receive {
            queue,
            group,
            timeout,
        } => {
            let payload = tokio::time::timeout(
                Duration::from_secs(*timeout),
                service.receive_message(queue, group),
            )
            .await
            .map_err(|_| AppError::ReceiveTimeout {
                queue: queue.clone(),
                group: group.clone(),
                seconds: *timeout,
            })??;
            let text = String::from_utf8_lossy(&payload).into_owned();
            format.render(&serde_json::json!({ "message": text }), |_| text.clone())?
        }
        Command::Ack { queue, group } => {
            service.ack_message(queue, group).await?;
            String::new()
        }
        Command::SendMetrics(args) => {
            let (start, end) = args.window(SystemTimeProvider.unix_seconds());
            let series = service
                .get_send_metrics(&args.queue, &args.group, start, end, args.buckets)
                .await?;
            format.render(&series, |color| render_series(&series, color))?
        }
        Command::ReceiveMetrics(args) => {
            let (start, end) = args.window(SystemTimeProvider.unix_seconds());
            let series = service
                .get_receive_metrics(&args.queue, &args.group, start, end, args.buckets)
                .await?;
            format.render(&series, |color| render_series(&series, color))?
        }
        Command::Audit => {
            let findings = service.audit_queues().await?;
            format.render(&findings, |color| render_audit(&findings, color))?
        }
        Command::Version => version_line(),
    };
    Ok(output)
}
