//! Binary startup: arguments, configuration, logging, then one queue run

use clap::Parser;
use colored::Colorize;
use std::io::{BufRead, IsTerminal};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use super::cli::{AppConfig, Args, NumberFilter};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version::long_version;
use crate::notifications::api::{EventFilter, QueueEvent};
use crate::queue::api::{ActionError, PredicateQueue, QueueOptions, QueueResult};

/// Outcome of summing numbers through a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub queue_name: String,
    pub enqueued: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
    pub sum: i64,
}

/// Initialize application startup
pub fn startup() {
    let args = Args::parse();

    let config = match AppConfig::load(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let use_color = args
        .color_override()
        .or(config.logging.color)
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    let log_level = args.log_level.clone().or(config.logging.level.clone());
    let log_format = args.log_format.clone().or(config.logging.format.clone());
    let log_file = match args.log_file.as_deref() {
        Some(path) if path.as_os_str().eq_ignore_ascii_case("none") => None,
        Some(path) => Some(path.to_path_buf()),
        None => config.logging.log_file(),
    };
    let log_file = log_file.map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        log_level.as_deref(),
        log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    log::info!("itemqueue {} starting", long_version());

    let numbers = if args.numbers.is_empty() {
        match read_numbers(std::io::stdin().lock()) {
            Ok(numbers) => numbers,
            Err(e) => {
                log::error!("FATAL: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        args.numbers.clone()
    };

    let mut options = config.queue.clone();
    if args.name.is_some() {
        options.name = args.name.clone();
    }
    let filter = args.filter.or(config.filter).unwrap_or_default();

    match sum_numbers(numbers, filter, options, !args.discard) {
        Ok(summary) => print_summary(&summary, filter),
        Err(e) => {
            log_error_with_context(&e, "Running the queue");
            std::process::exit(1);
        }
    }
}

/// Parse whitespace-separated integers, one or more per line
pub fn read_numbers(reader: impl BufRead) -> Result<Vec<i64>, String> {
    let mut numbers = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("failed to read input: {}", e))?;
        for token in line.split_whitespace() {
            let number = token
                .parse::<i64>()
                .map_err(|e| format!("line {}: '{}' is not a number: {}", index + 1, token, e))?;
            numbers.push(number);
        }
    }
    Ok(numbers)
}

/// Sum the numbers accepted by `filter` on a dedicated queue
///
/// With `process_remaining` false the queue is stopped right after the
/// numbers are enqueued, so only those the worker reached count.
pub fn sum_numbers(
    numbers: Vec<i64>,
    filter: NumberFilter,
    options: QueueOptions,
    process_remaining: bool,
) -> QueueResult<RunSummary> {
    let sum = Arc::new(AtomicI64::new(0));
    let accepted = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let queue = {
        let sum = Arc::clone(&sum);
        let accepted = Arc::clone(&accepted);
        let rejected = Arc::clone(&rejected);
        PredicateQueue::builder()
            .options(options)
            .predicate(move |n: &i64| {
                let accepts = filter.accepts(*n);
                if !accepts {
                    rejected.fetch_add(1, Ordering::SeqCst);
                }
                accepts
            })
            .action(move |n: &i64| -> Result<(), ActionError> {
                let current = sum.load(Ordering::SeqCst);
                let next = current
                    .checked_add(*n)
                    .ok_or_else(|| format!("adding {} to {} overflows", n, current))?;
                sum.store(next, Ordering::SeqCst);
                accepted.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build()
    };

    {
        let failed = Arc::clone(&failed);
        queue.subscribe_fn("summary", EventFilter::All, "startup", move |event| match event {
            QueueEvent::ErrorOccurred(e) if e.item.is_some() => {
                failed.fetch_add(1, Ordering::SeqCst);
            }
            QueueEvent::StatusChanged(e) => {
                log::debug!("Queue '{}' is now {}", e.queue_name, e.status);
            }
            _ => {}
        });
    }

    queue.start()?;
    let enqueued = queue.enqueue_many(numbers)?;
    queue.stop(process_remaining)?;

    if let Some(error) = queue.error() {
        log::warn!("Queue '{}' finished with an error: {}", queue.name(), error);
    }

    Ok(RunSummary {
        queue_name: queue.name().to_string(),
        enqueued,
        accepted: accepted.load(Ordering::SeqCst),
        rejected: rejected.load(Ordering::SeqCst),
        failed: failed.load(Ordering::SeqCst),
        sum: sum.load(Ordering::SeqCst),
    })
}

fn print_summary(summary: &RunSummary, filter: NumberFilter) {
    println!(
        "{} {} ({} filter)",
        "Queue".bold(),
        summary.queue_name.cyan(),
        filter
    );
    println!("  enqueued: {}", summary.enqueued);
    println!("  accepted: {}", summary.accepted.to_string().green());
    println!("  rejected: {}", summary.rejected.to_string().yellow());
    if summary.failed > 0 {
        println!("  failed:   {}", summary.failed.to_string().red());
    }
    println!("  sum:      {}", summary.sum.to_string().bold());
}
