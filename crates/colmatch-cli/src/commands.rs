use std::time::Instant;

use anyhow::{Context, Result};
use colmatch_cli::export::{write_accepted_csv, write_mappings_json};
use colmatch_cli::inputs::{TaskInputs, load_config, open_task};
use colmatch_cli::logging::redact_value;
use colmatch_cli::script::{load_script, run_script};
use colmatch_core::{MatchingConfig, MatchingTask};
use colmatch_model::{Candidate, MatchError};
use tracing::{info, info_span, trace, warn};

use crate::cli::{CandidatesArgs, InputArgs, ReviewArgs, SideArg, ValuesArgs};
use crate::summary::{
    print_candidates, print_failures, print_history, print_matchers, print_outcomes,
    print_unique_values, print_value_bins, print_value_matches,
};

/// Loaded configuration with command-line overrides applied.
fn build_config(args: &InputArgs) -> Result<MatchingConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(matchers) = &args.matchers {
        config.matchers = matchers.clone();
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if args.cache_dir.is_some() {
        config.cache_dir = args.cache_dir.clone();
    }
    if args.groundtruth.is_some() {
        config.groundtruth_path = args.groundtruth.clone();
    }
    if args.no_weight_updates {
        config.update_matcher_weights = false;
    }
    config.validate().context("Invalid matching configuration")?;
    Ok(config)
}

fn open(args: &InputArgs) -> Result<MatchingTask> {
    let config = build_config(args)?;
    let inputs = TaskInputs {
        source: args.source.clone(),
        target: args.target.clone(),
        session: args.session.clone(),
    };
    open_task(config, &inputs)
}

/// Candidates for the task. When every matcher fails the easy matches are
/// still returned, with the failures reported.
fn generate(task: &mut MatchingTask, use_cached: bool) -> Result<(Vec<Candidate>, bool)> {
    let start = Instant::now();
    match task.get_candidates(use_cached) {
        Ok(candidates) => {
            info!(
                candidates = candidates.len(),
                duration_ms = start.elapsed().as_millis(),
                "candidates ready"
            );
            print_failures(task.last_failures());
            Ok((candidates, false))
        }
        Err(MatchError::AllMatchersFailed { failures, partial }) => {
            warn!(failures = failures.len(), "every matcher failed");
            print_failures(&failures);
            Ok((partial, true))
        }
        Err(error) => Err(error).context("Failed to generate candidates"),
    }
}

/// Returns true when every matcher failed.
pub fn run_candidates(args: &CandidatesArgs) -> Result<bool> {
    let span = info_span!("candidates", session = %args.input.session);
    let _guard = span.enter();
    let mut task = open(&args.input)?;
    let (candidates, all_failed) = generate(&mut task, !args.fresh)?;

    if args.json {
        let payload = task.to_frontend_json();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_candidates(&candidates);
        print_matchers(&task.get_matchers());
    }
    Ok(all_failed)
}

pub fn run_review(args: &ReviewArgs) -> Result<bool> {
    let span = info_span!("review", session = %args.input.session);
    let _guard = span.enter();
    let steps = load_script(&args.script)?;
    let mut task = open(&args.input)?;
    let (_, all_failed) = generate(&mut task, true)?;

    let outcomes = run_script(&mut task, &steps)?;
    print_outcomes(&outcomes);
    print_history(&task.export_history());
    print_matchers(&task.get_matchers());

    if let Some(path) = &args.export_csv {
        let columns = write_accepted_csv(&task, path)?;
        println!("Accepted table: {} ({columns} columns)", path.display());
    }
    if let Some(path) = &args.export_mappings {
        let count = write_mappings_json(&task, path)?;
        println!("Mappings: {} ({count} pairs)", path.display());
    }
    Ok(all_failed)
}

pub fn run_values(args: &ValuesArgs) -> Result<()> {
    let span = info_span!("values", column = %args.column);
    let _guard = span.enter();
    let mut task = open(&args.input)?;
    let (values, bins) = match args.side {
        SideArg::Source => (
            task.get_source_unique_values(&args.column, args.limit)?,
            task.get_source_value_bins(&args.column)?,
        ),
        SideArg::Target => (
            task.get_target_unique_values(&args.column, args.limit)?,
            task.get_target_value_bins(&args.column)?,
        ),
    };
    for value in &values {
        trace!(column = %args.column, value = %redact_value(value), "unique value");
    }
    print_unique_values(&args.column, &values);
    print_value_bins(&bins);

    if matches!(args.side, SideArg::Source) {
        generate(&mut task, true)?;
        if let Some(matches) = task
            .value_matches_to_frontend_json()
            .into_iter()
            .find(|m| m.source_column == args.column)
            .filter(|m| !m.targets.is_empty())
        {
            print_value_matches(&matches);
        }
    }
    Ok(())
}
