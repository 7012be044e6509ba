//! DesignLab CLI — analyze, compare, and compensation commands.
//!
//! Commands:
//! - `analyze` — per-condition summaries with pairwise Welch tests
//! - `compare` — shared Pareto frontier across all conditions
//! - `compensation` — payout CSV for one condition
//!
//! All commands consume the textual point records under the data root;
//! solution files are never read here. Records missing a corrected
//! performance are an error unless `--raw` is given.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use designlab_core::domain::{Condition, SubjectId};
use designlab_runner::{
    compare_conditions, compute_payouts, count_regions, pairwise_welch, pareto_front,
    summarize_condition, write_csv, AnalysisConfig, ConditionData, ConditionSummary,
    CrossConditionFront, RecordStore,
};

#[derive(Parser)]
#[command(
    name = "designlab",
    about = "DesignLab CLI — robustness and Pareto analysis of design-experiment records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-condition summaries with pairwise Welch tests across conditions.
    Analyze {
        /// Path to a TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Data root with one subdirectory per condition (ignored with --config).
        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Use raw recorded performance instead of corrected values.
        #[arg(long, default_value_t = false)]
        raw: bool,

        /// Emit machine-readable JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Significance level for the Benjamini–Hochberg adjustment.
        #[arg(long, default_value_t = 0.05)]
        alpha: f64,
    },
    /// Shared Pareto frontier across all conditions.
    Compare {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        data_root: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Compute payouts for one condition and write them as CSV.
    Compensation {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Condition to pay out: control, margin, gamma_slider, performance_slider.
        #[arg(long)]
        condition: String,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            config,
            data_root,
            raw,
            json,
            alpha,
        } => run_analyze(load_config(config, data_root)?, raw, json, alpha),
        Commands::Compare {
            config,
            data_root,
            raw,
        } => run_compare(load_config(config, data_root)?, raw),
        Commands::Compensation {
            config,
            data_root,
            condition,
            output,
        } => run_compensation(
            load_config(config, data_root)?,
            parse_condition(&condition)?,
            output,
        ),
    }
}

fn load_config(config: Option<PathBuf>, data_root: Option<PathBuf>) -> Result<AnalysisConfig> {
    match (config, data_root) {
        (Some(path), _) => Ok(AnalysisConfig::from_toml_file(&path)?),
        (None, Some(root)) => Ok(AnalysisConfig::with_root(root)),
        (None, None) => bail!("one of --config or --data-root is required"),
    }
}

fn parse_condition(name: &str) -> Result<Condition> {
    Condition::ALL
        .into_iter()
        .find(|c| c.dir_name() == name)
        .with_context(|| {
            format!(
                "unknown condition '{name}'. Valid: control, margin, gamma_slider, performance_slider"
            )
        })
}

/// Load every configured condition's collection.
fn load_all(config: &AnalysisConfig, raw: bool) -> Result<Vec<(Condition, ConditionData)>> {
    let mut loaded = Vec::new();
    for cd in &config.conditions {
        let root = config
            .data_root
            .join(&cd.dir);
        let store = RecordStore::new(&root);
        let data = if raw {
            store.load_raw()
        } else {
            store.load_corrected(None)
        }
        .with_context(|| format!("loading records for {} from {}", cd.condition, root.display()))?;
        loaded.push((cd.condition, data));
    }
    Ok(loaded)
}

fn run_analyze(config: AnalysisConfig, raw: bool, json: bool, alpha: f64) -> Result<()> {
    let loaded = load_all(&config, raw)?;

    let summaries: Vec<ConditionSummary> = loaded
        .iter()
        .map(|(condition, data)| {
            summarize_condition(
                *condition,
                data,
                &config.regions,
                &config.window,
                config.duplicate_policy,
            )
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Analysis {}", config.config_id());
    for summary in &summaries {
        print_condition_summary(summary);
    }

    // Pairwise Welch tests per stat, across conditions
    let stat_names: Vec<&'static str> = summaries
        .first()
        .map(|s| s.named_stats().iter().map(|(name, _)| *name).collect())
        .unwrap_or_default();

    for name in stat_names {
        let samples: BTreeMap<Condition, Vec<f64>> = summaries
            .iter()
            .filter_map(|summary| {
                summary
                    .named_stats()
                    .into_iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, values)| (summary.condition, values.to_vec()))
            })
            .collect();

        let comparisons = match pairwise_welch(&samples, alpha) {
            Ok(c) => c,
            Err(e) => {
                println!("\n{name}: skipped ({e})");
                continue;
            }
        };
        if comparisons.is_empty() {
            continue;
        }

        println!("\n--- {name} ---");
        for comparison in comparisons {
            println!(
                "{:<18} vs {:<18} p = {:.4}  adj = {:.4}{}",
                comparison.left.label(),
                comparison.right.label(),
                comparison.test.p_value,
                comparison.adjusted_p,
                if comparison.significant { "  *" } else { "" }
            );
        }
    }

    Ok(())
}

fn print_condition_summary(summary: &ConditionSummary) {
    println!();
    println!("=== {} ===", summary.condition);
    println!("Subjects:       {}", summary.subjects.len());
    for (name, values) in summary.named_stats() {
        println!(
            "{:<28} n={:<3} mean={:<10.3} sd={:.3}",
            name,
            values.len(),
            designlab_runner::stats::mean(values),
            designlab_runner::stats::std_dev(values),
        );
    }
}

fn run_compare(config: AnalysisConfig, raw: bool) -> Result<()> {
    let loaded = load_all(&config, raw)?;
    let per_condition: Vec<(Condition, &designlab_core::domain::PointSet)> = loaded
        .iter()
        .map(|(condition, data)| (*condition, &data.point_owners))
        .collect();

    let front: CrossConditionFront =
        compare_conditions(&per_condition, &config.window, config.duplicate_policy);

    println!("Shared frontier: {} points", front.len());
    for condition in Condition::ALL {
        let mut points = front.points_for(condition);
        points.sort_by(|a, b| {
            a.performance()
                .partial_cmp(&b.performance())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        println!();
        println!("--- {condition}: {} frontier points ---", points.len());
        for point in points {
            println!(
                "  {:>9.2} fuel, {:>5.1}% failures",
                point.performance(),
                point.failure_rate()
            );
        }
    }

    Ok(())
}

fn run_compensation(config: AnalysisConfig, condition: Condition, output: PathBuf) -> Result<()> {
    let root = config
        .condition_root(condition)
        .with_context(|| format!("condition {condition} is not configured"))?;
    let data = RecordStore::new(&root)
        .load_corrected(None)
        .with_context(|| format!("loading records from {}", root.display()))?;

    let front = pareto_front(&data.point_owners, &config.window, config.duplicate_policy);
    let coverage: BTreeMap<SubjectId, u8> = data
        .subject_points
        .iter()
        .map(|(subject, points)| {
            (
                subject.clone(),
                count_regions(points.iter(), &config.regions).coverage(),
            )
        })
        .collect();

    let payouts = compute_payouts(&front, &coverage, &config.compensation)?;

    let file = std::fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    write_csv(&payouts, file)?;

    println!(
        "Wrote {} payouts to {} (frontier: {} points)",
        payouts.len(),
        output.display(),
        front.len()
    );
    Ok(())
}
