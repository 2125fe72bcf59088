use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use focusplan_core::{rank_tasks_with_budget, ComputeBudget};

use super::snapshot::Snapshot;

#[derive(Args)]
pub struct RankArgs {
    /// Snapshot JSON file with tasks and events
    #[arg(long)]
    input: PathBuf,
    /// Reference time (RFC 3339); defaults to the snapshot's or the clock
    #[arg(long)]
    now: Option<String>,
    /// Show only the first N tasks
    #[arg(long)]
    top: Option<usize>,
    /// Preferences file used when the snapshot has none
    #[arg(long)]
    prefs: Option<PathBuf>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RankArgs) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = Snapshot::load(&args.input)?;
    let now = snapshot.resolve_now(args.now.as_deref())?;
    let prefs = snapshot.resolve_preferences(args.prefs.as_deref())?;

    let ranking = rank_tasks_with_budget(&snapshot.tasks, &prefs, now, &ComputeBudget::unlimited());
    for warning in &ranking.warnings {
        eprintln!("warning: {warning}");
    }

    let limit = args.top.unwrap_or(ranking.scores.len());
    let shown = &ranking.scores[..limit.min(ranking.scores.len())];

    if args.json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No tasks to rank.");
        return Ok(());
    }

    let titles: HashMap<&str, &str> = snapshot
        .tasks
        .iter()
        .map(|t| (t.id.as_str(), t.title.as_str()))
        .collect();

    println!("Ranking at {}", now.format("%Y-%m-%d %H:%M UTC"));
    for (rank, score) in shown.iter().enumerate() {
        let title = titles.get(score.task_id.as_str()).copied().unwrap_or("");
        let driver = ranking
            .weights
            .as_ref()
            .and_then(|w| score.top_dimension(w))
            .map(|d| d.to_string())
            .unwrap_or_default();
        let mut marks = Vec::new();
        if score.on_critical_path {
            marks.push("critical");
        }
        if score.is_pareto_optimal {
            marks.push("pareto");
        }
        println!(
            "{:>3}. {:>5.1}  {:<20} {}  [{}]{}",
            rank + 1,
            score.final_score,
            score.task_id,
            title,
            driver,
            if marks.is_empty() {
                String::new()
            } else {
                format!(" ({})", marks.join(", "))
            }
        );
    }
    Ok(())
}
