use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use focusplan_core::{plan, PlanRequest};

use super::snapshot::{parse_date, Snapshot};

#[derive(Args)]
pub struct PlanArgs {
    /// Snapshot JSON file with tasks and events
    #[arg(long)]
    input: PathBuf,
    /// Day to plan (YYYY-MM-DD)
    #[arg(long)]
    date: String,
    /// Reference time (RFC 3339); defaults to the snapshot's or the clock
    #[arg(long)]
    now: Option<String>,
    /// Preferences file used when the snapshot has none
    #[arg(long)]
    prefs: Option<PathBuf>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let target_date = parse_date(&args.date)?;
    let snapshot = Snapshot::load(&args.input)?;
    let now = snapshot.resolve_now(args.now.as_deref())?;
    let preferences = snapshot.resolve_preferences(args.prefs.as_deref())?;

    let titles: HashMap<String, String> = snapshot
        .tasks
        .iter()
        .map(|t| (t.id.clone(), t.title.clone()))
        .collect();

    let request = PlanRequest {
        tasks: snapshot.tasks,
        events: snapshot.events,
        preferences,
        now,
        target_date,
    };
    let output = plan(&request);
    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Plan for {}", target_date.format("%A %Y-%m-%d"));
    if output.schedule.is_empty() {
        println!("  (no working hours)");
    }
    for block in &output.schedule {
        let label = block
            .task_ids
            .iter()
            .map(|id| titles.get(id).cloned().unwrap_or_else(|| id.clone()))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "  {}-{}  {:<18} {}",
            block.start.format("%H:%M"),
            block.end.format("%H:%M"),
            block.block_type.as_str(),
            label
        );
    }

    if !output.unscheduled.is_empty() {
        println!("Unscheduled: {}", output.unscheduled.join(", "));
    }
    if !output.critical_path.is_empty() {
        println!("Critical path: {}", output.critical_path.join(" -> "));
    }
    Ok(())
}
