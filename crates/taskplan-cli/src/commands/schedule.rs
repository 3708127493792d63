use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use taskplan_core::{
    validate_schedule, AutoScheduler, DateRange, PlannerConfig, PolicyOverrides, SelectionMode, Task, TimePeriod,
};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Place tasks and print the resulting schedule
    Run {
        /// JSON file holding an array of tasks
        #[arg(long)]
        tasks: PathBuf,
        /// Policy overrides file (JSON or .toml), applied over the config file
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Selection mode: full, unscheduled or reschedule
        #[arg(long)]
        mode: Option<SelectionMode>,
        /// Time period: today, tomorrow or this_week
        #[arg(long, conflicts_with_all = ["from", "to"])]
        period: Option<TimePeriod>,
        /// First day of a custom period (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of a custom period (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Reference date for relative periods (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Audit an existing schedule
    Validate {
        /// JSON file holding an array of tasks
        #[arg(long)]
        schedule: PathBuf,
        /// First day of the audited range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the audited range (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Policy overrides file (JSON or .toml), applied over the config file
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn read_tasks(path: &Path) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

fn print_table(tasks: &[Task]) {
    let mut rows: Vec<&Task> = tasks.iter().collect();
    rows.sort_by_key(|t| (t.date, t.start_time));
    for task in rows {
        let Some(p) = task.placement() else { continue };
        println!(
            "{}  {}-{}  {:<7} {} ({})",
            p.date,
            p.start,
            p.end,
            task.priority.as_str(),
            task.title,
            task.id
        );
    }
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Run {
            tasks,
            policy,
            mode,
            period,
            from,
            to,
            today,
            json,
        } => {
            let config = PlannerConfig::load()?;
            let input = read_tasks(&tasks)?;

            let mut flags = PolicyOverrides {
                task_selection_mode: mode,
                time_period: period,
                ..Default::default()
            };
            if from.is_some() || to.is_some() {
                flags.time_period = Some(TimePeriod::Custom { start: from, end: to });
            }

            let effective = super::effective_policy(&config, policy.as_deref(), &flags)?;
            let scheduler = AutoScheduler::with_policy(effective)
                .with_today(today.unwrap_or_else(|| Local::now().date_naive()));
            let outcome = scheduler.run(&input)?;

            if json || config.output.json {
                println!("{}", serde_json::to_string_pretty(&outcome.tasks)?);
            } else {
                print_table(&outcome.tasks);
            }
            if config.output.show_unplaced {
                for id in &outcome.unplaced {
                    eprintln!("unplaced: {id}");
                }
            }
        }
        ScheduleAction::Validate {
            schedule,
            from,
            to,
            policy,
        } => {
            let config = PlannerConfig::load()?;
            let effective = super::effective_policy(&config, policy.as_deref(), &PolicyOverrides::default())?;
            let range = DateRange::new(from, to)?;
            let tasks = read_tasks(&schedule)?;

            let violations = validate_schedule(&tasks, &effective, &range);
            if violations.is_empty() {
                println!("schedule is valid");
            } else {
                for violation in &violations {
                    println!("{violation}");
                }
                return Err(format!("{} violation(s) found", violations.len()).into());
            }
        }
    }
    Ok(())
}
