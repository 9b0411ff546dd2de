use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use coach_core::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Training goal and weekly plan coach for sports clubs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the default work type catalog and block library
    Init {
        /// Replace an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Manage work types
    #[command(name = "work-type")]
    WorkType {
        #[command(subcommand)]
        action: WorkTypeCommand,
    },

    /// Manage goals
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },

    /// Record a completed work type
    Complete {
        /// Work type id
        work_type: String,

        /// Day it was trained (defaults to today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },

    /// Show progress for every goal
    Progress,

    /// Manage week plans
    Week {
        #[command(subcommand)]
        action: WeekCommand,
    },

    /// Suggest what to train next for a goal
    Recommend {
        /// Goal id
        #[arg(long)]
        goal: Uuid,

        /// Hide suggestions below this confidence
        #[arg(long)]
        min_confidence: Option<u8>,

        /// Only show suggestions mentioning this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Roll up the completion journal into the CSV archive
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Subcommand)]
enum WorkTypeCommand {
    /// List the catalog
    List,
    /// Add a work type
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        /// physical, technical, mental or tactical
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "#808080")]
        color: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove a work type and every reference to it
    Remove { id: String },
}

#[derive(Subcommand)]
enum GoalCommand {
    /// List goals
    List,
    /// Add a goal
    Add {
        #[arg(long)]
        name: String,
        /// daily, weekly or quarterly
        #[arg(long, default_value = "weekly")]
        cadence: String,
        /// Required work type ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        work_types: Vec<String>,
        /// 50-100; defaults by student level
        #[arg(long)]
        target: Option<u8>,
        /// beginner, intermediate, advanced, competitor or elite
        #[arg(long, default_value = "beginner")]
        level: String,
        /// Defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Defaults to 90 days after the start
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a goal and its progress
    Remove { id: Uuid },
    /// Mark a goal inactive
    Deactivate { id: Uuid },
}

#[derive(Subcommand)]
enum WeekCommand {
    /// List week plans
    List,
    /// Create an empty week starting on a Monday
    New {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: NaiveDate,
        /// Store as a reusable template
        #[arg(long)]
        template: bool,
    },
    /// Create a week from a template
    FromTemplate {
        #[arg(long)]
        template: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: NaiveDate,
    },
    /// Assign a work type to a day (0 = Monday)
    Assign {
        #[arg(long)]
        week: Uuid,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..7))]
        day: u8,
        #[arg(long)]
        work_type: String,
    },
    /// Show the work type distribution and imbalance warnings
    Balance { week: Uuid },
}

/// Files under the data directory
struct DataPaths {
    state: PathBuf,
    journal_dir: PathBuf,
    journal: PathBuf,
    archive: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let journal_dir = data_dir.join("journal");
        Self {
            state: data_dir.join("state.json"),
            journal: journal_dir.join("completions.jsonl"),
            journal_dir,
            archive: data_dir.join("completions.csv"),
        }
    }

    /// Completions from the longest cadence window back from `today`
    fn recent_completions(&self, today: NaiveDate) -> Result<Vec<CompletionRecord>> {
        load_recent_completions(
            &self.journal,
            &self.archive,
            Cadence::Quarterly.window_days(),
            today,
        )
    }
}

fn main() -> Result<()> {
    coach_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let paths = DataPaths::new(&data_dir);
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!("Using data dir {:?}, today {}", data_dir, today);

    match cli.command {
        Commands::Init { force } => cmd_init(&paths, force),
        Commands::WorkType { action } => cmd_work_type(&paths, action, today),
        Commands::Goal { action } => cmd_goal(&paths, action, today),
        Commands::Complete { work_type, on } => {
            cmd_complete(&paths, &work_type, on.unwrap_or(today), today)
        }
        Commands::Progress => cmd_progress(&paths, today),
        Commands::Week { action } => cmd_week(&paths, action, &config),
        Commands::Recommend {
            goal,
            min_confidence,
            search,
        } => cmd_recommend(&paths, goal, min_confidence, search, today, &config),
        Commands::Rollup { cleanup } => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_init(paths: &DataPaths, force: bool) -> Result<()> {
    let catalog = build_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Validation("Invalid default catalog".into()));
    }

    let (state, seeded) = TrainingState::update(&paths.state, |state| {
        if !state.catalog.work_types.is_empty() && !force {
            return Ok(false);
        }
        state.catalog = catalog;
        Ok(true)
    })?;

    if seeded {
        println!(
            "✓ Seeded {} work types and {} blocks",
            state.catalog.work_types.len(),
            state.catalog.blocks.len()
        );
    } else {
        println!("Catalog already initialized (use --force to replace it).");
    }
    Ok(())
}

fn cmd_work_type(paths: &DataPaths, action: WorkTypeCommand, today: NaiveDate) -> Result<()> {
    match action {
        WorkTypeCommand::List => {
            let state = TrainingState::load(&paths.state)?;
            if state.catalog.work_types.is_empty() {
                println!("No work types. Run `coach init` to seed the defaults.");
            }
            for wt in &state.catalog.work_types {
                println!("{:<16} {:<20} {:<10} {}", wt.id, wt.name, wt.category, wt.color);
            }
        }
        WorkTypeCommand::Add {
            id,
            name,
            category,
            color,
            description,
        } => {
            let work_type = WorkType {
                id,
                name,
                color,
                description,
                category: category.parse()?,
            };
            let name = work_type.name.clone();
            TrainingState::update(&paths.state, |state| state.add_work_type(work_type))?;
            println!("✓ Added work type {}", name);
        }
        WorkTypeCommand::Remove { id } => {
            let records = paths.recent_completions(today)?;
            let (_, report) = TrainingState::update(&paths.state, |state| {
                state.remove_work_type(&id, &records, today)
            })?;
            println!("✓ Removed work type {}", report.removed_work_type);
            println!("  Goals updated: {}", report.goals_updated.len());
            println!("  Goals removed: {}", report.goals_removed.len());
            println!("  Days updated:  {}", report.days_updated);
        }
    }
    Ok(())
}

fn cmd_goal(paths: &DataPaths, action: GoalCommand, today: NaiveDate) -> Result<()> {
    match action {
        GoalCommand::List => {
            let state = TrainingState::load(&paths.state)?;
            if state.goals.is_empty() {
                println!("No goals.");
            }
            for goal in &state.goals {
                println!(
                    "{}  {} [{:?}, target {}%{}]",
                    goal.id,
                    goal.name,
                    goal.cadence,
                    goal.target_percentage,
                    if goal.is_active { "" } else { ", inactive" }
                );
            }
        }
        GoalCommand::Add {
            name,
            cadence,
            work_types,
            target,
            level,
            start,
            end,
            description,
        } => {
            let start_date = start.unwrap_or(today);
            let goal = Goal::create(NewGoal {
                name,
                description,
                cadence: cadence.parse()?,
                work_types,
                target_percentage: target,
                student_level: level.parse()?,
                start_date,
                end_date: end.unwrap_or(start_date + chrono::Duration::days(90)),
            })?;
            let (id, goal_name, target) = (goal.id, goal.name.clone(), goal.target_percentage);
            TrainingState::update(&paths.state, |state| state.add_goal(goal))?;
            println!("✓ Added goal {} (target {}%)", goal_name, target);
            println!("  id: {}", id);
        }
        GoalCommand::Remove { id } => {
            let (_, goal) = TrainingState::update(&paths.state, |state| state.remove_goal(id))?;
            println!("✓ Removed goal {}", goal.name);
        }
        GoalCommand::Deactivate { id } => {
            TrainingState::update(&paths.state, |state| state.deactivate_goal(id))?;
            println!("✓ Goal {} is now inactive", id);
        }
    }
    Ok(())
}

fn cmd_complete(
    paths: &DataPaths,
    work_type_id: &str,
    on: NaiveDate,
    today: NaiveDate,
) -> Result<()> {
    let state = TrainingState::load(&paths.state)?;
    let work_type = state
        .catalog
        .work_type(work_type_id)
        .ok_or_else(|| Error::NotFound(format!("work type '{}'", work_type_id)))?;
    let name = work_type.name.clone();

    let mut sink = JsonlSink::new(&paths.journal);
    sink.append(&CompletionRecord::new(work_type_id, on))?;

    let records = paths.recent_completions(today)?;
    TrainingState::update(&paths.state, |state| {
        state.refresh_progress(&records, today);
        Ok(())
    })?;

    println!("✓ Recorded {} on {}", name, on);
    Ok(())
}

fn cmd_progress(paths: &DataPaths, today: NaiveDate) -> Result<()> {
    let records = paths.recent_completions(today)?;
    let (state, _) = TrainingState::update(&paths.state, |state| {
        state.refresh_progress(&records, today);
        Ok(())
    })?;

    if state.goals.is_empty() {
        println!("No goals.");
        return Ok(());
    }

    for goal in state.goals.iter().filter(|g| g.is_active) {
        let Some(progress) = state.progress.get(&goal.id) else {
            continue;
        };
        let mark = if progress.is_completed { "✓" } else { " " };
        println!(
            "{} {:<24} {:>5.1}% of {}%  ({}/{} days)",
            mark,
            goal.name,
            progress.current_percentage,
            goal.target_percentage,
            progress.completed_days,
            progress.total_days
        );
    }
    Ok(())
}

fn cmd_week(paths: &DataPaths, action: WeekCommand, config: &Config) -> Result<()> {
    match action {
        WeekCommand::List => {
            let state = TrainingState::load(&paths.state)?;
            if state.week_plans.is_empty() {
                println!("No week plans.");
            }
            for week in &state.week_plans {
                println!(
                    "{}  {} ({} to {}){}",
                    week.id,
                    week.name,
                    week.start_date,
                    week.end_date,
                    if week.is_template { " [template]" } else { "" }
                );
            }
        }
        WeekCommand::New {
            name,
            start,
            template,
        } => {
            let mut week = WeekPlan::blank(name, start)?;
            week.is_template = template;
            let id = week.id;
            TrainingState::update(&paths.state, |state| state.add_week_plan(week))?;
            println!("✓ Created week plan starting {}", start);
            println!("  id: {}", id);
        }
        WeekCommand::FromTemplate {
            template,
            name,
            start,
        } => {
            let (_, id) = TrainingState::update(&paths.state, |state| {
                let source = state
                    .week_plan(template)
                    .ok_or_else(|| Error::NotFound(format!("week plan {}", template)))?;
                let week = WeekPlan::instantiate(source, name, start)?;
                let id = week.id;
                state.add_week_plan(week)?;
                Ok(id)
            })?;
            println!("✓ Created week plan starting {} from template", start);
            println!("  id: {}", id);
        }
        WeekCommand::Assign {
            week,
            day,
            work_type,
        } => {
            TrainingState::update(&paths.state, |state| {
                if state.catalog.work_type(&work_type).is_none() {
                    return Err(Error::NotFound(format!("work type '{}'", work_type)));
                }
                let plan = state
                    .week_plan_mut(week)
                    .ok_or_else(|| Error::NotFound(format!("week plan {}", week)))?;
                let day_plan = plan.days.get_mut(usize::from(day)).ok_or_else(|| {
                    Error::State(format!("week plan {} has no day {}", week, day))
                })?;
                day_plan.assign(&work_type);
                Ok(())
            })?;
            println!("✓ Assigned {} to day {}", work_type, day);
        }
        WeekCommand::Balance { week } => {
            let state = TrainingState::load(&paths.state)?;
            let plan = state
                .week_plan(week)
                .ok_or_else(|| Error::NotFound(format!("week plan {}", week)))?;

            let report = analyze_balance_with(plan, &state.catalog.work_types, &config.balance);
            display_balance(plan, &report);
        }
    }
    Ok(())
}

fn display_balance(plan: &WeekPlan, report: &BalanceReport) {
    println!("\n  {} ({} to {})", plan.name, plan.start_date, plan.end_date);
    println!();
    for entry in &report.distribution {
        println!(
            "  {:<20} {:<10} {} day(s)  {:>5.1}%",
            entry.work_type.name, entry.work_type.category, entry.count, entry.percentage
        );
    }
    println!();
    if report.warnings.is_empty() {
        println!("  No imbalances found.");
    }
    for message in report.messages() {
        println!("  ⚠ {}", message);
    }
}

fn cmd_recommend(
    paths: &DataPaths,
    goal_id: Uuid,
    min_confidence: Option<u8>,
    search: Option<String>,
    today: NaiveDate,
    config: &Config,
) -> Result<()> {
    let state = TrainingState::load(&paths.state)?;
    let records = paths.recent_completions(today)?;
    let goal = state.goal(goal_id);
    let completed = goal
        .map(|g| state.completed_for_goal(g, &records, today))
        .unwrap_or_default();

    let recommendations = recommend_with(
        goal,
        &state.catalog.work_types,
        &completed,
        &state.catalog.blocks,
        &config.recommendations,
    );

    let shown = filter_recommendations(recommendations, min_confidence, search.as_deref());
    if shown.is_empty() {
        println!("No recommendations.");
        return Ok(());
    }

    for rec in &shown {
        println!("{:>3}%  {:<24} {}", rec.confidence, rec.name, rec.reason);
    }
    Ok(())
}

/// Presentation-side filtering over the engine's ranked list
fn filter_recommendations(
    recommendations: Vec<Recommendation>,
    min_confidence: Option<u8>,
    search: Option<&str>,
) -> Vec<Recommendation> {
    let needle = search.map(str::to_lowercase);
    recommendations
        .into_iter()
        .filter(|r| min_confidence.map_or(true, |min| r.confidence >= min))
        .filter(|r| {
            needle.as_deref().map_or(true, |n| {
                r.name.to_lowercase().contains(n)
                    || r.description.to_lowercase().contains(n)
                    || r.reason.to_lowercase().contains(n)
            })
        })
        .collect()
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.journal.exists() {
        println!("No journal found - nothing to roll up.");
        return Ok(());
    }

    let count = coach_core::archive::journal_to_csv_and_archive(&paths.journal, &paths.archive)?;

    println!("✓ Rolled up {} completions to CSV", count);
    println!("  CSV: {}", paths.archive.display());

    if cleanup {
        let cleaned = coach_core::archive::cleanup_processed_journals(&paths.journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
