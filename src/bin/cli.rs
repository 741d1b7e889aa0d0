use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use site_schedule::{
    PlannerConfig, Project, SchedulePlanner, TemplateCatalog, Task, load_project_with_policy,
    load_templates_from_json, save_project_to_json, save_tasks_to_csv,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cli", version, about = "Construction schedule planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file layered over ./site-schedule.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON file with extra project templates
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List available project templates
    Templates,
    /// Build a project from a template
    Generate {
        #[arg(short, long)]
        template: String,
        /// Project start date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(short, long, default_value = "New Project")]
        name: String,
        /// Write the project as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the task table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Report critical path, conflicts and progress for a saved project
    Analyze { project: PathBuf },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn main() {
    if let Err(error) = run() {
        eprintln!("cli error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => PlannerConfig::load_from(path),
        None => PlannerConfig::load(),
    }
    .context("failed to load configuration")?;

    let mut catalog = TemplateCatalog::builtin();
    if let Some(path) = &cli.templates {
        let added = load_templates_from_json(&mut catalog, path)
            .with_context(|| format!("failed to load templates from {}", path.display()))?;
        tracing::debug!(added, "registered extra templates");
    }
    let planner = SchedulePlanner::new(catalog, config);

    match cli.command {
        Commands::Templates => {
            for template in planner.catalog().iter() {
                println!(
                    "{:<24} {:>2} phases  {:>3} days  {}",
                    template.id,
                    template.phases.len(),
                    template.total_estimated_days(),
                    template.name
                );
            }
        }
        Commands::Generate {
            template,
            start,
            name,
            output,
            csv,
        } => {
            let mut project = planner.create_project(&template, &name, start)?;
            let summary = project.refresh()?;
            println!("{}", render_task_table(&project.tasks));
            println!("{}", summary.to_cli_summary());
            if let Some(path) = output {
                save_project_to_json(&project, &path)?;
                println!("Project saved to {}", path.display());
            }
            if let Some(path) = csv {
                save_tasks_to_csv(&project.tasks, &path)?;
                println!("Task table saved to {}", path.display());
            }
        }
        Commands::Analyze { project } => {
            let policy = planner.config().scheduling.missing_dependencies;
            let project = load_project_with_policy(&project, policy)
                .with_context(|| format!("failed to analyze {}", project.display()))?;
            print_analysis(&project)?;
        }
    }
    Ok(())
}

fn print_analysis(project: &Project) -> anyhow::Result<()> {
    let path = project.critical_path()?;
    println!("Project: {} ({} tasks)", project.name, project.tasks.len());
    println!(
        "Critical path: {} days, {} to {}",
        path.total_duration, path.start_date, path.end_date
    );
    for task in &path.tasks {
        println!("  * {} ({}d, {} to {})", task.name, task.duration_days, task.start_date, task.end_date);
    }
    if project.conflicts.is_empty() {
        println!("No conflicts.");
    } else {
        println!("Conflicts:");
        for conflict in &project.conflicts {
            println!("  [{}] {}", conflict.conflict_type, conflict.description);
            println!("      -> {}", conflict.suggested_resolution);
        }
    }
    println!("Progress: {}%", project.progress());
    Ok(())
}

fn render_task_table(tasks: &[Task]) -> String {
    let headers = ["name", "start", "end", "days", "resource", "status", "critical"];
    let rows: Vec<[String; 7]> = tasks
        .iter()
        .map(|t| {
            [
                t.name.clone(),
                t.start_date.to_string(),
                t.end_date.to_string(),
                t.duration_days.to_string(),
                t.resource_id.clone().unwrap_or_default(),
                t.status.to_string(),
                if t.is_on_critical_path { "*".into() } else { String::new() },
            ]
        })
        .collect();

    // Compute column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: Vec<&str>| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci] - cell.len()));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(headers.to_vec()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SITE_SCHEDULE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
