use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing_subscriber::EnvFilter;

use placement_analytics::aggregate::Aggregate;
use placement_analytics::filter::{FilterOptions, RECENT_BATCH_WINDOW};
use placement_analytics::{
    db, pipeline, report, source, BatchSelection, FilterSet, Relations, Selection,
};

#[derive(Parser)]
#[command(name = "placement-analytics")]
#[command(about = "Placement and hiring analytics for a student cohort", long_about = None)]
struct Cli {
    /// Read relations from CSV files in this directory instead of Postgres
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, default_value = "All")]
    dept: Selection,
    /// A batch value, "All", or "Last 3 Years"
    #[arg(long, default_value = "All")]
    batch: BatchSelection,
    /// Restrict to the most recent batches
    #[arg(long, conflicts_with = "batch")]
    recent_batches: bool,
    #[arg(long, default_value = "All")]
    company: Selection,
}

impl FilterArgs {
    fn into_filter(self) -> FilterSet {
        FilterSet {
            department: self.dept,
            batch: if self.recent_batches {
                BatchSelection::Recent(RECENT_BATCH_WINDOW)
            } else {
                self.batch
            },
            company: self.company,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a sample cohort
    Seed,
    /// List the values accepted by each filter
    Options,
    /// Print headline metrics for a selection
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print every derived table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the student × company matrix as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "hiring_records.csv")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Options => {
            let relations = load(cli.data_dir.as_deref()).await?;
            let options = FilterOptions::from_relations(&relations);
            println!("Departments: {}", options.departments.join(", "));
            println!("Batches: {}", options.batches.join(", "));
            println!("Companies: {}", options.companies.join(", "));
        }
        Commands::Summary { filters, json } => {
            let relations = load(cli.data_dir.as_deref()).await?;
            let output = pipeline::run(&relations, &filters.into_filter())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            let summary = &output.summary;
            println!("Total students: {}", summary.total_students);
            println!("Placed students: {}", summary.placed);
            println!("Shortlisted: {}", summary.shortlisted);
            println!("Placement rate: {:.2}%", summary.placement_rate);

            match &output.overall {
                Aggregate::Empty => println!("No data for this selection."),
                Aggregate::Rows(rows) => {
                    println!("Placement status:");
                    for share in rows {
                        println!("- {}: {} ({:.1}%)", share.status, share.count, share.percent);
                    }
                }
            }

            if let Aggregate::Rows(rows) = &output.top_recruiters {
                println!("Top recruiters:");
                for recruiter in rows.iter().take(5) {
                    println!("- {}: {} students", recruiter.company, recruiter.students);
                }
            }
        }
        Commands::Report { filters, out } => {
            let relations = load(cli.data_dir.as_deref()).await?;
            let filter = filters.into_filter();
            let output = pipeline::run(&relations, &filter)?;
            let report = report::build_report(&filter, &output);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { filters, out } => {
            let relations = load(cli.data_dir.as_deref()).await?;
            let output = pipeline::run(&relations, &filters.into_filter())?;

            if output.pivot.is_empty() {
                println!("No hiring records available for the selected filters.");
                return Ok(());
            }

            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            output.pivot.write_csv(file)?;
            println!(
                "Exported {} students across {} companies to {}.",
                output.pivot.rows().len(),
                output.pivot.companies().len(),
                out.display()
            );
        }
    }

    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set when --data-dir is not given")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load(data_dir: Option<&Path>) -> anyhow::Result<Relations> {
    match data_dir {
        Some(dir) => source::load_relations(dir),
        None => {
            let pool = connect().await?;
            db::fetch_relations(&pool).await
        }
    }
}
