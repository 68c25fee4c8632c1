use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod aggregate;
mod cache;
mod loader;
mod models;
mod peaks;
mod report;

use models::{District, EventKind};

#[derive(Parser)]
#[command(name = "activation-insights")]
#[command(about = "Analytics over a product activation/registration event log", long_about = None)]
struct Cli {
    /// Path to the event-log CSV (windows-1251 encoded)
    #[arg(long, default_value = "Output.csv")]
    csv: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals per event kind and per federal district
    Summary,
    /// Registration peak dates and the inter-peak interval statistic
    Peaks,
    /// Daily counts for one event kind
    Daily {
        #[arg(long, value_enum, default_value_t = EventKind::Activation)]
        kind: EventKind,
    },
    /// Daily activations per federal district
    Districts {
        /// Restrict to these districts; repeat the flag to select several
        #[arg(long)]
        district: Vec<String>,
    },
    /// Write the markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write the JSON bundle consumed by the dashboard
    Export {
        #[arg(long, default_value = "dashboard.json")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cache = cache::CachedLoader::new();
    let records = cache.load(&cli.csv)?;

    match cli.command {
        Commands::Summary => {
            println!("Loaded {} rows from {}.", records.len(), cli.csv.display());
            println!();
            println!("Totals by event kind:");
            for (kind, total) in aggregate::totals_by_kind(records) {
                println!("- {kind}: {total}");
            }
            println!();
            println!("Activations by district:");
            for (district, count) in report::ranked_activation_totals(records) {
                println!("- {district}: {count}");
            }
        }
        Commands::Peaks => {
            let series = aggregate::daily_series(records, EventKind::Registration);
            let intervals = peaks::analyze(&series);

            if intervals.peak_dates.is_empty() {
                println!("No peaks in the registration series.");
                return Ok(());
            }

            println!("Registration peaks:");
            for date in &intervals.peak_dates {
                println!("- {}", date.format("%Y-%m-%d"));
            }
            match intervals.gap_stats {
                Some(stats) => println!(
                    "Mean gap {:.2} days, population stddev {:.2} days.",
                    stats.mean_days, stats.stddev_days
                ),
                None => println!("Fewer than two peaks; interval statistic undefined."),
            }
        }
        Commands::Daily { kind } => {
            for point in aggregate::daily_series(records, kind) {
                println!("{} {}", point.date.format("%Y-%m-%d"), point.count);
            }
        }
        Commands::Districts { district } => {
            let selected = district
                .iter()
                .map(|label| {
                    District::parse(label).with_context(|| {
                        let known: Vec<&str> =
                            District::ALL.iter().map(|d| d.name()).collect();
                        format!(
                            "unknown district {label:?} (expected one of: {})",
                            known.join(", ")
                        )
                    })
                })
                .collect::<anyhow::Result<Vec<District>>>()?;

            for ((date, district), count) in aggregate::activation_daily_by_district(records)
            {
                if selected.is_empty() || selected.contains(&district) {
                    println!("{} {district} {count}", date.format("%Y-%m-%d"));
                }
            }
        }
        Commands::Report { out } => {
            let report = report::build_report(records);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out } => {
            let bundle = report::build_bundle(records);
            let json = serde_json::to_string_pretty(&bundle)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard bundle written to {}.", out.display());
        }
    }

    Ok(())
}
