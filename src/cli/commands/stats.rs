use clap::Subcommand;

use crate::api::params::GrowthInterval;
use crate::api::types::{GrowthPoint, PlatformGrowth};
use crate::cli::utils::*;
use crate::cli::{AppContext, OutputFormat};
use crate::view::format::{thousands, truncate};

#[derive(Subcommand)]
pub enum StatsCommands {
    #[command(about = "Totals of tracked authors, posts and hashtags")]
    Summary,

    #[command(about = "New authors, posts and hashtags per interval")]
    Growth {
        #[arg(long, default_value_t = GrowthInterval::Day, help = "Day, Week, Month or Year")]
        interval: GrowthInterval,
    },
}

pub async fn handle(cmd: StatsCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        StatsCommands::Summary => {
            let stats = ctx.api.stats().await.map_err(api_error)?;

            match ctx.output {
                OutputFormat::Json => output_value(&ctx.output, &stats),
                OutputFormat::Text => {
                    println!("Authors:          {:>12}", thousands(stats.author_count));
                    println!("Posts:            {:>12}", thousands(stats.post_count));
                    println!("Active hashtags:  {:>12}", thousands(stats.active_hashtags_count));
                    println!("Hashtags seen:    {:>12}", thousands(stats.challenge_count));
                    Ok(())
                }
            }
        }
        StatsCommands::Growth { interval } => {
            let growth = ctx
                .api
                .platform_growth(interval)
                .await
                .map_err(api_error)?;

            match ctx.output {
                OutputFormat::Json => output_value(&ctx.output, &growth),
                OutputFormat::Text => {
                    let rows = growth_rows(&growth);
                    if rows.is_empty() {
                        println!("No data available");
                    } else {
                        print_table(&[interval.label(), "Authors", "Posts", "Hashtags"], &rows);
                    }
                    Ok(())
                }
            }
        }
    }
}

/// One row per interval label; a series missing that label shows 0
fn growth_rows(growth: &PlatformGrowth) -> Vec<Vec<String>> {
    let count = |series: &[GrowthPoint], label: &str| {
        series
            .iter()
            .find(|p| p.interval == label)
            .map(|p| p.count)
            .unwrap_or(0)
    };

    growth
        .labels()
        .into_iter()
        .map(|label| {
            vec![
                truncate(label, 20),
                thousands(count(&growth.author_growth, label)),
                thousands(count(&growth.post_growth, label)),
                thousands(count(&growth.challenge_growth, label)),
            ]
        })
        .collect()
}
