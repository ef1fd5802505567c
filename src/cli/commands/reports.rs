use clap::{Args, Subcommand};
use futures::future::try_join_all;
use serde_json::json;

use crate::api::params::{AuthorCategory, AuthorsQuery, HashtagFilter, PostCategory, PostsQuery, ReportFilter};
use crate::api::types::{Author, ReportPost};
use crate::cli::commands::{show_table, DateArgs, TableArgs};
use crate::cli::utils::*;
use crate::cli::{AppContext, OutputFormat};
use crate::view::{DataView, DisplayRow, Tabular};

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dates: DateArgs,
    #[arg(long, default_value = "all", help = "Restrict to one hashtag ('all' for every hashtag)")]
    pub hashtag: HashtagFilter,
    #[arg(long, help = "Number of rows to request")]
    pub limit: Option<u32>,
}

impl ReportArgs {
    fn filter(&self, default_limit: u32) -> anyhow::Result<ReportFilter> {
        Ok(ReportFilter::new(
            self.dates.range()?,
            self.hashtag.clone(),
            self.limit.unwrap_or(default_limit),
        ))
    }
}

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Top posts by a metric")]
    Posts {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, help = "Only posts seen in the For You feed")]
        feed: bool,
        #[arg(long, default_value_t = PostCategory::Views, help = "Views, Likes, Comments, Shares, Reposts or Saves")]
        category: PostCategory,
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Top authors by a metric (every metric when none is given)")]
    Authors {
        #[command(flatten)]
        report: ReportArgs,
        #[arg(long, help = "Likes Collected, Likes Given, Followers or Videos")]
        category: Option<AuthorCategory>,
        #[command(flatten)]
        table: TableArgs,
    },
}

pub async fn handle(cmd: ReportCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        ReportCommands::Posts {
            report,
            feed,
            category,
            table,
        } => {
            let query = PostsQuery {
                filter: report.filter(ctx.view.default_limit)?,
                feed,
                category,
            };
            let api = ctx.api.clone();
            let view: DataView<PostsQuery, ReportPost> = DataView::new(move |query: PostsQuery| {
                let api = api.clone();
                async move { api.top_posts(&query).await }
            });
            let hashtag = report.hashtag.as_tag().map(str::to_string);
            show_table(ctx, view, query, &table, ctx.view.page_size, hashtag.as_deref()).await
        }
        ReportCommands::Authors {
            report,
            category: Some(category),
            table,
        } => {
            let query = AuthorsQuery {
                filter: report.filter(ctx.view.default_limit)?,
                category,
            };
            let api = ctx.api.clone();
            let view: DataView<AuthorsQuery, Author> = DataView::new(move |query: AuthorsQuery| {
                let api = api.clone();
                async move { api.top_authors(&query).await }
            });
            let hashtag = report.hashtag.as_tag().map(str::to_string);
            show_table(ctx, view, query, &table, ctx.view.page_size, hashtag.as_deref()).await
        }
        ReportCommands::Authors {
            report, category: None, ..
        } => {
            let filter = report.filter(ctx.view.default_limit)?;
            let requests = AuthorCategory::ALL.iter().map(|category| {
                let query = AuthorsQuery {
                    filter: filter.clone(),
                    category: *category,
                };
                let api = ctx.api.clone();
                async move { api.top_authors(&query).await.map(|authors| (*category, authors)) }
            });

            let sections = try_join_all(requests)
                .await
                .map_err(api_error)?;

            match ctx.output {
                OutputFormat::Json => {
                    let body: serde_json::Map<String, serde_json::Value> = sections
                        .iter()
                        .map(|(category, authors)| (category.label().to_string(), json!(authors)))
                        .collect();
                    output_value(&ctx.output, &body)
                }
                OutputFormat::Text => {
                    for (category, authors) in &sections {
                        println!("\n== {} ==", category);
                        if authors.is_empty() {
                            println!("No data available");
                            continue;
                        }
                        let rows: Vec<Vec<String>> = authors.iter().map(DisplayRow::display_row).collect();
                        print_table(Author::headers(), &rows);
                    }
                    Ok(())
                }
            }
        }
    }
}
