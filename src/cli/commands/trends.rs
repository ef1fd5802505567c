use clap::{Args, Subcommand};

use crate::api::params::TrendsQuery;
use crate::api::types::{AuthorTrend, HashtagTrend, PostTrend};
use crate::cli::commands::{show_table, DateArgs, TableArgs};
use crate::cli::AppContext;
use crate::view::DataView;

#[derive(Args, Debug, Clone)]
pub struct TrendArgs {
    #[command(flatten)]
    pub dates: DateArgs,
    #[arg(long, help = "Rows to request from the server (server default when omitted)")]
    pub limit: Option<u32>,
    #[arg(long, help = "Rows to skip on the server")]
    pub offset: Option<u32>,
    #[command(flatten)]
    pub table: TableArgs,
}

impl TrendArgs {
    fn query(&self) -> anyhow::Result<TrendsQuery> {
        Ok(TrendsQuery {
            range: self.dates.range()?,
            limit: self.limit,
            offset: self.offset,
            ..TrendsQuery::default()
        })
    }
}

#[derive(Subcommand)]
pub enum TrendCommands {
    #[command(about = "View growth of tracked posts")]
    Posts(TrendArgs),

    #[command(about = "Follower growth of tracked authors")]
    Authors(TrendArgs),

    #[command(about = "Growth of monitored hashtags")]
    Hashtags {
        #[command(flatten)]
        args: TrendArgs,
        #[arg(long, help = "Only hashtags whose growth is at least this percentage")]
        min_growth: Option<f64>,
    },
}

pub async fn handle(cmd: TrendCommands, ctx: &AppContext) -> anyhow::Result<()> {
    let page_size = ctx.view.page_size;

    match cmd {
        TrendCommands::Posts(args) => {
            let api = ctx.api.clone();
            let view: DataView<TrendsQuery, PostTrend> = DataView::new(move |query: TrendsQuery| {
                let api = api.clone();
                async move { api.post_trends(&query).await.map(|page| page.items) }
            });
            show_table(ctx, view, args.query()?, &args.table, page_size, None).await
        }
        TrendCommands::Authors(args) => {
            let api = ctx.api.clone();
            let view: DataView<TrendsQuery, AuthorTrend> = DataView::new(move |query: TrendsQuery| {
                let api = api.clone();
                async move { api.author_trends(&query).await.map(|page| page.items) }
            });
            show_table(ctx, view, args.query()?, &args.table, page_size, None).await
        }
        TrendCommands::Hashtags { args, min_growth } => {
            let query = TrendsQuery {
                min_growth,
                ..args.query()?
            };
            let api = ctx.api.clone();
            let view: DataView<TrendsQuery, HashtagTrend> = DataView::new(move |query: TrendsQuery| {
                let api = api.clone();
                async move { api.hashtag_trends(&query).await.map(|page| page.items) }
            });
            show_table(ctx, view, query, &args.table, page_size, None).await
        }
    }
}
