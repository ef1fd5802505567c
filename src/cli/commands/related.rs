use clap::Args;

use crate::api::params::TrendsQuery;
use crate::api::types::RelatedHashtagRule;
use crate::cli::commands::{show_table, DateArgs, TableArgs};
use crate::cli::AppContext;
use crate::view::DataView;

#[derive(Args, Debug, Clone)]
pub struct RelatedArgs {
    #[command(flatten)]
    pub dates: DateArgs,
    #[arg(long, help = "Minimum support of a rule (0.0 - 1.0)")]
    pub min_support: Option<f64>,
    #[arg(long, help = "Rules to request from the server")]
    pub limit: Option<u32>,
    #[command(flatten)]
    pub table: TableArgs,
}

pub async fn handle(args: RelatedArgs, ctx: &AppContext) -> anyhow::Result<()> {
    if let Some(support) = args.min_support {
        if !(0.0..=1.0).contains(&support) {
            anyhow::bail!("--min-support must be between 0 and 1");
        }
    }

    let query = TrendsQuery {
        range: args.dates.range()?,
        limit: args.limit,
        min_support: args.min_support,
        ..TrendsQuery::default()
    };

    let api = ctx.api.clone();
    let view: DataView<TrendsQuery, RelatedHashtagRule> = DataView::new(move |query: TrendsQuery| {
        let api = api.clone();
        async move { api.related_hashtags(&query).await.map(|r| r.related_hashtag_rules) }
    });

    show_table(ctx, view, query, &args.table, ctx.view.page_size, None).await
}
