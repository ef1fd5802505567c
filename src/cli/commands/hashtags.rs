use clap::Subcommand;
use serde_json::json;

use crate::api::types::Hashtag;
use crate::cli::commands::{render_page, show_table, TableArgs};
use crate::cli::utils::*;
use crate::cli::{AppContext, OutputFormat};
use crate::view::format::{growth_band, growth_bar, percent};
use crate::view::{DataView, PageWindow, ViewState};

#[derive(Subcommand)]
pub enum HashtagCommands {
    #[command(about = "List monitored hashtags")]
    List {
        #[command(flatten)]
        table: TableArgs,
    },

    #[command(about = "Start monitoring a hashtag")]
    Add {
        #[arg(help = "Hashtag, with or without the leading #")]
        title: String,
    },

    #[command(about = "Stop monitoring a hashtag")]
    Deactivate {
        #[arg(help = "Hashtag ID")]
        id: String,
        #[arg(long, default_value_t = 1, help = "Page of the list to show afterwards")]
        page: usize,
    },

    #[command(about = "Growth of a single hashtag")]
    Trends {
        #[arg(help = "Hashtag title")]
        title: String,
    },
}

fn hashtag_view(ctx: &AppContext) -> DataView<(), Hashtag> {
    let api = ctx.api.clone();
    DataView::new(move |_| {
        let api = api.clone();
        async move { api.active_hashtags().await }
    })
}

pub async fn handle(cmd: HashtagCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        HashtagCommands::List { table } => {
            show_table(ctx, hashtag_view(ctx), (), &table, ctx.view.hashtag_cards_per_page, None).await
        }
        HashtagCommands::Add { title } => {
            let response = ctx
                .api
                .add_hashtag(&title)
                .await
                .map_err(api_error)?;
            output_success(&ctx.output, response.text(), Some(json!({ "hashtag": title })))
        }
        HashtagCommands::Deactivate { id, page } => {
            let mut view = hashtag_view(ctx);
            view.mount(());
            let mut window = PageWindow::new(ctx.view.hashtag_cards_per_page);
            if let ViewState::Ready(before) = view.wait_settled().await {
                window.go_to(page, before.len());
            }

            let response = ctx
                .api
                .deactivate_hashtag(&id)
                .await
                .map_err(api_error)?;
            output_success(&ctx.output, response.text(), Some(json!({ "id": id })))?;

            // the list shrank; the renderer clamps the page to what is left
            view.refresh();
            view.wait_settled().await;
            render_page(ctx, &view, window)
        }
        HashtagCommands::Trends { title } => {
            let trend = ctx
                .api
                .hashtag_trend(&title)
                .await
                .map_err(api_error)?;

            match ctx.output {
                OutputFormat::Json => output_value(&ctx.output, &trend),
                OutputFormat::Text => {
                    println!("#{}", trend.hashtag_title);
                    for (label, rate) in [
                        ("Daily", trend.daily_growth),
                        ("Weekly", trend.weekly_growth),
                        ("Monthly", trend.monthly_growth),
                    ] {
                        println!(
                            "  {:<8} {} {:>9}  {}",
                            label,
                            growth_bar(rate),
                            percent(rate),
                            growth_band(rate).label()
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}
