use std::path::PathBuf;

use clap::Args;

use crate::cli::utils::*;
use crate::cli::{AppContext, OutputFormat};
use crate::view::format::{thousands, truncate};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, short, help = "Free-text query")]
    pub query: Option<String>,
    #[arg(long, short, help = "Image to search with (jpg, png, gif, webp)")]
    pub image: Option<PathBuf>,
}

pub async fn handle(args: SearchArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let matches = ctx
        .api
        .multimodal_search(args.query.as_deref(), args.image.as_deref())
        .await
        .map_err(api_error)?;

    if matches.is_empty() {
        return output_empty_collection(&ctx.output, "results", "No matching posts");
    }

    match ctx.output {
        OutputFormat::Json => output_value(&ctx.output, &serde_json::json!({ "results": matches })),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = matches
                .iter()
                .map(|m| {
                    vec![
                        format!("{:.1}%", m.similarity * 100.0),
                        m.post_id.clone(),
                        m.author.nickname.clone(),
                        thousands(m.post.max_play_count),
                        thousands(m.post.max_digg_count),
                        truncate(&m.description, 40),
                    ]
                })
                .collect();
            print_table(&["Match", "Post", "Author", "Views", "Likes", "Description"], &rows);
            Ok(())
        }
    }
}
