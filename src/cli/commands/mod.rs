pub mod auth;
pub mod hashtags;
pub mod related;
pub mod reports;
pub mod search;
pub mod server;
pub mod stats;
pub mod trends;

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Args;

use crate::api::params::DateRange;
use crate::cli::utils::{output_success, PageRenderer};
use crate::cli::AppContext;
use crate::view::{export_filename, CsvDocument, DataView, DisplayRow, PageWindow, ViewState};
use serde::Serialize;
use serde_json::json;

/// `--start` / `--end` calendar dates shared by every filtered command
#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    #[arg(long, help = "Start date (YYYY-MM-DD)")]
    pub start: Option<NaiveDate>,
    #[arg(long, help = "End date (YYYY-MM-DD), inclusive")]
    pub end: Option<NaiveDate>,
}

impl DateArgs {
    pub fn range(&self) -> anyhow::Result<DateRange> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                anyhow::bail!("Start date {} is after end date {}", start, end);
            }
        }
        Ok(DateRange::from_dates(self.start, self.end))
    }
}

/// `--page N` and `--csv [DIR]` for commands backed by a paged table
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    #[arg(long, default_value_t = 1, help = "Page to show")]
    pub page: usize,
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = ".",
        value_name = "DIR",
        help = "Export the full result set as CSV into DIR (default: current directory)"
    )]
    pub csv: Option<PathBuf>,
}

/// Mount a view, wait for it to settle, then either export or render a page
pub async fn show_table<P, T>(
    ctx: &AppContext,
    mut view: DataView<P, T>,
    params: P,
    table: &TableArgs,
    items_per_page: usize,
    hashtag: Option<&str>,
) -> anyhow::Result<()>
where
    P: Clone + PartialEq + Send + 'static,
    T: DisplayRow + Serialize + Clone + Send + Sync + 'static,
{
    view.mount(params);
    let settled = view.wait_settled().await;

    if let (Some(dir), ViewState::Ready(records)) = (&table.csv, &settled) {
        return export_csv(ctx, records, dir, hashtag);
    }

    let mut window = PageWindow::new(items_per_page);
    if let ViewState::Ready(records) = &settled {
        window.go_to(table.page, records.len());
    }
    render_page(ctx, &view, window)
}

/// Render the settled view through one page window; an error branch becomes
/// the command's error
pub fn render_page<P, T>(ctx: &AppContext, view: &DataView<P, T>, window: PageWindow) -> anyhow::Result<()>
where
    P: Clone + PartialEq + Send + 'static,
    T: DisplayRow + Serialize + Clone + Send + Sync + 'static,
{
    let mut renderer = PageRenderer::new(&ctx.output, T::RESOURCE, window);
    view.render(&mut renderer);
    renderer.finish()
}

fn export_csv<T: DisplayRow>(
    ctx: &AppContext,
    records: &[T],
    dir: &std::path::Path,
    hashtag: Option<&str>,
) -> anyhow::Result<()> {
    let document = CsvDocument::build(records);
    let file_name = export_filename(T::RESOURCE, hashtag, Utc::now().date_naive());
    let path = document.write_to(dir, &file_name)?;

    output_success(
        &ctx.output,
        &format!("Exported {} rows to {}", document.row_count(), path.display()),
        Some(json!({
            "path": path.display().to_string(),
            "rows": document.row_count(),
            "content_type": CsvDocument::MIME,
        })),
    )
}
