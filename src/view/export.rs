use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Record type that can be laid out as a table row
pub trait Tabular {
    /// Resource name used in export file names, e.g. `post_trends`
    const RESOURCE: &'static str;

    fn headers() -> &'static [&'static str];

    /// Cells in header order
    fn row(&self) -> Vec<String>;
}

/// Comma-separated export of a whole result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    content: String,
    rows: usize,
}

impl CsvDocument {
    pub const MIME: &'static str = "text/csv;charset=utf-8";
    pub const DELIMITER: char = ',';
    pub const LINE_END: &'static str = "\n";

    pub fn build<T: Tabular>(records: &[T]) -> Self {
        Self::from_rows(T::headers(), records.iter().map(Tabular::row))
    }

    pub fn from_rows<I, R, S>(headers: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = vec![join(headers.iter().copied())];
        lines.extend(rows.into_iter().map(|row| join(row)));
        let rows = lines.len() - 1;

        Self {
            content: lines.join(Self::LINE_END),
            rows,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Write into `dir` under `file_name`, returning the full path
    pub fn write_to(&self, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let path = dir.join(file_name);
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}

fn join<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|cell| sanitize(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Cells never contain the delimiter or a line break, so every line splits
/// into exactly as many values as the header
pub fn sanitize(cell: &str) -> String {
    cell.replace([',', '\n', '\r'], " ").trim().to_string()
}

/// `<resource>_<YYYY-MM-DD>.csv`, or `<resource>_<hashtag>_<YYYY-MM-DD>.csv`
/// when the export is scoped to one hashtag
pub fn export_filename(resource: &str, hashtag: Option<&str>, date: NaiveDate) -> String {
    let day = date.format("%Y-%m-%d");
    match hashtag.map(|h| h.trim().trim_start_matches('#')).filter(|h| !h.is_empty()) {
        Some(tag) => format!("{}_{}_{}.csv", resource, file_safe(tag), day),
        None => format!("{}_{}.csv", resource, day),
    }
}

fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(i64, i64);

    impl Tabular for Pair {
        const RESOURCE: &'static str = "pairs";

        fn headers() -> &'static [&'static str] {
            &["A", "B"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn two_rows_export_exactly() {
        let doc = CsvDocument::build(&[Pair(1, 2), Pair(3, 4)]);
        assert_eq!(doc.as_str(), "A,B\n1,2\n3,4");
        assert_eq!(doc.row_count(), 2);
    }

    #[test]
    fn line_and_value_counts_hold() {
        let records: Vec<Pair> = (0..37).map(|i| Pair(i, i * 1000)).collect();
        let doc = CsvDocument::build(&records);
        let lines: Vec<&str> = doc.as_str().split('\n').collect();
        assert_eq!(lines.len(), records.len() + 1);

        let width = lines[0].split(',').count();
        assert!(lines.iter().all(|line| line.split(',').count() == width));
    }

    #[test]
    fn empty_result_is_header_only() {
        let doc = CsvDocument::build::<Pair>(&[]);
        assert_eq!(doc.as_str(), "A,B");
    }

    #[test]
    fn embedded_commas_are_neutralised() {
        let doc = CsvDocument::from_rows(&["Tags", "Views"], vec![vec!["fyp, dance", "10"]]);
        assert_eq!(doc.as_str(), "Tags,Views\nfyp  dance,10");
    }

    #[test]
    fn filenames() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(export_filename("post_trends", None, day), "post_trends_2024-05-09.csv");
        assert_eq!(
            export_filename("hashtag_posts", Some("#summer vibes"), day),
            "hashtag_posts_summer_vibes_2024-05-09.csv"
        );
        assert_eq!(export_filename("author_trends", Some(""), day), "author_trends_2024-05-09.csv");
    }
}
