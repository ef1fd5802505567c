//! Request parameters built by filter controls and handed to views.
//!
//! Every type here is an immutable value with `PartialEq`, so a view can tell
//! whether a new filter actually differs from the one it last fetched with.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Value the filter control uses for "every hashtag"
pub const ALL_HASHTAGS: &str = "all";

/// Query pairs ready for `reqwest::RequestBuilder::query`
pub type QueryPairs = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashtagFilter {
    #[default]
    All,
    Tag(String),
}

impl HashtagFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().trim_start_matches('#');
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_HASHTAGS) {
            HashtagFilter::All
        } else {
            HashtagFilter::Tag(trimmed.to_string())
        }
    }

    pub fn as_tag(&self) -> Option<&str> {
        match self {
            HashtagFilter::All => None,
            HashtagFilter::Tag(tag) => Some(tag),
        }
    }

    /// Report endpoints require `hashtag` and read the literal `all` as
    /// "no hashtag constraint"
    pub fn push_query(&self, pairs: &mut QueryPairs) {
        pairs.push(("hashtag", self.to_string()));
    }
}

impl FromStr for HashtagFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HashtagFilter::parse(s))
    }
}

impl fmt::Display for HashtagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashtagFilter::All => f.write_str(ALL_HASHTAGS),
            HashtagFilter::Tag(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Both ends from calendar dates; the end day is included in full
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|d| d.and_utc()),
            end: end.and_then(|d| d.and_hms_opt(23, 59, 59)).map(|d| d.and_utc()),
        }
    }

    /// Lower bound used when the range is open at the start
    pub fn floor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).single().unwrap_or_default()
    }

    /// Upper bound used when the range is open at the end
    pub fn ceiling() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2200, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Report endpoints require both bounds
    pub fn push_bounded(&self, pairs: &mut QueryPairs) {
        pairs.push(("start_date", iso(self.start.unwrap_or_else(Self::floor))));
        pairs.push(("end_date", iso(self.end.unwrap_or_else(Self::ceiling))));
    }

    /// Trend endpoints treat a missing bound as unbounded
    pub fn push_optional(&self, pairs: &mut QueryPairs) {
        if let Some(start) = self.start {
            pairs.push(("start_date", iso(start)));
        }
        if let Some(end) = self.end {
            pairs.push(("end_date", iso(end)));
        }
    }
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Generates an enum whose wire value is the label the backend expects
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace(['-', '_'], " ");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(&wanted))
                    .ok_or_else(|| {
                        let labels: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                        format!("unknown value '{}', expected one of: {}", s, labels.join(", "))
                    })
            }
        }
    };
}

labelled_enum!(
    /// Metric the top-posts report ranks by
    PostCategory {
        Views => "Views",
        Likes => "Likes",
        Comments => "Comments",
        Shares => "Shares",
        Reposts => "Reposts",
        Saves => "Saves",
    }
);

labelled_enum!(
    /// Metric the top-authors report ranks by
    AuthorCategory {
        LikesCollected => "Likes Collected",
        LikesGiven => "Likes Given",
        Followers => "Followers",
        Videos => "Videos",
    }
);

labelled_enum!(
    GrowthInterval {
        Day => "Day",
        Week => "Week",
        Month => "Month",
        Year => "Year",
    }
);

impl Default for PostCategory {
    fn default() -> Self {
        PostCategory::Views
    }
}

impl Default for AuthorCategory {
    fn default() -> Self {
        AuthorCategory::LikesCollected
    }
}

impl Default for GrowthInterval {
    fn default() -> Self {
        GrowthInterval::Day
    }
}

/// Filters shared by every tab of the reports page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub range: DateRange,
    pub hashtag: HashtagFilter,
    pub limit: u32,
}

impl ReportFilter {
    pub fn new(range: DateRange, hashtag: HashtagFilter, limit: u32) -> Self {
        Self { range, hashtag, limit }
    }

    fn push_common(&self, pairs: &mut QueryPairs) {
        self.range.push_bounded(pairs);
        self.hashtag.push_query(pairs);
        pairs.push(("limit", self.limit.max(1).to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PostsQuery {
    pub filter: ReportFilter,
    pub feed: bool,
    pub category: PostCategory,
}

impl PostsQuery {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = vec![("feed", self.feed.to_string())];
        self.filter.push_common(&mut pairs);
        pairs.push(("category", self.category.label().to_string()));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AuthorsQuery {
    pub filter: ReportFilter,
    pub category: AuthorCategory,
}

impl AuthorsQuery {
    pub fn to_query(&self) -> QueryPairs {
        // The authors endpoint reuses the posts request model, so `feed` is required
        let mut pairs = vec![("feed", "false".to_string())];
        self.filter.push_common(&mut pairs);
        pairs.push(("category", self.category.label().to_string()));
        pairs
    }
}

/// Parameters of the list endpoints behind the trend tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendsQuery {
    pub range: DateRange,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub min_growth: Option<f64>,
    pub min_support: Option<f64>,
}

impl TrendsQuery {
    pub fn to_query(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        self.range.push_optional(&mut pairs);
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(min_growth) = self.min_growth {
            pairs.push(("min_growth", min_growth.to_string()));
        }
        if let Some(min_support) = self.min_support {
            pairs.push(("min_support", min_support.to_string()));
        }
        pairs
    }
}
