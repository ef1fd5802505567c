// Table layouts for the record types the dashboard lists
use super::export::Tabular;
use super::format::{fixed2, percent, thousands, timestamp, truncate};
use crate::api::types::{Author, AuthorTrend, Hashtag, HashtagTrend, PostTrend, RelatedHashtagRule, ReportPost};

/// On-screen variant of a row: grouped digits and percent signs
pub trait DisplayRow: Tabular {
    fn display_row(&self) -> Vec<String> {
        self.row()
    }
}

impl Tabular for PostTrend {
    const RESOURCE: &'static str = "post_trends";

    fn headers() -> &'static [&'static str] {
        &[
            "Post ID",
            "Author",
            "Hashtags",
            "Current Views",
            "Daily Growth Rate (%)",
            "Daily Views Change",
            "Weekly Growth Rate (%)",
            "Weekly Views Change",
            "Monthly Growth Rate (%)",
            "Monthly Views Change",
            "Last Updated",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.post_id.clone(),
            self.author_name.clone(),
            self.challenges.join(" "),
            self.current_views.to_string(),
            fixed2(self.daily_growth_rate),
            self.daily_change.to_string(),
            fixed2(self.weekly_growth_rate),
            self.weekly_change.to_string(),
            fixed2(self.monthly_growth_rate),
            self.monthly_change.to_string(),
            timestamp(&self.collected_at),
        ]
    }
}

impl DisplayRow for PostTrend {
    fn display_row(&self) -> Vec<String> {
        let tags = match self.challenges.len() {
            0..=3 => self.challenges.join(" "),
            n => format!("{} +{}", self.challenges[..3].join(" "), n - 3),
        };

        vec![
            self.post_id.clone(),
            self.author_name.clone(),
            tags,
            thousands(self.current_views),
            percent(self.daily_growth_rate),
            thousands(self.daily_change),
            percent(self.weekly_growth_rate),
            thousands(self.weekly_change),
            percent(self.monthly_growth_rate),
            thousands(self.monthly_change),
            timestamp(&self.collected_at),
        ]
    }
}

impl Tabular for AuthorTrend {
    const RESOURCE: &'static str = "author_trends";

    fn headers() -> &'static [&'static str] {
        &[
            "Author Nickname",
            "Unique ID",
            "Current Followers",
            "Current Hearts",
            "Daily Growth Rate (%)",
            "Daily Followers Change",
            "Weekly Growth Rate (%)",
            "Weekly Followers Change",
            "Monthly Growth Rate (%)",
            "Monthly Followers Change",
            "Last Updated",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.author_nickname.clone(),
            self.unique_id.clone().unwrap_or_default(),
            self.current_followers.to_string(),
            self.current_hearts.to_string(),
            fixed2(self.daily_followers_growth_rate),
            self.daily_followers_change.to_string(),
            fixed2(self.weekly_followers_growth_rate),
            self.weekly_followers_change.to_string(),
            fixed2(self.monthly_followers_growth_rate),
            self.monthly_followers_change.to_string(),
            self.collected_at.as_ref().map(timestamp).unwrap_or_else(|| "N/A".to_string()),
        ]
    }
}

impl DisplayRow for AuthorTrend {
    fn display_row(&self) -> Vec<String> {
        let mut row = self.row();
        row[2] = thousands(self.current_followers);
        row[3] = thousands(self.current_hearts);
        row[4] = percent(self.daily_followers_growth_rate);
        row[5] = thousands(self.daily_followers_change);
        row[6] = percent(self.weekly_followers_growth_rate);
        row[7] = thousands(self.weekly_followers_change);
        row[8] = percent(self.monthly_followers_growth_rate);
        row[9] = thousands(self.monthly_followers_change);
        row
    }
}

impl Tabular for HashtagTrend {
    const RESOURCE: &'static str = "hashtag_trends";

    fn headers() -> &'static [&'static str] {
        &["Hashtag", "Daily Growth (%)", "Weekly Growth (%)", "Monthly Growth (%)"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.hashtag_title.clone(),
            fixed2(self.daily_growth),
            fixed2(self.weekly_growth),
            fixed2(self.monthly_growth),
        ]
    }
}

impl DisplayRow for HashtagTrend {
    fn display_row(&self) -> Vec<String> {
        vec![
            self.hashtag_title.clone(),
            percent(self.daily_growth),
            percent(self.weekly_growth),
            percent(self.monthly_growth),
        ]
    }
}

impl Tabular for RelatedHashtagRule {
    const RESOURCE: &'static str = "related_hashtags";

    fn headers() -> &'static [&'static str] {
        &["Hashtags", "Related Hashtags", "Support", "Confidence", "Lift"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.hashtags.join(" "),
            self.related_hashtags.join(" "),
            format!("{:.4}", self.support),
            format!("{:.4}", self.confidence),
            format!("{:.4}", self.lift),
        ]
    }
}

impl DisplayRow for RelatedHashtagRule {}

impl Tabular for ReportPost {
    const RESOURCE: &'static str = "top_posts";

    fn headers() -> &'static [&'static str] {
        &[
            "Description",
            "Author",
            "Views",
            "Likes",
            "Comments",
            "Shares",
            "Reposts",
            "Saves",
            "Feed Appearances",
            "Created At",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.description.clone(),
            self.author_unique_id.clone().unwrap_or_default(),
            self.max_play_count.to_string(),
            self.max_digg_count.to_string(),
            self.max_comment_count.to_string(),
            self.max_share_count.to_string(),
            self.max_repost_count.to_string(),
            self.max_collect_count.to_string(),
            self.appearances_in_feed.map(|n| n.to_string()).unwrap_or_default(),
            timestamp(&self.created_at),
        ]
    }
}

impl DisplayRow for ReportPost {
    fn display_row(&self) -> Vec<String> {
        let mut row = self.row();
        row[0] = truncate(&self.description, 20);
        for (cell, value) in row[2..8].iter_mut().zip([
            self.max_play_count,
            self.max_digg_count,
            self.max_comment_count,
            self.max_share_count,
            self.max_repost_count,
            self.max_collect_count,
        ]) {
            *cell = thousands(value);
        }
        row
    }
}

impl Tabular for Hashtag {
    const RESOURCE: &'static str = "hashtags";

    fn headers() -> &'static [&'static str] {
        &["ID", "Hashtag", "Active"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            format!("#{}", self.title),
            if self.active { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl DisplayRow for Hashtag {}

impl Tabular for Author {
    const RESOURCE: &'static str = "top_authors";

    fn headers() -> &'static [&'static str] {
        &["Nickname", "Unique ID", "Followers", "Likes Collected", "Likes Given", "Videos", "Verified"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.nickname.clone(),
            self.unique_id.clone(),
            self.max_follower_count.to_string(),
            self.max_heart_count.to_string(),
            self.max_digg_count.to_string(),
            self.max_video_count.to_string(),
            if self.verified { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl DisplayRow for Author {
    fn display_row(&self) -> Vec<String> {
        let mut row = self.row();
        row[2] = thousands(self.max_follower_count);
        row[3] = thousands(self.max_heart_count);
        row[4] = thousands(self.max_digg_count);
        row[5] = thousands(self.max_video_count);
        row
    }
}
