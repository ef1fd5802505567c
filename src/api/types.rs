//! Typed response and request bodies for every backend endpoint.
//!
//! Shapes follow the backend's response models. Fields the backend fills with
//! defaults are `#[serde(default)]` here so a sparse record still decodes; a
//! body that is structurally wrong fails at the gateway with
//! `ClientError::Decode` instead of reaching a view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    /// JSON-encoded role list, e.g. `["user"]`
    pub roles: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HashtagRequest {
    pub hashtag: String,
}

/// `{"message": "..."}` acknowledgement returned by write endpoints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl MessageResponse {
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.status.as_deref())
            .unwrap_or("ok")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: String,
    #[serde(default = "unknown")]
    pub title: String,
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default = "unknown")]
    pub nickname: String,
    #[serde(default = "unknown")]
    pub signature: String,
    #[serde(default = "unknown")]
    pub unique_id: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, with = "timestamp::option")]
    pub last_collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_follower_count: i64,
    #[serde(default)]
    pub max_following_count: i64,
    #[serde(default)]
    pub max_digg_count: i64,
    #[serde(default)]
    pub max_heart_count: i64,
    #[serde(default)]
    pub max_video_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default = "unknown")]
    pub description: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub max_digg_count: i64,
    #[serde(default)]
    pub max_play_count: i64,
    #[serde(default)]
    pub max_share_count: i64,
    #[serde(default)]
    pub max_collect_count: i64,
}

/// Row of the top-posts report; `appearances_in_feed` is only set for feed reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPost {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub last_collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_unique_id: Option<String>,
    #[serde(default)]
    pub is_ad: bool,
    #[serde(default)]
    pub max_collect_count: i64,
    #[serde(default)]
    pub max_comment_count: i64,
    #[serde(default)]
    pub max_digg_count: i64,
    #[serde(default)]
    pub max_play_count: i64,
    #[serde(default)]
    pub max_repost_count: i64,
    #[serde(default)]
    pub max_share_count: i64,
    #[serde(default)]
    pub appearances_in_feed: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub author_count: i64,
    pub post_count: i64,
    pub active_hashtags_count: i64,
    pub challenge_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub interval: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlatformGrowth {
    #[serde(default)]
    pub author_growth: Vec<GrowthPoint>,
    #[serde(default)]
    pub post_growth: Vec<GrowthPoint>,
    #[serde(default)]
    pub challenge_growth: Vec<GrowthPoint>,
}

impl PlatformGrowth {
    /// Sorted union of every interval label across the three series
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .author_growth
            .iter()
            .chain(&self.post_growth)
            .chain(&self.challenge_growth)
            .map(|p| p.interval.as_str())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

/// List endpoint envelope: one page of rows plus the server-side total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTrend {
    pub post_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub post_description: String,
    #[serde(with = "timestamp")]
    pub collected_at: DateTime<Utc>,
    pub current_views: i64,
    pub daily_change: i64,
    pub weekly_change: i64,
    pub monthly_change: i64,
    pub daily_growth_rate: f64,
    pub weekly_growth_rate: f64,
    pub monthly_growth_rate: f64,
    #[serde(default)]
    pub challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorTrend {
    pub author_id: String,
    #[serde(default)]
    pub author_nickname: String,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_followers: i64,
    #[serde(default)]
    pub current_hearts: i64,
    #[serde(default)]
    pub current_diggs: i64,
    #[serde(default)]
    pub current_videos: i64,
    #[serde(default)]
    pub daily_followers_change: i64,
    #[serde(default)]
    pub weekly_followers_change: i64,
    #[serde(default)]
    pub monthly_followers_change: i64,
    #[serde(default)]
    pub daily_followers_growth_rate: f64,
    #[serde(default)]
    pub weekly_followers_growth_rate: f64,
    #[serde(default)]
    pub monthly_followers_growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagTrend {
    pub hashtag_id: String,
    pub hashtag_title: String,
    #[serde(default)]
    pub daily_growth: f64,
    #[serde(default)]
    pub weekly_growth: f64,
    #[serde(default)]
    pub monthly_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedHashtagRule {
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub related_hashtags: Vec<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedHashtags {
    #[serde(default)]
    pub related_hashtag_rules: Vec<RelatedHashtagRule>,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub post_id: String,
    #[serde(default = "unknown")]
    pub description: String,
    pub similarity: f64,
    pub element_id: String,
    pub author: Author,
    pub post: Post,
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn yes() -> bool {
    true
}

/// Timestamps arrive either as RFC 3339 or as naive ISO strings (assumed UTC)
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn naive_and_rfc3339_timestamps_both_parse() {
        let naive = timestamp::parse("2024-03-01T10:20:30.123456").unwrap();
        let zoned = timestamp::parse("2024-03-01T10:20:30.123456+00:00").unwrap();
        assert_eq!(naive, zoned);
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn post_trend_decodes_backend_shape() {
        let trend: PostTrend = serde_json::from_value(json!({
            "post_id": "p1",
            "author_name": "ana",
            "post_description": "dance",
            "collected_at": "2024-03-01T10:00:00",
            "current_views": 1234567,
            "daily_change": 10,
            "weekly_change": 70,
            "monthly_change": 300,
            "daily_growth_rate": 1.5,
            "weekly_growth_rate": 12.25,
            "monthly_growth_rate": 80.0,
            "challenges": ["fyp", "dance"]
        }))
        .unwrap();

        assert_eq!(trend.current_views, 1_234_567);
        assert_eq!(trend.challenges, vec!["fyp", "dance"]);
    }

    #[test]
    fn sparse_author_gets_defaults() {
        let author: Author = serde_json::from_value(json!({ "id": "a1" })).unwrap();
        assert_eq!(author.nickname, "Unknown");
        assert_eq!(author.max_follower_count, 0);
        assert_eq!(author.last_collected_at, None);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let result = serde_json::from_value::<Stats>(json!({ "author_count": "many" }));
        assert!(result.is_err());
    }

    #[test]
    fn growth_labels_are_a_sorted_union() {
        let growth = PlatformGrowth {
            author_growth: vec![GrowthPoint { interval: "2024-02".into(), count: 1 }],
            post_growth: vec![
                GrowthPoint { interval: "2024-01".into(), count: 3 },
                GrowthPoint { interval: "2024-02".into(), count: 5 },
            ],
            challenge_growth: vec![],
        };
        assert_eq!(growth.labels(), vec!["2024-01", "2024-02"]);
    }
}
