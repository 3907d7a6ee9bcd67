//! 影片排序：純函式，不做任何網路呼叫。
//!
//! 分數公式（所有權重皆可設定）：
//!
//! ```text
//! score = view_weight    * log10(1 + views)
//!       + like_weight    * log10(1 + likes)
//!       + recency_weight * 0.5 ^ (age_days / recency_half_life_days)
//! ```
//!
//! 三項皆對觀看數、按讚數與新舊程度單調遞增；未來日期視為 0 天。
//! 同分時依觀看數（多者優先）、發佈時間（早者優先）、最後以 video_id 決定。

use crate::domain::model::Video;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub view_weight: f64,
    pub like_weight: f64,
    pub recency_weight: f64,
    pub recency_half_life_days: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            view_weight: 1.0,
            like_weight: 2.0,
            recency_weight: 1.0,
            recency_half_life_days: 365.0,
        }
    }
}

pub fn age_in_days(published: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - published).num_seconds().max(0);
    seconds as f64 / 86_400.0
}

pub fn recency_factor(published: DateTime<Utc>, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    if half_life_days <= 0.0 {
        return 0.0;
    }
    0.5_f64.powf(age_in_days(published, now) / half_life_days)
}

pub fn score_video(video: &Video, weights: &RankingWeights, now: DateTime<Utc>) -> f64 {
    let views = (1.0 + video.view_count as f64).log10();
    let likes = (1.0 + video.like_count as f64).log10();
    let recency = recency_factor(video.publish_date, now, weights.recency_half_life_days);

    weights.view_weight * views + weights.like_weight * likes + weights.recency_weight * recency
}

fn compare_ranked(a: &Video, b: &Video) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.view_count.cmp(&a.view_count))
        .then_with(|| a.publish_date.cmp(&b.publish_date))
        .then_with(|| a.video_id.cmp(&b.video_id))
}

/// 去重、計分、排序後取前 `limit` 部影片
pub fn rank_candidates(
    candidates: Vec<Video>,
    weights: &RankingWeights,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Video> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<Video> = candidates
        .into_iter()
        .filter(|video| seen.insert(video.video_id.clone()))
        .map(|mut video| {
            video.score = score_video(&video, weights, now);
            video
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn video(id: &str, views: u64, likes: u64, days_old: i64) -> Video {
        Video {
            video_id: id.to_string(),
            video_title: format!("Video {}", id),
            video_link: format!("https://www.youtube.com/watch?v={}", id),
            channel_name: "Channel".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            publish_date: now() - Duration::days(days_old),
            view_count: views,
            like_count: likes,
            score: 0.0,
            search_query: "query".to_string(),
        }
    }

    #[test]
    fn test_rank_orders_by_score_and_limits() {
        let candidates = vec![
            video("low", 100, 1, 30),
            video("high", 1_000_000, 50_000, 30),
            video("mid", 10_000, 500, 30),
            video("tiny", 10, 0, 30),
        ];

        let ranked = rank_candidates(candidates, &RankingWeights::default(), now(), 3);

        let ids: Vec<&str> = ranked.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_rank_removes_duplicates() {
        let candidates = vec![
            video("a", 500, 5, 10),
            video("a", 900_000, 5, 10),
            video("b", 400, 5, 10),
        ];

        let ranked = rank_candidates(candidates, &RankingWeights::default(), now(), 5);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].video_id, "a");
        assert_eq!(ranked[0].view_count, 500);
    }

    #[test]
    fn test_rank_ties_break_by_views_then_publish_date() {
        let weights = RankingWeights {
            view_weight: 0.0,
            like_weight: 0.0,
            recency_weight: 0.0,
            recency_half_life_days: 365.0,
        };
        let candidates = vec![
            video("newer", 100, 0, 5),
            video("more-views", 200, 0, 5),
            video("older", 100, 0, 50),
        ];

        let ranked = rank_candidates(candidates, &weights, now(), 3);

        let ids: Vec<&str> = ranked.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["more-views", "older", "newer"]);
    }

    #[test]
    fn test_recency_favors_newer_videos() {
        let fresh = video("fresh", 1_000, 10, 1);
        let stale = video("stale", 1_000, 10, 2_000);
        let weights = RankingWeights::default();

        assert!(score_video(&fresh, &weights, now()) > score_video(&stale, &weights, now()));
    }

    #[test]
    fn test_future_publish_date_counts_as_today() {
        let published = now() + Duration::days(3);
        assert_eq!(age_in_days(published, now()), 0.0);
        assert_eq!(recency_factor(published, now(), 365.0), 1.0);
    }

    #[test]
    fn test_empty_candidates() {
        let ranked = rank_candidates(Vec::new(), &RankingWeights::default(), now(), 3);
        assert!(ranked.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_video() -> impl Strategy<Value = Video> {
            ("[a-z]{1,6}", 0u64..10_000_000, 0u64..100_000, 0i64..3_650).prop_map(
                |(id, views, likes, days)| video(&id, views, likes, days),
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Property: ranking the same candidates twice gives the same result
            #[test]
            fn prop_rank_deterministic(
                candidates in proptest::collection::vec(arb_video(), 0..20),
                limit in 0usize..6
            ) {
                let weights = RankingWeights::default();
                let first = rank_candidates(candidates.clone(), &weights, now(), limit);
                let second = rank_candidates(candidates, &weights, now(), limit);

                prop_assert!(first.len() <= limit);
                prop_assert_eq!(first, second);
            }

            /// Property: output ids are unique and sorted by descending score
            #[test]
            fn prop_rank_unique_and_sorted(
                candidates in proptest::collection::vec(arb_video(), 0..20)
            ) {
                let ranked = rank_candidates(candidates, &RankingWeights::default(), now(), 10);

                let ids: HashSet<&str> = ranked.iter().map(|v| v.video_id.as_str()).collect();
                prop_assert_eq!(ids.len(), ranked.len());
                for pair in ranked.windows(2) {
                    prop_assert!(pair[0].score >= pair[1].score);
                }
            }

            /// Property: score never decreases when views grow
            #[test]
            fn prop_score_monotonic_in_views(
                views in 0u64..1_000_000_000,
                extra in 1u64..1_000_000,
                likes in 0u64..100_000,
                days in 0i64..3_650
            ) {
                let weights = RankingWeights::default();
                let base = video("x", views, likes, days);
                let more = video("x", views + extra, likes, days);
                prop_assert!(score_video(&more, &weights, now()) >= score_video(&base, &weights, now()));
            }

            /// Property: score never decreases when the video is newer
            #[test]
            fn prop_score_monotonic_in_recency(
                views in 0u64..1_000_000,
                older in 1i64..3_650,
                newer in 0i64..1
            ) {
                let weights = RankingWeights::default();
                let old = video("x", views, 0, older);
                let new = video("x", views, 0, newer);
                prop_assert!(score_video(&new, &weights, now()) >= score_video(&old, &weights, now()));
            }
        }
    }
}
