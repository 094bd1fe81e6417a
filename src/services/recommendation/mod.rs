use crate::config::Config;
use crate::error::RecommendError;
use crate::models::*;
use crate::services::collaborative::collaborative_ids;
use crate::services::explore::{pick_explore, split_counts};
use crate::services::preference::{
    build_preference, onboarding_preference, rank_eligible, score_catalog,
};
use crate::store::{CatalogStore, ClickStore, ImpressionStore, InteractionStore, ProfileStore};
use crate::utils::pretty_genre;
use crate::utils::validation::{validate_click_request, validate_recommend_request};
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const COLLABORATIVE_REASON: &str = "Liked and bookmarked by users with similar taste";
const TRENDING_REASON: &str = "Trending now by views and popularity";
const GENERIC_CONTENT_REASON: &str = "Matched to your favorite genres";

pub struct RecommendationService {
    catalog: Arc<dyn CatalogStore>,
    interactions: Arc<dyn InteractionStore>,
    impressions: Arc<dyn ImpressionStore>,
    clicks: Arc<dyn ClickStore>,
    profiles: Arc<dyn ProfileStore>,
    config: Arc<Config>,
}

/// Ordered result ids plus the provenance sets used for attribution.
struct Slate {
    ids: Vec<Uuid>,
    preference: HashMap<String, f64>,
    exploit: HashSet<Uuid>,
    explore: HashSet<Uuid>,
    collaborative: HashSet<Uuid>,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        interactions: Arc<dyn InteractionStore>,
        impressions: Arc<dyn ImpressionStore>,
        clicks: Arc<dyn ClickStore>,
        profiles: Arc<dyn ProfileStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            catalog,
            interactions,
            impressions,
            clicks,
            profiles,
            config,
        }
    }

    /// Build a personalized, attributed, impression-logged recommendation
    /// slate of exactly `size` items (shorter only if the catalog runs out of
    /// non-disliked content).
    pub async fn recommend(
        &self,
        user_id: Uuid,
        size: usize,
    ) -> Result<Vec<RecommendedItem>, RecommendError> {
        validate_recommend_request(user_id, size, self.config.recommendation.max_size)?;

        let slate = self.assemble_slate(user_id, size).await?;
        let contents = self.resolve_ordered(&slate.ids).await?;
        let anchors = self.recent_positive_anchors(user_id).await?;

        let mut top_genres: Vec<(String, f64)> = slate
            .preference
            .iter()
            .map(|(g, w)| (g.clone(), *w))
            .collect();
        top_genres.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top_genres: Vec<String> = top_genres.into_iter().take(2).map(|(g, _)| g).collect();

        let now = Utc::now();
        let mut drafts: Vec<(ContentItem, String, RecommendSource, String)> =
            Vec::with_capacity(contents.len());

        for content in contents {
            let (source, explore_pick, reason) = if slate.exploit.contains(&content.id) {
                let reason =
                    content_based_reason(&content, &anchors, &top_genres, &slate.preference);
                (RecommendSource::ContentBased, false, reason)
            } else if slate.explore.contains(&content.id) {
                let reason =
                    content_based_reason(&content, &anchors, &top_genres, &slate.preference);
                (RecommendSource::ContentBased, true, reason)
            } else if slate.collaborative.contains(&content.id) {
                (
                    RecommendSource::Collaborative,
                    false,
                    COLLABORATIVE_REASON.to_string(),
                )
            } else {
                (
                    RecommendSource::TrendingFallback,
                    false,
                    TRENDING_REASON.to_string(),
                )
            };

            let tag = source.log_tag(explore_pick);
            drafts.push((content, reason, source, tag));
        }

        let since = now - Duration::hours(self.config.impression.dedupe_window_hours);
        let candidates: Vec<ImpressionLog> = drafts
            .iter()
            .map(|(content, reason, _, tag)| {
                ImpressionLog::new(user_id, content.id, tag.clone(), reason.clone(), now)
            })
            .collect();

        let aligned = self
            .impressions
            .dedupe_batch(user_id, candidates, since)
            .await?;

        // Zip truncates to the shorter side: a draft without a log id is
        // dropped rather than served unattributed.
        let items: Vec<RecommendedItem> = drafts
            .into_iter()
            .zip(aligned)
            .map(|((content, reason, source, _), log)| RecommendedItem {
                content,
                reason,
                source,
                impression_log_id: log.id,
            })
            .collect();

        info!(%user_id, requested = size, served = items.len(), "served recommendations");
        Ok(items)
    }

    /// Attribute a click to an impression this user was actually shown.
    /// Repeat clicks on one impression are all recorded.
    pub async fn record_click(
        &self,
        user_id: Uuid,
        impression_log_id: Uuid,
    ) -> Result<ClickLog, RecommendError> {
        validate_click_request(user_id, impression_log_id)?;

        let log = self
            .impressions
            .find_by_id(impression_log_id)
            .await?
            .ok_or_else(|| {
                RecommendError::not_found(format!("impression log {}", impression_log_id))
            })?;

        if log.user_id != user_id {
            return Err(RecommendError::forbidden(
                "impression log belongs to a different user",
            ));
        }

        let click = self
            .clicks
            .insert(ClickLog::new(log.id, user_id, log.content_id))
            .await?;

        debug!(%user_id, impression = %log.id, content = %log.content_id, "recorded click");
        Ok(click)
    }

    async fn assemble_slate(&self, user_id: Uuid, size: usize) -> Result<Slate, RecommendError> {
        let cfg = &self.config.recommendation;

        let exclude: HashSet<Uuid> = self
            .interactions
            .content_ids_by_user_and_types(user_id, &InteractionType::EXCLUDE)
            .await?
            .into_iter()
            .collect();
        let disliked: HashSet<Uuid> = self
            .interactions
            .content_ids_by_user_and_types(user_id, &[InteractionType::Dislike])
            .await?
            .into_iter()
            .collect();
        let viewed: HashSet<Uuid> = self
            .interactions
            .content_ids_by_user_and_types(user_id, &[InteractionType::View])
            .await?
            .into_iter()
            .collect();
        let positive_ids = self
            .interactions
            .content_ids_by_user_and_types(user_id, &InteractionType::POSITIVE)
            .await?;

        let catalog = self.catalog.list_all().await?;

        if positive_ids.is_empty() {
            let onboarding_csv = self
                .profiles
                .preferred_genres(user_id)
                .await?
                .unwrap_or_default();
            let pref = onboarding_preference(&onboarding_csv, cfg.onboarding_genre_weight);

            if pref.is_empty() {
                // Nothing to derive a preference from: trending fallback.
                debug!(%user_id, "cold start, serving trending fallback");
                let mut trending = catalog.clone();
                trending.sort_by(|a, b| b.view_count.cmp(&a.view_count));
                let ids: Vec<Uuid> = trending
                    .iter()
                    .filter(|c| !disliked.contains(&c.id))
                    .take(size)
                    .map(|c| c.id)
                    .collect();

                return Ok(Slate {
                    ids,
                    preference: HashMap::new(),
                    exploit: HashSet::new(),
                    explore: HashSet::new(),
                    collaborative: HashSet::new(),
                });
            }

            // Onboarding genres carry the whole slate; collaborative needs
            // positive history and is skipped.
            return self
                .content_slate(
                    user_id, size, size, &catalog, pref, &exclude, &disliked, &viewed, None,
                )
                .await;
        }

        let recent_clicks = self
            .clicks
            .recent_clicked_content_ids(user_id, cfg.recent_click_limit)
            .await?;

        let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|c| (c.id, c)).collect();
        let pref = build_preference(&positive_ids, &recent_clicks, &by_id, cfg.click_genre_weight);

        let size_a = ((size as f64 * cfg.content_slot_ratio).round() as usize).max(1);

        self.content_slate(
            user_id,
            size,
            size_a,
            &catalog,
            pref,
            &exclude,
            &disliked,
            &viewed,
            Some(positive_ids.as_slice()),
        )
        .await
    }

    /// Content-based slate for `size_a` slots, optionally topped up with
    /// collaborative candidates, then backfilled to `size` from trending.
    #[allow(clippy::too_many_arguments)]
    async fn content_slate(
        &self,
        user_id: Uuid,
        size: usize,
        size_a: usize,
        catalog: &[ContentItem],
        pref: HashMap<String, f64>,
        exclude: &HashSet<Uuid>,
        disliked: &HashSet<Uuid>,
        viewed: &HashSet<Uuid>,
        positive_ids: Option<&[Uuid]>,
    ) -> Result<Slate, RecommendError> {
        let cfg = &self.config.recommendation;
        let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|c| (c.id, c)).collect();

        let scores = score_catalog(catalog, &pref, exclude, disliked, viewed, cfg);
        let ranked = rank_eligible(catalog, &scores);

        let (exploit_count, explore_count) = split_counts(size_a, cfg.explore_ratio);
        let exploit: Vec<Uuid> = ranked.iter().take(exploit_count).copied().collect();
        let explore = pick_explore(
            user_id,
            &ranked,
            &scores,
            &pref,
            viewed,
            &exploit,
            explore_count,
            &by_id,
            cfg.explore_pool_mult,
            cfg.seed_window_hours,
            Utc::now().timestamp(),
        );

        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut merged: Vec<Uuid> = Vec::with_capacity(size);
        for id in exploit.iter().chain(explore.iter()) {
            if seen.insert(*id) {
                merged.push(*id);
            }
        }

        let collaborative = match positive_ids {
            Some(positive) => {
                let size_b = (size.saturating_sub(merged.len())).max(1);
                collaborative_ids(
                    self.interactions.as_ref(),
                    user_id,
                    positive,
                    exclude,
                    disliked,
                    size_b,
                    &by_id,
                )
                .await?
            }
            None => Vec::new(),
        };
        for id in &collaborative {
            if seen.insert(*id) {
                merged.push(*id);
            }
        }

        if merged.len() < size {
            let mut trending = catalog.to_vec();
            trending.sort_by(|a, b| b.view_count.cmp(&a.view_count));

            // Pass 1 honors the exclude set; pass 2 relaxes it and only keeps
            // dislikes out, so the response can always fill from the catalog.
            backfill(&mut merged, &mut seen, &trending, size, |c| {
                !exclude.contains(&c.id) && !disliked.contains(&c.id)
            });
            backfill(&mut merged, &mut seen, &trending, size, |c| {
                !disliked.contains(&c.id)
            });
        }

        merged.truncate(size);

        debug!(
            %user_id,
            exploit = exploit.len(),
            explore = explore.len(),
            collaborative = collaborative.len(),
            total = merged.len(),
            "assembled slate"
        );

        Ok(Slate {
            ids: merged,
            preference: pref,
            exploit: exploit.into_iter().collect(),
            explore: explore.into_iter().collect(),
            collaborative: collaborative.into_iter().collect(),
        })
    }

    /// Fetch contents for ids, preserving id order; unknown ids are dropped.
    async fn resolve_ordered(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>, RecommendError> {
        let fetched = self.catalog.list_by_ids(ids).await?;
        let mut map: HashMap<Uuid, ContentItem> =
            fetched.into_iter().map(|c| (c.id, c)).collect();
        Ok(ids.iter().filter_map(|id| map.remove(id)).collect())
    }

    async fn recent_positive_anchors(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ContentItem>, RecommendError> {
        let ids = self
            .interactions
            .recent_content_ids_by_user_and_types(
                user_id,
                &InteractionType::POSITIVE,
                self.config.recommendation.anchor_limit,
            )
            .await?;
        self.resolve_ordered(&ids).await
    }
}

fn backfill<F>(
    merged: &mut Vec<Uuid>,
    seen: &mut HashSet<Uuid>,
    trending: &[ContentItem],
    size: usize,
    keep: F,
) where
    F: Fn(&ContentItem) -> bool,
{
    if merged.len() >= size {
        return;
    }
    for content in trending {
        if !keep(content) {
            continue;
        }
        if seen.insert(content.id) {
            merged.push(content.id);
            if merged.len() >= size {
                break;
            }
        }
    }
}

/// Human-readable justification for a content-based pick. Prefers the user's
/// top genres that the item actually carries; falls back to the item's own
/// genres ranked by affinity. When a recent positive anchor overlaps in
/// genre, the reason names it. Descriptive only.
fn content_based_reason(
    content: &ContentItem,
    anchors: &[ContentItem],
    top_genres: &[String],
    pref: &HashMap<String, f64>,
) -> String {
    let rec_genres = content.genre_list();
    if rec_genres.is_empty() {
        return GENERIC_CONTENT_REASON.to_string();
    }

    let mut matched: Vec<String> = top_genres
        .iter()
        .filter(|g| rec_genres.contains(g))
        .take(2)
        .cloned()
        .collect();

    if matched.is_empty() {
        let mut own = rec_genres.clone();
        own.sort_by(|a, b| {
            let wa = pref.get(a).copied().unwrap_or(0.0);
            let wb = pref.get(b).copied().unwrap_or(0.0);
            wb.partial_cmp(&wa).unwrap_or(std::cmp::Ordering::Equal)
        });
        matched = own.into_iter().take(2).collect();
    }

    let genre_text = matched
        .iter()
        .map(|g| pretty_genre(g))
        .collect::<Vec<_>>()
        .join(", ");

    if let Some(anchor) = best_anchor(anchors, &rec_genres) {
        if !anchor.title.trim().is_empty() {
            return format!(
                "More {} like '{}' you recently liked",
                genre_text, anchor.title
            );
        }
    }

    format!("Recommended because you enjoy {}", genre_text)
}

/// The anchor with the largest genre overlap; None when nothing overlaps.
fn best_anchor<'a>(anchors: &'a [ContentItem], rec_genres: &[String]) -> Option<&'a ContentItem> {
    let mut best = None;
    let mut best_overlap = 0;

    for anchor in anchors {
        let overlap = anchor
            .genre_list()
            .iter()
            .filter(|g| rec_genres.contains(*g))
            .count();
        if overlap > best_overlap {
            best_overlap = overlap;
            best = Some(anchor);
        }
    }

    best
}
