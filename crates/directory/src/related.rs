//! Related-store ranking: multi-signal relevance over a candidate pool.
//!
//! Scoring (weighted sum):
//!   category tier: primary↔primary 10, primary↔secondary 7, secondary↔secondary 5
//!   locality bonus: +5 when city AND state both match
//! Ties break on category-overlap count, then rating average, then rating count.

use serde::Serialize;

use crate::model::ListingRow;

const TIER_PRIMARY_PRIMARY: i32 = 10;
const TIER_PRIMARY_SECONDARY: i32 = 7;
const TIER_SECONDARY_SECONDARY: i32 = 5;
const SAME_LOCALITY_BONUS: i32 = 5;

/// A scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedListing {
    pub listing: ListingRow,
    pub score: i32,
    pub category_overlap: u32,
}

/// Rank `pool` against `source` and return the top `limit` listings.
///
/// The source listing itself is always excluded. When no candidate scores
/// above zero, a fallback ladder keeps the widget populated: same-state
/// featured listings, then any same-state listing, then any candidate at all
/// — so a non-empty pool always yields at least one result.
pub fn rank_related(source: &ListingRow, pool: &[ListingRow], limit: usize) -> Vec<RelatedListing> {
    let candidates: Vec<&ListingRow> = pool
        .iter()
        .filter(|c| c.tenant_id != source.tenant_id)
        .collect();

    let mut scored: Vec<RelatedListing> = candidates
        .iter()
        .map(|c| score_candidate(source, c))
        .filter(|r| r.score > 0)
        .collect();

    if scored.is_empty() {
        return fallback_ladder(source, &candidates, limit);
    }

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.category_overlap.cmp(&a.category_overlap))
            .then(
                b.listing
                    .rating_avg
                    .unwrap_or(0.0)
                    .partial_cmp(&a.listing.rating_avg.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(b.listing.rating_count.cmp(&a.listing.rating_count))
    });
    scored.truncate(limit);
    scored
}

fn score_candidate(source: &ListingRow, candidate: &ListingRow) -> RelatedListing {
    let mut tier = 0;
    let mut overlap = 0u32;

    let pairs = [
        (&source.primary_category, &candidate.primary_category, TIER_PRIMARY_PRIMARY),
        (&source.primary_category, &candidate.secondary_category, TIER_PRIMARY_SECONDARY),
        (&source.secondary_category, &candidate.primary_category, TIER_PRIMARY_SECONDARY),
        (&source.secondary_category, &candidate.secondary_category, TIER_SECONDARY_SECONDARY),
    ];
    for (a, b, pair_tier) in pairs {
        if let (Some(a), Some(b)) = (a, b) {
            if a == b {
                overlap += 1;
                tier = tier.max(pair_tier);
            }
        }
    }

    let mut score = tier;
    if same_locality(source, candidate) {
        score += SAME_LOCALITY_BONUS;
    }

    RelatedListing {
        listing: candidate.clone(),
        score,
        category_overlap: overlap,
    }
}

fn same_locality(a: &ListingRow, b: &ListingRow) -> bool {
    let eq = |x: &Option<String>, y: &Option<String>| match (x, y) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    };
    eq(&a.city, &b.city) && eq(&a.state, &b.state)
}

fn same_state(a: &ListingRow, b: &ListingRow) -> bool {
    match (&a.state, &b.state) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

fn fallback_ladder(
    source: &ListingRow,
    candidates: &[&ListingRow],
    limit: usize,
) -> Vec<RelatedListing> {
    let as_unscored = |rows: Vec<&&ListingRow>| -> Vec<RelatedListing> {
        rows.into_iter()
            .take(limit)
            .map(|c| RelatedListing {
                listing: (*c).clone(),
                score: 0,
                category_overlap: 0,
            })
            .collect()
    };

    let featured_same_state: Vec<&&ListingRow> = candidates
        .iter()
        .filter(|c| c.is_featured && same_state(source, c))
        .collect();
    if !featured_same_state.is_empty() {
        return as_unscored(featured_same_state);
    }

    let same_state_any: Vec<&&ListingRow> = candidates
        .iter()
        .filter(|c| same_state(source, c))
        .collect();
    if !same_state_any.is_empty() {
        return as_unscored(same_state_any);
    }

    as_unscored(candidates.iter().collect())
}
