//! Candidate scoring: a fixed weighted sum, no state, no learning.

use crate::igdb::client::IgdbCandidate;
use crate::normalization::title::normalize_for_comparison;

/// Normalized titles are identical.
const TITLE_EXACT: i32 = 70;

/// One normalized title contains the other.
const TITLE_PARTIAL: i32 = 35;

/// A candidate platform name contains the wanted canonical platform.
/// Outweighs TITLE_PARTIAL plus both small bonuses combined: a same-named
/// game on the wrong platform loses to one on the right platform.
const PLATFORM_MATCH: i32 = 80;

/// Main game (0), expanded game (8), remake (9), remaster (10), port (11).
/// Excludes DLC, mods, bundles and the rest of IGDB's category codes.
const MATCH_CATEGORIES: [i64; 5] = [0, 8, 9, 10, 11];
const CATEGORY_BONUS: i32 = 10;

/// Candidate carries cover art.
const COVER_BONUS: i32 = 10;

pub fn score_candidate(candidate: &IgdbCandidate, wanted_title: &str, wanted_platform: &str) -> i32 {
    let mut score = 0;

    let want = normalize_for_comparison(wanted_title);
    let got = normalize_for_comparison(candidate.name.as_deref().unwrap_or(""));
    if got == want {
        score += TITLE_EXACT;
    } else if got.contains(&want) || want.contains(&got) {
        score += TITLE_PARTIAL;
    }

    let want_platform = wanted_platform.to_lowercase();
    let on_platform = candidate.platforms.iter().flatten().any(|p| {
        p.name
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(&want_platform)
    });
    if on_platform {
        score += PLATFORM_MATCH;
    }

    if candidate
        .category
        .is_some_and(|c| MATCH_CATEGORIES.contains(&c))
    {
        score += CATEGORY_BONUS;
    }

    if candidate
        .cover
        .as_ref()
        .and_then(|c| c.image_id.as_deref())
        .is_some_and(|id| !id.is_empty())
    {
        score += COVER_BONUS;
    }

    score
}

/// Picks the first candidate achieving the maximum score. Ties keep the
/// first-seen candidate; result order is the only tie-break.
pub fn select_best<'a>(
    candidates: &'a [IgdbCandidate],
    wanted_title: &str,
    wanted_platform: &str,
) -> Option<&'a IgdbCandidate> {
    let mut best: Option<(&IgdbCandidate, i32)> = None;
    for candidate in candidates {
        let score = score_candidate(candidate, wanted_title, wanted_platform);
        if best.is_none() || best.is_some_and(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::igdb::client::{IgdbCover, IgdbPlatformRef};

    fn candidate(
        id: i64,
        name: &str,
        platforms: &[&str],
        category: Option<i64>,
        cover: Option<&str>,
    ) -> IgdbCandidate {
        IgdbCandidate {
            id,
            name: Some(name.to_string()),
            slug: None,
            category,
            platforms: Some(
                platforms
                    .iter()
                    .map(|p| IgdbPlatformRef {
                        name: Some(p.to_string()),
                    })
                    .collect(),
            ),
            cover: cover.map(|image_id| IgdbCover {
                image_id: Some(image_id.to_string()),
            }),
            first_release_date: None,
        }
    }

    #[test]
    fn score_is_deterministic() {
        let c = candidate(1, "Doom", &["PC (Microsoft Windows)"], Some(0), Some("x"));
        let first = score_candidate(&c, "Doom", "PC (Microsoft Windows)");
        assert_eq!(first, 70 + 80 + 10 + 10);
        assert_eq!(score_candidate(&c, "Doom", "PC (Microsoft Windows)"), first);
    }

    #[test]
    fn exact_title_scores_above_partial() {
        let exact = candidate(1, "Metroid", &[], None, None);
        let partial = candidate(2, "Metroid Prime", &[], None, None);
        assert_eq!(score_candidate(&exact, "Metroid", "Wii"), 70);
        assert_eq!(score_candidate(&partial, "Metroid", "Wii"), 35);
    }

    #[test]
    fn platform_match_outweighs_exact_title_with_bonuses() {
        // Exact title, category and cover, but wrong platform: 70 + 10 + 10.
        let wrong_platform = candidate(
            1,
            "Shadowgate",
            &["PC (Microsoft Windows)"],
            Some(0),
            Some("img"),
        );
        // Partial title on the right platform: 35 + 80.
        let right_platform = candidate(
            2,
            "Shadowgate Classic",
            &["Nintendo Entertainment System"],
            None,
            None,
        );
        let wanted = "Nintendo Entertainment System";
        assert_eq!(score_candidate(&wrong_platform, "Shadowgate", wanted), 90);
        assert_eq!(score_candidate(&right_platform, "Shadowgate", wanted), 115);

        // The ordering is load-bearing: the wrong-platform exact match must
        // lose the selection.
        let pool = vec![wrong_platform, right_platform];
        assert_eq!(select_best(&pool, "Shadowgate", wanted).unwrap().id, 2);
    }

    #[test]
    fn category_allow_set_is_exact() {
        let main = candidate(1, "X", &[], Some(0), None);
        let port = candidate(2, "X", &[], Some(11), None);
        let dlc = candidate(3, "X", &[], Some(1), None);
        let unknown = candidate(4, "X", &[], None, None);
        assert_eq!(score_candidate(&main, "X", "NES"), 80);
        assert_eq!(score_candidate(&port, "X", "NES"), 80);
        assert_eq!(score_candidate(&dlc, "X", "NES"), 70);
        assert_eq!(score_candidate(&unknown, "X", "NES"), 70);
    }

    #[test]
    fn ties_keep_the_first_seen_candidate() {
        let a = candidate(10, "Tetris", &["Game Boy"], None, None);
        let b = candidate(20, "Tetris", &["Game Boy"], None, None);
        let pool = vec![a, b];
        assert_eq!(select_best(&pool, "Tetris", "Game Boy").unwrap().id, 10);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert!(select_best(&[], "Tetris", "Game Boy").is_none());
    }

    #[test]
    fn empty_cover_id_earns_no_bonus() {
        let c = IgdbCandidate {
            id: 1,
            name: Some("X".into()),
            slug: None,
            category: None,
            platforms: None,
            cover: Some(IgdbCover {
                image_id: Some(String::new()),
            }),
            first_release_date: None,
        };
        assert_eq!(score_candidate(&c, "X", "NES"), 70);
    }
}
