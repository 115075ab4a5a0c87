use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::images::ImageCandidate;

/// Number of candidates shown side by side on a voting page.
pub const DISPLAY_COUNT: usize = 4;

/// Plans a bias-correcting selection of `count` candidates.
///
/// Candidates are bucketed by impression count and buckets are consumed in
/// ascending count order, so under-shown images are always preferred. Within
/// a bucket an unbiased Fisher-Yates permutation breaks ties: among images
/// with equal impression count, every subset is equally likely and insertion
/// order carries no privilege. The full selection is shuffled once more at
/// the end so the display order carries no information about selection rank.
///
/// If fewer than `count` candidates exist, all of them are returned
/// (shuffled); this is a defined degraded result, not an error. The returned
/// list never contains duplicates and has length `min(count, available)`.
///
/// Pure over the supplied `Rng` so tests can drive it with a seeded generator.
pub fn plan_selection<R: Rng + ?Sized>(
    candidates: Vec<ImageCandidate>,
    count: usize,
    rng: &mut R,
) -> Vec<ImageCandidate> {
    let mut selected = if candidates.len() <= count {
        candidates
    } else {
        let mut buckets: BTreeMap<i64, Vec<ImageCandidate>> = BTreeMap::new();
        for candidate in candidates {
            buckets
                .entry(candidate.impression_count)
                .or_default()
                .push(candidate);
        }

        let mut picked = Vec::with_capacity(count);
        for (_, mut bucket) in buckets {
            bucket.shuffle(rng);
            let needed = count - picked.len();
            picked.extend(bucket.into_iter().take(needed));
            if picked.len() == count {
                break;
            }
        }
        picked
    };

    selected.shuffle(rng);
    selected
}
