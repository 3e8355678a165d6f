use flatgen_error::{FlatgenResult, flatgen_bail, flatgen_err};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Draws rejected by the exclusion set before falling back to an exhaustive scan.
const MAX_REJECTED_DRAWS: usize = 64;

/// Picks a uniformly random word that is not in `excluded`.
///
/// Rejection sampling keeps the common case cheap. The scan behind it guarantees an answer
/// (or an error) even when nearly every word is excluded.
pub fn pick<'w, R: Rng + ?Sized>(
    rng: &mut R,
    words: &'w [String],
    excluded: &[&str],
) -> FlatgenResult<&'w str> {
    if words.is_empty() {
        flatgen_bail!("cannot pick a word from an empty word list");
    }

    for _ in 0..MAX_REJECTED_DRAWS {
        let word = words
            .choose(rng)
            .ok_or_else(|| flatgen_err!("cannot pick a word from an empty word list"))?;
        if !excluded.contains(&word.as_str()) {
            return Ok(word.as_str());
        }
    }

    let remaining: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| !excluded.contains(word))
        .collect();
    remaining.choose(rng).copied().ok_or_else(|| {
        flatgen_err!(
            "all {} words are excluded by a set of {}",
            words.len(),
            excluded.len()
        )
    })
}
