//! Emotion blending table.
//!
//! The table is stored once per unordered pair: both arguments are sorted
//! before the lookup, so `blend(a, b) == blend(b, a)` for every pair.

use crate::config::BlendFallback;
use kinship_data::Emotion;

/// Result of mixing `target`'s current emotion with an `incoming` one, or
/// `None` when the pair has no table entry.
pub fn blend(target: Emotion, incoming: Emotion) -> Option<Emotion> {
    use Emotion::*;

    if target == incoming {
        return Some(target);
    }
    if target.is_neutral() {
        return Some(incoming);
    }
    if incoming.is_neutral() {
        return Some(target);
    }

    let (a, b) = if target <= incoming {
        (target, incoming)
    } else {
        (incoming, target)
    };
    match (a, b) {
        (Happy, Excited) => Some(Excited),
        (Happy, Calm) => Some(Confident),
        (Happy, Sad) => Some(Calm),
        (Happy, Curious) => Some(Playful),
        (Happy, Lonely) => Some(Calm),
        (Sad, Angry) => Some(Lonely),
        (Sad, Fearful) => Some(Anxious),
        (Angry, Fearful) => Some(Anxious),
        (Angry, Excited) => Some(Angry),
        (Fearful, Excited) => Some(Anxious),
        (Fearful, Calm) => Some(Calm),
        (Fearful, Confident) => Some(Calm),
        (Excited, Playful) => Some(Playful),
        _ => None,
    }
}

/// [`blend`] made total by `fallback`. `None` means the target keeps its
/// current state.
pub fn resolve_blend(target: Emotion, incoming: Emotion, fallback: BlendFallback) -> Option<Emotion> {
    blend(target, incoming).or(match fallback {
        BlendFallback::KeepTarget => None,
        BlendFallback::AdoptSource => Some(incoming),
    })
}
