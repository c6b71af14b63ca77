//! Human-readable token provider.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Plain lowercase ASCII nouns, safe to embed in JSON strings and object keys
/// without escaping.
pub(crate) const NOUNS: &[&str] = &[
    "account", "acorn", "actor", "airport", "alarm", "album", "anchor", "angle", "apple",
    "arch", "arrow", "badge", "bag", "ball", "band", "bank", "barn", "basket", "beach", "beam",
    "bell", "bench", "berry", "bird", "blade", "board", "boat", "bolt", "bone", "book", "boot",
    "bottle", "bowl", "box", "branch", "bread", "brick", "bridge", "brush", "bucket", "cabin",
    "cable", "cake", "camera", "camp", "canal", "candle", "canvas", "car", "card", "cart",
    "castle", "cave", "chain", "chair", "chalk", "channel", "chart", "cherry", "circle", "city",
    "cliff", "clock", "cloud", "coast", "coin", "comet", "copper", "coral", "cord", "corner",
    "cotton", "crane", "creek", "crown", "cup", "curtain", "desk", "diamond", "dock", "door",
    "dragon", "drum", "eagle", "engine", "falcon", "feather", "fence", "field", "flag", "flame",
    "flower", "forest", "fork", "fountain", "frame", "garden", "gate", "glacier", "glass",
    "glove", "grain", "guitar", "hammer", "harbor", "hat", "hill", "horizon", "island", "jacket",
    "jewel", "kettle", "key", "kite", "ladder", "lake", "lamp", "lantern", "leaf", "lemon",
    "lens", "library", "lighthouse", "lily", "lion", "lock", "magnet", "maple", "marble",
    "meadow", "mirror", "moon", "mountain", "needle", "nest", "ocean", "orbit", "orchard",
    "owl", "paddle", "palace", "panel", "paper", "parcel", "pearl", "pebble", "pencil",
    "piano", "pillow", "pine", "planet", "plate", "pond", "prism", "pulse", "quartz", "rabbit",
    "radar", "rail", "rainbow", "raven", "ribbon", "river", "road", "rocket", "roof", "rope",
    "saddle", "sail", "scale", "shadow", "shell", "shield", "signal", "silver", "sketch",
    "socket", "spark", "sphere", "spring", "square", "stable", "star", "stone", "storm",
    "stream", "summit", "sun", "table", "tablet", "temple", "thunder", "tiger", "timber",
    "token", "tower", "trail", "tree", "tunnel", "valley", "vessel", "violin", "wagon",
    "wallet", "water", "wave", "whale", "wheel", "window", "wire", "wolf", "yard", "zebra",
];

/// Pick a random noun.
pub fn noun<R: Rng>(rng: &mut R) -> &'static str {
    // NOUNS is a non-empty constant
    NOUNS.choose(rng).copied().unwrap_or("token")
}

/// Write `count` random nouns separated by `joiner`.
pub fn write_nouns<R: Rng>(rng: &mut R, count: usize, joiner: &[u8], buf: &mut Vec<u8>) {
    for i in 0..count {
        if i > 0 {
            buf.extend_from_slice(joiner);
        }
        buf.extend_from_slice(noun(rng).as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_nouns_are_plain_ascii() {
        for noun in NOUNS {
            assert!(!noun.is_empty());
            assert!(noun.bytes().all(|b| b.is_ascii_lowercase()), "{noun}");
        }
    }

    #[test]
    fn test_noun_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);

        assert_eq!(noun(&mut rng1), noun(&mut rng2));
    }

    #[test]
    fn test_write_nouns() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut buf = Vec::new();
        write_nouns(&mut rng, 3, b"-", &mut buf);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.split('-').count(), 3);
    }

    #[test]
    fn test_write_zero_nouns() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut buf = Vec::new();
        write_nouns(&mut rng, 0, b" ", &mut buf);
        assert!(buf.is_empty());
    }
}
