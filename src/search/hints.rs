//! Candidate nonces tried before the linear sweep.
//!
//! The hint phase is a heuristic with no effect on correctness: every hint
//! window is also covered by some sweep window, so a strategy that returns
//! nothing only costs the hint phase.

use super::*;

pub const HINT_RADIUS: u32 = 500;

const ANCHORS: u64 = 16;
const KEY: u64 = 0x9e37_79b9_7f4a_7c15;
const MIX: u64 = 0x2545_f491_4f6c_dd1d;

/// Residue classes the default strategy snaps candidates into, as
/// `(modulus, residue)`.
const RESIDUE_CLASSES: [(u64, u64); 2] = [(9, 0), (22, 19)];

pub trait HintStrategy: Send + Sync {
    /// Nonces to scan around, in the order they should be tried.
    fn candidates(&self, template: &HeaderTemplate) -> Vec<u32>;

    fn windows(&self, template: &HeaderTemplate) -> Vec<RangeInclusive<u32>> {
        dedup(self.candidates(template))
            .into_iter()
            .map(|nonce| nonce.saturating_sub(HINT_RADIUS)..=nonce.saturating_add(HINT_RADIUS))
            .collect()
    }
}

/// Evenly spaced anchors plus two offsets derived from the previous block
/// hash and the job time, each snapped into every residue class.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResidueHints;

impl ResidueHints {
    fn snapped(value: u32) -> impl Iterator<Item = u32> {
        RESIDUE_CLASSES
            .iter()
            .map(move |(modulus, residue)| snap(value, *modulus, *residue))
    }
}

impl HintStrategy for ResidueHints {
    fn candidates(&self, template: &HeaderTemplate) -> Vec<u32> {
        let mut candidates = Vec::new();

        for anchor in 0..ANCHORS {
            let anchor = ((anchor << 32) / ANCHORS) as u32;
            candidates.extend(Self::snapped(anchor));
        }

        let prev_hash = template.prev_hash();
        let seed = LittleEndian::read_u64(&prev_hash[..8]);
        candidates.extend(Self::snapped(mix(seed)));

        candidates.extend(Self::snapped(mix(u64::from(template.time()))));

        candidates
    }
}

fn mix(seed: u64) -> u32 {
    ((seed ^ KEY).wrapping_mul(MIX) >> 32) as u32
}

/// Largest value not above `value` that is `residue` modulo `modulus`, or the
/// residue itself when there is none.
fn snap(value: u32, modulus: u64, residue: u64) -> u32 {
    let value = u64::from(value);
    let mut snapped = value - value % modulus + residue;

    if snapped > value && snapped >= modulus {
        snapped -= modulus;
    }

    snapped as u32
}

fn dedup(candidates: Vec<u32>) -> Vec<u32> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(*candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn template() -> HeaderTemplate {
        HeaderTemplate::new(0x2000_0000, [0x5a; 32], [0x11; 32], 1_700_000_000, 0x1f7f_ffff)
    }

    #[test]
    fn snapping() {
        assert_eq!(snap(0, 9, 0), 0);
        assert_eq!(snap(17, 9, 0), 9);
        assert_eq!(snap(18, 9, 0), 18);
        assert_eq!(snap(0, 22, 19), 19);
        assert_eq!(snap(40, 22, 19), 19);
        assert_eq!(snap(41, 22, 19), 41);
        assert_eq!(snap(u32::MAX, 9, 0) % 9, 0);
        assert_eq!(snap(u32::MAX, 22, 19) % 22, 19);
    }

    #[test]
    fn candidates_fall_in_residue_classes() {
        let candidates = ResidueHints.candidates(&template());

        assert_eq!(candidates.len(), (ANCHORS as usize + 2) * 2);

        for pair in candidates.chunks(2) {
            assert_eq!(pair[0] % 9, 0);
            assert_eq!(pair[1] % 22, 19);
        }
    }

    #[test]
    fn anchors_span_the_nonce_space() {
        let candidates = ResidueHints.candidates(&template());

        assert_eq!(candidates[0], 0);
        assert_eq!(candidates[1], 19);
        assert!(candidates[2] <= 1 << 28 && candidates[2] > (1 << 28) - 9);
        assert!(candidates[30] <= 15 << 28 && candidates[30] > (15 << 28) - 9);
    }

    #[test]
    fn candidates_depend_on_prev_hash_and_time() {
        let base = ResidueHints.candidates(&template());

        let other_prev =
            HeaderTemplate::new(0x2000_0000, [0xa5; 32], [0x11; 32], 1_700_000_000, 0x1f7f_ffff);
        let other_time =
            HeaderTemplate::new(0x2000_0000, [0x5a; 32], [0x11; 32], 1_700_000_001, 0x1f7f_ffff);

        let anchors = ANCHORS as usize * 2;

        assert_eq!(
            ResidueHints.candidates(&other_prev)[..anchors],
            base[..anchors]
        );
        assert_ne!(ResidueHints.candidates(&other_prev), base);
        assert_ne!(ResidueHints.candidates(&other_time), base);
        assert_eq!(ResidueHints.candidates(&template()), base);
    }

    #[test]
    fn windows_are_deduplicated_and_clamped() {
        struct Fixed;

        impl HintStrategy for Fixed {
            fn candidates(&self, _: &HeaderTemplate) -> Vec<u32> {
                vec![10, u32::MAX - 10, 10, 5000]
            }
        }

        assert_eq!(
            Fixed.windows(&template()),
            vec![0..=510, u32::MAX - 510..=u32::MAX, 4500..=5500]
        );
    }
}
