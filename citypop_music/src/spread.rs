// Register spreader: octave placement and spacing of a candidate pitch set.
//
// Takes the unordered pitches from the voicing builder and arranges them
// into a playable register: minimum spacing between neighbors, optional
// octave doubling, era- and artist-specific range shaping, a global range
// clamp, and position-based tension growth late in the progression.
//
// The spacing pass and the range clamp are each single linear passes, not
// fixed-point iterations. Later steps can reintroduce out-of-range or
// under-spaced notes; that looseness is part of the generator's sound and
// is kept as-is.

use rand::Rng;

use crate::catalog::{Era, Style};
use crate::voicing::VoicingContext;

/// Lowest pitch the spreader aims for (C2).
const RANGE_LOW: i32 = 36;
/// Highest pitch the spreader aims for (C6).
const RANGE_HIGH: i32 = 84;

/// Spread a candidate pitch set into an ascending final sequence.
pub fn spread_voicing(
    mut pitches: Vec<i32>,
    position: usize,
    ctx: &VoicingContext,
    rng: &mut impl Rng,
) -> Vec<i32> {
    let min_spacing = if ctx.style == Style::Ballad { 3 } else { 2 };
    let max_spacing = if ctx.style == Style::Fusion { 24 } else { 12 };

    pitches.sort_unstable();

    enforce_min_spacing(&mut pitches, min_spacing);

    // Octave doubling: always for fusion, otherwise 40% of chords.
    if !pitches.is_empty() && (ctx.style == Style::Fusion || rng.random_bool(0.4)) {
        let idx = rng.random_range(0..pitches.len());
        pitches.push(pitches[idx] + 12);
    }

    // Era shaping relative to the lowest note.
    match ctx.era {
        Some(Era::Mid80s) => pull_down_beyond(&mut pitches, max_spacing),
        Some(Era::Seventies) => pull_down_beyond(&mut pitches, max_spacing / 2),
        _ => {}
    }

    // Artist shaping.
    match ctx.artist.as_deref() {
        Some("Tatsuro Yamashita") => {
            if rng.random_bool(0.5) {
                if let Some(&max) = pitches.iter().max() {
                    pitches.push(max + 12);
                }
            }
        }
        Some("Mariya Takeuchi") => pull_down_beyond(&mut pitches, max_spacing * 2 / 3),
        _ => {}
    }

    clamp_register(&mut pitches);

    // Tension growth: later steps occasionally sprout an extra top note.
    if position > 0 && rng.random_bool(position as f64 / 8.0) {
        if let Some(&max) = pitches.iter().max() {
            let add = if rng.random_bool(0.5) { 12 } else { 7 };
            pitches.push(max + add);
        }
    }

    pitches.sort_unstable();
    pitches
}

/// Single pass over adjacent pairs: raise the upper note an octave when the
/// gap is under `min_spacing`.
pub fn enforce_min_spacing(pitches: &mut [i32], min_spacing: i32) {
    for i in 1..pitches.len() {
        if pitches[i] - pitches[i - 1] < min_spacing {
            pitches[i] += 12;
        }
    }
}

/// Pull any pitch more than `threshold` above the lowest note down an octave.
fn pull_down_beyond(pitches: &mut [i32], threshold: i32) {
    if pitches.is_empty() {
        return;
    }
    let floor = pitches[0];
    for p in pitches.iter_mut() {
        if *p > floor + threshold {
            *p -= 12;
        }
    }
}

/// Single-pass global range clamp: raise below-range pitches an octave,
/// lower above-range pitches an octave. Idempotent on already-clamped
/// input since one octave always suffices to cross back into range from
/// within one octave of the boundary.
pub fn clamp_register(pitches: &mut [i32]) {
    for p in pitches.iter_mut() {
        if *p < RANGE_LOW {
            *p += 12;
        } else if *p > RANGE_HIGH {
            *p -= 12;
        }
    }
}
