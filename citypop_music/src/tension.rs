// Tension arc: the per-step harmonic density curve.
//
// A single asymmetric hump peaking at the golden-ratio position through the
// piece, so the music builds toward roughly 62% of the way in and releases
// afterward. The arc multiplies each progression template's complexity to
// give the per-step tension count in the voicing builder.

use rand::Rng;

/// Golden ratio, used to place the tension peak.
const PHI: f64 = 1.618_033_988_749_895;

/// Arc values are clamped into this band.
const ARC_MIN: f64 = 0.3;
const ARC_MAX: f64 = 0.9;

/// Generate a tension arc of `len` values in [0.3, 0.9].
///
/// The peak sits at `floor(len / φ)`; each step's value falls off linearly
/// with distance from the peak, plus uniform noise in [-0.1, 0.1].
pub fn tension_arc(len: usize, rng: &mut impl Rng) -> Vec<f64> {
    let peak = (len as f64 / PHI).floor();
    let half = len as f64 / 2.0;

    (0..len)
        .map(|i| {
            let distance = (i as f64 - peak).abs();
            let shape = 0.5 + 0.4 * (1.0 - distance / half);
            let noise = rng.random_range(-0.1..0.1);
            (shape + noise).clamp(ARC_MIN, ARC_MAX)
        })
        .collect()
}
