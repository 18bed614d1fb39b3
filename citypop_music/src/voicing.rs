// Voicing builder: expand a chord root into a concrete pitch set.
//
// Starting from a template's base intervals, the builder layers on tensions
// according to the step's complexity and the era's density, applies artist
// signature colors, and anchors the chord with a bass note an octave or two
// below the root. The raw set then goes through the register spreader for
// final octave placement.
//
// Pitches are i32 throughout construction; clamping to the MIDI range
// happens at emission in the composition driver.

use rand::Rng;

use crate::catalog::{Era, Style, VoicingTemplate};
use crate::spread::spread_voicing;

/// Era, style, and artist influence shared by the builder and spreader.
#[derive(Debug, Clone)]
pub struct VoicingContext {
    pub era: Option<Era>,
    pub style: Style,
    pub artist: Option<String>,
}

/// Build the pitch set for one chord and spread it into register.
///
/// `complexity` in [0, 1] scales how many tensions are attempted;
/// `position` is the step index within the progression.
pub fn build_voicing(
    root: i32,
    template: &VoicingTemplate,
    complexity: f64,
    position: usize,
    ctx: &VoicingContext,
    rng: &mut impl Rng,
) -> Vec<i32> {
    let mut pitches: Vec<i32> = Vec::with_capacity(template.intervals.len() + 4);

    // Base chord tones, with era-specific octave jitter.
    for &interval in &template.intervals {
        let mut pitch = root + interval as i32;
        match ctx.era {
            // 70s voicings sit compact: occasionally fold a tone down.
            Some(Era::Seventies) if rng.random_bool(0.3) => pitch -= 12,
            // Mid-80s arrangements reach wide: occasionally lift a tone up.
            Some(Era::Mid80s) if rng.random_bool(0.4) => pitch += 12,
            _ => {}
        }
        pitches.push(pitch);
    }

    // Tensions: the step's complexity sets how many slots are attempted,
    // the era sets how likely each slot is to land.
    let slots = if ctx.era == Some(Era::Mid80s) { 3.0 } else { 2.0 };
    let tension_count = (complexity * slots).floor() as usize;
    let tension_probability = ctx
        .era
        .map_or(Era::DEFAULT_TENSION_PROBABILITY, Era::tension_probability);
    for _ in 0..tension_count {
        if !template.tensions.is_empty() && rng.random_bool(tension_probability) {
            let t = template.tensions[rng.random_range(0..template.tensions.len())];
            pitches.push(root + t as i32);
        }
    }

    // Artist signature colors apply when the template's declared artist
    // matches the configured influence.
    if template.artist_style.is_some() && template.artist_style == ctx.artist {
        if let Some(artist) = ctx.artist.as_deref() {
            apply_artist_color(&mut pitches, root, artist);
        }
    }

    pitches.push(root - bass_octave(ctx.era, rng));

    spread_voicing(pitches, position, ctx, rng)
}

/// Fixed artist transformations on the raw pitch set.
///
/// Tatsuro Yamashita adds his raised-11th/13th shimmer; Mariya Takeuchi
/// doubles high notes an octave down for closer voicings; Toshiki
/// Kadomatsu stacks extra altered tensions. Unknown names are a no-op.
pub fn apply_artist_color(pitches: &mut Vec<i32>, root: i32, artist: &str) {
    match artist {
        "Tatsuro Yamashita" => pitches.push(root + 22),
        "Mariya Takeuchi" => {
            let closer: Vec<i32> = pitches
                .iter()
                .filter(|&&p| p > root + 12)
                .map(|&p| p - 12)
                .collect();
            pitches.extend(closer);
        }
        "Toshiki Kadomatsu" => {
            pitches.push(root + 21);
            pitches.push(root + 15);
        }
        _ => {}
    }
}

/// How far below the root the bass note sits, in semitones.
fn bass_octave(era: Option<Era>, rng: &mut impl Rng) -> i32 {
    match era {
        Some(Era::Seventies) => 12,
        Some(Era::Mid80s) => {
            if rng.random_bool(0.5) {
                24
            } else {
                12
            }
        }
        _ => {
            if rng.random_bool(0.3) {
                24
            } else {
                12
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VoicingCatalog;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx(era: Option<Era>, artist: Option<&str>) -> VoicingContext {
        VoicingContext {
            era,
            style: Style::Uptempo,
            artist: artist.map(str::to_string),
        }
    }

    fn first_template() -> VoicingTemplate {
        VoicingCatalog::default_catalog().templates[0].clone()
    }

    #[test]
    fn test_chord_has_notes_after_bass() {
        let mut rng = StdRng::seed_from_u64(2);
        let template = first_template();
        for position in 0..8 {
            let pitches =
                build_voicing(60, &template, 0.5, position, &ctx(None, None), &mut rng);
            assert!(!pitches.is_empty());
        }
    }

    #[test]
    fn test_tatsuro_color_adds_raised_eleventh() {
        let mut pitches = vec![60, 64, 67];
        apply_artist_color(&mut pitches, 60, "Tatsuro Yamashita");
        assert!(pitches.contains(&82));
    }

    #[test]
    fn test_mariya_color_doubles_high_notes_down() {
        let mut pitches = vec![60, 74, 76];
        apply_artist_color(&mut pitches, 60, "Mariya Takeuchi");
        assert!(pitches.contains(&62));
        assert!(pitches.contains(&64));
        // Originals stay
        assert!(pitches.contains(&74));
        assert!(pitches.contains(&76));
    }

    #[test]
    fn test_kadomatsu_color_adds_altered_tensions() {
        let mut pitches = vec![60, 64, 67];
        apply_artist_color(&mut pitches, 60, "Toshiki Kadomatsu");
        assert!(pitches.contains(&81));
        assert!(pitches.contains(&75));
    }

    #[test]
    fn test_unknown_artist_is_noop() {
        let mut pitches = vec![60, 64, 67];
        apply_artist_color(&mut pitches, 60, "Nobody");
        assert_eq!(pitches, vec![60, 64, 67]);
    }

    #[test]
    fn test_artist_color_requires_template_match() {
        // Octave moves in the spreader preserve pitch class, so the
        // Kadomatsu colors (root+21, root+15) are observable as pitch
        // classes 9 and 3 above the root. Complexity 0 keeps template
        // tensions out of the way.
        let mut template = first_template();
        let influence = ctx(None, Some("Toshiki Kadomatsu"));
        let mut rng = StdRng::seed_from_u64(4);

        // Untagged template: configured influence alone must not add colors.
        assert!(template.artist_style.is_none());
        let plain = build_voicing(60, &template, 0.0, 0, &influence, &mut rng);
        assert!(plain.iter().all(|p| p.rem_euclid(12) != 3));

        // Tagged template matching the influence: colors land.
        template.artist_style = Some("Toshiki Kadomatsu".to_string());
        let colored = build_voicing(60, &template, 0.0, 0, &influence, &mut rng);
        assert!(colored.iter().any(|p| p.rem_euclid(12) == 3));
        assert!(colored.iter().any(|p| p.rem_euclid(12) == 9));
    }

    #[test]
    fn test_seventies_bass_is_one_octave() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..32 {
            assert_eq!(bass_octave(Some(Era::Seventies), &mut rng), 12);
        }
    }

    #[test]
    fn test_zero_complexity_adds_no_tensions() {
        // Complexity 0 floors the tension count to 0; only chord tones and
        // the bass remain, so no pitch class outside the template appears.
        let mut rng = StdRng::seed_from_u64(6);
        let template = first_template();
        let pitches = build_voicing(60, &template, 0.0, 0, &ctx(None, None), &mut rng);
        assert!(pitches.len() >= template.intervals.len() + 1);
        for p in &pitches {
            let pc = p.rem_euclid(12);
            assert!(
                template
                    .intervals
                    .iter()
                    .any(|&i| (60 + i as i32).rem_euclid(12) == pc)
                    || pc == 0
            );
        }
    }
}
