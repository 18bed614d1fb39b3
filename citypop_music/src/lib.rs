// City Pop Progression Generator
//
// Procedurally generates short chord progressions in the city pop harmonic
// idiom and serializes them to a Standard MIDI File. Generation is a single
// synchronous pass: pick a progression template, shape a tension arc across
// the piece, then build, smooth, and spread one chord per step.
//
// Architecture:
// - catalog.rs: Immutable voicing/progression catalogs and style settings,
//   with era/artist filtering and optional JSON loading
// - tension.rs: Golden-ratio tension arc across the progression
// - voicing.rs: Expands (root, template, complexity) into a pitch set with
//   era jitter, tensions, artist colors, and a bass note
// - leading.rs: Voice-leading smoothing between successive chords
// - spread.rs: Octave placement, spacing, doubling, and range shaping
// - compose.rs: The 8-step composition driver with timing and velocity
// - midi.rs: SMF encoding of completed pieces
// - error.rs: The single user-visible failure type
//
// All randomness flows through one injected rng, so output is deterministic
// given a seed (the piece name's uniqueness token aside).

pub mod catalog;
pub mod compose;
pub mod error;
pub mod leading;
pub mod midi;
pub mod spread;
pub mod tension;
pub mod voicing;

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::catalog::{ProgressionCatalog, VoicingCatalog};
use crate::compose::{GenerationOptions, compose};
use crate::error::{GenerateError, Result};

/// A generated piece ready for download: MIDI payload plus metadata.
#[derive(Debug, Clone)]
pub struct GeneratedPiece {
    pub midi: Vec<u8>,
    pub tempo_bpm: f64,
    pub name: String,
    pub file_name: String,
}

/// Generate a piece from the built-in catalogs.
pub fn generate(options: &GenerationOptions, rng: &mut impl Rng) -> Result<GeneratedPiece> {
    generate_with_catalogs(
        &VoicingCatalog::default_catalog(),
        &ProgressionCatalog::default_catalog(),
        options,
        rng,
    )
}

/// Generate a piece from explicit catalogs.
///
/// All-or-nothing: any internal failure is logged and surfaced as a single
/// generation error, with no partial result.
pub fn generate_with_catalogs(
    voicings: &VoicingCatalog,
    progressions: &ProgressionCatalog,
    options: &GenerationOptions,
    rng: &mut impl Rng,
) -> Result<GeneratedPiece> {
    // The filter fallback can only return the whole catalog, so emptiness
    // must be rejected here before the driver samples from it.
    if voicings.templates.is_empty() {
        tracing::error!("generation failed: voicing catalog has no templates");
        return Err(GenerateError::EmptyCatalog("voicing"));
    }
    if progressions.templates.is_empty() {
        tracing::error!("generation failed: progression catalog has no templates");
        return Err(GenerateError::EmptyCatalog("progression"));
    }

    let piece = compose(voicings, progressions, options, rng);
    let midi = midi::encode(&piece).inspect_err(|e| {
        tracing::error!(error = %e, "generation failed during MIDI encoding");
    })?;

    let name = piece_name(options, piece.tempo_bpm);
    let file_name = format!("{name}.mid");
    tracing::info!(name = %name, tempo_bpm = piece.tempo_bpm, "generated piece");

    Ok(GeneratedPiece {
        midi,
        tempo_bpm: piece.tempo_bpm,
        name,
        file_name,
    })
}

/// Descriptive name embedding era, style, a uniqueness token, and tempo.
pub fn piece_name(options: &GenerationOptions, tempo_bpm: f64) -> String {
    let era = options.era.map_or("standard", |e| e.label());
    let style = options.style.unwrap_or_default().label();
    format!(
        "citypop-{era}-{style}-{}-{}bpm",
        uniqueness_token(),
        tempo_bpm.round() as u32
    )
}

/// Timestamp-derived token so successive downloads don't collide.
fn uniqueness_token() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{:06x}", millis & 0xff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Era, Style};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_returns_midi_payload() {
        let mut rng = StdRng::seed_from_u64(1);
        let piece = generate(&GenerationOptions::default(), &mut rng).unwrap();
        assert_eq!(&piece.midi[..4], b"MThd");
        assert!(piece.file_name.ends_with(".mid"));
        assert!(piece.file_name.starts_with("citypop-standard-uptempo-"));
    }

    #[test]
    fn test_seeded_generation_is_byte_identical() {
        let options = GenerationOptions {
            era: Some(Era::Mid80s),
            style: Some(Style::Fusion),
            artist_influence: Some("Tatsuro Yamashita".to_string()),
            complexity: None,
        };
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let pa = generate(&options, &mut a).unwrap();
        let pb = generate(&options, &mut b).unwrap();
        assert_eq!(pa.midi, pb.midi);
        assert_eq!(pa.tempo_bpm, pb.tempo_bpm);
    }

    #[test]
    fn test_empty_catalogs_fail_instead_of_panicking() {
        let empty_voicings = VoicingCatalog { templates: vec![] };
        let empty_progressions = ProgressionCatalog { templates: vec![] };
        let options = GenerationOptions::default();

        let mut rng = StdRng::seed_from_u64(3);
        let err = generate_with_catalogs(
            &empty_voicings,
            &ProgressionCatalog::default_catalog(),
            &options,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyCatalog("voicing")));

        let err = generate_with_catalogs(
            &VoicingCatalog::default_catalog(),
            &empty_progressions,
            &options,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::EmptyCatalog("progression")));
    }

    #[test]
    fn test_name_embeds_era_style_and_tempo() {
        let options = GenerationOptions {
            era: Some(Era::Seventies),
            style: Some(Style::Ballad),
            ..Default::default()
        };
        let name = piece_name(&options, 72.4);
        assert!(name.starts_with("citypop-70s-ballad-"));
        assert!(name.ends_with("-72bpm"));
    }
}
