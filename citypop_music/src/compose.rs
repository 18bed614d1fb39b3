// Composition driver: orchestrates a full 8-step chord progression.
//
// Picks a progression template for the active style, chooses a tempo from
// the style's range, generates the tension arc, then walks the 8 steps:
// root lookup, filtered voicing pick, voicing build, voice-leading smoothing
// against the previous step, and timing/velocity assignment. Chords sit on
// a fixed 2-second grid with per-chord swing and per-note jitter; tempo only
// affects the MIDI header, not note spacing.
//
// The whole run is synchronous and bounded; all randomness flows through
// the single injected rng, so a seeded run is fully reproducible.

use rand::Rng;

use crate::catalog::{Era, ProgressionCatalog, Style, StyleSettings, VoicingCatalog};
use crate::leading::smooth;
use crate::tension::tension_arc;
use crate::voicing::{VoicingContext, build_voicing};

/// Progressions are always this many steps long.
pub const PROGRESSION_STEPS: usize = 8;

/// Seconds between chord onsets, independent of tempo.
pub const STEP_SECONDS: f64 = 2.0;

/// Generation configuration. All fields optional; style defaults to uptempo.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub era: Option<Era>,
    pub style: Option<Style>,
    pub artist_influence: Option<String>,
    /// Accepted for interface completeness; harmonic density is driven by
    /// the tension arc and the progression template's own complexity.
    pub complexity: Option<f64>,
}

/// A single note event, times in seconds, velocity in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: u8,
    pub start: f64,
    pub duration: f64,
    pub velocity: f64,
}

/// The notes of one progression step.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    pub notes: Vec<Note>,
}

/// A completed progression ready for MIDI encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub chords: Vec<Chord>,
    pub tempo_bpm: f64,
}

impl Piece {
    /// Compact per-step listing of chord pitches for console output.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (i, chord) in self.chords.iter().enumerate() {
            out.push_str(&format!("step {}: ", i + 1));
            for note in &chord.notes {
                out.push_str(pitch_name(note.pitch));
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

/// Generate a full progression from the catalogs and options.
pub fn compose(
    voicings: &VoicingCatalog,
    progressions: &ProgressionCatalog,
    options: &GenerationOptions,
    rng: &mut impl Rng,
) -> Piece {
    let style = options.style.unwrap_or_default();
    let settings = StyleSettings::for_style(style);
    let ctx = VoicingContext {
        era: options.era,
        style,
        artist: options.artist_influence.clone(),
    };

    let candidates = progressions.filter(style);
    let progression = candidates[rng.random_range(0..candidates.len())].clone();
    tracing::debug!(progression = %progression.name, "selected progression template");

    let tempo_bpm = rng.random_range(settings.tempo_range.0..=settings.tempo_range.1);
    let arc = tension_arc(PROGRESSION_STEPS, rng);

    let (vel_min, vel_max) = settings.velocity_range;
    let vel_span = (vel_max - vel_min) as f64;

    let mut chords = Vec::with_capacity(PROGRESSION_STEPS);
    let mut prev_pitches: Vec<i32> = Vec::new();
    let mut time = 0.0_f64;

    for step in 0..PROGRESSION_STEPS {
        let offset = if progression.roots.is_empty() {
            0
        } else {
            progression.roots[step % progression.roots.len()]
        };
        let root = 60 + offset as i32;

        let picks = voicings.filter(options.era, options.artist_influence.as_deref());
        let template = picks[rng.random_range(0..picks.len())];
        let complexity = arc[step] * progression.complexity;

        let mut pitches = build_voicing(root, template, complexity, step, &ctx, rng);
        smooth(&mut pitches, &prev_pitches);

        let swing = settings.swing_factor;
        let chord_start = time + rng.random_range(-swing / 2.0..swing / 2.0);

        let mut notes = Vec::with_capacity(pitches.len());
        for &pitch in &pitches {
            let raw_velocity = vel_min as f64 + rng.random_range(0.0..vel_span);
            // MIDI deltas cannot go negative, so onsets clamp at zero.
            let start = (chord_start + rng.random_range(-0.005..0.005)).max(0.0);
            let duration = 1.95 + rng.random_range(-0.05..0.05);
            notes.push(Note {
                pitch: pitch.clamp(0, 127) as u8,
                start,
                duration,
                velocity: raw_velocity / 127.0,
            });
        }
        chords.push(Chord { notes });

        prev_pitches = pitches;
        time += STEP_SECONDS;
    }

    Piece { chords, tempo_bpm }
}

/// Convert a MIDI pitch to a compact note name (e.g., "C4", "F#3").
pub fn pitch_name(pitch: u8) -> &'static str {
    const NAMES: &[&str] = &[
        "C0", "C#0", "D0", "Eb0", "E0", "F0", "F#0", "G0", "Ab0", "A0", "Bb0", "B0", "C1", "C#1",
        "D1", "Eb1", "E1", "F1", "F#1", "G1", "Ab1", "A1", "Bb1", "B1", "C2", "C#2", "D2", "Eb2",
        "E2", "F2", "F#2", "G2", "Ab2", "A2", "Bb2", "B2", "C3", "C#3", "D3", "Eb3", "E3", "F3",
        "F#3", "G3", "Ab3", "A3", "Bb3", "B3", "C4", "C#4", "D4", "Eb4", "E4", "F4", "F#4", "G4",
        "Ab4", "A4", "Bb4", "B4", "C5", "C#5", "D5", "Eb5", "E5", "F5", "F#5", "G5", "Ab5", "A5",
        "Bb5", "B5", "C6", "C#6", "D6", "Eb6", "E6", "F6", "F#6", "G6", "Ab6", "A6", "Bb6", "B6",
        "C7", "C#7", "D7", "Eb7", "E7", "F7", "F#7", "G7", "Ab7", "A7", "Bb7", "B7", "C8", "C#8",
        "D8", "Eb8", "E8", "F8", "F#8", "G8", "Ab8", "A8", "Bb8", "B8",
    ];
    if (pitch as usize) < NAMES.len() {
        NAMES[pitch as usize]
    } else {
        "??"
    }
}
