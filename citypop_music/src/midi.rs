// MIDI output from composed pieces.
//
// Converts a Piece into a Standard MIDI File (SMF) for playback or download.
// Track 0 carries the tempo; track 1 carries the chord events. Note times
// are absolute seconds; they convert to ticks through the written tempo, so
// the fixed 2-second chord grid is preserved in real time no matter which
// tempo lands in the header.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1.

use crate::compose::Piece;
use crate::error::Result;
use midly::{
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Electric piano program for the chord track.
const CHORD_PROGRAM: u8 = 4;

/// Encode a Piece to SMF bytes.
pub fn encode(piece: &Piece) -> Result<Vec<u8>> {
    let smf = piece_to_smf(piece);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Encode a Piece and write it to a file.
pub fn write_midi(piece: &Piece, path: &Path) -> Result<()> {
    let bytes = encode(piece)?;
    std::fs::write(path, &bytes)?;
    Ok(())
}

/// Convert a Piece to an in-memory SMF.
pub fn piece_to_smf(piece: &Piece) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = (60_000_000.0 / piece.tempo_bpm).round() as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    // Track 1: chords
    let channel = u4::new(0);
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(b"City Pop Chords")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(CHORD_PROGRAM),
            },
        },
    });

    // Collect notes at absolute ticks. Durations can outlast the chord
    // grid, so a note's off is capped at the next onset of the same pitch;
    // otherwise the lingering off would truncate the re-struck note.
    let ticks_per_second = piece.tempo_bpm / 60.0 * TICKS_PER_QUARTER as f64;
    let mut spans: Vec<(u32, u32, u8, u8)> = Vec::new();
    for chord in &piece.chords {
        for note in &chord.notes {
            let on_tick = (note.start * ticks_per_second).round() as u32;
            let off_tick = ((note.start + note.duration) * ticks_per_second).round() as u32;
            let velocity = (note.velocity * 127.0).round().clamp(1.0, 127.0) as u8;
            spans.push((on_tick, off_tick.max(on_tick + 1), note.pitch, velocity));
        }
    }
    spans.sort_by_key(|&(on, _, pitch, _)| (pitch, on));
    for i in 0..spans.len().saturating_sub(1) {
        let (next_on, _, next_pitch, _) = spans[i + 1];
        let (on, off, pitch, _) = spans[i];
        if pitch == next_pitch && off > next_on {
            spans[i].1 = next_on.max(on + 1);
        }
    }

    // Expand to on/off events, offs before ons at the same tick so a
    // re-struck pitch is released first.
    let mut events: Vec<(u32, bool, u8, u8)> = Vec::new();
    for (on, off, pitch, velocity) in spans {
        events.push((on, true, pitch, velocity));
        events.push((off, false, pitch, 0));
    }
    events.sort_by_key(|&(tick, is_on, pitch, _)| (tick, is_on, pitch));

    let mut last_tick: u32 = 0;
    for (tick, is_on, pitch, velocity) in events {
        let delta = tick - last_tick;
        last_tick = tick;
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(pitch),
                vel: u7::new(velocity),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(pitch),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{Chord, Note};

    fn test_piece() -> Piece {
        let chord = |start: f64, pitches: &[u8]| Chord {
            notes: pitches
                .iter()
                .map(|&pitch| Note {
                    pitch,
                    start,
                    duration: 1.95,
                    velocity: 0.6,
                })
                .collect(),
        };
        Piece {
            chords: vec![chord(0.0, &[48, 60, 64, 67]), chord(2.0, &[53, 65, 69, 72])],
            tempo_bpm: 104.0,
        }
    }

    #[test]
    fn test_piece_to_smf_basic() {
        let smf = piece_to_smf(&test_piece());
        // Tempo track + one chord track
        assert_eq!(smf.tracks.len(), 2);
        let ons = smf.tracks[1]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count();
        assert_eq!(ons, 8);
    }

    #[test]
    fn test_encode_produces_valid_header() {
        let bytes = encode(&test_piece()).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }

    #[test]
    fn test_restruck_pitch_released_at_next_onset() {
        // The first note's duration spills past the 2-second grid, so its
        // off must be capped at the second note's onset instead of cutting
        // the re-struck pitch short.
        let note = |start: f64, duration: f64| Note {
            pitch: 60,
            start,
            duration,
            velocity: 0.6,
        };
        let piece = Piece {
            chords: vec![
                Chord {
                    notes: vec![note(0.0, 2.1)],
                },
                Chord {
                    notes: vec![note(2.0, 1.9)],
                },
            ],
            tempo_bpm: 120.0,
        };

        let smf = piece_to_smf(&piece);
        let mut tick = 0u32;
        let mut seen = Vec::new();
        for e in &smf.tracks[1] {
            tick += e.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = e.kind {
                match message {
                    MidiMessage::NoteOn { .. } => seen.push((tick, "on")),
                    MidiMessage::NoteOff { .. } => seen.push((tick, "off")),
                    _ => {}
                }
            }
        }
        // 960 ticks per second at 120 BPM: the uncapped off would land at
        // 2016, but the second onset at 1920 takes precedence.
        assert_eq!(
            seen,
            vec![(0, "on"), (1920, "off"), (1920, "on"), (3744, "off")]
        );
    }

    #[test]
    fn test_events_are_tick_ordered() {
        let smf = piece_to_smf(&test_piece());
        // Deltas are unsigned, so construction would have panicked on a
        // non-monotonic event list; spot-check the first chord's span.
        let total: u32 = smf.tracks[1].iter().map(|e| e.delta.as_int()).sum();
        let ticks_per_second = 104.0 / 60.0 * TICKS_PER_QUARTER as f64;
        let expected_end = ((2.0 + 1.95) * ticks_per_second).round() as u32;
        assert_eq!(total, expected_end);
    }
}
