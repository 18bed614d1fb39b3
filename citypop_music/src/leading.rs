// Voice-leading smoother: pull successive chords toward each other.
//
// Each note of the new chord is compared with the previous chord's notes.
// When the nearest previous note is more than a perfect fifth away, the new
// note is shifted one octave toward it, keeping voices from leaping. Notes
// are adjusted independently; the result is not re-sorted or deduplicated
// here. The first chord of a piece has no previous context and is left
// untouched.

/// Maximum comfortable melodic distance in semitones (a perfect fifth).
const MAX_LEAP: i32 = 7;

/// Adjust `current` toward proximity with `previous`.
///
/// Ties in the nearest-note search resolve to the first previous note
/// encountered. A note farther than `MAX_LEAP` from its nearest neighbor
/// moves one octave toward it: up when the neighbor is higher, down when
/// it is lower.
pub fn smooth(current: &mut [i32], previous: &[i32]) {
    if previous.is_empty() {
        return;
    }

    for note in current.iter_mut() {
        let mut closest = previous[0];
        let mut best = (previous[0] - *note).abs();
        for &prev in &previous[1..] {
            let d = (prev - *note).abs();
            if d < best {
                best = d;
                closest = prev;
            }
        }

        if best > MAX_LEAP {
            if closest > *note {
                *note += 12;
            } else {
                *note -= 12;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distant_note_shifts_toward_previous() {
        // Previous [60], candidate 70: distance 10 > 7 and the closest
        // previous note is below, so the candidate drops an octave to 58.
        let mut current = vec![70];
        smooth(&mut current, &[60]);
        assert_eq!(current, vec![58]);
    }

    #[test]
    fn test_shift_up_when_closest_is_higher() {
        let mut current = vec![50];
        smooth(&mut current, &[60]);
        assert_eq!(current, vec![62]);
    }

    #[test]
    fn test_close_note_untouched() {
        let mut current = vec![64];
        smooth(&mut current, &[60]);
        assert_eq!(current, vec![64]);
    }

    #[test]
    fn test_fifth_exactly_is_not_a_leap() {
        let mut current = vec![67];
        smooth(&mut current, &[60]);
        assert_eq!(current, vec![67]);
    }

    #[test]
    fn test_no_previous_chord_is_noop() {
        let mut current = vec![40, 90];
        smooth(&mut current, &[]);
        assert_eq!(current, vec![40, 90]);
    }

    #[test]
    fn test_each_note_adjusted_independently() {
        let mut current = vec![70, 61, 45];
        smooth(&mut current, &[60, 64]);
        // 70: nearest is 64 (d=6), stays. 61: nearest 60, stays.
        // 45: nearest 60 (d=15), shifts up to 57.
        assert_eq!(current, vec![70, 61, 57]);
    }
}
