// City Pop Progression Generator — CLI entry point.
//
// Generates an 8-chord city pop progression and writes it to MIDI.
//
// Usage:
//   cargo run -p citypop_music -- [output.mid] [--era ERA] [--style STYLE]
//     [--artist NAME] [--complexity X] [--seed N]
//     [--voicings FILE] [--progressions FILE]
//
// Eras: 70s, early80s, mid80s, late80s
// Styles: ballad, uptempo, fusion

use citypop_music::catalog::{Era, ProgressionCatalog, Style, VoicingCatalog};
use citypop_music::compose::{GenerationOptions, STEP_SECONDS, compose};
use citypop_music::error::GenerateError;
use citypop_music::{midi, piece_name};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str());
    let seed: Option<u64> = parse_flag(&args, "--seed");
    let era = parse_flag::<String>(&args, "--era").and_then(|s| parse_era(&s));
    let style = parse_flag::<String>(&args, "--style").and_then(|s| parse_style(&s));
    let artist: Option<String> = parse_flag(&args, "--artist");
    let complexity: Option<f64> = parse_flag(&args, "--complexity");

    let options = GenerationOptions {
        era,
        style,
        artist_influence: artist,
        complexity,
    };

    println!("=== City Pop Progression Generator ===");
    println!("Era: {}", options.era.map_or("standard", |e| e.label()));
    println!("Style: {}", options.style.unwrap_or_default().label());
    if let Some(a) = &options.artist_influence {
        println!("Artist influence: {a}");
    }
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!();

    let mut rng = if let Some(s) = seed {
        StdRng::seed_from_u64(s)
    } else {
        StdRng::from_os_rng()
    };

    // Load catalogs, preferring custom JSON files when given.
    println!("[1/3] Loading catalogs...");
    let voicings = load_or_default(
        parse_flag::<String>(&args, "--voicings"),
        VoicingCatalog::load,
        VoicingCatalog::default_catalog,
        "voicing",
    );
    let progressions = load_or_default(
        parse_flag::<String>(&args, "--progressions"),
        ProgressionCatalog::load,
        ProgressionCatalog::default_catalog,
        "progression",
    );
    println!(
        "  {} voicing templates, {} progressions.",
        voicings.templates.len(),
        progressions.templates.len()
    );

    println!("[2/3] Composing...");
    let piece = compose(&voicings, &progressions, &options, &mut rng);
    println!("  Tempo: {:.0} BPM", piece.tempo_bpm);
    print!("{}", piece.summary());

    println!("[3/3] Writing MIDI...");
    let path: PathBuf = match output_path {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(format!("{}.mid", piece_name(&options, piece.tempo_bpm))),
    };
    match midi::write_midi(&piece, &path) {
        Ok(()) => {
            let duration = piece.chords.len() as f64 * STEP_SECONDS;
            println!("  Done! {} ({duration:.0}s of chords)", path.display());
        }
        Err(e) => {
            eprintln!("  Error writing {}: {e}", path.display());
            std::process::exit(1);
        }
    }

    println!();
    println!("Play with: timidity {} (or any MIDI player)", path.display());
}

fn parse_era(name: &str) -> Option<Era> {
    let era = Era::parse(name);
    if era.is_none() {
        eprintln!("Unknown era '{name}'. Generating without era shaping.");
    }
    era
}

fn parse_style(name: &str) -> Option<Style> {
    let style = Style::parse(name);
    if style.is_none() {
        eprintln!("Unknown style '{name}'. Using uptempo.");
    }
    style
}

fn load_or_default<C>(
    path: Option<String>,
    load: impl Fn(&Path) -> Result<C, GenerateError>,
    default: impl Fn() -> C,
    kind: &str,
) -> C {
    match path {
        Some(p) => match load(Path::new(&p)) {
            Ok(c) => {
                println!("  Loaded {kind} catalog from {p}.");
                c
            }
            Err(e) => {
                println!("  Failed to load {kind} catalog: {e}. Using defaults.");
                default()
            }
        },
        None => default(),
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
