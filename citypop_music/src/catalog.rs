// Voicing and progression catalogs: the immutable harmonic vocabulary.
//
// Two tables drive generation. The voicing catalog holds named chord-voicing
// templates (interval sets plus available tensions and alterations, tagged by
// category and optionally by era and artist style). The progression catalog
// holds root-sequence templates (scale-degree semitone offsets with aligned
// per-step weights and a complexity score).
//
// Both are loaded once and never mutated. Built-in defaults cover the core
// city pop vocabulary; custom catalogs can be loaded from JSON files with the
// same shape. Style settings (tempo, velocity, swing per style) are a fixed
// built-in table.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::GenerateError;

/// Production era, shaping voicing density and register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "70s")]
    Seventies,
    #[serde(rename = "early80s")]
    Early80s,
    #[serde(rename = "mid80s")]
    Mid80s,
    #[serde(rename = "late80s")]
    Late80s,
}

impl Era {
    /// Probability that each tension slot is actually filled.
    /// Mid-80s arrangements are the densest; the 70s the sparsest.
    pub fn tension_probability(self) -> f64 {
        match self {
            Era::Seventies => 0.5,
            Era::Early80s => 0.7,
            Era::Mid80s => 0.9,
            Era::Late80s => 0.6,
        }
    }

    /// Tension probability when no era is configured.
    pub const DEFAULT_TENSION_PROBABILITY: f64 = 0.7;

    pub fn label(self) -> &'static str {
        match self {
            Era::Seventies => "70s",
            Era::Early80s => "early80s",
            Era::Mid80s => "mid80s",
            Era::Late80s => "late80s",
        }
    }

    pub fn parse(s: &str) -> Option<Era> {
        match s.to_lowercase().as_str() {
            "70s" | "seventies" => Some(Era::Seventies),
            "early80s" => Some(Era::Early80s),
            "mid80s" => Some(Era::Mid80s),
            "late80s" => Some(Era::Late80s),
            _ => None,
        }
    }
}

/// Rhythmic/arrangement style. Uptempo is the default when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Ballad,
    #[default]
    Uptempo,
    Fusion,
}

impl Style {
    pub fn label(self) -> &'static str {
        match self {
            Style::Ballad => "ballad",
            Style::Uptempo => "uptempo",
            Style::Fusion => "fusion",
        }
    }

    pub fn parse(s: &str) -> Option<Style> {
        match s.to_lowercase().as_str() {
            "ballad" => Some(Style::Ballad),
            "uptempo" => Some(Style::Uptempo),
            "fusion" => Some(Style::Fusion),
            _ => None,
        }
    }
}

/// Harmonic flavor of a voicing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    CityPop,
    Fusion,
    Jazz,
    Ballad,
}

/// A named chord-voicing template.
///
/// `intervals` are semitone offsets from the root forming the base chord
/// tones. `tensions` and `alterations` are pools of optional color notes;
/// the voicing builder draws from `tensions` according to the step's
/// complexity, while `alterations` document the template's available
/// chromatic colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicingTemplate {
    pub name: String,
    pub intervals: Vec<i8>,
    #[serde(default)]
    pub tensions: Vec<i8>,
    #[serde(default)]
    pub alterations: Vec<i8>,
    pub category: Category,
    /// Selection weight in (0, 1]. Kept as catalog data; template selection
    /// is currently uniform over the filtered set.
    pub weight: f64,
    #[serde(default)]
    pub era: Option<Era>,
    #[serde(default)]
    pub artist_style: Option<String>,
}

/// A root-sequence template: scale-degree semitone offsets from the tonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionTemplate {
    pub name: String,
    pub roots: Vec<i8>,
    /// Per-step weights aligned 1:1 with `roots`.
    pub weights: Vec<f64>,
    pub style: Style,
    /// Harmonic density multiplier in [0, 1].
    pub complexity: f64,
}

/// The voicing catalog: all templates available to the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicingCatalog {
    pub templates: Vec<VoicingTemplate>,
}

impl VoicingCatalog {
    /// Load from a JSON file. A catalog with no templates is rejected.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let data = std::fs::read_to_string(path)?;
        let catalog: VoicingCatalog = serde_json::from_str(&data)?;
        if catalog.templates.is_empty() {
            return Err(GenerateError::EmptyCatalog("voicing"));
        }
        Ok(catalog)
    }

    /// Filter templates by configured era and artist influence.
    ///
    /// A requested era matches only templates explicitly tagged with that
    /// era; likewise for artist influence. When the filter yields no
    /// candidates the whole catalog is returned instead; catalogs are
    /// validated non-empty at load and at the generation entry points.
    pub fn filter(&self, era: Option<Era>, artist: Option<&str>) -> Vec<&VoicingTemplate> {
        let filtered: Vec<&VoicingTemplate> = self
            .templates
            .iter()
            .filter(|t| era.is_none_or(|e| t.era == Some(e)))
            .filter(|t| artist.is_none_or(|a| t.artist_style.as_deref() == Some(a)))
            .collect();

        if filtered.is_empty() {
            tracing::warn!(
                ?era,
                ?artist,
                "voicing filter matched no templates, falling back to full catalog"
            );
            self.templates.iter().collect()
        } else {
            filtered
        }
    }

    /// Built-in city pop voicing vocabulary.
    pub fn default_catalog() -> Self {
        let t = |name: &str,
                 intervals: &[i8],
                 tensions: &[i8],
                 alterations: &[i8],
                 category: Category,
                 weight: f64,
                 era: Option<Era>,
                 artist: Option<&str>| {
            VoicingTemplate {
                name: name.to_string(),
                intervals: intervals.to_vec(),
                tensions: tensions.to_vec(),
                alterations: alterations.to_vec(),
                category,
                weight,
                era,
                artist_style: artist.map(str::to_string),
            }
        };

        VoicingCatalog {
            templates: vec![
                // Core major/minor seventh colors, usable everywhere
                t("maj7-9", &[0, 4, 7, 11], &[14, 21], &[18], Category::CityPop, 0.9, None, None),
                t("m7-9", &[0, 3, 7, 10], &[14, 17], &[], Category::CityPop, 0.9, None, None),
                t("dom13", &[0, 4, 7, 10], &[14, 21], &[13, 15, 20], Category::Jazz, 0.7, None, None),
                t("sus4-7", &[0, 5, 7, 10], &[14], &[], Category::Fusion, 0.5, None, None),
                t("m7b5", &[0, 3, 6, 10], &[17], &[], Category::Jazz, 0.4, None, None),
                // Era-tagged variants
                t("sixth-nine", &[0, 4, 7, 9], &[14], &[], Category::CityPop, 0.8, Some(Era::Seventies), None),
                t("maj7-warm", &[0, 4, 7, 11], &[14], &[], Category::Ballad, 0.8, Some(Era::Seventies), None),
                t("add9-bright", &[0, 4, 7, 14], &[21], &[], Category::CityPop, 0.7, Some(Era::Late80s), None),
                t("dom7-sharp9", &[0, 4, 7, 10], &[], &[15, 20], Category::Fusion, 0.5, Some(Era::Late80s), None),
                // Artist-tagged signatures
                t("maj9-shimmer", &[0, 4, 7, 11, 14], &[21], &[18], Category::CityPop, 0.7, Some(Era::Mid80s), Some("Tatsuro Yamashita")),
                t("m9-close", &[0, 3, 7, 10, 14], &[17], &[], Category::Ballad, 0.6, Some(Era::Early80s), Some("Mariya Takeuchi")),
                t("m11-drive", &[0, 3, 7, 10, 17], &[14], &[], Category::Fusion, 0.6, Some(Era::Mid80s), Some("Toshiki Kadomatsu")),
            ],
        }
    }
}

/// The progression catalog: root sequences for the composition driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionCatalog {
    pub templates: Vec<ProgressionTemplate>,
}

impl ProgressionCatalog {
    /// Load from a JSON file. A catalog with no templates is rejected.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let data = std::fs::read_to_string(path)?;
        let catalog: ProgressionCatalog = serde_json::from_str(&data)?;
        if catalog.templates.is_empty() {
            return Err(GenerateError::EmptyCatalog("progression"));
        }
        Ok(catalog)
    }

    /// Templates matching the active style, falling back to the whole
    /// catalog when none match (same policy as the voicing filter).
    pub fn filter(&self, style: Style) -> Vec<&ProgressionTemplate> {
        let filtered: Vec<&ProgressionTemplate> =
            self.templates.iter().filter(|t| t.style == style).collect();
        if filtered.is_empty() {
            tracing::warn!(
                style = style.label(),
                "no progression templates for style, falling back to full catalog"
            );
            self.templates.iter().collect()
        } else {
            filtered
        }
    }

    /// Built-in progression templates.
    pub fn default_catalog() -> Self {
        let p = |name: &str, roots: &[i8], weights: &[f64], style: Style, complexity: f64| {
            ProgressionTemplate {
                name: name.to_string(),
                roots: roots.to_vec(),
                weights: weights.to_vec(),
                style,
                complexity,
            }
        };

        ProgressionCatalog {
            templates: vec![
                // IVmaj7 - V7 - iii7 - vi7, the signature city pop loop
                p("royal-road", &[5, 7, 4, 9], &[1.0, 1.0, 0.8, 1.0], Style::Uptempo, 0.8),
                p("night-drive", &[0, 9, 5, 7], &[1.0, 0.9, 1.0, 1.0], Style::Uptempo, 0.6),
                // ii - V - I - vi
                p("smooth-turnaround", &[2, 7, 0, 9], &[0.9, 1.0, 1.0, 0.8], Style::Ballad, 0.5),
                p("sunset-glow", &[0, 5, 2, 7], &[1.0, 0.9, 0.9, 1.0], Style::Ballad, 0.4),
                // Chromatic descent flavor
                p("plastic-groove", &[0, 10, 8, 7], &[1.0, 0.8, 0.8, 1.0], Style::Fusion, 0.9),
                p("midnight-loop", &[9, 5, 7, 0], &[1.0, 1.0, 0.9, 1.0], Style::Fusion, 0.7),
            ],
        }
    }
}

/// Per-style performance settings.
#[derive(Debug, Clone, Copy)]
pub struct StyleSettings {
    /// Tempo range in BPM, inclusive.
    pub tempo_range: (f64, f64),
    /// Velocity range in MIDI velocity units, inclusive.
    pub velocity_range: (u8, u8),
    /// Maximum chord-onset displacement in seconds.
    pub swing_factor: f64,
}

impl StyleSettings {
    pub fn for_style(style: Style) -> StyleSettings {
        match style {
            Style::Ballad => StyleSettings {
                tempo_range: (65.0, 80.0),
                velocity_range: (60, 85),
                swing_factor: 0.02,
            },
            Style::Uptempo => StyleSettings {
                tempo_range: (95.0, 120.0),
                velocity_range: (70, 100),
                swing_factor: 0.05,
            },
            Style::Fusion => StyleSettings {
                tempo_range: (100.0, 125.0),
                velocity_range: (75, 105),
                swing_factor: 0.08,
            },
        }
    }
}
