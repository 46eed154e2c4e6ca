//! Sample identity parsed from image filenames.
//!
//! Filenames follow `Plant_Ambient_Treatment_Period_Replicate[_Kind].ext`,
//! e.g. `P01_27_Controle_Dia_R1_thermal.jpg`. Anything with fewer tokens
//! still yields an identity, flagged as [`SampleIdentity::Fallback`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    DEFAULT_AMBIENT_PRESET, DEFAULT_TOKEN_DELIMITER, METADATA_TOKEN_COUNT, UNKNOWN_MARKER,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Ambient preset given to filenames that cannot be parsed.
    #[serde(default = "default_preset")]
    pub default_preset: String,
    /// Value written into fields that cannot be parsed.
    #[serde(default = "default_unknown")]
    pub unknown_marker: String,
}

fn default_delimiter() -> char {
    DEFAULT_TOKEN_DELIMITER
}
fn default_preset() -> String {
    DEFAULT_AMBIENT_PRESET.to_string()
}
fn default_unknown() -> String {
    UNKNOWN_MARKER.to_string()
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_TOKEN_DELIMITER,
            default_preset: default_preset(),
            unknown_marker: default_unknown(),
        }
    }
}

/// Which camera produced the file, from the optional kind token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Thermal,
    Visual,
    Other(String),
}

impl ImageKind {
    fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "thermal" => Self::Thermal,
            "visual" => Self::Visual,
            _ => Self::Other(token.to_string()),
        }
    }

    fn is_camera(&self) -> bool {
        matches!(self, Self::Thermal | Self::Visual)
    }
}

/// Identity of one plant sample. Created once per filename; read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleMetadata {
    plant_id: String,
    ambient_preset: String,
    treatment: String,
    period: String,
    replicate: String,
    source_filename: String,
    image_kind: Option<ImageKind>,
}

impl SampleMetadata {
    pub fn plant_id(&self) -> &str {
        &self.plant_id
    }

    pub fn ambient_preset(&self) -> &str {
        &self.ambient_preset
    }

    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn replicate(&self) -> &str {
        &self.replicate
    }

    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    pub fn image_kind(&self) -> Option<&ImageKind> {
        self.image_kind.as_ref()
    }
}

/// Result of parsing a filename.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SampleIdentity {
    /// All five positional tokens were present.
    Parsed(SampleMetadata),
    /// Too few tokens: `plant_id` holds the whole identifier, other fields
    /// hold the unknown marker and the ambient preset is the configured default.
    Fallback(SampleMetadata),
}

impl SampleIdentity {
    pub fn metadata(&self) -> &SampleMetadata {
        match self {
            Self::Parsed(m) | Self::Fallback(m) => m,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Key shared by the thermal and visual files of one sample: the
    /// identifier without its kind token, lowercased.
    pub fn pairing_key(&self, config: &MetadataConfig) -> String {
        let meta = self.metadata();
        let stem = file_stem(&meta.source_filename);
        strip_kind_token(stem, config.delimiter).to_lowercase()
    }
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Drop a trailing `thermal`/`visual` token, if any.
fn strip_kind_token(stem: &str, delimiter: char) -> &str {
    match stem.rsplit_once(delimiter) {
        Some((head, last)) if ImageKind::from_token(last).is_camera() => head,
        _ => stem,
    }
}

/// Parse a filename (or path) into a sample identity. Never fails.
pub fn parse_identifier(name: &str, config: &MetadataConfig) -> SampleIdentity {
    let source_filename = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string();
    let stem = file_stem(&source_filename);
    let tokens: Vec<&str> = stem.split(config.delimiter).collect();

    if tokens.len() >= METADATA_TOKEN_COUNT {
        return SampleIdentity::Parsed(SampleMetadata {
            plant_id: tokens[0].to_string(),
            ambient_preset: tokens[1].to_string(),
            treatment: tokens[2].to_string(),
            period: tokens[3].to_string(),
            replicate: tokens[4].to_string(),
            image_kind: tokens.get(5).map(|t| ImageKind::from_token(t)),
            source_filename,
        });
    }

    warn!(
        filename = %source_filename,
        tokens = tokens.len(),
        "Filename does not carry {METADATA_TOKEN_COUNT} identity tokens, using fallback identity"
    );

    let image_kind = tokens
        .last()
        .map(|t| ImageKind::from_token(t))
        .filter(|k| tokens.len() > 1 && k.is_camera());

    SampleIdentity::Fallback(SampleMetadata {
        plant_id: strip_kind_token(stem, config.delimiter).to_string(),
        ambient_preset: config.default_preset.clone(),
        treatment: config.unknown_marker.clone(),
        period: config.unknown_marker.clone(),
        replicate: config.unknown_marker.clone(),
        image_kind,
        source_filename,
    })
}

/// A thermal image and, when one was found, its visual counterpart.
#[derive(Clone, Debug)]
pub struct SamplePair {
    pub key: String,
    pub identity: SampleIdentity,
    pub thermal: PathBuf,
    pub visual: Option<PathBuf>,
}

/// Group files into thermal/visual pairs by their pairing key.
///
/// Files without a `thermal` or `visual` kind token are skipped, as are
/// groups without a thermal image. Output is sorted by key.
pub fn pair_files(paths: &[PathBuf], config: &MetadataConfig) -> Vec<SamplePair> {
    type Group = (Option<(PathBuf, SampleIdentity)>, Option<PathBuf>);
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for path in paths {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let identity = parse_identifier(name, config);
        let key = identity.pairing_key(config);
        match identity.metadata().image_kind() {
            Some(ImageKind::Thermal) => {
                groups.entry(key).or_default().0 = Some((path.clone(), identity));
            }
            Some(ImageKind::Visual) => {
                groups.entry(key).or_default().1 = Some(path.clone());
            }
            _ => {}
        }
    }

    groups
        .into_iter()
        .filter_map(|(key, (thermal, visual))| {
            let (thermal, identity) = thermal?;
            Some(SamplePair {
                key,
                identity,
                thermal,
                visual,
            })
        })
        .collect()
}
