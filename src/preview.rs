//! # Pair Preview
//!
//! Resolves whatever the preview node was given (a result directory, the
//! video itself, or path fragments) to the canonical video of the pair and
//! wraps it in the payload the host UI renders.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::LivePhotoConfig;

/// Path input of the preview node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewInput {
    /// A directory or file path
    Path(String),

    /// Path fragments, concatenated without separators
    Fragments(Vec<String>),
}

impl PreviewInput {
    /// The input as a single path string
    pub fn joined(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Fragments(parts) => parts.concat(),
        }
    }
}

impl From<&str> for PreviewInput {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for PreviewInput {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for PreviewInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_string_lossy().into_owned())
    }
}

impl From<Vec<String>> for PreviewInput {
    fn from(parts: Vec<String>) -> Self {
        Self::Fragments(parts)
    }
}

/// UI payload emitted by the preview node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewPayload {
    pub ui: PreviewUi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewUi {
    /// Resolved video path, which may not exist
    pub video: PathBuf,
}

impl PreviewPayload {
    pub fn video_path(&self) -> &Path {
        &self.ui.video
    }

    /// Serialize to the JSON the host UI consumes
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Video path relative to the host output root
    ///
    /// When the path is not under `output_root`, everything after the first
    /// component named `output` is used instead; failing that, the whole path.
    pub fn view_filename(&self, output_root: &Path) -> String {
        let video = self.video_path();

        let relative: Vec<String> = match video.strip_prefix(output_root) {
            Ok(rest) => components(rest),
            Err(_) => {
                let all = components(video);
                match all.iter().position(|c| c == "output") {
                    Some(at) => all[at + 1..].to_vec(),
                    None => all,
                }
            }
        };

        relative.join("/")
    }

    /// Query string for the host's `/view` endpoint
    pub fn view_query(&self, output_root: &Path) -> String {
        format!("filename={}", form_encode(&self.view_filename(output_root)))
    }
}

fn components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// `application/x-www-form-urlencoded` encoding of a single value
fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Resolves preview inputs to the canonical video of a pair
pub struct PairPreviewer {
    video_name: String,
    supported_formats: Vec<String>,
}

impl PairPreviewer {
    pub fn new(config: &LivePhotoConfig) -> Self {
        Self {
            video_name: config.video_name.clone(),
            supported_formats: config.supported_video_formats.clone(),
        }
    }

    /// Append the canonical video basename unless the path already ends with it
    pub fn resolve(&self, input: &PreviewInput) -> PathBuf {
        let joined = input.joined();
        if joined.ends_with(&self.video_name) {
            PathBuf::from(joined)
        } else {
            Path::new(&joined).join(&self.video_name)
        }
    }

    /// Build the UI payload; never fails
    ///
    /// A missing file is only logged, the UI still receives the path.
    pub fn preview(&self, input: &PreviewInput) -> PreviewPayload {
        let video = self.resolve(input);

        if !video.exists() {
            warn!("Video file not found: {}", video.display());
        } else if !self.is_supported(&video) {
            warn!("{} does not look like a playable video", video.display());
        }

        info!("Previewing video path: {}", video.display());
        PreviewPayload {
            ui: PreviewUi { video },
        }
    }

    /// Whether the file extension is one of the configured video formats
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.supported_formats.iter().any(|f| *f == ext)
            })
            .unwrap_or(false)
    }
}
