use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;

/// Something that can write itself out as a waveform file
pub trait AudioExport: Send + Sync {
    /// Write the audio to `path`
    fn export(&self, path: &Path) -> Result<()>;
}

impl<F> AudioExport for F
where
    F: Fn(&Path) -> Result<()> + Send + Sync,
{
    fn export(&self, path: &Path) -> Result<()> {
        self(path)
    }
}

/// Raw interleaved samples with optional rate metadata
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    /// Samples, interleaved when `channels > 1`
    pub samples: Vec<f32>,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Sample rate in Hz, if the source knows it
    pub sample_rate: Option<u32>,
}

impl AudioSamples {
    pub fn new(samples: Vec<f32>, channels: u16) -> Self {
        Self { samples, channels, sample_rate: None }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Duration in seconds at the given fallback rate
    pub fn duration(&self, default_sample_rate: u32) -> f64 {
        let rate = self.sample_rate.unwrap_or(default_sample_rate);
        if self.channels == 0 || rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (rate as f64 * self.channels as f64)
    }
}

/// Optional audio handed to the live photo node
///
/// Each variant is one way the asset can produce a waveform file; the
/// assembler dispatches on the variant.
#[derive(Clone)]
pub enum AudioAsset {
    /// An existing audio file, copied as is
    FilePath(PathBuf),

    /// An asset with a dedicated WAV exporter
    WavExportable(Arc<dyn AudioExport>),

    /// An asset with a generic save method
    Saveable(Arc<dyn AudioExport>),

    /// An asset with a generic write method
    Writable(Arc<dyn AudioExport>),

    /// Raw samples, written as a float WAV
    ArrayConvertible(AudioSamples),
}

impl AudioAsset {
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self::FilePath(path.into())
    }

    pub fn wav_exportable<E: AudioExport + 'static>(exporter: E) -> Self {
        Self::WavExportable(Arc::new(exporter))
    }

    pub fn saveable<E: AudioExport + 'static>(exporter: E) -> Self {
        Self::Saveable(Arc::new(exporter))
    }

    pub fn writable<E: AudioExport + 'static>(exporter: E) -> Self {
        Self::Writable(Arc::new(exporter))
    }

    /// Which capability this asset exposes
    pub fn capability(&self) -> AudioCapability {
        match self {
            Self::FilePath(_) => AudioCapability::FilePath,
            Self::WavExportable(_) => AudioCapability::WavExport,
            Self::Saveable(_) => AudioCapability::Save,
            Self::Writable(_) => AudioCapability::Write,
            Self::ArrayConvertible(_) => AudioCapability::Array,
        }
    }
}

impl fmt::Debug for AudioAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilePath(path) => f.debug_tuple("FilePath").field(path).finish(),
            Self::ArrayConvertible(samples) => f
                .debug_struct("ArrayConvertible")
                .field("len", &samples.samples.len())
                .field("channels", &samples.channels)
                .field("sample_rate", &samples.sample_rate)
                .finish(),
            other => write!(f, "{}", other.capability()),
        }
    }
}

/// Capability tag of an [`AudioAsset`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCapability {
    FilePath,
    WavExport,
    Save,
    Write,
    Array,
}

impl fmt::Display for AudioCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FilePath => "file path",
            Self::WavExport => "wav export",
            Self::Save => "save",
            Self::Write => "write",
            Self::Array => "array conversion",
        };
        f.write_str(name)
    }
}
