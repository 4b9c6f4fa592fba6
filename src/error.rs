use thiserror::Error;

/// Main error type for the Live Photo node library
#[derive(Error, Debug)]
pub enum LivePhotoError {
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Live photo assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Frame and image batch errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid frame dimensions: {details}")]
    InvalidDimensions { details: String },

    #[error("Channel count mismatch in batch: expected {expected}, found {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("Cannot squeeze leading batch dimension of size {len}")]
    NotSqueezable { len: usize },

    #[error("Failed to encode image {path}: {reason}")]
    EncodeFailed { path: String, reason: String },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeFailed { path: String, reason: String },
}

/// Wipe transition errors
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error("Frame count {frames} outside supported range {min}..={max}")]
    FrameCount { frames: u32, min: u32, max: u32 },

    #[error("Input image batch '{which}' is empty")]
    EmptyInput { which: String },
}

/// Audio extraction errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio source file not found: {path}")]
    SourceMissing { path: String },

    #[error("Audio export via {capability} failed: {reason}")]
    ExportFailed { capability: String, reason: String },

    #[error("Invalid audio samples: {details}")]
    InvalidSamples { details: String },
}

/// External encoder errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Video encoder binary not found: {binary}")]
    EncoderNotFound { binary: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Frame {index} is {found_width}x{found_height}, expected {width}x{height}")]
    FrameSizeMismatch {
        index: usize,
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },
}

/// Live photo assembly errors
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Image batch is empty")]
    EmptyBatch,

    #[error("Invalid assembly parameters: {details}")]
    InvalidParameters { details: String },

    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirFailed { path: String, reason: String },

    #[error("Failed to save output files: {path} is missing")]
    MissingOutput { path: String },
}

/// Node registry and invocation errors
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Unknown node class: {name}")]
    UnknownNode { name: String },

    #[error("Missing required input '{input}'")]
    MissingInput { input: String },

    #[error("Input '{input}' expected {expected}, got {found}")]
    TypeMismatch {
        input: String,
        expected: String,
        found: String,
    },

    #[error("Input '{input}' = {value} outside range {min}..={max}")]
    OutOfRange {
        input: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using LivePhotoError
pub type Result<T> = std::result::Result<T, LivePhotoError>;

impl LivePhotoError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            Self::Assembly(AssemblyError::OutputDirFailed { .. }) => true,
            Self::Audio(_) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::EncoderNotFound { binary }) => {
                format!("Could not run '{}'. Please install ffmpeg using your system package manager.", binary)
            }
            Self::Node(NodeError::UnknownNode { name }) => {
                format!("Node '{}' not found. Available nodes: LivePhotoCreator, LivePhotoPreview, ImageCompareTransition", name)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
