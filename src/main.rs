use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use livephoto_nodes::{
    audio::AudioAsset,
    check_dependencies,
    config::Config,
    frame::{Frame, ImageBatch},
    nodes::{NodeInputs, NodeOutput, NodeRegistry, NodeValue},
    preview::PreviewInput,
    VERSION,
};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Parser)]
#[command(
    name = "livephoto-nodes",
    version,
    about = "Create Live Photo pairs and wipe transitions from image frames",
    long_about = "Runs the Live Photo graph nodes from the command line: assemble a still + video pair from a frame sequence, preview a result directory, or render a before/after wipe between two images."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a Live Photo pair from frames
    Create {
        /// Frame files, or directories of frames, in playback order
        #[arg(short, long, num_args = 1.., required = true)]
        frames: Vec<PathBuf>,

        /// Index of the frame used as the still
        #[arg(short, long, default_value_t = 0)]
        key_frame: i64,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,

        /// Frame rate of the input frames
        #[arg(long)]
        fps: Option<f64>,

        /// Audio file to mux into the video
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Root for the timestamped result directory
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Root for the scratch directory
        #[arg(long)]
        temp_root: Option<PathBuf>,
    },

    /// Render a wipe transition between two images
    Transition {
        /// Image shown at the start
        #[arg(long)]
        image1: PathBuf,

        /// Image shown at the end
        #[arg(long)]
        image2: PathBuf,

        /// Number of frames to generate
        #[arg(short, long)]
        frames: Option<i64>,

        /// Nominal frame rate of the sequence
        #[arg(long)]
        fps: Option<f64>,

        /// Directory for frame_00000.png, frame_00001.png, ...
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Resolve a result directory to its video and print the UI payload
    Preview {
        /// Directory or video path; several values are concatenated
        #[arg(num_args = 1.., required = true)]
        path: Vec<String>,
    },

    /// Print the schemas of all registered nodes
    Nodes,

    /// Check that external tools are available
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Live Photo nodes v{}", VERSION);

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            debug!("Using default configuration");
            Config::default()
        }
    };

    match cli.command {
        Command::Create {
            frames,
            key_frame,
            duration,
            fps,
            audio,
            output_root,
            temp_root,
        } => {
            if let Some(root) = output_root {
                config.paths.output_root = root;
            }
            if let Some(root) = temp_root {
                config.paths.temp_root = root;
            }
            config.validate()?;

            let images = load_frames(&frames)?;
            info!("Loaded {} frames", images.len());

            let mut inputs = NodeInputs::new()
                .with("images", NodeValue::Image(images))
                .with("key_frame_index", NodeValue::Int(key_frame))
                .with(
                    "duration",
                    NodeValue::Float(duration.unwrap_or(config.live_photo.default_duration)),
                )
                .with(
                    "fps",
                    NodeValue::Float(fps.unwrap_or(config.live_photo.default_fps)),
                );
            if let Some(audio) = audio {
                inputs.insert("audio", NodeValue::Audio(AudioAsset::file(audio)));
            }

            let output = run_node(&config, "LivePhotoCreator", inputs).await?;
            if let NodeOutput::Values(values) = output {
                if let Some(dir) = values.get(2).and_then(|v| v.as_str()) {
                    println!("{}", dir);
                }
            }
        }

        Command::Transition {
            image1,
            image2,
            frames,
            fps,
            out,
        } => {
            config.validate()?;

            let inputs = NodeInputs::new()
                .with("image1", NodeValue::Image(load_frames(&[image1])?))
                .with("image2", NodeValue::Image(load_frames(&[image2])?))
                .with(
                    "frames",
                    NodeValue::Int(frames.unwrap_or(config.transition.default_frames as i64)),
                )
                .with(
                    "fps",
                    NodeValue::Float(fps.unwrap_or(config.transition.default_fps)),
                );

            let output = run_node(&config, "ImageCompareTransition", inputs).await?;
            let sequence = output
                .values()
                .and_then(|values| values.first())
                .and_then(|value| value.as_image())
                .context("Transition node produced no frames")?;

            write_sequence(sequence, &out)?;
            info!("Wrote {} frames to {:?}", sequence.len(), out);
        }

        Command::Preview { path } => {
            let input = if path.len() == 1 {
                PreviewInput::Path(path[0].clone())
            } else {
                PreviewInput::Fragments(path)
            };
            let inputs = NodeInputs::new().with("video", NodeValue::Video(input));

            let output = run_node(&config, "LivePhotoPreview", inputs).await?;
            let payload = output.ui().context("Preview node produced no UI payload")?;

            println!("{}", payload.to_json()?);
            debug!("View query: {}", payload.view_query(&config.paths.output_root));
        }

        Command::Nodes => {
            let registry = NodeRegistry::new(&config);
            println!("{}", serde_json::to_string_pretty(&registry.object_info())?);
        }

        Command::Check => {
            let missing = check_dependencies(&config);
            if !missing.is_empty() {
                for dependency in &missing {
                    warn!("Missing dependency: {}", dependency);
                }
                anyhow::bail!("Missing dependencies: {}", missing.join(", "));
            }
            info!("All dependencies available");
        }
    }

    Ok(())
}

/// Invoke a registered node on the blocking pool
async fn run_node(config: &Config, class_name: &str, inputs: NodeInputs) -> Result<NodeOutput> {
    let registry = NodeRegistry::new(config);
    let node = registry.create(class_name)?;
    info!("Running {}", node.display_name());

    let output = tokio::task::spawn_blocking(move || node.invoke(&inputs))
        .await
        .context("Node task panicked")?
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    Ok(output)
}

/// Load frame files and directories of frames into one batch
///
/// Directory entries are taken in file name order.
fn load_frames(paths: &[PathBuf]) -> Result<ImageBatch> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read frame directory {:?}", path))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_frame_file(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }

    anyhow::ensure!(!files.is_empty(), "No frames found in {:?}", paths);

    let frames = files
        .iter()
        .map(|file| Frame::open(file).with_context(|| format!("Failed to load frame {:?}", file)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ImageBatch::new(frames)?)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn write_sequence(sequence: &ImageBatch, out: &Path) -> Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {:?}", out))?;
    for (index, frame) in sequence.iter().enumerate() {
        frame.save_png(out.join(format!("frame_{:05}.png", index)))?;
    }
    Ok(())
}
