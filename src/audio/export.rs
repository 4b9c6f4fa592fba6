use std::path::Path;

use tracing::debug;

use crate::audio::types::{AudioAsset, AudioSamples};
use crate::error::{AudioError, Result};

/// Write an audio asset to a standalone waveform file at `dest`
///
/// `default_sample_rate` applies to raw sample arrays that carry no rate.
/// The file must exist afterwards, whatever route produced it.
pub fn extract_to_wav(asset: &AudioAsset, dest: &Path, default_sample_rate: u32) -> Result<()> {
    let capability = asset.capability();
    debug!("Extracting audio via {} to {:?}", capability, dest);

    match asset {
        AudioAsset::FilePath(source) => {
            if !source.exists() {
                return Err(AudioError::SourceMissing {
                    path: source.display().to_string(),
                }.into());
            }
            std::fs::copy(source, dest)?;
        }
        AudioAsset::WavExportable(exporter)
        | AudioAsset::Saveable(exporter)
        | AudioAsset::Writable(exporter) => {
            exporter.export(dest).map_err(|e| AudioError::ExportFailed {
                capability: capability.to_string(),
                reason: e.to_string(),
            })?;
        }
        AudioAsset::ArrayConvertible(samples) => {
            debug!(
                "Writing {:.2}s of raw audio ({} channels)",
                samples.duration(default_sample_rate), samples.channels
            );
            write_wav(samples, dest, default_sample_rate)?;
        }
    }

    if !dest.exists() {
        return Err(AudioError::ExportFailed {
            capability: capability.to_string(),
            reason: format!("{} was not written", dest.display()),
        }.into());
    }

    Ok(())
}

/// Write raw samples as a 32-bit float WAV file using hound
pub fn write_wav(samples: &AudioSamples, dest: &Path, default_sample_rate: u32) -> Result<()> {
    if samples.channels == 0 {
        return Err(AudioError::InvalidSamples {
            details: "zero channels".to_string(),
        }.into());
    }

    if samples.samples.len() % samples.channels as usize != 0 {
        return Err(AudioError::InvalidSamples {
            details: format!(
                "{} samples do not divide into {} channels",
                samples.samples.len(), samples.channels
            ),
        }.into());
    }

    let spec = hound::WavSpec {
        channels: samples.channels,
        sample_rate: samples.sample_rate.unwrap_or(default_sample_rate),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let wav_err = |e: hound::Error| AudioError::ExportFailed {
        capability: "array conversion".to_string(),
        reason: e.to_string(),
    };

    let mut writer = hound::WavWriter::create(dest, spec).map_err(wav_err)?;
    for &sample in &samples.samples {
        writer.write_sample(sample).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LivePhotoError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_file_path_is_copied() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.wav");
        std::fs::write(&source, b"RIFF").unwrap();

        let dest = dir.path().join("audio.wav");
        extract_to_wav(&AudioAsset::file(&source), &dest, 44100).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"RIFF");
    }

    #[test]
    fn test_missing_file_path_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let result = extract_to_wav(&AudioAsset::file(dir.path().join("nope.wav")), &dest, 44100);
        assert!(matches!(result, Err(LivePhotoError::Audio(AudioError::SourceMissing { .. }))));
    }

    #[test]
    fn test_writable_capability_is_invoked() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let asset = AudioAsset::writable(move |path: &Path| -> Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::fs::write(path, b"data")?;
            Ok(())
        });

        extract_to_wav(&asset, &dest, 44100).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dest.exists());
    }

    #[test]
    fn test_exporter_that_writes_nothing_fails() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let asset = AudioAsset::saveable(|_: &Path| -> Result<()> { Ok(()) });
        assert!(extract_to_wav(&asset, &dest, 44100).is_err());
    }

    #[test]
    fn test_exporter_error_is_wrapped() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let asset = AudioAsset::wav_exportable(|_: &Path| -> Result<()> {
            Err(crate::error::LivePhotoError::generic("codec unavailable"))
        });

        let err = extract_to_wav(&asset, &dest, 44100).unwrap_err();
        assert!(err.to_string().contains("wav export"));
        assert!(err.to_string().contains("codec unavailable"));
    }

    #[test]
    fn test_array_uses_default_sample_rate() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let samples = AudioSamples::new(vec![0.0, 0.5, -0.5, 0.25], 2);

        extract_to_wav(&AudioAsset::ArrayConvertible(samples), &dest, 44100).unwrap();

        let reader = hound::WavReader::open(&dest).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.channels, 2);
        let read: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, vec![0.0, 0.5, -0.5, 0.25]);
    }

    #[test]
    fn test_array_keeps_explicit_sample_rate() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("audio.wav");
        let samples = AudioSamples::new(vec![0.1; 8], 1).with_sample_rate(16000);

        write_wav(&samples, &dest, 44100).unwrap();
        assert_eq!(hound::WavReader::open(&dest).unwrap().spec().sample_rate, 16000);
    }

    #[test]
    fn test_ragged_samples_rejected() {
        let dir = tempdir().unwrap();
        let samples = AudioSamples::new(vec![0.1; 3], 2);
        assert!(write_wav(&samples, &dir.path().join("a.wav"), 44100).is_err());
    }
}
