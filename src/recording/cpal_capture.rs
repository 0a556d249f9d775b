//! Microphone capture to WAV using cpal
//!
//! cpal exposes no camera, so this backend only serves audio sessions.

use anyhow::{Context, Result as AnyResult};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use hound::{WavSpec, WavWriter};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::RecordingSettings;
use crate::recording::{CaptureDevices, MediaCapture, MediaKind};
use crate::{JournalError, Result};

type SharedWriter = Arc<Mutex<Option<WavWriter<std::io::BufWriter<std::fs::File>>>>>;

/// Capture devices of the default cpal host
pub struct CpalDevices {
    sample_rate: u32,
    channels: u16,
}

impl CpalDevices {
    pub fn new(settings: &RecordingSettings) -> Self {
        Self {
            sample_rate: settings.sample_rate,
            channels: settings.channels,
        }
    }
}

impl CaptureDevices for CpalDevices {
    fn request_access(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => cpal::default_host().default_input_device().is_some(),
            MediaKind::Video => false,
        }
    }

    fn open(&self, kind: MediaKind) -> Result<Box<dyn MediaCapture>> {
        match kind {
            MediaKind::Audio => Ok(Box::new(CpalCapture::new(self.sample_rate, self.channels))),
            MediaKind::Video => Err(JournalError::Permission(
                "no camera backend is available on this host".to_string(),
            )),
        }
    }
}

/// Audio capture using cpal (cross-platform)
pub struct CpalCapture {
    /// WAV writer
    writer: SharedWriter,

    /// Audio stream
    stream: Option<Stream>,

    /// Whether recording is active
    recording: Arc<AtomicBool>,

    /// Requested sample rate
    sample_rate: u32,

    /// Requested number of channels
    channels: u16,
}

impl CpalCapture {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            writer: Arc::new(Mutex::new(None)),
            stream: None,
            recording: Arc::new(AtomicBool::new(false)),
            sample_rate,
            channels,
        }
    }

    fn start_stream(&mut self, output_path: &Path) -> AnyResult<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .context("No input device available")?;

        tracing::info!(
            "cpal: Using audio device: {}",
            device.name().unwrap_or_default()
        );

        let supported_configs = device
            .supported_input_configs()
            .context("Failed to get supported configs")?;
        let config = find_suitable_config(supported_configs, self.sample_rate, self.channels)?;

        tracing::info!(
            "cpal: Audio config: {} Hz, {} channels, {:?}",
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let stream_config = StreamConfig {
            channels: config.channels(),
            sample_rate: config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        // The WAV header must describe what the device actually delivers
        let spec = WavSpec {
            channels: stream_config.channels,
            sample_rate: stream_config.sample_rate.0,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = WavWriter::create(output_path, spec)
            .with_context(|| format!("Failed to create WAV file: {}", output_path.display()))?;
        *self.writer.lock().unwrap_or_else(|e| e.into_inner()) = Some(writer);

        self.recording.store(true, Ordering::SeqCst);

        let writer = self.writer.clone();
        let recording = self.recording.clone();

        let stream = match config.sample_format() {
            SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, writer, recording)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, writer, recording)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, writer, recording)?,
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, writer, recording)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, writer, recording)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, writer, recording)?,
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, writer, recording)?,
            format => anyhow::bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start audio stream")?;
        self.stream = Some(stream);

        tracing::info!("cpal: Audio recording started");
        Ok(())
    }

    fn finish(&mut self) -> AnyResult<()> {
        self.recording.store(false, Ordering::SeqCst);

        // Dropping the stream releases the device
        self.stream.take();

        let writer = self
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(writer) = writer {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        tracing::info!("cpal: Audio recording stopped");
        Ok(())
    }
}

impl MediaCapture for CpalCapture {
    fn start(&mut self, output_path: &Path) -> Result<()> {
        self.start_stream(output_path).map_err(|e| {
            self.recording.store(false, Ordering::SeqCst);
            self.stream.take();
            JournalError::Capture(format!("{:#}", e))
        })
    }

    fn stop(&mut self) -> Result<()> {
        self.finish()
            .map_err(|e| JournalError::Capture(format!("{:#}", e)))
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn backend_name(&self) -> &'static str {
        "cpal"
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

/// Find a suitable audio configuration
fn find_suitable_config(
    configs: cpal::SupportedInputConfigs,
    target_sample_rate: u32,
    target_channels: u16,
) -> AnyResult<cpal::SupportedStreamConfig> {
    let configs: Vec<_> = configs.collect();
    let supports_rate = |config: &cpal::SupportedStreamConfigRange| {
        config.min_sample_rate().0 <= target_sample_rate
            && config.max_sample_rate().0 >= target_sample_rate
    };

    // Exact channel match first, then any config with the rate
    let matching = configs
        .iter()
        .find(|c| c.channels() == target_channels && supports_rate(*c))
        .or_else(|| configs.iter().find(|c| supports_rate(*c)));

    if let Some(config) = matching {
        return Ok(config
            .clone()
            .with_sample_rate(cpal::SampleRate(target_sample_rate)));
    }

    configs
        .into_iter()
        .next()
        .map(|c| c.with_max_sample_rate())
        .context("No supported audio configuration found")
}

/// Build an audio stream for a specific sample format
fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    writer: SharedWriter,
    recording: Arc<AtomicBool>,
) -> AnyResult<Stream>
where
    T: cpal::Sample + cpal::SizedSample + 'static,
    i16: cpal::FromSample<T>,
{
    let err_fn = |err| tracing::error!("Audio stream error: {}", err);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if !recording.load(Ordering::SeqCst) {
                return;
            }

            if let Ok(mut guard) = writer.lock() {
                if let Some(ref mut writer) = *guard {
                    for &sample in data {
                        let sample_i16: i16 = cpal::Sample::from_sample(sample);
                        if writer.write_sample(sample_i16).is_err() {
                            break;
                        }
                    }
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
