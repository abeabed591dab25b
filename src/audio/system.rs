//! Live audio output: a `cpal` stream pulling from the mix bus.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

use super::bus::MixBus;
use crate::error::AudioError;
use crate::params::AudioConfig;

/// Audio system owning the device stream and the shared mix bus
pub struct AudioSystem {
    bus: Arc<MixBus>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start streaming the bus
    pub fn new(config: &AudioConfig) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Config(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let bus = Arc::new(MixBus::new(config, sample_rate));
        let bus_render = Arc::clone(&bus);
        let bus_error = Arc::clone(&bus);

        let stream = device
            .build_output_stream(
                &supported.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    bus_render.render(data, channels);
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    bus_error.set_available(false);
                },
                None,
            )
            .map_err(|e| AudioError::Stream(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::Stream(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self {
            bus,
            _stream: stream,
        })
    }

    /// Shared mix bus the trigger engine writes into
    pub fn bus(&self) -> Arc<MixBus> {
        Arc::clone(&self.bus)
    }
}
