// src/output.rs

//! cpal-backed audio sink.
//!
//! The producer thread pushes chunks into a ring buffer; the cpal callback
//! drains it one frame at a time, replicating the mono signal across the
//! device's channels. `write` blocks while the ring is full, which is what
//! paces the production loop; the wait is bounded so a stalled device fails
//! the write instead of wedging the producer thread.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, Stream, StreamConfig};
use log::warn;
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use std::thread;
use std::time::Duration;

use crate::sink::{AudioSink, SinkProvider, CHUNK_SIZE};

/// Opens sinks on the host's default (or a named) output device.
#[derive(Debug, Default, Clone)]
pub struct CpalSinkProvider {
    pub output_device_name: Option<String>,
}

impl SinkProvider for CpalSinkProvider {
    fn open(&self, sample_rate: u32) -> Result<Box<dyn AudioSink>> {
        let sink = CpalSink::open(self.output_device_name.as_deref(), sample_rate)?;
        Ok(Box::new(sink))
    }
}

struct CpalSink {
    producer: HeapProducer<i16>,
    // Held only to keep the device stream alive; dropped on stop.
    _stream: Stream,
}

impl CpalSink {
    fn open(device_name: Option<&str>, sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = if let Some(name) = device_name {
            host.output_devices()?
                .find(|d| d.name().ok().as_deref() == Some(name))
                .ok_or_else(|| anyhow::anyhow!("Output device not found: {}", name))?
        } else {
            host.default_output_device()
                .ok_or_else(|| anyhow::anyhow!("No default output device"))?
        };

        let default_config = device.default_output_config()?;
        let sample_format = default_config.sample_format();
        let mut config: StreamConfig = default_config.into();
        config.sample_rate = cpal::SampleRate(sample_rate);

        // Device-side buffer of two chunks, so one chunk can play while the
        // next is being produced.
        let rb = HeapRb::<i16>::new(CHUNK_SIZE * 2);
        let (producer, consumer) = rb.split();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer)?,
            format => return Err(anyhow::anyhow!("Unsupported sample format {}", format)),
        };
        stream.play()?;

        Ok(Self {
            producer,
            _stream: stream,
        })
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, chunk: &[i16]) -> Result<()> {
        push_with_backpressure(&mut self.producer, chunk, WRITE_STALL_TIMEOUT)
    }
}

// A healthy device drains a chunk in ~93 ms; a ring that stays full for
// this long means the callback stopped running (device disconnected or
// suspended).
const WRITE_STALL_TIMEOUT: Duration = Duration::from_millis(500);
const WRITE_POLL: Duration = Duration::from_millis(2);

/// Blocking push that paces the producer against the device callback.
///
/// Waiting on a full ring is bounded: once nothing has drained for
/// `stall_timeout`, returns an error so the producer loop exits cleanly
/// instead of hanging its `stop`.
fn push_with_backpressure(
    producer: &mut HeapProducer<i16>,
    chunk: &[i16],
    stall_timeout: Duration,
) -> Result<()> {
    let mut written = 0;
    let mut stalled = Duration::ZERO;
    while written < chunk.len() {
        let pushed = producer.push_slice(&chunk[written..]);
        written += pushed;
        if written == chunk.len() {
            break;
        }
        if pushed > 0 {
            stalled = Duration::ZERO;
        } else if stalled >= stall_timeout {
            return Err(anyhow::anyhow!("output device stopped draining the stream"));
        }
        thread::sleep(WRITE_POLL);
        stalled += WRITE_POLL;
    }
    Ok(())
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut consumer: HeapConsumer<i16>,
) -> Result<Stream>
where
    T: Sample + cpal::SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let err_fn = |err| warn!("output stream error: {}", err);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                // Underrun plays silence rather than stale samples.
                let sample = consumer.pop().unwrap_or(0);
                for out in frame.iter_mut() {
                    *out = T::from_sample(sample);
                }
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_completes_when_the_ring_has_room() {
        let rb = HeapRb::<i16>::new(CHUNK_SIZE * 2);
        let (mut producer, _consumer) = rb.split();
        let chunk = vec![7i16; CHUNK_SIZE];
        push_with_backpressure(&mut producer, &chunk, Duration::from_millis(10)).unwrap();
        assert_eq!(producer.free_len(), CHUNK_SIZE);
    }

    #[test]
    fn push_gives_up_once_the_ring_stays_full() {
        let rb = HeapRb::<i16>::new(4);
        let (mut producer, mut consumer) = rb.split();
        push_with_backpressure(&mut producer, &[0; 4], Duration::from_millis(10)).unwrap();
        assert!(producer.is_full());

        // Nothing drains the ring: the write must error out rather than
        // spin forever.
        let stalled = push_with_backpressure(&mut producer, &[0; 4], Duration::from_millis(10));
        assert!(stalled.is_err());

        // A draining consumer revives the stream.
        consumer.pop_slice(&mut [0i16; 4]);
        push_with_backpressure(&mut producer, &[0; 4], Duration::from_millis(10)).unwrap();
    }
}
