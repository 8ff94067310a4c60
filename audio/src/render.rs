//! Offline rendering of a recorded score into stereo PCM.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rubato::{FftFixedInOut, Resampler};
use tracing::{debug, warn};

use crate::envelope::Adsr;
use crate::error::AudioError;
use crate::mix::MixParams;
use crate::score::Score;

const RESAMPLE_CHUNK_SIZE: usize = 1024;

/// Mixes the notes of a [`Score`] from in-memory mono sources.
///
/// Missing sources are skipped and reading past the end of a source
/// yields silence.
pub struct Renderer {
    sample_rate: u32,
    sources: HashMap<String, Vec<f32>>,
}

impl Renderer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            sources: HashMap::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Registers mono samples at the renderer's sample rate.
    pub fn add_source(&mut self, name: impl Into<String>, samples: Vec<f32>) {
        self.sources.insert(name.into(), samples);
    }

    /// Loads a WAV file, downmixing to mono and resampling to the
    /// renderer's rate, and registers it under `name`.
    pub fn load_wav(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let (samples, rate) = read_wav_mono(path.as_ref())?;
        let samples = if rate == self.sample_rate {
            samples
        } else {
            resample_mono(&samples, rate, self.sample_rate)?
        };
        let name = name.into();
        debug!(source = %name, samples = samples.len(), "source loaded");
        self.sources.insert(name, samples);
        Ok(())
    }

    /// Renders the score into interleaved stereo samples in `[-1, 1]`.
    pub fn render(&self, score: &Score) -> Vec<f32> {
        let sr = self.sample_rate as f64;
        let setups = score.setups();
        let notes = score.notes();

        let mut out: Vec<f32> = Vec::new();
        for note in &notes {
            let Some(on) = note.on else { continue };
            let Some(source) = self.sources.get(&note.source) else {
                warn!(source = %note.source, "source not loaded; note skipped");
                continue;
            };
            let (envelope, mix) = setups
                .get(&note.voice)
                .copied()
                .unwrap_or((Adsr::default(), MixParams::default()));

            let first = (note.offset * sr).round() as usize;
            if first >= source.len() {
                continue;
            }
            let available = source.len() - first;
            let length = match note.end(envelope.release) {
                Some(end) => (((end - on) * sr).round().max(0.0) as usize).min(available),
                None => available,
            };

            let start = (on * sr).round() as usize;
            let needed = (start + length) * 2;
            if out.len() < needed {
                out.resize(needed, 0.0);
            }

            let key_off = note.off.map(|off| Duration::from_secs_f64((off - on).max(0.0)));
            let (gain_l, gain_r) = mix.channel_gains();
            for i in 0..length {
                let t = Duration::from_secs_f64(i as f64 / sr);
                let s = source[first + i] * envelope.level(t, key_off);
                let frame = (start + i) * 2;
                out[frame] += s * gain_l;
                out[frame + 1] += s * gain_r;
            }
        }

        for s in out.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }
        out
    }

    /// Renders the score straight to a 16-bit stereo WAV file.
    pub fn render_to_wav(&self, score: &Score, path: impl AsRef<Path>) -> Result<usize, AudioError> {
        let samples = self.render(score);
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &s in &samples {
            writer.write_sample((s * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        Ok(samples.len() / 2)
    }
}

/// Reads a WAV file as mono f32 in `[-1, 1]`, returning the samples and
/// the file's sample rate.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };
    Ok((mono, spec.sample_rate))
}

/// Converts mono samples between sample rates.
pub fn resample_mono(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, AudioError> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK_SIZE, 1)?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as u64 * to as u64 / from as u64) as usize;

    let mut out = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK_SIZE);
    let mut pos = 0;
    while pos + resampler.input_frames_next() <= samples.len() {
        let n = resampler.input_frames_next();
        let chunk = [&samples[pos..pos + n]];
        let frames = resampler.process(&chunk[..], None)?;
        out.extend_from_slice(&frames[0]);
        pos += n;
    }
    // Flush the tail and the resampler's internal delay.
    let tail = [&samples[pos..]];
    let frames = resampler.process_partial(Some(&tail[..]), None)?;
    out.extend_from_slice(&frames[0]);
    while out.len() < expected + delay {
        let frames = resampler.process_partial::<&[f32]>(None, None)?;
        if frames[0].is_empty() {
            break;
        }
        out.extend_from_slice(&frames[0]);
    }

    let end = (delay + expected).min(out.len());
    Ok(out[delay.min(end)..end].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{EventKind, ScoreEvent};

    fn event(at: f64, voice: usize, kind: EventKind) -> ScoreEvent {
        ScoreEvent { at, voice, kind }
    }

    fn configure(voice: usize, release_ms: u64, pan: f32) -> ScoreEvent {
        event(
            0.0,
            voice,
            EventKind::Configure {
                envelope: Adsr::new(
                    Duration::ZERO,
                    Duration::ZERO,
                    1.0,
                    Duration::from_millis(release_ms),
                ),
                mix: MixParams::new(pan, 0.0),
            },
        )
    }

    fn bind(at: f64, voice: usize, source: &str, offset: f64) -> ScoreEvent {
        event(
            at,
            voice,
            EventKind::Bind {
                source: source.to_string(),
                offset,
            },
        )
    }

    #[test]
    fn test_render_single_note() {
        // 10 Hz rate keeps the arithmetic readable.
        let mut r = Renderer::new(10);
        r.add_source("a", vec![0.5; 20]);
        let score = Score::new(vec![
            configure(0, 0, -1.0),
            bind(0.0, 0, "a", 0.0),
            event(0.0, 0, EventKind::KeyOn),
            event(0.5, 0, EventKind::KeyOff),
        ]);
        let out = r.render(&score);
        assert_eq!(out.len(), 10);
        for frame in out.chunks(2) {
            assert!((frame[0] - 0.5).abs() < 1e-5);
            assert!(frame[1].abs() < 1e-5);
        }
    }

    #[test]
    fn test_render_offset_and_start() {
        let mut r = Renderer::new(10);
        r.add_source("ramp", (0..10).map(|i| i as f32 / 10.0).collect());
        let score = Score::new(vec![
            configure(0, 0, -1.0),
            bind(0.2, 0, "ramp", 0.5),
            event(0.2, 0, EventKind::KeyOn),
        ]);
        let out = r.render(&score);
        // Starts at frame 2, plays source[5..10] to the end of the source.
        assert_eq!(out.len(), 14);
        assert_eq!(out[0], 0.0);
        assert!((out[4] - 0.5).abs() < 1e-5);
        assert!((out[12] - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_render_stolen_voice_is_cut() {
        let mut r = Renderer::new(10);
        r.add_source("a", vec![0.25; 100]);
        r.add_source("b", vec![-0.25; 100]);
        let score = Score::new(vec![
            configure(0, 0, -1.0),
            bind(0.0, 0, "a", 0.0),
            event(0.0, 0, EventKind::KeyOn),
            bind(0.3, 0, "b", 0.0),
            event(0.3, 0, EventKind::KeyOn),
            event(0.6, 0, EventKind::KeyOff),
        ]);
        let out = r.render(&score);
        let left: Vec<f32> = out.chunks(2).map(|f| f[0]).collect();
        assert_eq!(left.len(), 6);
        assert!(left[..3].iter().all(|&s| (s - 0.25).abs() < 1e-5));
        assert!(left[3..].iter().all(|&s| (s + 0.25).abs() < 1e-5));
    }

    #[test]
    fn test_offset_past_end_is_silent() {
        let mut r = Renderer::new(10);
        r.add_source("short", vec![1.0; 5]);
        let score = Score::new(vec![
            bind(0.0, 0, "short", 3.0),
            event(0.0, 0, EventKind::KeyOn),
            bind(0.0, 1, "missing", 0.0),
            event(0.0, 1, EventKind::KeyOn),
        ]);
        assert!(r.render(&score).is_empty());
    }

    #[test]
    fn test_render_clamps() {
        let mut r = Renderer::new(10);
        r.add_source("loud", vec![0.9; 4]);
        let mut events = Vec::new();
        for v in 0..3 {
            events.push(configure(v, 0, -1.0));
            events.push(bind(0.0, v, "loud", 0.0));
            events.push(event(0.0, v, EventKind::KeyOn));
        }
        let out = r.render(&Score::new(events));
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn test_wav_roundtrip_and_resample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..8000 {
            w.write_sample(8192i16).unwrap();
            w.write_sample(8192i16).unwrap();
        }
        w.finalize().unwrap();

        let (mono, rate) = read_wav_mono(&path).unwrap();
        assert_eq!(rate, 8000);
        assert_eq!(mono.len(), 8000);
        assert!((mono[100] - 0.25).abs() < 1e-4);

        let mut r = Renderer::new(16000);
        r.load_wav("tone", &path).unwrap();
        let up = &r.sources["tone"];
        assert_eq!(up.len(), 16000);
        assert!((up[8000] - 0.25).abs() < 0.02);

        let out_path = dir.path().join("out.wav");
        let score = Score::new(vec![bind(0.0, 0, "tone", 0.0), event(0.0, 0, EventKind::KeyOn)]);
        let frames = r.render_to_wav(&score, &out_path).unwrap();
        assert_eq!(frames, 16000);
        assert_eq!(hound::WavReader::open(&out_path).unwrap().spec().channels, 2);
    }
}
