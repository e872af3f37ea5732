//! Alarm tone synthesis and 16-bit PCM WAV encoding.

use std::io::{self, Write};

/// Length of one repetition of the alarm pattern.
pub const PATTERN_SECS: f32 = 2.0;

const PRIMARY_HZ: f32 = 800.0;
const SECONDARY_HZ: f32 = 1000.0;
const AMPLITUDE: f32 = 0.3;
const FADE_SECS: f32 = 0.01;

/// Beeps in the pattern: (start, end, frequency).
const BEEPS: [(f32, f32, f32); 3] = [
    (0.0, 0.3, PRIMARY_HZ),
    (0.5, 0.8, SECONDARY_HZ),
    (1.0, 1.3, PRIMARY_HZ),
];

fn to_pcm(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Linear fade-in/out over the first and last `fade` samples of a span.
fn envelope(pos: usize, len: usize, fade: usize) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    let from_end = len.saturating_sub(pos);
    if pos < fade {
        pos as f32 / fade as f32
    } else if from_end < fade {
        from_end as f32 / fade as f32
    } else {
        1.0
    }
}

/// Three short beeps (800 Hz, 1000 Hz, 800 Hz) over a two-second window.
pub fn alarm_pattern(sample_rate: u32) -> Vec<i16> {
    let rate = sample_rate as f32;
    let total = (rate * PATTERN_SECS) as usize;
    let fade = (rate * FADE_SECS) as usize;
    let mut samples = vec![0i16; total];

    for (start, end, freq) in BEEPS {
        let first = (start * rate) as usize;
        let last = ((end * rate) as usize).min(total);
        let len = last.saturating_sub(first);
        for (pos, slot) in samples[first..last].iter_mut().enumerate() {
            let t = (first + pos) as f32 / rate;
            let wave = (2.0 * std::f32::consts::PI * freq * t).sin();
            *slot = to_pcm(wave * envelope(pos, len, fade) * AMPLITUDE);
        }
    }
    samples
}

/// A plain sine tone, used to check audio output.
pub fn simple_tone(sample_rate: u32, frequency: f32, secs: f32) -> Vec<i16> {
    let rate = sample_rate as f32;
    let total = (rate * secs) as usize;
    let fade = (rate * FADE_SECS) as usize;
    (0..total)
        .map(|i| {
            let t = i as f32 / rate;
            let wave = (2.0 * std::f32::consts::PI * frequency * t).sin();
            to_pcm(wave * envelope(i, total, fade) * AMPLITUDE)
        })
        .collect()
}

/// Write mono 16-bit little-endian PCM as a RIFF/WAVE stream.
pub fn write_wav<W: Write>(mut out: W, samples: &[i16], sample_rate: u32) -> io::Result<()> {
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = (samples.len() * 2) as u32;

    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_len).to_le_bytes())?;
    out.write_all(b"WAVE")?;

    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?; // PCM
    out.write_all(&CHANNELS.to_le_bytes())?;
    out.write_all(&sample_rate.to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&BITS.to_le_bytes())?;

    out.write_all(b"data")?;
    out.write_all(&data_len.to_le_bytes())?;
    for sample in samples {
        out.write_all(&sample.to_le_bytes())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_has_two_seconds_of_audio() {
        let samples = alarm_pattern(22_050);
        assert_eq!(samples.len(), 44_100);
    }

    #[test]
    fn pattern_is_silent_between_beeps() {
        let rate = 8_000;
        let samples = alarm_pattern(rate);
        let gap = &samples[(0.35 * rate as f32) as usize..(0.45 * rate as f32) as usize];
        assert!(gap.iter().all(|s| *s == 0));
        let tail = &samples[(1.4 * rate as f32) as usize..];
        assert!(tail.iter().all(|s| *s == 0));
    }

    #[test]
    fn pattern_respects_amplitude_and_fades_in() {
        let samples = alarm_pattern(22_050);
        let limit = (AMPLITUDE * i16::MAX as f32) as i16 + 1;
        assert!(samples.iter().all(|s| s.abs() <= limit));
        assert_eq!(samples[0], 0);
        assert!(samples[..2_000].iter().any(|s| s.abs() > limit / 2));
    }

    #[test]
    fn wav_header_describes_mono_16_bit() {
        let samples = simple_tone(8_000, 440.0, 0.5);
        let mut bytes = Vec::new();
        write_wav(&mut bytes, &samples, 8_000).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            8_000
        );
        assert_eq!(u16::from_le_bytes([bytes[34], bytes[35]]), 16);
        assert_eq!(bytes.len(), 44 + samples.len() * 2);
    }
}
