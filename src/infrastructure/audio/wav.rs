//! 16-bit PCM WAV chunk encoding
//!
//! Chunks are delivered while recording, so the total length is unknown
//! when the header goes out. The header carries `0xFFFFFFFF` in both size
//! fields, which readers treat as "until end of file"; concatenating every
//! chunk in order yields one playable file.

/// Size of the RIFF header in bytes
pub const WAV_HEADER_SIZE: usize = 44;

/// Length placeholder for streams of unknown size
pub const STREAMING_SIZE: u32 = u32::MAX;

pub const BITS_PER_SAMPLE: u16 = 16;

/// RIFF/WAVE header for a PCM stream of unknown length
pub fn streaming_header(sample_rate: u32, channels: u16) -> [u8; WAV_HEADER_SIZE] {
    let block_align = channels * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;

    let mut header = [0u8; WAV_HEADER_SIZE];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&STREAMING_SIZE.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&STREAMING_SIZE.to_le_bytes());
    header
}

/// Float samples in `[-1, 1]` as little-endian signed 16-bit PCM
pub fn encode_pcm16(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Average interleaved frames down to one channel
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let scale = 1.0 / channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_layout() {
        let header = streaming_header(16000, 1);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32_at(&header, 24), 16000);
        assert_eq!(u32_at(&header, 28), 32000);
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 2);
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 16);
    }

    #[test]
    fn header_sizes_are_open_ended() {
        let header = streaming_header(16000, 1);
        assert_eq!(u32_at(&header, 4), STREAMING_SIZE);
        assert_eq!(u32_at(&header, 40), STREAMING_SIZE);
    }

    #[test]
    fn pcm_is_clamped_little_endian() {
        let mut out = Vec::new();
        encode_pcm16(&[0.0, 1.0, -2.0], &mut out);
        assert_eq!(out.len(), 6);
        assert_eq!(i16::from_le_bytes([out[0], out[1]]), 0);
        assert_eq!(i16::from_le_bytes([out[2], out[3]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([out[4], out[5]]), -i16::MAX);
    }

    #[test]
    fn downmix_averages_frames() {
        let mono = downmix_to_mono(&[0.2, 0.8, 0.4, 0.6], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!((mono[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_mono_passthrough() {
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }
}
