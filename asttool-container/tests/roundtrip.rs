//! Integration tests for asttool-container

use asttool_container::{
    block_count, read_blocks, total_container_size, AstDecoder, AstEncoder, AstEncoderConfig,
    AstError, AstTranscoder, AudioStream, FormatIssue, SampleFormat, StrmHeader, BLOCK_SIZE,
    STRM_HEADER_SIZE,
};
use proptest::prelude::*;

/// Helper to create a sine wave for testing
fn generate_sine_wave(sample_rate: u32, frequency: f64, len: usize, amplitude: f64) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()) as i16
        })
        .collect()
}

fn pcm_container(stream: &AudioStream) -> Vec<u8> {
    AstEncoder::new(AstEncoderConfig::pcm16())
        .encode(stream)
        .unwrap()
        .into_bytes()
}

#[test]
fn test_two_channel_scenario() {
    let left = generate_sine_wave(48000, 440.0, 100, 8000.0);
    let right = generate_sine_wave(48000, 660.0, 100, 8000.0);
    let stream = AudioStream::new(48000, vec![left, right]).unwrap();

    let adpcm = AstEncoder::default().encode(&stream).unwrap().data;
    let header = StrmHeader::parse(&adpcm).unwrap();
    let blocks = read_blocks(&adpcm, &header).unwrap();
    assert_eq!(blocks.len(), block_count(100));
    assert_eq!(header.data_size as usize, total_container_size(100, 2) - STRM_HEADER_SIZE);

    let pcm = pcm_container(&stream);
    let decoded = AstDecoder::decode(&pcm).unwrap();
    assert_eq!(decoded.num_channels(), 2);
    assert_eq!(decoded.sample_rate(), 48000);
    assert!(!decoded.is_looped());
    assert_eq!(decoded, stream);
}

#[test]
fn test_transcode_preserves_loop_bounds() {
    let samples = generate_sine_wave(32000, 440.0, 100, 4000.0);
    let stream = AudioStream::new(32000, vec![samples])
        .unwrap()
        .with_loop(10, 90)
        .unwrap();

    let output = AstTranscoder::default().convert(&pcm_container(&stream)).unwrap();
    let header = AstDecoder::read_header(&output).unwrap();
    assert_eq!(header.format, SampleFormat::Adpcm4);
    assert!(header.looped);
    assert_eq!(header.loop_start, 10);
    assert_eq!(header.loop_end, 90);
    assert_eq!(&output[0x0E..0x10], &[0xFF, 0xFF]);
}

#[test]
fn test_multi_block_transcode() {
    let len = 2 * 17920 + 1000;
    let channels = vec![
        generate_sine_wave(32000, 220.0, len, 6000.0),
        generate_sine_wave(32000, 330.0, len, 6000.0),
    ];
    let stream = AudioStream::new(32000, channels).unwrap();

    let output = AstTranscoder::default().convert(&pcm_container(&stream)).unwrap();
    assert_eq!(output.len(), total_container_size(len, 2));

    let header = StrmHeader::parse(&output).unwrap();
    let blocks = read_blocks(&output, &header).unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0].size as usize, BLOCK_SIZE);
    assert_eq!(blocks[1].size as usize, BLOCK_SIZE);
    assert_eq!(blocks[2].size, 576);
}

#[test]
fn test_decoder_rejections() {
    let stream = AudioStream::new(32000, vec![vec![1; 50]; 2]).unwrap();
    let pcm = pcm_container(&stream);

    let mut bad_magic = pcm.clone();
    bad_magic[3] = b'X';
    assert!(matches!(AstDecoder::decode(&bad_magic), Err(AstError::InvalidMagic)));

    let mut bad_size = pcm.clone();
    bad_size[7] ^= 0x01;
    assert!(matches!(
        AstDecoder::decode(&bad_size),
        Err(AstError::SizeMismatch { .. })
    ));

    let mut compressed = pcm.clone();
    compressed[0x09] = 0;
    assert!(matches!(
        AstDecoder::decode(&compressed),
        Err(AstError::UnsupportedFormat(FormatIssue::AlreadyEncoded))
    ));

    let mut seven = pcm.clone();
    seven[0x0D] = 7;
    assert!(matches!(
        AstDecoder::decode(&seven),
        Err(AstError::ChannelLimitExceeded(7))
    ));

    let mut odd = pcm;
    odd[STRM_HEADER_SIZE + 7] |= 0x01;
    assert!(matches!(
        AstDecoder::decode(&odd),
        Err(AstError::CorruptBlock { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The encoder fills exactly the buffer the size formula predicts, and the
    /// blocks it writes tile that buffer with no gap.
    #[test]
    fn container_size_matches_output(num_samples in 0usize..60_000, channels in 1usize..=6) {
        // silence keeps the codec search trivial
        let stream = AudioStream::new(32000, vec![vec![0i16; num_samples]; channels]).unwrap();
        let data = AstEncoder::default().encode(&stream).unwrap().data;
        prop_assert_eq!(data.len(), total_container_size(num_samples, channels));

        let header = StrmHeader::parse(&data).unwrap();
        let blocks = read_blocks(&data, &header).unwrap();
        prop_assert_eq!(blocks.len(), block_count(num_samples));
    }

    /// Block count never shrinks as the stream grows and is never zero.
    #[test]
    fn block_count_monotonic(num_samples in 1usize..5_000_000) {
        prop_assert!(block_count(num_samples) >= 1);
        prop_assert!(block_count(num_samples + 1) >= block_count(num_samples));
    }

    /// PCM16 containers give back the stream they were built from.
    #[test]
    fn pcm_roundtrip(
        channels in prop::collection::vec(prop::collection::vec(any::<i16>(), 64), 1..=6),
        sample_rate in 8000u32..96000,
        loop_bounds in prop::option::of((0u32..64, 0u32..64)),
    ) {
        let mut stream = AudioStream::new(sample_rate, channels).unwrap();
        if let Some((a, b)) = loop_bounds {
            stream = stream.with_loop(a.min(b), a.max(b)).unwrap();
        }

        let decoded = AstDecoder::decode(&pcm_container(&stream)).unwrap();
        prop_assert_eq!(decoded.num_channels(), stream.num_channels());
        prop_assert_eq!(decoded.sample_rate(), stream.sample_rate());
        prop_assert_eq!(decoded.is_looped(), stream.is_looped());
        prop_assert_eq!(decoded.loop_region(), stream.loop_region());
        prop_assert!(decoded.num_samples() >= stream.num_samples());
        prop_assert_eq!(decoded, stream);
    }
}
