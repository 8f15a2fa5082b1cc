//! Property-based tests for the ADPCM codec.

use asttool_adpcm::{decoded_len, encoded_size, AdpcmDecoder, AdpcmEncoder, SAMPLES_PER_FRAME};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The encoder writes exactly `encoded_size` bytes and the decoder gives
    /// back at least as many samples, padded up to a whole frame.
    #[test]
    fn sizes_match(samples in prop::collection::vec(any::<i16>(), 0..200)) {
        let encoded = AdpcmEncoder::new(&samples).encode_all().unwrap();
        prop_assert_eq!(encoded.len(), encoded_size(samples.len()));

        let decoded = AdpcmDecoder::new().decode_to_vec(&encoded).unwrap();
        prop_assert_eq!(decoded.len(), decoded_len(encoded.len()));
        prop_assert!(decoded.len() >= samples.len());
        prop_assert!(decoded.len() - samples.len() < SAMPLES_PER_FRAME);
    }

    /// The decoder reproduces the encoder's own reconstruction, so the peak
    /// error seen by the encoder is the real one.
    #[test]
    fn decoder_tracks_encoder(samples in prop::collection::vec(-12000i16..12000, 1..160)) {
        let mut encoder = AdpcmEncoder::new(&samples);
        let encoded = encoder.encode_all().unwrap();
        let decoded = AdpcmDecoder::new().decode_to_vec(&encoded).unwrap();

        let peak = samples
            .iter()
            .zip(&decoded)
            .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs())
            .max()
            .unwrap_or(0);
        prop_assert_eq!(peak, encoder.stats().peak_error);
    }

    /// Encoding in block-sized pieces is identical to encoding in one pass.
    #[test]
    fn split_encoding_is_stable(
        samples in prop::collection::vec(any::<i16>(), 1..300),
        frames_per_piece in 1usize..6,
    ) {
        let expected = AdpcmEncoder::new(&samples).encode_all().unwrap();

        let piece = frames_per_piece * SAMPLES_PER_FRAME;
        let mut encoder = AdpcmEncoder::new(&samples);
        let mut out = vec![0u8; expected.len()];
        let mut written = 0;
        let mut offset = 0;
        while offset < samples.len() {
            written += encoder.encode(&mut out[written..], offset, piece).unwrap();
            offset += piece;
        }

        prop_assert_eq!(written, expected.len());
        prop_assert_eq!(out, expected);
    }
}

#[test]
fn constant_signal_is_near_lossless() {
    let samples = vec![1234i16; 512];
    let mut encoder = AdpcmEncoder::new(&samples);
    let encoded = encoder.encode_all().unwrap();
    let decoded = AdpcmDecoder::new().decode_to_vec(&encoded).unwrap();

    // the predictor settles onto the level within a few frames
    assert!(decoded[4 * SAMPLES_PER_FRAME..].iter().all(|&s| s == 1234));
    assert!(encoder.stats().peak_error < 1234);
}
