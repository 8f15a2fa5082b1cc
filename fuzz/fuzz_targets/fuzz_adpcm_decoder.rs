#![no_main]

use asttool_adpcm::{decoded_len, AdpcmDecoder, BYTES_PER_FRAME};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let whole = data.len() - data.len() % BYTES_PER_FRAME;
    let samples = AdpcmDecoder::new()
        .decode_to_vec(&data[..whole])
        .expect("whole frames always decode");
    assert_eq!(samples.len(), decoded_len(whole));

    // partial trailing frames are rejected
    if whole != data.len() {
        assert!(AdpcmDecoder::new().decode_to_vec(data).is_err());
    }
});
