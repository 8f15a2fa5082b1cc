#![no_main]

use asttool_container::{read_blocks, AstDecoder, AstTranscoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are not
    if let Ok(header) = AstDecoder::read_header(data) {
        let _ = read_blocks(data, &header);
    }

    if let Ok(stream) = AstDecoder::decode(data) {
        assert!(stream.num_channels() >= 1 && stream.num_channels() <= 6);
        if let Some(region) = stream.loop_region() {
            assert!(region.end as usize <= stream.num_samples());
        }

        // keep the encoder's work bounded
        if stream.num_samples() <= 4096 {
            let _ = AstTranscoder::default().convert(data);
        }
    }
});
