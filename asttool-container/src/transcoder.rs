//! PCM16 to ADPCM AST conversion.

use crate::decoder::AstDecoder;
use crate::encoder::{AstEncoder, AstEncoderConfig, EncodedAst};
use crate::error::Result;
use tracing::info;

/// Converts uncompressed AST containers into ADPCM ones
#[derive(Debug, Default)]
pub struct AstTranscoder {
    encoder: AstEncoder,
}

impl AstTranscoder {
    /// Create a transcoder writing with the given encoder.
    pub fn new(encoder: AstEncoder) -> Self {
        AstTranscoder { encoder }
    }

    /// Convert `input` and return the new container bytes.
    pub fn convert(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.convert_with_summary(input)?.into_bytes())
    }

    /// Like [`convert`](Self::convert), keeping the per-channel summaries.
    pub fn convert_with_summary(&self, input: &[u8]) -> Result<EncodedAst> {
        let stream = AstDecoder::decode(input)?;
        info!(
            channels = stream.num_channels(),
            sample_rate = stream.sample_rate(),
            samples = stream.num_samples(),
            looped = stream.is_looped(),
            "Transcoding PCM16 AST"
        );
        self.encoder.encode(&stream)
    }
}

impl From<AstEncoderConfig> for AstTranscoder {
    fn from(config: AstEncoderConfig) -> Self {
        AstTranscoder::new(AstEncoder::new(config))
    }
}
