//! Frame-level primitives shared by the encoder and decoder.

use crate::{ChannelState, COEFFICIENTS};

/// Decoded form of a frame's header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameHeader {
    /// Residual scale is `1 << scale_shift`.
    pub scale_shift: u8,
    /// Index into [`COEFFICIENTS`].
    pub coef_index: u8,
}

impl FrameHeader {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            scale_shift: byte >> 4,
            coef_index: byte & 0x0F,
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.scale_shift << 4) | (self.coef_index & 0x0F)
    }

    #[inline]
    pub fn scale(self) -> i32 {
        1 << self.scale_shift
    }

    #[inline]
    pub fn coefs(self) -> (i32, i32) {
        let [c1, c2] = COEFFICIENTS[self.coef_index as usize];
        (c1 as i32, c2 as i32)
    }
}

/// Prediction for the next sample, still in 4.11 fixed point.
#[inline]
pub(crate) fn predict(header: FrameHeader, state: ChannelState) -> i32 {
    let (c1, c2) = header.coefs();
    c1 * state.last as i32 + c2 * state.penult as i32
}

/// Reconstruct one sample and advance the state.
///
/// This is the only place the reconstruction formula lives; the encoder
/// quantises against it.
#[inline]
pub(crate) fn reconstruct(nibble: i32, header: FrameHeader, state: &mut ChannelState) -> i16 {
    let value = (((nibble * header.scale()) << 11) + predict(header, *state)) >> 11;
    let sample = value.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    state.push(sample);
    sample
}

/// Signed residual `index` (0..16) of a frame body.
#[inline]
pub(crate) fn nibble(body: &[u8], index: usize) -> i32 {
    let byte = body[index / 2];
    let raw = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
    // sign-extend 4 bits
    ((raw as i8) << 4 >> 4) as i32
}

/// Store residual `value` (-8..=7) at `index` of a frame body.
#[inline]
pub(crate) fn put_nibble(body: &mut [u8], index: usize, value: i32) {
    let raw = (value & 0x0F) as u8;
    let byte = &mut body[index / 2];
    if index % 2 == 0 {
        *byte = (*byte & 0x0F) | (raw << 4);
    } else {
        *byte = (*byte & 0xF0) | raw;
    }
}
