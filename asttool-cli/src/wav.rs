//! RIFF/WAVE input: interleaved 16-bit PCM plus the first `smpl` loop.

use anyhow::{bail, ensure, Context, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Cursor;

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of a `WAVE_FORMAT_EXTENSIBLE` fmt body
const FMT_EXTENSIBLE_SIZE: usize = 40;
/// Offset of the SubFormat GUID, whose first two bytes hold the format tag
const FMT_SUBFORMAT: usize = 24;

/// Bytes of `smpl` chunk before the first loop record
const SMPL_HEADER_SIZE: usize = 36;
/// Offset of the loop count inside the `smpl` chunk
const SMPL_NUM_LOOPS: usize = 28;
/// Size of one `smpl` loop record
const SMPL_LOOP_SIZE: usize = 24;

/// A decoded WAV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavFile {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Deinterleaved samples, one buffer per channel
    pub channels: Vec<Vec<i16>>,
    /// Loop start and exclusive loop end from the `smpl` chunk
    pub loop_points: Option<(u32, u32)>,
}

/// A chunk borrowed from the file
struct Chunk<'a> {
    id: [u8; 4],
    data: &'a [u8],
}

/// Read the chunk at `offset`; returns it with the offset of the next chunk.
fn read_chunk(data: &[u8], offset: usize) -> Result<(Chunk<'_>, usize)> {
    let header = data
        .get(offset..offset + 8)
        .context("truncated RIFF chunk header")?;
    let mut id = [0u8; 4];
    id.copy_from_slice(&header[..4]);
    let size = LittleEndian::read_u32(&header[4..8]) as usize;

    let start = offset + 8;
    let body = data.get(start..start + size).with_context(|| {
        format!(
            "chunk '{}' claims {} bytes past the end of the file",
            String::from_utf8_lossy(&id),
            size
        )
    })?;

    // RIFF chunks are word-aligned
    let padded_size = (size + 1) & !1;
    Ok((Chunk { id, data: body }, start + padded_size))
}

struct Format {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn parse_format(data: &[u8]) -> Result<Format> {
    ensure!(data.len() >= 16, "fmt chunk too short ({} bytes)", data.len());

    let mut cursor = Cursor::new(data);
    let format_tag = cursor.read_u16::<LittleEndian>()?;
    let channels = cursor.read_u16::<LittleEndian>()?;
    let sample_rate = cursor.read_u32::<LittleEndian>()?;
    let _byte_rate = cursor.read_u32::<LittleEndian>()?;
    let _block_align = cursor.read_u16::<LittleEndian>()?;
    let bits_per_sample = cursor.read_u16::<LittleEndian>()?;

    match format_tag {
        WAVE_FORMAT_PCM => {}
        WAVE_FORMAT_EXTENSIBLE => {
            ensure!(
                data.len() >= FMT_EXTENSIBLE_SIZE,
                "extensible fmt chunk too short ({} bytes)",
                data.len()
            );
            let sub_format = LittleEndian::read_u16(&data[FMT_SUBFORMAT..FMT_SUBFORMAT + 2]);
            ensure!(
                sub_format == WAVE_FORMAT_PCM,
                "unsupported WAV sub-format {:#06x}, expected integer PCM",
                sub_format
            );
        }
        _ => bail!("unsupported WAV format tag {:#06x}, expected integer PCM", format_tag),
    }
    ensure!(
        bits_per_sample == 16,
        "unsupported WAV bit depth {}, expected 16",
        bits_per_sample
    );
    ensure!(channels > 0, "WAV file declares no channels");

    Ok(Format {
        channels,
        sample_rate,
        bits_per_sample,
    })
}

/// First loop of a `smpl` chunk, end made exclusive
fn parse_sampler_loop(data: &[u8]) -> Option<(u32, u32)> {
    let num_loops = LittleEndian::read_u32(data.get(SMPL_NUM_LOOPS..SMPL_NUM_LOOPS + 4)?);
    if num_loops == 0 {
        return None;
    }
    let record = data.get(SMPL_HEADER_SIZE..SMPL_HEADER_SIZE + SMPL_LOOP_SIZE)?;
    let start = LittleEndian::read_u32(&record[8..12]);
    let end = LittleEndian::read_u32(&record[12..16]);
    Some((start, end.saturating_add(1)))
}

impl WavFile {
    /// Parse a complete WAV file held in memory
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            bail!("not a RIFF/WAVE file");
        }

        let mut format = None;
        let mut pcm = None;
        let mut sampler_loop = None;

        let mut offset = 12;
        while offset + 8 <= data.len() {
            let (chunk, next) = read_chunk(data, offset)?;
            match &chunk.id {
                b"fmt " => format = Some(parse_format(chunk.data)?),
                b"data" => pcm = Some(chunk.data),
                b"smpl" => sampler_loop = parse_sampler_loop(chunk.data),
                _ => {}
            }
            offset = next;
        }

        let format = format.context("WAV file has no fmt chunk")?;
        let pcm = pcm.context("WAV file has no data chunk")?;

        let num_channels = format.channels as usize;
        let frame_size = num_channels * (format.bits_per_sample as usize / 8);
        let num_frames = pcm.len() / frame_size;

        let mut channels = vec![Vec::with_capacity(num_frames); num_channels];
        for frame in pcm.chunks_exact(frame_size) {
            for (channel, bytes) in channels.iter_mut().zip(frame.chunks_exact(2)) {
                channel.push(LittleEndian::read_i16(bytes));
            }
        }

        let loop_points = sampler_loop.map(|(start, end)| (start, end.min(num_frames as u32)));

        Ok(WavFile {
            sample_rate: format.sample_rate,
            channels,
            loop_points,
        })
    }

    /// Samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
pub(crate) fn build_wav(
    sample_rate: u32,
    channels: &[Vec<i16>],
    sampler_loop: Option<(u32, u32)>,
) -> Vec<u8> {
    use byteorder::WriteBytesExt;

    let num_channels = channels.len() as u16;
    let frames = channels[0].len();

    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");

    body.extend_from_slice(b"fmt ");
    body.write_u32::<LittleEndian>(16).unwrap();
    body.write_u16::<LittleEndian>(WAVE_FORMAT_PCM).unwrap();
    body.write_u16::<LittleEndian>(num_channels).unwrap();
    body.write_u32::<LittleEndian>(sample_rate).unwrap();
    body.write_u32::<LittleEndian>(sample_rate * 2 * num_channels as u32)
        .unwrap();
    body.write_u16::<LittleEndian>(2 * num_channels).unwrap();
    body.write_u16::<LittleEndian>(16).unwrap();

    if let Some((start, end)) = sampler_loop {
        body.extend_from_slice(b"smpl");
        body.write_u32::<LittleEndian>((SMPL_HEADER_SIZE + SMPL_LOOP_SIZE) as u32)
            .unwrap();
        body.extend_from_slice(&[0; SMPL_NUM_LOOPS]);
        body.write_u32::<LittleEndian>(1).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap(); // cue point id
        body.write_u32::<LittleEndian>(0).unwrap(); // forward loop
        body.write_u32::<LittleEndian>(start).unwrap();
        body.write_u32::<LittleEndian>(end).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();
        body.write_u32::<LittleEndian>(0).unwrap();
    }

    body.extend_from_slice(b"data");
    body.write_u32::<LittleEndian>((frames * 2 * channels.len()) as u32)
        .unwrap();
    for i in 0..frames {
        for channel in channels {
            body.write_i16::<LittleEndian>(channel[i]).unwrap();
        }
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
    out.extend_from_slice(&body);
    out
}
