/*!
The Snappy block decoder: the per-element tag dispatch, literal copies and
self-overlapping back-reference copies.

Two entry points mirror the two ways a block shows up on the wire:
[`decode`] parses the varint length prefix first, the way a
compressed-data frame chunk requires; [`decode_unframed`] skips that
prefix and runs the tag loop directly over the whole input, the way a
bare block is delivered with no framing at all.
*/

use byteorder::{ByteOrder, LittleEndian as LE};

use crate::config::Config;
use crate::crc32;
use crate::error::{Error, Result};
use crate::varint;
use crate::MAX_UNCOMPRESSED;

/// The result of successfully decoding one compressed block.
#[derive(Clone, Copy, Debug)]
pub struct Decoded {
    /// The number of bytes written to the output buffer.
    pub len: usize,
    /// The masked CRC32C of `data[..len]`.
    pub crc: u32,
}

/// Decodes a framed compressed-data chunk's body: a varint uncompressed
/// length followed by the tag-element stream.
///
/// `data` must be at least `MAX_UNCOMPRESSED` bytes; only `data[..len]` is
/// written to and included in the returned checksum. On error, the `usize`
/// alongside it is how many leading bytes of `data` were already decoded
/// before the failing element — the caller is expected to still make use
/// of that much output rather than discard it.
pub fn decode(
    cdata: &[u8],
    data: &mut [u8],
    config: &Config,
) -> std::result::Result<Decoded, (Error, usize)> {
    let (len64, header_len) = varint::read_length(cdata).ok_or((Error::Corrupt, 0))?;
    if len64 > MAX_UNCOMPRESSED as u64 {
        return Err((
            Error::TooBig { given: len64, max: MAX_UNCOMPRESSED as u64 },
            0,
        ));
    }
    if data.len() < len64 as usize {
        return Err((
            Error::BufferTooSmall { given: data.len() as u64, min: len64 },
            0,
        ));
    }
    let cap = len64 as usize;
    let len = decode_elements(&cdata[header_len..], data, cap, config)?;
    let crc = crc32::masked_crc32c(&data[..len], config.firefox_crc);
    Ok(Decoded { len, crc })
}

/// Decodes a bare, unframed block: no varint length prefix, tag elements
/// consumed directly with `MAX_UNCOMPRESSED` as the only capacity bound.
///
/// See [`decode`] for what the `usize` alongside an error means.
pub fn decode_unframed(
    cdata: &[u8],
    data: &mut [u8],
    config: &Config,
) -> std::result::Result<Decoded, (Error, usize)> {
    let cap = data.len().min(MAX_UNCOMPRESSED);
    let len = decode_elements(cdata, data, cap, config)?;
    let crc = crc32::masked_crc32c(&data[..len], config.firefox_crc);
    Ok(Decoded { len, crc })
}

/// The tag-dispatch loop shared by both entry points.
///
/// `cap` bounds both the write cursor and every element's length check; it
/// is the block's declared uncompressed length for framed blocks, or
/// `MAX_UNCOMPRESSED` for unframed ones. On error, the paired `usize` is
/// the write cursor's position just before the failing element, since
/// every element either writes fully or not at all.
fn decode_elements(
    cdata: &[u8],
    data: &mut [u8],
    cap: usize,
    config: &Config,
) -> std::result::Result<usize, (Error, usize)> {
    let clength = cdata.len();
    let mut cidx = 0usize;
    let mut idx = 0usize;

    while cidx < clength && idx < cap {
        let tag = cdata[cidx];
        match tag & 0x3 {
            0 => {
                cidx = decode_literal(cdata, cidx, clength, data, &mut idx, cap)
                    .map_err(|e| (e, idx))?;
            }
            1 => {
                if cidx + 2 > clength {
                    return Err((
                        Error::CopyRead { len: 1, src_len: (clength - cidx) as u64 },
                        idx,
                    ));
                }
                let length = (((tag >> 2) & 0x7) as usize) + 4;
                let offset =
                    (((tag & 0xe0) as usize) << 3) | cdata[cidx + 1] as usize;
                copy(data, &mut idx, cap, offset, length, config).map_err(|e| (e, idx))?;
                cidx += 2;
            }
            2 => {
                if cidx + 3 > clength {
                    return Err((
                        Error::CopyRead { len: 2, src_len: (clength - cidx) as u64 },
                        idx,
                    ));
                }
                let length = ((tag >> 2) as usize) + 1;
                let offset = LE::read_u16(&cdata[cidx + 1..cidx + 3]) as usize;
                copy(data, &mut idx, cap, offset, length, config).map_err(|e| (e, idx))?;
                cidx += 3;
            }
            3 => {
                if cidx + 5 > clength {
                    return Err((
                        Error::CopyRead { len: 4, src_len: (clength - cidx) as u64 },
                        idx,
                    ));
                }
                let length = ((tag >> 2) as usize) + 1;
                let offset = LE::read_u32(&cdata[cidx + 1..cidx + 5]) as usize;
                copy(data, &mut idx, cap, offset, length, config).map_err(|e| (e, idx))?;
                cidx += 5;
            }
            _ => unreachable!("tag & 0x3 is always in 0..=3"),
        }
    }
    Ok(idx)
}

/// Decodes one literal element starting at `cdata[cidx]`, writing into
/// `data[*idx..]`. Returns the compressed cursor position just past the
/// element on success.
fn decode_literal(
    cdata: &[u8],
    cidx: usize,
    clength: usize,
    data: &mut [u8],
    idx: &mut usize,
    cap: usize,
) -> Result<usize> {
    let code = (cdata[cidx] >> 2) as usize;
    let (length, extra) = if code < 60 {
        (code + 1, 0)
    } else {
        let extra = code - 59;
        if cidx + 1 + extra > clength {
            return Err(Error::Literal {
                len: 0,
                src_len: (clength.saturating_sub(cidx + 1)) as u64,
                dst_len: (cap - *idx) as u64,
            });
        }
        let mut raw: u64 = 0;
        for i in 0..extra {
            raw |= (cdata[cidx + 1 + i] as u64) << (8 * i as u64);
        }
        let length = raw.checked_add(1).ok_or(Error::Corrupt)? as usize;
        (length, extra)
    };

    let payload_start = cidx + 1 + extra;
    if payload_start.checked_add(length).map_or(true, |end| end > clength) {
        return Err(Error::Literal {
            len: length as u64,
            src_len: (clength.saturating_sub(payload_start)) as u64,
            dst_len: (cap - *idx) as u64,
        });
    }
    if *idx + length > cap {
        return Err(Error::Literal {
            len: length as u64,
            src_len: (clength - payload_start) as u64,
            dst_len: (cap - *idx) as u64,
        });
    }

    data[*idx..*idx + length]
        .copy_from_slice(&cdata[payload_start..payload_start + length]);
    *idx += length;
    Ok(payload_start + length)
}

/// Executes one back-reference copy element: validates the offset/length,
/// then either substitutes dummy bytes (`ignore_offset_errors`) or performs
/// the (possibly self-overlapping) copy.
fn copy(
    data: &mut [u8],
    idx: &mut usize,
    cap: usize,
    offset: usize,
    length: usize,
    config: &Config,
) -> Result<()> {
    let valid = offset > 0 && offset <= *idx && *idx + length <= cap;
    if !valid {
        if config.ignore_offset_errors {
            if *idx + length > data.len() {
                return Err(Error::CopyWrite {
                    len: length as u64,
                    dst_len: (data.len() - *idx) as u64,
                });
            }
            for b in &mut data[*idx..*idx + length] {
                *b = config.offset_dummy_byte;
            }
            *idx += length;
            return Ok(());
        }
        return Err(Error::Offset { offset: offset as u64, dst_pos: *idx as u64 });
    }

    // Self-overlapping copies must expand the O-byte pattern in O-sized
    // blocks rather than a single forward memcpy; `copy_within` performs a
    // possibly-overlapping copy safely, and advancing `*idx` after each
    // block is what makes the growing window correct.
    if offset >= length {
        let src_start = *idx - offset;
        data.copy_within(src_start..src_start + length, *idx);
        *idx += length;
    } else {
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(offset);
            let src_start = *idx - offset;
            data.copy_within(src_start..src_start + chunk, *idx);
            *idx += chunk;
            remaining -= chunk;
        }
    }
    Ok(())
}
