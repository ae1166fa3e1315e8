/*!
A decompressor for the Snappy compressed-data format, specialized for the
variant embedded in a web browser's on-disk HTTP cache (its "morgue
cache"). This crate reads either a framed Snappy stream (a sequence of
typed, checksummed chunks introduced by a magic stream identifier) or a
bare unframed Snappy block, and emits the original uncompressed bytes.

Encoding is out of scope: there is no `compress` function anywhere in this
crate. See the `cli` workspace member for a command-line front end.

The core pieces:

- [`crc32`] — CRC32C (Castagnoli) checksumming with Snappy's masked
  finalization.
- [`varint`] — the little-endian base-128 length prefix used by a block's
  uncompressed-length header.
- [`block`] — the per-element tag decoder: literals and (possibly
  self-overlapping) back-reference copies.
- [`frame`] — the chunked stream format wrapping compressed blocks.
- [`config`] — the policy knobs controlling how strictly malformed input
  is rejected.
*/

#![deny(missing_docs)]

use std::io::{self, Read, Write};

/// The decoder policy knobs; re-exported for `Config::default()` callers
/// that don't need anything else from [`config`].
pub use crate::config::Config;
/// This crate's error type and result alias; re-exported for callers that
/// don't need anything else from [`error`].
pub use crate::error::{Error, Result};

/// The per-element tag decoder (literals and back-reference copies).
pub mod block;
/// The decoder policy knobs.
pub mod config;
/// CRC32C checksumming with Snappy's masked finalization.
pub mod crc32;
/// This crate's error type.
pub mod error;
/// The chunked framing layer.
pub mod frame;
/// The varint length-prefix codec.
pub mod varint;

/// The largest compressed block this crate will decode, matching the
/// reference Snappy block format's 32-bit length field restricted to
/// values that fit a signed 32-bit length after framing overhead
/// (`0xFFFFFF - 4`, the largest 3-byte chunk-length field minus the CRC).
pub const MAX_COMPRESSED: usize = 0xff_ffff - 4;

/// The largest uncompressed block this crate will produce from a single
/// compressed block, matching the morgue cache's fixed block size.
pub const MAX_UNCOMPRESSED: usize = 1 << 16;

/// Decompresses `input` into `output` according to `config`.
///
/// This is the generic, `Read`/`Write`-based entry point shared by every
/// front end: it performs the `read_offset` skip, then either decodes a
/// single unframed block ([`config::Config::unframed_stream`]) or drives a
/// [`frame::Reader`] over the rest of the input. Returns the number of
/// bytes written to `output`.
pub fn decompress<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    config: &Config,
) -> io::Result<u64> {
    if config.read_offset > 0 {
        io::copy(&mut (&mut input).take(config.read_offset), &mut io::sink())?;
    }
    if config.unframed_stream {
        let mut cdata = Vec::new();
        input.read_to_end(&mut cdata)?;
        let mut data = vec![0u8; MAX_UNCOMPRESSED];
        match block::decode_unframed(&cdata, &mut data, config) {
            Ok(decoded) => {
                output.write_all(&data[..decoded.len])?;
                Ok(decoded.len as u64)
            }
            Err((err, partial_len)) => {
                // The source's own partial-output behavior: whatever was
                // decoded before the failing element still reaches the
                // sink, even though the call as a whole errors out.
                output.write_all(&data[..partial_len])?;
                Err(err.into())
            }
        }
    } else {
        let mut reader = frame::Reader::new(input, config.clone());
        io::copy(&mut reader, &mut output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unframed_end_to_end() {
        // No varint length prefix: a literal tag directly.
        let cdata: &[u8] = &[0x04, b'a', b'b'];
        let mut config = Config::default();
        config.unframed_stream = true;
        let mut out = Vec::new();
        let n = decompress(cdata, &mut out, &config).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out, b"ab");
    }

    #[test]
    fn framed_end_to_end() {
        let mut input = vec![frame::STREAM_IDENTIFIER, 0x06, 0x00, 0x00];
        input.extend_from_slice(frame::MAGIC);
        let block_body: &[u8] = &[0x02, 0x04, b'a', b'b'];
        let crc = crc32::masked_crc32c(b"ab", false);
        let mut payload = crc.to_le_bytes().to_vec();
        payload.extend_from_slice(block_body);
        let len = payload.len() as u32;
        input.push(frame::COMPRESSED_DATA);
        input.push((len & 0xff) as u8);
        input.push(((len >> 8) & 0xff) as u8);
        input.push(((len >> 16) & 0xff) as u8);
        input.extend_from_slice(&payload);

        let config = Config::default();
        let mut out = Vec::new();
        let n = decompress(&input[..], &mut out, &config).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out, b"ab");
    }

    #[test]
    fn unframed_partial_output_is_flushed_before_the_error() {
        // No varint prefix in unframed mode: literal "ab", then a copy1
        // tag truncated before its offset byte.
        let cdata: &[u8] = &[0x04, b'a', b'b', 0x01];
        let mut config = Config::default();
        config.unframed_stream = true;
        let mut out = Vec::new();
        let err = decompress(cdata, &mut out, &config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(out, b"ab");
    }

    #[test]
    fn read_offset_skips_leading_bytes() {
        let mut config = Config::default();
        config.unframed_stream = true;
        config.read_offset = 4;
        let cdata: &[u8] = &[0xde, 0xad, 0xbe, 0xef, 0x04, b'a', b'b'];
        let mut out = Vec::new();
        let n = decompress(cdata, &mut out, &config).unwrap();
        assert_eq!(n, 2);
        assert_eq!(out, b"ab");
    }
}
