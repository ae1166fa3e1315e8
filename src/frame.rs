/*!
The framing layer: a state machine over typed, length-prefixed chunks,
shaped as a `std::io::Read` adapter over an inner reader.

Every chunk is `1-byte type, 3-byte little-endian length, length bytes of
payload`. [`Reader`] dispatches on the type byte, decoding compressed-data
chunks through [`block::decode`] and feeding decoded bytes out through the
`Read` contract as the caller asks for them.
*/

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian as LE};
use log::{debug, warn};

use crate::block;
use crate::config::Config;
use crate::error::Error;
use crate::MAX_COMPRESSED;
use crate::MAX_UNCOMPRESSED;

/// Chunk type: the fixed stream-identifier record that must open a framed
/// stream.
pub const STREAM_IDENTIFIER: u8 = 0xff;
/// Chunk type: a compressed-data block.
pub const COMPRESSED_DATA: u8 = 0x00;
/// Chunk type: uncompressed data (recognized, not implemented).
pub const UNCOMPRESSED_DATA: u8 = 0x01;
/// Chunk type: padding (recognized, not implemented).
pub const PADDING: u8 = 0xfe;
/// The fixed 6-byte magic payload of the stream-identifier chunk.
pub const MAGIC: &[u8] = b"sNaPpY";

const CRC_LEN: usize = 4;

/// Wraps an inner reader, presenting the decoded contents of a framed
/// Snappy stream through the `std::io::Read` contract.
pub struct Reader<R> {
    inner: R,
    config: Config,
    seen_header: bool,
    pending: Vec<u8>,
    cdata: Vec<u8>,
    pos: usize,
    len: usize,
    /// A block decode error held back until the partial output already
    /// written into `pending` has been drained through `Read`.
    pending_error: Option<Error>,
}

impl<R: Read> Reader<R> {
    /// Wraps `inner`, decoding according to `config`.
    pub fn new(inner: R, config: Config) -> Reader<R> {
        Reader {
            inner,
            config,
            seen_header: false,
            pending: vec![0u8; MAX_UNCOMPRESSED],
            cdata: Vec::with_capacity(MAX_COMPRESSED),
            pos: 0,
            len: 0,
            pending_error: None,
        }
    }

    /// Reads one chunk header: `(type, length)`. Returns `None` on a clean
    /// end of stream (no bytes read before the type byte).
    fn read_chunk_header(&mut self) -> io::Result<Option<(u8, u32)>> {
        let mut type_byte = [0u8; 1];
        let n = self.inner.read(&mut type_byte)?;
        if n == 0 {
            return Ok(None);
        }
        let mut len_bytes = [0u8; 3];
        self.inner.read_exact(&mut len_bytes)?;
        let len = (len_bytes[0] as u32)
            | (len_bytes[1] as u32) << 8
            | (len_bytes[2] as u32) << 16;
        Ok(Some((type_byte[0], len)))
    }

    /// Advances past chunks that produce no output (the stream identifier,
    /// skippable reserved chunks) until either a compressed-data chunk has
    /// been decoded into `self.pending` or the stream ends.
    ///
    /// Returns `true` if `self.pending[..self.len]` now holds fresh bytes,
    /// `false` on clean end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        if let Some(err) = self.pending_error.take() {
            return Err(err.into());
        }
        loop {
            let (ctype, len) = match self.read_chunk_header()? {
                None => return Ok(false),
                Some(h) => h,
            };
            match ctype {
                STREAM_IDENTIFIER => {
                    if len as usize != MAGIC.len() {
                        return Err(Error::UnsupportedChunkLength {
                            len: len as u64,
                            header: true,
                        }
                        .into());
                    }
                    let mut payload = vec![0u8; MAGIC.len()];
                    self.inner.read_exact(&mut payload)?;
                    if !self.config.ignore_magic && payload != MAGIC {
                        return Err(Error::StreamHeaderMismatch { bytes: payload }.into());
                    }
                    self.seen_header = true;
                    debug!("snappy-fox: stream identifier verified");
                }
                COMPRESSED_DATA => {
                    if !self.seen_header {
                        return Err(Error::StreamHeader { byte: ctype }.into());
                    }
                    if (len as usize) < CRC_LEN {
                        return Err(Error::UnsupportedChunkLength {
                            len: len as u64,
                            header: false,
                        }
                        .into());
                    }
                    let clen = len as usize - CRC_LEN;
                    if clen > MAX_COMPRESSED {
                        return Err(Error::TooBig {
                            given: clen as u64,
                            max: MAX_COMPRESSED as u64,
                        }
                        .into());
                    }
                    let mut crc_bytes = [0u8; CRC_LEN];
                    self.inner.read_exact(&mut crc_bytes)?;
                    let expected_crc = LE::read_u32(&crc_bytes);

                    self.cdata.clear();
                    self.cdata.resize(clen, 0);
                    self.inner.read_exact(&mut self.cdata)?;

                    match block::decode(&self.cdata, &mut self.pending, &self.config) {
                        Ok(decoded) => {
                            if decoded.crc != expected_crc {
                                if self.config.consider_crc_errors {
                                    return Err(Error::Checksum {
                                        expected: expected_crc,
                                        got: decoded.crc,
                                    }
                                    .into());
                                }
                                warn!(
                                    "snappy-fox: checksum mismatch (expected \
                                     0x{:08x}, got 0x{:08x})",
                                    expected_crc, decoded.crc
                                );
                            }
                            self.pos = 0;
                            self.len = decoded.len;
                            return Ok(true);
                        }
                        Err((err, partial_len)) => {
                            // Flush the bytes already decoded before the
                            // failing element; the error itself surfaces
                            // once those bytes have been read out.
                            self.pos = 0;
                            self.len = partial_len;
                            if partial_len > 0 {
                                self.pending_error = Some(err);
                                return Ok(true);
                            }
                            return Err(err.into());
                        }
                    }
                }
                UNCOMPRESSED_DATA | PADDING => {
                    return Err(Error::Unimplemented { byte: ctype }.into());
                }
                0x80..=0xfd => {
                    let mut skip = vec![0u8; len as usize];
                    self.inner.read_exact(&mut skip)?;
                    debug!(
                        "snappy-fox: skipped reserved chunk type 0x{:02x} ({} bytes)",
                        ctype, len
                    );
                }
                _ => {
                    return Err(Error::UnsupportedChunkType { byte: ctype }.into());
                }
            }
        }
    }
}

impl<R: Read> Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.len {
                let n = (self.len - self.pos).min(buf.len());
                buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if !self.fill()? {
                return Ok(0);
            }
        }
    }
}
