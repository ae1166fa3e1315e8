/*!
The single error type shared by the block decoder and the frame parser.
*/

use std::fmt;
use std::io;

/// A convenient type alias for `Result<T, snappy_fox::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way decoding a Snappy block or frame stream can fail.
///
/// All variants can be converted to `std::io::Error` via `From`, so
/// callers driving a [`frame::Reader`] through the `std::io::Read`
/// contract see ordinary I/O errors.
///
/// [`frame::Reader`]: crate::frame::Reader
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The varint length prefix declared more bytes than `MAX_UNCOMPRESSED`
    /// allows, or a chunk length exceeded `MAX_COMPRESSED`.
    TooBig {
        /// The size that was declared or read.
        given: u64,
        /// The maximum allowed size.
        max: u64,
    },
    /// The caller-supplied output buffer is smaller than the declared
    /// uncompressed length of a block.
    BufferTooSmall {
        /// The size of the given output buffer.
        given: u64,
        /// The minimum size required.
        min: u64,
    },
    /// The varint length prefix itself is malformed (an overflowing shift,
    /// or the input ran out before a terminating byte was seen).
    Corrupt,
    /// A literal element's declared length doesn't fit in what's left of
    /// the compressed input or the decompression buffer.
    Literal {
        /// The literal length read from the tag.
        len: u64,
        /// Remaining bytes in the compressed input at the point of failure.
        src_len: u64,
        /// Remaining slots in the decompression buffer at the point of
        /// failure.
        dst_len: u64,
    },
    /// A copy element's offset/length fields run past the end of the
    /// compressed input.
    CopyRead {
        /// The number of trailer bytes the copy element needed.
        len: u64,
        /// Remaining bytes in the compressed input.
        src_len: u64,
    },
    /// A copy element's length would write past the decompression buffer.
    CopyWrite {
        /// The copy length.
        len: u64,
        /// Remaining slots in the decompression buffer.
        dst_len: u64,
    },
    /// A copy element's offset is zero or points before the start of the
    /// output buffer.
    Offset {
        /// The offset that was read.
        offset: u64,
        /// The current write position in the decompression buffer.
        dst_pos: u64,
    },
    /// A stream-header chunk type was expected but a different chunk type
    /// byte was read.
    StreamHeader {
        /// The chunk type byte that was read.
        byte: u8,
    },
    /// The magic stream-identifier payload didn't match what's expected.
    StreamHeaderMismatch {
        /// The bytes that were read instead.
        bytes: Vec<u8>,
    },
    /// An unskippable reserved chunk type (`0x02`..=`0x7F`) was seen.
    UnsupportedChunkType {
        /// The chunk type byte that was read.
        byte: u8,
    },
    /// A chunk declared a length inconsistent with its chunk type.
    UnsupportedChunkLength {
        /// The length that was read.
        len: u64,
        /// True if this occurred while reading the stream-identifier chunk.
        header: bool,
    },
    /// A recognized but unimplemented chunk type was seen (uncompressed
    /// data chunks, `0x01`; padding chunks, `0xFE`).
    Unimplemented {
        /// The chunk type byte that was read.
        byte: u8,
    },
    /// The masked CRC32C stored in a chunk didn't match the CRC32C of the
    /// bytes that were decoded from it.
    Checksum {
        /// The masked CRC32C read from the chunk header.
        expected: u32,
        /// The masked CRC32C computed over the decoded bytes.
        got: u32,
    },
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::TooBig { given, max } => write!(
                f,
                "snappy-fox: input (size = {}) is larger than allowed \
                 (size = {})",
                given, max
            ),
            Error::BufferTooSmall { given, min } => write!(
                f,
                "snappy-fox: output buffer (size = {}) is smaller than \
                 required (size = {})",
                given, min
            ),
            Error::Corrupt => write!(f, "snappy-fox: corrupt varint header"),
            Error::Literal { len, src_len, dst_len } => write!(
                f,
                "snappy-fox: corrupt input (expected literal read of \
                 length {}; remaining src: {}; remaining dst: {})",
                len, src_len, dst_len
            ),
            Error::CopyRead { len, src_len } => write!(
                f,
                "snappy-fox: corrupt input (expected copy trailer of \
                 length {}; remaining src: {})",
                len, src_len
            ),
            Error::CopyWrite { len, dst_len } => write!(
                f,
                "snappy-fox: corrupt input (expected copy write of \
                 length {}; remaining dst: {})",
                len, dst_len
            ),
            Error::Offset { offset, dst_pos } => write!(
                f,
                "snappy-fox: corrupt input (invalid copy offset {}; \
                 dst position: {})",
                offset, dst_pos
            ),
            Error::StreamHeader { byte } => write!(
                f,
                "snappy-fox: corrupt input (expected stream identifier \
                 chunk but got chunk type 0x{:02x})",
                byte
            ),
            Error::StreamHeaderMismatch { ref bytes } => write!(
                f,
                "snappy-fox: corrupt input (expected sNaPpY stream \
                 identifier but got {})",
                escape(bytes)
            ),
            Error::UnsupportedChunkType { byte } => write!(
                f,
                "snappy-fox: corrupt input (unskippable reserved chunk \
                 type: 0x{:02x})",
                byte
            ),
            Error::UnsupportedChunkLength { len, header: false } => write!(
                f,
                "snappy-fox: corrupt input (unsupported chunk length: {})",
                len
            ),
            Error::UnsupportedChunkLength { len, header: true } => write!(
                f,
                "snappy-fox: corrupt input (invalid stream header \
                 length: {})",
                len
            ),
            Error::Unimplemented { byte } => write!(
                f,
                "snappy-fox: unimplemented chunk type 0x{:02x} (uncompressed \
                 data and padding chunks are not supported)",
                byte
            ),
            Error::Checksum { expected, got } => write!(
                f,
                "snappy-fox: checksum mismatch (expected: 0x{:08x}, \
                 got: 0x{:08x})",
                expected, got
            ),
        }
    }
}

fn escape(bytes: &[u8]) -> String {
    use std::ascii::escape_default;
    bytes.iter().flat_map(|&b| escape_default(b)).map(|b| b as char).collect()
}
