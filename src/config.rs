/*!
The decoder's policy knobs, restructured as an immutable value passed by
reference into the decoder rather than process-wide mutable state.
*/

/// Decoder policy knobs.
///
/// Build one with [`Config::default`] and adjust the public fields
/// directly, or use the `cli` crate's flag parsing to build one from
/// command-line arguments. Once handed to a [`frame::Reader`] or the
/// [`decompress`] entry point, a `Config` is not mutated further.
///
/// [`frame::Reader`]: crate::frame::Reader
/// [`decompress`]: crate::decompress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Treat the input as a single bare block with no framing.
    pub unframed_stream: bool,
    /// On an invalid back-reference, substitute `offset_dummy_byte` bytes
    /// instead of aborting the block.
    pub ignore_offset_errors: bool,
    /// The byte value used by `ignore_offset_errors` substitution.
    pub offset_dummy_byte: u8,
    /// Accept the stream-identifier chunk even if its payload doesn't
    /// match the reference magic bytes.
    pub ignore_magic: bool,
    /// Seek the input forward by this many bytes before any framing parse.
    pub read_offset: u64,
    /// Promote a CRC mismatch from a warning to a fatal error.
    pub consider_crc_errors: bool,
    /// Use the non-inverting ("browser-compatible") CRC finalization.
    pub firefox_crc: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            unframed_stream: false,
            ignore_offset_errors: false,
            offset_dummy_byte: 0xff,
            ignore_magic: false,
            read_offset: 0,
            consider_crc_errors: false,
            firefox_crc: false,
        }
    }
}
