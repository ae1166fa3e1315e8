/*!
CRC32C (Castagnoli) checksumming with Snappy's "masked" finalization.

The table itself is generated at build time by `build.rs` into
`$OUT_DIR/crc32_table.rs`, rather than computed lazily at first use.
*/

include!(concat!(env!("OUT_DIR"), "/crc32_table.rs"));

/// The additive constant in Snappy's CRC mask: `rotr(crc, 15) + 0xA282EAD8`.
const MASK_DELTA: u32 = 0xa282ead8;

/// An incremental CRC32C accumulator over raw decompressed bytes.
///
/// Construct with [`Checksum::new`], feed bytes with [`Checksum::update`],
/// then call [`Checksum::finalize`] to get the masked CRC that Snappy
/// framing stores and compares against.
#[derive(Clone, Copy, Debug)]
pub struct Checksum {
    crc: u32,
}

impl Checksum {
    /// Start a new checksum.
    pub fn new() -> Checksum {
        Checksum { crc: !0 }
    }

    /// Feed more decompressed bytes into the running checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        let mut crc = self.crc;
        for &b in bytes {
            crc = TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.crc = crc;
    }

    /// Finalize the checksum, applying Snappy's CRC mask.
    ///
    /// When `firefox` is true, the standard XOR-invert step is skipped,
    /// matching the non-inverting finalization stored by the browser's
    /// morgue cache.
    pub fn finalize(self, firefox: bool) -> u32 {
        let crc = if firefox { self.crc } else { self.crc ^ !0 };
        crc.rotate_right(15).wrapping_add(MASK_DELTA)
    }
}

impl Default for Checksum {
    fn default() -> Checksum {
        Checksum::new()
    }
}

/// Compute the masked CRC32C of `bytes` in one call.
pub fn masked_crc32c(bytes: &[u8], firefox: bool) -> u32 {
    let mut sum = Checksum::new();
    sum.update(bytes);
    sum.finalize(firefox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3720_vectors() {
        assert_eq!(raw_crc32c(b"123456789"), 0xe3069283);
        assert_eq!(raw_crc32c(&[0; 32]), 0x8a9136aa);
        assert_eq!(raw_crc32c(&[0xff; 32]), 0x62a8ab43);
    }

    fn raw_crc32c(bytes: &[u8]) -> u32 {
        let mut sum = Checksum::new();
        sum.update(bytes);
        sum.crc ^ !0
    }

    #[test]
    fn masked_matches_known_value() {
        // Cross-checked against other Snappy-frame implementations
        // (e.g. the `snappy_framed` crate's own test vector).
        assert_eq!(
            masked_crc32c(b"aaaaaaaaaaaabbbbbbbaaaaaa", false),
            0x9274cda8
        );
    }

    #[test]
    fn firefox_variant_skips_invert() {
        let mut sum = Checksum::new();
        sum.update(b"hello");
        let raw = sum.crc;
        assert_eq!(
            sum.finalize(true),
            raw.rotate_right(15).wrapping_add(MASK_DELTA)
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut incremental = Checksum::new();
        incremental.update(b"hello, ");
        incremental.update(b"world");
        assert_eq!(
            incremental.finalize(false),
            masked_crc32c(b"hello, world", false)
        );
    }
}
