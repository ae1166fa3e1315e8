//! The six named scenarios this format's decoder is expected to handle,
//! driven end to end through the public `decompress` entry point.

use snappy_fox::{decompress, Config};

fn run(input: &[u8], config: &Config) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(input, &mut out, config)?;
    Ok(out)
}

#[test]
fn empty_valid_stream() {
    let input = [0xff, 0x06, 0x00, 0x00, b's', b'N', b'a', b'P', b'p', b'Y'];
    let out = run(&input, &Config::default()).unwrap();
    assert!(out.is_empty());
}

#[test]
fn single_literal_block() {
    let mut input = vec![0xff, 0x06, 0x00, 0x00];
    input.extend_from_slice(b"sNaPpY");
    // varint 10, tag 0x24 -> literal len 10, payload "hello, wor" (10 bytes)
    let body: &[u8] = &[0x0a, 0x24, b'h', b'e', b'l', b'l', b'o', b',', b' ', b'w', b'o', b'r'];
    let crc = snappy_fox::crc32::masked_crc32c(b"hello, wor", false);
    let mut payload = crc.to_le_bytes().to_vec();
    payload.extend_from_slice(body);
    push_compressed_chunk(&mut input, &payload);

    let out = run(&input, &Config::default()).unwrap();
    assert_eq!(out, b"hello, wor");
}

#[test]
fn self_overlapping_copy() {
    let mut input = vec![0xff, 0x06, 0x00, 0x00];
    input.extend_from_slice(b"sNaPpY");
    // varint 5, literal "x" (1 byte), copy length=4 offset=1.
    let body: &[u8] = &[0x05, 0x00, b'x', 0x01, 0x01];
    let crc = snappy_fox::crc32::masked_crc32c(b"xxxxx", false);
    let mut payload = crc.to_le_bytes().to_vec();
    payload.extend_from_slice(body);
    push_compressed_chunk(&mut input, &payload);

    let out = run(&input, &Config::default()).unwrap();
    assert_eq!(out, b"xxxxx");
}

#[test]
fn invalid_offset_with_substitution() {
    let mut input = vec![0xff, 0x06, 0x00, 0x00];
    input.extend_from_slice(b"sNaPpY");
    // literal "x", then a copy with offset 0 (invalid).
    let body: &[u8] = &[0x05, 0x00, b'x', 0x05, 0x00];
    // The stored CRC is irrelevant here since ignore_offset_errors changes
    // the produced bytes; compute it against what we expect to come out.
    let crc = snappy_fox::crc32::masked_crc32c(b"xAAAAA", false);
    let mut payload = crc.to_le_bytes().to_vec();
    payload.extend_from_slice(body);
    push_compressed_chunk(&mut input, &payload);

    let mut config = Config::default();
    config.ignore_offset_errors = true;
    config.offset_dummy_byte = b'A';
    let out = run(&input, &config).unwrap();
    assert_eq!(out, b"xAAAAA");
}

#[test]
fn crc_mismatch_non_fatal_by_default_fatal_when_considered() {
    let mut input = vec![0xff, 0x06, 0x00, 0x00];
    input.extend_from_slice(b"sNaPpY");
    let body: &[u8] = &[0x02, 0x04, b'a', b'b'];
    let mut payload = 0xdead_beefu32.to_le_bytes().to_vec();
    payload.extend_from_slice(body);
    push_compressed_chunk(&mut input, &payload);

    let out = run(&input, &Config::default()).unwrap();
    assert_eq!(out, b"ab");

    let mut config = Config::default();
    config.consider_crc_errors = true;
    assert!(run(&input, &config).is_err());
}

#[test]
fn magic_mismatch_fatal_by_default_accepted_when_ignored() {
    let mut input = vec![0xff, 0x06, 0x00, 0x00];
    input.extend_from_slice(b"XXXXXX");

    assert!(run(&input, &Config::default()).is_err());

    let mut config = Config::default();
    config.ignore_magic = true;
    let out = run(&input, &config).unwrap();
    assert!(out.is_empty());
}

fn push_compressed_chunk(input: &mut Vec<u8>, payload: &[u8]) {
    let len = payload.len() as u32;
    input.push(0x00);
    input.push((len & 0xff) as u8);
    input.push(((len >> 8) & 0xff) as u8);
    input.push(((len >> 16) & 0xff) as u8);
    input.extend_from_slice(payload);
}
