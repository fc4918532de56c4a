//! Integration tests for the full sfpack pipeline.
//!
//! These tests verify end-to-end behavior through the public API: text ->
//! table -> payload -> container bytes -> parse -> decode, with verification
//! that the output matches the input and that damaged containers fail.

use sfpack_core::{
    bits::{bits_to_bytes, bytes_to_bits},
    case_fold::{fold_case, unfold_case},
    container::HEADER_SIZE,
    decode, encode,
    shannon_fano::build,
    stats::Stats,
    Codec, Container, Error, ShannonFano,
};

const SAMPLE: &str = "The quick brown fox jumps over the lazy dog. \
    Pack my box with five dozen liquor jugs!";

/// Simple round-trip through the top-level functions.
#[test]
fn test_full_pipeline() {
    let text = SAMPLE.repeat(50);

    let packed = encode(&text).expect("encode failed");
    assert!(packed.len() < text.len(), "repetitive text should shrink");

    let unpacked = decode(&packed).expect("decode failed");
    assert_eq!(unpacked, text, "output doesn't match input");
}

/// Multi-byte characters are single symbols.
#[test]
fn test_unicode_symbols() {
    let text = "naïve café — 日本語のテキスト 😀😀😀 ✓";

    let table = build(text).unwrap();
    assert_eq!(table.total_quantity() as usize, text.chars().count());
    assert_eq!(table.get('😀').unwrap().quantity, 3);

    let packed = encode(text).unwrap();
    assert_eq!(decode(&packed).unwrap(), text);
}

/// The same text always produces the same container.
#[test]
fn test_encode_is_deterministic() {
    assert_eq!(encode(SAMPLE).unwrap(), encode(SAMPLE).unwrap());
}

/// Manual assembly from the lower layers matches `encode`.
#[test]
fn test_layers_compose() {
    let text = "abracadabra";

    let table = build(text).unwrap();
    let bits = table.encode(text).unwrap();
    let table_bytes = table.serialize();
    let payload = bits_to_bytes(&bits);

    let mut manual = Vec::new();
    manual.extend_from_slice(&(table_bytes.len() as u32).to_be_bytes());
    manual.extend_from_slice(&(bits.len() as u32).to_be_bytes());
    manual.extend_from_slice(&table_bytes);
    manual.extend_from_slice(&payload);

    assert_eq!(manual, encode(text).unwrap());

    // And back down again
    let mut unpacked = bytes_to_bits(&payload);
    unpacked.truncate(bits.len());
    assert_eq!(table.decode(&unpacked).unwrap(), text);
}

/// Truncating the payload by a byte is a corrupt stream, never short text.
#[test]
fn test_truncation_detected() {
    let mut packed = encode(SAMPLE).unwrap();
    packed.pop();

    let err = decode(&packed).expect_err("truncated container decoded");
    assert!(err.is_corrupt_stream(), "unexpected error: {err}");
}

/// Every cut point either fails or, for the untouched container, succeeds.
#[test]
fn test_every_truncation_fails() {
    let packed = encode("mississippi river").unwrap();

    for len in 0..packed.len() {
        let result = decode(&packed[..len]);
        assert!(result.is_err(), "prefix of {len} bytes decoded");
    }
    assert_eq!(decode(&packed).unwrap(), "mississippi river");
}

/// Header lengths past the end of the data are a malformed header.
#[test]
fn test_header_overrun() {
    let mut packed = encode(SAMPLE).unwrap();
    let body = (packed.len() - HEADER_SIZE) as u32;
    packed[0..4].copy_from_slice(&(body + 1).to_be_bytes());

    let err = decode(&packed).unwrap_err();
    assert!(err.is_malformed_header(), "unexpected error: {err}");
}

/// Flipping any single payload bit never panics.
#[test]
fn test_bit_flips_do_not_panic() {
    let packed = encode("abbbcc abbbcc").unwrap();
    let container = Container::parse(&packed).unwrap();
    let payload_start = packed.len() - container.payload.len();

    for byte in payload_start..packed.len() {
        for bit in 0..8 {
            let mut damaged = packed.clone();
            damaged[byte] ^= 1 << bit;
            // Either an error or some text; never a panic
            let _ = decode(&damaged);
        }
    }
}

/// A table built from one text cannot encode symbols it never saw.
#[test]
fn test_unknown_symbol_on_table_reuse() {
    let table = build("abc").unwrap();
    let err = table.encode("abcd").unwrap_err();
    assert!(matches!(err, Error::UnknownSymbol('d')));
}

/// Case folding composes with the codec as an explicit stage.
#[test]
fn test_case_folding_stage() {
    let text = "My Name Is Ted! And This Is My Text.";
    let folded = fold_case(text);

    let packed = encode(&folded).unwrap();
    let restored = unfold_case(&decode(&packed).unwrap());
    assert_eq!(restored, text);

    // The folded alphabet has no uppercase letters
    let table = build(&folded).unwrap();
    assert!(table.iter().all(|e| !e.symbol.is_uppercase()));
}

/// Stats reflect the container that was written.
#[test]
fn test_stats() {
    let text = SAMPLE.repeat(50);
    let codec: Codec<ShannonFano> = Codec::default();
    let container = codec.encode_container(&text).unwrap();
    let bytes = container.to_bytes().unwrap();

    let mut stats = Stats::new();
    stats.set_input(&text);
    stats.record(&container, bytes.len());
    stats.complete();

    assert_eq!(stats.input_symbols as usize, text.chars().count());
    assert_eq!(stats.encoded_symbols, stats.input_symbols);
    assert_eq!(
        stats.container_bytes,
        HEADER_SIZE as u64 + stats.table_bytes + stats.payload_bits.div_ceil(8)
    );
    assert!(stats.compression_ratio() > 0.0 && stats.compression_ratio() < 1.0);

    // No prefix code beats the entropy; for this text the codes stay within a bit of it
    assert!(stats.average_code_len >= stats.entropy);
    assert!(stats.average_code_len < stats.entropy + 1.0);
}

/// Concurrent codecs share nothing mutable.
#[test]
fn test_concurrent_round_trips() {
    let codec: Codec = Codec::default();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let codec = &codec;
            scope.spawn(move || {
                let text = format!("thread {i}: {}", SAMPLE.repeat(i + 1));
                let packed = codec.encode(&text).unwrap();
                assert_eq!(codec.decode(&packed).unwrap(), text);
            });
        }
    });
}
