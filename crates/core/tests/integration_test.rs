//! Integration tests for the full huffpack pipeline.
//!
//! These tests verify end-to-end behavior: frequencies -> tree -> code table ->
//! pack -> frame -> parse -> unpack, with verification that output matches
//! input.

use huffpack_core::{
    bitio::{pack, unpack},
    codes::CodeTable,
    error::{CodecError, Error, HeaderError, TreeError},
    framing::{
        compress_symbols, compress_text, decompress_symbols, decompress_text, parse_frame,
        parse_header, serialize_frame, TRAILER_SIZE,
    },
    stats::CodingStats,
    tree::{build_tree, tally, FrequencyTable, Symbol},
};

/// Walk the pipeline stage by stage, the way a caller without the helpers would.
#[test]
fn test_full_pipeline_by_stage() {
    let input = "hello world! this is a test of the full pipeline with some repetition: aaaaaaaaaa bbbbbbbbbb cccccccccc";
    let symbols: Vec<Symbol> = input.chars().map(Symbol::from).collect();

    // Step 1: Tally and build the tree
    let freqs = tally(symbols.iter().copied());
    let tree = build_tree(&freqs).expect("tree build failed");
    assert_eq!(tree.weight(), symbols.len() as u64);

    // Step 2: Derive codes
    let table = CodeTable::from_tree(&tree);
    assert_eq!(table.len(), freqs.len());

    // Step 3: Pack and frame
    let packed = pack(&symbols, &table).expect("packing failed");
    assert_eq!(packed.total_bits, tree.weighted_path_length().unwrap());
    let frame_bytes = serialize_frame(&table, &packed);

    // Step 4: Parse and unpack
    let frame = parse_frame(&frame_bytes).expect("frame parsing failed");
    assert_eq!(frame.table, table);
    let decoded = frame.decode().expect("decoding failed");

    assert_eq!(decoded, symbols, "output doesn't match input");
}

/// Round trip across alphabet sizes from 1 to 1000 distinct symbols.
#[test]
fn test_round_trip_alphabet_sizes() {
    for distinct in [1u32, 2, 3, 7, 16, 255, 256, 1000] {
        let symbols: Vec<Symbol> = (0..distinct * 3)
            .map(|i| (i * 7 + i / 5) % distinct)
            .collect();
        let frame = compress_symbols(&symbols).unwrap();
        assert_eq!(decompress_symbols(&frame).unwrap(), symbols, "distinct = {}", distinct);
    }
}

#[test]
fn test_degenerate_single_symbol() {
    let freqs: FrequencyTable = [('x' as Symbol, 5)].into_iter().collect();
    let table = CodeTable::from_tree(&build_tree(&freqs).unwrap());
    assert_eq!(table.get('x' as Symbol).unwrap().to_string(), "0");

    let frame = compress_text("xxxxx").unwrap();
    assert_eq!(decompress_text(&frame).unwrap(), "xxxxx");
}

#[test]
fn test_empty_frequency_table() {
    assert!(matches!(
        build_tree(&FrequencyTable::new()),
        Err(Error::Tree(TreeError::EmptyInput))
    ));
}

#[test]
fn test_textbook_frequencies() {
    let freqs: FrequencyTable = [('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)]
        .into_iter()
        .map(|(c, w)| (c as Symbol, w))
        .collect();
    let tree = build_tree(&freqs).unwrap();
    let table = CodeTable::from_tree(&tree);

    assert_eq!(tree.weighted_path_length().unwrap(), 224);
    assert_eq!(table.weighted_length(&freqs).unwrap(), 224);
}

/// A header with two identical codes must be rejected before decoding.
#[test]
fn test_duplicate_code_header_rejected() {
    let good = compress_text("abcabcab").unwrap();
    let (_, header_len) = parse_header(&good).unwrap();
    let header = std::str::from_utf8(&good[..header_len]).unwrap();

    // Give 'b' the same code as 'a'
    let mut lines: Vec<String> = header.lines().map(String::from).collect();
    let a_code = lines[0].split('\t').nth(1).unwrap().to_string();
    lines[1] = format!("98\t{}", a_code);

    let mut forged = lines.join("\n").into_bytes();
    forged.push(b'\n');
    forged.extend_from_slice(&good[header_len..]);

    assert!(matches!(
        decompress_text(&forged),
        Err(Error::MalformedHeader(HeaderError::DuplicateCode { .. }))
    ));
}

/// Dropping the final payload byte must be detected, not decoded short.
#[test]
fn test_truncated_payload_detected() {
    let input = "The quick brown fox jumps over the lazy dog. ".repeat(20);
    let frame = compress_text(&input).unwrap();

    let trailer_start = frame.len() - TRAILER_SIZE;
    let mut truncated = frame[..trailer_start - 1].to_vec();
    truncated.extend_from_slice(&frame[trailer_start..]);

    assert!(matches!(
        decompress_text(&truncated),
        Err(Error::Codec(CodecError::TruncatedStream { .. }))
    ));
}

/// The final code length need not match the padding length.
#[test]
fn test_padding_longer_than_last_code() {
    // c=00, b=01, a=1: 13 bits, so 3 padding bits follow a 2-bit final code
    let frame = compress_text("aaaabbc").unwrap();
    let parsed = parse_frame(&frame).unwrap();
    let table = &parsed.table;
    let last_len = table.get('b' as Symbol).unwrap().len();

    let input = "aaaabbcab";
    let symbols: Vec<Symbol> = input.chars().map(Symbol::from).collect();
    let packed = pack(&symbols, table).unwrap();
    assert_ne!(8 - packed.last_byte_bits() as usize, last_len);

    let decoded = unpack(&packed.bytes, packed.total_bits, &table.trie().unwrap()).unwrap();
    assert_eq!(decoded, symbols);
}

#[test]
fn test_identical_input_identical_frames() {
    let input = "she sells sea shells by the sea shore";
    let frames: Vec<Vec<u8>> = (0..5).map(|_| compress_text(input).unwrap()).collect();
    assert!(frames.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_stats_follow_frame() {
    let input = "abracadabra alakazam";
    let symbols: Vec<Symbol> = input.chars().map(Symbol::from).collect();
    let freqs = tally(symbols.iter().copied());
    let table = CodeTable::from_tree(&build_tree(&freqs).unwrap());
    let packed = pack(&symbols, &table).unwrap();
    let frame_bytes = serialize_frame(&table, &packed);
    let frame = parse_frame(&frame_bytes).unwrap();

    let mut stats = CodingStats::new();
    stats.input_bytes = input.len() as u64;
    stats.record_code(&freqs, &table);
    stats.record_frame(frame.header_len, packed.total_bits, frame_bytes.len());
    stats.complete();

    assert_eq!(stats.symbols, symbols.len() as u64);
    assert_eq!(stats.payload_bytes, packed.bytes.len() as u64);
    assert_eq!(
        stats.header_bytes + stats.payload_bytes + TRAILER_SIZE as u64,
        stats.frame_bytes
    );
}
