use super::*;

use crate::internal;

use simple_sds::serialize;

use std::fs;

//-----------------------------------------------------------------------------

fn example_source() -> SequenceSource {
    let mut source = SequenceSource::new(1).unwrap();
    source.translate_segment("s1", b"GATTACA", 3).unwrap(); // 1..4
    source.translate_segment("chr2:100-200", b"CAT", 3).unwrap(); // 4..5
    source.translate_segment("third", b"ACGTACGTAC", 4).unwrap(); // 5..8
    source
}

const EXAMPLE_TRANSLATION: &str = "T\ts1\t1,2,3\nT\tchr2:100-200\t4\nT\tthird\t5,6,7\n";

fn parse(text: &str) -> Result<SegmentTranslation, SourceError> {
    read_translation(text.as_bytes())
}

fn check_parse_error(text: &str, expected_line: usize) {
    match parse(text) {
        Err(SourceError::Parse { line, .. }) => assert_eq!(line, expected_line, "Wrong error line for {:?}", text),
        Err(err) => panic!("Unexpected error for {:?}: {}", text, err),
        Ok(_) => panic!("Parsed invalid translation {:?}", text),
    }
}

//-----------------------------------------------------------------------------

#[test]
fn chunks() {
    assert_eq!(chunk_count(0, 3), 0, "Empty segments have no chunks");
    assert_eq!(chunk_count(6, 3), 2, "Wrong chunk count for an exact multiple");
    assert_eq!(chunk_count(7, 3), 3, "Wrong chunk count with a partial chunk");
    assert_eq!(chunk_count(2, 3), 1, "Wrong chunk count for a short segment");

    for max_length in 1..10 {
        for len in 0..50 {
            let ranges: Vec<Range<usize>> = chunk_ranges(len, max_length).collect();
            assert_eq!(ranges.len(), chunk_count(len, max_length), "Wrong number of ranges for {} / {}", len, max_length);
            let mut expected_start = 0;
            for range in ranges.iter() {
                assert_eq!(range.start, expected_start, "Ranges are not contiguous for {} / {}", len, max_length);
                assert!(!range.is_empty() && range.len() <= max_length, "Invalid range {:?} for {} / {}", range, len, max_length);
                expected_start = range.end;
            }
            assert_eq!(expected_start, len, "Ranges do not cover {} / {}", len, max_length);
        }
    }
}

#[test]
fn translation_map() {
    let source = example_source();
    let translation = source.translation();
    assert_eq!(translation.len(), 3, "Wrong number of segments");
    assert!(translation.contains("s1"), "Missing segment s1");
    assert!(!translation.contains("s2"), "Found a missing segment");
    assert_eq!(translation.get("third"), Some(5..8), "Wrong range for third");

    let sorted = translation.sorted();
    let expected: Vec<(&str, Range<usize>)> = vec![("s1", 1..4), ("chr2:100-200", 4..5), ("third", 5..8)];
    assert_eq!(sorted, expected, "Wrong sorted translation");
}

#[test]
fn inverse_translation() {
    let source = example_source();
    let inverse = source.translation().invert();
    assert!(inverse.segment(0).is_none(), "Found a segment for the endmarker");
    assert!(inverse.segment(8).is_none(), "Found a segment past the end");

    let expected = [
        (1, "s1", 0), (2, "s1", 3), (3, "s1", 6),
        (4, "chr2:100-200", 0),
        (5, "third", 0), (6, "third", 4), (7, "third", 8),
    ];
    for (node_id, name, offset) in expected {
        assert_eq!(inverse.locate(&source, node_id), Some((name, offset)), "Wrong location for node {}", node_id);
    }
}

#[test]
fn locate_in_mismatched_source() {
    let source = example_source();
    let inverse = source.translation().invert();
    let mut partial = SequenceSource::default();
    partial.add_node(5, b"ACGT").unwrap();
    assert_eq!(inverse.locate(&partial, 5), Some(("third", 0)), "Wrong location for the first node");
    assert_eq!(inverse.locate(&partial, 6), Some(("third", 4)), "Wrong location for the second node");
    assert!(inverse.locate(&partial, 7).is_none(), "Located a node after a missing node");
    assert!(inverse.locate(&partial, 3).is_none(), "Located a node without its predecessors");
}

#[test]
fn inverse_translation_with_gaps() {
    let mut source = SequenceSource::default();
    source.translate_segment("a", b"ACGT", 2).unwrap(); // 1..3
    source.add_node(10, b"GG").unwrap();
    source.translate_segment("b", b"TT", 2).unwrap(); // 11..12
    let inverse = source.translation().invert();
    assert_eq!(inverse.segment(2), Some(("a", 1..3)), "Wrong segment for node 2");
    assert!(inverse.segment(10).is_none(), "Raw nodes do not belong to segments");
    assert_eq!(inverse.segment(11), Some(("b", 11..12)), "Wrong segment for node 11");
}

//-----------------------------------------------------------------------------

#[test]
fn write_file_format() {
    let source = example_source();
    let mut output: Vec<u8> = Vec::new();
    write_translation(source.translation(), &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), EXAMPLE_TRANSLATION, "Wrong translation file contents");
}

#[test]
fn read_file_format() {
    let source = example_source();
    let translation = parse(EXAMPLE_TRANSLATION);
    assert!(translation.is_ok(), "Failed to parse the translation: {}", translation.unwrap_err());
    assert_eq!(&translation.unwrap(), source.translation(), "Wrong translation");

    let with_empty_lines = format!("\n{}\n", EXAMPLE_TRANSLATION);
    assert_eq!(&parse(&with_empty_lines).unwrap(), source.translation(), "Empty lines were not ignored");
}

#[test]
fn invalid_files() {
    check_parse_error("S\ts1\t1\n", 1);
    check_parse_error("T\ts1\n", 1);
    check_parse_error("T\ts1\t1\t2\n", 1);
    check_parse_error("T\ts1\t1\nT\ts2\tx\n", 2);
    check_parse_error("T\ts1\t1,3\n", 1);
    check_parse_error("T\ts1\t2,1\n", 1);
    check_parse_error("T\ts1\t\n", 1);
    check_parse_error("T\ts1\t1,2\nT\ts1\t3\n", 2);
    check_parse_error("T\ts1\t1,2,3\nT\ts2\t3,4\n", 2);
    check_parse_error("T\ts2\t3,4\nT\ts1\t1,2,3\n", 2);
    check_parse_error("T\ts1\t0\n", 1);
    check_parse_error("T\ts1\t0,1\n", 1);
    check_parse_error("T\ta\t18446744073709551615\n", 1);
    check_parse_error(&format!("T\ta\t1\nT\tb\t{},{}\n", SequenceSource::MAX_NODE_ID, SequenceSource::MAX_NODE_ID + 1), 2);
}

#[test]
fn file_round_trip() {
    let source = example_source();
    let filename = serialize::temp_file_name("gbz-source");
    let result = save_translation(source.translation(), &filename);
    assert!(result.is_ok(), "Failed to write translation to {}: {}", filename.display(), result.unwrap_err());

    let loaded = load_translation(&filename);
    assert!(loaded.is_ok(), "Failed to load translation from {}: {}", filename.display(), loaded.unwrap_err());
    assert_eq!(&loaded.unwrap(), source.translation(), "Wrong translation after round trip");

    let _ = fs::remove_file(&filename);
}

#[test]
fn test_data_translation() {
    let filename = crate::utils::get_test_data("translated.trans");
    let translation = load_translation(&filename);
    assert!(translation.is_ok(), "Failed to load {}: {}", filename.display(), translation.unwrap_err());
    let graph = internal::load_gfa("translated.gfa", &internal::chunked_params(4));
    assert_eq!(&translation.unwrap(), graph.source().translation(), "Translation does not match the graph");
}

//-----------------------------------------------------------------------------
