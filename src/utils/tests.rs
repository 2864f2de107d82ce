use super::*;

//-----------------------------------------------------------------------------

#[test]
fn sequence_encoding() {
    let full_sequence = b"GATTACACACCAGATNNNNNACATTGAACCTTACACAGTCTGAC";
    for i in 0..full_sequence.len() {
        let sequence = &full_sequence[0..i];
        let encoded = encode_sequence(sequence);
        let decoded = decode_sequence(&encoded);
        assert_eq!(decoded, sequence, "Wrong sequence encoding for length {}", i);
    }
}

#[test]
fn base_normalization() {
    assert_eq!(normalize_base(b'a'), b'A', "Lower-case A was not normalized");
    assert_eq!(normalize_base(b'T'), b'T', "Upper-case T was changed");
    assert_eq!(normalize_base(b'R'), b'N', "IUPAC code was not converted to N");
    assert_eq!(normalize_base(b'-'), b'N', "Gap was not converted to N");

    let mixed = b"acgtRYN";
    let normalized: Vec<u8> = mixed.iter().map(|&b| normalize_base(b)).collect();
    assert_eq!(decode_sequence(&encode_sequence(mixed)), normalized, "Encoding does not agree with normalization");
}

//-----------------------------------------------------------------------------

#[test]
fn zigzag_differences() {
    let pairs = [(5, 5), (5, 6), (6, 5), (1, 1000), (1000, 1), (0, 0)];
    for (from, to) in pairs.iter() {
        let encoded = zigzag_diff(*from, *to);
        assert_eq!(zigzag_apply(*from, encoded), Some(*to), "Wrong result for ({}, {})", from, to);
    }
    assert_eq!(zigzag_diff(10, 11), 2, "Forward step should encode as 2");
    assert_eq!(zigzag_diff(10, 9), 1, "Backward step should encode as 1");
    assert_eq!(zigzag_apply(0, 1), None, "Negative result was accepted");
}

//-----------------------------------------------------------------------------

#[test]
fn size_units() {
    assert_eq!(human_readable_size(512), "512.000 B");
    assert_eq!(human_readable_size(2048), "2.000 KiB");
    assert_eq!(human_readable_size(3 * 1024 * 1024), "3.000 MiB");
}

#[test]
fn line_trimming() {
    let mut unix = b"chr1\n".to_vec();
    trim_line(&mut unix);
    assert_eq!(unix, b"chr1");
    let mut dos = b"chr1\r\n".to_vec();
    trim_line(&mut dos);
    assert_eq!(dos, b"chr1");
}

//-----------------------------------------------------------------------------
