use proptest::prelude::*;
use rle::{decode, decode_to_vec, encode, encode_to_vec, CodecError, MAX_LITERAL_LEN, MAX_RUN_LEN};

/// Walk the frames of an encoded stream, returning `(tag, payload_len)` pairs.
fn frames(encoded: &[u8]) -> Vec<(u8, usize)> {
    let mut out = vec![];
    let mut pos = 0;
    while pos < encoded.len() {
        let tag = encoded[pos];
        let payload = if tag < 0x80 { 1 } else { 0x100 - tag as usize };
        out.push((tag, payload));
        pos += 1 + payload;
    }
    assert_eq!(pos, encoded.len(), "last frame overruns the stream");
    out
}

#[test]
fn empty_input() {
    let mut out = vec![];
    encode(&b""[..], &mut out).unwrap();
    assert!(out.is_empty());

    let mut out = vec![];
    decode(&b""[..], &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn greedy_tie_break() {
    assert_eq!(encode_to_vec(&[0x41, 0x41, 0x41]), [0x03, 0x41]);
}

#[test]
fn minimum_run_trigger() {
    assert_eq!(
        encode_to_vec(&[0x01, 0x02, 0x02, 0x03]),
        [0xFF, 0x01, 0x02, 0x02, 0xFF, 0x03]
    );
}

#[test]
fn max_length_split() {
    assert_eq!(encode_to_vec(&[0x5A; 200]), [0x7F, 0x5A, 0x49, 0x5A]);
}

#[test]
fn truncation_detection() {
    let err = decode_to_vec(&[0x03]).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedStream { .. }));
}

#[test]
fn sentinel_is_optional() {
    let data = b"aaaaaabcdefgggggggggggggggggh";
    let mut encoded = encode_to_vec(data);
    assert_eq!(decode_to_vec(&encoded).unwrap(), data);
    encoded.push(0x00);
    assert_eq!(decode_to_vec(&encoded).unwrap(), data);
}

#[test]
fn stream_api_matches_slice_api() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i / 7 % 5) as u8).collect();
    let mut encoded = vec![];
    encode(std::io::BufReader::with_capacity(3, &data[..]), &mut encoded).unwrap();
    assert_eq!(encoded, encode_to_vec(&data));

    let mut decoded = vec![];
    decode(std::io::BufReader::with_capacity(5, &encoded[..]), &mut decoded).unwrap();
    assert_eq!(decoded, data);
}

fn runny_bytes() -> impl Strategy<Value = Vec<u8>> {
    // short alphabets and long repeats exercise both frame kinds and the limits
    prop::collection::vec((0u8..4, 1usize..300), 0..12).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat(byte).take(len))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_roundtrip(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        let encoded = encode_to_vec(&data);
        prop_assert_eq!(decode_to_vec(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_roundtrip_runs(data in runny_bytes()) {
        let encoded = encode_to_vec(&data);
        prop_assert_eq!(decode_to_vec(&encoded).unwrap(), data);
    }

    #[test]
    fn prop_frame_bounds(data in runny_bytes()) {
        let encoded = encode_to_vec(&data);
        for (tag, payload) in frames(&encoded) {
            prop_assert_ne!(tag, 0);
            if tag < 0x80 {
                prop_assert!(tag as usize <= MAX_RUN_LEN);
            } else {
                prop_assert!((1..=MAX_LITERAL_LEN).contains(&payload));
            }
        }
    }

    #[test]
    fn prop_pairs_always_become_runs(data in prop::collection::vec(0u8..3, 0..512)) {
        let encoded = encode_to_vec(&data);
        let mut pos = 0;
        while pos < encoded.len() {
            let tag = encoded[pos];
            if tag < 0x80 {
                prop_assert!(tag >= 2, "run of one at {}", pos);
                pos += 2;
            } else {
                let len = 0x100 - tag as usize;
                let payload = &encoded[pos + 1..pos + 1 + len];
                prop_assert!(payload.windows(2).all(|w| w[0] != w[1]));
                pos += 1 + len;
            }
        }
    }
}
