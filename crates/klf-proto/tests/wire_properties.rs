//! Property-based tests for SLIP framing and the payload codec.
//!
//! Round-trip properties hold for all inputs, not just the documented
//! examples; the documented byte-level scenarios are pinned separately.

use klf_proto::{
    Command, Response,
    messages::{auth::PasswordEnterReq, encode_request, general::GetStateReq},
    slip, wire,
};
use proptest::prelude::*;

/// Arguments small enough to stay within a legal payload (length is a u8).
fn arbitrary_arguments() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..200)
}

#[test]
fn prop_slip_round_trip() {
    proptest!(|(payload in prop::collection::vec(any::<u8>(), 1..300))| {
        let encoded = slip::encode(&payload);
        prop_assert_eq!(encoded[0], 0xC0);
        prop_assert_eq!(encoded[encoded.len() - 1], 0xC0);

        let mut decoder = slip::SlipDecoder::new();
        decoder.extend(&encoded).expect("no overflow");
        let frame = decoder.next_frame().expect("one frame");
        prop_assert_eq!(&frame[..], &payload[..]);
        prop_assert!(decoder.next_frame().is_none());
    });
}

#[test]
fn prop_slip_round_trip_survives_chunking() {
    proptest!(|(payload in prop::collection::vec(any::<u8>(), 1..300), chunk in 1usize..7)| {
        let encoded = slip::encode(&payload);
        let mut decoder = slip::SlipDecoder::new();
        for piece in encoded.chunks(chunk) {
            decoder.extend(piece).expect("no overflow");
        }
        prop_assert_eq!(&decoder.next_frame().expect("one frame")[..], &payload[..]);
    });
}

#[test]
fn prop_payload_round_trip() {
    proptest!(|(command in any::<u16>(), arguments in arbitrary_arguments())| {
        let payload = wire::encode_payload(command, &arguments);
        let (decoded_command, decoded_args) =
            wire::decode_payload(&payload).expect("valid payload");
        prop_assert_eq!(decoded_command, command);
        prop_assert_eq!(decoded_args, &arguments[..]);
    });
}

#[test]
fn prop_checksum_is_xor_of_preceding_bytes() {
    proptest!(|(command in any::<u16>(), arguments in arbitrary_arguments())| {
        let payload = wire::encode_payload(command, &arguments);
        let expected = payload[..payload.len() - 1]
            .iter()
            .fold(0u8, |acc, byte| acc ^ byte);
        prop_assert_eq!(payload[payload.len() - 1], expected);
    });
}

#[test]
fn prop_single_bit_flip_is_detected() {
    proptest!(|(arguments in prop::collection::vec(any::<u8>(), 1..100),
                byte_index: prop::sample::Index,
                bit in 0u8..8)| {
        let mut payload = wire::encode_payload(0x0300, &arguments).to_vec();
        // Flip one argument bit; the prelude is off limits so the length and
        // command stay coherent and only the checksum can catch it.
        let index = 4 + byte_index.index(arguments.len());
        payload[index] ^= 1 << bit;
        let is_wrong_checksum = matches!(
            wire::decode_payload(&payload),
            Err(klf_proto::WireError::WrongChecksum { .. })
        );
        prop_assert!(is_wrong_checksum);
    });
}

#[test]
fn prop_framer_resynchronizes_after_leading_noise() {
    // Noise preceding the first delimiter (a mid-stream connect) must not
    // disturb the frame that follows. Delimiter bytes are excluded: a stray
    // 0xC0 legally opens a frame of its own.
    proptest!(|(noise in prop::collection::vec(0u8..0xC0, 0..50),
                payload in prop::collection::vec(any::<u8>(), 1..50))| {
        let mut decoder = slip::SlipDecoder::new();
        decoder.extend(&noise).expect("noise cannot overflow an unopened frame");
        prop_assert!(decoder.next_frame().is_none());

        decoder.extend(&slip::encode(&payload)).expect("no overflow");
        let frame = decoder.next_frame().expect("frame after noise");
        prop_assert_eq!(&frame[..], &payload[..]);
    });
}

// Documented byte-level scenarios.

#[test]
fn password_enter_wire_bytes() {
    let payload = encode_request(&PasswordEnterReq::new("secret"));

    let mut expected = vec![0x00, 0x22, 0x30, 0x00];
    expected.extend_from_slice(b"secret");
    expected.extend_from_slice(&[0u8; 25]);
    let checksum = expected.iter().fold(0u8, |acc, byte| acc ^ byte);
    expected.push(checksum);
    assert_eq!(&payload[..], &expected[..]);

    let framed = slip::encode(&payload);
    assert_eq!(framed[0], 0xC0);
    assert_eq!(framed[framed.len() - 1], 0xC0);
}

#[test]
fn password_enter_cfm_wire_bytes() {
    // 00 04 30 01 00 CK
    let payload = [0x00, 0x04, 0x30, 0x01, 0x00, 0x35];
    let (command, args) = wire::decode_payload(&payload).unwrap();
    assert_eq!(command, 0x3001);

    let response = Response::decode(command, args).unwrap();
    match response {
        Response::PasswordEnterCfm(cfm) => {
            assert_eq!(cfm.status, 0);
            assert!(cfm.is_success());
        },
        other => panic!("expected PasswordEnterCfm, got {other:?}"),
    }
}

#[test]
fn ping_round_trip_wire_bytes() {
    let request = encode_request(&GetStateReq);
    assert_eq!(&request[..], &[0x00, 0x03, 0x00, 0x0C, 0x0F]);

    // Confirmation: command 0x000D with six argument bytes.
    let arguments = [0x01, 0x02, 0x00, 0x00, 0x00, 0x00];
    let payload = wire::encode_payload(Command::GetStateCfm.to_u16(), &arguments);
    let (command, args) = wire::decode_payload(&payload).unwrap();
    let response = Response::decode(command, args).unwrap();
    match response {
        Response::GetStateCfm(cfm) => {
            assert_eq!(cfm.gateway_state, 1);
            assert_eq!(cfm.sub_state, 2);
            assert_eq!(cfm.state_data, [0, 0, 0, 0]);
        },
        other => panic!("expected GetStateCfm, got {other:?}"),
    }
}

#[test]
fn slip_escape_wire_bytes() {
    let encoded = slip::encode(&[0xC0, 0xDB, 0x00]);
    assert_eq!(&encoded[..], &[0xC0, 0xDB, 0xDC, 0xDB, 0xDD, 0x00, 0xC0]);
}

#[test]
fn length_mismatch_is_wrong_length() {
    let mut payload = wire::encode_payload(0x000D, &[0x01, 0x02, 0x00, 0x00, 0x00, 0x00]).to_vec();
    payload[1] += 1;
    assert!(matches!(
        wire::decode_payload(&payload),
        Err(klf_proto::WireError::WrongLength { .. })
    ));
}
