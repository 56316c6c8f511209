#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for malformed, truncated and unusual transmissions

use packet_decoder::config::DecodeSettings;
use packet_decoder::core::bits::BitBuf;
use packet_decoder::core::decoder::PacketDecoder;
use packet_decoder::core::encoder::encode_hex;
use packet_decoder::error::DecodeError;
use packet_decoder::{evaluate, parse_packet, LengthType, Operator, Packet};

fn nested_sums(depth: usize) -> Packet {
    let mut packet = Packet::literal(1, 1);
    for _ in 1..depth {
        packet = Packet::operator(0, Operator::Sum, vec![packet]);
    }
    packet
}

// ============================================================================
// INPUT TEXT
// ============================================================================

#[test]
fn test_empty_input_is_malformed() {
    assert!(matches!(
        parse_packet(""),
        Err(DecodeError::MalformedPacket(_))
    ));
    assert!(matches!(
        parse_packet("   \n"),
        Err(DecodeError::MalformedPacket(_))
    ));
}

#[test]
fn test_trailing_whitespace_ignored() {
    assert_eq!(parse_packet("D2FE28\n").unwrap(), Packet::literal(6, 2021));
    assert_eq!(parse_packet("D2FE28 \r\n").unwrap(), Packet::literal(6, 2021));
}

#[test]
fn test_lowercase_hex_accepted() {
    assert_eq!(
        parse_packet("9c0141080250320f1802104a08").unwrap(),
        parse_packet("9C0141080250320F1802104A08").unwrap()
    );
}

#[test]
fn test_non_hex_reports_position() {
    match parse_packet("C200B4-A82") {
        Err(DecodeError::InvalidCharacter {
            character,
            position,
        }) => {
            assert_eq!(character, '-');
            assert_eq!(position, 6);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_embedded_whitespace_rejected() {
    assert!(matches!(
        parse_packet("D2 FE28"),
        Err(DecodeError::InvalidCharacter { character: ' ', .. })
    ));
}

// ============================================================================
// FRAMING
// ============================================================================

#[test]
fn test_trailing_bits_are_not_consumed() {
    let decoded = PacketDecoder::default()
        .decode_hex("D2FE28FFFFFF")
        .expect("decode");
    assert_eq!(decoded.packet, Packet::literal(6, 2021));
    assert_eq!(decoded.bits_consumed, 21);
}

#[test]
fn test_every_truncation_is_an_error() {
    let hex = "A0016C880162017C3686B18A3D4780";
    let needed_nibbles = PacketDecoder::default()
        .decode_hex(hex)
        .unwrap()
        .bits_consumed
        .div_ceil(4);

    for len in 0..needed_nibbles {
        let result = parse_packet(&hex[..len]);
        assert!(
            matches!(result, Err(DecodeError::MalformedPacket(_))),
            "prefix of {len} nibbles: {result:?}"
        );
    }
}

#[test]
fn test_zero_length_total_bits_operator() {
    // sum, I=0, L=0
    let bits = BitBuf::from_binary_str(&format!("0000000{:015b}", 0)).unwrap();
    let decoded = PacketDecoder::default().decode(&mut bits.reader()).unwrap();
    assert!(decoded.packet.children().is_empty());
    assert_eq!(decoded.bits_consumed, 22);
    assert_eq!(evaluate(&decoded.packet).unwrap(), 0);
}

#[test]
fn test_zero_count_operator() {
    let bits = BitBuf::from_binary_str(&format!("0000011{:011b}", 0)).unwrap();
    let decoded = PacketDecoder::default().decode(&mut bits.reader()).unwrap();
    assert_eq!(decoded.packet.operator_kind(), Some(Operator::Product));
    assert!(decoded.packet.children().is_empty());
    assert_eq!(evaluate(&decoded.packet).unwrap(), 1);
}

#[test]
fn test_literal_with_leading_zero_groups() {
    // groups 10000 10000 00111: value 7 spread over three groups
    let bits = BitBuf::from_binary_str("111100100001000000111").unwrap();
    let decoded = PacketDecoder::default().decode(&mut bits.reader()).unwrap();
    assert_eq!(decoded.packet, Packet::literal(7, 7));
    assert_eq!(decoded.bits_consumed, 21);
}

#[test]
fn test_comparison_with_one_child_decodes_but_fails_to_evaluate() {
    let hex = encode_hex(&Packet::operator(0, Operator::EqualTo, vec![Packet::literal(0, 1)]))
        .unwrap();
    let packet = parse_packet(&hex).expect("well-framed packet decodes");
    assert!(matches!(
        evaluate(&packet),
        Err(DecodeError::InvalidArity { found: 1, .. })
    ));
}

// ============================================================================
// NESTING LIMITS
// ============================================================================

#[test]
fn test_default_depth_limit_boundary() {
    let limit = DecodeSettings::default().max_depth;

    let at_limit = encode_hex(&nested_sums(limit)).unwrap();
    let packet = parse_packet(&at_limit).expect("depth at limit decodes");
    assert_eq!(packet.depth(), limit);
    assert_eq!(evaluate(&packet).unwrap(), 1);

    let beyond = encode_hex(&nested_sums(limit + 1)).unwrap();
    assert!(matches!(
        parse_packet(&beyond),
        Err(DecodeError::MalformedPacket(msg)) if msg.contains("depth")
    ));
}

#[test]
fn test_raised_depth_limit() {
    let hex = encode_hex(&nested_sums(200)).unwrap();
    let decoder = PacketDecoder::new(DecodeSettings {
        max_depth: 256,
        ..DecodeSettings::default()
    });
    assert_eq!(decoder.decode_hex(&hex).unwrap().packet.depth(), 200);
}

#[test]
fn test_nested_total_bits_framing_round_trips() {
    let inner = Packet::operator_with_framing(
        2,
        Operator::Maximum,
        LengthType::TotalBits,
        vec![Packet::literal(1, 300), Packet::literal(3, 12)],
    );
    let outer = Packet::operator_with_framing(
        5,
        Operator::Product,
        LengthType::TotalBits,
        vec![inner, Packet::literal(4, 2)],
    );
    let packet = parse_packet(&encode_hex(&outer).unwrap()).unwrap();
    assert_eq!(packet, outer);
    assert_eq!(evaluate(&packet).unwrap(), 600);
}
