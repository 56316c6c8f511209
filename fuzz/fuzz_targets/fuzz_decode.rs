#![no_main]

use libfuzzer_sys::fuzz_target;
use packet_decoder::core::encoder::encode_hex;
use packet_decoder::{evaluate, parse_packet};

fuzz_target!(|data: &[u8]| {
    // Fuzz hex decoding - test for panics, runaway recursion, infinite loops
    let text = String::from_utf8_lossy(data);
    if let Ok(packet) = parse_packet(&text) {
        let _ = evaluate(&packet);
        // Anything that decodes must re-encode and decode to the same tree
        if let Ok(hex) = encode_hex(&packet) {
            assert_eq!(parse_packet(&hex).ok(), Some(packet));
        }
    }
});
