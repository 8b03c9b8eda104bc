//! Dotted-quad IPv4 text ↔ node identifier.
//!
//! Addresses pack big-endian, so `a.b.c.d` becomes `a << 24 | b << 16 | c << 8 | d`
//! and numeric order matches address order.

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::graph::NodeId;

/// Parse `a.b.c.d` (four decimal octets, 0-255 each) into a packed identifier.
///
/// Anything else is rejected with [`Error::MalformedAddress`]: too few or too
/// many segments, signs, whitespace, and octets with a leading zero (`010`
/// would be octal to `inet_aton` and decimal to a naive parser).
pub fn ipv4_to_int(dotted: &str) -> Result<NodeId> {
    dotted
        .parse::<Ipv4Addr>()
        .map(NodeId::from)
        .map_err(|_| malformed(dotted))
}

/// Like [`ipv4_to_int`] but maps malformed input to `0`.
///
/// `0` is also the encoding of `0.0.0.0`, so callers cannot tell the two
/// apart. Prefer [`ipv4_to_int`] unless the sentinel is what you want.
pub fn ipv4_to_int_lossy(dotted: &str) -> NodeId {
    ipv4_to_int(dotted).unwrap_or(0)
}

/// Render a packed identifier as `a.b.c.d`.
pub fn int_to_ipv4(value: NodeId) -> String {
    Ipv4Addr::from(value).to_string()
}

fn malformed(input: &str) -> Error {
    Error::MalformedAddress {
        input: input.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("192.168.1.1", 3_232_235_777)]
    #[case("0.0.0.0", 0)]
    #[case("255.255.255.255", u32::MAX)]
    #[case("10.0.0.1", 167_772_161)]
    #[case("1.2.3.4", 0x0102_0304)]
    fn test_ipv4_to_int(#[case] text: &str, #[case] expected: NodeId) {
        assert_eq!(ipv4_to_int(text).unwrap(), expected);
    }

    #[test]
    fn test_int_to_ipv4() {
        assert_eq!(int_to_ipv4(3_232_235_777), "192.168.1.1");
        assert_eq!(int_to_ipv4(0), "0.0.0.0");
        assert_eq!(int_to_ipv4(u32::MAX), "255.255.255.255");
    }

    #[rstest]
    #[case("1.2.3")]
    #[case("1.2.3.4.5")]
    #[case("")]
    #[case("1..3.4")]
    #[case("256.1.1.1")]
    #[case("1.2.3.-4")]
    #[case("1.2.3.+4")]
    #[case("a.b.c.d")]
    #[case(" 1.2.3.4")]
    #[case("1.2.3.4.")]
    #[case("1.2.3.0004")]
    #[case("010.0.0.1")]
    #[case("1.02.3.4")]
    fn test_malformed_rejected(#[case] text: &str) {
        let err = ipv4_to_int(text).unwrap_err();
        assert!(
            matches!(&err, Error::MalformedAddress { input } if input == text),
            "unexpected error {err:?}"
        );
        assert_eq!(ipv4_to_int_lossy(text), 0);
    }

    #[test]
    fn test_zero_octet_is_not_a_leading_zero() {
        assert_eq!(ipv4_to_int("10.0.0.1").unwrap(), 167_772_161);
        assert_eq!(int_to_ipv4(ipv4_to_int("0.10.0.0").unwrap()), "0.10.0.0");
    }

    #[test]
    fn test_lossy_passes_valid_input_through() {
        assert_eq!(ipv4_to_int_lossy("192.168.1.1"), 3_232_235_777);
    }

    #[test]
    fn test_error_message_names_input() {
        let err = ipv4_to_int("1.2.3").unwrap_err();
        assert_eq!(err.to_string(), "malformed IPv4 address `1.2.3`");
    }

    proptest! {
        #[test]
        fn round_trip_from_text(a: u8, b: u8, c: u8, d: u8) {
            let text = format!("{a}.{b}.{c}.{d}");
            let packed = ipv4_to_int(&text).unwrap();
            prop_assert_eq!(int_to_ipv4(packed), text);
        }

        #[test]
        fn round_trip_from_int(value: u32) {
            prop_assert_eq!(ipv4_to_int(&int_to_ipv4(value)).unwrap(), value);
        }
    }
}
