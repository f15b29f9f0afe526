//! Fingerprint set integration tests.

mod common;

use common::self_signed;
use keypin::{Fingerprint, FingerprintSet, NetError};

#[test]
fn test_empty_set_matches_nothing() {
    let set = FingerprintSet::default();
    assert!(!set.contains(&Fingerprint::new([0u8; 32])));

    let cert = self_signed("a.test");
    assert_eq!(
        set.check_chain([&*cert.cert]),
        Err(NetError::SslPinnedKeyNotInCertChain)
    );
}

#[test]
fn test_multiple_pins_any_match() {
    let set = FingerprintSet::new([[1u8; 32], [2u8; 32]]);

    assert!(set.contains(&Fingerprint::new([1u8; 32])));
    assert!(set.contains(&Fingerprint::new([2u8; 32])));
    assert!(!set.contains(&Fingerprint::new([3u8; 32])));
}

#[test]
fn test_from_base64_pins() {
    // SPKI pins in HPKP notation, with and without the prefix.
    let set = FingerprintSet::from_base64([
        "sha256/s+xUlcaUY3JfY6ABjSAQDdUXlkUUtgDghW6SdU7Gwgs=",
        "zCTnfLwLKbS9S2sbp+uFz4KZOocFvXxkV06Ce9O5M2w=",
        "sha256/hxqRlPTu1bMS/0DITB1SSu0vd4u/8l8TjPgfaAp63Gc=",
    ])
    .unwrap();
    assert_eq!(set.len(), 3);

    let first = Fingerprint::new([
        0xb3, 0xec, 0x54, 0x95, 0xc6, 0x94, 0x63, 0x72, 0x5f, 0x63, 0xa0, 0x01, 0x8d, 0x20, 0x10,
        0x0d, 0xd5, 0x17, 0x96, 0x45, 0x14, 0xb6, 0x00, 0xe0, 0x85, 0x6e, 0x92, 0x75, 0x4e, 0xc6,
        0xc2, 0x0b,
    ]);
    assert!(set.contains(&first));
}

#[test]
fn test_from_base64_rejects_whole_set_on_bad_pin() {
    let err = FingerprintSet::from_base64([
        "sha256/s+xUlcaUY3JfY6ABjSAQDdUXlkUUtgDghW6SdU7Gwgs=",
        "sha256/tooshort",
    ])
    .unwrap_err();
    assert!(matches!(err, NetError::InvalidPin { .. }));
}

#[test]
fn test_chain_scan_order() {
    let cert_a = self_signed("a.test");
    let cert_b = self_signed("b.test");
    let cert_c = self_signed("c.test");
    let set = FingerprintSet::new([cert_a.fingerprint()]);

    // [B, A] matches on the second certificate.
    let found = set.check_chain([&*cert_b.cert, &*cert_a.cert]).unwrap();
    assert_eq!(found.index, 1);

    // [B, C] has no pinned key.
    let err = set.check_chain([&*cert_b.cert, &*cert_c.cert]).unwrap_err();
    assert!(err.is_pin_mismatch());
}

#[test]
fn test_fingerprint_serde() {
    let fp = Fingerprint::new([5u8; 32]);
    let json = serde_json::to_string(&fp).unwrap();
    assert_eq!(json, format!("\"{fp}\""));
    let back: Fingerprint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fp);
}
