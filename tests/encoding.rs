//! End-to-end encoding scenarios checked against known symbols and the
//! test-only reader in `support`.

mod support;

use qrmatrix::{
    EncodeOptions, Mask, MaskStrategy, QrCode, QrCodeEcc, QrError, QrInput, QrSegment,
    QrSegmentMode, Version,
};
use support::{decode, decode_payload, read_data_codewords, Decoded};

const HELLO_WORLD_1M_MASK0: [&str; 21] = [
    "111111100110101111111",
    "100000101100101000001",
    "101110100000101011101",
    "101110100011001011101",
    "101110101100101011101",
    "100000100100101000001",
    "111111101010101111111",
    "000000000011100000000",
    "101010100101000010010",
    "101001000110001100010",
    "100010111110110111111",
    "101100011110000010010",
    "101100111000111110100",
    "000000001111010000110",
    "111111100011000110111",
    "100000100111100100001",
    "101110101111001010100",
    "101110100001001110110",
    "101110101010101010101",
    "100000100011000010010",
    "111111101101101100111",
];

fn fixed(version: u8, level: QrCodeEcc, mask: u8) -> EncodeOptions {
    EncodeOptions::default()
        .with_version(version)
        .with_level(level)
        .with_mask(MaskStrategy::Fixed(Mask::new(mask)))
}

#[test]
fn test_hello_world_byte_mode_reference_grid() {
    let qr = QrCode::encode_binary(b"HELLO WORLD", &fixed(1, QrCodeEcc::Medium, 0)).unwrap();
    assert_eq!(qr.rows(), HELLO_WORLD_1M_MASK0);
    assert_eq!(
        read_data_codewords(&qr),
        vec![64, 180, 132, 84, 196, 196, 242, 5, 116, 245, 36, 196, 64, 236, 17, 236]
    );
}

#[test]
fn test_width_for_every_version_and_level() {
    for v in 1..=40u8 {
        for ecl in QrCodeEcc::ALL {
            let qr = QrCode::encode_binary(b"w", &fixed(v, ecl, v % 8)).unwrap();
            let width = 17 + 4 * usize::from(v);
            assert_eq!(qr.size(), width);
            assert_eq!(qr.modules().len(), width * width);
            assert_eq!(qr.rows().len(), width);
        }
    }
}

#[test]
fn test_fixed_mask_encoding_is_idempotent() {
    for ecl in QrCodeEcc::ALL {
        let options = fixed(0, ecl, 3);
        let first = QrCode::encode_text("idempotent 12345 payload", &options).unwrap();
        for _ in 0..3 {
            assert_eq!(QrCode::encode_text("idempotent 12345 payload", &options).unwrap(), first);
        }
    }
}

#[test]
fn test_format_information_reads_back() {
    for v in [1u8, 6, 7, 20, 40] {
        for ecl in QrCodeEcc::ALL {
            for m in 0..8 {
                let qr = QrCode::encode_binary(b"format", &fixed(v, ecl, m)).unwrap();
                assert_eq!(qr.read_format_info(), Some((ecl, Mask::new(m))));
                assert_eq!(qr.error_correction_level(), ecl);
                assert_eq!(qr.mask(), Mask::new(m));
            }
        }
    }
}

#[test]
fn test_best_mask_is_reported_in_format_information() {
    let qr = QrCode::encode_text("https://example.com/best", &EncodeOptions::default()).unwrap();
    assert_eq!(qr.read_format_info(), Some((QrCodeEcc::Low, qr.mask())));
}

#[test]
fn test_41_digits_fill_version_1_low() {
    let digits = "12345678901234567890123456789012345678901";
    let qr = QrCode::encode_text(digits, &fixed(1, QrCodeEcc::Low, 2)).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    assert_eq!(
        decode(&qr),
        vec![Decoded::Data(QrSegmentMode::Numeric, digits.as_bytes().to_vec())]
    );
    // 151 payload bits plus a single terminator bit, no pad codewords
    let data = read_data_codewords(&qr);
    assert_eq!(data.len(), 19);
    assert!(!data.ends_with(&[0xec]) && !data.ends_with(&[0x11]));

    let over = format!("{digits}2");
    assert!(matches!(
        QrCode::encode_text(&over, &fixed(1, QrCodeEcc::Low, 2)),
        Err(QrError::CapacityExceeded { .. })
    ));
}

#[test]
fn test_capacity_boundary_per_mode() {
    // Version 2-Q: 22 data codewords
    let options = fixed(2, QrCodeEcc::Quartile, 0);
    let numeric = "7".repeat(48);
    assert!(QrCode::encode_text(&numeric, &options).is_ok());
    assert!(matches!(
        QrCode::encode_text(&"7".repeat(49), &options),
        Err(QrError::CapacityExceeded { .. })
    ));

    let alnum = "A".repeat(29);
    assert!(QrCode::encode_text(&alnum, &options).is_ok());
    assert!(QrCode::encode_text(&"A".repeat(30), &options).is_err());

    assert!(QrCode::encode_binary(&[0x61; 20], &options).is_ok());
    assert!(QrCode::encode_binary(&[0x61; 21], &options).is_err());
}

#[test]
fn test_automatic_version_grows_with_payload() {
    let mut last = 0;
    for len in [10usize, 100, 500, 1000, 2000] {
        let qr = QrCode::encode_binary(&vec![b'x'; len], &EncodeOptions::default()).unwrap();
        assert!(qr.version().value() > last);
        last = qr.version().value();
        assert_eq!(decode_payload(&qr), vec![b'x'; len]);
    }
    assert!(matches!(
        QrCode::encode_binary(&vec![b'x'; 3000], &EncodeOptions::default()),
        Err(QrError::VersionNotFound { .. })
    ));
}

#[test]
fn test_invalid_version_is_rejected() {
    assert_eq!(
        QrCode::encode_text("x", &EncodeOptions::default().with_version(41)).unwrap_err(),
        QrError::InvalidVersion(41)
    );
}

#[test]
fn test_mixed_content_is_segmented() {
    let qr = QrCode::encode_text("abc1234567890def", &fixed(2, QrCodeEcc::Low, 1)).unwrap();
    assert_eq!(
        decode(&qr),
        vec![
            Decoded::Data(QrSegmentMode::Byte, b"abc".to_vec()),
            Decoded::Data(QrSegmentMode::Numeric, b"1234567890".to_vec()),
            Decoded::Data(QrSegmentMode::Byte, b"def".to_vec()),
        ]
    );
}

#[test]
fn test_ignore_case_uses_alphanumeric_mode() {
    let options = fixed(0, QrCodeEcc::Low, 0).with_case_sensitive(false);
    let qr = QrCode::encode_text("hello world", &options).unwrap();
    assert_eq!(
        decode(&qr),
        vec![Decoded::Data(QrSegmentMode::Alphanumeric, b"HELLO WORLD".to_vec())]
    );
}

#[test]
fn test_kanji_hint() {
    // Shift JIS for two kanji followed by ASCII
    let data = [0x93, 0x5f, 0xe4, 0xaa, b'!'];
    let options = fixed(0, QrCodeEcc::Medium, 4).with_hint(QrSegmentMode::Kanji);
    let qr = QrCode::encode_segmented(&data, &options).unwrap();
    assert_eq!(
        decode(&qr),
        vec![
            Decoded::Data(QrSegmentMode::Kanji, vec![0x93, 0x5f, 0xe4, 0xaa]),
            Decoded::Data(QrSegmentMode::Byte, b"!".to_vec()),
        ]
    );

    let bytes = QrCode::encode_segmented(&data, &options.with_hint(QrSegmentMode::Byte)).unwrap();
    assert_eq!(decode(&bytes), vec![Decoded::Data(QrSegmentMode::Byte, data.to_vec())]);

    assert!(matches!(
        QrCode::encode_segmented(&data, &options.with_hint(QrSegmentMode::Numeric)),
        Err(QrError::UnsupportedMode { .. })
    ));
}

#[test]
fn test_eci_segment() {
    let segs = [
        QrSegment::make_eci(26).unwrap(),
        QrSegment::make_bytes("żółw".as_bytes()),
    ];
    let qr = QrCode::encode_segments(&segs, &fixed(0, QrCodeEcc::Low, 0)).unwrap();
    assert_eq!(
        decode(&qr),
        vec![
            Decoded::Eci(26),
            Decoded::Data(QrSegmentMode::Byte, "żółw".as_bytes().to_vec()),
        ]
    );

    let wide = [QrSegment::make_eci(999_999).unwrap(), QrSegment::make_bytes(b"x")];
    let qr = QrCode::encode_segments(&wide, &fixed(0, QrCodeEcc::Low, 0)).unwrap();
    assert_eq!(decode(&qr)[0], Decoded::Eci(999_999));
}

#[test]
fn test_forced_numeric_mode_rejects_letters() {
    let mut input = QrInput::new(0, QrCodeEcc::Low).unwrap();
    assert!(matches!(
        input.append(QrSegmentMode::Numeric, b"12a"),
        Err(QrError::UnsupportedMode { mode: QrSegmentMode::Numeric, .. })
    ));
}

#[test]
fn test_empty_payload() {
    let qr = QrCode::encode_text("", &EncodeOptions::default()).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    assert!(decode(&qr).is_empty());
}
