//! Test-only symbol reader.
//!
//! Undoes the encoder step by step: reads format information, removes the
//! mask, walks the zigzag to recover the codeword stream, de-interleaves the
//! blocks (checking every block's error correction) and parses segments.

#![allow(dead_code)]

use qrmatrix::filler::FrameFiller;
use qrmatrix::galois::ReedSolomonGenerator;
use qrmatrix::input::QrInput;
use qrmatrix::mask::mask_bit;
use qrmatrix::matrix::ModuleMatrix;
use qrmatrix::rawcode::RawCode;
use qrmatrix::segment::QrSegmentMode;
use qrmatrix::{QrCode, QrCodeEcc, Version};

const ALPHANUMERIC: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    Data(QrSegmentMode, Vec<u8>),
    Eci(u32),
    StructuredAppend { index: u8, total: u8, parity: u8 },
}

/// Data codewords of a symbol after unmasking and de-interleaving.
pub fn read_data_codewords(qr: &QrCode) -> Vec<u8> {
    let (ecl, mask) = qr.read_format_info().expect("format information");
    let version = qr.version();
    let caps = version.capacities(ecl);

    let mut template = version.template();
    let mut filler = FrameFiller::new(&mut template);
    let mut bits = Vec::new();
    while let Some((x, y)) = filler.next() {
        bits.push(qr.get_module(x as i32, y as i32) ^ mask_bit(mask, x, y));
    }
    assert_eq!(bits.len(), caps.total_codewords * 8 + version.remainder_bits());

    let codewords: Vec<u8> = bits
        .chunks(8)
        .take(caps.total_codewords)
        .map(|byte| byte.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b)))
        .collect();

    let lengths: Vec<usize> = caps.block_lengths().collect();
    let mut blocks: Vec<Vec<u8>> = lengths.iter().map(|&n| Vec::with_capacity(n)).collect();
    let mut pos = 0;
    let maxlen = lengths.iter().copied().max().unwrap_or(0);
    for i in 0..maxlen {
        for (b, &len) in lengths.iter().enumerate() {
            if i < len {
                blocks[b].push(codewords[pos]);
                pos += 1;
            }
        }
    }
    let mut eccs: Vec<Vec<u8>> = vec![Vec::new(); lengths.len()];
    for _ in 0..caps.ecc_per_block {
        for ecc in eccs.iter_mut() {
            ecc.push(codewords[pos]);
            pos += 1;
        }
    }
    assert_eq!(pos, caps.total_codewords);

    let rs = ReedSolomonGenerator::new(caps.ecc_per_block);
    for (data, ecc) in blocks.iter().zip(&eccs) {
        assert_eq!(&rs.compute_remainder(data), ecc, "block error correction mismatch");
    }
    blocks.concat()
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl BitReader<'_> {
    fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    fn read(&mut self, n: u8) -> u32 {
        let mut v = 0;
        for _ in 0..n {
            let bit = (self.data[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            v = (v << 1) | u32::from(bit);
            self.pos += 1;
        }
        v
    }
}

/// Parses the segments of a data codeword stream.
pub fn parse_segments(data: &[u8], version: Version) -> Vec<Decoded> {
    use QrSegmentMode::*;
    let mut r = BitReader { data, pos: 0 };
    let mut result = Vec::new();
    while r.remaining() >= 4 {
        let mode = match r.read(4) {
            0 => break,
            1 => Numeric,
            2 => Alphanumeric,
            4 => Byte,
            8 => Kanji,
            7 => Eci,
            3 => StructuredAppend,
            other => panic!("unexpected mode indicator {other:04b}"),
        };
        match mode {
            Eci => {
                let first = r.read(8);
                let val = if first & 0x80 == 0 {
                    first
                } else if first & 0xc0 == 0x80 {
                    ((first & 0x3f) << 8) | r.read(8)
                } else {
                    ((first & 0x1f) << 16) | r.read(16)
                };
                result.push(Decoded::Eci(val));
            }
            StructuredAppend => {
                let index = r.read(4) as u8;
                let total = r.read(4) as u8 + 1;
                let parity = r.read(8) as u8;
                result.push(Decoded::StructuredAppend { index, total, parity });
            }
            _ => {
                let count = r.read(mode.num_char_count_bits(version)) as usize;
                let mut out = Vec::new();
                match mode {
                    Numeric => {
                        let mut left = count;
                        while left > 0 {
                            let (n, bits) = match left {
                                1 => (1, 4),
                                2 => (2, 7),
                                _ => (3, 10),
                            };
                            let v = r.read(bits);
                            out.extend(format!("{:0width$}", v, width = n).bytes());
                            left -= n;
                        }
                    }
                    Alphanumeric => {
                        for _ in 0..count / 2 {
                            let v = r.read(11) as usize;
                            out.push(ALPHANUMERIC[v / 45]);
                            out.push(ALPHANUMERIC[v % 45]);
                        }
                        if count % 2 == 1 {
                            out.push(ALPHANUMERIC[r.read(6) as usize]);
                        }
                    }
                    Byte => {
                        for _ in 0..count {
                            out.push(r.read(8) as u8);
                        }
                    }
                    _ => {
                        for _ in 0..count {
                            let v = r.read(13);
                            let w = ((v / 0xc0) << 8) | (v % 0xc0);
                            let sjis = if w + 0x8140 <= 0x9ffc { w + 0x8140 } else { w + 0xc140 };
                            out.push((sjis >> 8) as u8);
                            out.push(sjis as u8);
                        }
                    }
                }
                result.push(Decoded::Data(mode, out));
            }
        }
    }
    result
}

/// Reads a symbol back into its segments.
pub fn decode(qr: &QrCode) -> Vec<Decoded> {
    parse_segments(&read_data_codewords(qr), qr.version())
}

/// Reads a symbol back into the concatenated payload of its data segments.
pub fn decode_payload(qr: &QrCode) -> Vec<u8> {
    decode(qr)
        .into_iter()
        .filter_map(|d| match d {
            Decoded::Data(_, bytes) => Some(bytes),
            _ => None,
        })
        .flatten()
        .collect()
}

/// The unmasked frame the encoder builds for `input` before mask selection.
pub fn filled_frame(input: &QrInput) -> (Version, QrCodeEcc, ModuleMatrix) {
    let (version, data) = input.finish().expect("input fits");
    let raw = RawCode::new(&data, version, input.level());
    let mut frame = version.template();
    let mut bits = raw.bits().chain(std::iter::repeat(false));
    let mut filler = FrameFiller::new(&mut frame);
    while let Some(addr) = filler.next() {
        let bit = bits.next().unwrap_or(false);
        filler.set_frame_at(addr, bit);
    }
    (version, input.level(), frame)
}
