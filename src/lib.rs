//! # qrmatrix
//!
//! A Rust library for encoding text or binary data into QR symbols.
//!
//! `qrmatrix` builds the full symbol-construction pipeline of QR Code Model 2: mode-aware
//! bitstream packing, Reed-Solomon error correction over GF(256), zigzag module placement
//! around the function patterns, and mask selection by the four-rule penalty score. It covers
//! versions 1 to 40 and all four error correction levels, and hands the finished module grid
//! to a thin rendering layer for PNG, JPEG or text output.
//!
//! ## Features
//!
//! - Encode data in numeric, alphanumeric, byte, Kanji, ECI and structured append modes.
//! - Split mixed content into the cheapest mix of segments automatically.
//! - Pick the smallest version that fits, or pin an explicit one.
//! - Choose the mask by exhaustive search, a random subset, or fix it.
//! - Render symbols as PNG or JPEG images, `'0'`/`'1'` rows, or console output.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrmatrix = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Encode a string and inspect the symbol:
//!
//! ```rust
//! use qrmatrix::{EncodeOptions, Mask, MaskStrategy, QrCode, QrCodeEcc};
//!
//! let options = EncodeOptions::default()
//!     .with_level(QrCodeEcc::Medium)
//!     .with_mask(MaskStrategy::Fixed(Mask::new(0)));
//! let qr = QrCode::encode_binary(b"HELLO WORLD", &options).unwrap();
//! assert_eq!(qr.size(), 21);
//! assert_eq!(qr.read_format_info(), Some((QrCodeEcc::Medium, Mask::new(0))));
//! ```
//!
//! Render it to an in-memory PNG:
//!
//! ```rust
//! use qrmatrix::{EncodeOptions, QrCode};
//! use qrmatrix::helper::{write_png, RenderOptions};
//!
//! let qr = QrCode::encode_text("Hello, World!", &EncodeOptions::default()).unwrap();
//! let mut png = Vec::new();
//! write_png(&qr, &RenderOptions::default(), &mut png).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`encoder`]: The encoding pipeline and the finished [`QrCode`].
//! - [`spec`]: Version and capacity tables, function pattern templates, format information.
//! - [`input`], [`segment`], [`split`]: Data segments and their bitstream.
//! - [`rawcode`], [`galois`]: Error correction blocks and GF(256) arithmetic.
//! - [`filler`], [`mask`]: Module placement and masking.
//! - [`helper`]: Utilities for rendering QR codes in various formats.
//! - [`cache`]: On-disk memo of encoded symbols.

pub mod bitstream;
pub mod cache;
pub mod encoder;
pub mod error;
pub mod filler;
pub mod galois;
pub mod helper;
pub mod input;
pub mod mask;
pub mod matrix;
pub mod rawcode;
pub mod segment;
pub mod spec;
pub mod split;

pub use encoder::{EncodeOptions, QrCode};
pub use error::{QrError, Result};
pub use input::QrInput;
pub use mask::{Mask, MaskStrategy};
pub use matrix::{Module, ModuleMatrix};
pub use segment::{QrSegment, QrSegmentMode};
pub use spec::{QrCodeEcc, Version};
