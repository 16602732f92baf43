//! Accumulates segments and turns them into the padded data codewords of one
//! symbol.

use log::debug;

use crate::bitstream::BitBuffer;
use crate::error::{QrError, Result};
use crate::segment::{QrSegment, QrSegmentMode};
use crate::spec::{QrCodeEcc, Version};

/// Pad codewords alternated after the terminator until capacity is reached.
const PAD_CODEWORDS: [u32; 2] = [0xec, 0x11];

/// An ordered list of segments bound for one symbol.
///
/// `version` 0 asks for the smallest version that holds the data.
#[derive(Clone, Debug)]
pub struct QrInput {
    version: u8,
    level: QrCodeEcc,
    segments: Vec<QrSegment>,
}

impl QrInput {
    /// # Errors
    ///
    /// [`QrError::InvalidVersion`] if `version` is above 40.
    pub fn new(version: u8, level: QrCodeEcc) -> Result<Self> {
        if version > Version::MAX.value() {
            return Err(QrError::InvalidVersion(version));
        }
        Ok(Self {
            version,
            level,
            segments: Vec::new(),
        })
    }

    /// Requested version; 0 when automatic.
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn level(&self) -> QrCodeEcc {
        self.level
    }

    pub fn segments(&self) -> &[QrSegment] {
        &self.segments
    }

    /// Validates `data` for `mode` and appends it as a new segment.
    pub fn append(&mut self, mode: QrSegmentMode, data: &[u8]) -> Result<()> {
        let seg = QrSegment::new(mode, data)?;
        self.segments.push(seg);
        Ok(())
    }

    pub fn append_segment(&mut self, seg: QrSegment) {
        self.segments.push(seg);
    }

    /// Puts a structured append header in front of all other segments.
    pub fn insert_structured_append_header(
        &mut self,
        total: usize,
        index: usize,
        parity: u8,
    ) -> Result<()> {
        if self.segments.first().map(|s| s.mode()) == Some(QrSegmentMode::StructuredAppend) {
            return Err(QrError::UnsupportedMode {
                mode: QrSegmentMode::StructuredAppend,
                reason: "header already present".to_string(),
            });
        }
        let seg = QrSegment::make_structured_append(total, index, parity)?;
        self.segments.insert(0, seg);
        Ok(())
    }

    /// Total bits of all segments written at `version`, before terminator
    /// and padding.
    pub fn estimate_bits(&self, version: Version) -> usize {
        self.segments.iter().map(|s| s.bit_length(version)).sum()
    }

    /// Resolves the version this input will be encoded at.
    ///
    /// # Errors
    ///
    /// - [`QrError::CapacityExceeded`] when an explicit version is too small.
    /// - [`QrError::VersionNotFound`] when no version fits in automatic mode.
    pub fn resolve_version(&self) -> Result<Version> {
        if self.version != 0 {
            let version = Version::try_from(self.version)?;
            let bits = self.estimate_bits(version);
            let capacity = version.data_codewords(self.level) * 8;
            if bits > capacity {
                return Err(QrError::CapacityExceeded { bits, capacity });
            }
            return Ok(version);
        }
        for version in Version::all() {
            if self.estimate_bits(version) <= version.data_codewords(self.level) * 8 {
                debug!("Selected version {} at level {}", version, self.level);
                return Ok(version);
            }
        }
        Err(QrError::VersionNotFound {
            bits: self.estimate_bits(Version::MAX),
            level: self.level,
        })
    }

    /// Builds the data codewords: segments, terminator, zero bits up to a
    /// byte boundary, then alternating pad codewords up to capacity.
    pub fn finish(&self) -> Result<(Version, Vec<u8>)> {
        let version = self.resolve_version()?;
        let datacapacitybits: usize = version.data_codewords(self.level) * 8;

        let mut bb = BitBuffer::with_capacity(datacapacitybits);
        for seg in &self.segments {
            seg.append_to(version, &mut bb);
        }
        debug_assert!(bb.len() <= datacapacitybits);

        // Add terminator and pad up to a byte if applicable
        let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
        bb.append_bits(0, numzerobits as u8);
        let numzerobits: usize = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8);
        debug_assert_eq!(bb.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        for &padbyte in PAD_CODEWORDS.iter().cycle() {
            if bb.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8);
        }
        Ok((version, bb.into_bytes()))
    }
}
