//! Version and error-correction tables, and the function-pattern template
//! every symbol starts from.
//!
//! All lookups are static tables indexed by version (1..=40) and level; the
//! block structure in particular is read from [`BLOCKS`] rather than derived.

use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;

use crate::error::{QrError, Result};
use crate::mask::Mask;
use crate::matrix::{Module, ModuleMatrix};

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    pub const ALL: [QrCodeEcc; 4] = [
        QrCodeEcc::Low,
        QrCodeEcc::Medium,
        QrCodeEcc::Quartile,
        QrCodeEcc::High,
    ];

    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// The 2-bit level indicator carried in the format information.
    pub fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

impl TryFrom<u8> for QrCodeEcc {
    type Error = QrError;

    fn try_from(value: u8) -> Result<Self> {
        QrCodeEcc::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| QrError::InvalidLevel(value.to_string()))
    }
}

impl FromStr for QrCodeEcc {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        use QrCodeEcc::*;
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" | "0" => Ok(Low),
            "m" | "medium" | "1" => Ok(Medium),
            "q" | "quartile" | "2" => Ok(Quartile),
            "h" | "high" | "3" => Ok(High),
            _ => Err(QrError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for QrCodeEcc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = ['L', 'M', 'Q', 'H'][self.ordinal()];
        write!(f, "{}", c)
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40]. Use
    /// `Version::try_from` for unchecked input.
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length in modules: `17 + 4 * version`.
    pub const fn width(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// Versions from 1 through 40, in order.
    pub fn all() -> impl Iterator<Item = Version> {
        (Version::MIN.0..=Version::MAX.0).map(Version)
    }

    /// Index into the character count indicator tables: 0 for versions 1–9,
    /// 1 for 10–26, 2 for 27–40.
    pub fn tier(self) -> usize {
        usize::from((self.0 + 7) / 17)
    }

    /// Total codewords (data plus error correction) the symbol carries.
    pub fn total_codewords(self) -> usize {
        usize::from(CAPACITY[usize::from(self.0)].words)
    }

    /// Stray modules left over after the last whole codeword.
    pub fn remainder_bits(self) -> usize {
        usize::from(CAPACITY[usize::from(self.0)].remainder)
    }

    /// Codewords left for data once the level's EC codewords are taken.
    pub fn data_codewords(self, ecl: QrCodeEcc) -> usize {
        let cap = &CAPACITY[usize::from(self.0)];
        usize::from(cap.words) - usize::from(cap.ec[ecl.ordinal()])
    }

    /// Total codewords, EC codewords per block and block groups for a level.
    pub fn capacities(self, ecl: QrCodeEcc) -> Capacities {
        let cap = &CAPACITY[usize::from(self.0)];
        let [short, long] = BLOCKS[usize::from(self.0)][ecl.ordinal()];
        let (short, long) = (usize::from(short), usize::from(long));
        let numblocks = short + long;
        let ecc_codewords = usize::from(cap.ec[ecl.ordinal()]);
        let data_codewords = usize::from(cap.words) - ecc_codewords;
        let shortlen = (data_codewords - long) / numblocks;
        Capacities {
            total_codewords: usize::from(cap.words),
            data_codewords,
            ecc_codewords,
            ecc_per_block: ecc_codewords / numblocks,
            groups: [
                BlockGroup {
                    blocks: short,
                    data_codewords: shortlen,
                },
                BlockGroup {
                    blocks: long,
                    data_codewords: shortlen + 1,
                },
            ],
        }
    }

    /// Alignment pattern centre coordinates, ascending; empty for version 1.
    pub fn alignment_positions(self) -> &'static [u8] {
        ALIGNMENT[usize::from(self.0)]
    }

    /// Builds the unfilled template: function patterns drawn, format and
    /// version areas reserved, every other module [`Module::Unset`].
    pub fn template(self) -> ModuleMatrix {
        let size = self.width();
        let mut frame = ModuleMatrix::new(size);

        // Timing patterns
        for i in 0..size {
            frame.set(6, i, Module::Function(i % 2 == 0));
            frame.set(i, 6, Module::Function(i % 2 == 0));
        }

        // Finder patterns with their separators
        let last = size as i32 - 4;
        for (cx, cy) in [(3, 3), (last, 3), (3, last)] {
            for dy in -4i32..=4 {
                for dx in -4i32..=4 {
                    let (x, y) = (cx + dx, cy + dy);
                    if (0..size as i32).contains(&x) && (0..size as i32).contains(&y) {
                        let dist: i32 = dx.abs().max(dy.abs());
                        frame.set(x as usize, y as usize, Module::Function(dist != 2 && dist != 4));
                    }
                }
            }
        }

        let alignpatpos = self.alignment_positions();
        let numalign = alignpatpos.len();
        for (i, &pos0) in alignpatpos.iter().enumerate() {
            for (j, &pos1) in alignpatpos.iter().enumerate() {
                // Skip the three finder corners
                let last = numalign - 1;
                if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                    continue;
                }
                for dy in -2i32..=2 {
                    for dx in -2i32..=2 {
                        let x = (i32::from(pos0) + dx) as usize;
                        let y = (i32::from(pos1) + dy) as usize;
                        frame.set(x, y, Module::Function(dx.abs().max(dy.abs()) != 1));
                    }
                }
            }
        }

        for [a, b] in format_info_positions(size) {
            frame.set(a.0, a.1, Module::Reserved(false));
            frame.set(b.0, b.1, Module::Reserved(false));
        }
        // Always-dark module beside the lower-left format area
        frame.set(8, size - 8, Module::Function(true));

        if self.0 >= 7 {
            for [a, b] in version_info_positions(size) {
                frame.set(a.0, a.1, Module::Reserved(false));
                frame.set(b.0, b.1, Module::Reserved(false));
            }
        }
        frame
    }
}

impl TryFrom<u8> for Version {
    type Error = QrError;

    fn try_from(value: u8) -> Result<Self> {
        if (Version::MIN.0..=Version::MAX.0).contains(&value) {
            Ok(Version(value))
        } else {
            Err(QrError::InvalidVersion(value))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A run of equally sized error correction blocks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockGroup {
    pub blocks: usize,
    pub data_codewords: usize,
}

/// Codeword budget of one version/level combination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Capacities {
    pub total_codewords: usize,
    pub data_codewords: usize,
    pub ecc_codewords: usize,
    pub ecc_per_block: usize,
    /// Short blocks first, then long blocks with one extra data codeword.
    /// The second group may be empty.
    pub groups: [BlockGroup; 2],
}

impl Capacities {
    pub fn num_blocks(&self) -> usize {
        self.groups.iter().map(|g| g.blocks).sum()
    }

    /// Data codeword counts of every block, in placement order.
    pub fn block_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups
            .iter()
            .flat_map(|g| std::iter::repeat(g.data_codewords).take(g.blocks))
    }
}

/// Side length in modules of a version, `17 + 4 * version`.
///
/// ```rust
/// assert_eq!(qrmatrix::spec::width_for(1).unwrap(), 21);
/// assert_eq!(qrmatrix::spec::width_for(40).unwrap(), 177);
/// assert!(qrmatrix::spec::width_for(41).is_err());
/// ```
pub fn width_for(version: u8) -> Result<usize> {
    Ok(Version::try_from(version)?.width())
}

/// Capacity table entry for a version and level.
pub fn capacities_for(version: u8, ecl: QrCodeEcc) -> Result<Capacities> {
    Ok(Version::try_from(version)?.capacities(ecl))
}

/// Stray bits after the last whole codeword of a version.
pub fn remainder_bits_for(version: u8) -> Result<usize> {
    Ok(Version::try_from(version)?.remainder_bits())
}

/// Fresh matrix with function patterns drawn and format/version areas reserved.
///
/// # Errors
///
/// [`QrError::InvalidVersion`] outside 1..=40.
pub fn new_template(version: u8) -> Result<ModuleMatrix> {
    Ok(Version::try_from(version)?.template())
}

/// The 15-bit BCH-protected format word for a level and mask, already XORed
/// with the 0x5412 mask pattern.
pub fn format_info_bits(ecl: QrCodeEcc, mask: Mask) -> u16 {
    FORMAT_INFO[ecl.ordinal()][usize::from(mask.value())]
}

/// The 18-bit version word, present only from version 7 up.
pub fn version_info_bits(version: Version) -> Option<u32> {
    let v = usize::from(version.value());
    (v >= 7).then(|| VERSION_PATTERN[v - 7])
}

/// Recovers level and mask from a format word, correcting up to 3 bit errors.
pub fn decode_format_bits(bits: u16) -> Option<(QrCodeEcc, Mask)> {
    let mut best: Option<(u32, QrCodeEcc, Mask)> = None;
    for ecl in QrCodeEcc::ALL {
        for (m, &word) in FORMAT_INFO[ecl.ordinal()].iter().enumerate() {
            let distance = (word ^ bits).count_ones();
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, ecl, Mask::new(m as u8)));
            }
        }
    }
    best.filter(|&(d, _, _)| d <= 3).map(|(_, ecl, mask)| (ecl, mask))
}

/// Coordinates `(x, y)` of format bit `i` (LSB first) in both copies.
pub fn format_info_positions(size: usize) -> [[(usize, usize); 2]; 15] {
    let mut result = [[(0, 0); 2]; 15];
    for (i, pair) in result.iter_mut().enumerate() {
        let first = match i {
            0..=5 => (8, i),
            6 => (8, 7),
            7 => (8, 8),
            8 => (7, 8),
            _ => (14 - i, 8),
        };
        let second = if i < 8 { (size - 1 - i, 8) } else { (8, size - 15 + i) };
        *pair = [first, second];
    }
    result
}

/// Coordinates `(x, y)` of version bit `i` (LSB first) in both copies.
pub fn version_info_positions(size: usize) -> [[(usize, usize); 2]; 18] {
    let mut result = [[(0, 0); 2]; 18];
    for (i, pair) in result.iter_mut().enumerate() {
        let a = size - 11 + i % 3;
        let b = i / 3;
        *pair = [(a, b), (b, a)];
    }
    result
}

struct Capacity {
    width: u8,
    words: u16,
    remainder: u8,
    ec: [u16; 4],
}

static CAPACITY: [Capacity; 41] = [
    Capacity { width: 0, words: 0, remainder: 0, ec: [0, 0, 0, 0] },
    Capacity { width: 21, words: 26, remainder: 0, ec: [7, 10, 13, 17] }, // 1
    Capacity { width: 25, words: 44, remainder: 7, ec: [10, 16, 22, 28] }, // 2
    Capacity { width: 29, words: 70, remainder: 7, ec: [15, 26, 36, 44] }, // 3
    Capacity { width: 33, words: 100, remainder: 7, ec: [20, 36, 52, 64] }, // 4
    Capacity { width: 37, words: 134, remainder: 7, ec: [26, 48, 72, 88] }, // 5
    Capacity { width: 41, words: 172, remainder: 7, ec: [36, 64, 96, 112] }, // 6
    Capacity { width: 45, words: 196, remainder: 0, ec: [40, 72, 108, 130] }, // 7
    Capacity { width: 49, words: 242, remainder: 0, ec: [48, 88, 132, 156] }, // 8
    Capacity { width: 53, words: 292, remainder: 0, ec: [60, 110, 160, 192] }, // 9
    Capacity { width: 57, words: 346, remainder: 0, ec: [72, 130, 192, 224] }, // 10
    Capacity { width: 61, words: 404, remainder: 0, ec: [80, 150, 224, 264] }, // 11
    Capacity { width: 65, words: 466, remainder: 0, ec: [96, 176, 260, 308] }, // 12
    Capacity { width: 69, words: 532, remainder: 0, ec: [104, 198, 288, 352] }, // 13
    Capacity { width: 73, words: 581, remainder: 3, ec: [120, 216, 320, 384] }, // 14
    Capacity { width: 77, words: 655, remainder: 3, ec: [132, 240, 360, 432] }, // 15
    Capacity { width: 81, words: 733, remainder: 3, ec: [144, 280, 408, 480] }, // 16
    Capacity { width: 85, words: 815, remainder: 3, ec: [168, 308, 448, 532] }, // 17
    Capacity { width: 89, words: 901, remainder: 3, ec: [180, 338, 504, 588] }, // 18
    Capacity { width: 93, words: 991, remainder: 3, ec: [196, 364, 546, 650] }, // 19
    Capacity { width: 97, words: 1085, remainder: 3, ec: [224, 416, 600, 700] }, // 20
    Capacity { width: 101, words: 1156, remainder: 4, ec: [224, 442, 644, 750] }, // 21
    Capacity { width: 105, words: 1258, remainder: 4, ec: [252, 476, 690, 816] }, // 22
    Capacity { width: 109, words: 1364, remainder: 4, ec: [270, 504, 750, 900] }, // 23
    Capacity { width: 113, words: 1474, remainder: 4, ec: [300, 560, 810, 960] }, // 24
    Capacity { width: 117, words: 1588, remainder: 4, ec: [312, 588, 870, 1050] }, // 25
    Capacity { width: 121, words: 1706, remainder: 4, ec: [336, 644, 952, 1110] }, // 26
    Capacity { width: 125, words: 1828, remainder: 4, ec: [360, 700, 1020, 1200] }, // 27
    Capacity { width: 129, words: 1921, remainder: 3, ec: [390, 728, 1050, 1260] }, // 28
    Capacity { width: 133, words: 2051, remainder: 3, ec: [420, 784, 1140, 1350] }, // 29
    Capacity { width: 137, words: 2185, remainder: 3, ec: [450, 812, 1200, 1440] }, // 30
    Capacity { width: 141, words: 2323, remainder: 3, ec: [480, 868, 1290, 1530] }, // 31
    Capacity { width: 145, words: 2465, remainder: 3, ec: [510, 924, 1350, 1620] }, // 32
    Capacity { width: 149, words: 2611, remainder: 3, ec: [540, 980, 1440, 1710] }, // 33
    Capacity { width: 153, words: 2761, remainder: 3, ec: [570, 1036, 1530, 1800] }, // 34
    Capacity { width: 157, words: 2876, remainder: 0, ec: [570, 1064, 1590, 1890] }, // 35
    Capacity { width: 161, words: 3034, remainder: 0, ec: [600, 1120, 1680, 1980] }, // 36
    Capacity { width: 165, words: 3196, remainder: 0, ec: [630, 1204, 1770, 2100] }, // 37
    Capacity { width: 169, words: 3362, remainder: 0, ec: [660, 1260, 1860, 2220] }, // 38
    Capacity { width: 173, words: 3532, remainder: 0, ec: [720, 1316, 1950, 2310] }, // 39
    Capacity { width: 177, words: 3706, remainder: 0, ec: [750, 1372, 2040, 2430] }, // 40
];

static BLOCKS: [[[u8; 2]; 4]; 41] = [
    [[0, 0], [0, 0], [0, 0], [0, 0]],
    [[1, 0], [1, 0], [1, 0], [1, 0]], // 1
    [[1, 0], [1, 0], [1, 0], [1, 0]], // 2
    [[1, 0], [1, 0], [2, 0], [2, 0]], // 3
    [[1, 0], [2, 0], [2, 0], [4, 0]], // 4
    [[1, 0], [2, 0], [2, 2], [2, 2]], // 5
    [[2, 0], [4, 0], [4, 0], [4, 0]], // 6
    [[2, 0], [4, 0], [2, 4], [4, 1]], // 7
    [[2, 0], [2, 2], [4, 2], [4, 2]], // 8
    [[2, 0], [3, 2], [4, 4], [4, 4]], // 9
    [[2, 2], [4, 1], [6, 2], [6, 2]], // 10
    [[4, 0], [1, 4], [4, 4], [3, 8]], // 11
    [[2, 2], [6, 2], [4, 6], [7, 4]], // 12
    [[4, 0], [8, 1], [8, 4], [12, 4]], // 13
    [[3, 1], [4, 5], [11, 5], [11, 5]], // 14
    [[5, 1], [5, 5], [5, 7], [11, 7]], // 15
    [[5, 1], [7, 3], [15, 2], [3, 13]], // 16
    [[1, 5], [10, 1], [1, 15], [2, 17]], // 17
    [[5, 1], [9, 4], [17, 1], [2, 19]], // 18
    [[3, 4], [3, 11], [17, 4], [9, 16]], // 19
    [[3, 5], [3, 13], [15, 5], [15, 10]], // 20
    [[4, 4], [17, 0], [17, 6], [19, 6]], // 21
    [[2, 7], [17, 0], [7, 16], [34, 0]], // 22
    [[4, 5], [4, 14], [11, 14], [16, 14]], // 23
    [[6, 4], [6, 14], [11, 16], [30, 2]], // 24
    [[8, 4], [8, 13], [7, 22], [22, 13]], // 25
    [[10, 2], [19, 4], [28, 6], [33, 4]], // 26
    [[8, 4], [22, 3], [8, 26], [12, 28]], // 27
    [[3, 10], [3, 23], [4, 31], [11, 31]], // 28
    [[7, 7], [21, 7], [1, 37], [19, 26]], // 29
    [[5, 10], [19, 10], [15, 25], [23, 25]], // 30
    [[13, 3], [2, 29], [42, 1], [23, 28]], // 31
    [[17, 0], [10, 23], [10, 35], [19, 35]], // 32
    [[17, 1], [14, 21], [29, 19], [11, 46]], // 33
    [[13, 6], [14, 23], [44, 7], [59, 1]], // 34
    [[12, 7], [12, 26], [39, 14], [22, 41]], // 35
    [[6, 14], [6, 34], [46, 10], [2, 64]], // 36
    [[17, 4], [29, 14], [49, 10], [24, 46]], // 37
    [[4, 18], [13, 32], [48, 14], [42, 32]], // 38
    [[20, 4], [40, 7], [43, 22], [10, 67]], // 39
    [[19, 6], [18, 31], [34, 34], [20, 61]], // 40
];

static ALIGNMENT: [&[u8]; 41] = [
    &[],
    &[], // 1
    &[6, 18], // 2
    &[6, 22], // 3
    &[6, 26], // 4
    &[6, 30], // 5
    &[6, 34], // 6
    &[6, 22, 38], // 7
    &[6, 24, 42], // 8
    &[6, 26, 46], // 9
    &[6, 28, 50], // 10
    &[6, 30, 54], // 11
    &[6, 32, 58], // 12
    &[6, 34, 62], // 13
    &[6, 26, 46, 66], // 14
    &[6, 26, 48, 70], // 15
    &[6, 26, 50, 74], // 16
    &[6, 30, 54, 78], // 17
    &[6, 30, 56, 82], // 18
    &[6, 30, 58, 86], // 19
    &[6, 34, 62, 90], // 20
    &[6, 28, 50, 72, 94], // 21
    &[6, 26, 50, 74, 98], // 22
    &[6, 30, 54, 78, 102], // 23
    &[6, 28, 54, 80, 106], // 24
    &[6, 32, 58, 84, 110], // 25
    &[6, 30, 58, 86, 114], // 26
    &[6, 34, 62, 90, 118], // 27
    &[6, 26, 50, 74, 98, 122], // 28
    &[6, 30, 54, 78, 102, 126], // 29
    &[6, 26, 52, 78, 104, 130], // 30
    &[6, 30, 56, 82, 108, 134], // 31
    &[6, 34, 60, 86, 112, 138], // 32
    &[6, 30, 58, 86, 114, 142], // 33
    &[6, 34, 62, 90, 118, 146], // 34
    &[6, 30, 54, 78, 102, 126, 150], // 35
    &[6, 24, 50, 76, 102, 128, 154], // 36
    &[6, 28, 54, 80, 106, 132, 158], // 37
    &[6, 32, 58, 84, 110, 136, 162], // 38
    &[6, 26, 54, 82, 110, 138, 166], // 39
    &[6, 30, 58, 86, 114, 142, 170], // 40
];

static VERSION_PATTERN: [u32; 34] = [
    0x07c94, 0x085bc, 0x09a99, 0x0a4d3, 0x0bbf6, 0x0c762,
    0x0d847, 0x0e60d, 0x0f928, 0x10b78, 0x1145d, 0x12a17,
    0x13532, 0x149a6, 0x15683, 0x168c9, 0x177ec, 0x18ec4,
    0x191e1, 0x1afab, 0x1b08e, 0x1cc1a, 0x1d33f, 0x1ed75,
    0x1f250, 0x209d5, 0x216f0, 0x228ba, 0x2379f, 0x24b0b,
    0x2542e, 0x26a64, 0x27541, 0x28c69,
];

static FORMAT_INFO: [[u16; 8]; 4] = [
    [0x77c4, 0x72f3, 0x7daa, 0x789d, 0x662f, 0x6318, 0x6c41, 0x6976],
    [0x5412, 0x5125, 0x5e7c, 0x5b4b, 0x45f9, 0x40ce, 0x4f97, 0x4aa0],
    [0x355f, 0x3068, 0x3f31, 0x3a06, 0x24b4, 0x2183, 0x2eda, 0x2bed],
    [0x1689, 0x13be, 0x1ce7, 0x19d0, 0x0762, 0x0255, 0x0d0c, 0x083b],
];

#[cfg(test)]
mod tests {
    use super::*;

    fn bch_remainder(data: u32, generator: u32, degree: u32) -> u32 {
        let mut rem = data << degree;
        let top = 32 - generator.leading_zeros() - 1;
        for shift in (0..=(31 - top)).rev() {
            if rem & (1 << (shift + top)) != 0 {
                rem ^= generator << shift;
            }
        }
        rem
    }

    #[test]
    fn test_width_table() {
        for v in Version::all() {
            assert_eq!(v.width(), 17 + 4 * usize::from(v.value()));
            assert_eq!(usize::from(CAPACITY[usize::from(v.value())].width), v.width());
            assert_eq!(width_for(v.value()), Ok(v.width()));
        }
    }

    #[test]
    fn test_out_of_range_lookups() {
        assert_eq!(width_for(0), Err(QrError::InvalidVersion(0)));
        assert_eq!(width_for(41), Err(QrError::InvalidVersion(41)));
        assert!(capacities_for(41, QrCodeEcc::Low).is_err());
        assert!(remainder_bits_for(0).is_err());
        assert!(new_template(200).is_err());
    }

    #[test]
    fn test_block_structure_matches_capacity() {
        for v in Version::all() {
            for ecl in QrCodeEcc::ALL {
                let caps = v.capacities(ecl);
                let data: usize = caps.block_lengths().sum();
                assert_eq!(data, caps.data_codewords, "v{v} {ecl}");
                assert_eq!(caps.ecc_per_block * caps.num_blocks(), caps.ecc_codewords);
                assert_eq!(caps.data_codewords + caps.ecc_codewords, caps.total_codewords);
                assert!(caps.groups[0].blocks > 0);
            }
        }
    }

    #[test]
    fn test_known_capacities() {
        let caps = capacities_for(5, QrCodeEcc::Quartile).unwrap();
        assert_eq!(caps.total_codewords, 134);
        assert_eq!(caps.ecc_per_block, 18);
        assert_eq!(caps.groups[0], BlockGroup { blocks: 2, data_codewords: 15 });
        assert_eq!(caps.groups[1], BlockGroup { blocks: 2, data_codewords: 16 });
        assert_eq!(Version::new(1).data_codewords(QrCodeEcc::Low), 19);
        assert_eq!(Version::new(40).data_codewords(QrCodeEcc::Low), 2956);
    }

    #[test]
    fn test_template_leaves_room_for_every_codeword() {
        for v in Version::all() {
            let frame = v.template();
            let free = frame.count(|m| m == Module::Unset);
            assert_eq!(free, v.total_codewords() * 8 + v.remainder_bits(), "version {v}");
            let reserved = frame.count(|m| matches!(m, Module::Reserved(_)));
            assert_eq!(reserved, if v.value() >= 7 { 30 + 36 } else { 30 });
        }
    }

    #[test]
    fn test_template_version1_layout() {
        let frame = new_template(1).unwrap();
        assert_eq!(frame.get(0, 0), Module::Function(true));
        assert_eq!(frame.get(1, 1), Module::Function(false));
        assert_eq!(frame.get(3, 3), Module::Function(true));
        assert_eq!(frame.get(7, 7), Module::Function(false));
        assert_eq!(frame.get(8, 13), Module::Function(true));
        assert_eq!(frame.get(9, 6), Module::Function(false));
        assert_eq!(frame.get(10, 6), Module::Function(true));
        assert_eq!(frame.get(8, 0), Module::Reserved(false));
        assert_eq!(frame.get(20, 20), Module::Unset);
    }

    #[test]
    fn test_alignment_centres() {
        let frame = Version::new(7).template();
        // Centre dark, ring light, border dark
        assert_eq!(frame.get(22, 22), Module::Function(true));
        assert_eq!(frame.get(23, 22), Module::Function(false));
        assert_eq!(frame.get(24, 22), Module::Function(true));
        assert_eq!(Version::new(32).alignment_positions(), &[6, 34, 60, 86, 112, 138]);
    }

    #[test]
    fn test_format_table_is_bch() {
        for ecl in QrCodeEcc::ALL {
            for m in 0..8u8 {
                let data = u32::from((ecl.format_bits() << 3) | m);
                let expected = ((data << 10) | bch_remainder(data, 0x537, 10)) ^ 0x5412;
                assert_eq!(u32::from(format_info_bits(ecl, Mask::new(m))), expected);
            }
        }
    }

    #[test]
    fn test_version_table_is_bch() {
        assert_eq!(version_info_bits(Version::new(6)), None);
        assert_eq!(version_info_bits(Version::new(7)), Some(0x07c94));
        for v in 7..=40u32 {
            let expected = (v << 12) | bch_remainder(v, 0x1f25, 12);
            assert_eq!(version_info_bits(Version::new(v as u8)), Some(expected));
        }
    }

    #[test]
    fn test_decode_format_bits_corrects_errors() {
        let word = format_info_bits(QrCodeEcc::Quartile, Mask::new(5));
        assert_eq!(decode_format_bits(word), Some((QrCodeEcc::Quartile, Mask::new(5))));
        assert_eq!(
            decode_format_bits(word ^ 0b100_0000_0100_0001),
            Some((QrCodeEcc::Quartile, Mask::new(5)))
        );
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("m".parse::<QrCodeEcc>(), Ok(QrCodeEcc::Medium));
        assert_eq!("High".parse::<QrCodeEcc>(), Ok(QrCodeEcc::High));
        assert_eq!(QrCodeEcc::try_from(2), Ok(QrCodeEcc::Quartile));
        assert_eq!(QrCodeEcc::try_from(4), Err(QrError::InvalidLevel("4".into())));
        assert!("X".parse::<QrCodeEcc>().is_err());
        assert_eq!(QrCodeEcc::Quartile.to_string(), "Q");
    }

    #[test]
    fn test_count_indicator_tiers() {
        assert_eq!(Version::new(9).tier(), 0);
        assert_eq!(Version::new(10).tier(), 1);
        assert_eq!(Version::new(26).tier(), 1);
        assert_eq!(Version::new(27).tier(), 2);
    }
}
