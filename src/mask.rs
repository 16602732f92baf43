//! Mask patterns, penalty scoring and mask selection.

use log::debug;
use rayon::prelude::*;

use crate::error::{QrError, Result};
use crate::matrix::{Module, ModuleMatrix};
use crate::spec::{self, QrCodeEcc, Version};

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Mask {
    type Error = QrError;

    fn try_from(value: u8) -> Result<Self> {
        if value <= 7 {
            Ok(Mask(value))
        } else {
            Err(QrError::InvalidMask(value))
        }
    }
}

/// How the mask of a symbol is chosen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum MaskStrategy {
    /// Score all eight patterns and keep the lowest penalty.
    #[default]
    Best,
    /// Score this many distinct patterns drawn at random (1..=8) and keep
    /// the lowest penalty. Not reproducible between runs.
    Random(usize),
    /// Use one pattern without scoring.
    Fixed(Mask),
}

/// One masked rendition of a frame.
#[derive(Clone, Debug)]
pub struct MaskCandidate {
    pub mask: Mask,
    pub matrix: ModuleMatrix,
    /// `None` when the mask was fixed and never scored.
    pub penalty: Option<i32>,
}

/// Penalty broken down by rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Penalty {
    /// Runs of five or more same-coloured modules.
    pub n1: i32,
    /// Uniform 2×2 blocks.
    pub n2: i32,
    /// Finder-like 1:1:3:1:1 patterns with four light modules on a side.
    pub n3: i32,
    /// Deviation of the dark share from 50%.
    pub n4: i32,
}

impl Penalty {
    pub fn total(&self) -> i32 {
        self.n1 + self.n2 + self.n3 + self.n4
    }
}

/// Whether mask `mask` inverts the module at column `x`, row `y`.
pub fn mask_bit(mask: Mask, x: usize, y: usize) -> bool {
    let (x, y) = (x as i32, y as i32);
    match mask.value() {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => ((x * y) % 2) + ((x * y) % 3) == 0,
        6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
        7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
        _ => unreachable!(),
    }
}

/// XORs the mask into every data module. Applying it twice undoes it.
pub fn apply_mask(frame: &mut ModuleMatrix, mask: Mask) {
    let size = frame.width();
    for y in 0..size {
        for x in 0..size {
            if mask_bit(mask, x, y) {
                frame.invert_data(x, y);
            }
        }
    }
}

/// Writes both copies of the format information.
pub fn draw_format_bits(frame: &mut ModuleMatrix, ecl: QrCodeEcc, mask: Mask) {
    let bits = spec::format_info_bits(ecl, mask);
    for (i, [a, b]) in spec::format_info_positions(frame.width()).into_iter().enumerate() {
        let bit = (bits >> i) & 1 != 0;
        frame.set(a.0, a.1, Module::Reserved(bit));
        frame.set(b.0, b.1, Module::Reserved(bit));
    }
}

/// Writes both copies of the version information (version 7 and up).
pub fn draw_version_bits(frame: &mut ModuleMatrix, version: Version) {
    let Some(bits) = spec::version_info_bits(version) else {
        return;
    };
    for (i, [a, b]) in spec::version_info_positions(frame.width()).into_iter().enumerate() {
        let bit = (bits >> i) & 1 != 0;
        frame.set(a.0, a.1, Module::Reserved(bit));
        frame.set(b.0, b.1, Module::Reserved(bit));
    }
}

/// Masked copy of `frame` with format and version information stamped.
pub fn make_mask(
    frame: &ModuleMatrix,
    mask: Mask,
    ecl: QrCodeEcc,
    version: Version,
) -> ModuleMatrix {
    let mut masked = frame.clone();
    apply_mask(&mut masked, mask);
    draw_format_bits(&mut masked, ecl, mask);
    draw_version_bits(&mut masked, version);
    masked
}

/// Masks and stamps a copy of `frame`, then scores it.
pub fn evaluate(
    frame: &ModuleMatrix,
    mask: Mask,
    ecl: QrCodeEcc,
    version: Version,
) -> MaskCandidate {
    let matrix = make_mask(frame, mask, ecl, version);
    let penalty = penalty(&matrix);
    debug!("Mask {} penalty {:?} = {}", mask.value(), penalty, penalty.total());
    MaskCandidate {
        mask,
        matrix,
        penalty: Some(penalty.total()),
    }
}

/// Picks the mask for a filled frame according to `strategy`.
///
/// Scored candidates are evaluated in parallel; the lowest penalty wins and
/// ties go to the lowest mask id.
pub fn select_mask(
    frame: &ModuleMatrix,
    ecl: QrCodeEcc,
    version: Version,
    strategy: MaskStrategy,
) -> MaskCandidate {
    let ids: Vec<u8> = match strategy {
        MaskStrategy::Fixed(mask) => {
            return MaskCandidate {
                mask,
                matrix: make_mask(frame, mask, ecl, version),
                penalty: None,
            };
        }
        MaskStrategy::Best => (0..8).collect(),
        MaskStrategy::Random(n) => rand::seq::index::sample(&mut rand::rng(), 8, n.clamp(1, 8))
            .into_iter()
            .map(|i| i as u8)
            .collect(),
    };

    let best = ids
        .into_par_iter()
        .map(|id| evaluate(frame, Mask::new(id), ecl, version))
        .min_by_key(|c| (c.penalty, c.mask))
        .unwrap_or_else(|| evaluate(frame, Mask::new(0), ecl, version));
    debug!("Selected mask {} with penalty {:?}", best.mask.value(), best.penalty);
    best
}

/// Scores a finished (masked and stamped) matrix.
pub fn penalty(frame: &ModuleMatrix) -> Penalty {
    let mut result = Penalty::default();
    let size = frame.width();

    // Rows, then columns
    for transpose in [false, true] {
        for a in 0..size {
            let at = |b: usize| if transpose { frame.is_dark(a, b) } else { frame.is_dark(b, a) };
            let mut runcolor = false;
            let mut runlen: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for b in 0..size {
                if at(b) == runcolor {
                    runlen += 1;
                    if runlen == 5 {
                        result.n1 += PENALTY_N1;
                    } else if runlen > 5 {
                        result.n1 += 1;
                    }
                } else {
                    runhistory.add_history(runlen);
                    if !runcolor {
                        result.n3 += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = at(b);
                    runlen = 1;
                }
            }
            result.n3 += runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3;
        }
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = frame.is_dark(x, y);
            if color == frame.is_dark(x + 1, y)
                && color == frame.is_dark(x, y + 1)
                && color == frame.is_dark(x + 1, y + 1)
            {
                result.n2 += PENALTY_N2;
            }
        }
    }

    // floor(|dark% - 50| / 5) on the exact ratio
    let dark = frame.dark_count() as i64;
    let total = (size * size) as i64;
    let k = (dark * 100 - total * 50).abs() / (total * 5);
    result.n4 = k as i32 * PENALTY_N4;
    result
}

/// Sum of the four penalty terms.
pub fn penalty_score(frame: &ModuleMatrix) -> i32 {
    penalty(frame).total()
}

/// Run-length history of one row or column, used to spot finder-like
/// patterns. The area outside the symbol counts as light.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size;
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        i32::from(
            n > 0
                && rh[2] == n
                && rh[3] == n * 3
                && rh[4] == n
                && rh[5] == n
                && (rh[0] >= n * 4 || rh[6] >= n * 4),
        )
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}
