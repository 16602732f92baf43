//! GF(2^8) arithmetic and the Reed-Solomon remainder generator used for QR
//! error correction codewords.
//!
//! The field is generated by the QR primitive polynomial 0x11D
//! (x⁸ + x⁴ + x³ + x² + 1) with α = 0x02. Log and antilog tables are built at
//! compile time and shared read-only by every encode.

/// QR primitive polynomial: x⁸ + x⁴ + x³ + x² + 1
const GF256_GENERATOR: u16 = 0x11D;

struct GaloisTables {
    log: [u8; 256],
    antilog: [u8; 256],
}

const fn build_tables() -> GaloisTables {
    let mut log = [0u8; 256];
    let mut antilog = [0u8; 256];
    let mut b: u16 = 1;
    let mut l = 0;
    while l < 255 {
        log[b as usize] = l as u8;
        antilog[l] = b as u8;
        b <<= 1;
        if b & 0x100 != 0 {
            b ^= GF256_GENERATOR;
        }
        l += 1;
    }
    // α^255 == α^0
    antilog[255] = 1;
    GaloisTables { log, antilog }
}

static TABLES: GaloisTables = build_tables();

/// Element operations over GF(256).
pub struct Gf256;

impl Gf256 {
    /// α^power, for any power (reduced modulo 255).
    pub fn exp(power: usize) -> u8 {
        TABLES.antilog[power % 255]
    }

    /// Discrete logarithm of a non-zero element.
    ///
    /// # Panics
    ///
    /// Panics if `value` is zero, which has no logarithm.
    pub fn log(value: u8) -> u8 {
        assert_ne!(value, 0, "Logarithm of zero is undefined");
        TABLES.log[usize::from(value)]
    }

    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let sum = usize::from(TABLES.log[usize::from(a)]) + usize::from(TABLES.log[usize::from(b)]);
        TABLES.antilog[sum % 255]
    }

    /// Field division `a / b`.
    ///
    /// # Panics
    ///
    /// Panics on division by zero.
    pub fn div(a: u8, b: u8) -> u8 {
        assert_ne!(b, 0, "Division by zero");
        if a == 0 {
            return 0;
        }
        let diff =
            usize::from(TABLES.log[usize::from(a)]) + 255 - usize::from(TABLES.log[usize::from(b)]);
        TABLES.antilog[diff % 255]
    }
}

/// Multiplies two polynomials whose coefficients are stored highest power first.
pub fn poly_multiply(a: &[u8], b: &[u8]) -> Vec<u8> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut result = vec![0u8; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            result[i + j] ^= Gf256::mul(x, y);
        }
    }
    result
}

/// Computes Reed-Solomon error correction codewords for one block.
///
/// The generator polynomial is ∏(x - α^i) for i in 0..degree. Its coefficients
/// are kept highest power first with the leading 1 dropped.
pub struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the generator for `degree` error correction codewords.
    ///
    /// # Panics
    ///
    /// Panics if `degree` is not in 1..=255.
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        let mut generator: Vec<u8> = vec![1];
        for i in 0..degree {
            // Subtraction is XOR, so (x - α^i) == (x + α^i)
            generator = poly_multiply(&generator, &[1, Gf256::exp(i)]);
        }
        generator.remove(0);
        Self { divisor: generator }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Generator coefficients, highest power first, without the leading 1.
    pub fn divisor(&self) -> &[u8] {
        &self.divisor
    }

    /// Remainder of `data(x) * x^degree` divided by the generator.
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            let last = result.len() - 1;
            result[last] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Gf256::mul(y, factor);
            }
        }
        result
    }
}
