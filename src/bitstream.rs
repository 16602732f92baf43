/// A growable MSB-first bit sequence.
///
/// Bits are packed into bytes big-endian within each byte. The bit length is
/// tracked separately, so the final byte may be partially filled.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(bits.div_ceil(8)),
            length: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `len > 31` or `val` does not fit in `len` bits.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "Value out of range");
        for i in (0..len).rev() {
            let shift: u8 = 7 - ((self.length as u8) & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            if shift == 7 {
                self.data.push(bit << shift);
            } else if let Some(last) = self.data.last_mut() {
                *last |= bit << shift;
            }
            self.length += 1;
        }
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) {
        if self.length % 8 == 0 {
            self.data.extend_from_slice(bytes);
            self.length += bytes.len() * 8;
        } else {
            for &b in bytes {
                self.append_bits(u32::from(b), 8);
            }
        }
    }

    pub fn append(&mut self, other: &BitBuffer) {
        for i in 0..other.length {
            self.append_bits(u32::from(other.get(i)), 1);
        }
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.length, "Bit index out of range");
        (self.data[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// Packed bytes; trailing bits of a partial last byte are zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_bits_msb_first() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b0100, 4);
        bb.append_bits(0b00001011, 8);
        assert_eq!(bb.len(), 12);
        assert_eq!(bb.as_bytes(), &[0b0100_0000, 0b1011_0000]);
        assert!(bb.get(1));
        assert!(!bb.get(0));
    }

    #[test]
    fn test_append_bytes_unaligned() {
        let mut bb = BitBuffer::new();
        bb.append_bits(1, 1);
        bb.append_bytes(&[0xff, 0x00]);
        assert_eq!(bb.len(), 17);
        assert_eq!(bb.as_bytes(), &[0xff, 0x80, 0x00]);
    }

    #[test]
    fn test_append_buffer() {
        let mut a = BitBuffer::new();
        a.append_bits(0b101, 3);
        let mut b = BitBuffer::new();
        b.append_bits(0b11, 2);
        a.append(&b);
        assert_eq!(a.len(), 5);
        assert_eq!(a.as_bytes(), &[0b1011_1000]);
    }

    #[test]
    #[should_panic(expected = "Value out of range")]
    fn test_value_too_wide() {
        BitBuffer::new().append_bits(0b100, 2);
    }
}
