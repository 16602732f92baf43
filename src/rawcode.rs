//! Splits data codewords into error correction blocks, computes each block's
//! Reed-Solomon codewords and interleaves everything into placement order.

use crate::galois::ReedSolomonGenerator;
use crate::spec::{Capacities, QrCodeEcc, Version};

/// Data and error correction codewords of one block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CodewordBlock {
    pub data: Vec<u8>,
    pub ecc: Vec<u8>,
}

/// The complete codeword sequence of one symbol.
#[derive(Clone, Debug)]
pub struct RawCode {
    version: Version,
    capacities: Capacities,
    blocks: Vec<CodewordBlock>,
    codewords: Vec<u8>,
}

impl RawCode {
    /// # Panics
    ///
    /// Panics if `data` is not exactly the data capacity of `version`/`ecl`.
    pub fn new(data: &[u8], version: Version, ecl: QrCodeEcc) -> Self {
        let capacities = version.capacities(ecl);
        assert_eq!(
            data.len(),
            capacities.data_codewords,
            "Data codeword count does not match version {version} level {ecl}"
        );

        let rs = ReedSolomonGenerator::new(capacities.ecc_per_block);
        let mut rest: &[u8] = data;
        let blocks: Vec<CodewordBlock> = capacities
            .block_lengths()
            .map(|len| {
                let (dat, tail) = rest.split_at(len);
                rest = tail;
                CodewordBlock {
                    data: dat.to_vec(),
                    ecc: rs.compute_remainder(dat),
                }
            })
            .collect();
        debug_assert!(rest.is_empty());

        let codewords = Self::interleave(&blocks, capacities.total_codewords);
        Self {
            version,
            capacities,
            blocks,
            codewords,
        }
    }

    /// Data byte `i` of every block, then EC byte `i` of every block; blocks
    /// that ran out of data bytes are skipped.
    fn interleave(blocks: &[CodewordBlock], total: usize) -> Vec<u8> {
        let mut result = Vec::with_capacity(total);
        let maxdata = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
        for i in 0..maxdata {
            result.extend(blocks.iter().filter_map(|b| b.data.get(i)));
        }
        let ecclen = blocks.first().map_or(0, |b| b.ecc.len());
        for i in 0..ecclen {
            result.extend(blocks.iter().map(|b| b.ecc[i]));
        }
        debug_assert_eq!(result.len(), total);
        result
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn data_length(&self) -> usize {
        self.capacities.data_codewords
    }

    pub fn ecc_length(&self) -> usize {
        self.capacities.ecc_codewords
    }

    pub fn blocks(&self) -> &[CodewordBlock] {
        &self.blocks
    }

    /// Interleaved data and EC codewords, in placement order.
    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    /// Every codeword bit, most significant bit of each codeword first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.codewords
            .iter()
            .flat_map(|&code| (0..8).rev().map(move |i| (code >> i) & 1 != 0))
    }
}
