//! Fixed-width bit sequences
//!
//! Every x86 opcode, ModR/M field and immediate is a fixed-width group of
//! bits. Instructions are assembled by joining these groups most significant
//! bit first and serializing the result to bytes once the whole instruction
//! is byte aligned.

use crate::error::{BackendError, Result};
use std::borrow::Borrow;
use std::fmt;

/// An ordered sequence of bits, most significant first
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSequence {
    bits: Vec<bool>,
}

impl BitSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Build a sequence from individual bits
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// Eight bits of a single byte
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bits((0..8).rev().map(|i| (byte >> i) & 1 == 1))
    }

    /// Bytes in the given order, each most significant bit first
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::join(bytes.iter().map(|&b| Self::from_byte(b)))
    }

    /// Parse hex digits; every digit expands to exactly four bits
    pub fn from_hex(digits: &str) -> Result<Self> {
        if digits.is_empty() {
            return Err(malformed(digits, "empty literal"));
        }

        let mut bits = Vec::with_capacity(digits.len() * 4);
        for c in digits.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| malformed(digits, &format!("'{}' is not a hex digit", c)))?;
            bits.extend((0..4).rev().map(|i| (nibble >> i) & 1 == 1));
        }

        Ok(Self { bits })
    }

    /// Parse a string of '0' and '1' characters
    pub fn from_binary(digits: &str) -> Result<Self> {
        if digits.is_empty() {
            return Err(malformed(digits, "empty literal"));
        }

        digits
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(malformed(
                    digits,
                    &format!("'{}' is not a binary digit", other),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(|bits| Self { bits })
    }

    /// Encode `value` in exactly `width` bits
    ///
    /// A width of zero holds no value and is rejected with `Overflow`.
    pub fn from_unsigned(value: u64, width: usize) -> Result<Self> {
        Self::from_wide(u128::from(value), width)
    }

    /// Parse a non-negative decimal literal into exactly `width` bits
    pub fn from_decimal(digits: &str, width: usize) -> Result<Self> {
        if digits.is_empty() {
            return Err(malformed(digits, "empty literal"));
        }
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(malformed(
                digits,
                &format!("'{}' is not a decimal digit", c),
            ));
        }

        let value: u128 = digits
            .parse()
            .map_err(|_| malformed(digits, "literal exceeds 128 bits"))?;
        Self::from_wide(value, width)
    }

    fn from_wide(value: u128, width: usize) -> Result<Self> {
        let fits = width > 0 && (width >= 128 || value >> width == 0);
        if !fits {
            return Err(BackendError::Overflow { value, width });
        }

        let bits = (0..width)
            .rev()
            .map(|i| i < 128 && (value >> i) & 1 == 1)
            .collect();
        Ok(Self { bits })
    }

    /// Concatenate sequences in argument order
    pub fn join<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<BitSequence>,
    {
        let mut out = Self::new();
        for part in parts {
            out.append(part.borrow());
        }
        out
    }

    /// Append another sequence to the end of this one
    pub fn append(&mut self, other: &BitSequence) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Length in bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Serialize to bytes in construction order
    ///
    /// Fails with `AlignmentError` unless the length is a multiple of eight.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.bits.len() % 8 != 0 {
            return Err(BackendError::AlignmentError {
                len: self.bits.len(),
            });
        }

        Ok(self
            .bits
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
            .collect())
    }

    /// Interpret the whole sequence as an unsigned number
    ///
    /// Returns `None` when the value needs more than 64 bits.
    pub fn to_unsigned(&self) -> Option<u64> {
        let mut value: u64 = 0;
        for &bit in &self.bits {
            if value >> 63 == 1 {
                return None;
            }
            value = (value << 1) | bit as u64;
        }
        Some(value)
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

fn malformed(literal: &str, reason: &str) -> BackendError {
    BackendError::MalformedLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}
