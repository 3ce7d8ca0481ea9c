//! Binary-string representation of on-air bits
//!
//! Every frame that goes out on the simulated channel is carried as a string of
//! `'0'`/`'1'` characters, one character per bit, most-significant bit first
//! within each octet and octets in transmission order.

use crate::error::{FrameError, Result};
use std::fmt;

/// An ordered sequence of `'0'`/`'1'` characters
///
/// The inner string never contains any other character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct BitString(String);

impl BitString {
    /// Create an empty bit string
    pub fn new() -> Self {
        BitString(String::new())
    }

    /// Create an empty bit string with room for `bits` characters
    pub fn with_capacity(bits: usize) -> Self {
        BitString(String::with_capacity(bits))
    }

    /// Parse a bit string, rejecting anything but `'0'` and `'1'`
    pub fn parse(s: &str) -> Result<Self> {
        if let Some((pos, c)) = s.char_indices().find(|&(_, c)| c != '0' && c != '1') {
            return Err(FrameError::format(format!(
                "Invalid character {:?} at position {} in bit string",
                c, pos
            )));
        }
        Ok(BitString(s.to_string()))
    }

    /// Serialize a byte slice, one octet after another, each MSB first
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = BitString::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            bits.append(&BitEncoder::encode_u8(byte));
        }
        bits
    }

    /// Pack the bits back into octets
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.0.len() % 8 != 0 {
            return Err(FrameError::format(format!(
                "Bit string of length {} is not byte aligned",
                self.0.len()
            )));
        }
        self.0
            .as_bytes()
            .chunks(8)
            .map(|chunk| {
                // chunks of an ASCII string are valid UTF-8
                let s = std::str::from_utf8(chunk)
                    .map_err(|e| FrameError::format(e.to_string()))?;
                Ok(BitDecoder::decode(s)? as u8)
            })
            .collect()
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the string holds no bits
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of whole octets
    pub fn byte_len(&self) -> usize {
        self.0.len() / 8
    }

    /// Borrow the raw characters
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bit at `index`, if in range
    pub fn bit(&self, index: usize) -> Option<bool> {
        self.0.as_bytes().get(index).map(|&c| c == b'1')
    }

    /// Append a single bit
    pub fn push_bit(&mut self, bit: bool) {
        self.0.push(if bit { '1' } else { '0' });
    }

    /// Append another bit string
    pub fn append(&mut self, other: &BitString) {
        self.0.push_str(&other.0);
    }

    /// Copy `len` bits starting at `start`
    pub fn slice(&self, start: usize, len: usize) -> Result<BitString> {
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.0.len())
            .ok_or_else(|| {
                FrameError::format(format!(
                    "Slice {}..{}+{} out of range for {} bits",
                    start,
                    start,
                    len,
                    self.0.len()
                ))
            })?;
        Ok(BitString(self.0[start..end].to_string()))
    }

    /// Invert up to `count` bits starting at `start`
    ///
    /// Stops at the end of the string. Returns the number of bits flipped.
    pub fn flip_range(&mut self, start: usize, count: usize) -> usize {
        let end = start.saturating_add(count).min(self.0.len());
        if start >= end {
            return 0;
        }
        let flipped: String = self.0[start..end]
            .chars()
            .map(|c| if c == '1' { '0' } else { '1' })
            .collect();
        self.0.replace_range(start..end, &flipped);
        end - start
    }

    /// Character order reversed
    pub fn reverse(&self) -> BitString {
        BitString(self.0.chars().rev().collect())
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BitString {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self> {
        BitString::parse(&value)
    }
}

impl From<BitString> for String {
    fn from(bits: BitString) -> Self {
        bits.0
    }
}

impl std::str::FromStr for BitString {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        BitString::parse(s)
    }
}

/// Fixed-width encoders for header fields
pub struct BitEncoder;

impl BitEncoder {
    /// 8-character zero-padded binary digits of `n`
    pub fn encode_u8(n: u8) -> BitString {
        BitString(format!("{:08b}", n))
    }

    /// 7-character zero-padded binary digits of `n`
    ///
    /// Fails when `n` does not fit into 7 bits.
    pub fn encode_u7(n: u8) -> Result<BitString> {
        if n >= 0x80 {
            return Err(FrameError::range(format!(
                "Value {} does not fit into 7 bits",
                n
            )));
        }
        Ok(BitString(format!("{:07b}", n)))
    }

    /// 16-character zero-padded binary digits of `n`
    pub fn encode_u16(n: u16) -> BitString {
        BitString(format!("{:016b}", n))
    }
}

/// Decoder for fixed-width fields
pub struct BitDecoder;

impl BitDecoder {
    /// Parse `s` as an unsigned base-2 integer
    pub fn decode(s: &str) -> Result<u32> {
        if s.is_empty() {
            return Err(FrameError::format("Cannot decode an empty bit string"));
        }
        if s.len() > 32 {
            return Err(FrameError::range(format!(
                "Bit string of length {} exceeds 32 bits",
                s.len()
            )));
        }
        if s.bytes().any(|c| c != b'0' && c != b'1') {
            return Err(FrameError::format(format!("Not a bit string: {:?}", s)));
        }
        u32::from_str_radix(s, 2).map_err(|e| FrameError::format(e.to_string()))
    }

    /// Decode a bit string that must fit into 8 bits
    pub fn decode_u8(bits: &BitString) -> Result<u8> {
        let value = Self::decode(bits.as_str())?;
        u8::try_from(value)
            .map_err(|_| FrameError::range(format!("Value {} exceeds 8 bits", value)))
    }

    /// Decode a bit string that must fit into 16 bits
    pub fn decode_u16(bits: &BitString) -> Result<u16> {
        let value = Self::decode(bits.as_str())?;
        u16::try_from(value)
            .map_err(|_| FrameError::range(format!("Value {} exceeds 16 bits", value)))
    }
}
