//! PHY header codec for the 2.4 GHz O-QPSK LR-WPAN PHY
//!
//! The synchronization header (preamble + SFD), the optional jamming-resistance
//! byte (JRB) and the PHY header byte (PHR) are laid out as follows:
//!
//! ```text
//! JRB disabled:        | preamble 32 | SFD 8 | PHR 7 | r 1 |
//! JRB enabled, early:  | preamble 32 | SFD 8 | JRB 8 | r 1 | PHR 7 |
//! JRB enabled, late:   | preamble 32 | SFD 8 | r 1 | PHR 7 | JRB 8 |
//! ```

use crate::encoding::{BitDecoder, BitEncoder, BitString};
use crate::error::{FrameError, Result};
use crate::ieee802154;
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-run PHY configuration
///
/// Fixed for the lifetime of a simulation run: field widths and ordering of
/// every codec call are derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhyConfig {
    /// Whether frames carry a jamming-resistance byte
    pub jrb_enabled: bool,
    /// Place the JRB before the PHR instead of after it
    pub early_jrb: bool,
    /// Seed of the run-scoped JRB generator
    pub seed: u64,
}

impl PhyConfig {
    /// Configuration with the JRB disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the JRB
    pub fn with_jrb(mut self, enabled: bool) -> Self {
        self.jrb_enabled = enabled;
        self
    }

    /// Choose JRB placement relative to the PHR
    pub fn with_early_jrb(mut self, early: bool) -> Self {
        self.early_jrb = early;
        self
    }

    /// Set the run seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// PHY header length in octets (6, or 7 with the JRB)
    pub fn phy_header_len(&self) -> usize {
        if self.jrb_enabled {
            ieee802154::PHY_HEADER_LEN + 1
        } else {
            ieee802154::PHY_HEADER_LEN
        }
    }

    /// PHY header length in bits (48, or 56 with the JRB)
    pub fn phy_header_bits(&self) -> usize {
        self.phy_header_len() * 8
    }

    /// Fresh generator for this run's JRB tokens
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

/// Jamming-resistance byte: 6 information bits followed by 2 parity bits
///
/// Bit 1 is the XOR of the upper three information bits, bit 0 the XOR of the
/// lower three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JammingResistance(u8);

impl JammingResistance {
    /// Number of random information bits
    pub const INFO_BITS: u32 = 6;

    /// Build the byte for 6 information bits
    pub fn from_info_bits(info: u8) -> Result<Self> {
        if info >= 1 << Self::INFO_BITS {
            return Err(FrameError::range(format!(
                "JRB information value {} exceeds {} bits",
                info,
                Self::INFO_BITS
            )));
        }
        Ok(Self::with_parity(info))
    }

    /// Draw a fresh token from the run's generator
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let info: u8 = rng.gen_range(0..1 << Self::INFO_BITS);
        let jrb = Self::with_parity(info);
        trace!("Generated JRB {:#010b} from info bits {:#08b}", jrb.0, info);
        jrb
    }

    /// Wrap a byte as read off the channel; parity is not checked
    pub fn from_raw(value: u8) -> Self {
        JammingResistance(value)
    }

    /// Raw byte value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The 6 information bits
    pub fn info_bits(&self) -> u8 {
        self.0 >> 2
    }

    /// Parity bit over the upper information half
    pub fn parity_hi(&self) -> bool {
        (self.0 >> 1) & 1 != 0
    }

    /// Parity bit over the lower information half
    pub fn parity_lo(&self) -> bool {
        self.0 & 1 != 0
    }

    /// Whether both parity bits agree with their halves
    pub fn parity_ok(&self) -> bool {
        Self::with_parity(self.info_bits()) == *self
    }

    fn with_parity(info: u8) -> Self {
        let hi = parity3(info >> 3);
        let lo = parity3(info & 0b111);
        JammingResistance((info << 2) | (hi << 1) | lo)
    }
}

fn parity3(half: u8) -> u8 {
    (half ^ (half >> 1) ^ (half >> 2)) & 1
}

/// PHY header of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhyHeader {
    /// Preamble, always zero in this model
    pub preamble: u32,
    /// Start-of-frame delimiter
    pub sfd: u8,
    /// Jamming-resistance byte, present iff the JRB is enabled
    pub jrb: Option<JammingResistance>,
    /// Frame length in octets (7 bits)
    pub phr: u8,
}

impl PhyHeader {
    /// Header without a JRB
    pub fn new(phr: u8) -> Self {
        PhyHeader {
            preamble: 0,
            sfd: ieee802154::SFD,
            jrb: None,
            phr,
        }
    }

    /// Header for a run, drawing a JRB when the configuration enables it
    pub fn for_config<R: Rng + ?Sized>(phr: u8, config: &PhyConfig, rng: &mut R) -> Self {
        let mut header = Self::new(phr);
        if config.jrb_enabled {
            header.jrb = Some(JammingResistance::generate(rng));
        }
        header
    }

    /// Attach a JRB
    pub fn with_jrb(mut self, jrb: JammingResistance) -> Self {
        self.jrb = Some(jrb);
        self
    }

    /// Serialize into the on-air bit order
    ///
    /// A header without a JRB under a JRB-enabled configuration is written
    /// with an all-zero JRB byte.
    pub fn serialize(&self, config: &PhyConfig) -> Result<BitString> {
        let mut bits = BitString::with_capacity(config.phy_header_bits());
        bits.append(&BitEncoder::encode_u16((self.preamble >> 16) as u16));
        bits.append(&BitEncoder::encode_u16(self.preamble as u16));
        bits.append(&BitEncoder::encode_u8(self.sfd));

        let phr = BitEncoder::encode_u7(self.phr)?;
        if config.jrb_enabled {
            let jrb = BitEncoder::encode_u8(self.jrb.map(|j| j.value()).unwrap_or(0));
            if config.early_jrb {
                bits.append(&jrb);
                bits.push_bit(false);
                bits.append(&phr);
            } else {
                bits.push_bit(false);
                bits.append(&phr);
                bits.append(&jrb);
            }
        } else {
            bits.append(&phr);
            bits.push_bit(false);
        }

        trace!("PHY header bits: {}", bits);
        Ok(bits)
    }

    /// Parse a header from the start of `bits`
    ///
    /// Trailing bits beyond the header width are ignored.
    pub fn deserialize(bits: &BitString, config: &PhyConfig) -> Result<Self> {
        let width = config.phy_header_bits();
        if bits.len() < width {
            return Err(FrameError::format(format!(
                "PHY header needs {} bits, got {}",
                width,
                bits.len()
            )));
        }

        let preamble = BitDecoder::decode(bits.slice(0, 32)?.as_str())?;
        let sfd = BitDecoder::decode_u8(&bits.slice(32, 8)?)?;

        let (phr_offset, jrb_offset) = match (config.jrb_enabled, config.early_jrb) {
            (false, _) => (40, None),
            (true, true) => (49, Some(40)),
            (true, false) => (41, Some(48)),
        };
        let phr = BitDecoder::decode_u8(&bits.slice(phr_offset, 7)?)?;
        let jrb = match jrb_offset {
            Some(offset) => Some(JammingResistance::from_raw(BitDecoder::decode_u8(
                &bits.slice(offset, 8)?,
            )?)),
            None => None,
        };

        Ok(PhyHeader {
            preamble,
            sfd,
            jrb,
            phr,
        })
    }

    /// Packet-buffer form: preamble (big-endian), SFD, then PHR and JRB in
    /// the configured order
    ///
    /// 6 octets, or 7 with the JRB. A missing JRB under a JRB-enabled
    /// configuration is written as zero, like the bit form.
    pub fn to_bytes(&self, config: &PhyConfig) -> Result<Vec<u8>> {
        if self.phr >= 1 << 7 {
            return Err(FrameError::range(format!(
                "PHR {} exceeds 7 bits",
                self.phr
            )));
        }

        let mut data = Vec::with_capacity(config.phy_header_len());
        data.extend_from_slice(&self.preamble.to_be_bytes());
        data.push(self.sfd);

        let jrb = self.jrb.map(|j| j.value()).unwrap_or(0);
        match (config.jrb_enabled, config.early_jrb) {
            (false, _) => data.push(self.phr),
            (true, true) => data.extend_from_slice(&[jrb, self.phr]),
            (true, false) => data.extend_from_slice(&[self.phr, jrb]),
        }
        Ok(data)
    }

    /// Parse the packet-buffer form from the start of `data`
    ///
    /// Trailing octets beyond the header are ignored. The reserved PHR bit is
    /// masked off.
    pub fn from_bytes(data: &[u8], config: &PhyConfig) -> Result<Self> {
        let len = config.phy_header_len();
        if data.len() < len {
            return Err(FrameError::format(format!(
                "PHY header needs {} bytes, got {}",
                len,
                data.len()
            )));
        }

        let preamble = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let sfd = data[4];
        let (phr, jrb) = match (config.jrb_enabled, config.early_jrb) {
            (false, _) => (data[5], None),
            (true, true) => (data[6], Some(data[5])),
            (true, false) => (data[5], Some(data[6])),
        };

        Ok(PhyHeader {
            preamble,
            sfd,
            jrb: jrb.map(JammingResistance::from_raw),
            phr: phr & 0x7f,
        })
    }
}

impl std::fmt::Display for PhyHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preamble = {}, SFD = {:#04x}", self.preamble, self.sfd)?;
        if let Some(jrb) = self.jrb {
            write!(f, ", JRB = {:#010b}", jrb.value())?;
        }
        write!(f, ", PHR = {}", self.phr)
    }
}
