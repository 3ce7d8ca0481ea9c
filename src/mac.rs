//! MAC header and trailer as carried inside an LR-WPAN frame

use crate::encoding::{BitDecoder, BitEncoder, BitString};
use crate::error::{FrameError, Result};
use crate::ieee802154::MAC_HEADER_LEN;
use bitfield::bitfield;

bitfield! {
    /// MAC frame control word
    ///
    /// Transmitted low octet first. Read MSB-first on the air that gives:
    /// reserved, PAN id compression, ack request, frame pending, security
    /// enabled, frame type (3), then source addressing mode (2), frame
    /// version (2), destination addressing mode (2), reserved (2).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FrameControl(u16);
    impl Debug;
    /// Raw frame type
    pub u8, frame_type_bits, set_frame_type_bits: 2, 0;
    /// Security enabled flag
    pub security_enabled, set_security_enabled: 3;
    /// Frame pending flag
    pub frame_pending, set_frame_pending: 4;
    /// Acknowledgment request flag
    pub ack_request, set_ack_request: 5;
    /// PAN id compression flag
    pub pan_id_compression, set_pan_id_compression: 6;
    /// Raw destination addressing mode
    pub u8, dst_addr_mode_bits, set_dst_addr_mode_bits: 11, 10;
    /// Frame version
    pub u8, frame_version, set_frame_version: 13, 12;
    /// Raw source addressing mode
    pub u8, src_addr_mode_bits, set_src_addr_mode_bits: 15, 14;
}

impl FrameControl {
    /// Wrap a raw frame control word
    pub fn from_raw(raw: u16) -> Self {
        FrameControl(raw)
    }

    /// Raw frame control word
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Decoded frame type
    pub fn frame_type(&self) -> FrameType {
        FrameType::from(self.frame_type_bits())
    }

    /// Set the frame type
    pub fn set_frame_type(&mut self, frame_type: FrameType) {
        self.set_frame_type_bits(frame_type.as_bits());
    }

    /// Decoded destination addressing mode
    pub fn dst_addr_mode(&self) -> AddressingMode {
        AddressingMode::from_bits(self.dst_addr_mode_bits())
    }

    /// Set the destination addressing mode
    pub fn set_dst_addr_mode(&mut self, mode: AddressingMode) {
        self.set_dst_addr_mode_bits(mode as u8);
    }

    /// Decoded source addressing mode
    pub fn src_addr_mode(&self) -> AddressingMode {
        AddressingMode::from_bits(self.src_addr_mode_bits())
    }

    /// Set the source addressing mode
    pub fn set_src_addr_mode(&mut self, mode: AddressingMode) {
        self.set_src_addr_mode_bits(mode as u8);
    }
}

/// MAC frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameType {
    /// Beacon frame
    Beacon,
    /// Data frame
    Data,
    /// Acknowledgment frame
    Ack,
    /// MAC command frame
    Command,
    /// Reserved type value (4-7)
    Reserved(u8),
}

impl FrameType {
    fn as_bits(&self) -> u8 {
        match self {
            FrameType::Beacon => 0,
            FrameType::Data => 1,
            FrameType::Ack => 2,
            FrameType::Command => 3,
            FrameType::Reserved(v) => v & 0b111,
        }
    }
}

impl From<u8> for FrameType {
    fn from(value: u8) -> Self {
        match value & 0b111 {
            0 => FrameType::Beacon,
            1 => FrameType::Data,
            2 => FrameType::Ack,
            3 => FrameType::Command,
            v => FrameType::Reserved(v),
        }
    }
}

/// Addressing mode of a source or destination field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingMode {
    /// No address present
    None = 0,
    /// Reserved
    Reserved = 1,
    /// 16-bit short address
    Short = 2,
    /// 64-bit extended address
    Extended = 3,
}

impl AddressingMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => AddressingMode::None,
            1 => AddressingMode::Reserved,
            2 => AddressingMode::Short,
            _ => AddressingMode::Extended,
        }
    }
}

/// MAC header with short addressing and both PAN identifiers (11 octets)
///
/// Multi-octet fields go out little-endian, as IEEE 802.15.4 orders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacHeader {
    /// Frame control word
    pub frame_control: FrameControl,
    /// Data sequence number
    pub sequence_number: u8,
    /// Destination PAN identifier
    pub dst_pan_id: u16,
    /// Destination short address
    pub dst_address: u16,
    /// Source PAN identifier
    pub src_pan_id: u16,
    /// Source short address
    pub src_address: u16,
}

impl MacHeader {
    /// Data frame header with short source and destination addresses
    pub fn data(
        sequence_number: u8,
        dst_pan_id: u16,
        dst_address: u16,
        src_pan_id: u16,
        src_address: u16,
    ) -> Self {
        let mut frame_control = FrameControl::default();
        frame_control.set_frame_type(FrameType::Data);
        frame_control.set_dst_addr_mode(AddressingMode::Short);
        frame_control.set_src_addr_mode(AddressingMode::Short);
        frame_control.set_frame_version(1);

        MacHeader {
            frame_control,
            sequence_number,
            dst_pan_id,
            dst_address,
            src_pan_id,
            src_address,
        }
    }

    /// Serialize into the 11 on-air octets
    pub fn to_bytes(&self) -> [u8; MAC_HEADER_LEN] {
        let mut out = [0u8; MAC_HEADER_LEN];
        out[0..2].copy_from_slice(&self.frame_control.raw().to_le_bytes());
        out[2] = self.sequence_number;
        out[3..5].copy_from_slice(&self.dst_pan_id.to_le_bytes());
        out[5..7].copy_from_slice(&self.dst_address.to_le_bytes());
        out[7..9].copy_from_slice(&self.src_pan_id.to_le_bytes());
        out[9..11].copy_from_slice(&self.src_address.to_le_bytes());
        out
    }

    /// Parse the 11 on-air octets
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != MAC_HEADER_LEN {
            return Err(FrameError::format(format!(
                "MAC header needs {} bytes, got {}",
                MAC_HEADER_LEN,
                data.len()
            )));
        }
        let u16_at = |i: usize| u16::from_le_bytes([data[i], data[i + 1]]);

        Ok(MacHeader {
            frame_control: FrameControl::from_raw(u16_at(0)),
            sequence_number: data[2],
            dst_pan_id: u16_at(3),
            dst_address: u16_at(5),
            src_pan_id: u16_at(7),
            src_address: u16_at(9),
        })
    }

    /// 88-bit on-air representation
    pub fn to_bits(&self) -> BitString {
        BitString::from_bytes(&self.to_bytes())
    }

    /// Parse the 88-bit on-air representation
    pub fn from_bits(bits: &BitString) -> Result<Self> {
        if bits.len() != MAC_HEADER_LEN * 8 {
            return Err(FrameError::format(format!(
                "MAC header needs {} bits, got {}",
                MAC_HEADER_LEN * 8,
                bits.len()
            )));
        }
        Self::from_bytes(&bits.to_bytes()?)
    }
}

/// MAC trailer holding the frame check sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacTrailer {
    /// CRC-16 over the MAC header and payload
    pub fcs: u16,
}

impl MacTrailer {
    /// Serialized width in bits
    pub const BITS: usize = 16;

    /// Trailer with a given FCS value
    pub fn new(fcs: u16) -> Self {
        MacTrailer { fcs }
    }

    /// Trailer whose FCS covers `data` (MAC header followed by payload)
    pub fn compute(data: &[u8]) -> Self {
        MacTrailer { fcs: crc16(data) }
    }

    /// Whether the FCS matches `data`
    pub fn check(&self, data: &[u8]) -> bool {
        crc16(data) == self.fcs
    }

    /// 16-bit on-air representation
    pub fn to_bits(&self) -> BitString {
        BitEncoder::encode_u16(self.fcs)
    }

    /// Parse the 16-bit on-air representation
    pub fn from_bits(bits: &BitString) -> Result<Self> {
        if bits.len() != Self::BITS {
            return Err(FrameError::format(format!(
                "FCS needs {} bits, got {}",
                Self::BITS,
                bits.len()
            )));
        }
        Ok(MacTrailer {
            fcs: BitDecoder::decode_u16(bits)?,
        })
    }
}

/// IEEE 802.15.4 FCS: CRC-16 (x^16 + x^12 + x^5 + 1), LSB first, zero init
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for b in data {
        for k in 0..8 {
            let bit = if b & (1 << k) != 0 {
                1 ^ (crc & 1)
            } else {
                crc & 1
            };
            crc >>= 1;
            if bit != 0 {
                crc ^= 1 << 15;
                crc ^= 1 << 10;
                crc ^= 1 << 3;
            }
        }
    }
    crc
}
