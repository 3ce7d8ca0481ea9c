//! Full-frame conversion between frames and their on-air bit strings

use crate::encoding::{BitEncoder, BitString};
use crate::error::{FrameError, Result};
use crate::ieee802154::{FCS_LEN, MAC_HEADER_LEN, MAX_PAYLOAD_LEN, MAX_PHY_PACKET_SIZE};
use crate::mac::{MacHeader, MacTrailer};
use crate::phy::{PhyConfig, PhyHeader};
use log::{debug, trace};
use rand::Rng;

/// One LR-WPAN frame as handed to the channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// PHY header
    pub phy: PhyHeader,
    /// MAC header
    pub mac: MacHeader,
    /// MAC payload
    pub payload: Vec<u8>,
    /// MAC trailer (FCS)
    pub trailer: MacTrailer,
}

impl Frame {
    /// Total size on the air in octets
    pub fn size(&self, config: &PhyConfig) -> usize {
        config.phy_header_len() + self.psdu_len()
    }

    /// PSDU size in octets: MAC header, payload and FCS
    pub fn psdu_len(&self) -> usize {
        MAC_HEADER_LEN + self.payload.len() + FCS_LEN
    }

    /// Octets covered by the FCS
    pub fn fcs_input(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(MAC_HEADER_LEN + self.payload.len());
        data.extend_from_slice(&self.mac.to_bytes());
        data.extend_from_slice(&self.payload);
        data
    }

    /// Whether the FCS matches the MAC header and payload
    pub fn fcs_valid(&self) -> bool {
        self.trailer.check(&self.fcs_input())
    }
}

/// Converts frames to and from the bit strings seen on the channel
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    config: PhyConfig,
}

impl FrameCodec {
    /// Create a codec for one simulation run
    pub fn new(config: PhyConfig) -> Self {
        FrameCodec { config }
    }

    /// The run configuration
    pub fn config(&self) -> &PhyConfig {
        &self.config
    }

    /// Smallest valid frame in bits: PHY header, MAC header and FCS
    pub fn min_frame_bits(&self) -> usize {
        self.config.phy_header_bits() + MAC_HEADER_LEN * 8 + MacTrailer::BITS
    }

    /// Serialize a frame as it goes out on the channel
    ///
    /// Payload octets are written as zeros: only their count matters for
    /// corruption arithmetic.
    pub fn frame_to_bits(&self, frame: &Frame) -> Result<BitString> {
        let mut bits = BitString::with_capacity(frame.size(&self.config) * 8);
        bits.append(&frame.phy.serialize(&self.config)?);
        bits.append(&frame.mac.to_bits());
        let zero = BitEncoder::encode_u8(0);
        for _ in 0..frame.payload.len() {
            bits.append(&zero);
        }
        bits.append(&frame.trailer.to_bits());

        debug!(
            "Frame to bits: {} bits ({} payload bytes, PHY header {} bytes)",
            bits.len(),
            frame.payload.len(),
            self.config.phy_header_len()
        );
        trace!("Frame bits: {}", bits);
        Ok(bits)
    }

    /// Rebuild a frame from channel bits
    ///
    /// The payload comes back as the right number of zero octets.
    pub fn bits_to_frame(&self, bits: &BitString) -> Result<Frame> {
        if bits.len() % 8 != 0 {
            return Err(FrameError::format(format!(
                "Frame of {} bits is not byte aligned",
                bits.len()
            )));
        }
        let min = self.min_frame_bits();
        if bits.len() < min {
            return Err(FrameError::format(format!(
                "Frame needs at least {} bits, got {}",
                min,
                bits.len()
            )));
        }

        let phy_bits = self.config.phy_header_bits();
        let mac_bits = MAC_HEADER_LEN * 8;
        let payload_bits = bits.len() - min;

        let trailer = MacTrailer::from_bits(&bits.slice(bits.len() - MacTrailer::BITS, MacTrailer::BITS)?)?;
        let phy = PhyHeader::deserialize(&bits.slice(0, phy_bits)?, &self.config)?;
        let mac = MacHeader::from_bits(&bits.slice(phy_bits, mac_bits)?)?;

        debug!(
            "Bits to frame: {} bits, payload {} bytes",
            bits.len(),
            payload_bits / 8
        );

        Ok(Frame {
            phy,
            mac,
            payload: vec![0u8; payload_bits / 8],
            trailer,
        })
    }
}

/// Builder for outgoing frames
///
/// Derives the PHR from the PSDU length and the FCS from MAC header and
/// payload, and draws a JRB when the run enables it.
pub struct FrameBuilder {
    mac: MacHeader,
    payload: Vec<u8>,
}

impl FrameBuilder {
    /// Start a frame with the given MAC header and an empty payload
    pub fn new(mac: MacHeader) -> Self {
        FrameBuilder {
            mac,
            payload: Vec::new(),
        }
    }

    /// Set the payload
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Build the frame
    pub fn build<R: Rng + ?Sized>(self, config: &PhyConfig, rng: &mut R) -> Result<Frame> {
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::range(format!(
                "Payload of {} bytes exceeds maximum of {}",
                self.payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }
        let psdu_len = MAC_HEADER_LEN + self.payload.len() + FCS_LEN;
        debug_assert!(psdu_len <= MAX_PHY_PACKET_SIZE);

        let phy = PhyHeader::for_config(psdu_len as u8, config, rng);
        let mut frame = Frame {
            phy,
            mac: self.mac,
            payload: self.payload,
            trailer: MacTrailer::default(),
        };
        frame.trailer = MacTrailer::compute(&frame.fcs_input());
        Ok(frame)
    }
}
