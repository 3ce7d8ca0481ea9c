//! # LR-WPAN jamming model
//!
//! Bit-exact PHY framing and over-the-air bit corruption of an IEEE 802.15.4
//! (LR-WPAN) link under reactive jamming, for use inside a discrete-event
//! link-layer simulator.
//!
//! This library provides:
//!
//! - A binary-string codec for complete frames (preamble, SFD, optional
//!   jamming-resistance byte, PHR, MAC header, payload, FCS)
//! - The interference engine that flips the bits of a frame overlapped by a
//!   later transmission
//! - A locator naming the protocol field hit by the first corrupted bit
//! - Receiver-side jamming reports and per-field statistics
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support
//!
//! ## Example
//!
//! ```
//! use lrwpan_jamming::{
//!     locate_field, FrameBuilder, FrameCodec, InterferenceEngine, JammedField, MacHeader,
//!     PhyConfig,
//! };
//!
//! let config = PhyConfig::new();
//! let codec = FrameCodec::new(config);
//! let mut rng = config.rng();
//!
//! let frame = FrameBuilder::new(MacHeader::data(0, 0, 0x0002, 0, 0x0001))
//!     .with_payload(vec![0u8; 1])
//!     .build(&config, &mut rng)?;
//! let jammer = FrameBuilder::new(MacHeader::data(0, 0, 0x0002, 0, 0x0003))
//!     .build(&config, &mut rng)?;
//!
//! // 250 kbit/s: 4 us per bit, jammer reacts after 250 us
//! let bits = codec.frame_to_bits(&frame)?;
//! let stop = bits.len() as f64 * 4e-6;
//! let mut engine = InterferenceEngine::new();
//! engine.add_transmission(bits, 0.0, stop)?;
//! engine.add_transmission(codec.frame_to_bits(&jammer)?, 0.00025, 0.00025 + 152.0 * 4e-6)?;
//!
//! let result = engine.compute_interference()?;
//! assert_eq!(result.non_jammed_bits_start, 62);
//! assert_eq!(
//!     locate_field(result.non_jammed_bits_start, &config),
//!     JammedField::FrameControlLastReserved
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod encoding;
pub mod error;
pub mod frame;
pub mod interference;
pub mod locator;
pub mod mac;
pub mod phy;
pub mod report;

pub use encoding::{BitDecoder, BitEncoder, BitString};
pub use error::{FrameError, Result};
pub use frame::{Frame, FrameBuilder, FrameCodec};
pub use interference::{InterferenceEngine, InterferenceResult, Transmission};
pub use locator::{locate_field, JammedField};
pub use mac::{AddressingMode, FrameControl, FrameType, MacHeader, MacTrailer};
pub use phy::{JammingResistance, PhyConfig, PhyHeader};
pub use report::{JammingReport, JammingStats};

/// IEEE 802.15.4 (2.4 GHz O-QPSK) constants used by this model
pub mod ieee802154 {
    /// Preamble length in bits
    pub const PREAMBLE_BITS: usize = 32;

    /// Start-of-frame delimiter
    pub const SFD: u8 = 0b1010_0111;

    /// PHY header length in octets without the jamming-resistance byte
    pub const PHY_HEADER_LEN: usize = 6;

    /// Maximum PSDU size in octets (aMaxPhyPacketSize)
    pub const MAX_PHY_PACKET_SIZE: usize = 127;

    /// MAC header length in octets (short addressing, both PAN ids)
    pub const MAC_HEADER_LEN: usize = 11;

    /// MAC trailer (FCS) length in octets
    pub const FCS_LEN: usize = 2;

    /// Largest payload that still fits into one PSDU
    pub const MAX_PAYLOAD_LEN: usize = MAX_PHY_PACKET_SIZE - MAC_HEADER_LEN - FCS_LEN;
}
