//! Receiver-side view of an interference outcome and per-field statistics

use crate::error::{FrameError, Result};
use crate::frame::{Frame, FrameCodec};
use crate::ieee802154::MAC_HEADER_LEN;
use crate::interference::InterferenceResult;
use crate::locator::{locate_field, JammedField};
use log::debug;
use std::collections::HashMap;

/// What a receiver sees after demodulating a possibly corrupted frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JammingReport {
    /// Frame rebuilt from the corrupted bits
    pub frame: Frame,
    /// Field holding the first corrupted bit
    pub first_jammed_field: Option<JammedField>,
    /// Number of corrupted bits
    pub jammed_bit_count: usize,
    /// Whether the received JRB still has consistent parity (None without JRB)
    pub jrb_intact: Option<bool>,
    /// Whether the received FCS matches the received MAC header and payload
    pub fcs_valid: bool,
}

impl JammingReport {
    /// Demodulate an interference result into a report
    ///
    /// Payload octets travel as zeros on the channel, so the received payload
    /// is rebuilt by applying the corrupted payload bits as a flip mask to
    /// `sent_payload`. The FCS is then checked against the received MAC header
    /// and that payload.
    pub fn from_result(
        result: &InterferenceResult,
        sent_payload: &[u8],
        codec: &FrameCodec,
    ) -> Result<Self> {
        let mut frame = codec.bits_to_frame(&result.corrupted)?;
        if frame.payload.len() != sent_payload.len() {
            return Err(FrameError::format(format!(
                "Received {} payload bytes, sent {}",
                frame.payload.len(),
                sent_payload.len()
            )));
        }
        let offset = codec.config().phy_header_bits() + MAC_HEADER_LEN * 8;
        let mask = result
            .corrupted
            .slice(offset, sent_payload.len() * 8)?
            .to_bytes()?;
        frame.payload = sent_payload.iter().zip(mask).map(|(b, m)| b ^ m).collect();

        let first_jammed_field = result
            .first_jammed_bit()
            .map(|bit| locate_field(bit, codec.config()));
        let jrb_intact = frame.phy.jrb.map(|jrb| jrb.parity_ok());
        let fcs_valid = frame.fcs_valid();

        if let Some(field) = first_jammed_field {
            debug!(
                "First jammed field: {}, {} bits jammed, JRB intact: {:?}, FCS valid: {}",
                field, result.jammed_bit_count, jrb_intact, fcs_valid
            );
        }

        Ok(JammingReport {
            frame,
            first_jammed_field,
            jammed_bit_count: result.jammed_bit_count,
            jrb_intact,
            fcs_valid,
        })
    }

    /// Whether the frame was hit at all
    pub fn is_jammed(&self) -> bool {
        self.first_jammed_field.is_some()
    }
}

/// Counters over many reports
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JammingStats {
    clean: u32,
    by_field: HashMap<JammedField, u32>,
    jrb_detected: u32,
}

impl JammingStats {
    /// Empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one report
    pub fn record(&mut self, report: &JammingReport) {
        match report.first_jammed_field {
            Some(field) => {
                *self.by_field.entry(field).or_insert(0) += 1;
                if report.jrb_intact == Some(false) {
                    self.jrb_detected += 1;
                }
            }
            None => self.clean += 1,
        }
    }

    /// Number of frames recorded
    pub fn total(&self) -> u32 {
        self.clean + self.jammed()
    }

    /// Number of frames with at least one corrupted bit
    pub fn jammed(&self) -> u32 {
        self.by_field.values().sum()
    }

    /// Number of untouched frames
    pub fn clean(&self) -> u32 {
        self.clean
    }

    /// Jammed frames whose JRB parity revealed the corruption
    pub fn jrb_detected(&self) -> u32 {
        self.jrb_detected
    }

    /// Jammed share of all frames (0.0 to 1.0)
    pub fn jam_rate(&self) -> f32 {
        let total = self.total();
        if total > 0 {
            self.jammed() as f32 / total as f32
        } else {
            0.0
        }
    }

    /// Frames whose first corrupted bit fell in `field`
    pub fn count_for(&self, field: JammedField) -> u32 {
        self.by_field.get(&field).copied().unwrap_or(0)
    }

    /// Per-field counts, ordered by field position in the frame
    pub fn fields(&self) -> Vec<(JammedField, u32)> {
        let mut fields: Vec<_> = self.by_field.iter().map(|(&f, &n)| (f, n)).collect();
        fields.sort();
        fields
    }
}
