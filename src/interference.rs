//! Interference between two overlapping transmissions
//!
//! The engine keeps the two most recent transmissions. Slot 0 is the frame
//! under observation, slot 1 the one that arrived while it may still have been
//! in flight. Every bit of slot 0 that the later transmission overlaps in time
//! is inverted, regardless of what the later transmission carries.

use crate::encoding::BitString;
use crate::error::{FrameError, Result};
use log::{debug, trace};

/// A transmission registered with the engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transmission {
    /// On-air bits
    pub bits: BitString,
    /// Start of transmission, simulated seconds
    pub start: f64,
    /// End of transmission, simulated seconds
    pub stop: f64,
}

impl Transmission {
    /// Length in octets
    pub fn byte_len(&self) -> usize {
        self.bits.byte_len()
    }

    /// Air time in seconds
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// Outcome of one interference computation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterferenceResult {
    /// The first frame's bits after corruption
    pub corrupted: BitString,
    /// Number of leading bits sent before the interferer started
    pub non_jammed_bits_start: usize,
    /// Number of bits inverted
    pub jammed_bit_count: usize,
}

impl InterferenceResult {
    /// Whether any bit was corrupted
    pub fn is_jammed(&self) -> bool {
        self.jammed_bit_count > 0
    }

    /// Offset of the first corrupted bit, if any
    pub fn first_jammed_bit(&self) -> Option<usize> {
        self.is_jammed().then_some(self.non_jammed_bits_start)
    }
}

/// Two-slot interference engine for one simulation run
///
/// Callers must feed transmissions in start-time order; the engine does no
/// locking and expects an event-ordered, single-threaded simulator.
#[derive(Debug, Default)]
pub struct InterferenceEngine {
    slots: Vec<Transmission>,
    last_result: Option<InterferenceResult>,
}

impl InterferenceEngine {
    /// Maximum number of transmissions held
    pub const CAPACITY: usize = 2;

    /// Create an empty engine
    pub fn new() -> Self {
        InterferenceEngine {
            slots: Vec::with_capacity(Self::CAPACITY),
            last_result: None,
        }
    }

    /// Number of buffered transmissions
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no transmission is buffered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Buffered transmission in `slot`
    pub fn transmission(&self, slot: usize) -> Option<&Transmission> {
        self.slots.get(slot)
    }

    /// Most recent result; cleared when a fresh buffer starts
    pub fn last_result(&self) -> Option<&InterferenceResult> {
        self.last_result.as_ref()
    }

    /// Drop all buffered transmissions and the last result
    pub fn reset(&mut self) {
        self.slots.clear();
        self.last_result = None;
    }

    /// Register a transmission
    ///
    /// A full buffer is emptied first, so only the two most recent
    /// transmissions ever interact. Fails without touching the buffer when the
    /// bits are empty, the interval is invalid, or the transmission starts
    /// before the one it would be compared against.
    pub fn add_transmission(&mut self, bits: BitString, start: f64, stop: f64) -> Result<()> {
        if bits.is_empty() {
            return Err(FrameError::format("Cannot register an empty transmission"));
        }
        if !start.is_finite() || !stop.is_finite() || stop < start {
            return Err(FrameError::range(format!(
                "Invalid transmission interval [{}, {}]",
                start, stop
            )));
        }
        if self.slots.len() == 1 && start < self.slots[0].start {
            return Err(FrameError::state(format!(
                "Transmission starting at {}s precedes buffered one starting at {}s",
                start, self.slots[0].start
            )));
        }

        if self.slots.len() >= Self::CAPACITY {
            self.slots.clear();
        }
        if self.slots.is_empty() {
            self.last_result = None;
        }

        debug!(
            "Slot {}: {} bits, start {}s, stop {}s, duration {}s",
            self.slots.len(),
            bits.len(),
            start,
            stop,
            stop - start
        );
        self.slots.push(Transmission { bits, start, stop });
        Ok(())
    }

    /// Corrupt the first buffered frame by the second one
    ///
    /// Without overlap the first frame is retired, the second takes its place
    /// and the result carries the first frame unchanged. With overlap both are
    /// consumed.
    pub fn compute_interference(&mut self) -> Result<InterferenceResult> {
        if self.slots.len() < Self::CAPACITY {
            return Err(FrameError::state(format!(
                "Interference needs {} transmissions, have {}",
                Self::CAPACITY,
                self.slots.len()
            )));
        }

        let first = &self.slots[0];
        let second = &self.slots[1];
        let total_bits = first.bits.len();
        let bit_duration = first.duration() / total_bits as f64;
        debug!("Time per bit: {}s", bit_duration);

        if first.stop < second.start {
            debug!("First transmission was not interfered");
            let result = InterferenceResult {
                corrupted: first.bits.clone(),
                non_jammed_bits_start: total_bits,
                jammed_bit_count: 0,
            };
            self.slots.remove(0);
            self.last_result = Some(result.clone());
            return Ok(result);
        }

        let lead_bits = if bit_duration > 0.0 {
            ((second.start - first.start) / bit_duration).floor() as usize
        } else {
            0
        };
        let jammed_bits = if second.stop >= first.stop {
            total_bits.saturating_sub(lead_bits)
        } else {
            (second.duration() / bit_duration).round() as usize
        };

        let mut corrupted = first.bits.clone();
        let flipped = corrupted.flip_range(lead_bits, jammed_bits);
        trace!("Corrupted bits: {}", corrupted);
        debug!(
            "Non-jammed bits at start: {}, jammed bits: {} ({} flipped)",
            lead_bits, jammed_bits, flipped
        );

        let result = InterferenceResult {
            corrupted,
            non_jammed_bits_start: lead_bits,
            jammed_bit_count: jammed_bits,
        };
        self.slots.clear();
        self.last_result = Some(result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bits(len: usize) -> BitString {
        let pattern: String = (0..len).map(|i| if i % 3 == 0 { '1' } else { '0' }).collect();
        BitString::parse(&pattern).unwrap()
    }

    fn differing(a: &BitString, b: &BitString) -> Vec<usize> {
        a.as_str()
            .bytes()
            .zip(b.as_str().bytes())
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_needs_two_transmissions() -> Result<()> {
        let mut engine = InterferenceEngine::new();
        assert!(matches!(engine.compute_interference(), Err(FrameError::State(_))));

        engine.add_transmission(frame_bits(104), 0.0, 0.008)?;
        assert!(matches!(engine.compute_interference(), Err(FrameError::State(_))));
        assert_eq!(engine.len(), 1);
        Ok(())
    }

    #[test]
    fn test_no_overlap_keeps_frame() -> Result<()> {
        let a = frame_bits(104);
        let b = frame_bits(112);
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(a.clone(), 0.0, 0.008)?;
        engine.add_transmission(b.clone(), 0.009, 0.018)?;

        let result = engine.compute_interference()?;
        assert_eq!(result.corrupted, a);
        assert_eq!(result.non_jammed_bits_start, 104);
        assert_eq!(result.jammed_bit_count, 0);
        assert!(!result.is_jammed());
        assert_eq!(result.first_jammed_bit(), None);

        // the second transmission moved into the first slot
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.transmission(0).map(|t| &t.bits), Some(&b));
        Ok(())
    }

    #[test]
    fn test_partial_overlap() -> Result<()> {
        let a = frame_bits(104);
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(a.clone(), 0.0, 0.008)?;
        engine.add_transmission(frame_bits(104), 0.00025, 0.00125)?;

        let result = engine.compute_interference()?;
        assert_eq!(result.non_jammed_bits_start, 3);
        assert_eq!(result.jammed_bit_count, 13);
        assert_eq!(differing(&a, &result.corrupted), (3..16).collect::<Vec<_>>());
        assert!(engine.is_empty());
        assert_eq!(engine.last_result(), Some(&result));
        Ok(())
    }

    #[test]
    fn test_jammer_outlasting_frame_corrupts_tail() -> Result<()> {
        let a = frame_bits(64);
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(a.clone(), 0.0, 0.5)?;
        engine.add_transmission(frame_bits(80), 0.25, 1.0)?;

        let result = engine.compute_interference()?;
        assert_eq!(result.non_jammed_bits_start, 32);
        assert_eq!(result.jammed_bit_count, 32);
        let diff = differing(&a, &result.corrupted);
        assert_eq!(diff, (32..64).collect::<Vec<_>>());
        for i in diff {
            assert_ne!(a.bit(i), result.corrupted.bit(i));
        }
        Ok(())
    }

    #[test]
    fn test_full_overlap_flips_every_bit() -> Result<()> {
        let a = frame_bits(56);
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(a.clone(), 1.0, 1.001)?;
        engine.add_transmission(frame_bits(8), 1.0, 1.5)?;

        let result = engine.compute_interference()?;
        assert_eq!(result.non_jammed_bits_start, 0);
        assert_eq!(result.jammed_bit_count, 56);
        assert_eq!(differing(&a, &result.corrupted).len(), 56);
        assert_eq!(result.corrupted.reverse().reverse(), result.corrupted);
        Ok(())
    }

    #[test]
    fn test_touching_intervals_overlap() -> Result<()> {
        let a = frame_bits(64);
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(a.clone(), 0.0, 0.5)?;
        engine.add_transmission(frame_bits(40), 0.5, 0.75)?;

        let result = engine.compute_interference()?;
        assert_eq!(result.corrupted, a);
        assert_eq!(result.non_jammed_bits_start, 64);
        assert_eq!(result.jammed_bit_count, 0);
        assert!(engine.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_out_of_order_start() -> Result<()> {
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(frame_bits(40), 0.5, 0.6)?;
        let err = engine.add_transmission(frame_bits(40), 0.4, 0.7);
        assert!(matches!(err, Err(FrameError::State(_))));
        assert_eq!(engine.len(), 1);
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_input() {
        let mut engine = InterferenceEngine::new();
        assert!(matches!(
            engine.add_transmission(BitString::new(), 0.0, 1.0),
            Err(FrameError::Format(_))
        ));
        assert!(matches!(
            engine.add_transmission(frame_bits(8), 1.0, 0.5),
            Err(FrameError::Range(_))
        ));
        assert!(matches!(
            engine.add_transmission(frame_bits(8), f64::NAN, 0.5),
            Err(FrameError::Range(_))
        ));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_full_buffer_restarts() -> Result<()> {
        let mut engine = InterferenceEngine::new();
        engine.add_transmission(frame_bits(40), 0.0, 0.004)?;
        engine.add_transmission(frame_bits(40), 0.001, 0.002)?;
        engine.compute_interference()?;
        assert!(engine.last_result().is_some());

        engine.add_transmission(frame_bits(40), 0.01, 0.014)?;
        assert!(engine.last_result().is_none());

        engine.add_transmission(frame_bits(40), 0.011, 0.012)?;
        // a third transmission drops both buffered ones
        engine.add_transmission(frame_bits(48), 0.0, 0.1)?;
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.transmission(0).map(|t| t.byte_len()), Some(6));
        Ok(())
    }
}
