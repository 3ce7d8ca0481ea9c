//! Mapping a bit offset in an on-air frame to the protocol field it falls in

use crate::ieee802154::PREAMBLE_BITS;
use crate::phy::PhyConfig;
use std::fmt;

/// Protocol field a corrupted bit can land in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JammedField {
    /// 32-bit synchronization preamble
    Preamble,
    /// Start-of-frame delimiter
    Sfd,
    /// Jamming-resistance byte
    Jrb,
    /// PHY header: frame length and its reserved bit
    Phr,
    /// Reserved frame control bit 7, first on air
    FrameControlFirstReserved,
    /// Frame control bit 6
    FrameControlPanIdCompression,
    /// Frame control bit 5
    FrameControlAckRequest,
    /// Frame control bit 4
    FrameControlFramePending,
    /// Frame control bit 3
    FrameControlSecurityEnabled,
    /// Frame control bits 0..2
    FrameControlFrameType,
    /// Frame control bits 14..15
    FrameControlSrcAddrMode,
    /// Frame control bits 12..13
    FrameControlFrameVersion,
    /// Frame control bits 10..11
    FrameControlDstAddrMode,
    /// Reserved frame control bits 8..9, last on air
    FrameControlLastReserved,
    /// MAC sequence number
    SequenceNumber,
    /// Destination PAN identifier
    DstPanId,
    /// Destination short address
    DstAddress,
    /// Source PAN identifier
    SrcPanId,
    /// Source short address
    SrcAddress,
    /// Anything after the MAC header
    PayloadOrFcs,
}

impl JammedField {
    /// Human-readable field name
    pub fn name(&self) -> &'static str {
        match self {
            JammedField::Preamble => "Preamble",
            JammedField::Sfd => "SFD",
            JammedField::Jrb => "JRB",
            JammedField::Phr => "PHR",
            JammedField::FrameControlFirstReserved => "Frame Control (first Reserved bit)",
            JammedField::FrameControlPanIdCompression => "Frame Control (PAN ID Compression)",
            JammedField::FrameControlAckRequest => "Frame Control (Ack. Request)",
            JammedField::FrameControlFramePending => "Frame Control (Frame Pending)",
            JammedField::FrameControlSecurityEnabled => "Frame Control (Security Enabled)",
            JammedField::FrameControlFrameType => "Frame Control (Frame Type)",
            JammedField::FrameControlSrcAddrMode => "Frame Control (Source Addressing Mode)",
            JammedField::FrameControlFrameVersion => "Frame Control (Frame Version)",
            JammedField::FrameControlDstAddrMode => "Frame Control (Destination Addressing Mode)",
            JammedField::FrameControlLastReserved => "Frame Control (last Reserved bits)",
            JammedField::SequenceNumber => "Sequence Number",
            JammedField::DstPanId => "Destination PAN Identifier",
            JammedField::DstAddress => "Destination Address",
            JammedField::SrcPanId => "Source PAN Identifier",
            JammedField::SrcAddress => "Source Address",
            JammedField::PayloadOrFcs => "Payload or FCS",
        }
    }

    /// Whether the field belongs to the PHY header
    pub fn is_phy(&self) -> bool {
        matches!(
            self,
            JammedField::Preamble | JammedField::Sfd | JammedField::Jrb | JammedField::Phr
        )
    }
}

impl fmt::Display for JammedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const SHR_LAYOUT: &[(JammedField, usize)] = &[
    (JammedField::Preamble, PREAMBLE_BITS),
    (JammedField::Sfd, 8),
];

const MAC_LAYOUT: &[(JammedField, usize)] = &[
    (JammedField::FrameControlFirstReserved, 1),
    (JammedField::FrameControlPanIdCompression, 1),
    (JammedField::FrameControlAckRequest, 1),
    (JammedField::FrameControlFramePending, 1),
    (JammedField::FrameControlSecurityEnabled, 1),
    (JammedField::FrameControlFrameType, 3),
    (JammedField::FrameControlSrcAddrMode, 2),
    (JammedField::FrameControlFrameVersion, 2),
    (JammedField::FrameControlDstAddrMode, 2),
    (JammedField::FrameControlLastReserved, 2),
    (JammedField::SequenceNumber, 8),
    (JammedField::DstPanId, 16),
    (JammedField::DstAddress, 16),
    (JammedField::SrcPanId, 16),
    (JammedField::SrcAddress, 16),
];

/// Ordered `(field, width)` table of the frame up to the end of the MAC header
pub fn field_layout(config: &PhyConfig) -> Vec<(JammedField, usize)> {
    let mut layout = SHR_LAYOUT.to_vec();
    match (config.jrb_enabled, config.early_jrb) {
        (false, _) => layout.push((JammedField::Phr, 8)),
        (true, true) => layout.extend([(JammedField::Jrb, 8), (JammedField::Phr, 8)]),
        (true, false) => layout.extend([(JammedField::Phr, 8), (JammedField::Jrb, 8)]),
    }
    layout.extend_from_slice(MAC_LAYOUT);
    layout
}

/// Field containing bit `first_jammed_bit` of an on-air frame
///
/// Offsets past the MAC header land in "Payload or FCS".
pub fn locate_field(first_jammed_bit: usize, config: &PhyConfig) -> JammedField {
    let mut offset = first_jammed_bit;
    for (field, width) in field_layout(config) {
        if offset < width {
            return field;
        }
        offset -= width;
    }
    JammedField::PayloadOrFcs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shr_boundaries() {
        for config in [PhyConfig::new(), PhyConfig::new().with_jrb(true)] {
            assert_eq!(locate_field(0, &config), JammedField::Preamble);
            assert_eq!(locate_field(31, &config), JammedField::Preamble);
            assert_eq!(locate_field(32, &config), JammedField::Sfd);
            assert_eq!(locate_field(39, &config), JammedField::Sfd);
        }
    }

    #[test]
    fn test_jrb_disabled() {
        let config = PhyConfig::new();
        assert_eq!(locate_field(40, &config), JammedField::Phr);
        assert_eq!(locate_field(47, &config), JammedField::Phr);
        assert_eq!(locate_field(48, &config), JammedField::FrameControlFirstReserved);
        // early flag means nothing without the JRB
        let config = config.with_early_jrb(true);
        assert_eq!(locate_field(40, &config), JammedField::Phr);
    }

    #[test]
    fn test_jrb_placement() {
        let early = PhyConfig::new().with_jrb(true).with_early_jrb(true);
        assert_eq!(locate_field(40, &early), JammedField::Jrb);
        assert_eq!(locate_field(48, &early), JammedField::Phr);
        assert_eq!(locate_field(56, &early), JammedField::FrameControlFirstReserved);

        let late = PhyConfig::new().with_jrb(true);
        assert_eq!(locate_field(40, &late), JammedField::Phr);
        assert_eq!(locate_field(48, &late), JammedField::Jrb);
        assert_eq!(locate_field(55, &late), JammedField::Jrb);
    }

    #[test]
    fn test_mac_fields() {
        let config = PhyConfig::new();
        let mac = |offset: usize| locate_field(48 + offset, &config);
        assert_eq!(mac(1), JammedField::FrameControlPanIdCompression);
        assert_eq!(mac(2), JammedField::FrameControlAckRequest);
        assert_eq!(mac(3), JammedField::FrameControlFramePending);
        assert_eq!(mac(4), JammedField::FrameControlSecurityEnabled);
        assert_eq!(mac(5), JammedField::FrameControlFrameType);
        assert_eq!(mac(7), JammedField::FrameControlFrameType);
        assert_eq!(mac(8), JammedField::FrameControlSrcAddrMode);
        assert_eq!(mac(10), JammedField::FrameControlFrameVersion);
        assert_eq!(mac(12), JammedField::FrameControlDstAddrMode);
        assert_eq!(mac(15), JammedField::FrameControlLastReserved);
        assert_eq!(mac(16), JammedField::SequenceNumber);
        assert_eq!(mac(23), JammedField::SequenceNumber);
        assert_eq!(mac(24), JammedField::DstPanId);
        assert_eq!(mac(40), JammedField::DstAddress);
        assert_eq!(mac(56), JammedField::SrcPanId);
        assert_eq!(mac(72), JammedField::SrcAddress);
        assert_eq!(mac(87), JammedField::SrcAddress);
        assert_eq!(mac(88), JammedField::PayloadOrFcs);
        assert_eq!(locate_field(usize::MAX, &config), JammedField::PayloadOrFcs);
    }

    #[test]
    fn test_layout_covers_headers() {
        let total = |config: PhyConfig| -> usize {
            field_layout(&config).iter().map(|&(_, width)| width).sum()
        };
        assert_eq!(total(PhyConfig::new()), 48 + 88);
        assert_eq!(total(PhyConfig::new().with_jrb(true)), 56 + 88);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(JammedField::Preamble.to_string(), "Preamble");
        assert_eq!(JammedField::Sfd.to_string(), "SFD");
        assert_eq!(JammedField::PayloadOrFcs.to_string(), "Payload or FCS");
        assert!(JammedField::Jrb.is_phy());
        assert!(!JammedField::SequenceNumber.is_phy());
    }

    #[test]
    fn test_frame_control_bits_land_in_their_fields() {
        use crate::mac::{FrameControl, MacHeader};

        let expected = [
            (0, JammedField::FrameControlFrameType),
            (2, JammedField::FrameControlFrameType),
            (3, JammedField::FrameControlSecurityEnabled),
            (4, JammedField::FrameControlFramePending),
            (5, JammedField::FrameControlAckRequest),
            (6, JammedField::FrameControlPanIdCompression),
            (7, JammedField::FrameControlFirstReserved),
            (8, JammedField::FrameControlLastReserved),
            (9, JammedField::FrameControlLastReserved),
            (10, JammedField::FrameControlDstAddrMode),
            (12, JammedField::FrameControlFrameVersion),
            (15, JammedField::FrameControlSrcAddrMode),
        ];
        let config = PhyConfig::new();
        for (bit, field) in expected {
            let mac = MacHeader {
                frame_control: FrameControl::from_raw(1 << bit),
                ..MacHeader::data(0, 0, 0, 0, 0)
            };
            let bits = mac.to_bits();
            let on_air = (0..16)
                .find(|&i| bits.bit(i) == Some(true))
                .expect("frame control bit set");
            assert_eq!(
                locate_field(config.phy_header_bits() + on_air, &config),
                field,
                "frame control bit {}",
                bit
            );
        }
    }
}
