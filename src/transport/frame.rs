//! In-memory representation of a raw classic CAN frame as it crosses
//! the transport driver.
use embedded_can::StandardId;

/// Raw frame exchanged with the bus controller. Ephemeral by design:
/// produced by one receive poll, consumed immediately by the
/// dispatcher, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFrame {
    /// 11-bit identifier. This bus carries standard frames only.
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    pub id: StandardId,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl BusFrame {
    /// Build a frame from a payload slice. Returns `None` when the
    /// payload exceeds the eight bytes a classic CAN frame can carry.
    pub fn new(id: StandardId, payload: &[u8]) -> Option<Self> {
        if payload.len() > 8 {
            return None;
        }

        let mut data = [0u8; 8];
        data[..payload.len()].copy_from_slice(payload);

        Some(Self {
            id,
            data,
            len: payload.len(),
        })
    }

    /// View over the valid payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// Build a standard identifier from a raw value known at compile time
/// to fit eleven bits.
pub(crate) const fn std_id(raw: u16) -> StandardId {
    match StandardId::new(raw) {
        Some(id) => id,
        None => panic!("identifier out of 11-bit range"),
    }
}
