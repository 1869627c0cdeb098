//! Decoder for the proprietary high-rate ECU broadcast. The vehicle's
//! own controller emits this frame continuously; it is decoded without
//! ever being requested, which makes it the cheapest and freshest
//! source for the fast-moving quantities.
use crate::readings::CurrentReadings;
use crate::transport::frame::{std_id, BusFrame};
use embedded_can::StandardId;

/// Identifier of the proprietary broadcast frame.
pub const DIRECT_FRAME_ID: StandardId = std_id(0x360);

/// Payload bytes required before any field can be extracted.
const MIN_PAYLOAD_LEN: usize = 5;

/// Decode the broadcast payload into the current readings.
///
/// Layout, fixed by the ECU firmware and replicated bit-for-bit (no
/// renegotiation is possible on this bus):
///
/// | bytes | quantity          | formula            |
/// |-------|-------------------|--------------------|
/// | 0–1   | engine speed      | big-endian `raw / 4` RPM |
/// | 2     | vehicle speed     | km/h as-is         |
/// | 3     | throttle position | `raw * 100 / 255` %|
/// | 4     | calculated load   | `raw * 100 / 255` %|
///
/// Returns `false` without touching `readings` when the frame carries a
/// different identifier or is too short to hold the layout.
pub fn decode(frame: &BusFrame, readings: &mut CurrentReadings) -> bool {
    if frame.id != DIRECT_FRAME_ID || frame.len < MIN_PAYLOAD_LEN {
        return false;
    }

    let data = frame.data();

    readings.rpm = u16::from_be_bytes([data[0], data[1]]) / 4;
    readings.speed_kmh = data[2];
    readings.throttle_pct = (data[3] as u16 * 100 / 255) as u8;
    readings.engine_load_pct = (data[4] as u16 * 100 / 255) as u8;

    true
}
