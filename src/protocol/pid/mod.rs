//! OBD-II service 01 handling: the fixed poll roster, single-frame
//! request construction, response validation, and the per-parameter
//! decode formulas (SAE J1979).
use crate::readings::CurrentReadings;
use crate::transport::frame::{std_id, BusFrame};
use embedded_can::StandardId;
use num_enum::{IntoPrimitive, TryFromPrimitive};

//==================================================================================Constants

/// Functional (broadcast) request identifier; every ECU listens here.
pub const OBD_REQUEST_ID: StandardId = std_id(0x7DF);
/// First identifier of the ECU response window.
pub const OBD_RESPONSE_ID_MIN: StandardId = std_id(0x7E8);
/// Last identifier of the ECU response window.
pub const OBD_RESPONSE_ID_MAX: StandardId = std_id(0x7EF);

/// Service 01: request current powertrain data.
const MODE_CURRENT_DATA: u8 = 0x01;
/// Positive response to service 01 (`0x40 + mode`).
const MODE_CURRENT_DATA_REPLY: u8 = 0x41;
/// ISO-TP filler for unused request bytes; receivers ignore it.
const PADDING: u8 = 0x55;

//==================================================================================Roster

/// Diagnostic parameters this logger polls, identified by their SAE
/// J1979 mode 01 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pid {
    /// Calculated engine load (0x04)
    EngineLoad = 0x04,
    /// Engine coolant temperature (0x05)
    CoolantTemp = 0x05,
    /// Short-term fuel trim, bank 1 (0x06)
    ShortFuelTrim = 0x06,
    /// Long-term fuel trim, bank 1 (0x07)
    LongFuelTrim = 0x07,
    /// Engine RPM (0x0C)
    Rpm = 0x0C,
    /// Vehicle speed (0x0D)
    VehicleSpeed = 0x0D,
    /// Ignition timing advance (0x0E)
    TimingAdvance = 0x0E,
    /// Intake air temperature (0x0F)
    IntakeAirTemp = 0x0F,
    /// Mass air flow rate (0x10)
    MafRate = 0x10,
    /// Throttle position (0x11)
    ThrottlePosition = 0x11,
    /// Oxygen sensor voltage, bank 1 sensor 1 (0x14)
    O2SensorVoltage = 0x14,
    /// Barometric pressure (0x33)
    BaroPressure = 0x33,
}

impl Pid {
    /// Number of data bytes the mode 01 response carries for this
    /// parameter.
    pub fn response_len(self) -> usize {
        match self {
            Pid::Rpm | Pid::MafRate | Pid::O2SensorVoltage => 2,
            _ => 1,
        }
    }
}

/// Fixed poll order, traversed cyclically by the scheduler. Insertion
/// order is poll order; the table is never mutated at runtime, which
/// keeps the cycle period deterministic (1.2 s at a 100 ms cadence).
/// Fast-moving quantities sit first so a cold start converges on them
/// soonest.
pub const POLL_ROSTER: [Pid; 12] = [
    Pid::Rpm,
    Pid::VehicleSpeed,
    Pid::ThrottlePosition,
    Pid::EngineLoad,
    Pid::CoolantTemp,
    Pid::IntakeAirTemp,
    Pid::BaroPressure,
    Pid::TimingAdvance,
    Pid::MafRate,
    Pid::ShortFuelTrim,
    Pid::LongFuelTrim,
    Pid::O2SensorVoltage,
];

//==================================================================================Request

/// Build the single-frame service 01 request for `pid`.
///
/// Wire layout (ISO 15765-4): `[0x02, 0x01, pid, filler × 5]` where
/// `0x02` is the ISO-TP single-frame header counting the two
/// significant bytes that follow. The frame is always sent with a full
/// 8-byte DLC, as the standard requires.
pub fn request_frame(pid: Pid) -> BusFrame {
    let mut data = [PADDING; 8];
    data[0] = 0x02;
    data[1] = MODE_CURRENT_DATA;
    data[2] = pid.into();

    BusFrame {
        id: OBD_REQUEST_ID,
        data,
        len: 8,
    }
}

//==================================================================================Response

/// Check `frame` for a well-formed service 01 response and return the
/// answered parameter together with its data bytes.
///
/// Anything that is not such a response — identifier outside the ECU
/// window, a non-single ISO-TP frame, wrong mode byte, unknown
/// parameter code, or an inconsistent length — yields `None`. Callers
/// silently ignore those frames by policy; bus contention makes them an
/// expected occurrence, not an error.
pub fn parse_response(frame: &BusFrame) -> Option<(Pid, &[u8])> {
    let raw_id = frame.id.as_raw();
    if raw_id < OBD_RESPONSE_ID_MIN.as_raw() || raw_id > OBD_RESPONSE_ID_MAX.as_raw() {
        return None;
    }

    let data = frame.data();
    if data.len() < 4 {
        return None;
    }

    // ISO-TP header: high nibble is the frame type (0 = single frame),
    // low nibble counts mode + pid + data bytes.
    if data[0] >> 4 != 0 {
        return None;
    }
    let significant = (data[0] & 0x0F) as usize;

    if data[1] != MODE_CURRENT_DATA_REPLY {
        return None;
    }

    let pid = Pid::try_from(data[2]).ok()?;

    let end = 3 + pid.response_len();
    if significant < 2 + pid.response_len() || end > data.len() {
        return None;
    }

    Some((pid, &data[3..end]))
}

//==================================================================================Decode

/// Apply the SAE J1979 decode formula for `pid` and store the scaled
/// result in place. Returns `false` (readings untouched) when `bytes`
/// is shorter than the formula requires. Never allocates.
pub fn apply(pid: Pid, bytes: &[u8], readings: &mut CurrentReadings) -> bool {
    if bytes.len() < pid.response_len() {
        return false;
    }

    let a = bytes[0];
    match pid {
        // A * 100 / 255 %
        Pid::EngineLoad => readings.engine_load_pct = (a as u16 * 100 / 255) as u8,
        // A - 40 °C
        Pid::CoolantTemp => readings.coolant_temp_c = a as i16 - 40,
        Pid::ShortFuelTrim => readings.short_fuel_trim_centi_pct = trim_centi_pct(a),
        Pid::LongFuelTrim => readings.long_fuel_trim_centi_pct = trim_centi_pct(a),
        // ((A * 256) + B) / 4 RPM
        Pid::Rpm => readings.rpm = u16::from_be_bytes([a, bytes[1]]) / 4,
        Pid::VehicleSpeed => readings.speed_kmh = a,
        // A / 2 - 64 °, kept in half-degree steps
        Pid::TimingAdvance => readings.timing_advance_half_deg = a as i16 - 128,
        Pid::IntakeAirTemp => readings.intake_temp_c = a as i16 - 40,
        // ((A * 256) + B) / 100 g/s, kept in cg/s
        Pid::MafRate => readings.maf_cg_per_s = u16::from_be_bytes([a, bytes[1]]),
        Pid::ThrottlePosition => readings.throttle_pct = (a as u16 * 100 / 255) as u8,
        // A / 200 V, kept in mV
        Pid::O2SensorVoltage => readings.o2_voltage_mv = a as u16 * 5,
        Pid::BaroPressure => readings.baro_kpa = a,
    }

    true
}

/// Fuel trim: `(A - 128) * 100 / 128` percent, stored in 0.01 % steps.
fn trim_centi_pct(raw: u8) -> i16 {
    ((raw as i32 - 128) * 10000 / 128) as i16
}
