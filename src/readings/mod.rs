//! Last-known telemetry values, updated in place by the acquisition
//! engine and snapshot-read by downstream consumers.
//!
//! The engine is the only writer; readers take [`CurrentReadings`] by
//! copy at their own rate. A snapshot taken between two field updates
//! may mix ticks across fields, which the design tolerates: fields are
//! individually consistent and no history is kept.
//!
//! Every field starts at a documented "no data" sentinel and afterwards
//! always holds the last successfully decoded value. Values are stored
//! as scaled integers so a field never needs floating point on the
//! target.

/// Sentinel for unsigned 8-bit fields that were never decoded.
pub const NO_DATA_U8: u8 = u8::MAX;
/// Sentinel for unsigned 16-bit fields that were never decoded.
pub const NO_DATA_U16: u16 = u16::MAX;
/// Sentinel for signed 16-bit fields that were never decoded.
pub const NO_DATA_I16: i16 = i16::MIN;

/// One field per telemetry quantity; no history, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentReadings {
    /// Engine speed, RPM.
    pub rpm: u16,
    /// Vehicle speed, km/h.
    pub speed_kmh: u8,
    /// Throttle position, percent of full scale.
    pub throttle_pct: u8,
    /// Calculated engine load, percent of full scale.
    pub engine_load_pct: u8,
    /// Coolant temperature, °C. The wire encoding offsets from a −40 °C
    /// floor; the offset is already applied here.
    pub coolant_temp_c: i16,
    /// Intake air temperature, °C (−40 °C floor applied).
    pub intake_temp_c: i16,
    /// Barometric pressure, kPa.
    pub baro_kpa: u8,
    /// Ignition timing advance in 0.5° steps relative to TDC
    /// (wire value minus 128).
    pub timing_advance_half_deg: i16,
    /// Mass-airflow rate in centigrams per second (raw wire value; the
    /// documented unit is `raw / 100` g/s).
    pub maf_cg_per_s: u16,
    /// Short-term fuel trim in 0.01 % steps, signed.
    pub short_fuel_trim_centi_pct: i16,
    /// Long-term fuel trim in 0.01 % steps, signed.
    pub long_fuel_trim_centi_pct: i16,
    /// Oxygen sensor voltage, millivolts.
    pub o2_voltage_mv: u16,
}

impl CurrentReadings {
    /// Record with every field at its "no data" sentinel.
    pub const EMPTY: Self = Self {
        rpm: NO_DATA_U16,
        speed_kmh: NO_DATA_U8,
        throttle_pct: NO_DATA_U8,
        engine_load_pct: NO_DATA_U8,
        coolant_temp_c: NO_DATA_I16,
        intake_temp_c: NO_DATA_I16,
        baro_kpa: NO_DATA_U8,
        timing_advance_half_deg: NO_DATA_I16,
        maf_cg_per_s: NO_DATA_U16,
        short_fuel_trim_centi_pct: NO_DATA_I16,
        long_fuel_trim_centi_pct: NO_DATA_I16,
        o2_voltage_mv: NO_DATA_U16,
    };

    /// Create an empty record.
    pub const fn new() -> Self {
        Self::EMPTY
    }
}

impl Default for CurrentReadings {
    fn default() -> Self {
        Self::EMPTY
    }
}
