//! Per-tick acquisition engine: pulls at most one pending frame from
//! the bus, routes it to the matching decoder, drives the cyclic poll
//! scheduler, and tracks staleness and transport errors.
pub mod scheduler;

use crate::error::SelfTestError;
use crate::protocol::{direct, pid};
use crate::readings::CurrentReadings;
use crate::transport::{frame::BusFrame, loopback_self_test, CanTransport};
use embassy_time::{Duration, Instant};
use scheduler::PollScheduler;

/// Freshness window: readings count as live while the time since the
/// last successful decode stays within this bound. The boundary is
/// inclusive — a decode exactly 2000 ms ago still reads fresh.
///
/// Downstream consumers use the predicate to distinguish "vehicle off /
/// bus silent" from "sensor unavailable".
pub const FRESHNESS_WINDOW: Duration = Duration::from_millis(2000);

/// Mutable engine bookkeeping, reset wholesale on (re)initialization.
#[derive(Debug, Clone, Copy, Default)]
struct EngineState {
    initialized: bool,
    error_count: u32,
    last_decode: Option<Instant>,
}

/// Dual-mode acquisition engine.
///
/// Exclusive owner of the current readings and the acquisition state;
/// the per-tick [`poll`] is the single writer. Readers take snapshots
/// through the accessors at their own rate and never trigger bus
/// traffic.
///
/// [`poll`]: Acquisition::poll
pub struct Acquisition<B: CanTransport> {
    bus: B,
    scheduler: PollScheduler,
    readings: CurrentReadings,
    state: EngineState,
}

impl<B: CanTransport> Acquisition<B> {
    /// Wrap a transport driver. The engine stays inert until [`init`]
    /// succeeds.
    ///
    /// [`init`]: Acquisition::init
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            scheduler: PollScheduler::new(),
            readings: CurrentReadings::EMPTY,
            state: EngineState::default(),
        }
    }

    /// Configure the bus controller and reset all acquisition state:
    /// readings back to their sentinels, error counter to zero, poll
    /// cursor to the roster start.
    ///
    /// Idempotent and safe to retry. Doubles as the reinitialization
    /// trigger after catastrophic transport failure; surfacing an
    /// initialization failure to the operator is the host's job.
    pub fn init(&mut self) -> Result<(), B::Error> {
        self.bus.init()?;

        self.readings = CurrentReadings::EMPTY;
        self.scheduler.reset();
        self.state = EngineState {
            initialized: true,
            error_count: 0,
            last_decode: None,
        };

        Ok(())
    }

    /// Borrow the underlying transport driver.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Exclusive access to the underlying transport driver. Intended
    /// for host-side bring-up and tests; the engine itself only touches
    /// the bus from within its tick.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Run the loopback self-test. Intended before normal operation
    /// starts; the controller is returned to normal mode regardless of
    /// the outcome.
    pub fn self_test(&mut self) -> Result<(), SelfTestError<B::Error>> {
        loopback_self_test(&mut self.bus)
    }

    /// Per-tick entry point, called by the host at a fixed rate.
    ///
    /// Pulls at most one pending frame (non-blocking), routes it by
    /// identifier, then lets the scheduler emit the next cyclic request
    /// if its interval has elapsed. Receiving before polling guarantees
    /// the high-rate direct frame is never starved by diagnostics
    /// traffic, and the request path never waits on a response.
    ///
    /// A no-op until [`init`] has succeeded.
    ///
    /// [`init`]: Acquisition::init
    pub fn poll(&mut self, now: Instant) {
        if !self.state.initialized {
            return;
        }

        match self.bus.try_recv() {
            Ok(Some(frame)) => self.dispatch(&frame, now),
            Ok(None) => {}
            Err(_) => self.state.error_count += 1,
        }

        if self.scheduler.due(now) {
            let request = pid::request_frame(self.scheduler.advance(now));
            // No retry here; the next cycle is the retry.
            if self.bus.send(&request).is_err() {
                self.state.error_count += 1;
            }
        }
    }

    /// Route one inbound frame to its decoder.
    fn dispatch(&mut self, frame: &BusFrame, now: Instant) {
        if frame.id == direct::DIRECT_FRAME_ID {
            if direct::decode(frame, &mut self.readings) {
                self.state.last_decode = Some(now);
            }
        } else if let Some((answered, bytes)) = pid::parse_response(frame) {
            // Only the most recently requested parameter may land.
            // Stale or mismatched responses are discarded, not counted:
            // expected under bus contention.
            if self.scheduler.outstanding() == Some(answered)
                && pid::apply(answered, bytes, &mut self.readings)
            {
                self.scheduler.complete();
                self.state.last_decode = Some(now);
            }
        }
        // Any other identifier is ignored by policy: the bus carries
        // plenty of traffic this logger has no interest in.
    }

    //==================================================================================Accessors

    /// Copy of the last-known readings. Fields the bus never answered
    /// still hold their "no data" sentinels, never an uninitialized
    /// value.
    pub fn snapshot(&self) -> CurrentReadings {
        self.readings
    }

    /// True while the last successful decode (of either kind) is at
    /// most [`FRESHNESS_WINDOW`] old.
    pub fn is_data_fresh(&self, now: Instant) -> bool {
        match self.state.last_decode {
            None => false,
            Some(at) => now.saturating_duration_since(at) <= FRESHNESS_WINDOW,
        }
    }

    /// Transport-level send/receive failures since the last successful
    /// [`init`]. Monotone during a run; resets only on
    /// reinitialization.
    ///
    /// [`init`]: Acquisition::init
    pub fn error_count(&self) -> u32 {
        self.state.error_count
    }

    /// Whether initialization has succeeded since construction or the
    /// last reset.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Engine speed, RPM.
    pub fn rpm(&self) -> u16 {
        self.readings.rpm
    }

    /// Vehicle speed, km/h.
    pub fn speed_kmh(&self) -> u8 {
        self.readings.speed_kmh
    }

    /// Throttle position, percent.
    pub fn throttle_pct(&self) -> u8 {
        self.readings.throttle_pct
    }

    /// Calculated engine load, percent.
    pub fn engine_load_pct(&self) -> u8 {
        self.readings.engine_load_pct
    }

    /// Coolant temperature, °C.
    pub fn coolant_temp_c(&self) -> i16 {
        self.readings.coolant_temp_c
    }

    /// Intake air temperature, °C.
    pub fn intake_temp_c(&self) -> i16 {
        self.readings.intake_temp_c
    }

    /// Barometric pressure, kPa.
    pub fn baro_kpa(&self) -> u8 {
        self.readings.baro_kpa
    }

    /// Ignition timing advance, 0.5° steps.
    pub fn timing_advance_half_deg(&self) -> i16 {
        self.readings.timing_advance_half_deg
    }

    /// Mass-airflow rate, centigrams per second.
    pub fn maf_cg_per_s(&self) -> u16 {
        self.readings.maf_cg_per_s
    }

    /// Short-term fuel trim, 0.01 % steps.
    pub fn short_fuel_trim_centi_pct(&self) -> i16 {
        self.readings.short_fuel_trim_centi_pct
    }

    /// Long-term fuel trim, 0.01 % steps.
    pub fn long_fuel_trim_centi_pct(&self) -> i16 {
        self.readings.long_fuel_trim_centi_pct
    }

    /// Oxygen sensor voltage, millivolts.
    pub fn o2_voltage_mv(&self) -> u16 {
        self.readings.o2_voltage_mv
    }
}
