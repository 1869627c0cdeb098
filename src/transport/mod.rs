//! CAN transport layer: raw frame representation, controller modes, the
//! bus abstraction trait, and the loopback self-test run before normal
//! operation starts.
pub mod frame;

use crate::error::SelfTestError;
use embedded_can::StandardId;
use frame::{std_id, BusFrame};

/// Identifier carried by the loopback probe frame. Chosen outside both
/// the proprietary broadcast identifier and the OBD response window so
/// a test frame can never be mistaken for telemetry.
pub const SELF_TEST_ID: StandardId = std_id(0x7F0);

/// Probe payload transmitted and verified by the self-test.
pub const SELF_TEST_PROBE: [u8; 3] = [0x01, 0x02, 0x03];

/// Upper bound on receive polls while waiting for the loopback echo.
/// Keeps the self-test bounded without needing a timer.
const SELF_TEST_RECV_BUDGET: usize = 64;

/// Controller operating modes the transport driver must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMode {
    /// Regular bus participation.
    Normal,
    /// The controller receives its own transmissions; nothing reaches
    /// the wire. Used by the self-test to catch wiring and controller
    /// faults without external traffic.
    Loopback,
}

/// Contract to drive the CAN controller synchronously.
///
/// Every method is bounded: `try_recv` never waits for a frame and
/// `send` never waits for a response. Retries are a scheduling-layer
/// decision, not a transport one.
pub trait CanTransport {
    type Error: core::fmt::Debug;

    /// Configure the controller (bus speed, operating mode). Idempotent
    /// and safe to retry after a failure.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Switch the controller between normal and loopback operation.
    fn set_mode(&mut self, mode: BusMode) -> Result<(), Self::Error>;

    /// Pull the next pending frame, if any. Must return `Ok(None)`
    /// immediately when nothing is waiting.
    fn try_recv(&mut self) -> Result<Option<BusFrame>, Self::Error>;

    /// Emit a single frame. No retry happens at this layer.
    fn send(&mut self, frame: &BusFrame) -> Result<(), Self::Error>;
}

/// Verify the controller can receive its own transmission.
///
/// Switches to [`BusMode::Loopback`], sends the probe frame, and polls
/// for the echo within a bounded budget. Normal mode is restored
/// regardless of the outcome; a restore failure is only surfaced when
/// the probe itself succeeded.
pub fn loopback_self_test<B: CanTransport>(bus: &mut B) -> Result<(), SelfTestError<B::Error>> {
    bus.set_mode(BusMode::Loopback)
        .map_err(SelfTestError::Bus)?;

    let verdict = run_probe(bus);
    let restored = bus.set_mode(BusMode::Normal);

    verdict?;
    restored.map_err(SelfTestError::Bus)
}

fn run_probe<B: CanTransport>(bus: &mut B) -> Result<(), SelfTestError<B::Error>> {
    let mut data = [0u8; 8];
    data[..SELF_TEST_PROBE.len()].copy_from_slice(&SELF_TEST_PROBE);
    let probe = BusFrame {
        id: SELF_TEST_ID,
        data,
        len: SELF_TEST_PROBE.len(),
    };

    bus.send(&probe).map_err(SelfTestError::Bus)?;

    for _ in 0..SELF_TEST_RECV_BUDGET {
        if let Some(echo) = bus.try_recv().map_err(SelfTestError::Bus)? {
            return if echo.id == probe.id && echo.data() == probe.data() {
                Ok(())
            } else {
                Err(SelfTestError::EchoMismatch)
            };
        }
    }

    Err(SelfTestError::NoEcho)
}
