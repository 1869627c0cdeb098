//! Error definitions shared across library modules.
//! All failure at the acquisition boundary is communicated through
//! `Result` values and observable state (counters, flags); nothing here
//! ever panics across the component boundary.
use thiserror_no_std::Error;

#[derive(Error, Debug)]
/// Failures reported by the loopback self-test.
///
/// The self-test loops the controller onto itself, transmits a probe
/// frame, and verifies the echo. Any outcome other than a byte-exact
/// echo is a wiring or controller fault.
pub enum SelfTestError<E: core::fmt::Debug> {
    /// CAN controller rejected an operation during the test.
    #[error("CAN bus error: {0:?}")]
    Bus(E),

    /// No echo frame arrived within the bounded receive budget.
    #[error("No loopback echo received")]
    NoEcho,

    /// An echo arrived but its identifier or payload did not match the
    /// probe that was sent.
    #[error("Loopback echo does not match the transmitted probe")]
    EchoMismatch,
}
