//! `canlog-core` library: dual-mode CAN telemetry acquisition for a
//! `no_std` vehicle datalogger. The crate decodes one proprietary
//! high-rate ECU broadcast directly and cyclically polls a fixed roster
//! of standard OBD-II parameters on the same half-duplex bus, exposing
//! the last-known readings to downstream consumers (logger, streamer,
//! display).
//!
//! The host drives the engine synchronously at a fixed tick rate
//! (nominally 50 Hz); every call is bounded and non-blocking.
#![no_std]

/// Acquisition engine: per-tick dispatch loop, cyclic poll scheduler,
/// and diagnostics accessors.
pub mod acquisition;
/// Domain and low-level errors (bus transport, loopback self-test).
pub mod error;
/// Wire protocols consumed by the engine: the proprietary broadcast
/// frame and the OBD-II request/response pair.
pub mod protocol;
/// Last-known telemetry readings and their "no data" sentinels.
pub mod readings;
/// CAN bus abstraction: raw frames, controller modes, and the loopback
/// self-test.
pub mod transport;
