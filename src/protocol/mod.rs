//! Wire protocols consumed by the acquisition engine. Both layouts are
//! fixed by the vehicle and must be replicated byte-exact: no
//! negotiation or discovery exists on this bus.
pub mod direct;
pub mod pid;
