//! End-to-end acquisition scenarios: direct broadcast decode, cyclic
//! polling, response matching, staleness, and error accounting.
mod helpers;

use canlog_core::acquisition::Acquisition;
use canlog_core::protocol::direct::DIRECT_FRAME_ID;
use canlog_core::protocol::pid::{Pid, OBD_REQUEST_ID, OBD_RESPONSE_ID_MIN, POLL_ROSTER};
use canlog_core::readings::CurrentReadings;
use canlog_core::transport::frame::BusFrame;
use embassy_time::Instant;
use helpers::MockCan;

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

/// Proprietary ECU broadcast with the given raw field bytes.
fn direct_frame(raw_rpm: u16, speed: u8, throttle: u8, load: u8) -> BusFrame {
    let rpm = raw_rpm.to_be_bytes();
    BusFrame::new(DIRECT_FRAME_ID, &[rpm[0], rpm[1], speed, throttle, load]).unwrap()
}

/// Mode 01 response from the primary ECU.
fn pid_response(pid: Pid, payload: &[u8]) -> BusFrame {
    let mut data = [0x55u8; 8];
    data[0] = 2 + payload.len() as u8;
    data[1] = 0x41;
    data[2] = pid.into();
    data[3..3 + payload.len()].copy_from_slice(payload);

    BusFrame {
        id: OBD_RESPONSE_ID_MIN,
        data,
        len: 8,
    }
}

#[test]
/// Happy path: init, decode a broadcast carrying raw 8000
/// (2000 RPM), then a coolant response 0x64 (60 °C) once coolant is the
/// outstanding request.
fn end_to_end_direct_and_polled_decode() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    // Broadcast pending on the very first tick: decoded immediately.
    engine.bus_mut().push_rx(direct_frame(8000, 85, 255, 128));
    engine.poll(at(0));
    assert_eq!(engine.rpm(), 2000);
    assert_eq!(engine.speed_kmh(), 85);
    assert_eq!(engine.throttle_pct(), 100);
    assert_eq!(engine.engine_load_pct(), 50);

    // Walk the cadence until coolant temperature is the outstanding
    // request (roster index 4 → dispatched at t = 400 ms).
    for step in 1..5u64 {
        engine.poll(at(step * 100));
    }

    engine.bus_mut().push_rx(pid_response(Pid::CoolantTemp, &[0x64]));
    engine.poll(at(420));
    assert_eq!(engine.coolant_temp_c(), 60);
    assert!(engine.is_data_fresh(at(420)));
}

#[test]
/// A response for a parameter other than the outstanding request never
/// reaches the readings.
fn mismatched_response_discarded() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    // First dispatch is for RPM; answer with coolant instead.
    engine.poll(at(0));
    engine.bus_mut().push_rx(pid_response(Pid::CoolantTemp, &[0x64]));
    engine.poll(at(20));

    assert_eq!(engine.snapshot(), CurrentReadings::EMPTY);
    assert!(!engine.is_data_fresh(at(20)));
    assert_eq!(engine.error_count(), 0);
}

#[test]
/// At a steady 100 ms cadence the cursor requests all twelve roster
/// entries exactly once per 1.2 s window, then wraps.
fn poll_cursor_full_cycle() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    for step in 0..12u64 {
        engine.poll(at(step * 100));
        // An off-cadence host tick must not emit an extra request.
        engine.poll(at(step * 100 + 20));
    }
    engine.poll(at(1200));

    let sent = &engine.bus().sent;
    assert_eq!(sent.len(), 13);

    for (i, request) in sent.iter().take(12).enumerate() {
        assert_eq!(request.id, OBD_REQUEST_ID);
        assert_eq!(request.data[2], u8::from(POLL_ROSTER[i]));
    }
    assert_eq!(sent[12].data[2], u8::from(POLL_ROSTER[0]));
}

#[test]
/// Requests are padded ISO-TP single frames for service 01.
fn requests_use_functional_framing() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();
    engine.poll(at(0));

    let request = &engine.bus().sent[0];
    assert_eq!(request.id, OBD_REQUEST_ID);
    assert_eq!(request.len, 8);
    assert_eq!(request.data[0], 0x02);
    assert_eq!(request.data[1], 0x01);
    assert_eq!(&request.data[3..], &[0x55; 5]);
}

#[test]
/// Freshness holds through 2000 ms inclusive, drops at 2001 ms, and
/// returns with the next successful decode.
fn freshness_window_boundaries() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    engine.bus_mut().push_rx(direct_frame(8000, 0, 0, 0));
    engine.poll(at(0));

    assert!(engine.is_data_fresh(at(1999)));
    assert!(engine.is_data_fresh(at(2000)));
    assert!(!engine.is_data_fresh(at(2001)));

    engine.bus_mut().push_rx(direct_frame(8000, 0, 0, 0));
    engine.poll(at(3000));
    assert!(engine.is_data_fresh(at(3000)));
    assert!(engine.is_data_fresh(at(5000)));
    assert!(!engine.is_data_fresh(at(5001)));
}

#[test]
/// Before any decode the engine reports stale data, no matter how
/// long it has been polling.
fn never_decoded_reads_stale() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    engine.poll(at(0));
    assert!(!engine.is_data_fresh(at(0)));
    assert!(!engine.is_data_fresh(at(10_000)));
}

#[test]
/// Each failed send or receive adds exactly one to the counter; the
/// counter never moves otherwise.
fn error_counter_monotone() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();
    assert_eq!(engine.error_count(), 0);

    engine.bus_mut().fail_next_send = true;
    engine.poll(at(0));
    assert_eq!(engine.error_count(), 1);

    engine.bus_mut().fail_next_recv = true;
    engine.poll(at(20));
    assert_eq!(engine.error_count(), 2);

    engine.poll(at(100));
    assert_eq!(engine.error_count(), 2);
}

#[test]
/// Reinitialization resets readings, counters, and the poll cycle; it
/// is the only recovery action and is safe to repeat.
fn reinit_resets_state() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    engine.bus_mut().push_rx(direct_frame(8000, 85, 255, 128));
    engine.bus_mut().fail_next_recv = true;
    engine.poll(at(0));
    engine.poll(at(20));
    assert_eq!(engine.error_count(), 1);
    assert_eq!(engine.rpm(), 2000);

    engine.init().unwrap();

    assert!(engine.is_initialized());
    assert_eq!(engine.error_count(), 0);
    assert_eq!(engine.snapshot(), CurrentReadings::EMPTY);
    assert!(!engine.is_data_fresh(at(100)));
    assert_eq!(engine.bus().init_calls, 2);

    // The poll cycle restarts from the head of the roster.
    engine.poll(at(100));
    let sent = &engine.bus().sent;
    assert_eq!(sent.last().unwrap().data[2], u8::from(POLL_ROSTER[0]));
}

#[test]
/// A failed initialization leaves the engine inert until a retry
/// succeeds.
fn failed_init_keeps_engine_inert() {
    let mut bus = MockCan::new();
    bus.fail_init = true;
    let mut engine = Acquisition::new(bus);

    assert!(engine.init().is_err());
    assert!(!engine.is_initialized());

    engine.poll(at(0));
    assert!(engine.bus().sent.is_empty());

    engine.bus_mut().fail_init = false;
    engine.init().unwrap();
    assert!(engine.is_initialized());

    engine.poll(at(100));
    assert_eq!(engine.bus().sent.len(), 1);
}

#[test]
/// Identifiers the logger has no decoder for are skipped silently.
fn unknown_identifier_ignored() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    let noise = BusFrame::new(embedded_can::StandardId::new(0x123).unwrap(), &[1, 2, 3]).unwrap();
    engine.bus_mut().push_rx(noise);
    engine.poll(at(0));

    assert_eq!(engine.snapshot(), CurrentReadings::EMPTY);
    assert_eq!(engine.error_count(), 0);
}

#[test]
/// Sentinels survive until a field's first decode; other fields keep
/// theirs afterwards.
fn sentinels_until_first_decode() {
    let mut engine = Acquisition::new(MockCan::new());
    engine.init().unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.rpm, canlog_core::readings::NO_DATA_U16);
    assert_eq!(snapshot.coolant_temp_c, canlog_core::readings::NO_DATA_I16);
    assert_eq!(snapshot.baro_kpa, canlog_core::readings::NO_DATA_U8);

    engine.bus_mut().push_rx(direct_frame(8000, 85, 255, 128));
    engine.poll(at(0));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.rpm, 2000);
    // Polled-only quantities still await their first response.
    assert_eq!(snapshot.coolant_temp_c, canlog_core::readings::NO_DATA_I16);
}
