//! Test doubles to simulate the CAN controller during integration tests.
use canlog_core::transport::{frame::BusFrame, BusMode, CanTransport};
use std::collections::VecDeque;

/// Error type reported by the mock controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

#[allow(dead_code)]
/// In-memory CAN controller reproducing the `CanTransport` behaviour.
///
/// Frames pushed by the test appear to the engine as pending bus
/// traffic; everything the engine transmits is logged in `sent`. In
/// loopback mode transmissions are echoed back onto the receive queue,
/// optionally corrupted or dropped to provoke self-test failures.
pub struct MockCan {
    pub rx: VecDeque<BusFrame>,
    pub sent: Vec<BusFrame>,
    pub mode: BusMode,
    pub init_calls: usize,
    pub fail_init: bool,
    pub fail_next_send: bool,
    pub fail_next_recv: bool,
    pub corrupt_loopback: bool,
    pub drop_loopback: bool,
}

#[allow(dead_code)]
impl MockCan {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            sent: Vec::new(),
            mode: BusMode::Normal,
            init_calls: 0,
            fail_init: false,
            fail_next_send: false,
            fail_next_recv: false,
            corrupt_loopback: false,
            drop_loopback: false,
        }
    }

    /// Queue a frame the engine will see on its next receive poll.
    pub fn push_rx(&mut self, frame: BusFrame) {
        self.rx.push_back(frame);
    }
}

impl CanTransport for MockCan {
    type Error = MockFault;

    fn init(&mut self) -> Result<(), MockFault> {
        self.init_calls += 1;
        if self.fail_init {
            return Err(MockFault);
        }
        Ok(())
    }

    fn set_mode(&mut self, mode: BusMode) -> Result<(), MockFault> {
        self.mode = mode;
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<BusFrame>, MockFault> {
        if self.fail_next_recv {
            self.fail_next_recv = false;
            return Err(MockFault);
        }
        Ok(self.rx.pop_front())
    }

    fn send(&mut self, frame: &BusFrame) -> Result<(), MockFault> {
        if self.fail_next_send {
            self.fail_next_send = false;
            return Err(MockFault);
        }

        if self.mode == BusMode::Loopback && !self.drop_loopback {
            let mut echo = frame.clone();
            if self.corrupt_loopback {
                echo.data[0] ^= 0xFF;
            }
            self.rx.push_back(echo);
        }

        self.sent.push(frame.clone());
        Ok(())
    }
}
