//! Exact line sequences checked against embedded-hal-mock pins.

use embedded_hal_mock::eh1::digital::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use stepper_axis::{Clock, NoSensor, RevsPerSec, Revolutions, StepperAxisBuilder, Steps};

/// Clock that records every deadline it is asked to wait for.
#[derive(Default)]
struct RecordingClock {
    now: u64,
    deadlines: Vec<u64>,
}

impl Clock for RecordingClock {
    fn now_us(&mut self) -> u64 {
        self.now
    }

    fn wait_until_us(&mut self, deadline_us: u64) {
        self.deadlines.push(deadline_us);
        self.now = self.now.max(deadline_us);
    }
}

fn pulses(count: usize) -> Vec<PinTransaction> {
    let mut transactions = Vec::new();
    for _ in 0..count {
        transactions.push(PinTransaction::set(PinState::High));
        transactions.push(PinTransaction::set(PinState::Low));
    }
    transactions
}

#[test]
fn test_constant_move_pulse_train() {
    let mut step = PinMock::new(&pulses(2));
    let mut dir = PinMock::new(&[PinTransaction::set(PinState::Low)]);
    let mut clock = RecordingClock::default();

    {
        let mut axis = StepperAxisBuilder::<_, _, NoSensor, _>::new()
            .steps_per_revolution(4)
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .clock(&mut clock)
            .build()
            .unwrap();

        // 400 steps/s: 2500 µs period, 1250 µs each level
        axis.rotate(Revolutions(0.5), RevsPerSec(100.0)).unwrap();
        assert_eq!(axis.position(), Steps(2));
    }

    assert_eq!(clock.deadlines, vec![1250, 2500, 3750, 5000]);
    step.done();
    dir.done();
}

#[test]
fn test_inverted_direction_line() {
    let mut step = PinMock::new(&pulses(2));
    let mut dir = PinMock::new(&[PinTransaction::set(PinState::Low)]);
    let mut clock = RecordingClock::default();

    let mut axis = StepperAxisBuilder::<_, _, NoSensor, _>::new()
        .steps_per_revolution(4)
        .invert_direction(true)
        .step_pin(step.clone())
        .dir_pin(dir.clone())
        .clock(&mut clock)
        .build()
        .unwrap();

    axis.rotate(Revolutions(-0.5), RevsPerSec(100.0)).unwrap();
    assert_eq!(axis.position(), Steps(-2));

    step.done();
    dir.done();
}

#[test]
fn test_trip_reads_only_the_leading_sensor() {
    let mut step = PinMock::new(&pulses(2));
    let mut dir = PinMock::new(&[PinTransaction::set(PinState::Low)]);
    let mut end = PinMock::new(&[
        PinTransaction::get(PinState::High),
        PinTransaction::get(PinState::High),
        PinTransaction::get(PinState::Low),
    ]);
    let mut home = PinMock::new(&[]);
    let mut clock = RecordingClock::default();

    let mut axis = StepperAxisBuilder::new()
        .has_limits(true)
        .steps_per_revolution(4)
        .step_pin(step.clone())
        .dir_pin(dir.clone())
        .limit_pins(end.clone(), home.clone())
        .clock(&mut clock)
        .build()
        .unwrap();

    let report = axis.rotate(Revolutions(1.0), RevsPerSec(100.0)).unwrap();

    let abort = report.abort.unwrap();
    assert_eq!(abort.trip_position, 2);
    assert_eq!(abort.stop_steps, 0);
    assert_eq!(axis.position(), Steps(2));

    step.done();
    dir.done();
    end.done();
    home.done();
}

#[test]
fn test_homing_line_sequence() {
    let mut step = PinMock::new(&pulses(2));
    let mut dir = PinMock::new(&[
        PinTransaction::set(PinState::High),
        PinTransaction::set(PinState::Low),
    ]);
    let mut end = PinMock::new(&[]);
    let mut home = PinMock::new(&[
        // Seek: not on the sensor yet
        PinTransaction::get(PinState::High),
        // Creep in reverse: one step, then triggered
        PinTransaction::get(PinState::High),
        PinTransaction::get(PinState::Low),
        // Back off: one step, then released
        PinTransaction::get(PinState::Low),
        PinTransaction::get(PinState::High),
    ]);
    let mut clock = RecordingClock::default();

    let mut axis = StepperAxisBuilder::new()
        .has_limits(true)
        .steps_per_revolution(4)
        .step_pin(step.clone())
        .dir_pin(dir.clone())
        .limit_pins(end.clone(), home.clone())
        .clock(&mut clock)
        .build()
        .unwrap();

    axis.home(RevsPerSec(1.0)).unwrap();
    assert_eq!(axis.position(), Steps(0));

    step.done();
    dir.done();
    end.done();
    home.done();
}
