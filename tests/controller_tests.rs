//! Integration tests for the controller state machine.

use sdram_controller::common::constants::A10_ALL_BANKS;
use sdram_controller::common::{ControllerError, RejectReason, SubmitError};
use sdram_controller::config::Config;
use sdram_controller::controller::state::State;
use sdram_controller::controller::Controller;
use sdram_controller::protocol::{Command, Opcode};
use sdram_controller::Request;

/// Ticks until the controller reports ready, collecting non-NOP commands.
fn boot(ctrl: &mut Controller) -> Vec<(u64, Command)> {
    let mut issued = Vec::new();
    while !ctrl.ready() {
        let cycle = ctrl.cycle();
        let cmd = ctrl.tick().unwrap();
        if !cmd.is_nop() {
            issued.push((cycle, cmd));
        }
        assert!(cycle < 10_000, "controller never became ready");
    }
    issued
}

fn block(words: u32) -> Vec<u32> {
    (0..words).collect()
}

/// Tests the exact power-on sequence of the reference configuration.
#[test]
fn test_power_on_sequence() {
    let mut ctrl = Controller::new(&Config::default());
    assert_eq!(ctrl.state(), State::PowerOnWait);

    for cycle in 0..1023 {
        let cmd = ctrl.tick().unwrap();
        assert!(cmd.is_nop(), "non-NOP on cycle {}", cycle);
        assert!(!ctrl.ready());
    }

    let precharge = ctrl.tick().unwrap();
    assert_eq!(precharge.opcode, Opcode::Precharge);
    assert_eq!(precharge.addr & A10_ALL_BANKS, A10_ALL_BANKS);
    assert_eq!(ctrl.state(), State::PrechargeAll);

    let mode = ctrl.tick().unwrap();
    assert_eq!(mode.opcode, Opcode::Mode);
    assert_eq!(mode.addr, 0x0021);
    assert_eq!(ctrl.state(), State::ModeSet);

    // Five intervals elapsed during initialization; that debt is paid off
    // back to back as soon as the sequencer reaches Idle.
    assert_eq!(ctrl.refresh_debt(), 5);
    let issued = boot(&mut ctrl);
    let cycles: Vec<u64> = issued.iter().map(|(c, _)| *c).collect();
    assert_eq!(cycles, vec![1026, 1028, 1030, 1032, 1034]);
    assert!(issued.iter().all(|(_, cmd)| cmd.opcode == Opcode::Refresh));
    assert_eq!(ctrl.refresh_debt(), 0);
    assert_eq!(ctrl.state(), State::Idle);
    assert_eq!(ctrl.cycle(), 1037);
}

/// Tests that the power-on delay follows the configuration.
#[test]
fn test_configured_init_delay() {
    let mut config = Config::default();
    config.init.init_delay = 5;
    let mut ctrl = Controller::new(&config);

    let issued = boot(&mut ctrl);
    assert_eq!(issued.len(), 2);
    assert_eq!(issued[0].0, 5);
    assert_eq!(issued[0].1.opcode, Opcode::Precharge);
    assert_eq!(issued[1].0, 6);
    assert_eq!(issued[1].1.opcode, Opcode::Mode);
}

/// Tests back-pressure while the controller is not ready.
#[test]
fn test_busy_during_initialization() {
    let mut ctrl = Controller::new(&Config::default());
    ctrl.tick().unwrap();
    assert_eq!(ctrl.submit(Request::read(0, 1)), Err(SubmitError::Busy));
    assert!(!ctrl.status().ready);
    assert_eq!(ctrl.stats.busy, 1);
}

/// Tests back-pressure while a request is in flight.
#[test]
fn test_busy_while_request_active() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    assert_eq!(ctrl.submit(Request::read(0, 1)), Ok(0));
    assert!(!ctrl.ready());
    assert!(ctrl.has_active_request());
    assert_eq!(ctrl.submit(Request::read(64, 1)), Err(SubmitError::Busy));
}

/// Tests that malformed requests are rejected without side effects.
#[test]
fn test_rejections_keep_controller_ready() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    let cases = vec![
        (
            Request::read(1 << 25, 1),
            RejectReason::AddressOutOfRange {
                addr: 1 << 25,
                limit: 1 << 25,
            },
        ),
        (
            Request::read(0, 0),
            RejectReason::BlockCount { count: 0, max: 16 },
        ),
        (
            Request::read(0, 17),
            RejectReason::BlockCount { count: 17, max: 16 },
        ),
        (
            Request::write(0, 1, block(15)),
            RejectReason::PayloadLength {
                expected: 16,
                actual: 15,
            },
        ),
        (
            Request {
                data: block(16),
                ..Request::read(0, 1)
            },
            RejectReason::UnexpectedPayload(16),
        ),
        (
            Request::read(1, 1),
            RejectReason::Misaligned {
                col: 1,
                burst_length: 2,
            },
        ),
        (
            Request::read(1000, 1),
            RejectReason::CrossesRow {
                col: 1000,
                columns: 32,
            },
        ),
    ];

    for (req, reason) in cases {
        assert_eq!(ctrl.submit(req), Err(SubmitError::Rejected(reason)));
        let status = ctrl.status();
        assert!(status.ready);
        assert_eq!(status.last_rejection, Some(reason));
        assert!(!ctrl.has_active_request());
    }

    for _ in 0..50 {
        assert!(ctrl.tick().unwrap().is_nop());
    }
    assert!(ctrl.ready());
    assert_eq!(ctrl.stats.rejected, 7);
    assert_eq!(ctrl.stats.cmd_refresh, 5);
    assert_eq!(ctrl.stats.commands_issued(), 7);
}

/// Tests that a full 16-block burst at the end of a row is accepted.
#[test]
fn test_largest_request_accepted() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    let addr = (1 << 25) - 512;
    assert!(ctrl.submit(Request::write(addr, 16, block(256))).is_ok());
    assert_eq!(ctrl.status().last_rejection, None);
}

/// Tests that accepted requests get increasing identifiers.
#[test]
fn test_request_ids_increase() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    assert_eq!(ctrl.submit(Request::write(0, 1, block(16))), Ok(0));
    while ctrl.take_completion().is_none() {
        ctrl.tick().unwrap();
    }
    boot(&mut ctrl);
    assert_eq!(ctrl.submit(Request::write(32, 1, block(16))), Ok(1));
}

/// Tests that a pending refresh is issued before a simultaneous request's ACTIVATE.
#[test]
fn test_refresh_before_activate_on_tie() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    // Intervals are counted from reset and end on cycles 199, 399, ...
    while ctrl.cycle() % 200 != 199 {
        assert!(ctrl.tick().unwrap().is_nop());
    }
    assert_eq!(ctrl.cycle(), 1199);
    assert_eq!(ctrl.refresh_debt(), 0);

    ctrl.submit(Request::write(0, 1, block(16))).unwrap();
    assert_eq!(ctrl.tick().unwrap().opcode, Opcode::Refresh);
    assert_eq!(ctrl.refresh_debt(), 0);
    assert!(ctrl.tick().unwrap().is_nop());
    assert_eq!(ctrl.tick().unwrap().opcode, Opcode::Activate);
}

/// Tests that refreshes keep pace with wall-clock intervals counted from reset.
#[test]
fn test_refresh_counted_from_reset() {
    let mut ctrl = Controller::new(&Config::default());

    let mut refreshes = Vec::new();
    while ctrl.cycle() < 4000 {
        let cycle = ctrl.cycle();
        if ctrl.tick().unwrap().opcode == Opcode::Refresh {
            refreshes.push(cycle);
        }

        let elapsed = ctrl.cycle();
        if elapsed % 1000 == 0 {
            let issued = refreshes.len() as u64;
            assert_eq!(issued + u64::from(ctrl.refresh_debt()), elapsed / 200);
            if elapsed >= 2000 {
                assert!(issued >= elapsed / 200, "{} refreshes by cycle {}", issued, elapsed);
            }
        }
    }

    let mut expected = vec![1026, 1028, 1030, 1032, 1034];
    expected.extend((1199..4000).step_by(200));
    assert_eq!(refreshes, expected);
    assert_eq!(refreshes.len(), 20);

    // Busy until the last refresh's hold elapses.
    assert!(!ctrl.ready());
    ctrl.tick().unwrap();
    ctrl.tick().unwrap();
    assert!(ctrl.ready());
}

/// Tests that withholding refresh until saturation is fatal and latched.
#[test]
fn test_debt_saturation_is_fatal() {
    let mut config = Config::default();
    config.init.init_delay = 5;
    config.refresh.refresh_interval = 3;
    config.refresh.drain_threshold = 15;
    let mut ctrl = Controller::new(&config);
    boot(&mut ctrl);

    // A maximal burst outlasts fifteen intervals without a drain point.
    ctrl.submit(Request::write(0, 16, block(256))).unwrap();

    let err = loop {
        match ctrl.tick() {
            Ok(_) => assert!(ctrl.cycle() < 2000),
            Err(e) => break e,
        }
    };
    assert!(matches!(
        err,
        ControllerError::RefreshDebtSaturated { debt: 15, .. }
    ));

    let status = ctrl.status();
    assert!(status.fatal_timing_violation);
    assert!(!status.ready);
    assert_eq!(ctrl.state(), State::Faulted);
    assert_eq!(ctrl.fault(), Some(err));

    for _ in 0..100 {
        assert_eq!(ctrl.tick(), Err(err));
    }
    assert!(ctrl.status().fatal_timing_violation);
    assert_eq!(ctrl.submit(Request::read(0, 1)), Err(SubmitError::Faulted));
}

/// Tests the per-opcode statistics counters.
#[test]
fn test_stats_count_commands() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);

    ctrl.submit(Request::write(0, 1, block(16))).unwrap();
    let done = loop {
        ctrl.tick().unwrap();
        if let Some(done) = ctrl.take_completion() {
            break done;
        }
    };

    assert_eq!(done.id, 0);
    assert_eq!(done.latency(), 34);
    assert_eq!(ctrl.stats.cmd_activate, 1);
    assert_eq!(ctrl.stats.cmd_write, 16);
    assert_eq!(ctrl.stats.cmd_precharge, 2);
    assert_eq!(ctrl.stats.cmd_mode, 1);
    assert_eq!(ctrl.stats.writes_completed, 1);
    assert_eq!(ctrl.stats.words_written, 16);
    assert_eq!(ctrl.stats.cycles, ctrl.cycle());
}

/// Tests that refresh is still served while read data is outstanding.
#[test]
fn test_refresh_while_read_data_outstanding() {
    let mut ctrl = Controller::new(&Config::default());
    boot(&mut ctrl);
    let booted_refreshes = ctrl.stats.cmd_refresh;

    // No PHY is attached, so the read data never arrives on its own.
    ctrl.submit(Request::read(0, 1)).unwrap();
    for _ in 0..5000 {
        ctrl.tick().unwrap();
    }
    assert!(ctrl.take_completion().is_none());
    assert!(ctrl.has_active_request());
    assert_eq!(ctrl.state(), State::Precharging { drain: false });
    assert!(ctrl.stats.cmd_refresh >= booted_refreshes + 24);
    assert!(ctrl.refresh_debt() <= 1);
    assert!(!ctrl.status().fatal_timing_violation);

    let words = block(16);
    for word in &words {
        ctrl.sample_dq(*word);
    }
    let done = loop {
        ctrl.tick().unwrap();
        if let Some(done) = ctrl.take_completion() {
            break done;
        }
        assert!(ctrl.cycle() < 10_000);
    };
    assert_eq!(done.data, words);
    assert!(ctrl.ready() || ctrl.state() == State::Refreshing);
}

/// Tests that an unvalidated configuration is caught in debug builds.
#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "invalid configuration")]
fn test_invalid_configuration_caught_in_debug() {
    let mut config = Config::default();
    config.refresh.drain_threshold = 0;
    let _ = Controller::new(&config);
}
