mod common;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use common::*;
use rstest::rstest;
use trainsign_core::mocks::{CountingReset, NoInput};
use trainsign_core::{ButtonMap, RunExit, RunParams, SignError, run};
use trainsign_traits::{ButtonEdges, ManualClock};

fn feed() -> trainsign_traits::StopArrivals {
    stop(
        &[("L", "2024-01-01T12:05:00"), ("G", "2024-01-01T12:07:00")],
        &[("G", "2024-01-01T12:09:00")],
    )
}

fn params(max_iterations: Option<u64>) -> RunParams {
    RunParams {
        buttons: ButtonMap::default(),
        max_iterations,
    }
}

#[test]
fn exhausted_error_budget_resets_exactly_once() {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::failing(), &clock);
    let mut reset = CountingReset::default();
    let stop_flag = AtomicBool::new(false);

    let exit = run(&mut sign, &mut NoInput, &mut reset, &params(None), &stop_flag).unwrap();

    assert_eq!(exit, RunExit::Reset { errors: 4 });
    assert_eq!(reset.resets, 1);
    // Four fetch attempts, one per interval, then nothing.
    assert_eq!(sign.source().fetches.len(), 4);
    assert!(clock.elapsed() >= Duration::from_secs(90));
    assert!(clock.elapsed() < Duration::from_secs(91));
}

#[test]
fn iteration_limit_paces_with_poll_quantum() {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::always(feed()), &clock);
    let mut reset = CountingReset::default();
    let exit = run(
        &mut sign,
        &mut NoInput,
        &mut reset,
        &params(Some(5)),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(exit, RunExit::IterationLimit);
    assert_eq!(clock.elapsed(), Duration::from_millis(500));
    assert_eq!(sign.source().fetches, vec!["L11"]);
    assert_eq!(reset.resets, 0);
}

#[test]
fn raised_shutdown_flag_stops_before_any_work() {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::always(feed()), &clock);
    let exit = run(
        &mut sign,
        &mut NoInput,
        &mut CountingReset::default(),
        &params(None),
        &AtomicBool::new(true),
    )
    .unwrap();
    assert_eq!(exit, RunExit::Shutdown);
    assert!(sign.source().fetches.is_empty());
}

#[rstest]
#[case::down_selects_g(ButtonEdges { up: false, down: true }, "G")]
#[case::up_keeps_l(ButtonEdges { up: true, down: false }, "L")]
#[case::both_up_wins(ButtonEdges { up: true, down: true }, "L")]
#[case::none(ButtonEdges::NONE, "L")]
fn buttons_select_line(#[case] edges: ButtonEdges, #[case] expected: &str) {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::always(feed()), &clock);
    let mut input = ScriptInput::default();
    input.edges.push_back(edges);
    run(
        &mut sign,
        &mut input,
        &mut CountingReset::default(),
        &params(Some(1)),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(sign.active_line().id, expected);
}

#[test]
fn button_press_mid_interval_fetches_new_stop() {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::always(feed()), &clock);
    let mut input = ScriptInput::default();
    input.edges.push_back(ButtonEdges::NONE);
    input.edges.push_back(ButtonEdges::NONE);
    input.edges.push_back(ButtonEdges {
        up: false,
        down: true,
    });
    run(
        &mut sign,
        &mut input,
        &mut CountingReset::default(),
        &params(Some(4)),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(sign.source().fetches, vec!["L11", "G29"]);
    assert_eq!(sign.display().last_arrivals(), Some(("7,-,-", "9,-,-")));
}

#[test]
fn button_bound_to_unknown_line_fails_fast() {
    let clock = ManualClock::new();
    let mut sign = sign(ScriptSource::always(feed()), &clock);
    let params = RunParams {
        buttons: ButtonMap {
            up: "L".into(),
            down: "7".into(),
        },
        max_iterations: Some(10),
    };
    let err = run(
        &mut sign,
        &mut NoInput,
        &mut CountingReset::default(),
        &params,
        &AtomicBool::new(false),
    )
    .unwrap_err();
    assert_eq!(err, SignError::UnknownLine("7".into()));
    assert!(sign.source().fetches.is_empty());
}
