mod common;

use std::time::Duration;

use common::*;
use trainsign_core::{BuildError, LineDescriptor, LineRegistry, Sign, SignError, TimingCfg};
use trainsign_traits::ManualClock;

fn root_build_error(report: &eyre::Report) -> Option<&BuildError> {
    report.downcast_ref::<BuildError>()
}

#[test]
fn try_build_reports_first_missing_piece() {
    let err = Sign::builder()
        .with_display(SpyDisplay::default())
        .try_build()
        .unwrap_err();
    assert!(matches!(
        root_build_error(&err),
        Some(BuildError::MissingSource)
    ));

    let err = Sign::builder()
        .with_source(ScriptSource::failing())
        .with_display(SpyDisplay::default())
        .try_build()
        .unwrap_err();
    assert!(matches!(root_build_error(&err), Some(BuildError::MissingLink)));
}

#[test]
fn zero_poll_is_rejected() {
    let err = Sign::builder()
        .with_source(ScriptSource::failing())
        .with_display(SpyDisplay::default())
        .with_link(FakeLink::up())
        .with_time_sync(FixedTime::at(wall(12, 0, 0)))
        .with_timing(TimingCfg {
            poll: Duration::ZERO,
            ..TimingCfg::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(
        root_build_error(&err),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn unknown_default_line_is_rejected() {
    let err = Sign::builder()
        .with_source(ScriptSource::failing())
        .with_display(SpyDisplay::default())
        .with_link(FakeLink::up())
        .with_time_sync(FixedTime::at(wall(12, 0, 0)))
        .with_default_line("Q")
        .build()
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<SignError>(),
        Some(&SignError::UnknownLine("Q".into()))
    );
}

#[test]
fn boxed_sign_uses_custom_registry() {
    let clock = ManualClock::new();
    let registry = LineRegistry::new(vec![LineDescriptor::new(
        "7",
        "724",
        "7-5 Av",
        "Flushing",
        "Hudson Yards",
        "7-dashboard.bmp",
    )])
    .unwrap();
    let mut sign = Sign::builder()
        .with_source(ScriptSource::failing())
        .with_display(SpyDisplay::default())
        .with_link(FakeLink::up())
        .with_time_sync(FixedTime::at(wall(12, 0, 0)))
        .with_registry(registry)
        .with_default_line("7")
        .with_clock(std::sync::Arc::new(clock.clone()))
        .build()
        .unwrap();
    assert_eq!(sign.active_line().stop_id, "724");
    assert_eq!(sign.switch_line("L"), Err(SignError::UnknownLine("L".into())));
}
