mod support;

use chrono::{NaiveDate, NaiveDateTime};

use support::{role_row, TestEnv};
use taskdeck::access::Tab;
use taskdeck::error::Error;
use taskdeck::session::Session;

fn open(env: &TestEnv, user: &str) -> Session {
    Session::open(env.storage(), env.config(), Some(user)).expect("session")
}

// Wednesday
fn weekday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 12)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn sunday(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 16)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn unknown_user_is_denied_with_reason() {
    let env = TestEnv::init();
    let session = open(&env, "ghost@example.com");

    let decision = session
        .check_access(Tab::Editor, weekday(10, 0))
        .expect("decision");
    assert_eq!(
        decision.deny_reason(),
        Some("no role entry for ghost@example.com")
    );
}

#[test]
fn hours_gate_denies_outside_window_without_flag() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row(
        "clerk@example.com",
        &[("AfterHours", "no"), ("Weekends", "no")],
    )]);
    let session = open(&env, "clerk@example.com");

    // before opening and at/after closing
    for now in [weekday(7, 59), weekday(17, 0), weekday(21, 30)] {
        let decision = session.check_access(Tab::Editor, now).expect("decision");
        assert_eq!(
            decision.deny_reason(),
            Some("outside allowed hours (08:00-17:00) for clerk@example.com")
        );
    }

    assert!(session
        .check_access(Tab::Editor, weekday(8, 0))
        .expect("decision")
        .is_allowed());
    assert!(session
        .check_access(Tab::Editor, weekday(16, 59))
        .expect("decision")
        .is_allowed());
}

#[test]
fn after_hours_flag_is_never_denied_for_time() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("owl@example.com", &[("Weekends", "no")])]);
    let session = open(&env, "owl@example.com");

    for now in [weekday(0, 0), weekday(7, 59), weekday(17, 0), weekday(23, 59)] {
        assert!(
            session.check_access(Tab::Editor, now).expect("decision").is_allowed(),
            "denied at {now}"
        );
    }
}

#[test]
fn weekend_needs_its_own_flag() {
    let env = TestEnv::init();
    env.seed_roles(&[
        role_row("clerk@example.com", &[("Weekends", "no")]),
        role_row("oncall@example.com", &[]),
    ]);

    let clerk = open(&env, "clerk@example.com");
    let decision = clerk.check_access(Tab::Editor, sunday(10)).expect("decision");
    assert_eq!(
        decision.deny_reason(),
        Some("weekend access is not enabled for clerk@example.com")
    );

    let oncall = open(&env, "oncall@example.com");
    assert!(oncall
        .check_access(Tab::Editor, sunday(10))
        .expect("decision")
        .is_allowed());
}

#[test]
fn tab_grant_limits_views() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row(
        "viewer@example.com",
        &[("Tabs", "board;timeline")],
    )]);
    let session = open(&env, "viewer@example.com");

    assert!(session
        .check_access(Tab::Board, weekday(10, 0))
        .expect("decision")
        .is_allowed());
    let decision = session
        .check_access(Tab::Evaluation, weekday(10, 0))
        .expect("decision");
    assert_eq!(
        decision.deny_reason(),
        Some("tab 'evaluation' is not permitted for viewer@example.com")
    );
}

#[test]
fn inactive_user_cannot_require_access() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("gone@example.com", &[("Active", "no")])]);
    let session = open(&env, "gone@example.com");

    let err = session
        .require_access(Tab::Editor, weekday(10, 0))
        .expect_err("denied");
    assert!(matches!(err, Error::AccessDenied(_)));
    assert_eq!(err.exit_code(), 3);
}
