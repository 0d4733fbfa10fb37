mod support;

use chrono::{NaiveDate, NaiveDateTime};

use support::{role_row, task, TestEnv};
use taskdeck::access::Tab;
use taskdeck::error::Error;
use taskdeck::session::Session;
use taskdeck::table::TaskEdit;

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 12)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn open(env: &TestEnv, user: &str) -> Session {
    Session::open(env.storage(), env.config(), Some(user)).expect("session")
}

fn seed_shared_table(env: &TestEnv) {
    env.seed_tasks(vec![
        task("T-1", "Mine by email", "alice@example.com"),
        task("T-2", "Mine by name", "Alice Doe"),
        task("T-3", "Bob's", "bob@example.com"),
        task("T-4", "Unassigned", ""),
    ]);
}

#[test]
fn visible_rows_narrow_to_own_tasks() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[("Name", "Alice Doe")])]);
    seed_shared_table(&env);

    let session = open(&env, "alice@example.com");
    let visible = session.visible_rows().expect("rows");
    let ids: Vec<&str> = visible.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["T-1", "T-2"]);
}

#[test]
fn super_viewer_sees_all_rows() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("lead@example.com", &[("ViewAll", "yes")])]);
    seed_shared_table(&env);

    let session = open(&env, "lead@example.com");
    assert_eq!(session.visible_rows().expect("rows").len(), 4);
}

#[test]
fn save_path_rechecks_row_scope() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[])]);
    seed_shared_table(&env);
    let before = env.mirror_contents();

    let mut session = open(&env, "alice@example.com");
    let err = session
        .edit_and_save(
            Tab::Editor,
            noon(),
            &[("T-3".to_string(), TaskEdit::Comment("sneaky".to_string()))],
            None,
        )
        .expect_err("out of scope");

    assert!(matches!(err, Error::RowOutOfScope { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(env.mirror_contents(), before);
}

#[test]
fn save_path_rechecks_readonly_columns() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row(
        "alice@example.com",
        &[("ReadOnlyColumns", "Rating;Evaluation;Compliance")],
    )]);
    seed_shared_table(&env);
    let before = env.mirror_contents();

    let mut session = open(&env, "alice@example.com");
    let err = session
        .edit_and_save(
            Tab::Editor,
            noon(),
            &[("T-1".to_string(), TaskEdit::Rating(5))],
            None,
        )
        .expect_err("read-only");

    assert!(matches!(err, Error::ReadOnlyColumn { .. }));
    assert_eq!(env.mirror_contents(), before);

    // columns outside the list stay editable
    let report = session
        .edit_and_save(
            Tab::Editor,
            noon(),
            &[("T-1".to_string(), TaskEdit::Comment("allowed".to_string()))],
            None,
        )
        .expect("save");
    assert!(report.mirror_written);
}

#[test]
fn readonly_glob_covers_column_families() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row(
        "alice@example.com",
        &[("ReadOnlyColumns", "*Date")],
    )]);
    env.seed_tasks(vec![task("T-1", "Dated", "alice@example.com")]);

    let mut session = open(&env, "alice@example.com");
    let err = session
        .edit_and_save(
            Tab::Editor,
            noon(),
            &[(
                "T-1".to_string(),
                TaskEdit::DueDate(NaiveDate::from_ymd_opt(2024, 7, 1)),
            )],
            None,
        )
        .expect_err("date columns read-only");
    assert!(matches!(err, Error::ReadOnlyColumn { .. }));
}

#[test]
fn mixed_batch_fails_closed_before_any_edit() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[])]);
    seed_shared_table(&env);
    let before = env.mirror_contents();

    let mut session = open(&env, "alice@example.com");
    let err = session
        .edit_and_save(
            Tab::Editor,
            noon(),
            &[
                ("T-1".to_string(), TaskEdit::Rating(4)),
                ("T-3".to_string(), TaskEdit::Rating(1)),
            ],
            None,
        )
        .expect_err("second edit is out of scope");
    assert!(matches!(err, Error::RowOutOfScope { .. }));

    // the in-scope edit was not persisted either
    assert_eq!(env.mirror_contents(), before);
    assert_eq!(env.read_mirror().find("T-1").unwrap().rating, 0);
}
