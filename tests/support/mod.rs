use std::path::{Path, PathBuf};

use tempfile::TempDir;

use taskdeck::config::{Config, MirrorConfig};
use taskdeck::mirror;
use taskdeck::record::{RawRow, TaskRecord};
use taskdeck::roles::ROLE_COLUMNS;
use taskdeck::storage::Storage;
use taskdeck::table::TaskTable;

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    /// Fresh project: config file, state dir, schema-only mirror, empty roles.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let env = Self { dir };

        Config::default()
            .save(&Storage::config_path(env.path()))
            .expect("write config");
        env.storage().init().expect("init storage");
        mirror::write_rows(&env.storage().roles_path(), &ROLE_COLUMNS, &[])
            .expect("write roles header");

        env
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> Storage {
        let config = Config::load_from_root(&self.path().to_path_buf());
        Storage::new(self.path().to_path_buf(), &config.mirror)
    }

    pub fn config(&self) -> Config {
        Config::load_from_root(&self.path().to_path_buf())
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = Storage::config_path(self.path());
        std::fs::write(&path, contents).expect("write config");
        path
    }

    /// Replace the role table with the given rows.
    pub fn seed_roles(&self, rows: &[RawRow]) {
        mirror::write_rows(&self.storage().roles_path(), &ROLE_COLUMNS, rows)
            .expect("write roles");
    }

    /// Replace the task mirror with the given records.
    pub fn seed_tasks(&self, records: Vec<TaskRecord>) {
        let mut table = TaskTable::new();
        for record in records {
            table.insert(record).expect("insert task");
        }
        mirror::write_table(&self.storage().mirror_path(), &table).expect("write mirror");
    }

    pub fn read_mirror(&self) -> TaskTable {
        mirror::read_table(&self.storage().mirror_path()).expect("read mirror")
    }

    pub fn mirror_contents(&self) -> String {
        std::fs::read_to_string(self.storage().mirror_path()).expect("read mirror file")
    }
}

/// A role row with sensible test defaults: active, all tabs, and free of
/// the hours gate so tests pass at any wall-clock time.
pub fn role_row(email: &str, cells: &[(&str, &str)]) -> RawRow {
    let mut raw = RawRow::new();
    raw.insert("Email".to_string(), email.to_string());
    raw.insert("Name".to_string(), String::new());
    raw.insert("Active".to_string(), "yes".to_string());
    raw.insert("AfterHours".to_string(), "yes".to_string());
    raw.insert("Weekends".to_string(), "yes".to_string());
    for (column, value) in cells {
        raw.insert(column.to_string(), value.to_string());
    }
    raw
}

pub fn task(id: &str, title: &str, assignee: &str) -> TaskRecord {
    let mut record = TaskRecord::new(id, title);
    record.assignee = assignee.to_string();
    record
}

/// A taskdeck command rooted in the test project.
pub fn taskdeck_cmd(env: &TestEnv) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("taskdeck").expect("binary");
    cmd.current_dir(env.path());
    cmd.env_remove("TASKDECK_USER");
    cmd.env_remove("TASKDECK_ROOT");
    cmd
}
