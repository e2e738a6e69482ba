use ifinance::commands::*;
use ifinance::config::{default_data_dir, Config, DATA_DIR_ENV, LOG_ENV};
use ifinance::error::{AppError, StoreError};
use ifinance::forms::SaveMode;
use ifinance::models::{Department, Priority, Role, Task, TaskStatus, Team, User};
use ifinance::pages::{DateWindow, DepartmentFilters, MultiSelect, UserFilters};
use ifinance::repository::Repository;
use ifinance::session;
use ifinance::storage::{FileStore, KeyValueStore};
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

// Tests touching environment variables run serially
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_test_store<F>(f: F)
where
    F: FnOnce(&dyn KeyValueStore),
{
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    f(&store);
}

#[test]
fn test_add_and_list() {
    with_test_store(|store| {
        let args = TaskArgs {
            title: Some("Quarterly report".into()),
            priority: Some(Priority::High),
            deadline: Some("2026-03-01".into()),
            ..TaskArgs::default()
        };
        let task = cmd_task_save(store, None, &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(task.id, 2);

        let list = ListArgs { search: Some("quarterly".into()), ..ListArgs::default() };
        let view = task_list(store, &task_filters(&[], &[], DateWindow::AnyDate), &list).unwrap();
        assert_eq!(view.total(), 1);
        assert_eq!(view.visible()[0].title, "Quarterly report");

        let view = task_list(store, &task_filters(&[TaskStatus::Completed], &[], DateWindow::AnyDate), &ListArgs::default()).unwrap();
        assert_eq!(view.total(), 1);
        assert_eq!(view.visible()[0].title, "jira test");
    });
}

#[test]
fn test_edit_keeps_unset_fields() {
    with_test_store(|store| {
        let args = TaskArgs { status: Some(TaskStatus::InProgress), ..TaskArgs::default() };
        let task = cmd_task_save(store, Some(1), &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "jira test");
        assert_eq!(task.status, TaskStatus::InProgress);

        let tasks = Repository::<Task>::new(store).load_all().unwrap();
        assert_eq!(tasks.len(), 1);
    });
}

#[test]
fn test_edit_missing_id_fails_without_writing() {
    with_test_store(|store| {
        let before = Repository::<Role>::new(store).load_all().unwrap();
        let args = RoleArgs { name: Some("Auditor".into()), ..RoleArgs::default() };
        let err = cmd_role_save(store, Some(40), &args, SaveMode::SaveAndList, true).unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotFound { id: 40, .. })));

        let after = Repository::<Role>::new(store).load_all().unwrap();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().all(|r| r.name != "Auditor"));
    });
}

#[test]
fn test_validation_error_is_reported() {
    with_test_store(|store| {
        let args = UserArgs {
            username: Some("dana".into()),
            password: Some("a".into()),
            password_confirmation: Some("b".into()),
            ..UserArgs::default()
        };
        let err = cmd_user_save(store, None, &args, SaveMode::SaveAndList, true).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(Repository::<User>::new(store).load_all().unwrap().len(), 2);
    });
}

#[test]
fn test_delete() {
    with_test_store(|store| {
        assert!(cmd_delete::<User>(store, 2, true, true).unwrap());
        let users = Repository::<User>::new(store).load_all().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "admin");

        assert!(cmd_delete::<User>(store, 2, true, true).is_err());
    });
}

#[test]
fn test_department_commands() {
    with_test_store(|store| {
        let args = DepartmentArgs {
            name: Some("QA".into()),
            parent: Some("Development".into()),
            ..DepartmentArgs::default()
        };
        let qa = cmd_department_save(store, None, &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(qa.main_branch, "Development");

        let parent = cmd_department_parent(store, qa.id, true).unwrap();
        assert_eq!(parent.id, 4);
        assert!(cmd_department_parent(store, 1, true).is_err());

        let added = cmd_department_quick_add(store, "Finance", true).unwrap();
        assert_eq!(added.parent, "-");

        let filters = DepartmentFilters { parents: MultiSelect::of(["Development"]) };
        let view = department_list(store, &filters, &ListArgs::default()).unwrap();
        assert_eq!(view.total(), 3);
    });
}

#[test]
fn test_rename_with_references() {
    with_test_store(|store| {
        let team = TeamArgs {
            name: Some("Core".into()),
            department: Some("Development".into()),
            add_members: vec!["syedaalin".into()],
            ..TeamArgs::default()
        };
        cmd_team_save(store, None, &team, SaveMode::SaveAndList, true).unwrap();

        cmd_department_rename(store, "Development", "Engineering", true, true).unwrap();
        let depts = Repository::<Department>::new(store).load_all().unwrap();
        assert!(depts.iter().any(|d| d.name == "Engineering"));
        assert_eq!(depts.iter().filter(|d| d.parent == "Engineering").count(), 2);

        let users = Repository::<User>::new(store).load_all().unwrap();
        assert_eq!(users[1].department, "Engineering");
        let teams = Repository::<Team>::new(store).load_all().unwrap();
        assert_eq!(teams[0].department, "Engineering");

        cmd_department_rename(store, "Engineering", "Platform", false, true).unwrap();
        let users = Repository::<User>::new(store).load_all().unwrap();
        assert_eq!(users[1].department, "Engineering");

        let err = cmd_department_rename(store, "Development", "X", false, true).unwrap_err();
        assert!(matches!(err, AppError::MissingReference { .. }));
    });
}

#[test]
fn test_team_members() {
    with_test_store(|store| {
        let args = TeamArgs {
            name: Some("Ops".into()),
            add_matching: Some("(".into()),
            ..TeamArgs::default()
        };
        let team = cmd_team_save(store, None, &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(team.members, vec!["admin", "syedaalin"]);

        let args = TeamArgs { remove_members: vec!["admin".into()], ..TeamArgs::default() };
        let team = cmd_team_save(store, Some(team.id), &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(team.members, vec!["syedaalin"]);

        let args = TeamArgs { add_members: vec!["ghost".into()], ..TeamArgs::default() };
        assert!(cmd_team_save(store, Some(team.id), &args, SaveMode::SaveAndList, true).is_err());
    });
}

#[test]
fn test_contact_locations() {
    with_test_store(|store| {
        let args = ContactArgs {
            first_name: Some("Omar".into()),
            cnic: Some("3520212345671".into()),
            country: Some("pakistan".into()),
            state: Some("Sindh".into()),
            city: Some("Karachi".into()),
            ..ContactArgs::default()
        };
        let contact = cmd_contact_save(store, None, &args, SaveMode::SaveAndList, true).unwrap();
        assert_eq!(contact.id, 5);
        assert_eq!(contact.country, "Pakistan");
        assert_eq!(contact.cnic, "35202-1234567-1");

        let args = ContactArgs { city: Some("Lahore".into()), ..ContactArgs::default() };
        let err = cmd_contact_save(store, Some(5), &args, SaveMode::SaveAndList, true).unwrap_err();
        assert!(matches!(err, AppError::MissingReference { entity: "City", .. }));
    });
}

#[test]
fn test_user_filters() {
    with_test_store(|store| {
        let filters = UserFilters { roles: MultiSelect::of(["Admin"]), ..UserFilters::default() };
        let view = user_list(store, &filters, &ListArgs::default()).unwrap();
        assert_eq!(view.total(), 1);
        assert_eq!(view.visible()[0].username, "syedaalin");
    });
}

#[test]
fn test_session() {
    with_test_store(|store| {
        assert!(matches!(session::require_auth(store), Err(AppError::NotSignedIn)));
        assert!(cmd_login(store, "", "pw", true).is_err());

        cmd_login(store, "admin@example.com", "pw", true).unwrap();
        assert!(session::require_auth(store).is_ok());

        cmd_logout(store, true).unwrap();
        assert!(!session::is_authenticated(store).unwrap());
    });
}

#[test]
fn test_reset() {
    with_test_store(|store| {
        cmd_login(store, "a@b.c", "pw", true).unwrap();
        cmd_role_save(store, None, &RoleArgs { name: Some("Temp".into()), ..RoleArgs::default() }, SaveMode::SaveAndList, true).unwrap();

        assert!(cmd_reset(store, true, true).unwrap());
        assert!(!session::is_authenticated(store).unwrap());
        let roles = role_list(store, &ListArgs::default()).unwrap();
        assert_eq!(roles.total(), 4);
    });
}

#[test]
fn test_file_store_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).unwrap();
        cmd_department_quick_add(&store, "Legal", true).unwrap();
    }
    let store = FileStore::open(dir.path()).unwrap();
    let names: Vec<String> = Repository::<Department>::new(&store)
        .load_all()
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert!(names.contains(&"Legal".to_string()));
    assert!(dir.path().join("jira_departments.json").exists());
}

#[test]
fn test_config_env_override() {
    let _guard = TEST_MUTEX.lock().unwrap();
    env::set_var(DATA_DIR_ENV, "/tmp/ifinance_test_data");
    env::set_var(LOG_ENV, "debug");

    assert_eq!(default_data_dir(), PathBuf::from("/tmp/ifinance_test_data"));
    let config = Config::resolve(None, None);
    assert_eq!(config.log_level, "debug");

    let config = Config::resolve(Some(PathBuf::from("/elsewhere")), Some("info".into()));
    assert_eq!(config.data_dir, PathBuf::from("/elsewhere"));
    assert_eq!(config.log_level, "info");

    env::remove_var(DATA_DIR_ENV);
    env::remove_var(LOG_ENV);
}
