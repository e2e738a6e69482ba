use std::path::Path;

use ifinance::error::{AppError, ValidationError};
use ifinance::forms::contact::format_cnic;
use ifinance::forms::task::{parse_deadline, DEFAULT_ASSIGNED_BY};
use ifinance::forms::{
    ContactForm, DepartmentForm, FormController, FormMode, FormPhase, RoleForm, SaveMode, SaveOutcome,
    SubmissionForm, TaskForm, TeamForm, UserForm,
};
use ifinance::models::{Department, Entity, Priority, Role, Task, TaskStatus, TaskSubmission, Team, User};
use ifinance::repository::Repository;
use ifinance::storage::{KeyValueStore, MemoryStore};

#[test]
fn test_open_create_form_has_defaults() {
    let store = MemoryStore::new();
    let form = FormController::<TaskForm>::open(&store, None).unwrap();
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.phase(), FormPhase::Populated);
    assert_eq!(form.fields().priority, Priority::Medium);
    assert_eq!(form.fields().status, TaskStatus::Pending);
    assert_eq!(form.fields().assigned_by, DEFAULT_ASSIGNED_BY);
    assert!(!form.fields().created_at.is_empty());
}

#[test]
fn test_open_edit_form_prefills() {
    let store = MemoryStore::new();
    let form = FormController::<TaskForm>::open(&store, Some(1)).unwrap();
    assert_eq!(form.mode(), FormMode::Edit(1));
    assert_eq!(form.fields().title, "jira test");
    assert_eq!(form.fields().deadline, "2026-01-20");
}

#[test]
fn test_missing_edit_target_falls_back_to_create() {
    let store = MemoryStore::new();
    let mut form = FormController::<RoleForm>::open(&store, Some(77)).unwrap();
    assert_eq!(form.mode(), FormMode::Create);
    let notice = form.take_notice().unwrap();
    assert!(notice.contains("77"));
    assert_eq!(form.take_notice(), None);
}

#[test]
fn test_save_and_add_another_resets_fields() {
    let store = MemoryStore::new();
    let mut form = FormController::<TaskForm>::open(&store, None).unwrap();
    form.fields_mut().title = "A".into();
    form.fields_mut().priority = Priority::High;

    let outcome = form.submit(SaveMode::SaveAndAddAnother).unwrap();
    assert_eq!(outcome, SaveOutcome::AddAnother);
    assert_eq!(form.fields().title, "");
    assert_eq!(form.fields().priority, Priority::Medium);
    assert_eq!(form.mode(), FormMode::Create);

    let tasks = Repository::<Task>::new(&store).load_all().unwrap();
    let saved = tasks.iter().find(|t| t.title == "A").unwrap();
    assert_eq!(saved.id, 2);
    assert!(!saved.updated_at.is_empty());
}

#[test]
fn test_save_and_continue_switches_to_edit() {
    let store = MemoryStore::new();
    let mut form = FormController::<RoleForm>::open(&store, None).unwrap();
    form.fields_mut().name = "Auditor".into();

    let outcome = form.submit(SaveMode::SaveAndContinue).unwrap();
    assert_eq!(outcome, SaveOutcome::ContinueEditing(5));
    assert_eq!(form.mode(), FormMode::Edit(5));

    form.fields_mut().description = "Reads the books".into();
    assert_eq!(form.submit(SaveMode::SaveAndList).unwrap(), SaveOutcome::ShowList);

    let roles = Repository::<Role>::new(&store).load_all().unwrap();
    assert_eq!(roles.len(), 5);
    assert_eq!(roles[4].description, "Reads the books");
}

#[test]
fn test_required_fields_block_saving() {
    let store = MemoryStore::new();
    let mut form = FormController::<TaskForm>::open(&store, None).unwrap();
    form.fields_mut().description = "no title".into();

    let err = form.submit(SaveMode::SaveAndList).unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::Required { field: "title" })));
    assert_eq!(form.fields().description, "no title");
    assert_eq!(Repository::<Task>::new(&store).load_all().unwrap().len(), 1);
}

#[test]
fn test_password_mismatch_blocks_saving() {
    let store = MemoryStore::new();
    let mut form = FormController::<UserForm>::open(&store, None).unwrap();
    form.fields_mut().username = "dana".into();
    form.fields_mut().password = "secret".into();
    form.fields_mut().password_confirmation = "secrte".into();

    let err = form.submit(SaveMode::SaveAndList).unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match!");
    assert_eq!(Repository::<User>::new(&store).load_all().unwrap().len(), 2);

    form.fields_mut().password_confirmation = "secret".into();
    form.submit(SaveMode::SaveAndList).unwrap();
    let users = Repository::<User>::new(&store).load_all().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[2].username, "dana");
    assert_eq!(users[2].role, "-");
    assert!(users[2].staff_status);

    let raw = store.get(User::KEY).unwrap().unwrap();
    assert!(!raw.contains("secret"));
}

#[test]
fn test_department_name_edit_cascades() {
    let store = MemoryStore::new();
    let mut form = FormController::<DepartmentForm>::open(&store, Some(4)).unwrap();
    assert_eq!(form.fields().parent, "");
    form.fields_mut().name = "Engineering".into();
    form.submit(SaveMode::SaveAndList).unwrap();

    let all = Repository::<Department>::new(&store).load_all().unwrap();
    assert_eq!(all.len(), 4);
    let eng = all.iter().find(|d| d.id == 4).unwrap();
    assert_eq!(eng.name, "Engineering");
    assert_eq!(eng.parent, "-");
    assert_eq!(eng.main_branch, "Engineering");
    let backend = all.iter().find(|d| d.id == 2).unwrap();
    assert_eq!(backend.parent, "Engineering");
}

#[test]
fn test_department_form_parent_actions() {
    let store = MemoryStore::new();
    let mut form = FormController::<DepartmentForm>::open(&store, None).unwrap();
    form.fields_mut().name = "QA".into();

    form.quick_add_parent("Quality").unwrap();
    assert_eq!(form.fields().parent, "Quality");
    assert!(form.lookups().parents.contains(&"Quality".to_string()));
    assert_eq!(form.view_parent().unwrap().name, "Quality");

    form.rename_parent("Assurance").unwrap();
    assert_eq!(form.fields().parent, "Assurance");

    form.submit(SaveMode::SaveAndList).unwrap();
    let qa = Repository::<Department>::new(&store).find_by_name("QA").unwrap();
    assert_eq!(qa.parent, "Assurance");
    assert_eq!(qa.main_branch, "Assurance");

    form.clear_parent();
    assert_eq!(form.fields().parent, "");
    assert!(form.view_parent().is_err());
}

#[test]
fn test_new_department_duplicate_name_rejected() {
    let store = MemoryStore::new();
    let mut form = FormController::<DepartmentForm>::open(&store, None).unwrap();
    form.fields_mut().name = "frontend".into();
    let err = form.submit(SaveMode::SaveAndList).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_team_member_picker() {
    let store = MemoryStore::new();
    let mut form = FormController::<TeamForm>::open(&store, None).unwrap();
    let users = form.lookups().users.clone();
    assert_eq!(users[0].label, "admin (No Role)");
    assert_eq!(users[1].label, "syedaalin (Admin)");

    let fields = form.fields_mut();
    fields.name = "Core".into();
    fields.toggle_available("admin");
    fields.move_right();
    assert_eq!(fields.members, vec!["admin"]);
    assert_eq!(fields.available(&users).len(), 1);

    fields.available_search = "SYED".into();
    form.move_all_right();
    assert_eq!(form.fields().members, vec!["admin", "syedaalin"]);

    let fields = form.fields_mut();
    fields.chosen_search = "no role".into();
    assert_eq!(fields.chosen(&users).len(), 1);
    fields.toggle_chosen("admin");
    fields.move_left();
    assert_eq!(fields.members, vec!["syedaalin"]);

    form.submit(SaveMode::SaveAndList).unwrap();
    let teams = Repository::<Team>::new(&store).load_all().unwrap();
    assert_eq!(teams[0].members, vec!["syedaalin"]);

    form.fields_mut().remove_all();
    assert!(form.fields().members.is_empty());
}

#[test]
fn test_task_deadline_parsing() {
    assert_eq!(parse_deadline("").unwrap(), None);
    assert!(parse_deadline("today").unwrap().is_some());
    assert!(matches!(parse_deadline("20/01/2026"), Err(ValidationError::InvalidDate { .. })));

    let store = MemoryStore::new();
    let mut form = FormController::<TaskForm>::open(&store, Some(1)).unwrap();
    form.fields_mut().deadline = "tomorrow".into();
    assert!(form.submit(SaveMode::SaveAndList).is_err());

    form.fields_mut().set_deadline_today();
    form.submit(SaveMode::SaveAndList).unwrap();
    let task = Repository::<Task>::new(&store).get(1).unwrap().unwrap();
    assert!(task.deadline.is_some());
}

#[test]
fn test_submission_records_file_name_only() {
    let store = MemoryStore::new();
    let mut form = FormController::<SubmissionForm>::open(&store, None).unwrap();
    assert_eq!(form.lookups().tasks, vec!["jira test"]);
    assert_eq!(form.fields().submitted_by, "syedaalin (Admin)");

    form.fields_mut().task = "jira test".into();
    form.fields_mut().attach(Path::new("/tmp/reports/summary.pdf"));
    form.submit(SaveMode::SaveAndList).unwrap();

    let subs = Repository::<TaskSubmission>::new(&store).load_all().unwrap();
    assert_eq!(subs[1].submission_file.as_deref(), Some("summary.pdf"));
    assert_eq!(subs[1].id, 2);
}

#[test]
fn test_cnic_formatting() {
    assert_eq!(format_cnic("12345"), "12345");
    assert_eq!(format_cnic("123456"), "12345-6");
    assert_eq!(format_cnic("35202-1234567-1"), "35202-1234567-1");
    assert_eq!(format_cnic("3520212345671999"), "35202-1234567-1");
    assert_eq!(format_cnic("ab12c"), "12");
}

#[test]
fn test_contact_location_cascade() {
    let mut form = ContactForm::default();
    form.set_country(Some(1));
    assert_eq!(form.country(), "Pakistan");
    assert_eq!(form.states().len(), 2);

    form.set_state(Some(101));
    form.set_city(Some(1001));
    assert_eq!(form.city(), "Lahore");

    form.set_country(Some(2));
    assert_eq!(form.state(), "");
    assert_eq!(form.city(), "");
    assert!(form.cities().is_empty());

    form.set_state(Some(101));
    assert_eq!(form.state(), "");
}

#[test]
fn test_contact_edit_keeps_unlisted_city() {
    let store = MemoryStore::new();
    let mut form = FormController::<ContactForm>::open(&store, Some(4)).unwrap();
    assert_eq!(form.fields().city(), "Islamabad");
    form.fields_mut().set_cnic("3520212345671");
    form.submit(SaveMode::SaveAndList).unwrap();

    let contact = Repository::<ifinance::models::Contact>::new(&store).get(4).unwrap().unwrap();
    assert_eq!(contact.city, "Islamabad");
    assert_eq!(contact.cnic, "35202-1234567-1");
    assert_eq!(ifinance::models::Contact::LABEL, "Contact");
}
