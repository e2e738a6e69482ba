use ifinance::error::StoreError;
use ifinance::models::{Department, Entity, Role, Task, User};
use ifinance::repository::{next_id, Repository};
use ifinance::storage::{FileStore, KeyValueStore, MemoryStore};

fn role(id: u64, name: &str) -> Role {
    Role { id, name: name.into(), ..Role::default() }
}

#[test]
fn test_next_id_is_max_plus_one() {
    assert_eq!(next_id::<Role>(&[]), 1);
    assert_eq!(next_id(&[role(1, "a"), role(7, "b"), role(3, "c")]), 8);
}

#[test]
fn test_first_load_seeds_collection() {
    let store = MemoryStore::new();
    let repo = Repository::<Department>::new(&store);
    assert!(!repo.is_initialized().unwrap());

    let loaded = repo.load().unwrap();
    assert!(!loaded.recovered);
    assert_eq!(loaded.records.len(), 4);
    assert!(repo.is_initialized().unwrap());
    assert!(store.get(Department::KEY).unwrap().is_some());
}

#[test]
fn test_injected_seed_is_used() {
    let store = MemoryStore::new();
    let repo = Repository::with_seed(&store, vec![role(5, "Auditor")]);
    let roles = repo.load_all().unwrap();
    assert_eq!(roles, vec![role(5, "Auditor")]);
    assert_eq!(repo.next_id().unwrap(), 6);
}

#[test]
fn test_create_assigns_fresh_id() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);
    let created = repo.upsert(role(0, "Auditor"), false).unwrap();
    assert_eq!(created.id, 5);
    assert_eq!(repo.load_all().unwrap().len(), 5);
}

#[test]
fn test_repeated_edits_keep_one_row() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);
    let before = repo.load_all().unwrap().len();

    repo.upsert(role(2, "Lead"), true).unwrap();
    repo.upsert(role(2, "Principal"), true).unwrap();

    let roles = repo.load_all().unwrap();
    assert_eq!(roles.len(), before);
    let matching: Vec<&Role> = roles.iter().filter(|r| r.id == 2).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].name, "Principal");
}

#[test]
fn test_edit_of_missing_id_fails() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);
    let err = repo.upsert(role(99, "Ghost"), true).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 99, .. }));
    assert_eq!(repo.load_all().unwrap().len(), 4);
}

#[test]
fn test_deleted_id_is_never_reused() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);

    assert!(repo.remove(4).unwrap());
    assert!(repo.get(4).unwrap().is_none());
    assert!(!repo.remove(4).unwrap());

    let created = repo.upsert(role(0, "Auditor"), false).unwrap();
    assert_eq!(created.id, 5);
}

#[test]
fn test_ids_survive_emptying_and_reseeding() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);
    let extra = repo.upsert(role(0, "Temp"), false).unwrap();
    assert_eq!(extra.id, 5);

    for r in repo.load_all().unwrap() {
        repo.remove(r.id).unwrap();
    }
    assert!(repo.load_all().unwrap().is_empty());

    repo.discard().unwrap();
    assert_eq!(repo.load_all().unwrap().len(), 4);
    let next = repo.upsert(role(0, "After"), false).unwrap();
    assert_eq!(next.id, 6);
}

#[test]
fn test_mutate_writes_nothing_on_error() {
    let store = MemoryStore::new();
    let repo = Repository::<User>::new(&store);
    repo.load_all().unwrap();
    let before = store.get(User::KEY).unwrap();

    let res: Result<(), StoreError> = repo.mutate(|users| {
        users.clear();
        Err(StoreError::NotFound { entity: "User", id: 1 })
    });
    assert!(res.is_err());
    assert_eq!(store.get(User::KEY).unwrap(), before);
}

#[test]
fn test_corrupt_collection_recovers_to_seed() {
    let store = MemoryStore::new();
    store.set(Task::KEY, "{not json").unwrap();

    let repo = Repository::<Task>::new(&store);
    let loaded = repo.load().unwrap();
    assert!(loaded.recovered);
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.records[0].title, "jira test");

    let saved = store.get(&format!("{}.corrupt", Task::KEY)).unwrap();
    assert_eq!(saved.as_deref(), Some("{not json"));
    assert!(!repo.load().unwrap().recovered);
}

#[test]
fn test_repeated_corruption_keeps_every_backup() {
    let store = MemoryStore::new();
    let repo = Repository::<Task>::new(&store);

    store.set(Task::KEY, "first bad").unwrap();
    assert!(repo.load().unwrap().recovered);
    store.set(Task::KEY, "second bad").unwrap();
    assert!(repo.load().unwrap().recovered);

    let first = store.get(&format!("{}.corrupt", Task::KEY)).unwrap();
    let second = store.get(&format!("{}.corrupt.1", Task::KEY)).unwrap();
    assert_eq!(first.as_deref(), Some("first bad"));
    assert_eq!(second.as_deref(), Some("second bad"));
}

#[test]
fn test_malformed_sequence_is_rebuilt_from_records() {
    let store = MemoryStore::new();
    let repo = Repository::<Role>::new(&store);
    repo.load_all().unwrap();
    let seq_key = format!("{}_seq", Role::KEY);
    store.set(&seq_key, "garbage").unwrap();

    assert_eq!(repo.next_id().unwrap(), 5);
    assert_eq!(store.get(&seq_key).unwrap().as_deref(), Some("4"));

    let created = repo.upsert(role(0, "Auditor"), false).unwrap();
    assert_eq!(created.id, 5);
    repo.remove(5).unwrap();
    assert_eq!(repo.next_id().unwrap(), 6);
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("data")).unwrap();

    assert_eq!(store.get("missing").unwrap(), None);
    store.set("greeting", "\"hello\"").unwrap();
    assert!(dir.path().join("data").join("greeting.json").exists());
    assert_eq!(store.get("greeting").unwrap().as_deref(), Some("\"hello\""));

    store.remove("greeting").unwrap();
    assert_eq!(store.get("greeting").unwrap(), None);
}

#[test]
fn test_file_store_clear_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let repo = Repository::<Role>::new(&store);
    repo.upsert(role(0, "Auditor"), false).unwrap();

    store.clear().unwrap();
    assert_eq!(store.get(Role::KEY).unwrap(), None);
    assert_eq!(repo.load_all().unwrap().len(), 4);
    assert_eq!(repo.next_id().unwrap(), 5);
}
