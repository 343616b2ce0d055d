use orgdir_core::{
    ConfirmationPrompt, DeleteOutcome, DirectoryConfig, DirectoryStore, EditorError,
    HierarchyEditor, StoreError, StoreResult, Unit, UnitDraft, UnitId, UnitRegistry, UserLevel,
    DELETE_CONFIRM_PROMPT,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreCall {
    Create(UnitDraft),
    Delete(UnitId),
}

/// Shared ledger for the mock store, so tests keep a handle after the
/// store moves into the editor.
struct StoreLog {
    calls: RefCell<Vec<StoreCall>>,
    next_id: Cell<UnitId>,
    fail: Cell<bool>,
}

impl StoreLog {
    fn new(next_id: UnitId) -> Rc<Self> {
        Rc::new(Self {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(next_id),
            fail: Cell::new(false),
        })
    }

    fn fail_next(&self) {
        self.fail.set(true);
    }

    fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }
}

/// Recording store with scripted outcomes, standing in for the external
/// persistence collaborator.
struct MockStore {
    log: Rc<StoreLog>,
}

impl DirectoryStore for MockStore {
    fn persist_create(&self, draft: &UnitDraft) -> StoreResult<UnitId> {
        self.log
            .calls
            .borrow_mut()
            .push(StoreCall::Create(draft.clone()));
        if self.log.fail.take() {
            return Err(StoreError::Backend("simulated storage outage".to_string()));
        }
        let id = self.log.next_id.get();
        self.log.next_id.set(id + 1);
        Ok(id)
    }

    fn persist_delete(&self, id: UnitId) -> StoreResult<()> {
        self.log.calls.borrow_mut().push(StoreCall::Delete(id));
        if self.log.fail.take() {
            return Err(StoreError::Backend("simulated storage outage".to_string()));
        }
        Ok(())
    }

    fn load_snapshot(&self) -> StoreResult<Vec<Unit>> {
        Ok(Vec::new())
    }
}

struct PromptLog {
    accept: bool,
    asked: RefCell<Vec<String>>,
}

impl PromptLog {
    fn accepting() -> Rc<Self> {
        Rc::new(Self {
            accept: true,
            asked: RefCell::new(Vec::new()),
        })
    }

    fn declining() -> Rc<Self> {
        Rc::new(Self {
            accept: false,
            asked: RefCell::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

struct ScriptedPrompt {
    log: Rc<PromptLog>,
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        self.log.asked.borrow_mut().push(prompt.to_string());
        self.log.accept
    }
}

fn acme_registry() -> UnitRegistry {
    UnitRegistry::from_units(vec![
        Unit {
            id: 1,
            name: "Acme".to_string(),
            parent_id: None,
            subunit_ids: vec![2],
        },
        Unit {
            id: 2,
            name: "Acme West".to_string(),
            parent_id: Some(1),
            subunit_ids: vec![],
        },
    ])
    .expect("valid snapshot")
}

fn editor_with(
    store_log: &Rc<StoreLog>,
    prompt_log: &Rc<PromptLog>,
) -> HierarchyEditor<MockStore, ScriptedPrompt> {
    HierarchyEditor::new(
        MockStore {
            log: Rc::clone(store_log),
        },
        ScriptedPrompt {
            log: Rc::clone(prompt_log),
        },
        DirectoryConfig::new("https://directory.example"),
    )
}

/// Committed-state consistency: every unit with a parent appears in that
/// parent's subunit listing, and every listing resolves.
fn assert_consistent(registry: &UnitRegistry) {
    for unit in registry.units() {
        if let Some(parent_id) = unit.parent_id {
            let parent = registry.get(parent_id).expect("parent must be committed");
            assert!(
                parent.subunit_ids.contains(&unit.id),
                "unit {} missing from parent {} listing",
                unit.id,
                parent_id
            );
        }
        registry.children_of(unit).expect("children must resolve");
    }
}

#[test]
fn create_below_threshold_never_reaches_store_or_registry() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();
    let before = registry.clone();

    for level in [UserLevel::Visitor, UserLevel::Member] {
        let err = editor
            .create_subunit(&mut registry, 1, "Acme East", level)
            .expect_err("sub-threshold create must fail");
        assert!(matches!(err, EditorError::PermissionDenied { .. }));
    }

    assert!(store.calls().is_empty());
    assert_eq!(registry, before);
}

#[test]
fn create_with_blank_name_fails_for_any_level() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();
    let before = registry.clone();

    for level in [UserLevel::Editor, UserLevel::Admin] {
        let err = editor
            .create_subunit(&mut registry, 1, "   ", level)
            .expect_err("blank name must fail");
        assert!(matches!(err, EditorError::InvalidInput(_)));
    }

    assert!(store.calls().is_empty());
    assert_eq!(registry, before);
}

#[test]
fn create_commits_only_after_store_assigns_id() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    let unit = editor
        .create_subunit(&mut registry, 1, "Acme East", UserLevel::Editor)
        .expect("create should succeed");

    assert_eq!(unit.id, 3);
    assert_eq!(unit.name, "Acme East");
    assert_eq!(unit.parent_id, Some(1));
    assert!(unit.subunit_ids.is_empty());

    let draft = UnitDraft::new("Acme East", 1).expect("draft");
    assert_eq!(store.calls(), vec![StoreCall::Create(draft)]);

    assert_eq!(registry.get(1).expect("unit 1").subunit_ids, vec![2, 3]);
    assert_eq!(registry.get(3).expect("unit 3").name, "Acme East");
    assert_consistent(&registry);
}

#[test]
fn create_trims_proposed_name_before_commit() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    let unit = editor
        .create_subunit(&mut registry, 1, "  Acme East  ", UserLevel::Editor)
        .expect("trimmed create should succeed");
    assert_eq!(unit.name, "Acme East");
}

#[test]
fn create_with_unknown_parent_fails_before_store_call() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    let err = editor
        .create_subunit(&mut registry, 99, "Ghost", UserLevel::Editor)
        .expect_err("unknown parent must fail");
    assert!(matches!(err, EditorError::NotFound(99)));
    assert!(store.calls().is_empty());
}

#[test]
fn create_leaves_registry_unchanged_when_store_fails() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    store.fail_next();
    let mut registry = acme_registry();
    let before = registry.clone();

    let err = editor
        .create_subunit(&mut registry, 1, "Acme East", UserLevel::Editor)
        .expect_err("store failure must surface");
    assert!(matches!(err, EditorError::Store(StoreError::Backend(_))));
    assert_eq!(registry, before);
}

#[test]
fn delete_below_threshold_shows_no_prompt() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();
    let before = registry.clone();

    let err = editor
        .delete_subunit(&mut registry, 2, UserLevel::Member)
        .expect_err("sub-threshold delete must fail");
    assert!(matches!(err, EditorError::PermissionDenied { .. }));

    assert!(prompt.prompts().is_empty());
    assert!(store.calls().is_empty());
    assert_eq!(registry, before);
}

#[test]
fn declined_confirmation_is_a_noop_not_an_error() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::declining();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();
    let before = registry.clone();

    let outcome = editor
        .delete_subunit(&mut registry, 2, UserLevel::Editor)
        .expect("declining is not a failure");
    assert_eq!(outcome, DeleteOutcome::Declined);

    assert_eq!(prompt.prompts(), vec![DELETE_CONFIRM_PROMPT.to_string()]);
    assert!(store.calls().is_empty());
    assert_eq!(registry, before);
}

#[test]
fn confirmed_delete_removes_unit_and_unlinks_parent() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    let outcome = editor
        .delete_subunit(&mut registry, 2, UserLevel::Editor)
        .expect("delete should succeed");
    match outcome {
        DeleteOutcome::Deleted(unit) => assert_eq!(unit.name, "Acme West"),
        DeleteOutcome::Declined => panic!("accepted prompt must not decline"),
    }

    assert_eq!(store.calls(), vec![StoreCall::Delete(2)]);
    assert!(!registry.contains(2));
    assert!(registry.get(1).expect("unit 1").subunit_ids.is_empty());
    assert_consistent(&registry);
}

#[test]
fn delete_of_unknown_unit_fails_without_store_call() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    let err = editor
        .delete_subunit(&mut registry, 999, UserLevel::Editor)
        .expect_err("unknown unit must fail");
    assert!(matches!(err, EditorError::NotFound(999)));
    assert!(store.calls().is_empty());
}

#[test]
fn unit_stays_committed_when_store_delete_fails() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    store.fail_next();
    let mut registry = acme_registry();
    let before = registry.clone();

    let err = editor
        .delete_subunit(&mut registry, 2, UserLevel::Editor)
        .expect_err("store failure must surface");
    assert!(matches!(err, EditorError::Store(StoreError::Backend(_))));
    assert_eq!(registry, before);
    assert_consistent(&registry);
}

#[test]
fn admin_level_passes_the_editor_gate() {
    let store = StoreLog::new(3);
    let prompt = PromptLog::accepting();
    let editor = editor_with(&store, &prompt);
    let mut registry = acme_registry();

    editor
        .create_subunit(&mut registry, 1, "Acme North", UserLevel::Admin)
        .expect("admin create should succeed");
    assert_eq!(registry.len(), 3);
}
