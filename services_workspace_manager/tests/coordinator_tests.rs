//! Coordinator tests against scripted panes

use core_types::{FocusTarget, PaneId, PaneKind, WorkspaceId};
use input_types::{ControlKind, KeyChord, KeyCode, Modifiers};
use lifecycle::{AbandonReason, ManualClock, ReadySignal, RequestState, Timeout};
use services_focus_manager::{FocusConfig, Focusable};
use services_shortcuts::ShortcutDispatcher;
use services_workspace_manager::{
    CoordinatorConfig, InMemoryWorkspaceStore, Pane, PaneError, PaneLifecycleCoordinator,
    PaneRegistry, PaneStateBlob, WorkspaceError, WorkspaceEvent, WorkspaceSnapshotData,
    WorkspaceStore,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tracing_test::traced_test;

const FIND: KeyChord = KeyChord::ctrl(KeyCode::F);

/// Shared observation point for every pane built in a test
#[derive(Clone, Default)]
struct World {
    log: Rc<RefCell<Vec<String>>>,
    signals: Rc<RefCell<HashMap<PaneId, ReadySignal>>>,
    build_ready: Rc<RefCell<bool>>,
}

impl World {
    fn new(build_ready: bool) -> Self {
        let world = Self::default();
        *world.build_ready.borrow_mut() = build_ready;
        world
    }

    fn build(&self, id: &PaneId) -> Box<dyn Pane> {
        let ready = if *self.build_ready.borrow() {
            ReadySignal::ready()
        } else {
            ReadySignal::new()
        };
        self.signals.borrow_mut().insert(id.clone(), ready.clone());
        Box::new(NotesPane {
            id: id.clone(),
            text: String::new(),
            ready,
            world: self.clone(),
        })
    }

    fn mark_ready(&self, pane: &str) {
        if let Some(signal) = self.signals.borrow().get(pane) {
            signal.mark_ready();
        }
    }

    fn entries(&self, prefix: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn focus_count(&self) -> usize {
        self.entries("focus ").len()
    }
}

struct NotesPane {
    id: PaneId,
    text: String,
    ready: ReadySignal,
    world: World,
}

impl Focusable for NotesPane {
    fn focus_targets(&self) -> Vec<FocusTarget> {
        vec![FocusTarget::new("editor"), FocusTarget::new("searchBox")]
    }

    fn ready_signal(&self, target: &FocusTarget) -> Option<ReadySignal> {
        self.focus_targets()
            .contains(target)
            .then(|| self.ready.clone())
    }

    fn focus(&mut self, target: &FocusTarget) -> bool {
        assert!(self.ready.is_ready(), "focused before ready");
        self.world
            .log
            .borrow_mut()
            .push(format!("focus {}/{}", self.id, target));
        true
    }
}

impl Pane for NotesPane {
    fn pane_id(&self) -> &PaneId {
        &self.id
    }

    fn kind(&self) -> PaneKind {
        PaneKind::new("notes")
    }

    fn initialize(&mut self, shortcuts: &mut ShortcutDispatcher) {
        let log = Rc::clone(&self.world.log);
        let id = self.id.clone();
        shortcuts.register_for_pane(
            &self.id,
            FIND,
            move || {
                log.borrow_mut().push(format!("find {id}"));
                Ok(())
            },
            "Find in note",
        );
    }

    fn dispose(&mut self) {
        self.world
            .log
            .borrow_mut()
            .push(format!("dispose {}", self.id));
    }

    fn save_state(&self) -> PaneStateBlob {
        PaneStateBlob::new(self.id.clone(), self.kind()).with("text", self.text.as_str())
    }

    fn restore_state(&mut self, state: &PaneStateBlob) -> Result<(), PaneError> {
        state.expect_kind(&self.kind())?;
        self.text = state.require_str("text")?.to_string();
        Ok(())
    }

    fn pane_ready(&self) -> ReadySignal {
        self.ready.clone()
    }

    fn as_focusable(&mut self) -> &mut dyn Focusable {
        self
    }
}

fn setup(build_ready: bool) -> (World, PaneLifecycleCoordinator, ShortcutDispatcher) {
    setup_with(build_ready, CoordinatorConfig::default(), ManualClock::new())
}

fn setup_with(
    build_ready: bool,
    config: CoordinatorConfig,
    clock: ManualClock,
) -> (World, PaneLifecycleCoordinator, ShortcutDispatcher) {
    let world = World::new(build_ready);
    let mut registry = PaneRegistry::new();
    let factory_world = world.clone();
    registry.register("notes", move |id| factory_world.build(id));
    let coordinator =
        PaneLifecycleCoordinator::with_clock(config, registry, InMemoryWorkspaceStore::new(), clock);
    (world, coordinator, ShortcutDispatcher::new())
}

/// Coordinator whose store already holds `snapshot`
fn with_saved(
    snapshot: WorkspaceSnapshotData,
) -> (World, PaneLifecycleCoordinator, ShortcutDispatcher) {
    let mut store = InMemoryWorkspaceStore::new();
    store
        .save(&snapshot.workspace.clone(), &snapshot)
        .unwrap();
    let world = World::new(true);
    let mut registry = PaneRegistry::new();
    let factory_world = world.clone();
    registry.register("notes", move |id| factory_world.build(id));
    let coordinator =
        PaneLifecycleCoordinator::new(CoordinatorConfig::default(), registry, store);
    (world, coordinator, ShortcutDispatcher::new())
}

fn open(
    coordinator: &mut PaneLifecycleCoordinator,
    shortcuts: &mut ShortcutDispatcher,
    pane: &str,
) -> bool {
    coordinator
        .open_pane_of_kind(&PaneId::new(pane), &PaneKind::new("notes"), shortcuts)
        .unwrap()
}

fn set_text(coordinator: &mut PaneLifecycleCoordinator, pane: &str, text: &str) {
    let blob = PaneStateBlob::new(PaneId::new(pane), PaneKind::new("notes")).with("text", text);
    coordinator
        .with_pane(&PaneId::new(pane), |p| p.restore_state(&blob))
        .unwrap()
        .unwrap();
}

fn text_of(coordinator: &PaneLifecycleCoordinator, pane: &str) -> String {
    coordinator
        .pane(&PaneId::new(pane))
        .unwrap()
        .save_state()
        .get_str("text")
        .unwrap()
        .to_string()
}

fn press_find(shortcuts: &mut ShortcutDispatcher, coordinator: &PaneLifecycleCoordinator) -> bool {
    shortcuts.handle_key_press(
        KeyCode::F,
        Modifiers::CTRL,
        ControlKind::None,
        coordinator.active_pane(),
    )
}

#[test]
fn test_open_pane_is_idempotent() {
    let (world, mut coordinator, mut shortcuts) = setup(true);

    assert!(open(&mut coordinator, &mut shortcuts, "Notes"));
    assert!(!open(&mut coordinator, &mut shortcuts, "Notes"));

    assert_eq!(coordinator.pane_count(), 1);
    assert_eq!(shortcuts.pane_binding_count(&PaneId::new("Notes")), 1);
    assert_eq!(world.signals.borrow().len(), 1);
}

#[test]
fn test_open_pane_with_closure_factory() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    let notes = PaneId::new("Notes");

    assert!(coordinator.open_pane(&notes, |id| world.build(id), &mut shortcuts));
    assert!(!coordinator.open_pane(&notes, |_| unreachable!(), &mut shortcuts));
    assert!(coordinator.is_open(&notes));
}

#[test]
fn test_focus_ready_pane_uses_default_target() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");

    assert!(coordinator.focus_pane(&PaneId::new("Notes")));
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("Notes")));
    assert_eq!(world.entries("focus "), vec!["focus Notes/editor"]);
}

#[test]
fn test_focus_waits_for_ready_pane() {
    let (world, mut coordinator, mut shortcuts) = setup(false);
    open(&mut coordinator, &mut shortcuts, "Notes");
    let notes = PaneId::new("Notes");

    assert!(!coordinator.focus_pane(&notes));
    assert!(coordinator.active_pane().is_none());
    assert_eq!(coordinator.requested_pane(), Some(&notes));
    assert!(coordinator.activation_state(&notes).is_pending());
    assert_eq!(world.focus_count(), 0);

    assert_eq!(coordinator.process_ready(), 0);

    world.mark_ready("Notes");
    assert!(coordinator.has_ready_work());
    assert_eq!(coordinator.process_ready(), 1);
    assert_eq!(world.focus_count(), 1);
    assert_eq!(coordinator.active_pane(), Some(&notes));

    assert_eq!(coordinator.process_ready(), 0);
    assert_eq!(world.focus_count(), 1);
}

#[test]
fn test_newer_focus_request_wins() {
    let (world, mut coordinator, mut shortcuts) = setup(false);
    open(&mut coordinator, &mut shortcuts, "Notes");
    open(&mut coordinator, &mut shortcuts, "Tasks");

    coordinator.focus_pane(&PaneId::new("Notes"));
    coordinator.focus_pane(&PaneId::new("Tasks"));
    assert!(matches!(
        coordinator.activation_state(&PaneId::new("Notes")),
        RequestState::Abandoned(_, AbandonReason::Cancelled)
    ));

    world.mark_ready("Notes");
    world.mark_ready("Tasks");
    coordinator.process_ready();

    assert_eq!(world.entries("focus "), vec!["focus Tasks/editor"]);
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("Tasks")));
}

#[test]
fn test_close_pane_removes_bindings_and_focuses_neighbour() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    open(&mut coordinator, &mut shortcuts, "Tasks");
    coordinator.focus_pane(&PaneId::new("Notes"));
    assert!(press_find(&mut shortcuts, &coordinator));

    coordinator
        .close_pane(&PaneId::new("Notes"), &mut shortcuts)
        .unwrap();

    assert_eq!(shortcuts.pane_binding_count(&PaneId::new("Notes")), 0);
    assert_eq!(world.entries("dispose "), vec!["dispose Notes"]);
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("Tasks")));
    assert!(coordinator
        .focus_history()
        .last_focus(&PaneId::new("Notes"))
        .is_none());

    assert_eq!(
        coordinator.close_pane(&PaneId::new("Notes"), &mut shortcuts),
        Err(WorkspaceError::PaneNotFound(PaneId::new("Notes")))
    );
}

#[test]
fn test_closed_pane_never_takes_deferred_focus() {
    let (world, mut coordinator, mut shortcuts) = setup(false);
    open(&mut coordinator, &mut shortcuts, "Notes");
    coordinator.focus_pane(&PaneId::new("Notes"));

    coordinator
        .close_pane(&PaneId::new("Notes"), &mut shortcuts)
        .unwrap();
    world.mark_ready("Notes");

    assert_eq!(coordinator.process_ready(), 0);
    assert_eq!(world.focus_count(), 0);
}

#[test]
fn test_focus_cycling_wraps() {
    let (_world, mut coordinator, mut shortcuts) = setup(true);
    for pane in ["A", "B", "C"] {
        open(&mut coordinator, &mut shortcuts, pane);
    }

    coordinator.focus_next().unwrap();
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("A")));
    coordinator.focus_previous().unwrap();
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("C")));
    coordinator.focus_next().unwrap();
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("A")));
    coordinator.focus_next().unwrap();
    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("B")));
}

#[test]
fn test_pane_binding_follows_active_pane() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    open(&mut coordinator, &mut shortcuts, "Tasks");

    coordinator.focus_pane(&PaneId::new("Tasks"));
    assert!(press_find(&mut shortcuts, &coordinator));
    assert_eq!(world.entries("find "), vec!["find Tasks"]);
}

#[test]
fn test_switch_workspace_round_trip() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    open(&mut coordinator, &mut shortcuts, "Tasks");
    set_text(&mut coordinator, "Notes", "groceries");
    coordinator.focus_pane(&PaneId::new("Notes"));
    coordinator.record_focus(&PaneId::new("Notes"), "searchBox");

    let side = WorkspaceId::new("side");
    let summary = coordinator.switch_workspace(&side, &mut shortcuts);
    assert!(summary.opened.is_empty());
    assert!(summary.focus.is_none());
    assert_eq!(coordinator.pane_count(), 0);
    assert_eq!(world.entries("dispose ").len(), 2);
    assert_eq!(shortcuts.binding_count(), 0);

    let summary = coordinator.switch_workspace(&WorkspaceId::new("main"), &mut shortcuts);
    assert_eq!(
        summary.opened,
        vec![PaneId::new("Notes"), PaneId::new("Tasks")]
    );
    assert_eq!(summary.focus, Some(PaneId::new("Notes")));
    assert_eq!(text_of(&coordinator, "Notes"), "groceries");
    assert_eq!(
        world.entries("focus ").last().map(String::as_str),
        Some("focus Notes/searchBox")
    );
    assert_eq!(shortcuts.pane_binding_count(&PaneId::new("Notes")), 1);
}

#[test]
fn test_switch_restores_focus_after_ready() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Board");
    coordinator.focus_pane(&PaneId::new("Board"));
    coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);

    *world.build_ready.borrow_mut() = false;
    let before = world.focus_count();
    let summary = coordinator.switch_workspace(&WorkspaceId::new("main"), &mut shortcuts);

    assert_eq!(summary.focus, Some(PaneId::new("Board")));
    assert_eq!(world.focus_count(), before);
    assert_eq!(coordinator.pending_focus_count(), 1);

    world.mark_ready("Board");
    assert_eq!(coordinator.process_ready(), 1);
    assert_eq!(world.focus_count(), before + 1);
}

#[test]
fn test_double_switch_to_same_workspace_focuses_once() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Board");
    coordinator.focus_pane(&PaneId::new("Board"));
    coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);

    *world.build_ready.borrow_mut() = false;
    let before = world.focus_count();
    let main = WorkspaceId::new("main");
    coordinator.switch_workspace(&main, &mut shortcuts);
    let again = coordinator.switch_workspace(&main, &mut shortcuts);

    assert!(again.opened.is_empty());
    assert_eq!(coordinator.pane_count(), 1);
    assert_eq!(coordinator.pending_focus_count(), 1);

    world.mark_ready("Board");
    coordinator.process_ready();
    coordinator.process_ready();
    assert_eq!(world.focus_count(), before + 1);
}

#[traced_test]
#[test]
fn test_unknown_kind_is_skipped() {
    let mut snapshot = WorkspaceSnapshotData::empty(WorkspaceId::new("side"));
    snapshot
        .panes
        .push(PaneStateBlob::new(PaneId::new("Sheet"), PaneKind::new("spreadsheet")));
    snapshot.panes.push(
        PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new("notes")).with("text", "kept"),
    );
    snapshot.active = Some(PaneId::new("Sheet"));
    let (_world, mut coordinator, mut shortcuts) = with_saved(snapshot);

    let summary = coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);

    assert_eq!(summary.skipped, vec![PaneId::new("Sheet")]);
    assert_eq!(summary.opened, vec![PaneId::new("Notes")]);
    assert_eq!(summary.focus, Some(PaneId::new("Notes")));
    assert_eq!(text_of(&coordinator, "Notes"), "kept");
    assert!(coordinator
        .audit_trail()
        .iter()
        .any(|event| matches!(event, WorkspaceEvent::PaneSkipped { .. })));
    assert!(logs_contain("unknown pane kind, skipping"));
    assert!(logs_contain("previously active pane is gone"));
}

#[traced_test]
#[test]
fn test_bad_pane_state_keeps_defaults() {
    let mut snapshot = WorkspaceSnapshotData::empty(WorkspaceId::new("side"));
    snapshot
        .panes
        .push(PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new("notes")));
    let (_world, mut coordinator, mut shortcuts) = with_saved(snapshot);

    let summary = coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);
    assert_eq!(summary.opened, vec![PaneId::new("Notes")]);
    assert_eq!(text_of(&coordinator, "Notes"), "");
    assert!(logs_contain("pane state not restored"));
}

#[traced_test]
#[test]
fn test_corrupt_store_entry_starts_empty() {
    let mut store = InMemoryWorkspaceStore::new();
    store.insert_raw("side", b"garbage".to_vec());
    let mut coordinator =
        PaneLifecycleCoordinator::new(CoordinatorConfig::default(), PaneRegistry::new(), store);
    let mut shortcuts = ShortcutDispatcher::new();

    let summary = coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);
    assert!(summary.opened.is_empty());
    assert_eq!(coordinator.current_workspace(), &WorkspaceId::new("side"));
    assert!(logs_contain("workspace state unreadable"));
}

#[test]
fn test_switch_saves_snapshot_with_focus() {
    let (_world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    coordinator.focus_pane(&PaneId::new("Notes"));
    coordinator.record_focus(&PaneId::new("Notes"), "searchBox");

    coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);

    let saved = coordinator
        .store()
        .load(&WorkspaceId::new("main"))
        .unwrap()
        .unwrap();
    assert_eq!(saved.active, Some(PaneId::new("Notes")));
    assert_eq!(
        saved.focus.get(&PaneId::new("Notes")),
        Some(&FocusTarget::new("searchBox"))
    );
    assert!(saved.pane(&PaneId::new("Notes")).is_some());
}

#[test]
fn test_switch_uses_saved_focus_for_pane_with_same_id() {
    let mut snapshot = WorkspaceSnapshotData::empty(WorkspaceId::new("side"));
    snapshot
        .panes
        .push(PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new("notes")).with("text", ""));
    snapshot
        .focus
        .insert(PaneId::new("Notes"), FocusTarget::new("editor"));
    snapshot.active = Some(PaneId::new("Notes"));
    let (world, mut coordinator, mut shortcuts) = with_saved(snapshot);
    open(&mut coordinator, &mut shortcuts, "Notes");
    coordinator.focus_pane(&PaneId::new("Notes"));
    coordinator.record_focus(&PaneId::new("Notes"), "searchBox");

    coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);

    assert_eq!(
        world.entries("focus ").last().map(String::as_str),
        Some("focus Notes/editor")
    );
    assert_eq!(
        coordinator
            .focus_history()
            .last_focus(&PaneId::new("Notes"))
            .map(|record| record.target.clone()),
        Some(FocusTarget::new("editor"))
    );
    // Nothing from the old workspace is left to go back to
    assert!(coordinator
        .focus_history()
        .history()
        .all(|entry| entry.target != FocusTarget::new("searchBox")));
}

#[test]
fn test_restore_current_at_startup() {
    let mut snapshot = WorkspaceSnapshotData::empty(WorkspaceId::new("main"));
    snapshot.panes.push(
        PaneStateBlob::new(PaneId::new("Notes"), PaneKind::new("notes")).with("text", "draft"),
    );
    snapshot
        .focus
        .insert(PaneId::new("Notes"), FocusTarget::new("searchBox"));
    let (world, mut coordinator, mut shortcuts) = with_saved(snapshot);

    let summary = coordinator.restore_current(&mut shortcuts);
    assert_eq!(summary.opened, vec![PaneId::new("Notes")]);
    assert_eq!(text_of(&coordinator, "Notes"), "draft");
    assert_eq!(world.entries("focus "), vec!["focus Notes/searchBox"]);
}

#[test]
fn test_checkpoint_undo_redo() {
    let (_world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");

    set_text(&mut coordinator, "Notes", "one");
    coordinator.checkpoint();
    set_text(&mut coordinator, "Notes", "two");

    assert!(coordinator.can_undo());
    assert!(coordinator.undo());
    assert_eq!(text_of(&coordinator, "Notes"), "one");
    assert!(coordinator.can_redo());

    assert!(coordinator.redo());
    assert_eq!(text_of(&coordinator, "Notes"), "two");
    assert!(!coordinator.redo());
}

#[test]
fn test_undo_history_is_per_workspace() {
    let (_world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    coordinator.checkpoint();
    assert_eq!(coordinator.undo_depth(), 1);

    coordinator.switch_workspace(&WorkspaceId::new("side"), &mut shortcuts);
    assert!(!coordinator.can_undo());

    coordinator.switch_workspace(&WorkspaceId::new("main"), &mut shortcuts);
    assert_eq!(coordinator.undo_depth(), 1);
}

#[test]
fn test_undo_capacity_is_respected() {
    let config = CoordinatorConfig {
        undo_capacity: 2,
        ..CoordinatorConfig::default()
    };
    let (_world, mut coordinator, mut shortcuts) = setup_with(true, config, ManualClock::new());
    open(&mut coordinator, &mut shortcuts, "Notes");

    for text in ["a", "b", "c"] {
        set_text(&mut coordinator, "Notes", text);
        coordinator.checkpoint();
    }
    assert_eq!(coordinator.undo_depth(), 2);

    assert!(coordinator.undo());
    assert_eq!(text_of(&coordinator, "Notes"), "c");
    assert!(coordinator.undo());
    assert_eq!(text_of(&coordinator, "Notes"), "b");
    assert!(!coordinator.undo());
}

#[test]
fn test_audit_trail_keeps_latest_events() {
    let config = CoordinatorConfig {
        audit_capacity: 3,
        ..CoordinatorConfig::default()
    };
    let (_world, mut coordinator, mut shortcuts) = setup_with(true, config, ManualClock::new());
    for pane in ["Notes", "Tasks", "Mail", "Board"] {
        open(&mut coordinator, &mut shortcuts, pane);
    }
    coordinator.save_current().unwrap();

    assert_eq!(coordinator.audit_trail().len(), 3);
    assert!(matches!(
        coordinator.audit_trail().back(),
        Some(WorkspaceEvent::WorkspaceSaved { .. })
    ));
    let notes = PaneId::new("Notes");
    assert!(!coordinator.audit_trail().iter().any(|event| matches!(
        event,
        WorkspaceEvent::PaneOpened { pane, .. } if *pane == notes
    )));
}

#[traced_test]
#[test]
fn test_pending_focus_times_out() {
    let clock = ManualClock::new();
    let config = CoordinatorConfig {
        focus: FocusConfig {
            ready_timeout: Some(Timeout::from_millis(500)),
            ..FocusConfig::default()
        },
        ..CoordinatorConfig::default()
    };
    let (world, mut coordinator, mut shortcuts) = setup_with(false, config, clock.clone());
    open(&mut coordinator, &mut shortcuts, "Notes");
    coordinator.focus_pane(&PaneId::new("Notes"));

    clock.advance(Duration::from_millis(499));
    assert!(coordinator.expire().is_empty());

    clock.advance(Duration::from_millis(1));
    assert_eq!(coordinator.expire(), vec![PaneId::new("Notes")]);
    assert!(logs_contain("element never became ready"));

    world.mark_ready("Notes");
    assert_eq!(coordinator.process_ready(), 0);
    assert_eq!(world.focus_count(), 0);
}

#[test]
fn test_navigate_back_between_panes() {
    let (world, mut coordinator, mut shortcuts) = setup(true);
    open(&mut coordinator, &mut shortcuts, "Notes");
    open(&mut coordinator, &mut shortcuts, "Tasks");

    coordinator.focus_pane(&PaneId::new("Notes"));
    coordinator.focus_pane(&PaneId::new("Tasks"));
    assert!(coordinator.navigate_back());

    assert_eq!(coordinator.active_pane(), Some(&PaneId::new("Notes")));
    assert_eq!(
        world.entries("focus ").last().map(String::as_str),
        Some("focus Notes/editor")
    );
}
