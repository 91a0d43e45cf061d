//! Keyboard to shell pipeline integration tests
//!
//! KeyEvent → typing guard → pane/global binding → shell command →
//! coordinator → focus history → pane control.

use core_types::{FocusTarget, PaneId, WorkspaceId};
use input_types::{ControlKind, KeyChord, KeyCode, KeyEvent, Modifiers};
use services_shortcuts::{DispatchOutcome, Scope, ShortcutDispatcher};
use services_workspace_manager::{InMemoryWorkspaceStore, WorkspaceEvent};
use shelld::{sim_registry, ShellSession, SimOptions, SimPane};
use std::cell::Cell;
use std::rc::Rc;
use tracing_test::traced_test;

fn session(start_ready: bool) -> ShellSession {
    ShellSession::with_clock(
        Default::default(),
        InMemoryWorkspaceStore::new(),
        lifecycle::ManualClock::new(),
        |inbox| sim_registry(inbox, SimOptions { start_ready }),
    )
}

fn notes() -> PaneId {
    PaneId::new("Notes")
}

fn saved(session: &ShellSession) -> bool {
    session
        .coordinator()
        .audit_trail()
        .iter()
        .any(|e| matches!(e, WorkspaceEvent::WorkspaceSaved { .. }))
}

fn focused_control(session: &ShellSession, pane: &PaneId) -> Option<FocusTarget> {
    session
        .coordinator()
        .focus_history()
        .last_focus(pane)
        .map(|record| record.target.clone())
}

fn transfers(session: &ShellSession) -> usize {
    session.coordinator().focus_history().transfer_count()
}

#[test]
fn test_text_box_keeps_bare_s_but_not_ctrl_s() {
    let mut session = session(true);
    session.open_pane("Notes", "notes").unwrap();
    assert_eq!(
        focused_control(&session, &notes()),
        Some(FocusTarget::new("editor"))
    );

    assert!(!session.key_press(KeyCode::S, Modifiers::NONE, ControlKind::TextInput));
    assert!(!saved(&session));
    // The pane's own bare S shortcut did not steal the key either
    assert_eq!(
        focused_control(&session, &notes()),
        Some(FocusTarget::new("editor"))
    );

    assert!(session.key_press(KeyCode::S, Modifiers::CTRL, ControlKind::TextInput));
    assert!(saved(&session));
}

#[test]
fn test_bare_s_outside_text_moves_to_search_box() {
    let mut session = session(true);
    session.open_pane("Notes", "notes").unwrap();

    assert!(session.key_press(KeyCode::S, Modifiers::NONE, ControlKind::List));
    assert_eq!(
        focused_control(&session, &notes()),
        Some(FocusTarget::new("searchBox"))
    );
}

#[test]
fn test_key_release_never_dispatches() {
    let mut dispatcher = ShortcutDispatcher::new();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    dispatcher.register_global(
        KeyChord::ctrl(KeyCode::S),
        move || {
            counter.set(counter.get() + 1);
            Ok(())
        },
        "Save",
    );

    let release = KeyEvent::released(KeyCode::S, Modifiers::CTRL);
    assert!(!dispatcher.handle_key_event(&release, ControlKind::None, None));
    let press = KeyEvent::pressed(KeyCode::S, Modifiers::CTRL);
    assert!(dispatcher.handle_key_event(&press, ControlKind::TextArea, None));
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_pane_binding_shadows_global_only_in_that_pane() {
    let mut dispatcher = ShortcutDispatcher::new();
    let find = KeyChord::ctrl(KeyCode::F);
    dispatcher.register_global(find, || Ok(()), "Find everywhere");
    dispatcher.register_for_pane(&notes(), find, || Ok(()), "Find in note");

    assert_eq!(
        dispatcher.dispatch(find, ControlKind::TextInput, Some(&notes())),
        DispatchOutcome::Pane(notes())
    );
    assert_eq!(
        dispatcher.dispatch(find, ControlKind::TextInput, Some(&PaneId::new("Tasks"))),
        DispatchOutcome::Global
    );
    assert_eq!(
        dispatcher.dispatch(find, ControlKind::None, None),
        DispatchOutcome::Global
    );
}

#[test]
fn test_closing_pane_drops_its_bindings() {
    let mut session = session(true);
    session.open_pane("Notes", "notes").unwrap();
    session.open_pane("Tasks", "tasks").unwrap();
    session.focus_pane(&notes());
    assert_eq!(session.shortcuts().pane_binding_count(&notes()), 1);

    assert!(session.key_press(KeyCode::W, Modifiers::CTRL, ControlKind::None));

    assert!(!session.coordinator().is_open(&notes()));
    assert_eq!(session.shortcuts().pane_binding_count(&notes()), 0);
    assert!(!session
        .shortcuts()
        .is_bound(&Scope::Pane(notes()), &KeyChord::bare(KeyCode::S)));
    assert!(!session.on_key_press(KeyCode::S, Modifiers::NONE, ControlKind::None, Some(&notes())));
    assert_eq!(
        session.coordinator().active_pane(),
        Some(&PaneId::new("Tasks"))
    );
}

#[test]
fn test_focus_waits_for_ready_and_transfers_once() {
    let mut session = session(false);
    session.open_pane("Notes", "notes").unwrap();
    session.focus_pane(&notes());
    session.focus_pane(&notes());
    assert_eq!(transfers(&session), 0);

    session.mark_ready(&notes());
    assert_eq!(transfers(&session), 1);
    assert_eq!(session.coordinator().active_pane(), Some(&notes()));

    // Nothing left to re-drive
    session.pump();
    assert_eq!(transfers(&session), 1);
}

#[test]
fn test_double_switch_restores_focus_once() {
    let mut session = session(false);
    session.open_pane("Notes", "notes").unwrap();
    session.mark_ready(&notes());
    let before = transfers(&session);

    session.switch_workspace(&WorkspaceId::new("side"));
    session.switch_workspace(&WorkspaceId::new("main"));
    session.switch_workspace(&WorkspaceId::new("main"));
    assert_eq!(transfers(&session), before);

    session.mark_ready(&notes());
    assert_eq!(transfers(&session), before + 1);
    assert_eq!(
        focused_control(&session, &notes()),
        Some(FocusTarget::new("editor"))
    );

    session.pump();
    assert_eq!(transfers(&session), before + 1);
}

#[test]
fn test_palette_query_ranks_switch_first() {
    let session = session(true);
    let matches = session.palette_matches("switch");
    assert_eq!(
        matches.first().map(|d| d.id.as_str()),
        Some("workspace.switch")
    );
    assert!(session.palette_matches("qqqq").is_empty());
}

#[test]
fn test_sim_pane_refuses_focus_until_ready() {
    use services_focus_manager::Focusable;

    let ready = lifecycle::ReadySignal::new();
    let mut pane = SimPane::notes(notes(), ready.clone(), shelld::CommandInbox::new());
    assert!(!pane.focus(&FocusTarget::new("editor")));
    ready.mark_ready();
    assert!(pane.focus(&FocusTarget::new("editor")));
}

#[test]
#[traced_test]
fn test_switch_is_logged() {
    let mut session = session(true);
    session.open_pane("Notes", "notes").unwrap();
    session.switch_workspace(&WorkspaceId::new("side"));
    assert!(logs_contain("switching workspace"));
}
