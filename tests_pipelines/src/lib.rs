//! # Shell Pipeline Tests
//!
//! End-to-end properties of the keystroke, focus and workspace pipeline.
//!
//! ## Test Philosophy
//!
//! - **Latest request wins**: Whatever was asked for last ends up focused
//! - **At most one transfer per request**: Superseded requests never land
//! - **Arbitrary interleavings**: Readiness arrives in any order

#![cfg(test)]

use core_types::{FocusTarget, PaneId, PaneKind};
use lifecycle::ReadySignal;
use proptest::prelude::*;
use services_focus_manager::Focusable;
use services_shortcuts::ShortcutDispatcher;
use services_workspace_manager::{
    CoordinatorConfig, InMemoryWorkspaceStore, Pane, PaneError, PaneLifecycleCoordinator,
    PaneRegistry, PaneStateBlob,
};
use std::cell::Cell;
use std::rc::Rc;

const PANES: [&str; 3] = ["Notes", "Tasks", "Mail"];

/// Pane with a single control that counts focus transfers
struct CountingPane {
    id: PaneId,
    ready: ReadySignal,
    focused: Rc<Cell<usize>>,
}

impl Focusable for CountingPane {
    fn focus_targets(&self) -> Vec<FocusTarget> {
        vec![FocusTarget::new("main")]
    }

    fn ready_signal(&self, _target: &FocusTarget) -> Option<ReadySignal> {
        Some(self.ready.clone())
    }

    fn focus(&mut self, _target: &FocusTarget) -> bool {
        self.focused.set(self.focused.get() + 1);
        self.ready.is_ready()
    }
}

impl Pane for CountingPane {
    fn pane_id(&self) -> &PaneId {
        &self.id
    }

    fn kind(&self) -> PaneKind {
        PaneKind::new("counting")
    }

    fn initialize(&mut self, _shortcuts: &mut ShortcutDispatcher) {}

    fn save_state(&self) -> PaneStateBlob {
        PaneStateBlob::new(self.id.clone(), self.kind())
    }

    fn restore_state(&mut self, state: &PaneStateBlob) -> Result<(), PaneError> {
        state.expect_kind(&self.kind())
    }

    fn pane_ready(&self) -> ReadySignal {
        self.ready.clone()
    }

    fn as_focusable(&mut self) -> &mut dyn Focusable {
        self
    }
}

#[derive(Debug, Clone)]
enum Step {
    Focus(usize),
    Ready(usize),
    Process,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..PANES.len()).prop_map(Step::Focus),
        (0..PANES.len()).prop_map(Step::Ready),
        Just(Step::Process),
    ]
}

struct Harness {
    coordinator: PaneLifecycleCoordinator,
    signals: Vec<ReadySignal>,
    focused: Rc<Cell<usize>>,
}

impl Harness {
    fn new() -> Self {
        let mut coordinator = PaneLifecycleCoordinator::new(
            CoordinatorConfig::default(),
            PaneRegistry::new(),
            InMemoryWorkspaceStore::new(),
        );
        let mut shortcuts = ShortcutDispatcher::new();
        let focused = Rc::new(Cell::new(0));
        let mut signals = Vec::new();

        for name in PANES {
            let ready = ReadySignal::new();
            signals.push(ready.clone());
            let counter = focused.clone();
            coordinator.open_pane(
                &PaneId::new(name),
                move |id| {
                    Box::new(CountingPane {
                        id: id.clone(),
                        ready,
                        focused: counter,
                    }) as Box<dyn Pane>
                },
                &mut shortcuts,
            );
        }

        Self {
            coordinator,
            signals,
            focused,
        }
    }
}

proptest! {
    #[test]
    fn test_latest_focus_request_wins(steps in prop::collection::vec(step(), 0..40)) {
        let mut harness = Harness::new();
        let mut requests = 0;
        let mut last = None;

        for step in &steps {
            match step {
                Step::Focus(i) => {
                    requests += 1;
                    last = Some(PaneId::new(PANES[*i]));
                    harness.coordinator.focus_pane(&PaneId::new(PANES[*i]));
                }
                Step::Ready(i) => {
                    harness.signals[*i].mark_ready();
                }
                Step::Process => {
                    harness.coordinator.process_ready();
                }
            }
        }

        for signal in &harness.signals {
            signal.mark_ready();
        }
        harness.coordinator.process_ready();

        prop_assert_eq!(harness.coordinator.active_pane(), last.as_ref());
        prop_assert!(harness.focused.get() <= requests);
        prop_assert_eq!(harness.coordinator.pending_focus_count(), 0);
    }

    #[test]
    fn test_repeated_requests_transfer_once(pane in 0..PANES.len(), repeats in 1usize..6) {
        let mut harness = Harness::new();
        let id = PaneId::new(PANES[pane]);

        for _ in 0..repeats {
            harness.coordinator.focus_pane(&id);
        }
        harness.signals[pane].mark_ready();
        harness.coordinator.process_ready();
        harness.coordinator.process_ready();

        prop_assert_eq!(harness.focused.get(), 1);
        prop_assert_eq!(harness.coordinator.active_pane(), Some(&id));
    }
}
