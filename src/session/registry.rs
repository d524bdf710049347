//! Session table and event routing.
//!
//! Sessions register under an opaque id together with capability tags; the
//! host's event adapter and tick source address them through this table.
//! Routing never inspects a session's concrete type - a tag set stored at
//! registration time decides which sessions receive ticks and text input.
//!
//! Each entry wraps its session in a `Mutex`: host platforms may deliver
//! clicks and ticks on different threads, and the animation and search
//! state are written from both paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bitflags::bitflags;
use tracing::{debug, error};

use crate::error::{UiError, UiResult};
use crate::host::{ClickClassification, OverlayPort};
use crate::interaction::{CancelHandle, ClickKind, Interaction, RawAction};
use crate::session::GridUi;
use crate::types::SessionId;

bitflags! {
    /// What a session wants routed to it, declared at registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilityTags: u8 {
        /// Receives the periodic tick (animation, debounce).
        const TICKABLE = 1 << 0;
        /// Receives the host's text-input channel.
        const TEXT_INPUT = 1 << 1;
    }
}

/// A raw click as the host event adapter reports it, before recovery of the
/// obscured action classification.
#[derive(Debug, Clone)]
pub struct ClickReport {
    pub cell: usize,
    pub in_top_grid: bool,
    pub click: ClickKind,
    pub action: RawAction,
    pub cancel: CancelHandle,
}

struct SessionEntry {
    tags: CapabilityTags,
    ui: Arc<Mutex<dyn GridUi>>,
}

/// Mutable table of live sessions keyed by opaque id.
pub struct SessionRegistry<H: OverlayPort> {
    host: H,
    sessions: HashMap<SessionId, SessionEntry>,
    next_id: u64,
}

fn lock_session<'a>(ui: &'a Mutex<dyn GridUi + 'static>) -> MutexGuard<'a, dyn GridUi + 'static> {
    ui.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<H: OverlayPort> SessionRegistry<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            sessions: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a session under a fresh id. The caller keeps its own typed
    /// handle to the same session; the registry only needs the routing
    /// surface.
    pub fn register<S: GridUi + 'static>(
        &mut self,
        ui: Arc<Mutex<S>>,
        tags: CapabilityTags,
    ) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        let ui: Arc<Mutex<dyn GridUi>> = ui;
        self.sessions.insert(id, SessionEntry { tags, ui });
        id
    }

    /// Remove a session explicitly. Removing twice indicates a lifecycle
    /// bug and is logged the way double registration is.
    pub fn unregister(&mut self, id: SessionId) {
        if self.sessions.remove(&id).is_none() {
            error!(%id, "a session tried to unregister twice");
        }
    }

    pub fn is_registered(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Show a registered session to its viewer.
    pub fn open(&self, id: SessionId) -> UiResult<()> {
        let entry = self.sessions.get(&id).ok_or(UiError::UnknownSession(id))?;
        lock_session(&entry.ui).show();
        Ok(())
    }

    /// Route one click. Unknown ids are normal (not every host grid is a
    /// session) and ignored quietly.
    pub fn route_click(&self, id: SessionId, report: ClickReport) {
        let Some(entry) = self.sessions.get(&id) else {
            debug!(%id, "click for unknown session dropped");
            return;
        };

        let mut ui = lock_session(&entry.ui);

        // The host obscures the action for overridden cells; the overlay
        // protocol remembers what the client actually asked for.
        let action = match self.host.last_click_classification(ui.viewer()) {
            Some(ClickClassification::QuickMove) => RawAction::MoveToOther,
            Some(ClickClassification::PickupAll) => RawAction::CollectToCursor,
            None => report.action,
        };

        let interaction = Interaction::new(
            report.cell,
            report.in_top_grid,
            action,
            report.click,
            report.cancel,
        );
        ui.handle_interaction(&interaction);
    }

    /// Route a drag as one interaction per touched cell, stopping at the
    /// first veto.
    pub fn route_drag(&self, id: SessionId, cells: &[usize], cancel: CancelHandle) {
        let Some(entry) = self.sessions.get(&id) else {
            debug!(%id, "drag for unknown session dropped");
            return;
        };

        let mut ui = lock_session(&entry.ui);
        let grid_size = ui.grid_kind().cell_count();

        for &cell in cells {
            let interaction = Interaction::new(
                cell,
                cell < grid_size,
                RawAction::Place,
                ClickKind::Drop,
                cancel.clone(),
            );
            ui.handle_interaction(&interaction);

            if cancel.is_cancelled() {
                break;
            }
        }
    }

    /// Route the host's close notification and drop the session.
    pub fn route_close(&mut self, id: SessionId) {
        let Some(entry) = self.sessions.remove(&id) else {
            debug!(%id, "close for unknown session dropped");
            return;
        };
        lock_session(&entry.ui).handle_close();
    }

    /// Route a text-input update to a session that registered for it.
    pub fn route_text_input(&self, id: SessionId, text: &str) {
        let Some(entry) = self.sessions.get(&id) else {
            debug!(%id, "text input for unknown session dropped");
            return;
        };
        if !entry.tags.contains(CapabilityTags::TEXT_INPUT) {
            return;
        }
        lock_session(&entry.ui).handle_text_input(text);
    }

    /// Fan the periodic tick out to every tickable session.
    pub fn tick(&self, time: u64) {
        for entry in self.sessions.values() {
            if entry.tags.contains(CapabilityTags::TICKABLE) {
                lock_session(&entry.ui).handle_tick(time);
            }
        }
    }

    /// Close every live session and tear the table down.
    pub fn close_all(&mut self) {
        let ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        for id in ids {
            if let Some(entry) = self.sessions.remove(&id) {
                let mut ui = lock_session(&entry.ui);
                ui.close();
                ui.handle_close();
            }
        }
    }
}
