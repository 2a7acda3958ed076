//! Admin gate: decides once per request whether the caller may mutate the ledger

use serde::Serialize;
use shared::Session;

use crate::error::{AppError, AppResult};
use crate::store::{IdentityProvider, LedgerStore};

/// Notice text shown when mutation entry points are hidden
pub const VIEW_ONLY_NOTICE: &str = "This inventory is view-only.";

/// Gate resolution state. Terminal once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Unresolved,
    Unauthorized,
    Authorized,
}

/// Per-request admin gate
#[derive(Debug, Clone)]
pub struct AdminGate {
    state: GateState,
    session: Option<Session>,
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Unresolved,
            session: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authorized(&self) -> bool {
        self.state == GateState::Authorized
    }

    /// Resolve the gate against the identity provider and the admin allow-list.
    ///
    /// Runs the lookups at most once; later calls return the cached state.
    /// Any lookup error resolves to `Unauthorized`.
    pub async fn resolve(
        &mut self,
        identity: &dyn IdentityProvider,
        store: &dyn LedgerStore,
        token: Option<&str>,
    ) -> GateState {
        if self.state != GateState::Unresolved {
            return self.state;
        }

        self.state = match token {
            None => GateState::Unauthorized,
            Some(token) => match identity.get_session(token).await {
                Ok(Some(session)) => {
                    let state = match store.is_admin(session.user_id).await {
                        Ok(true) => GateState::Authorized,
                        Ok(false) => GateState::Unauthorized,
                        Err(e) => {
                            tracing::warn!(user_id = %session.user_id, "Admin lookup failed, gate closed: {}", e);
                            GateState::Unauthorized
                        }
                    };
                    self.session = Some(session);
                    state
                }
                Ok(None) => GateState::Unauthorized,
                Err(e) => {
                    tracing::warn!("Session lookup failed, gate closed: {}", e);
                    GateState::Unauthorized
                }
            },
        };

        tracing::debug!(state = ?self.state, "Admin gate resolved");
        self.state
    }

    /// Error unless the gate resolved to `Authorized`
    pub fn require_authorized(&self) -> AppResult<()> {
        if self.is_authorized() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Notices attached to a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    ViewOnly,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::ViewOnly => VIEW_ONLY_NOTICE,
        }
    }
}

/// What the caller may do on a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_add_entry: bool,
    pub can_manage_subcategories: bool,
    pub notices: Vec<Notice>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_add_entry: true,
            can_manage_subcategories: true,
            notices: Vec::new(),
        }
    }
}

impl Capabilities {
    /// Capabilities for a resolved gate
    pub fn for_gate(gate: &AdminGate) -> Self {
        let mut caps = Self::default();
        caps.apply_gate(gate);
        caps
    }

    /// Hide mutation entry points unless authorized. Idempotent.
    pub fn apply_gate(&mut self, gate: &AdminGate) {
        if gate.is_authorized() {
            return;
        }
        self.can_add_entry = false;
        self.can_manage_subcategories = false;
        if !self.notices.contains(&Notice::ViewOnly) {
            self.notices.push(Notice::ViewOnly);
        }
    }
}
