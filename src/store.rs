//! Design Store - current token set with change notification.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ DesignStore                                      │
//! │   watch::Sender<DesignState>                     │
//! │     tokens:      Arc<DesignTokenSet>             │
//! │     updating:    bool                            │
//! │     request_seq: u64                             │
//! └──────────────┬───────────────────────────────────┘
//!                │ subscribe()
//!                ▼
//!      Style applicator, HTTP handlers, ...
//! ```
//!
//! Every send replaces the whole [`DesignState`]. Only the store's own methods
//! (and [`UpdateTicket`], which borrows the same sender) write to the channel.

use std::sync::Arc;

use dd_types::DesignTokenSet;
use tokio::sync::watch;

use crate::error::{DesignError, DesignResult};

/// Snapshot sent on every change
#[derive(Debug, Clone)]
pub struct DesignState {
    pub tokens: Arc<DesignTokenSet>,
    /// A generation is in flight
    pub updating: bool,
    /// Bumped by every `begin_update` and every direct replacement
    pub request_seq: u64,
}

/// Receiver yielding on every state change
pub type DesignWatcher = watch::Receiver<DesignState>;

/// Process-wide owner of the current design
#[derive(Debug, Clone)]
pub struct DesignStore {
    sender: Arc<watch::Sender<DesignState>>,
}

impl DesignStore {
    pub fn new(initial: DesignTokenSet) -> Self {
        let (sender, _) = watch::channel(DesignState {
            tokens: Arc::new(initial),
            updating: false,
            request_seq: 0,
        });
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> DesignWatcher {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Arc<DesignTokenSet> {
        self.sender.borrow().tokens.clone()
    }

    pub fn is_updating(&self) -> bool {
        self.sender.borrow().updating
    }

    /// Claim the single generation slot.
    ///
    /// Fails with `GenerationInProgress` while another ticket is outstanding.
    pub fn begin_update(&self) -> DesignResult<UpdateTicket> {
        let mut seq = None;
        self.sender.send_if_modified(|state| {
            if state.updating {
                return false;
            }
            state.updating = true;
            state.request_seq += 1;
            seq = Some(state.request_seq);
            true
        });

        match seq {
            Some(seq) => Ok(UpdateTicket {
                sender: self.sender.clone(),
                seq,
                finished: false,
            }),
            None => Err(DesignError::GenerationInProgress),
        }
    }

    /// Replace the current set outright (restored links, imported files).
    ///
    /// A generation still in flight becomes stale and its result is dropped.
    pub fn replace(&self, tokens: DesignTokenSet) -> Arc<DesignTokenSet> {
        let tokens = Arc::new(tokens);
        self.sender.send_modify(|state| {
            state.tokens = tokens.clone();
            state.request_seq += 1;
        });
        tracing::info!(
            theme_id = %tokens.metadata.id,
            version = tokens.metadata.version,
            "Design replaced"
        );
        tokens
    }
}

impl Default for DesignStore {
    fn default() -> Self {
        Self::new(DesignTokenSet::default())
    }
}

// ============================================================================
// TICKET
// ============================================================================

/// Exclusive right to publish one generation result.
///
/// Dropping the ticket without completing it clears the updating flag.
#[derive(Debug)]
pub struct UpdateTicket {
    sender: Arc<watch::Sender<DesignState>>,
    seq: u64,
    finished: bool,
}

impl UpdateTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Publish `tokens` if this ticket is still the latest request.
    ///
    /// Returns the committed set, or `None` when the result was stale.
    pub fn complete(mut self, tokens: DesignTokenSet) -> Option<Arc<DesignTokenSet>> {
        self.finished = true;
        let tokens = Arc::new(tokens);
        let seq = self.seq;
        let mut committed = false;
        self.sender.send_modify(|state| {
            if state.request_seq == seq {
                state.tokens = tokens.clone();
                committed = true;
            }
            state.updating = false;
        });

        if committed {
            tracing::info!(
                theme_id = %tokens.metadata.id,
                version = tokens.metadata.version,
                "Design updated"
            );
            Some(tokens)
        } else {
            tracing::warn!(seq, "Discarding stale generation result");
            None
        }
    }
}

impl Drop for UpdateTicket {
    fn drop(&mut self) {
        if !self.finished {
            self.sender.send_modify(|state| state.updating = false);
        }
    }
}
