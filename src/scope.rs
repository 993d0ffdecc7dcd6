//! Lifetimes for in-flight backend work.
//!
//! A [`Scope`] lives as long as the thing that started the work: a mounted
//! screen or a signed-in session. Dropping it cancels every future guarded
//! by one of its tokens, and results that still arrive carry the scope id so
//! the session can tell they are stale.

use std::future::Future;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Session,
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    pub kind: ScopeKind,
    pub serial: u64,
}

#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    cancel_tx: watch::Sender<bool>,
}

impl Scope {
    pub fn new(kind: ScopeKind, serial: u64) -> Self {
        let (cancel_tx, _cancel_rx) = watch::channel(false);
        Self {
            id: ScopeId { kind, serial },
            cancel_tx,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            id: self.id,
            cancel_rx: self.cancel_tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct ScopeToken {
    id: ScopeId,
    cancel_rx: watch::Receiver<bool>,
}

impl ScopeToken {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Resolves once the owning scope is cancelled or dropped.
    pub async fn cancelled(&self) {
        let mut cancel_rx = self.cancel_rx.clone();
        loop {
            if *cancel_rx.borrow() {
                return;
            }
            if cancel_rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run `fut` unless the scope goes away first. `None` means cancelled.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
