use tokio::sync::watch;

/// Visibility signal for the host surface.
///
/// Stands in for the document visibility API: the embedding layer flips it
/// when its surface is hidden or shown, and the poll controller force-stops
/// while hidden and restarts fresh on regain. Dropping the gate leaves
/// subscribers reading the last known value, which they treat as "always
/// visible from now on".
#[derive(Debug)]
pub struct VisibilityGate {
    tx: watch::Sender<bool>,
}

impl VisibilityGate {
    pub fn new(visible: bool) -> Self {
        let (tx, _) = watch::channel(visible);
        VisibilityGate { tx }
    }

    pub fn set_visible(&self, visible: bool) {
        // send only fails with no receivers; the next subscribe still sees
        // the latest value, so the result is irrelevant.
        let _ = self.tx.send(visible);
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        VisibilityGate::new(true)
    }
}
