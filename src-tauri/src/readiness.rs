//! Rendezvous with the page-setup step that assigns element identifiers and
//! fingerprints. The host polls [`Readiness::is_ready`] before attaching a
//! page and starts a fresh value for the next one.

#[derive(Debug, Default)]
pub struct Readiness {
    ids_assigned: bool,
    fingerprints_assigned: bool,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ids_assigned && self.fingerprints_assigned
    }

    pub fn mark_ids_assigned(&mut self) {
        self.mark(|r| &mut r.ids_assigned);
    }

    pub fn mark_fingerprints_assigned(&mut self) {
        self.mark(|r| &mut r.fingerprints_assigned);
    }

    fn mark(&mut self, flag: impl FnOnce(&mut Self) -> &mut bool) {
        let was_ready = self.is_ready();
        *flag(self) = true;
        if !was_ready && self.is_ready() {
            tracing::debug!("page setup complete");
        }
    }
}
