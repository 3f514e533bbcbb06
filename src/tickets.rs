//! One-time delivery of finished documents.
//!
//! A document is either streamed straight back to the caller
//! ([`DocumentTicketStore::create_sync`]) or parked in temporary storage under
//! a ticket id ([`DocumentTicketStore::create_async`]) that can be redeemed
//! exactly once with [`DocumentTicketStore::fetch`].

use crate::error::PrintError;
use crate::printer::MapPrinter;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use mapsheet_traits::{Artifact, ArtifactStorage};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct DocumentTicket {
    pub id: String,
    pub artifact: Artifact,
    pub created_at: DateTime<Utc>,
}

/// Process-wide registry of documents waiting to be fetched.
///
/// The lock only guards inserting and removing tickets; documents are built
/// and streamed outside of it. Every artifact the store creates is deleted
/// exactly once: after streaming, on a failed build, on fetch, by
/// [`purge_expired`](Self::purge_expired) or on shutdown.
#[derive(Debug)]
pub struct DocumentTicketStore {
    printer: Arc<MapPrinter>,
    storage: Arc<dyn ArtifactStorage>,
    tickets: Mutex<HashMap<String, DocumentTicket>>,
}

impl DocumentTicketStore {
    pub fn new(printer: Arc<MapPrinter>, storage: Arc<dyn ArtifactStorage>) -> Self {
        info!("[TICKETS] Using '{}' for temporary documents.", storage.name());
        Self {
            printer,
            storage,
            tickets: Mutex::new(HashMap::new()),
        }
    }

    pub fn printer(&self) -> &MapPrinter {
        &self.printer
    }

    // A panic while holding the lock leaves the map itself consistent
    fn tickets(&self) -> MutexGuard<'_, HashMap<String, DocumentTicket>> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build `spec` into a temporary artifact, stream it to `out` and delete
    /// the artifact again, whatever happens. Returns the number of bytes
    /// written.
    pub fn create_sync(&self, spec: &str, out: &mut dyn Write) -> Result<u64, PrintError> {
        let artifact = self.build(spec)?;
        let guard = ArtifactGuard::new(self.storage.as_ref(), &artifact);
        let written = self.storage.copy_to(guard.artifact, out)?;
        debug!("[TICKETS] Streamed {} bytes of '{}'.", written, artifact.id());
        Ok(written)
    }

    /// Build `spec` into a temporary artifact and return the ticket id it can
    /// be fetched with.
    pub fn create_async(&self, spec: &str) -> Result<String, PrintError> {
        let artifact = self.build(spec)?;
        let id = artifact.id().to_string();
        let ticket = DocumentTicket {
            id: id.clone(),
            artifact,
            created_at: Utc::now(),
        };
        self.tickets().insert(id.clone(), ticket);
        info!("[TICKETS] Document '{}' ready for pickup.", id);
        Ok(id)
    }

    /// Redeem a ticket: stream its document to `out` and delete it.
    ///
    /// The ticket is removed before streaming, so a second fetch (or a
    /// concurrent one) gets `NotFound`. The artifact is deleted even when
    /// streaming fails.
    pub fn fetch(&self, id: &str, out: &mut dyn Write) -> Result<u64, PrintError> {
        let ticket = self
            .tickets()
            .remove(id)
            .ok_or_else(|| PrintError::NotFound(id.to_string()))?;
        let guard = ArtifactGuard::new(self.storage.as_ref(), &ticket.artifact);
        let written = self.storage.copy_to(guard.artifact, out)?;
        info!("[TICKETS] Document '{}' delivered ({} bytes).", id, written);
        Ok(written)
    }

    /// Number of tickets waiting to be fetched.
    pub fn pending(&self) -> usize {
        self.tickets().len()
    }

    /// Drop every ticket that is at least `max_age` old. Returns how many
    /// were removed.
    pub fn purge_expired(&self, max_age: Duration) -> usize {
        let now = Utc::now();
        let expired: Vec<DocumentTicket> = {
            let mut tickets = self.tickets();
            let ids: Vec<String> = tickets
                .values()
                .filter(|t| now - t.created_at >= max_age)
                .map(|t| t.id.clone())
                .collect();
            ids.iter().filter_map(|id| tickets.remove(id)).collect()
        };
        for ticket in &expired {
            debug!("[TICKETS] Ticket '{}' expired.", ticket.id);
            self.discard(&ticket.artifact);
        }
        expired.len()
    }

    /// Delete every document that was never fetched.
    pub fn shutdown(&self) {
        let remaining: Vec<DocumentTicket> = self.tickets().drain().map(|(_, t)| t).collect();
        if remaining.is_empty() {
            return;
        }
        info!("[TICKETS] Discarding {} unfetched document(s).", remaining.len());
        for ticket in &remaining {
            self.discard(&ticket.artifact);
        }
    }

    fn build(&self, spec: &str) -> Result<Artifact, PrintError> {
        let artifact = self.storage.create()?;
        let guard = ArtifactGuard::new(self.storage.as_ref(), &artifact);
        let document = {
            let mut buffer = Vec::new();
            self.printer.print_json(spec, &mut buffer)?;
            buffer
        };
        self.storage.write(guard.artifact, &document)?;
        guard.disarm();
        debug!("[TICKETS] Built '{}' ({} bytes).", artifact, document.len());
        Ok(artifact)
    }

    fn discard(&self, artifact: &Artifact) {
        if let Err(e) = self.storage.delete(artifact) {
            warn!("[TICKETS] Could not delete '{}': {}", artifact, e);
        }
    }
}

impl Drop for DocumentTicketStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Deletes an artifact when dropped unless disarmed.
struct ArtifactGuard<'a> {
    storage: &'a dyn ArtifactStorage,
    artifact: &'a Artifact,
    armed: bool,
}

impl<'a> ArtifactGuard<'a> {
    fn new(storage: &'a dyn ArtifactStorage, artifact: &'a Artifact) -> Self {
        Self {
            storage,
            artifact,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ArtifactGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.storage.delete(self.artifact) {
            Ok(()) => debug!("[TICKETS] Deleted '{}'.", self.artifact),
            Err(e) => warn!("[TICKETS] Could not delete '{}': {}", self.artifact, e),
        }
    }
}
