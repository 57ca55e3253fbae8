//! The reconciliation loop: per tick, compare the remote incident list
//! against stored records and decide skip, create, or edit per incident.

use crate::feed::FeedSource;
use crate::formatter::format_incident;
use crate::models::{Incident, IncidentRecord};
use crate::notifier::Notifier;
use crate::store::IncidentStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Reconciler<F, N> {
    feed: Arc<F>,
    store: Arc<IncidentStore>,
    notifier: Arc<N>,
}

impl<F, N> Clone for Reconciler<F, N> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<F, N> Reconciler<F, N>
where
    F: FeedSource + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(feed: Arc<F>, store: Arc<IncidentStore>, notifier: Arc<N>) -> Self {
        Self {
            feed,
            store,
            notifier,
        }
    }

    /// One tick. Never propagates errors: a failed fetch skips the tick, a
    /// failed per-incident action leaves its record untouched so the next
    /// tick re-selects the same incident.
    pub async fn reconcile(&self) {
        let known = match self.store.list_ids() {
            Ok(ids) => ids,
            Err(error) => {
                warn!(error = %error, "failed to list stored incident ids");
                return;
            }
        };

        if known.is_empty() {
            self.seed().await;
            return;
        }

        debug!("heartbeat");

        let incidents = match self.feed.fetch_incidents().await {
            Ok(incidents) => incidents,
            Err(error) => {
                warn!(error = %error, "incident fetch failed, skipping tick");
                return;
            }
        };

        // The feed is newest-first; announce oldest-observed first.
        for incident in incidents.into_iter().rev() {
            let record = match self.store.get(&incident.id) {
                Ok(record) => record,
                Err(error) => {
                    warn!(incident_id = %incident.id, error = %error, "failed to read record");
                    continue;
                }
            };

            match record {
                None => {
                    info!(incident_id = %incident.id, "new incident");
                    self.dispatch(incident, None);
                }
                Some(record) => {
                    if incident.remote_update_time() > record.last_update {
                        info!(incident_id = %incident.id, "incident update");
                        self.dispatch(incident, record.message_id);
                    }
                }
            }
        }
    }

    /// Spawns the notify-then-persist sequence for one incident. The task
    /// is never joined; it logs its own outcome and runs to completion
    /// regardless of later ticks.
    fn dispatch(&self, incident: Incident, message_id: Option<String>) {
        let this = self.clone();
        tokio::spawn(async move {
            this.create_or_update(incident, message_id).await;
        });
    }

    /// Creates the webhook message (no prior handle) or edits the existing
    /// one, then overwrites the record. `last_update` is wall-clock time
    /// captured after the notifier call succeeds; on failure nothing is
    /// written.
    pub async fn create_or_update(&self, incident: Incident, message_id: Option<String>) {
        let embed = format_incident(&incident);

        let result = match message_id.as_deref() {
            Some(id) => self.notifier.edit_message(id, &embed).await,
            None => self.notifier.create_message(&embed).await,
        };

        let handle = match result {
            Ok(handle) => handle,
            Err(error) => {
                match message_id {
                    Some(id) => warn!(
                        incident_id = %incident.id,
                        message_id = %id,
                        error = %error,
                        "failed to edit webhook message"
                    ),
                    None => warn!(
                        incident_id = %incident.id,
                        error = %error,
                        "failed to send webhook message"
                    ),
                }
                return;
            }
        };

        let record = IncidentRecord {
            incident_id: incident.id.clone(),
            last_update: Utc::now(),
            message_id: Some(handle),
            resolved: incident.status.is_closed(),
        };

        if let Err(error) = self.store.set(&record) {
            warn!(incident_id = %incident.id, error = %error, "failed to persist record");
        }
    }

    /// Bootstrap: record every current incident without notifying. Runs
    /// only while the store is empty, so an overlapping run is a harmless
    /// overwrite of the same keys.
    pub async fn seed(&self) {
        info!("store is empty, recording incidents without notifying");

        let incidents = match self.feed.fetch_incidents().await {
            Ok(incidents) => incidents,
            Err(error) => {
                warn!(error = %error, "incident fetch failed, bootstrap postponed");
                return;
            }
        };

        for incident in incidents.into_iter().rev() {
            info!(incident_id = %incident.id, "seeding incident");

            let record = IncidentRecord {
                incident_id: incident.id.clone(),
                last_update: Utc::now(),
                message_id: None,
                resolved: incident.status.is_closed(),
            };

            if let Err(error) = self.store.set(&record) {
                warn!(incident_id = %incident.id, error = %error, "failed to seed record");
            }
        }
    }
}
