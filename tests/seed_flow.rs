use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use statuspage_mirror::{
    feed::{FeedError, FeedSource},
    formatter::MessageEmbed,
    models::{Impact, Incident, IncidentStatus},
    notifier::{Notifier, NotifyError},
    reconciler::Reconciler,
    store::IncidentStore,
};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

struct StaticFeed {
    incidents: Vec<Incident>,
    fail: bool,
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_incidents(&self) -> Result<Vec<Incident>, FeedError> {
        if self.fail {
            return Err(FeedError::Status(503));
        }
        Ok(self.incidents.clone())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    created: Mutex<Vec<String>>,
    edited: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn create_message(&self, embed: &MessageEmbed) -> Result<String, NotifyError> {
        if let Ok(mut guard) = self.created.lock() {
            guard.push(embed.footer.text.clone());
        }
        Ok("msg-1".to_owned())
    }

    async fn edit_message(
        &self,
        message_id: &str,
        _embed: &MessageEmbed,
    ) -> Result<String, NotifyError> {
        if let Ok(mut guard) = self.edited.lock() {
            guard.push(message_id.to_owned());
        }
        Ok(message_id.to_owned())
    }
}

impl RecordingNotifier {
    fn total_calls(&self) -> usize {
        let created = self.created.lock().map(|guard| guard.len()).unwrap_or(0);
        let edited = self.edited.lock().map(|guard| guard.len()).unwrap_or(0);
        created + edited
    }
}

fn ts(second: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(second)
}

fn incident(id: &str, status: IncidentStatus) -> Incident {
    Incident {
        id: id.to_owned(),
        status,
        impact: Impact::Minor,
        name: format!("incident {id}"),
        shortlink: format!("https://stspg.io/{id}"),
        started_at: ts(0),
        created_at: ts(0),
        updated_at: None,
        components: Vec::new(),
        incident_updates: Vec::new(),
    }
}

fn open_store() -> Option<(NamedTempFile, Arc<IncidentStore>)> {
    let file = match NamedTempFile::new() {
        Ok(file) => file,
        Err(_) => return None,
    };

    let store = match IncidentStore::open(file.path()) {
        Ok(store) => store,
        Err(_) => return None,
    };

    Some((file, Arc::new(store)))
}

#[tokio::test]
async fn bootstrap_seeds_all_incidents_without_notifying() {
    let (_file, store) = match open_store() {
        Some(pair) => pair,
        None => return,
    };

    let feed = Arc::new(StaticFeed {
        incidents: vec![
            incident("newest", IncidentStatus::Investigating),
            incident("middle", IncidentStatus::Monitoring),
            incident("oldest", IncidentStatus::Resolved),
        ],
        fail: false,
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let reconciler = Reconciler::new(feed, Arc::clone(&store), Arc::clone(&notifier));
    reconciler.reconcile().await;

    let ids = store.list_ids();
    assert!(ids.is_ok());
    assert_eq!(ids.unwrap_or_default().len(), 3);

    for id in ["newest", "middle", "oldest"] {
        let record = store.get(id).ok().flatten();
        assert!(record.is_some());
        let record = match record {
            Some(record) => record,
            None => return,
        };
        assert_eq!(record.message_id, None);
        assert_eq!(record.resolved, id == "oldest");
    }

    assert_eq!(notifier.total_calls(), 0);
}

#[tokio::test]
async fn bootstrap_retries_while_store_stays_empty() {
    let (_file, store) = match open_store() {
        Some(pair) => pair,
        None => return,
    };

    let failing_feed = Arc::new(StaticFeed {
        incidents: vec![incident("abc", IncidentStatus::Investigating)],
        fail: true,
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let reconciler = Reconciler::new(failing_feed, Arc::clone(&store), Arc::clone(&notifier));
    reconciler.reconcile().await;

    // Fetch failed, so nothing was written and the next tick will take the
    // bootstrap path again.
    assert!(store.list_ids().map(|ids| ids.is_empty()).unwrap_or(false));
    assert_eq!(notifier.total_calls(), 0);

    let working_feed = Arc::new(StaticFeed {
        incidents: vec![incident("abc", IncidentStatus::Investigating)],
        fail: false,
    });
    let reconciler = Reconciler::new(working_feed, Arc::clone(&store), Arc::clone(&notifier));
    reconciler.reconcile().await;

    assert_eq!(store.list_ids().unwrap_or_default(), vec!["abc".to_owned()]);
    assert_eq!(notifier.total_calls(), 0);
}

#[tokio::test]
async fn repeated_bootstrap_overwrites_harmlessly() {
    let (_file, store) = match open_store() {
        Some(pair) => pair,
        None => return,
    };

    let feed = Arc::new(StaticFeed {
        incidents: vec![incident("abc", IncidentStatus::Monitoring)],
        fail: false,
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let reconciler = Reconciler::new(feed, Arc::clone(&store), Arc::clone(&notifier));
    reconciler.seed().await;
    reconciler.seed().await;

    assert_eq!(store.list_ids().unwrap_or_default().len(), 1);
    assert_eq!(notifier.total_calls(), 0);
}
