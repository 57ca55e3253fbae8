use statuspage_mirror::store::IncidentStore;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    let db_path = env::var("STATUS_MIRROR_SQLITE_PATH")
        .unwrap_or_else(|_| "statuspage-mirror.sqlite".to_owned());

    match args.get(1).map(String::as_str) {
        Some("list") => list_records(&db_path),
        _ => print_usage(),
    }
}

fn list_records(db_path: &str) {
    let store = match IncidentStore::open(db_path) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("failed to open sqlite: {error}");
            return;
        }
    };

    let ids = match store.list_ids() {
        Ok(ids) => ids,
        Err(error) => {
            eprintln!("failed to list records: {error}");
            return;
        }
    };

    if ids.is_empty() {
        println!("no records (store has not been seeded yet)");
        return;
    }

    for id in ids {
        match store.get(&id) {
            Ok(Some(record)) => {
                let message = match record.message_id {
                    Some(message_id) => format!("message {message_id}"),
                    None => "seeded silently".to_owned(),
                };
                let state = if record.resolved { "resolved" } else { "open" };
                println!(
                    "{} [{}] last update {} ({})",
                    record.incident_id,
                    state,
                    record.last_update.to_rfc3339(),
                    message
                );
            }
            Ok(None) => {}
            Err(error) => eprintln!("failed to read record {id}: {error}"),
        }
    }
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  record-inspect list");
}
