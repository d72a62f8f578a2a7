//! Per-file fixture notifications and the population summary.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use devstack::config::StorageConfig;
use devstack::fixtures::{FixturePopulator, PopulateOptions};
use devstack::storage::StorageService;

mod common;

#[derive(Clone, Default)]
struct PopulateEvents {
    per_file: Arc<AtomicUsize>,
    summaries: Arc<Mutex<Vec<u64>>>,
}

#[derive(Default)]
struct Fields {
    cid: bool,
    files: Option<u64>,
}

impl Visit for Fields {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "files" {
            self.files = Some(value);
        }
    }

    fn record_debug(&mut self, field: &Field, _value: &dyn Debug) {
        if field.name() == "cid" {
            self.cid = true;
        }
    }
}

impl<S: Subscriber> Layer<S> for PopulateEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("devstack::fixtures") {
            return;
        }
        let mut fields = Fields::default();
        event.record(&mut fields);
        if fields.cid {
            self.per_file.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(files) = fields.files {
            self.summaries.lock().unwrap().push(files);
        }
    }
}

async fn start_storage(root: &std::path::Path) -> StorageService {
    StorageService::start(&StorageConfig {
        api_port: 0,
        gateway_port: 0,
        data_dir: root.join("ipfs"),
        bootstrap: Vec::new(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn log_files_reports_each_upload_and_a_summary() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = dir.path().join("fixtures");
    common::write_fixtures(&fixtures, 5);
    let storage = start_storage(dir.path()).await;

    let events = PopulateEvents::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));

    let populator =
        FixturePopulator::with_api_addr(&fixtures, common::localhost(storage.api_addr().port())).unwrap();
    let uploads = populator
        .populate(PopulateOptions {
            log_files: true,
            timeout: None,
        })
        .await
        .unwrap();

    assert_eq!(uploads.len(), 5);
    assert_eq!(events.per_file.load(Ordering::SeqCst), 5);
    assert_eq!(*events.summaries.lock().unwrap(), vec![5]);

    storage.stop().await.unwrap();
}

#[tokio::test]
async fn quiet_population_only_reports_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = dir.path().join("fixtures");
    common::write_fixtures(&fixtures, 3);
    let storage = start_storage(dir.path()).await;

    let events = PopulateEvents::default();
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(events.clone()));

    let populator = FixturePopulator::new(&fixtures, storage.api_addr().port()).unwrap();
    let uploads = populator.populate(PopulateOptions::default()).await.unwrap();

    assert_eq!(uploads.len(), 3);
    assert_eq!(events.per_file.load(Ordering::SeqCst), 0);
    assert_eq!(*events.summaries.lock().unwrap(), vec![3]);

    storage.stop().await.unwrap();
}

#[tokio::test]
async fn identical_files_share_an_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = dir.path().join("fixtures");
    std::fs::create_dir_all(fixtures.join("copy")).unwrap();
    std::fs::write(fixtures.join("a.txt"), "same").unwrap();
    std::fs::write(fixtures.join("copy").join("a.txt"), "same").unwrap();
    let storage = start_storage(dir.path()).await;

    let populator = FixturePopulator::new(&fixtures, storage.api_addr().port()).unwrap();
    let uploads = populator.populate(PopulateOptions::default()).await.unwrap();

    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].path, "a.txt");
    assert_eq!(uploads[1].path, "copy/a.txt");
    assert_eq!(uploads[0].cid, uploads[1].cid);

    storage.stop().await.unwrap();
}
