use quotesync_core::{
    InMemoryKeyValueStore, KeyValueStore, Quote, QuoteService, QuoteStorage, ReconcileWorker,
    Reconciler, RemotePost, RemoteSource, SyncError, SyncNotice, SyncObserver, SyncResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type MemoryService = QuoteService<InMemoryKeyValueStore, InMemoryKeyValueStore>;

#[derive(Default)]
struct FakeRemote {
    titles: Vec<String>,
    failing_pulls: usize,
    fail_push: bool,
    ignores_limit: bool,
    fetch_calls: AtomicUsize,
    pushed: Mutex<Vec<Quote>>,
}

impl FakeRemote {
    fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    fn pushed(&self) -> Vec<Quote> {
        self.pushed.lock().unwrap().clone()
    }
}

impl RemoteSource for FakeRemote {
    fn fetch_posts(&self, limit: u32) -> SyncResult<Vec<RemotePost>> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failing_pulls {
            return Err(SyncError::Network("connection refused".to_string()));
        }
        let take = if self.ignores_limit {
            self.titles.len()
        } else {
            limit as usize
        };
        Ok(self
            .titles
            .iter()
            .take(take)
            .map(|title| RemotePost::titled(title.clone()))
            .collect())
    }

    fn push_quote(&self, quote: &Quote) -> SyncResult<()> {
        if self.fail_push {
            return Err(SyncError::Status(503));
        }
        self.pushed.lock().unwrap().push(quote.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver {
    notices: Mutex<Vec<SyncNotice>>,
}

impl RecordingObserver {
    fn notices(&self) -> Vec<SyncNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl SyncObserver for RecordingObserver {
    fn notify(&self, notice: SyncNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn empty_service(durable: &InMemoryKeyValueStore) -> Arc<Mutex<MemoryService>> {
    durable.set("quotes", "[]").unwrap();
    Arc::new(Mutex::new(QuoteService::open(QuoteStorage::new(
        durable.clone(),
        InMemoryKeyValueStore::new(),
    ))))
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within 5s");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn pull_once_merges_persists_and_notifies() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote::with_titles(&["one", "two", "three"]));
    let observer = Arc::new(RecordingObserver::default());
    let reconciler = Reconciler::new(remote, observer.clone()).with_batch_limit(2);

    assert_eq!(reconciler.pull_once(&service).unwrap(), 2);
    assert_eq!(reconciler.pull_once(&service).unwrap(), 0);

    let guard = service.lock().unwrap();
    assert_eq!(guard.len(), 2);
    assert!(guard.all().iter().all(|q| q.category() == "server"));
    assert!(durable.get("quotes").unwrap().unwrap().contains("two"));
    assert_eq!(observer.notices(), vec![SyncNotice::Merged { added: 2 }]);
}

#[test]
fn pull_once_bounds_oversized_remote_batches() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let titles: Vec<String> = (0..100).map(|n| format!("post {n}")).collect();
    let remote = Arc::new(FakeRemote {
        titles,
        ignores_limit: true,
        ..FakeRemote::default()
    });
    let reconciler = Reconciler::new(remote, Arc::new(RecordingObserver::default()));

    assert_eq!(reconciler.pull_once(&service).unwrap(), 5);
    assert_eq!(service.lock().unwrap().len(), 5);
}

#[test]
fn pull_failure_is_reported_and_leaves_store_untouched() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote {
        failing_pulls: 1,
        ..FakeRemote::with_titles(&["later"])
    });
    let observer = Arc::new(RecordingObserver::default());
    let reconciler = Reconciler::new(remote, observer.clone());

    let err = reconciler.pull_once(&service).unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
    assert!(service.lock().unwrap().is_empty());
    assert!(matches!(
        observer.notices().as_slice(),
        [SyncNotice::PullFailed { .. }]
    ));

    assert_eq!(reconciler.pull_once(&service).unwrap(), 1);
}

#[test]
fn failed_push_keeps_local_add() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote {
        fail_push: true,
        ..FakeRemote::default()
    });
    let observer = Arc::new(RecordingObserver::default());
    let reconciler = Reconciler::new(remote.clone(), observer.clone());

    let added = service
        .lock()
        .unwrap()
        .add_quote("Local first", "mine")
        .unwrap();
    assert!(reconciler.push(&added).is_err());

    assert_eq!(service.lock().unwrap().all(), &[added]);
    assert!(remote.pushed().is_empty());
    assert!(matches!(
        observer.notices().as_slice(),
        [SyncNotice::PushFailed { .. }]
    ));
}

#[test]
fn worker_keeps_polling_after_failures_and_stops_cleanly() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote {
        failing_pulls: 2,
        ..FakeRemote::with_titles(&["eventually"])
    });
    let reconciler = Reconciler::new(remote.clone(), Arc::new(RecordingObserver::default()));

    let worker = ReconcileWorker::spawn(reconciler, service.clone(), Duration::from_millis(20));
    wait_until(|| service.lock().unwrap().len() == 1);
    let stats = worker.stop();

    assert_eq!(stats.pull_failures, 2);
    assert_eq!(stats.quotes_merged, 1);
    assert!(stats.pulls >= 3);
    assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), stats.pulls);
}

#[test]
fn worker_sends_queued_pushes_between_ticks() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote::default());
    let reconciler = Reconciler::new(remote.clone(), Arc::new(RecordingObserver::default()));

    let worker = ReconcileWorker::spawn(reconciler, service.clone(), Duration::from_secs(3600));
    let quote = Quote::new("Queued", "mine").unwrap();
    assert!(worker.push(quote.clone()));
    wait_until(|| remote.pushed().len() == 1);

    let stats = worker.stop();
    assert_eq!(stats.pulls, 1);
    assert_eq!(stats.pushes, 1);
    assert_eq!(stats.push_failures, 0);
    assert_eq!(remote.pushed(), vec![quote]);
}

#[test]
fn dropping_worker_stops_it() {
    let durable = InMemoryKeyValueStore::new();
    let service = empty_service(&durable);
    let remote = Arc::new(FakeRemote::default());
    let reconciler = Reconciler::new(remote.clone(), Arc::new(RecordingObserver::default()));

    let worker = ReconcileWorker::spawn(reconciler, service, Duration::from_millis(5));
    wait_until(|| remote.fetch_calls.load(Ordering::SeqCst) >= 2);
    drop(worker);

    let calls = remote.fetch_calls.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(remote.fetch_calls.load(Ordering::SeqCst), calls);
}
