use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobwatch_core::{
    select_candidates, JobRecord, KeywordVerdictParser, ProcessedLinkSet, Verdict, VerdictParser,
};
use jobwatch_engine::{
    Classifier, ClassifierSettings, FailureKind, FetchError, FetchSettings, GeminiClassifier,
    GoogleSearchClient, JsonLinkStore, LinkStore, Notifier, NotifySettings, NtfyNotifier,
    PageFetcher, PersistError, Persistence, ReqwestPageFetcher, RunEngine, RunError, RunServices,
    RunSettings, SearchError, SearchProvider, SearchSettings, TimeWindow,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tokio::time::Instant;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Shared<T> = Arc<Mutex<T>>;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct FakeSearch {
    hits: Option<Vec<String>>,
}

#[async_trait::async_trait]
impl SearchProvider for FakeSearch {
    async fn search(
        &self,
        _query: &str,
        _window: TimeWindow,
        processed: &ProcessedLinkSet,
    ) -> Result<Vec<String>, SearchError> {
        match &self.hits {
            Some(hits) => Ok(select_candidates(hits.clone(), "google.com", processed)),
            None => Err(SearchError::Status(503)),
        }
    }
}

struct FakeFetcher {
    failing: Vec<String>,
    fetched: Shared<Vec<String>>,
    fetched_at: Shared<Vec<Instant>>,
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, link: &str) -> Result<JobRecord, FetchError> {
        self.fetched.lock().unwrap().push(link.to_string());
        self.fetched_at.lock().unwrap().push(Instant::now());
        if self.failing.iter().any(|l| l == link) {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(500),
                message: "Internal Server Error".to_string(),
            });
        }
        let title = format!("Job at {link}");
        Ok(JobRecord::from_page(link, Some(title.as_str()), "details"))
    }
}

struct FakeClassifier {
    replies: HashMap<String, String>,
    classified: Shared<Vec<String>>,
}

#[async_trait::async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, record: &JobRecord) -> Verdict {
        self.classified.lock().unwrap().push(record.link.clone());
        let reply = self.replies.get(&record.link).map(String::as_str).unwrap_or("NO");
        KeywordVerdictParser.parse(reply)
    }
}

#[derive(Default, Clone)]
struct FakeNotifier {
    jobs: Shared<Vec<String>>,
    statuses: Shared<Vec<String>>,
}

#[async_trait::async_trait]
impl Notifier for FakeNotifier {
    async fn notify_job(&self, record: &JobRecord) {
        self.jobs.lock().unwrap().push(record.link.clone());
    }

    async fn notify_status(&self, dashboard_link: &str) {
        self.statuses.lock().unwrap().push(dashboard_link.to_string());
    }
}

#[derive(Default, Clone)]
struct MemoryStore {
    links: Shared<Vec<String>>,
    saves: Shared<usize>,
    fail: bool,
}

impl LinkStore for MemoryStore {
    fn load(&self) -> Vec<String> {
        self.links.lock().unwrap().clone()
    }

    fn save(&self, links: &[String]) -> Result<(), PersistError> {
        *self.saves.lock().unwrap() += 1;
        if self.fail {
            return Err(PersistError::StateDir("read-only".to_string()));
        }
        *self.links.lock().unwrap() = links.to_vec();
        Ok(())
    }
}

struct Harness {
    fetched: Shared<Vec<String>>,
    fetched_at: Shared<Vec<Instant>>,
    classified: Shared<Vec<String>>,
    notifier: FakeNotifier,
    store: MemoryStore,
}

impl Harness {
    fn new(processed: &[&str]) -> Self {
        let store = MemoryStore::default();
        *store.links.lock().unwrap() = owned(processed);
        Self {
            fetched: Arc::default(),
            fetched_at: Arc::default(),
            classified: Arc::default(),
            notifier: FakeNotifier::default(),
            store,
        }
    }

    fn engine(&self, hits: Option<&[&str]>, failing: &[&str], replies: &[(&str, &str)]) -> RunEngine {
        self.engine_with_delay(Duration::ZERO, hits, failing, replies)
    }

    fn engine_with_delay(
        &self,
        fetch_delay: Duration,
        hits: Option<&[&str]>,
        failing: &[&str],
        replies: &[(&str, &str)],
    ) -> RunEngine {
        let settings = RunSettings {
            fetch_delay,
            dashboard_link: "https://github.com/acme/jobs/actions".to_string(),
            ..RunSettings::default()
        };
        let services = RunServices {
            search: Box::new(FakeSearch {
                hits: hits.map(owned),
            }),
            fetcher: Box::new(FakeFetcher {
                failing: owned(failing),
                fetched: self.fetched.clone(),
                fetched_at: self.fetched_at.clone(),
            }),
            classifier: Box::new(FakeClassifier {
                replies: replies
                    .iter()
                    .map(|(l, r)| (l.to_string(), r.to_string()))
                    .collect(),
                classified: self.classified.clone(),
            }),
            notifier: Box::new(self.notifier.clone()),
            store: Box::new(self.store.clone()),
        };
        RunEngine::new(settings, services)
    }

    fn saves(&self) -> usize {
        *self.store.saves.lock().unwrap()
    }

    fn stored(&self) -> Vec<String> {
        self.store.links.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn accepted_job_is_notified_and_appended_once() {
    jobwatch_logging::initialize_for_tests();
    let harness = Harness::new(&["https://a.com/job1"]);
    let engine = harness.engine(
        Some(&["https://a.com/job1", "https://b.com/job2"]),
        &[],
        &[("https://b.com/job2", "YES, this matches")],
    );

    let report = engine.run().await.unwrap();

    assert_eq!(report.candidates, owned(&["https://b.com/job2"]));
    assert_eq!(*harness.fetched.lock().unwrap(), owned(&["https://b.com/job2"]));
    assert_eq!(*harness.notifier.jobs.lock().unwrap(), owned(&["https://b.com/job2"]));
    assert!(harness.notifier.statuses.lock().unwrap().is_empty());
    assert_eq!(harness.saves(), 1);
    assert_eq!(harness.stored(), owned(&["https://a.com/job1", "https://b.com/job2"]));
    assert_eq!(report.persistence, Persistence::Saved { added: 1 });
}

#[tokio::test(start_paused = true)]
async fn every_fetch_waits_for_the_configured_delay() {
    let harness = Harness::new(&[]);
    let delay = Duration::from_millis(1500);
    let engine = harness.engine_with_delay(
        delay,
        Some(&["https://b.com/job2", "https://c.com/job3"]),
        &["https://b.com/job2"],
        &[],
    );

    let started = Instant::now();
    engine.run().await.unwrap();

    let fetched_at = harness.fetched_at.lock().unwrap().clone();
    assert_eq!(fetched_at.len(), 2);
    assert!(fetched_at[0] - started >= delay);
    assert!(fetched_at[1] - fetched_at[0] >= delay);
    assert!(started.elapsed() >= delay * 2);
}

#[tokio::test]
async fn no_accepted_job_sends_one_status_and_never_saves() {
    let harness = Harness::new(&["https://a.com/job1"]);
    let engine = harness.engine(
        Some(&["https://b.com/job2", "https://c.com/job3"]),
        &[],
        &[("https://b.com/job2", "NO"), ("https://c.com/job3", "no.")],
    );

    let report = engine.run().await.unwrap();

    assert!(harness.notifier.jobs.lock().unwrap().is_empty());
    assert_eq!(
        *harness.notifier.statuses.lock().unwrap(),
        owned(&["https://github.com/acme/jobs/actions"])
    );
    assert_eq!(harness.saves(), 0);
    assert_eq!(harness.stored(), owned(&["https://a.com/job1"]));
    assert_eq!(report.persistence, Persistence::Unchanged);
}

#[tokio::test]
async fn fetch_failure_does_not_block_later_links() {
    let harness = Harness::new(&[]);
    let engine = harness.engine(
        Some(&["https://a.com/broken", "https://b.com/job2"]),
        &["https://a.com/broken"],
        &[("https://b.com/job2", "YES")],
    );

    let report = engine.run().await.unwrap();

    assert_eq!(
        *harness.fetched.lock().unwrap(),
        owned(&["https://a.com/broken", "https://b.com/job2"])
    );
    assert_eq!(*harness.classified.lock().unwrap(), owned(&["https://b.com/job2"]));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].link, "https://a.com/broken");
    assert_eq!(harness.stored(), owned(&["https://b.com/job2"]));
}

#[tokio::test]
async fn search_failure_aborts_without_side_effects() {
    let harness = Harness::new(&["https://a.com/job1"]);
    let engine = harness.engine(None, &[], &[]);

    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, RunError::Search(SearchError::Status(503))));
    assert!(harness.fetched.lock().unwrap().is_empty());
    assert!(harness.notifier.jobs.lock().unwrap().is_empty());
    assert!(harness.notifier.statuses.lock().unwrap().is_empty());
    assert_eq!(harness.saves(), 0);
}

#[tokio::test]
async fn save_failure_is_reported_not_fatal() {
    let mut harness = Harness::new(&[]);
    harness.store.fail = true;
    let engine = harness.engine(Some(&["https://b.com/job2"]), &[], &[("https://b.com/job2", "yes")]);

    let report = engine.run().await.unwrap();

    assert_eq!(report.accepted, owned(&["https://b.com/job2"]));
    assert_eq!(harness.notifier.jobs.lock().unwrap().len(), 1);
    assert!(matches!(report.persistence, Persistence::Failed { .. }));
}

#[tokio::test]
async fn end_to_end_against_mock_services() {
    let server = MockServer::start().await;
    let base = server.uri();

    let results = format!(
        r#"<html><body>
            <a href="/url?q={base}/jobs/seen&amp;sa=U">Seen</a>
            <a href="/url?q={base}/jobs/2&amp;sa=U">Fresher SDE</a>
            <a href="/url?q={base}/jobs/3&amp;sa=U">Senior SDE</a>
        </body></html>"#
    );
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(results, "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Fresher SDE</title></head><body>0 years, Bengaluru</body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Senior SDE</title></head><body>8+ years, Pune</body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(wiremock::matchers::body_string_contains("Fresher SDE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "YES" }] } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(wiremock::matchers::body_string_contains("Senior SDE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "NO" }] } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(header("Click", format!("{base}/jobs/2").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let state_path = temp.path().join("processed_jobs.json");
    fs::write(&state_path, format!("[\"{base}/jobs/seen\"]")).unwrap();

    let services = RunServices {
        search: Box::new(
            GoogleSearchClient::new(SearchSettings {
                endpoint: format!("{base}/search"),
                ..SearchSettings::default()
            })
            .unwrap(),
        ),
        fetcher: Box::new(ReqwestPageFetcher::new(FetchSettings::default()).unwrap()),
        classifier: Box::new(
            GeminiClassifier::new(
                ClassifierSettings {
                    endpoint: format!("{base}/v1beta/models/gemini-2.0-flash:generateContent"),
                    ..ClassifierSettings::default()
                },
                "k",
            )
            .unwrap(),
        ),
        notifier: Box::new(
            NtfyNotifier::new(
                NotifySettings {
                    base_url: base.clone(),
                    ..NotifySettings::default()
                },
                "alerts",
            )
            .unwrap(),
        ),
        store: Box::new(JsonLinkStore::new(&state_path)),
    };
    let settings = RunSettings {
        fetch_delay: Duration::ZERO,
        ..RunSettings::default()
    };

    let report = RunEngine::new(settings, services).run().await.unwrap();

    assert_eq!(report.accepted, vec![format!("{base}/jobs/2")]);
    assert_eq!(
        JsonLinkStore::new(&state_path).load(),
        vec![format!("{base}/jobs/seen"), format!("{base}/jobs/2")]
    );
}
