//! Jobwatch engine: network services, state file and the run driver.
mod classify;
mod decode;
mod engine;
mod extract;
mod fetch;
mod notify;
mod persist;
mod search;
mod types;

pub use classify::{Classifier, ClassifierSettings, ClassifyError, GeminiClassifier, GEMINI_ENDPOINT};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{Persistence, RunEngine, RunError, RunReport, RunServices, RunSettings, DEFAULT_QUERY};
pub use extract::{ExtractedPage, Extractor, VisibleTextExtractor};
pub use fetch::{FetchSettings, PageFetcher, ReqwestPageFetcher};
pub use notify::{Notifier, NotifyError, NotifySettings, NtfyNotifier, NTFY_BASE_URL};
pub use persist::{
    ensure_state_dir, AtomicFileWriter, JsonLinkStore, LinkStore, PersistError, DEFAULT_STATE_FILE,
};
pub use search::{
    redirect_targets, GoogleSearchClient, SearchError, SearchProvider, SearchSettings, TimeWindow,
    GOOGLE_SEARCH_ENDPOINT,
};
pub use types::{FailureKind, FetchError, BROWSER_USER_AGENT};
