pub mod catalog;
pub mod console;
pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod progress;
pub mod selection;
pub mod session;

// Re-export main types for convenience
pub use catalog::{Catalog, Episode, OrderingMode};
pub use console::{Console, TermConsole};
pub use episode::{
    DownloadContext, DownloadSummary, EpisodeOutcome, download_episode, download_or_skip,
    generate_filename, prepare_output_dir,
};
pub use error::{DownloadError, FeedError, SelectionError, SessionError};
pub use feed::{Feed, FeedEntry, is_url, load_feed, parse_feed};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use selection::{FilterCommand, Selection, SelectionCommand, parse_selection};
pub use session::{SessionOptions, SessionOutcome, run_session};
