mod download;
mod filename;

pub use download::{
    DownloadContext, DownloadSummary, EpisodeOutcome, download_episode, download_or_skip,
    prepare_output_dir,
};
pub use filename::generate_filename;
