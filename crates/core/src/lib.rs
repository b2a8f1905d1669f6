pub mod config;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod remuxer;
pub mod retriever;
pub mod stream;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DownloadsConfig,
    ServerConfig,
};
pub use job::{
    output_file_name, DownloadJob, DownloadManager, InMemoryJobStore, JobFilter, JobStore,
    JobStoreError, JobUpdate, ManagerError, MergeRequest, NewJob,
};
pub use orchestrator::{JobStatus, MergeCallbacks, MergeError, MergeOrchestrator, MergeOutcome};
pub use remuxer::{FfmpegRemuxer, Remuxer, RemuxerConfig, RemuxerError};
pub use retriever::{
    HttpRetriever, ProgressCallback, RetrievalResult, Retriever, RetrieverConfig, RetrieverError,
    TransferProgress,
};
pub use stream::{classify, normalize_url, pair_streams, validate_pair, Pairing, PairingError, StreamRole};
