// Downloader module - resolver, fetcher and the extraction backend boundary

pub mod backends;
pub mod errors;
pub mod fetcher;
pub mod format_selector;
pub mod models;
pub mod resolver;
pub mod traits;
pub mod utils;

pub use backends::YtDlpCli;
pub use errors::{BackendError, ExtractionError, FailureReason, FetchError};
pub use fetcher::Fetcher;
pub use format_selector::FormatSelector;
pub use models::{
    CatalogEntry, DownloadResult, EntryKind, MaterializeRequest, MediaMetadata, NetworkOptions,
    StreamDescriptor, VideoCatalog,
};
pub use resolver::Resolver;
pub use traits::MediaBackend;
