pub mod glean;
pub mod transport;
pub mod types;

pub use glean::GleanClient;
pub use transport::{HttpTransport, Transport};
pub use types::{
    ApiOperation, ApiRequest, ApiResponse, DataSourceConfig, Document, IndexSubmissionResult,
    IndexingStatus, SearchHit, SearchRequest, SearchResult, StatusResult, StatusTarget,
};
