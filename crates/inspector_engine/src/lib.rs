//! Inspector engine: HTTP, event-stream and file IO for the inspection workflow.
mod client;
mod endpoints;
mod engine;
mod persist;
mod sse;
mod stream;
mod types;

pub use client::{
    extract_error_message, ClientSettings, InspectionApi, ReqwestApi, GENERIC_UPLOAD_ERROR,
};
pub use endpoints::ApiEndpoints;
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{ensure_output_dir, result_filename, PersistError, ResultWriter};
pub use sse::SseDecoder;
pub use stream::{relay_stream, StreamSink};
pub use types::{
    ApiError, EngineEvent, EngineStopped, StartRequest, StreamSignal, UploadAttempt, UploadKind,
    UploadResponse,
};
