//! Normate engine: backend API client, result polling, chat delivery and report export.
mod api;
mod capture;
mod chat;
mod export;
mod filename;
mod persist;
mod poller;
mod types;

pub use api::{ApiClient, ApiSettings, ReqwestApiClient, SubmissionUpload, UploadFile};
pub use capture::{CaptureError, CaptureSettings, LayoutOverrides, RegionCapture, SnapshotCapture};
pub use chat::{deliver, ChatRunner};
pub use export::{build_pdf, DocumentExporter, ExportError, ExportSettings, ExportSummary};
pub use filename::export_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{ChannelPollSink, PollHandle, PollSink, ResultPoller};
pub use types::{ApiError, ApiFailureKind, PollEvent};
