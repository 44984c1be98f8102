mod svr;

pub use svr::{ApiResponse, DownloadRequest, build_app, serve, startup};
