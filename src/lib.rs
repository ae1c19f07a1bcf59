pub mod download;
pub mod error;
pub mod extractors;
pub mod http;
pub mod providers;
pub mod utils;
pub mod ytdlp;
