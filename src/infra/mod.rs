pub mod console_map;
pub mod http_api;
pub mod recording_map;
pub mod wire;
