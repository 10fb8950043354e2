pub mod audio;
pub mod audio_api;
pub mod core;
pub mod hal;
pub mod middle;
pub mod pipeline;
pub mod shared;
pub mod timer;
pub mod tui;
