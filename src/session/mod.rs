pub mod activity;
pub mod context;
pub mod folder;
pub mod log;
pub mod used;

pub use context::SessionContext;
pub use folder::OutputFolder;
pub use log::LogEvent;
