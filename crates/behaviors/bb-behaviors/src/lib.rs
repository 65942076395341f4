//! bb Behaviors
//!
//! The built-in behavior modules. `register_defaults` installs them on a
//! coordinator in their canonical order.

pub mod current_year;
pub mod favicon;
pub mod marquee;
pub mod reading_time;
pub mod share;
pub mod youtube;

pub use current_year::CurrentYearModule;
pub use favicon::FaviconModule;
pub use marquee::MarqueeModule;
pub use reading_time::ReadingTimeModule;
pub use share::{Network, ShareAction, ShareData, ShareModule};
pub use youtube::{FeedCache, FeedError, FeedTransport, HttpTransport, YoutubeModule};

use bb_core::{Coordinator, RegistryError};

/// Module names in registration order
pub const DEFAULT_MODULES: [&str; 6] = [
    share::NAME,
    current_year::NAME,
    reading_time::NAME,
    favicon::NAME,
    youtube::NAME,
    marquee::NAME,
];

/// Errors setting up the default modules
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Video feed setup failed: {0}")]
    Feed(#[from] FeedError),
}

/// Register every built-in module, with the video feed fetching over HTTP
/// as configured
pub fn register_defaults(coordinator: &mut Coordinator) -> Result<(), SetupError> {
    let youtube = YoutubeModule::from_config(&coordinator.config().video_feed)?;
    register_with_feed(coordinator, youtube)?;
    Ok(())
}

/// Register every built-in module around a caller-built video feed module
pub fn register_with_feed(coordinator: &mut Coordinator, youtube: YoutubeModule) -> Result<(), RegistryError> {
    coordinator.register(share::NAME, ShareModule::new())?;
    coordinator.register(current_year::NAME, CurrentYearModule::new())?;
    coordinator.register(reading_time::NAME, ReadingTimeModule::new())?;
    coordinator.register(favicon::NAME, FaviconModule::new())?;
    coordinator.register(youtube::NAME, youtube)?;
    coordinator.register(marquee::NAME, MarqueeModule::new())?;
    tracing::debug!("registered {} behaviors", DEFAULT_MODULES.len());
    Ok(())
}
