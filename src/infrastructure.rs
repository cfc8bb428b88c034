//! Infrastructure layer: export pages on disk, the VK API, configuration and logging
//!
//! Implements the domain ports (`ListingSource`, `RemoteDeleteClient`) and the
//! ambient services the binary wires together.

pub mod config;
pub mod listing_extractor;
pub mod logging;
pub mod vk_client;

// Re-export commonly used items
pub use config::{AppConfig, BatchSettings, ConfigManager, ExportConfig, LoggingConfig};
pub use listing_extractor::{ExportEncoding, HtmlListingExtractor, ListingSelectors};
pub use logging::{init_logging_with_config, log_system_info};
pub use vk_client::{VkApiClient, VkApiConfig, vk_api};
