pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use color::{Color, ColorSpace};
pub use config::ClipactConfig;
pub use error::{ClipactError, Result};
pub use events::{ActionHost, ChannelHost, HostEvent};
pub use types::*;
