//! Grove RGB LCD logical device
//!
//! Split by concern:
//!
//! - [`reg`]: bus addresses and register maps for both chips
//! - [`transport`]: serialized register transactions on the shared bus
//! - [`backlight`]: one-time backlight bring-up at attach
//! - [`device`]: attach/detach lifecycle and exclusive sessions

pub mod backlight;
pub mod device;
pub mod reg;
pub mod transport;

#[cfg(test)]
mod mock;

pub use backlight::BacklightConfig;
pub use device::{GroveLcd, Session};
pub use reg::Target;
pub use transport::{Transaction, TransportError};
