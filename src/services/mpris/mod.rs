/// Track metadata extraction
pub mod metadata;
/// MPRIS player provider
pub mod provider;
/// D-Bus proxy trait definitions
pub mod proxy;

pub use metadata::TrackInfo;
pub use provider::{MPRIS_BUS_PREFIX, MprisProvider, bus_name};
pub use proxy::*;
