/// MPRIS media player provider
pub mod mpris;

pub use mpris::MprisProvider;
