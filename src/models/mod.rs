//! Domain models for resolved places.

mod metadata;
mod place;
mod provenance;

pub use metadata::{Atmosphere, PriceLevel};
pub use place::{Contact, Features, Place, Review, UNKNOWN_RATING};
pub use provenance::{PlaceSource, ProviderSource};
