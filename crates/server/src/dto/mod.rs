mod departure;
mod itinerary;
mod stop;

pub use departure::*;
pub use itinerary::*;
pub use stop::*;
