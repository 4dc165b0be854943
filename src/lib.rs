pub mod feed;
pub mod journey;
pub mod repository;
pub mod shared;
pub mod store;

pub mod prelude {
    pub use crate::feed::{Extraction, FeedArchive};
    pub use crate::journey::{ItineraryOption, Plan, Planner, SearchConfig};
    pub use crate::repository::{Departure, DepartureIndex, NearbyStop, Repository, Stop};
    pub use crate::shared::{Coordinate, Distance, Duration, Time};
    pub use crate::store::Store;
}
