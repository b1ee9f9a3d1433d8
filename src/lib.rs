pub mod config;
pub mod error;
pub mod finder;
pub mod models;
pub mod render;
pub mod service;

pub use config::FinderConfig;
pub use error::{FinderError, SearchError};
pub use finder::{ParkingFinder, SearchState};
pub use models::{Field, ParkingSpot, ParkingType, SearchCriteria};
pub use service::{ErrorMessageStrategy, HttpParkingService, ParkingService};
