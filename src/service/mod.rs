pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpParkingService;
pub use traits::ParkingService;
pub use types::{ErrorMessageStrategy, DEFAULT_ENDPOINT, GENERIC_ERROR_MESSAGE};
