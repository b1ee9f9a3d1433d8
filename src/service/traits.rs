use crate::error::SearchError;
use crate::models::{ParkingSpot, SearchCriteria};
use async_trait::async_trait;

/// Backend that answers parking searches
/// The finder only talks to this, so tests and other transports can stand in for HTTP
#[async_trait]
pub trait ParkingService: Send + Sync {
    /// Run one search and return the spots in the order the service sent them
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ParkingSpot>, SearchError>;

    /// Where searches are sent, for logging
    fn endpoint(&self) -> &str;
}
