use crate::models::{ParkingSpot, SearchCriteria};
use chrono::{DateTime, Utc};

/// Everything the form shows: the inputs, and the outcome of the latest search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub criteria: SearchCriteria,
    /// Spots from the last successful search
    pub spots: Vec<ParkingSpot>,
    /// Message from the last failed search, cleared when a new one starts
    pub error: Option<String>,
    /// True from submission until the search resolves
    pub loading: bool,
    /// When the last search resolved, either way
    pub last_searched_at: Option<DateTime<Utc>>,
}

impl SearchState {
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.loading
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, spots: Vec<ParkingSpot>) {
        self.spots = spots;
        self.error = None;
        self.loading = false;
        self.last_searched_at = Some(Utc::now());
    }

    /// Previous spots stay as they were
    pub(crate) fn fail(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
        self.last_searched_at = Some(Utc::now());
    }

    pub(crate) fn abandon(&mut self) {
        self.loading = false;
    }
}
