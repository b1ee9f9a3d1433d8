pub mod state;

pub use state::SearchState;

use crate::config::FinderConfig;
use crate::error::{FinderError, SearchError};
use crate::models::{Field, ParkingSpot, ParkingType, SearchCriteria};
use crate::service::{ErrorMessageStrategy, HttpParkingService, ParkingService};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Parking search form bound to one parking service
///
/// Field edits and search results are published through a watch channel, so a
/// front-end can [`subscribe`](ParkingFinder::subscribe) and redraw on change.
/// Starting a search while another is in flight aborts the older one; only the
/// most recently submitted search can write its outcome into the state.
pub struct ParkingFinder {
    service: Arc<dyn ParkingService>,
    error_messages: ErrorMessageStrategy,
    state: Arc<watch::Sender<SearchState>>,
    generation: Arc<AtomicU64>,
    in_flight: Option<AbortHandle>,
}

impl ParkingFinder {
    /// Create a finder over any parking service
    pub fn new(service: Arc<dyn ParkingService>, config: &FinderConfig) -> Self {
        let criteria = match &config.default_city {
            Some(city) => SearchCriteria::with_city(city.clone()),
            None => SearchCriteria::default(),
        };
        let (state, _) = watch::channel(SearchState::new(criteria));

        Self {
            service,
            error_messages: config.error_messages,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
        }
    }

    /// Create a finder that talks HTTP to the configured endpoint
    pub fn from_config(config: &FinderConfig) -> anyhow::Result<Self> {
        let service = HttpParkingService::from_config(config)?;
        Ok(Self::new(Arc::new(service), config))
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn criteria(&self) -> SearchCriteria {
        self.state.borrow().criteria.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receiver that is marked changed on every state update
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Set one form field. Allowed while a search is running; that search
    /// keeps the criteria it was started with.
    pub fn update_field(&self, field: Field, value: &str) -> Result<(), FinderError> {
        let parking_type: Option<ParkingType> = match field {
            Field::ParkingType => Some(value.parse()?),
            _ => None,
        };

        self.state.send_modify(|state| {
            let criteria = &mut state.criteria;
            match field {
                Field::City => criteria.city = value.to_string(),
                Field::Location => criteria.location = value.to_string(),
                Field::ParkingLength => criteria.parking_length = value.to_string(),
                Field::ParkingTime => criteria.parking_time = value.to_string(),
                Field::ParkingType => {
                    if let Some(parking_type) = parking_type {
                        criteria.parking_type = parking_type;
                    }
                }
            }
        });
        debug!("Field {} set to {:?}", field.name(), value);
        Ok(())
    }

    /// Set a form field by its name (`city`, `parkingType`, ...)
    pub fn set_field(&self, name: &str, value: &str) -> Result<(), FinderError> {
        self.update_field(name.parse()?, value)
    }

    /// Start a search with the current criteria in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// completes once the outcome is in the state, or reports cancellation if
    /// a later `submit` or `cancel` aborted it.
    pub fn submit(&mut self) -> JoinHandle<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                info!("Aborting previous search");
            }
            previous.abort();
        }

        let mut criteria = SearchCriteria::default();
        self.state.send_modify(|state| {
            state.begin();
            criteria = state.criteria.clone();
        });
        info!(
            "🔍 Searching {} for {} parking in {:?}",
            self.service.endpoint(),
            criteria.parking_type,
            criteria.city
        );

        let service = Arc::clone(&self.service);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let error_messages = self.error_messages;

        let handle = tokio::spawn(async move {
            let outcome = service.search(&criteria).await;
            settle(&state, &current, generation, outcome, error_messages);
        });

        self.in_flight = Some(handle.abort_handle());
        handle
    }

    /// Run a search and wait until it resolves
    pub async fn search(&mut self) -> SearchState {
        let handle = self.submit();
        if let Err(err) = handle.await {
            warn!("Search task did not complete: {}", err);
        }
        self.state()
    }

    /// Abort a running search. Spots and error stay as they were.
    /// Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        if !self.is_loading() {
            return false;
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        in_flight.abort();
        self.state.send_modify(|state| state.abandon());
        info!("Search cancelled");
        true
    }
}

/// Write a finished search into the state unless a newer search or a cancel
/// has moved the generation on. Returns whether the state changed.
fn settle(
    state: &watch::Sender<SearchState>,
    current: &AtomicU64,
    generation: u64,
    outcome: Result<Vec<ParkingSpot>, SearchError>,
    error_messages: ErrorMessageStrategy,
) -> bool {
    state.send_if_modified(|state| {
        if current.load(Ordering::SeqCst) != generation {
            debug!("Dropping result of superseded search #{}", generation);
            return false;
        }
        match outcome {
            Ok(spots) => {
                info!("✅ Found {} parking spots", spots.len());
                state.succeed(spots);
            }
            Err(err) => {
                warn!("Parking search failed: {}", err);
                state.fail(error_messages.message_for(&err));
            }
        }
        true
    })
}

impl Drop for ParkingFinder {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::GENERIC_ERROR_MESSAGE;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    enum Reply {
        Spots(Vec<ParkingSpot>),
        Status(u16),
        Decode,
        After(Arc<Notify>, Vec<ParkingSpot>),
        Hang,
    }

    #[derive(Default)]
    struct FakeService {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<SearchCriteria>>,
    }

    impl FakeService {
        fn replying(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::default(),
            })
        }

        fn calls(&self) -> Vec<SearchCriteria> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ParkingService for FakeService {
        async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ParkingSpot>, SearchError> {
            self.calls.lock().unwrap().push(criteria.clone());
            let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Hang);
            match reply {
                Reply::Spots(spots) => Ok(spots),
                Reply::Status(code) => Err(SearchError::Status(StatusCode::from_u16(code).unwrap())),
                Reply::Decode => Err(SearchError::Decode(
                    serde_json::from_str::<u8>("not json").unwrap_err(),
                )),
                Reply::After(notify, spots) => {
                    notify.notified().await;
                    Ok(spots)
                }
                Reply::Hang => std::future::pending::<Result<Vec<ParkingSpot>, SearchError>>().await,
            }
        }

        fn endpoint(&self) -> &str {
            "fake://parking"
        }
    }

    fn spot(address: &str) -> ParkingSpot {
        ParkingSpot {
            address: address.to_string(),
            free: true,
            rules: "2hr max".to_string(),
            distance_km: None,
        }
    }

    async fn wait_for_calls(service: &FakeService, count: usize) {
        while service.calls().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn finder(service: &Arc<FakeService>, config: &FinderConfig) -> ParkingFinder {
        ParkingFinder::new(service.clone(), config)
    }

    #[tokio::test]
    async fn initial_state_uses_defaults() {
        let service = FakeService::replying(vec![]);
        let plain = finder(&service, &FinderConfig::default());
        assert_eq!(plain.criteria(), SearchCriteria::default());
        assert!(plain.state().is_idle());

        let config = FinderConfig {
            default_city: Some("Sydney".to_string()),
            ..FinderConfig::default()
        };
        let sydney = finder(&service, &config);
        assert_eq!(sydney.criteria().city, "Sydney");
        assert_eq!(sydney.criteria().parking_type, ParkingType::Any);
    }

    #[tokio::test]
    async fn update_field_sets_value_and_notifies() {
        let service = FakeService::replying(vec![]);
        let finder = finder(&service, &FinderConfig::default());
        let mut rx = finder.subscribe();

        finder.update_field(Field::Location, "474 Darling St").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().criteria.location, "474 Darling St");

        finder.set_field("parkingType", "paid").unwrap();
        finder.set_field("parkingLength", "90").unwrap();
        finder.set_field("parking_time", "07:45").unwrap();
        let criteria = finder.criteria();
        assert_eq!(criteria.parking_type, ParkingType::Paid);
        assert_eq!(criteria.parking_length, "90");
        assert_eq!(criteria.parking_time, "07:45");
    }

    #[tokio::test]
    async fn bad_edits_leave_criteria_alone() {
        let service = FakeService::replying(vec![]);
        let finder = finder(&service, &FinderConfig::default());

        assert_eq!(
            finder.set_field("price", "10"),
            Err(FinderError::UnknownField("price".to_string()))
        );
        assert!(finder.update_field(Field::ParkingType, "cheap").is_err());
        assert_eq!(finder.criteria(), SearchCriteria::default());
    }

    #[tokio::test]
    async fn success_fills_spots() {
        let service = FakeService::replying(vec![Reply::Spots(vec![spot("A")])]);
        let mut finder = finder(&service, &FinderConfig::default());
        finder.set_field("city", "Sydney").unwrap();

        let state = finder.search().await;

        assert_eq!(state.spots, vec![spot("A")]);
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert!(state.last_searched_at.is_some());
        assert_eq!(service.calls(), vec![SearchCriteria::with_city("Sydney")]);
    }

    #[tokio::test]
    async fn empty_criteria_are_sent_as_is() {
        let service = FakeService::replying(vec![Reply::Spots(vec![])]);
        let mut finder = finder(&service, &FinderConfig::default());

        let state = finder.search().await;

        assert!(state.spots.is_empty());
        assert_eq!(state.error, None);
        assert_eq!(service.calls(), vec![SearchCriteria::default()]);
    }

    #[tokio::test]
    async fn loading_only_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::replying(vec![Reply::After(gate.clone(), vec![spot("A")])]);
        let mut finder = finder(&service, &FinderConfig::default());

        let handle = finder.submit();
        assert!(finder.is_loading());

        gate.notify_one();
        handle.await.unwrap();
        assert!(!finder.is_loading());
        assert_eq!(finder.state().spots.len(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_previous_spots() {
        let service = FakeService::replying(vec![
            Reply::Spots(vec![spot("A"), spot("B")]),
            Reply::Status(500),
        ]);
        let mut finder = finder(&service, &FinderConfig::default());

        finder.search().await;
        let state = finder.search().await;

        assert_eq!(state.error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
        assert_eq!(state.spots, vec![spot("A"), spot("B")]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn status_derived_messages() {
        let service = FakeService::replying(vec![Reply::Status(502), Reply::Decode]);
        let config = FinderConfig {
            error_messages: ErrorMessageStrategy::StatusDerived,
            ..FinderConfig::default()
        };
        let mut finder = finder(&service, &config);

        let state = finder.search().await;
        assert_eq!(state.error.as_deref(), Some("HTTP error: 502"));

        let state = finder.search().await;
        assert_eq!(state.error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn next_success_clears_error() {
        let service = FakeService::replying(vec![Reply::Status(500), Reply::Spots(vec![spot("C")])]);
        let mut finder = finder(&service, &FinderConfig::default());

        assert!(finder.search().await.error.is_some());
        let state = finder.search().await;
        assert_eq!(state.error, None);
        assert_eq!(state.spots, vec![spot("C")]);
    }

    #[tokio::test]
    async fn resubmitting_aborts_the_running_search() {
        let service = FakeService::replying(vec![Reply::Hang, Reply::Spots(vec![spot("B")])]);
        let mut finder = finder(&service, &FinderConfig::default());

        let first = finder.submit();
        wait_for_calls(&service, 1).await;
        let second = finder.submit();

        assert!(first.await.unwrap_err().is_cancelled());
        second.await.unwrap();

        let state = finder.state();
        assert_eq!(state.spots, vec![spot("B")]);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn aborted_search_leaves_newer_result() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::replying(vec![
            Reply::After(gate.clone(), vec![spot("old")]),
            Reply::Spots(vec![spot("new")]),
        ]);
        let mut finder = finder(&service, &FinderConfig::default());

        let first = finder.submit();
        wait_for_calls(&service, 1).await;
        let state = finder.search().await;
        gate.notify_one();

        assert!(first.await.unwrap_err().is_cancelled());
        assert_eq!(state.spots, vec![spot("new")]);
        assert_eq!(finder.state().spots, vec![spot("new")]);
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let (state, _) = watch::channel(SearchState::default());
        state.send_modify(|state| {
            state.begin();
            state.succeed(vec![spot("new")]);
            state.begin();
        });
        let current = AtomicU64::new(3);

        let changed = settle(
            &state,
            &current,
            2,
            Ok(vec![spot("old")]),
            ErrorMessageStrategy::Generic,
        );
        assert!(!changed);
        assert_eq!(state.borrow().spots, vec![spot("new")]);
        assert!(state.borrow().loading);

        let stale_failure = settle(
            &state,
            &current,
            2,
            Err(SearchError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
            ErrorMessageStrategy::Generic,
        );
        assert!(!stale_failure);
        assert_eq!(state.borrow().error, None);

        let changed = settle(
            &state,
            &current,
            3,
            Ok(vec![spot("latest")]),
            ErrorMessageStrategy::Generic,
        );
        assert!(changed);
        assert_eq!(state.borrow().spots, vec![spot("latest")]);
        assert!(!state.borrow().loading);
    }

    #[tokio::test]
    async fn cancel_returns_to_idle() {
        let service = FakeService::replying(vec![Reply::Spots(vec![spot("A")]), Reply::Hang]);
        let mut finder = finder(&service, &FinderConfig::default());
        finder.search().await;

        assert!(!finder.cancel());

        let handle = finder.submit();
        assert!(finder.cancel());
        assert!(handle.await.unwrap_err().is_cancelled());

        let state = finder.state();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.spots, vec![spot("A")]);
    }

    #[tokio::test]
    async fn repeated_search_settles_the_same_way() {
        let service = FakeService::replying(vec![
            Reply::Spots(vec![spot("A")]),
            Reply::Spots(vec![spot("A")]),
        ]);
        let mut finder = finder(&service, &FinderConfig::default());
        finder.set_field("city", "Sydney").unwrap();

        let first = finder.search().await;
        let second = finder.search().await;

        assert_eq!(first.spots, second.spots);
        assert_eq!(first.error, second.error);
        assert_eq!(first.loading, second.loading);
        assert_eq!(first.criteria, second.criteria);
        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn edits_during_search_do_not_change_request() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::replying(vec![Reply::After(gate.clone(), vec![])]);
        let mut finder = finder(&service, &FinderConfig::default());
        finder.set_field("city", "Sydney").unwrap();

        let handle = finder.submit();
        finder.set_field("city", "Melbourne").unwrap();
        gate.notify_one();
        handle.await.unwrap();

        assert_eq!(service.calls()[0].city, "Sydney");
        assert_eq!(finder.criteria().city, "Melbourne");
    }
}
