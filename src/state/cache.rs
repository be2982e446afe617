use espn_api::League;
use futures_util::future::BoxFuture;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

// ---------------------------------------------------------------------------
// Keys, errors, snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Scoreboard,
    Teams,
    TeamDetail,
    GameSummary,
}

/// Identity of one cacheable fetch: (kind, league, optional entity id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub league: League,
    pub id: Option<String>,
}

impl ResourceKey {
    pub fn scoreboard(league: League) -> Self {
        Self { kind: ResourceKind::Scoreboard, league, id: None }
    }

    pub fn teams(league: League) -> Self {
        Self { kind: ResourceKind::Teams, league, id: None }
    }

    pub fn team_detail(league: League, team_id: &str) -> Self {
        Self { kind: ResourceKind::TeamDetail, league, id: Some(team_id.to_owned()) }
    }

    pub fn game_summary(league: League, game_id: &str) -> Self {
        Self { kind: ResourceKind::GameSummary, league, id: Some(game_id.to_owned()) }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.kind, self.league.slug())?;
        if let Some(id) = &self.id {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}

/// Errors captured in a cache entry. Cloned out to every reader of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure or non-2xx response, already rendered for display.
    Transport(String),
    /// A detail fetch ran without an entity id.
    MissingIdentifier(ResourceKind),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(message) => f.write_str(message),
            FetchError::MissingIdentifier(kind) => {
                write!(f, "{} requested without an id", kind.label())
            }
        }
    }
}

impl std::error::Error for FetchError {}

pub type FetchFuture<T> = BoxFuture<'static, Result<T, FetchError>>;
pub type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// Freshness window plus optional background refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub stale_after: Duration,
    pub refetch_every: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No id supplied; nothing was or will be fetched.
    Disabled,
    Pending,
    Fresh,
    Error,
}

#[derive(Debug)]
pub struct Snapshot<T> {
    pub status: Status,
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    pub fetched_at: Option<Instant>,
    /// A fetch is running for this key, possibly behind existing data.
    pub is_fetching: bool,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_fetching: self.is_fetching,
        }
    }
}

impl<T> Snapshot<T> {
    pub fn disabled() -> Self {
        Self {
            status: Status::Disabled,
            data: None,
            error: None,
            fetched_at: None,
            is_fetching: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Cache entries
// ---------------------------------------------------------------------------

struct Entry<T> {
    data: Option<Arc<T>>,
    error: Option<FetchError>,
    fetched_at: Option<Instant>,
    policy: Policy,
    fetch: FetchFn<T>,
    /// Bumped every time a fetch is initiated.
    generation: u64,
    /// Generation whose response may still be applied.
    in_flight: Option<u64>,
    invalidated: bool,
    subscribers: usize,
    refresher: Option<JoinHandle<()>>,
    revision: watch::Sender<u64>,
}

impl<T> Entry<T> {
    fn new(fetch: FetchFn<T>, policy: Policy) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            data: None,
            error: None,
            fetched_at: None,
            policy,
            fetch,
            generation: 0,
            in_flight: None,
            invalidated: false,
            subscribers: 0,
            refresher: None,
            revision,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.fetched_at {
            Some(at) => now.saturating_duration_since(at) >= self.policy.stale_after,
            None => true,
        }
    }

    /// Errored entries wait for an explicit trigger instead of refetching
    /// on every read.
    fn needs_fetch(&self, now: Instant) -> bool {
        self.in_flight.is_none()
            && self.error.is_none()
            && (self.invalidated || self.data.is_none() || self.is_stale(now))
    }

    /// Reads from a mounted consumer only fetch missing or invalidated data.
    /// Staleness is checked when a consumer subscribes, and the refresher
    /// owns periodic refetching.
    fn needs_fetch_on_read(&self, now: Instant) -> bool {
        if self.subscribers > 0 {
            return self.in_flight.is_none()
                && self.error.is_none()
                && (self.invalidated || self.data.is_none());
        }
        self.needs_fetch(now)
    }

    fn touch(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    fn snapshot(&self) -> Snapshot<T> {
        let status = if self.error.is_some() {
            Status::Error
        } else if self.data.is_some() {
            Status::Fresh
        } else {
            Status::Pending
        };
        Snapshot {
            status,
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_fetching: self.in_flight.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceCache
// ---------------------------------------------------------------------------

struct Shared<T> {
    entries: Mutex<HashMap<ResourceKey, Entry<T>>>,
    updates: Option<mpsc::UnboundedSender<ResourceKey>>,
}

/// Keyed, time-windowed cache of remote resources with at most one fetch in
/// flight per key. Cloning yields another handle to the same cache.
pub struct ResourceCache<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T: Send + Sync + 'static> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: Send + Sync + 'static> ResourceCache<T> {
    /// `updates` receives the key of every settled fetch and invalidation.
    pub fn new(updates: Option<mpsc::UnboundedSender<ResourceKey>>) -> Self {
        Self {
            shared: Arc::new(Shared { entries: Mutex::new(HashMap::new()), updates }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceKey, Entry<T>>> {
        self.shared.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, key: &ResourceKey) {
        if let Some(updates) = &self.shared.updates {
            let _ = updates.send(key.clone());
        }
    }

    /// Return the current state of `key`, starting a fetch when the entry is
    /// missing or invalidated, or past its freshness window while nobody is
    /// subscribed. Never blocks.
    pub fn get_or_fetch(&self, key: &ResourceKey, fetch: FetchFn<T>, policy: Policy) -> Snapshot<T> {
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(Arc::clone(&fetch), policy));
        entry.fetch = fetch;
        entry.policy = policy;

        if entry.needs_fetch_on_read(Instant::now()) {
            self.start_fetch(key, entry);
        }
        entry.snapshot()
    }

    /// Read-only view of `key`; never fetches.
    pub fn peek(&self, key: &ResourceKey) -> Option<Snapshot<T>> {
        self.lock().get(key).map(Entry::snapshot)
    }

    /// Register a consumer of `key`. The first consumer of a key whose policy
    /// has a refresh cadence starts the background refresh; dropping the last
    /// [`Subscription`] stops it. Subscribing retries an errored entry.
    pub fn subscribe(&self, key: &ResourceKey, fetch: FetchFn<T>, policy: Policy) -> Subscription {
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(Arc::clone(&fetch), policy));
        entry.fetch = fetch;
        entry.policy = policy;
        entry.subscribers += 1;

        if entry.error.is_some() && entry.in_flight.is_none() {
            debug!("retrying {key} on subscribe");
            entry.error = None;
            self.start_fetch(key, entry);
        } else if entry.needs_fetch(Instant::now()) {
            self.start_fetch(key, entry);
        }

        if let Some(every) = policy.refetch_every
            && entry.refresher.is_none()
        {
            debug!("starting auto-refresh for {key} every {}s", every.as_secs());
            entry.refresher = Some(self.spawn_refresher(key.clone(), every));
        }
        drop(entries);

        let cache = self.clone();
        let key = key.clone();
        Subscription::new(move || cache.release(&key))
    }

    /// Force the next access to refetch. The in-flight fetch, if any, is
    /// detached and its response discarded. The payload stays readable
    /// until a new one replaces it.
    pub fn invalidate(&self, key: &ResourceKey) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if let Some(generation) = entry.in_flight.take() {
            debug!("detached generation {generation} of {key}");
        }
        entry.invalidated = true;
        entry.error = None;
        entry.touch();
        drop(entries);
        self.notify(key);
    }

    /// Invalidate and immediately refetch with the last registered fetch
    /// function. Returns false when the key was never requested.
    pub fn refetch(&self, key: &ResourceKey) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        entry.in_flight = None;
        entry.error = None;
        self.start_fetch(key, entry);
        true
    }

    /// Wait until `key` has no fetch in flight and return its state. Every
    /// concurrent waiter observes the same settled result.
    #[cfg(test)]
    pub async fn settled(&self, key: &ResourceKey) -> Option<Snapshot<T>> {
        loop {
            let mut revisions = {
                let entries = self.lock();
                let entry = entries.get(key)?;
                if entry.in_flight.is_none() {
                    return Some(entry.snapshot());
                }
                entry.revision.subscribe()
            };
            if revisions.changed().await.is_err() {
                return self.peek(key);
            }
        }
    }

    /// Tick of the background refresher: refetch regardless of freshness,
    /// unless a fetch is already running.
    fn refresh(&self, key: &ResourceKey) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key)
            && entry.in_flight.is_none()
        {
            self.start_fetch(key, entry);
        }
    }

    fn start_fetch(&self, key: &ResourceKey, entry: &mut Entry<T>) {
        entry.generation += 1;
        let generation = entry.generation;
        entry.in_flight = Some(generation);
        entry.invalidated = false;
        entry.touch();
        debug!("fetching {key} (generation {generation})");

        let future = (entry.fetch)();
        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = future.await;
            cache.apply(&key, generation, result);
        });
    }

    fn apply(&self, key: &ResourceKey, generation: u64, result: Result<T, FetchError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.in_flight != Some(generation) {
            trace!("dropping superseded response for {key} (generation {generation})");
            return;
        }

        entry.in_flight = None;
        match result {
            Ok(data) => {
                debug!("{key} fresh (generation {generation})");
                entry.data = Some(Arc::new(data));
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
            }
            Err(err) => {
                warn!("{key} failed: {err}");
                entry.data = None;
                entry.error = Some(err);
            }
        }
        entry.touch();
        drop(entries);
        self.notify(key);
    }

    fn spawn_refresher(&self, key: ResourceKey, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!("auto-refresh tick for {key}");
                cache.refresh(&key);
            }
        })
    }

    fn release(&self, key: &ResourceKey) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0
            && let Some(refresher) = entry.refresher.take()
        {
            debug!("stopping auto-refresh for {key}");
            refresher.abort();
        }
        prune_expired(&mut entries, Instant::now());
    }

    #[cfg(test)]
    fn subscribers(&self, key: &ResourceKey) -> usize {
        self.lock().get(key).map_or(0, |e| e.subscribers)
    }

    #[cfg(test)]
    fn is_refreshing(&self, key: &ResourceKey) -> bool {
        self.lock().get(key).is_some_and(|e| e.refresher.is_some())
    }
}

// ---------------------------------------------------------------------------
// Subscription guard
// ---------------------------------------------------------------------------

/// Reference-counted interest in a cache key. Dropping it releases the key.
#[must_use = "dropping a subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Drop per-entity entries nobody watches once they are past their window.
/// A later open refetches them anyway.
fn prune_expired<T>(entries: &mut HashMap<ResourceKey, Entry<T>>, now: Instant) {
    entries.retain(|key, entry| {
        let expired = key.id.is_some()
            && entry.subscribers == 0
            && entry.in_flight.is_none()
            && (entry.error.is_some() || entry.is_stale(now));
        if expired {
            trace!("evicting {key}");
        }
        !expired
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    const POLICY: Policy = Policy {
        stale_after: Duration::from_secs(60),
        refetch_every: None,
    };

    const REFRESHING: Policy = Policy {
        stale_after: Duration::from_secs(60),
        refetch_every: Some(Duration::from_secs(60)),
    };

    fn key() -> ResourceKey {
        ResourceKey::scoreboard(League::Nba)
    }

    /// Fetch function that counts invocations and resolves to the call
    /// number after `delay`.
    fn counting(delay: Duration) -> (Arc<AtomicUsize>, FetchFn<usize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetch: FetchFn<usize> = Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                sleep(delay).await;
                Ok(n)
            }
            .boxed()
        });
        (calls, fetch)
    }

    fn failing() -> (Arc<AtomicUsize>, FetchFn<usize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetch: FetchFn<usize> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Transport("Failed to fetch scoreboard: Bad Gateway".into())) }
                .boxed()
        });
        (calls, fetch)
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_share_one_fetch() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::from_secs(1));

        for _ in 0..5 {
            let snap = cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
            assert_eq!(snap.status, Status::Pending);
            assert!(snap.is_fetching);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let k = key();
        let (a, b) = tokio::join!(cache.settled(&k), cache.settled(&k));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.status, Status::Fresh);
        assert!(Arc::ptr_eq(a.data.as_ref().unwrap(), b.data.as_ref().unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_response_is_discarded() {
        let cache = ResourceCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        // First fetch is slow and returns "old", the second is quick.
        let fetch: FetchFn<&'static str> = Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    sleep(Duration::from_secs(5)).await;
                    Ok("old")
                } else {
                    sleep(Duration::from_secs(1)).await;
                    Ok("new")
                }
            }
            .boxed()
        });

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert!(cache.refetch(&key()));

        let snap = cache.settled(&key()).await.unwrap();
        assert_eq!(snap.data.as_deref(), Some(&"new"));

        sleep(Duration::from_secs(10)).await;
        let snap = cache.peek(&key()).unwrap();
        assert_eq!(snap.data.as_deref(), Some(&"new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn freshness_window_is_respected() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::ZERO);

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        cache.settled(&key()).await;

        sleep(Duration::from_secs(30)).await;
        let snap = cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(snap.status, Status::Fresh);
        assert!(!snap.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(31)).await;
        let snap = cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Old payload stays visible while the refresh runs.
        assert_eq!(snap.status, Status::Fresh);
        assert!(snap.is_fetching);
        assert_eq!(snap.data.as_deref(), Some(&1));

        let snap = cache.settled(&key()).await.unwrap();
        assert_eq!(snap.data.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn error_discards_payload_and_waits_for_retry() {
        let cache = ResourceCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetch: FetchFn<usize> = Arc::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match n {
                    0 => Ok(7),
                    _ => Err(FetchError::Transport("Failed to fetch teams: Not Found".into())),
                }
            }
            .boxed()
        });

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(cache.settled(&key()).await.unwrap().data.as_deref(), Some(&7));

        cache.refetch(&key());
        let snap = cache.settled(&key()).await.unwrap();
        assert_eq!(snap.status, Status::Error);
        assert!(snap.data.is_none());
        assert_eq!(
            snap.error.map(|e| e.to_string()).as_deref(),
            Some("Failed to fetch teams: Not Found")
        );

        // Plain reads do not hammer a failing endpoint.
        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.refetch(&key());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_next_access_to_refetch() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::ZERO);

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        cache.settled(&key()).await;

        cache.invalidate(&key());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "invalidate alone does not fetch");
        assert_eq!(cache.peek(&key()).unwrap().data.as_deref(), Some(&1));

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_detaches_in_flight_fetch() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::from_secs(5));

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        cache.invalidate(&key());
        sleep(Duration::from_secs(6)).await;

        let snap = cache.peek(&key()).unwrap();
        assert!(snap.data.is_none(), "detached response must not land");
        assert_eq!(snap.status, Status::Pending);
        assert!(!snap.is_fetching);

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        let snap = cache.settled(&key()).await.unwrap();
        assert_eq!(snap.data.as_deref(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_runs_while_subscribed() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::ZERO);

        let first = cache.subscribe(&key(), Arc::clone(&fetch), REFRESHING);
        let second = cache.subscribe(&key(), Arc::clone(&fetch), REFRESHING);
        assert_eq!(cache.subscribers(&key()), 2);
        cache.settled(&key()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(61)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(first);
        assert!(cache.is_refreshing(&key()));
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        drop(second);
        assert!(!cache.is_refreshing(&key()));
        sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_survives_errors() {
        let cache = ResourceCache::default();
        let (calls, fetch) = failing();

        let _sub = cache.subscribe(&key(), fetch, REFRESHING);
        let snap = cache.settled(&key()).await.unwrap();
        assert_eq!(snap.status, Status::Error);

        sleep(Duration::from_secs(61)).await;
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.peek(&key()).unwrap().status, Status::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribing_retries_an_errored_entry() {
        let cache = ResourceCache::default();
        let (calls, fetch) = failing();

        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        cache.settled(&key()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let _sub = cache.subscribe(&key(), fetch, POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_changes_are_announced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cache = ResourceCache::new(Some(tx));
        let (_, fetch) = counting(Duration::ZERO);

        cache.get_or_fetch(&key(), fetch, POLICY);
        assert_eq!(rx.recv().await, Some(key()));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribed_reads_leave_stale_data_alone() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::ZERO);

        let sub = cache.subscribe(&key(), Arc::clone(&fetch), POLICY);
        cache.settled(&key()).await;
        for _ in 0..150 {
            sleep(Duration::from_secs(1)).await;
            let snap = cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
            assert_eq!(snap.status, Status::Fresh);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Invalidation still reaches a mounted consumer.
        cache.invalidate(&key());
        cache.get_or_fetch(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        cache.settled(&key()).await;

        // Re-subscribing after the window is the refetch trigger.
        drop(sub);
        sleep(Duration::from_secs(61)).await;
        let _sub = cache.subscribe(&key(), Arc::clone(&fetch), POLICY);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn released_detail_entries_are_evicted_after_their_window() {
        let cache = ResourceCache::default();
        let (calls, fetch) = counting(Duration::ZERO);
        let first = ResourceKey::game_summary(League::Nba, "g1");
        let second = ResourceKey::game_summary(League::Nba, "g2");

        drop(cache.subscribe(&first, Arc::clone(&fetch), POLICY));
        cache.settled(&first).await;
        drop(cache.subscribe(&second, Arc::clone(&fetch), POLICY));
        assert!(cache.peek(&first).is_some(), "kept inside its window");

        sleep(Duration::from_secs(61)).await;
        drop(cache.subscribe(&second, Arc::clone(&fetch), POLICY));
        assert!(cache.peek(&first).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // Keys without an id are never evicted.
        drop(cache.subscribe(&key(), Arc::clone(&fetch), POLICY));
        cache.settled(&key()).await;
        sleep(Duration::from_secs(61)).await;
        drop(cache.subscribe(&second, Arc::clone(&fetch), POLICY));
        assert!(cache.peek(&key()).is_some());
    }

    #[test]
    fn keys_render_kind_league_and_id() {
        assert_eq!(ResourceKey::teams(League::Nfl).to_string(), "Teams/nfl");
        assert_eq!(
            ResourceKey::game_summary(League::Nba, "401").to_string(),
            "GameSummary/nba/401"
        );
        assert_ne!(
            ResourceKey::scoreboard(League::Nba),
            ResourceKey::scoreboard(League::Nfl)
        );
    }
}
