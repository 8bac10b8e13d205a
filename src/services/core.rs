//! Generic dispatch core shared by every service call
//!
//! A [`CallCore`] owns everything one backend capability needs to turn field
//! changes into at most one well-timed request: the trigger policy, the
//! defer flag with its single stashed query, the one cancellable debounce
//! timer, and a sequence counter that keeps superseded in-flight responses
//! from reaching the callbacks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{Callbacks, ServiceSettings};
use crate::error::{AppError, Result};
use crate::query::{FieldChange, Query, QueryField, SharedQuery, TriggerPolicy};

use super::transport::{CacheMode, CredentialsMode, HttpMethod, RequestInit, Transport};
use crate::auth::AuthToken;

/// Internal side-effect hook invoked with every successful payload, before
/// and regardless of the success callback. Used by the authentication call
/// to store the received token.
pub(crate) type PayloadHook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Shared collaborators handed to every service call at construction.
#[derive(Clone)]
pub(crate) struct ServiceDeps {
    pub query: SharedQuery,
    pub auth: AuthToken,
    pub transport: Arc<dyn Transport>,
}

/// Fan-out interface the client facade uses to reach every constructed call
/// uniformly.
pub(crate) trait QueryObserver: Send + Sync {
    fn query_changed(&self, change: &FieldChange);
    fn defer_updates(&self, state: bool, skip_pending: bool);
    fn clear_pending(&self);
}

struct DispatchState {
    /// While set, triggered updates are stashed instead of dispatched
    defer: bool,

    /// The single pending deferred query, last write wins
    deferred: Option<Query>,

    /// The one scheduled-but-not-yet-fired debounce task
    timer: Option<JoinHandle<()>>,
}

pub(crate) struct CallCore<T> {
    name: &'static str,
    endpoint: Url,
    enabled: bool,
    delay: Option<Duration>,
    trigger: TriggerPolicy,
    callbacks: Callbacks<T>,
    on_payload: Option<PayloadHook<T>>,
    build_params: fn(&mut Url, &Query),
    deps: ServiceDeps,
    state: Mutex<DispatchState>,
    seq: AtomicU64,
}

impl<T> CallCore<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub(crate) fn new(
        name: &'static str,
        base: &Url,
        settings: ServiceSettings<T>,
        deps: ServiceDeps,
        build_params: fn(&mut Url, &Query),
        on_payload: Option<PayloadHook<T>>,
    ) -> Result<Arc<Self>> {
        let endpoint = base
            .join(&settings.path)
            .map_err(|e| AppError::Validation(format!("Bad endpoint path '{}': {}", settings.path, e)))?;

        Ok(Arc::new(Self {
            name,
            endpoint,
            enabled: settings.enabled,
            delay: settings.delay,
            trigger: settings.trigger,
            callbacks: settings.callbacks,
            on_payload,
            build_params,
            deps,
            state: Mutex::new(DispatchState {
                defer: false,
                deferred: None,
                timer: None,
            }),
            seq: AtomicU64::new(0),
        }))
    }

    /// Whether a flushed or forced update would actually run: the service is
    /// enabled and someone listens for results.
    pub(crate) fn should_update(&self) -> bool {
        self.enabled && self.callbacks.success.is_some()
    }

    pub(crate) fn defer_state(&self) -> bool {
        self.state.lock().defer
    }

    /// Map an applied field mutation through the trigger policy.
    pub(crate) fn query_changed(self: &Arc<Self>, change: &FieldChange) {
        if !self.enabled {
            return;
        }
        let decision = {
            let query = self.deps.query.read();
            self.trigger.condition(change.field()).decide(&query, self.delay)
        };
        let Some(delay) = decision else { return };

        debug!(
            service = self.name,
            field = %change.field(),
            delay_ms = delay.as_millis() as u64,
            "Field change triggered update"
        );

        // A pure page flip keeps its page; every other trigger restarts
        // paging at the first page.
        let use_existing_page = change.field() == QueryField::MatchPage;
        self.request_update(delay, use_existing_page, false);
    }

    /// Dispatch immediately with the live query, bypassing trigger
    /// evaluation. Respects the defer flag.
    pub(crate) fn update(self: &Arc<Self>) {
        self.request_update(Duration::ZERO, false, false);
    }

    /// Like [`update`](Self::update) with all callbacks suppressed, for
    /// composite operations that chain calls.
    pub(crate) fn update_suppressing_callbacks(self: &Arc<Self>) {
        self.request_update(Duration::ZERO, false, true);
    }

    fn request_update(self: &Arc<Self>, delay: Duration, use_existing_page: bool, suppress: bool) {
        if !use_existing_page {
            self.deps.query.write().match_page = 1;
        }

        let mut state = self.state.lock();
        if state.defer {
            state.deferred = Some(self.deps.query.read().clone());
            return;
        }

        // Only the most recent trigger within the delay window dispatches.
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        if delay.is_zero() {
            drop(state);
            let snapshot = self.deps.query.read().clone();
            self.dispatch(snapshot, suppress);
        } else {
            let core = Arc::clone(self);
            state.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let snapshot = core.deps.query.read().clone();
                core.dispatch(snapshot, suppress);
            }));
        }
    }

    /// Toggle deferring. Turning it off takes the stashed query; unless
    /// `skip_pending`, a stash from a call that [`should_update`] dispatches
    /// immediately. The stash is cleared either way.
    ///
    /// [`should_update`]: Self::should_update
    pub(crate) fn defer_updates(self: &Arc<Self>, state: bool, skip_pending: bool) {
        let pending = {
            let mut dispatch_state = self.state.lock();
            dispatch_state.defer = state;
            if state {
                None
            } else {
                dispatch_state.deferred.take()
            }
        };

        if let Some(mut query) = pending {
            if !skip_pending && self.should_update() {
                // Flushing is a fresh update: paging restarts.
                query.match_page = 1;
                self.deps.query.write().match_page = 1;
                self.dispatch(query, false);
            } else {
                debug!(service = self.name, skip_pending, "Discarded pending deferred update");
            }
        }
    }

    /// Drop any scheduled or stashed work without dispatching.
    pub(crate) fn clear_pending(&self) {
        let mut state = self.state.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.deferred = None;
    }

    /// Request descriptor for this call, with the shared token attached when
    /// present.
    fn request_object(&self) -> RequestInit {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.deps.auth.get() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        RequestInit {
            method: HttpMethod::Get,
            headers,
            credentials: CredentialsMode::Include,
            cache: CacheMode::Default,
        }
    }

    fn dispatch(self: &Arc<Self>, query: Query, suppress: bool) {
        let mut url = self.endpoint.clone();
        (self.build_params)(&mut url, &query);
        let request = self.request_object();

        if !suppress {
            if let Some(cb) = &self.callbacks.request {
                if !cb(&url, &request) {
                    debug!(service = self.name, url = %url, "Request vetoed by callback");
                    return;
                }
            }
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let core = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = core
                .deps
                .transport
                .execute(&url, &request)
                .await
                .and_then(|body| serde_json::from_value::<T>(body).map_err(AppError::from));

            // Another request for this call was issued while this one was in
            // flight; the newer one owns the callbacks.
            if core.seq.load(Ordering::SeqCst) != seq {
                debug!(service = core.name, seq, "Dropping superseded response");
                return;
            }

            match outcome {
                Ok(payload) => {
                    if let Some(hook) = &core.on_payload {
                        hook(&payload);
                    }
                    if !suppress {
                        if let Some(cb) = &core.callbacks.success {
                            cb(&payload);
                        }
                    }
                }
                Err(error) => {
                    warn!(
                        service = core.name,
                        url = %url,
                        error = %error,
                        "Service call failed"
                    );
                    if !suppress {
                        if let Some(cb) = &core.callbacks.error {
                            cb(&error);
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::query::{self, TriggerCondition};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Transport that records every URL it is asked for and answers with a
    /// canned payload after an optional per-call pause.
    struct RecordingTransport {
        urls: Mutex<Vec<Url>>,
        payload: serde_json::Value,
        pauses: Mutex<Vec<Duration>>,
        calls: AtomicUsize,
    }

    impl RecordingTransport {
        fn new(payload: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                urls: Mutex::new(Vec::new()),
                payload,
                pauses: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn with_pauses(payload: serde_json::Value, pauses: Vec<Duration>) -> Arc<Self> {
            let transport = Self::new(payload);
            *transport.pauses.lock() = pauses;
            transport
        }

        fn call_count(&self) -> usize {
            self.urls.lock().len()
        }

        fn last_url(&self) -> Option<Url> {
            self.urls.lock().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, url: &Url, _request: &RequestInit) -> crate::error::Result<serde_json::Value> {
            let index = self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().push(url.clone());
            let pause = self.pauses.lock().get(index).copied();
            if let Some(pause) = pause {
                tokio::time::sleep(pause).await;
            }
            Ok(self.payload.clone())
        }
    }

    fn params_with_text(url: &mut Url, query: &Query) {
        url.query_pairs_mut()
            .append_pair("queryText", &query.query_text)
            .append_pair("page", &query.match_page.to_string());
    }

    struct Harness {
        core: Arc<CallCore<serde_json::Value>>,
        transport: Arc<RecordingTransport>,
        successes: Arc<AtomicUsize>,
        query: SharedQuery,
    }

    fn harness(configure: impl FnOnce(&mut ServiceSettings<serde_json::Value>)) -> Harness {
        let transport = RecordingTransport::new(serde_json::json!({"ok": true}));
        harness_with_transport(transport, configure)
    }

    fn harness_with_transport(
        transport: Arc<RecordingTransport>,
        configure: impl FnOnce(&mut ServiceSettings<serde_json::Value>),
    ) -> Harness {
        let successes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&successes);

        let mut settings: ServiceSettings<serde_json::Value> = ServiceSettings {
            enabled: true,
            path: "probe".to_string(),
            delay: None,
            trigger: TriggerPolicy::default(),
            callbacks: Callbacks::default(),
        };
        settings.callbacks.success = Some(Arc::new(move |_payload| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        configure(&mut settings);

        let query = query::shared(Query::default());
        let deps = ServiceDeps {
            query: Arc::clone(&query),
            auth: AuthToken::new(),
            transport: Arc::clone(&transport) as Arc<dyn Transport>,
        };
        let base = Url::parse("http://localhost:9950/RestService/v4/").unwrap();
        let core = CallCore::new("probe", &base, settings, deps, params_with_text, None).unwrap();

        Harness {
            core,
            transport,
            successes,
            query,
        }
    }

    fn text_change(harness: &Harness, text: &str) {
        let old = {
            let mut query = harness.query.write();
            std::mem::replace(&mut query.query_text, text.to_string())
        };
        harness.core.query_changed(&FieldChange::QueryText { old });
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_never_trigger_does_not_dispatch() {
        let harness = harness(|_| {});
        text_change(&harness, "test");
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_value_change_trigger_dispatches_immediately() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::OnValueChange;
        });
        text_change(&harness, "test");
        // cb_request/transport issue happens in the setter turn; only the
        // exchange itself is spawned.
        settle().await;
        assert_eq!(harness.transport.call_count(), 1);
        assert_eq!(harness.successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_instant_trigger_requires_pattern_match() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::instant();
        });
        text_change(&harness, "test");
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);

        text_change(&harness, "test ");
        settle().await;
        assert_eq!(harness.transport.call_count(), 1);
        let url = harness.transport.last_url().unwrap();
        assert!(url.query().unwrap().contains("queryText=test+"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_rapid_triggers() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::OnQueryTextChange;
            settings.delay = Some(Duration::from_millis(100));
        });

        text_change(&harness, "t");
        text_change(&harness, "te");
        text_change(&harness, "tes");
        assert_eq!(harness.transport.call_count(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;

        assert_eq!(harness.transport.call_count(), 1);
        let url = harness.transport.last_url().unwrap();
        // The dispatch uses the query state of the last trigger.
        assert!(url.query().unwrap().contains("queryText=tes"));
    }

    #[tokio::test]
    async fn test_defer_stashes_and_flush_dispatches_once() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::instant();
        });

        harness.core.defer_updates(true, false);
        text_change(&harness, "a ");
        text_change(&harness, "ab ");
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);

        harness.core.defer_updates(false, false);
        settle().await;
        assert_eq!(harness.transport.call_count(), 1);
        let url = harness.transport.last_url().unwrap();
        assert!(url.query().unwrap().contains("queryText=ab+"));
    }

    #[tokio::test]
    async fn test_defer_flush_with_skip_pending_discards() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::instant();
        });

        harness.core.defer_updates(true, false);
        text_change(&harness, "a ");
        harness.core.defer_updates(false, true);
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);

        // The stash is gone: flushing again dispatches nothing.
        harness.core.defer_updates(false, false);
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_flush_without_success_callback_discards() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::instant();
            settings.callbacks.success = None;
        });

        harness.core.defer_updates(true, false);
        text_change(&harness, "a ");
        harness.core.defer_updates(false, false);
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_veto_suppresses_call_silently() {
        let errors = Arc::new(AtomicUsize::new(0));
        let error_counter = Arc::clone(&errors);
        let harness = harness(move |settings| {
            settings.trigger.query_text = TriggerCondition::OnValueChange;
            settings.callbacks.request = Some(Arc::new(|_url, _request| false));
            settings.callbacks.error = Some(Arc::new(move |_error| {
                error_counter.fetch_add(1, Ordering::SeqCst);
            }));
        });

        text_change(&harness, "test");
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trigger_resets_page_but_page_flip_keeps_it() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::OnValueChange;
            settings.trigger.match_page = TriggerCondition::OnValueChange;
        });

        harness.query.write().match_page = 4;
        text_change(&harness, "test");
        settle().await;
        assert_eq!(harness.query.read().match_page, 1);

        harness.query.write().match_page = 5;
        harness.core.query_changed(&FieldChange::MatchPage { old: 1 });
        settle().await;
        assert_eq!(harness.query.read().match_page, 5);
        let url = harness.transport.last_url().unwrap();
        assert!(url.query().unwrap().contains("page=5"));
    }

    #[tokio::test]
    async fn test_clear_pending_drops_scheduled_and_stashed_work() {
        let harness = harness(|settings| {
            settings.trigger.query_text = TriggerCondition::instant();
        });

        harness.core.defer_updates(true, false);
        text_change(&harness, "a ");
        harness.core.clear_pending();
        harness.core.defer_updates(false, false);
        settle().await;
        assert_eq!(harness.transport.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_in_flight_response_is_dropped() {
        let transport = RecordingTransport::with_pauses(
            serde_json::json!({"ok": true}),
            vec![Duration::from_millis(100), Duration::ZERO],
        );
        let harness = harness_with_transport(transport, |settings| {
            settings.trigger.query_text = TriggerCondition::OnValueChange;
        });

        text_change(&harness, "first");
        text_change(&harness, "second");
        settle().await;
        assert_eq!(harness.transport.call_count(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;

        // Both exchanges completed, but only the newer one delivered.
        assert_eq!(harness.successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_suppressed_update_invokes_no_callbacks() {
        let requests = Arc::new(AtomicUsize::new(0));
        let request_counter = Arc::clone(&requests);
        let harness = harness(move |settings| {
            settings.callbacks.request = Some(Arc::new(move |_url, _request| {
                request_counter.fetch_add(1, Ordering::SeqCst);
                true
            }));
        });

        harness.core.update_suppressing_callbacks();
        settle().await;
        assert_eq!(harness.transport.call_count(), 1);
        assert_eq!(requests.load(Ordering::SeqCst), 0);
        assert_eq!(harness.successes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_set() {
        let transport = RecordingTransport::new(serde_json::json!({"ok": true}));
        let harness = harness_with_transport(Arc::clone(&transport), |_| {});
        harness.core.deps.auth.set("jwt-abc");

        let request = harness.core.request_object();
        assert_eq!(request.header("Authorization"), Some("Bearer jwt-abc"));

        harness.core.deps.auth.clear();
        let request = harness.core.request_object();
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn test_settings_defaults_give_manual_only_call() {
        let settings = Settings::default();
        // No trigger fires by default for any service.
        let query = Query {
            query_text: "test ".to_string(),
            ..Default::default()
        };
        assert!(settings
            .find
            .trigger
            .condition(QueryField::QueryText)
            .decide(&query, None)
            .is_none());
    }
}
