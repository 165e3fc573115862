//! The connection manager: connect, disconnect, silent reconnect, and the
//! backend event wiring that keeps the published [`Session`] current.
//!
//! Every connect attempt and every explicit disconnect takes a new
//! generation number. Results and events are only applied while their
//! generation is still the current one, so a late answer from an abandoned
//! attempt, or an event from a backend that was replaced, never touches the
//! session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;

use plsdao_provider::{ListenerId, ProviderEventKind};
use plsdao_store::{FileStore, KeyValueStore};
use plsdao_types::{Address, BackendKind};

use crate::backend::{BackendEvent, BackendListener, BackendSet, WalletBackend};
use crate::catalog::{self, WalletOption};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::network::NetworkGuard;
use crate::persistence::SessionStore;
use crate::session::Session;

/// How accounts are obtained for an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// User-initiated; the wallet may prompt.
    Interactive,
    /// Startup reconnect; only already-authorized accounts count.
    Silent,
}

/// The backend a session is bound to, with the listeners registered on it.
struct Active {
    backend: Arc<dyn WalletBackend>,
    listeners: Vec<ListenerId>,
    generation: u64,
}

impl Active {
    fn detach(self) {
        for id in &self.listeners {
            if !self.backend.off(*id) {
                tracing::debug!(backend = %self.backend.kind(), "listener already gone");
            }
        }
    }
}

struct State {
    session: Session,
    generation: u64,
    active: Option<Active>,
}

impl State {
    fn is_active(&self, kind: BackendKind, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation && a.backend.kind() == kind)
    }
}

struct Shared {
    backends: BackendSet,
    guard: NetworkGuard,
    persistence: SessionStore,
    auto_reconnect: bool,
    state: Mutex<State>,
    tx: watch::Sender<Session>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Every update leaves the session consistent, poisoned or not.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.tx.send_replace(state.session.clone());
    }

    fn forget_last_used(&self) {
        if let Err(e) = self.persistence.forget() {
            tracing::warn!("failed to clear persisted backend: {e}");
        }
    }

    /// Entry point for every backend event.
    fn on_backend_event(&self, kind: BackendKind, generation: u64, event: BackendEvent) {
        let mut state = self.lock();
        if !state.is_active(kind, generation) {
            tracing::debug!(backend = %kind, ?event, "ignoring event from inactive backend");
            return;
        }

        let detached = match event {
            BackendEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    tracing::info!(backend = %kind, account = %account, "account changed");
                    state.session.account = Some(account);
                    None
                }
                None => {
                    // Usually a locked wallet; the persisted choice stays so
                    // the next start can reconnect once it is unlocked.
                    tracing::info!(backend = %kind, "wallet reported no accounts, disconnecting");
                    Self::drop_connection(&mut state)
                }
            },
            BackendEvent::ChainChanged(chain) => {
                let outcome = self.guard.check(chain);
                tracing::info!(backend = %kind, chain = %chain, ok = outcome.is_ok(), "chain changed");
                state.session.set_chain_outcome(outcome);
                None
            }
            BackendEvent::Disconnected => {
                tracing::info!(backend = %kind, "wallet ended the session");
                self.forget_last_used();
                Self::drop_connection(&mut state)
            }
        };
        self.publish(&state);
        drop(state);

        if let Some(active) = detached {
            active.detach();
        }
    }

    /// Clear the connection fields, leaving any in-flight attempt alone.
    fn drop_connection(state: &mut State) -> Option<Active> {
        let connecting = state.session.connecting;
        state.session.clear_connection();
        state.session.connecting = connecting;
        state.active.take()
    }
}

fn event_listener(shared: &Arc<Shared>, kind: BackendKind, generation: u64) -> BackendListener {
    let weak: Weak<Shared> = Arc::downgrade(shared);
    Arc::new(move |event: BackendEvent| {
        if let Some(shared) = weak.upgrade() {
            shared.on_backend_event(kind, generation, event);
        }
    })
}

/// Owns the wallet backends and the single [`Session`] of the application.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

impl ConnectionManager {
    pub fn new(
        config: &WalletConfig,
        backends: BackendSet,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self {
            shared: Arc::new(Shared {
                backends,
                guard: NetworkGuard::new(config.chain.clone()),
                persistence: SessionStore::new(store),
                auto_reconnect: config.auto_reconnect,
                state: Mutex::new(State {
                    session: Session::default(),
                    generation: 0,
                    active: None,
                }),
                tx,
            }),
        }
    }

    /// Manager persisting to the JSON file named in `config`.
    pub fn from_config(config: &WalletConfig, backends: BackendSet) -> Self {
        let store = Arc::new(FileStore::new(config.storage_path.clone()));
        Self::new(config, backends, store)
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.shared.tx.borrow().clone()
    }

    /// Receive every published session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.tx.subscribe()
    }

    /// Entries for the wallet picker.
    pub fn wallet_options(&self) -> Vec<WalletOption> {
        catalog::options(&self.shared.backends)
    }

    pub fn open_picker(&self) {
        self.set_picker(true);
    }

    pub fn close_picker(&self) {
        self.set_picker(false);
    }

    fn set_picker(&self, open: bool) {
        let mut state = self.shared.lock();
        if state.session.picker_open != open {
            state.session.picker_open = open;
            self.shared.publish(&state);
        }
    }

    /// Connect through `backend`, prompting the user if the wallet needs to.
    ///
    /// Without a backend this only asks the UI to show the picker. A wrong
    /// chain does not fail the call; it shows up as `chain_ok == false` and
    /// a `chain_issue` on the session.
    pub async fn connect(&self, backend: Option<BackendKind>) -> Result<(), WalletError> {
        let Some(kind) = backend else {
            tracing::debug!("connect without a backend, opening picker");
            self.open_picker();
            return Ok(());
        };
        self.establish(kind, Mode::Interactive).await
    }

    /// Silently reconnect to the last used backend.
    ///
    /// Returns whether a session was established. Never fails: problems are
    /// logged and the session stays idle.
    pub async fn restore(&self) -> bool {
        if !self.shared.auto_reconnect {
            tracing::debug!("auto-reconnect disabled");
            return false;
        }
        if self.session().is_connected() {
            return true;
        }
        match self.try_restore().await {
            Ok(restored) => restored,
            Err(e) => {
                tracing::debug!("{e}");
                false
            }
        }
    }

    async fn try_restore(&self) -> Result<bool, WalletError> {
        let Some(kind) = self.shared.persistence.last_used()? else {
            return Ok(false);
        };
        tracing::info!(backend = %kind, "attempting silent reconnect");
        self.establish(kind, Mode::Silent)
            .await
            .map(|()| true)
            .map_err(|e| WalletError::AutoReconnectFailed(e.to_string()))
    }

    /// End the session. Safe to call at any time, including while a connect
    /// is in flight (that attempt is then abandoned).
    pub async fn disconnect(&self) {
        let previous = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.session.clear_connection();
            self.shared.forget_last_used();
            self.shared.publish(&state);
            state.active.take()
        };

        let Some(active) = previous else {
            tracing::debug!("disconnect while idle");
            return;
        };
        let backend = Arc::clone(&active.backend);
        active.detach();
        tracing::info!(backend = %backend.kind(), "disconnected");
        if let Err(e) = backend.teardown().await {
            tracing::warn!(backend = %backend.kind(), "backend teardown failed: {e}");
        }
    }

    /// Ask the connected wallet to move to the required chain again.
    ///
    /// Returns whether it is on the required chain afterwards; `false` with
    /// no backend connected.
    pub async fn switch_to_required_chain(&self) -> bool {
        let current = {
            let state = self.shared.lock();
            state
                .active
                .as_ref()
                .map(|a| (Arc::clone(&a.backend), a.generation))
        };
        match current {
            Some((backend, generation)) => self.assert_chain(backend, generation).await,
            None => {
                tracing::debug!("no connected backend to switch");
                false
            }
        }
    }

    async fn establish(&self, kind: BackendKind, mode: Mode) -> Result<(), WalletError> {
        let (backend, generation) = self.begin_attempt(kind)?;
        tracing::info!(backend = %kind, ?mode, "connecting");

        let accounts = match mode {
            Mode::Interactive => backend.request_accounts().await,
            Mode::Silent => backend.authorized_accounts().await,
        };
        let account = match accounts {
            Ok(accounts) => accounts.into_iter().next().ok_or_else(|| {
                WalletError::ConnectionError {
                    backend: kind,
                    message: "wallet returned no accounts".into(),
                }
            }),
            Err(e) => Err(WalletError::from_provider(kind, e)),
        };
        let account = match account {
            Ok(account) => account,
            Err(e) => {
                self.abort_attempt(generation);
                tracing::info!(backend = %kind, "connect failed: {e}");
                return Err(e);
            }
        };

        self.commit(Arc::clone(&backend), generation, account).await?;
        self.assert_chain(backend, generation).await;
        self.finish_attempt(generation)
    }

    /// Claim the connecting slot for a new attempt on `kind`.
    fn begin_attempt(
        &self,
        kind: BackendKind,
    ) -> Result<(Arc<dyn WalletBackend>, u64), WalletError> {
        let mut state = self.shared.lock();
        if state.session.connecting {
            tracing::debug!(backend = %kind, "connect rejected, attempt already in flight");
            return Err(WalletError::AlreadyConnecting);
        }
        let backend = self
            .shared
            .backends
            .get(kind)
            .filter(|b| b.is_available())
            .ok_or_else(|| WalletError::BackendUnavailable {
                backend: kind,
                install_url: catalog::download_url(kind),
            })?;

        state.generation += 1;
        state.session.connecting = true;
        self.shared.publish(&state);
        Ok((backend, state.generation))
    }

    fn abort_attempt(&self, generation: u64) {
        let mut state = self.shared.lock();
        if state.generation == generation {
            state.session.connecting = false;
            self.shared.publish(&state);
        }
    }

    /// Bind the session to `backend` with `account`, unless the attempt was
    /// overtaken.
    async fn commit(
        &self,
        backend: Arc<dyn WalletBackend>,
        generation: u64,
        account: Address,
    ) -> Result<(), WalletError> {
        let kind = backend.kind();
        let listeners = self.attach(&backend, generation);

        let previous = {
            let mut state = self.shared.lock();
            if state.generation != generation {
                drop(state);
                tracing::info!(backend = %kind, "discarding result of abandoned connect");
                for id in listeners {
                    backend.off(id);
                }
                return Err(WalletError::ConnectionAbandoned);
            }

            let previous = state.active.replace(Active {
                backend: Arc::clone(&backend),
                listeners,
                generation,
            });
            state.session.account = Some(account.clone());
            state.session.active_backend = Some(kind);
            state.session.chain_ok = false;
            state.session.chain_issue = None;
            state.session.picker_open = false;
            if let Err(e) = self.shared.persistence.remember(kind) {
                tracing::warn!(backend = %kind, "failed to persist backend choice: {e}");
            }
            self.shared.publish(&state);
            previous
        };
        tracing::info!(backend = %kind, account = %account, "connected");

        if let Some(previous) = previous {
            let old = Arc::clone(&previous.backend);
            previous.detach();
            if old.kind() != kind {
                tracing::debug!(backend = %old.kind(), "releasing replaced backend");
                if let Err(e) = old.teardown().await {
                    tracing::warn!(backend = %old.kind(), "backend teardown failed: {e}");
                }
            }
        }
        Ok(())
    }

    fn attach(&self, backend: &Arc<dyn WalletBackend>, generation: u64) -> Vec<ListenerId> {
        let kind = backend.kind();
        // Injected wallets emit `disconnect` when they lose their RPC node,
        // which says nothing about the user's session.
        ProviderEventKind::ALL
            .into_iter()
            .filter(|event| *event != ProviderEventKind::Disconnect || kind.is_relay())
            .map(|event| backend.on(event, event_listener(&self.shared, kind, generation)))
            .collect()
    }

    /// Run network assertion for the backend bound at `generation` and
    /// record the outcome if it is still bound.
    async fn assert_chain(&self, backend: Arc<dyn WalletBackend>, generation: u64) -> bool {
        let kind = backend.kind();
        let outcome = self.shared.guard.ensure(backend.as_ref()).await;
        if let Err(e) = &outcome {
            tracing::warn!(backend = %kind, "wallet not on required chain: {e}");
        }

        let mut state = self.shared.lock();
        if !state.is_active(kind, generation) {
            tracing::debug!(backend = %kind, "dropping chain result for inactive backend");
            return false;
        }
        let ok = outcome.is_ok();
        state.session.set_chain_outcome(outcome);
        self.shared.publish(&state);
        ok
    }

    fn finish_attempt(&self, generation: u64) -> Result<(), WalletError> {
        let mut state = self.shared.lock();
        if state.generation != generation {
            return Err(WalletError::ConnectionAbandoned);
        }
        state.session.connecting = false;
        self.shared.publish(&state);
        Ok(())
    }
}
