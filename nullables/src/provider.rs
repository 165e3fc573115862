//! Nullable injected provider: a scriptable in-memory wallet.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use plsdao_provider::rpc::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN,
};
use plsdao_provider::{
    Eip1193Provider, Listener, ListenerId, ProviderError, ProviderEvent, ProviderEventKind,
};
use plsdao_types::ChainId;

/// Wallet-side state the fake keeps between requests.
struct WalletState {
    accounts: Vec<String>,
    authorized: bool,
    chain: ChainId,
    known_chains: HashSet<ChainId>,
}

/// A test provider that behaves like a browser wallet extension.
///
/// By default it authorizes on `eth_requestAccounts`, reports its current
/// chain, switches to chains it knows, answers 4902 for chains it does not,
/// and learns a chain on `wallet_addEthereumChain` (switching to it, as
/// MetaMask does). Any method can be scripted to answer differently once via
/// [`fail_next`](Self::fail_next) / [`respond_next`](Self::respond_next), or
/// held in flight with [`hold`](Self::hold).
pub struct NullProvider {
    metamask: bool,
    coinbase: bool,
    wallet: Mutex<WalletState>,
    scripted: Mutex<HashMap<String, VecDeque<Result<serde_json::Value, ProviderError>>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    requests: Mutex<Vec<(String, serde_json::Value)>>,
    listeners: Mutex<Vec<(ListenerId, ProviderEventKind, Listener)>>,
    next_listener: AtomicU64,
    /// When set, `off` reports success but keeps delivering events.
    leaky: AtomicBool,
}

impl NullProvider {
    /// A generic injected wallet with `accounts`, on `chain`.
    pub fn new(accounts: Vec<&str>, chain: ChainId) -> Self {
        Self {
            metamask: false,
            coinbase: false,
            wallet: Mutex::new(WalletState {
                accounts: accounts.into_iter().map(str::to_string).collect(),
                authorized: false,
                chain,
                known_chains: HashSet::from([ChainId::ETHEREUM, chain]),
            }),
            scripted: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            leaky: AtomicBool::new(false),
        }
    }

    /// Same wallet, flagged `isMetaMask`.
    pub fn metamask(accounts: Vec<&str>, chain: ChainId) -> Self {
        Self {
            metamask: true,
            ..Self::new(accounts, chain)
        }
    }

    /// Same wallet, flagged `isCoinbaseWallet`.
    pub fn coinbase(accounts: Vec<&str>, chain: ChainId) -> Self {
        Self {
            coinbase: true,
            ..Self::new(accounts, chain)
        }
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Pretend the user already authorized this site in an earlier visit.
    pub fn authorize(&self) {
        self.wallet.lock().unwrap().authorized = true;
    }

    /// Revoke authorization (what a wallet lock looks like to `eth_accounts`).
    pub fn revoke(&self) {
        self.wallet.lock().unwrap().authorized = false;
    }

    /// Teach the wallet a chain so switching to it succeeds.
    pub fn know_chain(&self, chain: ChainId) {
        self.wallet.lock().unwrap().known_chains.insert(chain);
    }

    /// Move the wallet to `chain` without emitting anything.
    pub fn set_chain(&self, chain: ChainId) {
        let mut wallet = self.wallet.lock().unwrap();
        wallet.known_chains.insert(chain);
        wallet.chain = chain;
    }

    pub fn chain(&self) -> ChainId {
        self.wallet.lock().unwrap().chain
    }

    pub fn is_authorized(&self) -> bool {
        self.wallet.lock().unwrap().authorized
    }

    /// Fail the next `method` request with `error`.
    pub fn fail_next(&self, method: &str, error: ProviderError) {
        self.push_scripted(method, Err(error));
    }

    /// Answer the next `method` request with `value`, bypassing the wallet state.
    pub fn respond_next(&self, method: &str, value: serde_json::Value) {
        self.push_scripted(method, Ok(value));
    }

    fn push_scripted(&self, method: &str, outcome: Result<serde_json::Value, ProviderError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Hold every `method` request until [`release`](Self::release) is called.
    pub fn hold(&self, method: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(method.to_string(), Arc::new(Notify::new()));
    }

    /// Let one held `method` request through and stop holding new ones.
    pub fn release(&self, method: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(method) {
            gate.notify_one();
        }
    }

    /// Wait while `name` is held. Used by every request, and by wrappers
    /// that gate calls of their own under a name that is not a method.
    pub async fn pass_gate(&self, name: &str) {
        let gate = self.gates.lock().unwrap().get(name).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    /// Keep delivering events to listeners after `off`.
    pub fn set_leaky(&self, leaky: bool) {
        self.leaky.store(leaky, Ordering::SeqCst);
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Deliver `event` to every listener registered for its kind.
    pub fn emit(&self, event: ProviderEvent) {
        let kind = event.kind();
        let targets: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        for listener in targets {
            listener(&event);
        }
    }

    /// Simulate the user switching accounts (or locking, with an empty list).
    pub fn change_accounts(&self, accounts: Vec<&str>) {
        let accounts: Vec<String> = accounts.into_iter().map(str::to_string).collect();
        {
            let mut wallet = self.wallet.lock().unwrap();
            wallet.authorized = !accounts.is_empty();
            if !accounts.is_empty() {
                wallet.accounts = accounts.clone();
            }
        }
        self.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// Simulate the user switching networks inside the wallet.
    pub fn change_chain(&self, chain: ChainId) {
        self.set_chain(chain);
        self.emit(ProviderEvent::ChainChanged(chain.to_hex()));
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    // ── Assertions ──────────────────────────────────────────────────────

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `method` was requested.
    pub fn count(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    // ── Request handling ────────────────────────────────────────────────

    fn answer(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut emit = None;
        let result = {
            let mut wallet = self.wallet.lock().unwrap();
            match method {
                ETH_REQUEST_ACCOUNTS => {
                    wallet.authorized = true;
                    Ok(serde_json::json!(wallet.accounts))
                }
                ETH_ACCOUNTS if wallet.authorized => Ok(serde_json::json!(wallet.accounts)),
                ETH_ACCOUNTS => Ok(serde_json::json!([])),
                ETH_CHAIN_ID => Ok(serde_json::json!(wallet.chain.to_hex())),
                WALLET_SWITCH_CHAIN => {
                    let requested = requested_chain(params)?;
                    if !wallet.known_chains.contains(&requested) {
                        Err(ProviderError::unrecognized_chain(&requested.to_hex()))
                    } else {
                        if wallet.chain != requested {
                            wallet.chain = requested;
                            emit = Some(ProviderEvent::ChainChanged(requested.to_hex()));
                        }
                        Ok(serde_json::Value::Null)
                    }
                }
                WALLET_ADD_CHAIN => {
                    let requested = requested_chain(params)?;
                    wallet.known_chains.insert(requested);
                    if wallet.chain != requested {
                        wallet.chain = requested;
                        emit = Some(ProviderEvent::ChainChanged(requested.to_hex()));
                    }
                    Ok(serde_json::Value::Null)
                }
                other => Err(ProviderError::new(
                    ProviderError::UNSUPPORTED_METHOD,
                    format!("method {other} not supported"),
                )),
            }
        };
        if let Some(event) = emit {
            self.emit(event);
        }
        result
    }
}

fn requested_chain(params: &serde_json::Value) -> Result<ChainId, ProviderError> {
    let raw = params
        .get(0)
        .and_then(|p| p.get("chainId"))
        .ok_or_else(|| ProviderError::new(-32602, "missing chainId"))?;
    ChainId::from_json(raw).map_err(|e| ProviderError::new(-32602, e.to_string()))
}

#[async_trait]
impl Eip1193Provider for NullProvider {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        self.pass_gate(method).await;

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(outcome) => outcome,
            None => self.answer(method, &params),
        }
    }

    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().unwrap().push((id, kind, listener));
        id
    }

    fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        let registered = listeners.iter().any(|(l, _, _)| *l == id);
        if !self.leaky.load(Ordering::SeqCst) {
            listeners.retain(|(l, _, _)| *l != id);
        }
        registered
    }

    fn is_metamask(&self) -> bool {
        self.metamask
    }

    fn is_coinbase_wallet(&self) -> bool {
        self.coinbase
    }
}
