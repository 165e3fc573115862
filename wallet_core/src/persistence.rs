//! Remembers which backend was last used, so returning users reconnect silently.

use std::sync::Arc;

use plsdao_store::{KeyValueStore, StoreError};
use plsdao_types::BackendKind;

/// Storage key for the last used backend id.
pub const LAST_BACKEND_KEY: &str = "plsdao.last_backend";

/// Typed access to the persisted last used backend.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The last backend a connection succeeded through.
    ///
    /// An unrecognised stored value reads as `None`.
    pub fn last_used(&self) -> Result<Option<BackendKind>, StoreError> {
        let Some(raw) = self.store.get(LAST_BACKEND_KEY)? else {
            return Ok(None);
        };
        match raw.parse::<BackendKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(e) => {
                tracing::warn!(value = %raw, "ignoring persisted backend: {e}");
                Ok(None)
            }
        }
    }

    pub fn remember(&self, kind: BackendKind) -> Result<(), StoreError> {
        self.store.set(LAST_BACKEND_KEY, kind.as_str())
    }

    pub fn forget(&self) -> Result<(), StoreError> {
        self.store.remove(LAST_BACKEND_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_nullables::NullStore;

    #[test]
    fn remember_then_forget() {
        let sessions = SessionStore::new(Arc::new(NullStore::new()));
        assert_eq!(sessions.last_used().unwrap(), None);
        sessions.remember(BackendKind::WalletConnect).unwrap();
        assert_eq!(sessions.last_used().unwrap(), Some(BackendKind::WalletConnect));
        sessions.forget().unwrap();
        assert_eq!(sessions.last_used().unwrap(), None);
    }

    #[test]
    fn stores_stable_id() {
        let store = Arc::new(NullStore::new());
        SessionStore::new(store.clone())
            .remember(BackendKind::MetaMask)
            .unwrap();
        assert_eq!(
            store.entries().get(LAST_BACKEND_KEY).map(String::as_str),
            Some("metamask")
        );
    }

    #[test]
    fn garbage_value_reads_as_none() {
        let store = Arc::new(NullStore::with_entry(LAST_BACKEND_KEY, "phantom"));
        assert_eq!(SessionStore::new(store).last_used().unwrap(), None);
    }
}
