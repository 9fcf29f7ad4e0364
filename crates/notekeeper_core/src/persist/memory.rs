//! In-process token store.

use super::{PersistResult, TokenStore};
use crate::model::credential::BearerToken;
use std::sync::Mutex;

/// Token store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<BearerToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a token already stored, as after a previous session.
    pub fn with_token(token: BearerToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn with_slot<T>(&self, f: impl FnOnce(&mut Option<BearerToken>) -> T) -> T {
        let mut guard = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> PersistResult<Option<BearerToken>> {
        Ok(self.with_slot(|slot| slot.clone()))
    }

    fn save(&self, token: &BearerToken) -> PersistResult<()> {
        self.with_slot(|slot| *slot = Some(token.clone()));
        Ok(())
    }

    fn clear(&self) -> PersistResult<()> {
        self.with_slot(|slot| *slot = None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTokenStore;
    use crate::model::credential::BearerToken;
    use crate::persist::TokenStore;

    #[test]
    fn save_load_clear_cycle() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&BearerToken::new("abc").unwrap()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().as_str(), "abc");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
