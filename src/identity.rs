//! Caller identity as reported by the wallet provider.

/// Snapshot of the connected wallet. Read-only to the generation core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Wallet address, when one is connected.
    pub id: Option<String>,
    pub is_authenticated: bool,
}

impl Identity {
    /// A connected wallet.
    pub fn connected(address: impl Into<String>) -> Self {
        Self {
            id: Some(address.into()),
            is_authenticated: true,
        }
    }

    /// No wallet connected.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The user id to attribute work to, if the identity is usable.
    ///
    /// Requires both the authenticated flag and a non-blank address.
    pub fn user_id(&self) -> Option<&str> {
        if !self.is_authenticated {
            return None;
        }
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}
