use cascata_types::{CascataError, RequestParams};

/// Collects the device and user attributes sent with each ad request.
pub trait IdentityProvider: Send + Sync {
    /// Snapshot the attributes for one firing.
    ///
    /// # Errors
    /// Returns `Identity` if the attributes cannot be gathered right now.
    fn request_params(&self) -> Result<RequestParams, CascataError>;
}

/// Identity provider that always returns the same attributes.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(RequestParams);

impl StaticIdentity {
    /// Wrap a fixed set of attributes.
    #[must_use]
    pub const fn new(params: RequestParams) -> Self {
        Self(params)
    }
}

impl From<RequestParams> for StaticIdentity {
    fn from(params: RequestParams) -> Self {
        Self(params)
    }
}

impl IdentityProvider for StaticIdentity {
    fn request_params(&self) -> Result<RequestParams, CascataError> {
        Ok(self.0.clone())
    }
}
