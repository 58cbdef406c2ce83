//! Credentials and per-machine secret material
//!
//! Cloud sessions are built per invocation from a [`CredentialProvider`]
//! capability injected by the caller. There is no process-wide client
//! singleton; concurrent operations for different compute units never
//! share session state.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Service-principal credentials for one cloud session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        subscription_id: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let creds = Self {
            subscription_id: subscription_id.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        };
        creds.validate()?;
        Ok(creds)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("subscription_id", &self.subscription_id),
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.is_empty() {
                return Err(CloudError::Configuration(format!(
                    "credential field {field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Secret bundle attached to one machine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSecrets {
    pub credentials: Credentials,

    /// Cloud-init payload handed to the VM as custom data
    #[serde(default)]
    pub user_data: Vec<u8>,
}

/// Source of credentials for one invocation.
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

/// Fixed credentials, e.g. already decoded from a secret store.
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}
