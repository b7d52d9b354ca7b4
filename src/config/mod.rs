// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

/// Enclave startup configuration handed over by the host on entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnclaveConfig {
    /// Name of the mutual-trust group of enclaves on this machine. `None`
    /// if the host did not configure local attestation.
    pub local_attestation_domain: Option<String>,
}

impl EnclaveConfig {
    pub fn with_attestation_domain(domain: impl Into<String>) -> Self {
        Self {
            local_attestation_domain: Some(domain.into()),
        }
    }
}
