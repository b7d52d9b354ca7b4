// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Negotiation envelopes exchanged between enclaves. Each envelope pairs a
//! description, naming the generator/verifier pair it belongs to, with an
//! opaque byte blob whose schema is private to that authority. The raw
//! hardware structures travel inside the blobs as plain byte fields.

use serde::{Deserialize, Serialize};

use crate::sgx::TargetInfo;

/// Authority type of the machine-local SGX attestation protocol.
pub const SGX_LOCAL_AUTHORITY: &str = "SGX Local";

/// Kind of enclave identity an assertion speaks for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IdentityType {
    Null,
    Code,
}

/// Names the generator/verifier pair an envelope belongs to. Two parties
/// interpret each other's blobs only when both fields match.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AssertionDescription {
    pub identity_type: IdentityType,
    pub authority_type: String,
}

impl AssertionDescription {
    /// Description of the machine-local SGX code-identity authority.
    pub fn sgx_local() -> Self {
        Self {
            identity_type: IdentityType::Code,
            authority_type: SGX_LOCAL_AUTHORITY.to_string(),
        }
    }
}

/// Advertises that an enclave can produce assertions of a given kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionOffer {
    pub description: AssertionDescription,
    pub additional_information: Vec<u8>,
}

/// Asks an enclave to produce an assertion of a given kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionRequest {
    pub description: AssertionDescription,
    pub additional_information: Vec<u8>,
}

impl AssertionRequest {
    /// Build a request for a local assertion targeted at the caller's own
    /// enclave, as identified by `target_info`.
    pub fn for_local_attestation(
        domain: impl Into<String>,
        target_info: &TargetInfo,
    ) -> Result<Self, bincode::Error> {
        let info = LocalRequestInfo {
            attestation_domain: domain.into(),
            target_info: target_info.as_bytes().to_vec(),
        };
        let additional_information = bincode::serialize(&info)?;
        Ok(Self {
            description: AssertionDescription::sgx_local(),
            additional_information,
        })
    }
}

/// A generated proof of enclave identity, bound to caller data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Assertion {
    pub description: AssertionDescription,
    pub assertion: Vec<u8>,
}

/// Offer blob of the `SGX Local` authority.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocalOfferInfo {
    pub attestation_domain: String,
}

/// Request blob of the `SGX Local` authority. `target_info` carries the raw
/// TARGETINFO bytes of the requesting enclave.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocalRequestInfo {
    pub attestation_domain: String,
    pub target_info: Vec<u8>,
}

/// Assertion blob of the `SGX Local` authority: the raw REPORT bytes,
/// copied unmodified.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocalAssertion {
    pub report: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgx::TARGETINFO_SIZE;

    #[test]
    fn request_blob_decodes() {
        let target_info = TargetInfo::from([7u8; TARGETINFO_SIZE]);
        let request = AssertionRequest::for_local_attestation("corp", &target_info).unwrap();
        assert_eq!(request.description, AssertionDescription::sgx_local());

        let info: LocalRequestInfo =
            bincode::deserialize(&request.additional_information).unwrap();
        assert_eq!(info.attestation_domain, "corp");
        assert_eq!(info.target_info, target_info.as_bytes());
    }
}
