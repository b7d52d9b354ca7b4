// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::OnceLock;

use thiserror::Error;

use crate::config::EnclaveConfig;
use crate::sgx::{self, ReportData, ReportSource, TargetInfo};
use crate::wire::{
    Assertion, AssertionDescription, AssertionOffer, AssertionRequest, IdentityType,
    LocalAssertion, LocalOfferInfo, LocalRequestInfo, SGX_LOCAL_AUTHORITY,
};

#[derive(Error, Debug)]
pub enum AssertionError {
    #[error("generator is already initialized")]
    AlreadyInitialized,
    #[error("config has no local attestation domain")]
    MissingAttestationDomain,
    #[error("generator is not initialized")]
    NotInitialized,
    #[error("request description does not match this generator")]
    IncompatibleDescription,
    #[error("failed to decode additional information")]
    MalformedAdditionalInfo(#[source] bincode::Error),
    #[error("request names a different attestation domain")]
    DomainMismatch,
    #[error("targetinfo has incorrect size")]
    InvalidTargetInfo(#[from] sgx::TargetInfoSizeError),
    #[error("failed to generate a report")]
    ReportGeneration(#[from] sgx::ReportError),
    #[error("failed to encode message")]
    Serialization(#[source] bincode::Error),
}

/// Produces assertions of one identity/authority kind. Implementations are
/// long-lived, shared across threads, and looked up through a
/// [`GeneratorRegistry`](crate::registry::GeneratorRegistry).
pub trait AssertionGenerator: Send + Sync {
    /// Bind the generator to its process-lifetime configuration. Succeeds
    /// at most once; there is no teardown or re-initialization.
    fn initialize(&self, config: &EnclaveConfig) -> Result<(), AssertionError>;

    fn is_initialized(&self) -> bool;

    fn identity_type(&self) -> IdentityType;

    fn authority_type(&self) -> &str;

    /// Advertise this generator's assertion kind to a peer.
    fn create_assertion_offer(&self) -> Result<AssertionOffer, AssertionError>;

    /// Whether this generator can serve `request`. A well-formed request
    /// for a foreign domain yields `Ok(false)`; a request that cannot be
    /// decoded is an error, never `false`.
    fn can_generate(&self, request: &AssertionRequest) -> Result<bool, AssertionError>;

    /// Produce an assertion bound to `user_data` for the enclave described
    /// in `request`.
    fn generate(
        &self,
        user_data: &[u8],
        request: &AssertionRequest,
    ) -> Result<Assertion, AssertionError>;
}

/// Generates hardware-backed assertions for enclaves that share an
/// attestation domain on this machine.
pub struct SgxLocalAssertionGenerator {
    domain: OnceLock<String>,
    reports: Box<dyn ReportSource>,
}

impl SgxLocalAssertionGenerator {
    pub fn new(reports: impl ReportSource + 'static) -> Self {
        Self {
            domain: OnceLock::new(),
            reports: Box::new(reports),
        }
    }

    fn description(&self) -> AssertionDescription {
        AssertionDescription::sgx_local()
    }

    /// Decode a request blob after checking that the request is ours to
    /// interpret. The blob schema is only meaningful for a matching
    /// description.
    fn parse_request(
        &self,
        request: &AssertionRequest,
    ) -> Result<LocalRequestInfo, AssertionError> {
        if request.description != self.description() {
            return Err(AssertionError::IncompatibleDescription);
        }
        bincode::deserialize(&request.additional_information)
            .map_err(AssertionError::MalformedAdditionalInfo)
    }
}

impl AssertionGenerator for SgxLocalAssertionGenerator {
    fn initialize(&self, config: &EnclaveConfig) -> Result<(), AssertionError> {
        if self.domain.get().is_some() {
            return Err(AssertionError::AlreadyInitialized);
        }
        let domain = config
            .local_attestation_domain
            .clone()
            .ok_or(AssertionError::MissingAttestationDomain)?;
        // The set is the single state transition: the first caller to reach
        // it wins and every later caller observes the stored value.
        self.domain
            .set(domain)
            .map_err(|_| AssertionError::AlreadyInitialized)
    }

    fn is_initialized(&self) -> bool {
        self.domain.get().is_some()
    }

    fn identity_type(&self) -> IdentityType {
        IdentityType::Code
    }

    fn authority_type(&self) -> &str {
        SGX_LOCAL_AUTHORITY
    }

    fn create_assertion_offer(&self) -> Result<AssertionOffer, AssertionError> {
        let domain = self.domain.get().ok_or(AssertionError::NotInitialized)?;
        let info = LocalOfferInfo {
            attestation_domain: domain.clone(),
        };
        let additional_information =
            bincode::serialize(&info).map_err(AssertionError::Serialization)?;
        Ok(AssertionOffer {
            description: self.description(),
            additional_information,
        })
    }

    fn can_generate(&self, request: &AssertionRequest) -> Result<bool, AssertionError> {
        let domain = self.domain.get().ok_or(AssertionError::NotInitialized)?;
        let info = self.parse_request(request)?;
        Ok(info.attestation_domain == *domain)
    }

    fn generate(
        &self,
        user_data: &[u8],
        request: &AssertionRequest,
    ) -> Result<Assertion, AssertionError> {
        let domain = self.domain.get().ok_or(AssertionError::NotInitialized)?;
        let info = self.parse_request(request)?;
        if info.attestation_domain != *domain {
            return Err(AssertionError::DomainMismatch);
        }
        let target_info = TargetInfo::try_from(info.target_info.as_slice())?;

        // The report's MAC covers REPORTDATA, so hashing the caller's data
        // into it binds that data to the report.
        let report_data = ReportData::from_user_data(user_data);
        let report = self.reports.get_report(&target_info, &report_data)?;

        let local_assertion = LocalAssertion {
            report: report.as_bytes().to_vec(),
        };
        let assertion =
            bincode::serialize(&local_assertion).map_err(AssertionError::Serialization)?;
        Ok(Assertion {
            description: self.description(),
            assertion,
        })
    }
}
