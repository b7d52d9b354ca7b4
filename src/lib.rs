// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Local attestation between SGX enclaves on one machine. An enclave proves
//! its identity to a peer enclave in the same attestation domain by having
//! the hardware issue a REPORT targeted at that peer, with caller-supplied
//! data bound into the report through a SHA-256 digest in its REPORTDATA
//! field. Only the targeted enclave can check the report's MAC, which is
//! what keeps the proof machine-local.
//!
//! The [`SgxLocalAssertionGenerator`] drives the generator side of the
//! protocol: it is initialized once with the configured attestation domain,
//! advertises its capability as an offer, screens incoming requests for
//! domain compatibility, and produces assertions. The hardware itself sits
//! behind the [`sgx::ReportSource`] seam, implemented by the enclave
//! runtime.
//!
//! #
//! ```no_run
//! use sgx_local_attestation::config::EnclaveConfig;
//! use sgx_local_attestation::sgx::{self, Report, ReportData, ReportError, TargetInfo};
//! use sgx_local_attestation::wire::AssertionRequest;
//! use sgx_local_attestation::{AssertionGenerator, SgxLocalAssertionGenerator};
//! use std::error::Error;
//!
//! struct Ereport;
//!
//! impl sgx::ReportSource for Ereport {
//!     fn get_report(
//!         &self,
//!         _target_info: &TargetInfo,
//!         _report_data: &ReportData,
//!     ) -> Result<Report, ReportError> {
//!         unimplemented!("EREPORT is only available inside an enclave")
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let generator = SgxLocalAssertionGenerator::new(Ereport);
//!     generator.initialize(&EnclaveConfig::with_attestation_domain("machine-local"))?;
//!
//!     let offer = generator.create_assertion_offer()?;
//!     // A peer answers the offer with a request carrying its TARGETINFO.
//!     let target_info = TargetInfo::try_from(vec![0u8; sgx::TARGETINFO_SIZE].as_slice())?;
//!     let request = AssertionRequest::for_local_attestation("machine-local", &target_info)?;
//!
//!     if generator.can_generate(&request)? {
//!         let assertion = generator.generate(b"channel binding nonce", &request)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod generator;
pub mod registry;
pub mod sgx;
pub mod wire;

pub use generator::{AssertionError, AssertionGenerator, SgxLocalAssertionGenerator};
