// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Sizes are defined by "Intel 64 and IA-32 Architectures Software
// Developer's Manual", Vol. 3D, Section 38. The structures are shared
// byte-for-byte between enclaves on the same machine, so this crate never
// interprets their interior layout.

use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Size of the TARGETINFO structure in bytes.
pub const TARGETINFO_SIZE: usize = 512;
/// Size of the REPORTDATA field in bytes.
pub const REPORTDATA_SIZE: usize = 64;
/// Size of the REPORT structure in bytes.
pub const REPORT_SIZE: usize = 432;

#[derive(Error, Debug)]
#[error("targetinfo size mismatch (expected {TARGETINFO_SIZE}, got {0})")]
pub struct TargetInfoSizeError(pub usize);

/// Identifies the enclave that will be able to verify a [`Report`]'s MAC.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TargetInfo(#[serde(with = "BigArray")] [u8; TARGETINFO_SIZE]);

impl TargetInfo {
    pub fn as_bytes(&self) -> &[u8; TARGETINFO_SIZE] {
        &self.0
    }
}

impl From<[u8; TARGETINFO_SIZE]> for TargetInfo {
    fn from(bytes: [u8; TARGETINFO_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for TargetInfo {
    type Error = TargetInfoSizeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw = <[u8; TARGETINFO_SIZE]>::try_from(bytes)
            .map_err(|_| TargetInfoSizeError(bytes.len()))?;
        Ok(Self(raw))
    }
}

/// Caller-controlled 64-byte field covered by a [`Report`]'s MAC.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReportData(#[serde(with = "BigArray")] [u8; REPORTDATA_SIZE]);

impl ReportData {
    /// Bind arbitrary caller data to a report: the lower 32 bytes hold the
    /// SHA-256 digest of `user_data`, the upper 32 bytes stay zero.
    pub fn from_user_data(user_data: &[u8]) -> Self {
        let mut data = [0u8; REPORTDATA_SIZE];
        let digest = Sha256::digest(user_data);
        data[..digest.len()].copy_from_slice(&digest);
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8; REPORTDATA_SIZE] {
        &self.0
    }
}

/// MACed report issued by the hardware for one specific target enclave.
/// Opaque to this crate; only the target can check the MAC.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Report(#[serde(with = "BigArray")] [u8; REPORT_SIZE]);

impl Report {
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.0
    }
}

impl From<[u8; REPORT_SIZE]> for Report {
    fn from(bytes: [u8; REPORT_SIZE]) -> Self {
        Self(bytes)
    }
}

#[derive(Error, Debug)]
#[error("hardware refused to issue a report for the requested target")]
pub struct ReportError;

/// Source of hardware-signed reports. Inside an enclave this is backed by
/// the EREPORT instruction; tests substitute a stub.
pub trait ReportSource: Send + Sync {
    fn get_report(
        &self,
        target_info: &TargetInfo,
        report_data: &ReportData,
    ) -> Result<Report, ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_data_binds_user_data() {
        let report_data = ReportData::from_user_data(b"abc");
        let expected =
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap();
        assert_eq!(report_data.as_bytes()[..32], expected[..]);
        assert_eq!(report_data.as_bytes()[32..], [0u8; 32]);
    }

    #[test]
    fn targetinfo_rejects_wrong_size() {
        let short = vec![0u8; TARGETINFO_SIZE - 1];
        let error = TargetInfo::try_from(short.as_slice()).unwrap_err();
        assert_eq!(error.0, TARGETINFO_SIZE - 1);

        let exact = vec![0u8; TARGETINFO_SIZE];
        assert!(TargetInfo::try_from(exact.as_slice()).is_ok());
    }
}
