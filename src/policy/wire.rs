//! Wire representation of sync policies.
//!
//! The service expects a fixed camelCase object. Each enum has its own
//! `to_wire`/`from_wire` pair so the string values stay stable no matter how the
//! Rust variants are named or ordered.

use crate::error::ApiError;
use crate::policy::{
    BwList, DeletePolicy, DownloadPolicy, DownloadStrategy, ExtractPolicy, Lifecycle,
    RecyclePolicy, SyncPolicy, UploadPolicy, UploadStrategy, WhiteList,
};
use serde::{Deserialize, Serialize};

impl UploadStrategy {
    pub fn to_wire(self) -> &'static str {
        match self {
            UploadStrategy::UploadAfterFileClose => "UploadAfterFileClose",
            UploadStrategy::PeriodicUpload => "PeriodicUpload",
        }
    }

    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        match value {
            "UploadAfterFileClose" => Ok(UploadStrategy::UploadAfterFileClose),
            "PeriodicUpload" => Ok(UploadStrategy::PeriodicUpload),
            other => Err(ApiError::InvalidWire(format!(
                "unknown uploadStrategy '{}'",
                other
            ))),
        }
    }
}

impl DownloadStrategy {
    pub fn to_wire(self) -> &'static str {
        match self {
            DownloadStrategy::DownloadSync => "DownloadSync",
            DownloadStrategy::DownloadAsync => "DownloadAsync",
        }
    }

    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        match value {
            "DownloadSync" => Ok(DownloadStrategy::DownloadSync),
            "DownloadAsync" => Ok(DownloadStrategy::DownloadAsync),
            other => Err(ApiError::InvalidWire(format!(
                "unknown downloadStrategy '{}'",
                other
            ))),
        }
    }
}

impl Lifecycle {
    pub fn to_wire(self) -> &'static str {
        match self {
            Lifecycle::OneDay => "Lifecycle_1Day",
            Lifecycle::ThreeDays => "Lifecycle_3Days",
            Lifecycle::FiveDays => "Lifecycle_5Days",
            Lifecycle::TenDays => "Lifecycle_10Days",
            Lifecycle::FifteenDays => "Lifecycle_15Days",
            Lifecycle::ThirtyDays => "Lifecycle_30Days",
            Lifecycle::NinetyDays => "Lifecycle_90Days",
            Lifecycle::OneHundredEightyDays => "Lifecycle_180Days",
            Lifecycle::OneYear => "Lifecycle_360Days",
            Lifecycle::Forever => "Lifecycle_Forever",
        }
    }

    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        Ok(match value {
            "Lifecycle_1Day" => Lifecycle::OneDay,
            "Lifecycle_3Days" => Lifecycle::ThreeDays,
            "Lifecycle_5Days" => Lifecycle::FiveDays,
            "Lifecycle_10Days" => Lifecycle::TenDays,
            "Lifecycle_15Days" => Lifecycle::FifteenDays,
            "Lifecycle_30Days" => Lifecycle::ThirtyDays,
            "Lifecycle_90Days" => Lifecycle::NinetyDays,
            "Lifecycle_180Days" => Lifecycle::OneHundredEightyDays,
            "Lifecycle_360Days" => Lifecycle::OneYear,
            "Lifecycle_Forever" => Lifecycle::Forever,
            other => {
                return Err(ApiError::InvalidWire(format!(
                    "unknown lifecycle '{}'",
                    other
                )))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUploadPolicy {
    pub auto_upload: bool,
    pub upload_strategy: String,
    pub period: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDownloadPolicy {
    pub auto_download: bool,
    pub download_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDeletePolicy {
    pub sync_local_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWhiteList {
    pub path: String,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBwList {
    #[serde(default)]
    pub white_lists: Vec<WireWhiteList>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireExtractPolicy {
    pub extract: bool,
    pub delete_src_file: bool,
    pub extract_to_current_folder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecyclePolicy {
    pub lifecycle: String,
    pub paths: Vec<String>,
}

/// Serialized [`SyncPolicy`] as sent inside a session-creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSyncPolicy {
    pub upload_policy: WireUploadPolicy,
    pub download_policy: WireDownloadPolicy,
    pub delete_policy: WireDeletePolicy,
    pub bw_list: WireBwList,
    #[serde(default)]
    pub sync_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_policy: Option<WireExtractPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycle_policy: Option<WireRecyclePolicy>,
}

impl UploadPolicy {
    pub fn to_wire(&self) -> WireUploadPolicy {
        WireUploadPolicy {
            auto_upload: self.auto_upload,
            upload_strategy: self.upload_strategy.to_wire().to_string(),
            period: self.period,
        }
    }

    pub fn from_wire(wire: &WireUploadPolicy) -> Result<Self, ApiError> {
        Ok(Self {
            auto_upload: wire.auto_upload,
            upload_strategy: UploadStrategy::from_wire(&wire.upload_strategy)?,
            period: wire.period,
        })
    }
}

impl DownloadPolicy {
    pub fn to_wire(&self) -> WireDownloadPolicy {
        WireDownloadPolicy {
            auto_download: self.auto_download,
            download_strategy: self.download_strategy.to_wire().to_string(),
        }
    }

    pub fn from_wire(wire: &WireDownloadPolicy) -> Result<Self, ApiError> {
        Ok(Self {
            auto_download: wire.auto_download,
            download_strategy: DownloadStrategy::from_wire(&wire.download_strategy)?,
        })
    }
}

impl DeletePolicy {
    pub fn to_wire(&self) -> WireDeletePolicy {
        WireDeletePolicy {
            sync_local_file: self.sync_local_file,
        }
    }

    pub fn from_wire(wire: &WireDeletePolicy) -> Self {
        Self {
            sync_local_file: wire.sync_local_file,
        }
    }
}

impl BwList {
    pub fn to_wire(&self) -> WireBwList {
        WireBwList {
            white_lists: self
                .white_lists
                .iter()
                .map(|list| WireWhiteList {
                    path: list.path.clone(),
                    exclude_paths: list.exclude_paths.clone(),
                })
                .collect(),
        }
    }

    pub fn from_wire(wire: &WireBwList) -> Self {
        Self {
            white_lists: wire
                .white_lists
                .iter()
                .map(|list| WhiteList {
                    path: list.path.clone(),
                    exclude_paths: list.exclude_paths.clone(),
                })
                .collect(),
        }
    }
}

impl ExtractPolicy {
    pub fn to_wire(&self) -> WireExtractPolicy {
        WireExtractPolicy {
            extract: self.extract,
            delete_src_file: self.delete_src_file,
            extract_to_current_folder: self.extract_to_current_folder,
        }
    }

    pub fn from_wire(wire: &WireExtractPolicy) -> Self {
        Self {
            extract: wire.extract,
            delete_src_file: wire.delete_src_file,
            extract_to_current_folder: wire.extract_to_current_folder,
        }
    }
}

impl RecyclePolicy {
    pub fn to_wire(&self) -> WireRecyclePolicy {
        WireRecyclePolicy {
            lifecycle: self.lifecycle.to_wire().to_string(),
            paths: self.paths.clone(),
        }
    }

    pub fn from_wire(wire: &WireRecyclePolicy) -> Result<Self, ApiError> {
        Ok(Self {
            lifecycle: Lifecycle::from_wire(&wire.lifecycle)?,
            paths: wire.paths.clone(),
        })
    }
}

impl SyncPolicy {
    pub fn to_wire(&self) -> WireSyncPolicy {
        WireSyncPolicy {
            upload_policy: self.upload_policy.to_wire(),
            download_policy: self.download_policy.to_wire(),
            delete_policy: self.delete_policy.to_wire(),
            bw_list: self.bw_list.to_wire(),
            sync_paths: self.sync_paths.clone(),
            extract_policy: self.extract_policy.as_ref().map(ExtractPolicy::to_wire),
            recycle_policy: self.recycle_policy.as_ref().map(RecyclePolicy::to_wire),
        }
    }

    /// Rebuild a policy from its wire form and validate it.
    ///
    /// Wire input bypasses the [`WhiteList`] constructor, so the full policy is
    /// validated here before it is handed back.
    pub fn from_wire(wire: &WireSyncPolicy) -> Result<Self, ApiError> {
        let policy = Self {
            upload_policy: UploadPolicy::from_wire(&wire.upload_policy)?,
            download_policy: DownloadPolicy::from_wire(&wire.download_policy)?,
            delete_policy: DeletePolicy::from_wire(&wire.delete_policy),
            bw_list: BwList::from_wire(&wire.bw_list),
            sync_paths: wire.sync_paths.clone(),
            extract_policy: wire.extract_policy.as_ref().map(ExtractPolicy::from_wire),
            recycle_policy: wire
                .recycle_policy
                .as_ref()
                .map(RecyclePolicy::from_wire)
                .transpose()?,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// JSON value of the wire form.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.to_wire()).unwrap_or(serde_json::Value::Null)
    }
}
