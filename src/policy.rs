//! Sync Policy Model
//!
//! Value objects describing how one context is synchronized with a session filesystem:
//! when local changes are uploaded, how remote data is downloaded, whether local
//! deletions propagate, and which paths are in scope. Policies are pure values; the
//! service drives the actual transfer from whatever the session declared.

use crate::error::ValidationError;

pub mod path;
pub mod wire;

pub use path::validate_no_wildcard;

/// Default upload period in minutes for [`UploadStrategy::PeriodicUpload`].
pub const DEFAULT_UPLOAD_PERIOD_MINUTES: i32 = 30;

/// When the service uploads local changes into the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStrategy {
    /// Upload each file once it is closed
    UploadAfterFileClose,
    /// Upload on a fixed period (see [`UploadPolicy::period`])
    PeriodicUpload,
}

/// How the service restores context data into a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStrategy {
    /// Session start waits for the download
    DownloadSync,
    /// Session starts immediately, data arrives in the background
    DownloadAsync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub auto_upload: bool,
    pub upload_strategy: UploadStrategy,
    /// Minutes between uploads; only read under `PeriodicUpload`
    pub period: i32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            auto_upload: true,
            upload_strategy: UploadStrategy::UploadAfterFileClose,
            period: DEFAULT_UPLOAD_PERIOD_MINUTES,
        }
    }
}

impl UploadPolicy {
    /// Periodic upload every `period` minutes.
    pub fn periodic(period: i32) -> Self {
        Self {
            auto_upload: true,
            upload_strategy: UploadStrategy::PeriodicUpload,
            period,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.upload_strategy == UploadStrategy::PeriodicUpload && self.period <= 0 {
            return Err(ValidationError::NonPositivePeriod(self.period));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPolicy {
    pub auto_download: bool,
    pub download_strategy: DownloadStrategy,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            auto_download: true,
            download_strategy: DownloadStrategy::DownloadSync,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePolicy {
    /// Propagate local deletions to the context
    pub sync_local_file: bool,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self {
            sync_local_file: true,
        }
    }
}

/// Archive handling for uploaded files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractPolicy {
    pub extract: bool,
    pub delete_src_file: bool,
    pub extract_to_current_folder: bool,
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self {
            extract: true,
            delete_src_file: true,
            extract_to_current_folder: false,
        }
    }
}

/// Retention period for data synced into a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    OneDay,
    ThreeDays,
    FiveDays,
    TenDays,
    FifteenDays,
    ThirtyDays,
    NinetyDays,
    OneHundredEightyDays,
    OneYear,
    Forever,
}

/// Retention of synced data, optionally restricted to some paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecyclePolicy {
    pub lifecycle: Lifecycle,
    /// Paths the lifecycle applies to; `[""]` means the whole context
    pub paths: Vec<String>,
}

impl Default for RecyclePolicy {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Forever,
            paths: vec![String::new()],
        }
    }
}

impl RecyclePolicy {
    pub fn new(lifecycle: Lifecycle, paths: Vec<String>) -> Result<Self, ValidationError> {
        let policy = Self { lifecycle, paths };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.paths.is_empty() {
            return Err(ValidationError::Empty("recycle_policy.paths"));
        }
        path::validate_all(&self.paths, "recycle_policy.paths")
    }
}

/// One allow-listed scope with optional excluded sub-paths.
///
/// Fields stay public for inspection; [`WhiteList::validate`] is re-run when the list
/// is bound, so later mutation cannot smuggle a wildcard through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WhiteList {
    pub path: String,
    pub exclude_paths: Vec<String>,
}

impl WhiteList {
    pub fn new(
        path: impl Into<String>,
        exclude_paths: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let list = Self {
            path: path.into(),
            exclude_paths,
        };
        list.validate()?;
        Ok(list)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_no_wildcard(&self.path, "path")?;
        path::validate_all(&self.exclude_paths, "exclude_paths")
    }
}

/// Ordered allow-list. Empty means everything under the mount path is in scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BwList {
    pub white_lists: Vec<WhiteList>,
}

impl BwList {
    pub fn new(white_lists: Vec<WhiteList>) -> Self {
        Self { white_lists }
    }

    pub fn is_empty(&self) -> bool {
        self.white_lists.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.white_lists.iter().try_for_each(WhiteList::validate)
    }
}

/// Complete sync policy for one context binding
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncPolicy {
    pub upload_policy: UploadPolicy,
    pub download_policy: DownloadPolicy,
    pub delete_policy: DeletePolicy,
    pub bw_list: BwList,
    /// Extra paths synced beyond the mount root
    pub sync_paths: Vec<String>,
    pub extract_policy: Option<ExtractPolicy>,
    pub recycle_policy: Option<RecyclePolicy>,
}

impl SyncPolicy {
    /// Validate every field, reporting the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.upload_policy.validate()?;
        self.bw_list.validate()?;
        path::validate_all(&self.sync_paths, "sync_paths")?;
        if let Some(recycle) = &self.recycle_policy {
            recycle.validate()?;
        }
        Ok(())
    }

    pub fn with_bw_list(mut self, bw_list: BwList) -> Self {
        self.bw_list = bw_list;
        self
    }

    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    pub fn with_download_policy(mut self, download_policy: DownloadPolicy) -> Self {
        self.download_policy = download_policy;
        self
    }
}
