//! Torrent state strings reported by the daemon and their reduction to the
//! six lifecycle statuses exposed as metric labels.

use std::fmt;

use serde::Deserialize;

/// Raw `state` field of a torrent as reported by `/api/v2/torrents/info`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TorrentState {
    Error,
    MissingFiles,
    Uploading,
    PausedUpload,
    StoppedUpload,
    QueuedUpload,
    StalledUpload,
    CheckingUpload,
    ForcedUpload,
    Allocating,
    Downloading,
    MetadataDownload,
    ForcedMetadataDownload,
    PausedDownload,
    StoppedDownload,
    QueuedDownload,
    ForcedDownload,
    StalledDownload,
    CheckingDownload,
    CheckingResumeData,
    Moving,
    #[default]
    Unknown,
    /// A state string this build does not recognize.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleStatus {
    Downloading,
    Uploading,
    Complete,
    Checking,
    Errored,
    Paused,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 6] = [
        Self::Downloading,
        Self::Uploading,
        Self::Complete,
        Self::Checking,
        Self::Errored,
        Self::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downloading => "downloading",
            Self::Uploading => "uploading",
            Self::Complete => "complete",
            Self::Checking => "checking",
            Self::Errored => "errored",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TorrentState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::MissingFiles => "missingFiles",
            Self::Uploading => "uploading",
            Self::PausedUpload => "pausedUP",
            Self::StoppedUpload => "stoppedUP",
            Self::QueuedUpload => "queuedUP",
            Self::StalledUpload => "stalledUP",
            Self::CheckingUpload => "checkingUP",
            Self::ForcedUpload => "forcedUP",
            Self::Allocating => "allocating",
            Self::Downloading => "downloading",
            Self::MetadataDownload => "metaDL",
            Self::ForcedMetadataDownload => "forcedMetaDL",
            Self::PausedDownload => "pausedDL",
            Self::StoppedDownload => "stoppedDL",
            Self::QueuedDownload => "queuedDL",
            Self::ForcedDownload => "forcedDL",
            Self::StalledDownload => "stalledDL",
            Self::CheckingDownload => "checkingDL",
            Self::CheckingResumeData => "checkingResumeData",
            Self::Moving => "moving",
            Self::Unknown => "unknown",
            Self::Other(raw) => raw,
        }
    }

    /// Checking and error states take precedence over transfer direction.
    /// An inactive torrent counts as complete once all wanted pieces are
    /// present and as paused otherwise.
    pub fn lifecycle(&self) -> LifecycleStatus {
        match self {
            Self::Error | Self::MissingFiles | Self::Unknown | Self::Other(_) => {
                LifecycleStatus::Errored
            }
            Self::CheckingUpload
            | Self::CheckingDownload
            | Self::CheckingResumeData
            | Self::Moving => LifecycleStatus::Checking,
            Self::PausedDownload | Self::StoppedDownload => LifecycleStatus::Paused,
            Self::PausedUpload | Self::StoppedUpload => LifecycleStatus::Complete,
            Self::Uploading | Self::StalledUpload | Self::QueuedUpload | Self::ForcedUpload => {
                LifecycleStatus::Uploading
            }
            Self::Downloading
            | Self::MetadataDownload
            | Self::ForcedMetadataDownload
            | Self::StalledDownload
            | Self::QueuedDownload
            | Self::ForcedDownload
            | Self::Allocating => LifecycleStatus::Downloading,
        }
    }
}

impl From<&str> for TorrentState {
    fn from(value: &str) -> Self {
        match value {
            "error" => Self::Error,
            "missingFiles" => Self::MissingFiles,
            "uploading" => Self::Uploading,
            "pausedUP" => Self::PausedUpload,
            "stoppedUP" => Self::StoppedUpload,
            "queuedUP" => Self::QueuedUpload,
            "stalledUP" => Self::StalledUpload,
            "checkingUP" => Self::CheckingUpload,
            "forcedUP" => Self::ForcedUpload,
            "allocating" => Self::Allocating,
            "downloading" => Self::Downloading,
            "metaDL" => Self::MetadataDownload,
            "forcedMetaDL" => Self::ForcedMetadataDownload,
            "pausedDL" => Self::PausedDownload,
            "stoppedDL" => Self::StoppedDownload,
            "queuedDL" => Self::QueuedDownload,
            "forcedDL" => Self::ForcedDownload,
            "stalledDL" => Self::StalledDownload,
            "checkingDL" => Self::CheckingDownload,
            "checkingResumeData" => Self::CheckingResumeData,
            "moving" => Self::Moving,
            "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for TorrentState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}
