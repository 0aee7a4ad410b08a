//! Core types used throughout CarryLink

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for packages (random hex)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub String);

impl PackageId {
    /// Generate a new random package ID
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("pkg_{}", hex::encode(bytes)))
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable tracking code shown to senders and travelers
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingCode(pub String);

impl TrackingCode {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("TRK{}", hex::encode_upper(bytes)))
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier of a marketplace user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity acting on a package: who they are and the name to record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: UserId,
    pub name: String,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            name: name.into(),
        }
    }
}

/// Package size category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PackageSize {
    Small,
    Medium,
    Large,
}

impl fmt::Display for PackageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageSize::Small => "Small",
            PackageSize::Medium => "Medium",
            PackageSize::Large => "Large",
        };
        write!(f, "{}", name)
    }
}

/// Delivery lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatus {
    Posted,
    Negotiating,
    Accepted,
    EnRoute,
    Delivered,
    Cancelled,
}

impl PackageStatus {
    /// Statuses from which the price can still change
    pub fn is_open_for_negotiation(&self) -> bool {
        matches!(self, PackageStatus::Posted | PackageStatus::Negotiating)
    }

    /// Statuses in which a traveler is bound to the package
    pub fn has_traveler(&self) -> bool {
        matches!(
            self,
            PackageStatus::Accepted | PackageStatus::EnRoute | PackageStatus::Delivered
        )
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageStatus::Posted => "Posted",
            PackageStatus::Negotiating => "Negotiating",
            PackageStatus::Accepted => "Accepted",
            PackageStatus::EnRoute => "En Route",
            PackageStatus::Delivered => "Delivered",
            PackageStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", name)
    }
}
