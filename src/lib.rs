//! CarryLink
//!
//! Core of a peer-to-peer package delivery marketplace. Senders post
//! packages, travelers counter-offer or accept, and both sides bargain over
//! the price with strict turn-taking:
//! - `negotiation`: the offer/acceptance state machine
//! - `store`: package persistence with version compare-and-swap
//! - `pricing`: advisory price suggestions
//! - `marketplace`: the service tying them together

pub mod cli;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod negotiation;
pub mod package;
pub mod pricing;
pub mod store;
pub mod types;

// Re-export commonly used types and functions
pub use error::{CarryLinkError, Result};
pub use marketplace::Marketplace;
pub use negotiation::{can_offer, display_price, role_for, Negotiation, NegotiationEngine, Offer, Role};
pub use package::{NewPackage, Package};
pub use types::{PackageId, PackageSize, PackageStatus, Party, TrackingCode, UserId};
