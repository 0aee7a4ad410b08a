//! Delivery requests posted by senders

use crate::error::{CarryLinkError, Result};
use crate::negotiation::Negotiation;
use crate::types::{PackageId, PackageSize, PackageStatus, Party, TrackingCode, UserId};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Sender-supplied fields for a new delivery request
#[derive(Clone, Debug)]
pub struct NewPackage {
    pub sender: Party,
    pub origin_city: String,
    pub destination_city: String,
    pub size: PackageSize,
    pub weight_kg: f64,
    pub description: String,
    pub image_ref: Option<String>,
    pub proposed_price: f64,
}

/// A delivery request and its commercial state
///
/// Price and status fields are only changed through
/// [`NegotiationEngine`](crate::negotiation::NegotiationEngine), which also
/// bumps `version` for the store's compare-and-swap guard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub tracking_code: TrackingCode,
    pub sender_id: UserId,
    pub sender_name: String,
    pub traveler_id: Option<UserId>,
    pub traveler_name: Option<String>,
    pub origin_city: String,
    pub destination_city: String,
    pub size: PackageSize,
    pub weight_kg: f64,
    pub description: String,
    pub image_ref: Option<String>,
    pub proposed_price: f64,
    pub agreed_price: Option<f64>,
    pub status: PackageStatus,
    pub negotiation: Option<Negotiation>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
    pub version: u64,
}

impl Package {
    /// Validate a new request and create it in status `Posted`
    pub fn post(new: NewPackage, now: SystemTime) -> Result<Self> {
        if new.origin_city.trim().is_empty() || new.destination_city.trim().is_empty() {
            return Err(CarryLinkError::InvalidPackage(
                "origin and destination cities are required".to_string(),
            ));
        }
        if !new.weight_kg.is_finite() || new.weight_kg <= 0.0 {
            return Err(CarryLinkError::InvalidPackage(format!(
                "weight must be a positive number of kilograms, got {}",
                new.weight_kg
            )));
        }
        if !new.proposed_price.is_finite() || new.proposed_price <= 0.0 {
            return Err(CarryLinkError::InvalidPackage(format!(
                "proposed price must be positive, got {}",
                new.proposed_price
            )));
        }

        Ok(Self {
            id: PackageId::generate(),
            tracking_code: TrackingCode::generate(),
            sender_id: new.sender.id,
            sender_name: new.sender.name,
            traveler_id: None,
            traveler_name: None,
            origin_city: new.origin_city.trim().to_string(),
            destination_city: new.destination_city.trim().to_string(),
            size: new.size,
            weight_kg: new.weight_kg,
            description: new.description,
            image_ref: new.image_ref,
            proposed_price: new.proposed_price,
            agreed_price: None,
            status: PackageStatus::Posted,
            negotiation: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// The sender as a party, as recorded on the package
    pub fn sender(&self) -> Party {
        Party {
            id: self.sender_id.clone(),
            name: self.sender_name.clone(),
        }
    }

    pub fn is_sender(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }
}
