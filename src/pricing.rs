//! Advisory price suggestions for new packages

use crate::error::{CarryLinkError, Result};
use crate::types::PackageSize;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// What the advisor needs to know about a package
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceSuggestionRequest {
    pub size: PackageSize,
    pub weight_kg: f64,
    pub origin_city: String,
    pub destination_city: String,
}

impl PriceSuggestionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.origin_city.trim().is_empty() || self.destination_city.trim().is_empty() {
            return Err(CarryLinkError::InvalidPackage(
                "origin and destination cities are required for a suggestion".to_string(),
            ));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(CarryLinkError::InvalidPackage(format!(
                "weight must be a positive number of kilograms, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }

    fn is_intercity(&self) -> bool {
        !self
            .origin_city
            .trim()
            .eq_ignore_ascii_case(self.destination_city.trim())
    }
}

/// Suggested price and the rationale behind it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub suggested_price: f64,
    pub reasoning: String,
}

/// Source of advisory prices
///
/// Suggestions never gate an offer; callers treat failures as "no advice".
pub trait PriceAdvisor: Send + Sync {
    fn suggest(
        &self,
        request: &PriceSuggestionRequest,
    ) -> impl Future<Output = Result<PriceSuggestion>> + Send;
}

/// Offline advisor pricing from a fixed rate card
#[derive(Clone, Debug, PartialEq)]
pub struct RateCardAdvisor {
    pub small_base: f64,
    pub medium_base: f64,
    pub large_base: f64,
    pub per_kg: f64,
    pub intercity_surcharge: f64,
    /// Prices are rounded up to a multiple of this
    pub rounding: f64,
}

impl Default for RateCardAdvisor {
    fn default() -> Self {
        Self {
            small_base: 2000.0,
            medium_base: 4000.0,
            large_base: 7000.0,
            per_kg: 500.0,
            intercity_surcharge: 1500.0,
            rounding: 100.0,
        }
    }
}

impl RateCardAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn base_for(&self, size: PackageSize) -> f64 {
        match size {
            PackageSize::Small => self.small_base,
            PackageSize::Medium => self.medium_base,
            PackageSize::Large => self.large_base,
        }
    }

    /// Compute a suggestion synchronously
    pub fn quote(&self, request: &PriceSuggestionRequest) -> Result<PriceSuggestion> {
        request.validate()?;

        let base = self.base_for(request.size);
        let weight_charge = self.per_kg * request.weight_kg;
        let surcharge = if request.is_intercity() {
            self.intercity_surcharge
        } else {
            0.0
        };

        let raw = base + weight_charge + surcharge;
        let suggested_price = if self.rounding > 0.0 {
            (raw / self.rounding).ceil() * self.rounding
        } else {
            raw
        };
        if !suggested_price.is_finite() || suggested_price <= 0.0 {
            return Err(CarryLinkError::PriceAdvisor(format!(
                "rate card produced an unusable price {}",
                suggested_price
            )));
        }

        let mut reasoning = format!(
            "{} package base rate {:.2} plus {:.2} for {} kg",
            request.size, base, weight_charge, request.weight_kg
        );
        if surcharge > 0.0 {
            reasoning.push_str(&format!(
                ", plus {:.2} for travel from {} to {}",
                surcharge,
                request.origin_city.trim(),
                request.destination_city.trim()
            ));
        } else {
            reasoning.push_str(", same-city delivery");
        }

        Ok(PriceSuggestion {
            suggested_price,
            reasoning,
        })
    }
}

impl PriceAdvisor for RateCardAdvisor {
    fn suggest(
        &self,
        request: &PriceSuggestionRequest,
    ) -> impl Future<Output = Result<PriceSuggestion>> + Send {
        let quote = self.quote(request);
        async move { quote }
    }
}
