//! Marketplace service: engine transitions persisted with compare-and-swap

use crate::error::Result;
use crate::negotiation::{self, NegotiationEngine};
use crate::package::{NewPackage, Package};
use crate::pricing::{PriceAdvisor, PriceSuggestion, PriceSuggestionRequest};
use crate::store::PackageStore;
use crate::types::{PackageId, Party, UserId};
use std::time::SystemTime;

/// Ties a package store, the negotiation engine and a price advisor together
pub struct Marketplace<S, A> {
    store: S,
    advisor: A,
    engine: NegotiationEngine,
    cas_retries: u32,
}

impl<S: PackageStore, A: PriceAdvisor> Marketplace<S, A> {
    pub fn new(store: S, advisor: A, cas_retries: u32) -> Self {
        Self {
            store,
            advisor,
            engine: NegotiationEngine::new(),
            cas_retries: cas_retries.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Post a new delivery request
    pub fn post_package(&self, new: NewPackage) -> Result<Package> {
        let package = Package::post(new, SystemTime::now())?;
        self.store.insert(package.clone())?;

        tracing::info!(
            package = %package.id,
            tracking = %package.tracking_code,
            sender = %package.sender_id,
            price = package.proposed_price,
            "package posted"
        );

        Ok(package)
    }

    /// Make an offer on a package as `acting`
    pub fn submit_offer(&self, id: &PackageId, acting: &Party, price: f64) -> Result<Package> {
        let updated = self.transition(id, |pkg| self.engine.submit_offer(pkg, acting, price))?;

        tracing::info!(
            package = %id,
            user = %acting.id,
            price,
            "offer submitted"
        );

        Ok(updated)
    }

    /// Accept the price on the table as `acting`
    pub fn accept(&self, id: &PackageId, acting: &Party) -> Result<Package> {
        let updated = self.transition(id, |pkg| self.engine.accept(pkg, acting))?;

        tracing::info!(
            package = %id,
            user = %acting.id,
            traveler = ?updated.traveler_id,
            price = ?updated.agreed_price,
            "package accepted"
        );

        Ok(updated)
    }

    pub fn package(&self, id: &PackageId) -> Result<Package> {
        self.store.load(id)
    }

    pub fn packages(&self) -> Result<Vec<Package>> {
        self.store.list()
    }

    /// Whether `user_id` may make the next offer on a package
    pub fn can_offer(&self, id: &PackageId, user_id: &UserId) -> Result<bool> {
        let pkg = self.store.load(id)?;
        Ok(negotiation::can_offer(&pkg, user_id))
    }

    /// Ask the advisor for a starting price
    pub async fn suggest_price(&self, request: &PriceSuggestionRequest) -> Result<PriceSuggestion> {
        request.validate()?;
        self.advisor.suggest(request).await
    }

    /// Load, apply `step`, and swap, reloading on version conflicts
    fn transition<F>(&self, id: &PackageId, step: F) -> Result<Package>
    where
        F: Fn(&Package) -> Result<Package>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.store.load(id)?;
            let next = step(&current)?;

            match self.store.compare_and_swap(&current, next.clone()) {
                Ok(()) => return Ok(next),
                Err(err) if err.is_retryable() && attempt < self.cas_retries => {
                    tracing::warn!(package = %id, attempt, error = %err, "version conflict, retrying");
                }
                Err(err) => {
                    if err.is_retryable() {
                        tracing::warn!(package = %id, attempt, "giving up after version conflicts");
                    }
                    return Err(err);
                }
            }
        }
    }
}
