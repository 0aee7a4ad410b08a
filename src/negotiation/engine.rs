//! Negotiation engine: turn-taking offers and acceptance on a single package

use crate::error::{CarryLinkError, Result};
use crate::package::Package;
use crate::types::{PackageStatus, Party, UserId};
use std::time::SystemTime;

use super::types::{Negotiation, Offer, Role};

/// Stateless transition function over package snapshots
///
/// Every operation takes an immutable package and returns the next package
/// state. Persisting the result is the caller's job.
#[derive(Clone, Copy, Debug, Default)]
pub struct NegotiationEngine;

impl NegotiationEngine {
    /// Create new negotiation engine
    pub fn new() -> Self {
        Self
    }

    /// Submit a price offer as `acting`
    pub fn submit_offer(&self, pkg: &Package, acting: &Party, price: f64) -> Result<Package> {
        self.submit_offer_at(pkg, acting, price, SystemTime::now())
    }

    /// Submit a price offer with an explicit timestamp
    pub fn submit_offer_at(
        &self,
        pkg: &Package,
        acting: &Party,
        price: f64,
        now: SystemTime,
    ) -> Result<Package> {
        ensure_open(pkg)?;

        if !price.is_finite() || price <= 0.0 {
            return Err(CarryLinkError::InvalidPrice(format!(
                "offer must be a positive amount, got {}",
                price
            )));
        }

        ensure_turn(pkg, &acting.id)?;

        let role = role_for(pkg, &acting.id);
        let offer = Offer {
            user_id: acting.id.clone(),
            user_name: acting.name.clone(),
            price,
            timestamp: now,
            role,
        };

        let mut next = pkg.clone();
        match next.negotiation.as_mut() {
            Some(negotiation) => negotiation.push(offer),
            None => {
                let sender = pkg.sender();
                let opening = Offer {
                    user_id: sender.id,
                    user_name: sender.name,
                    price: pkg.proposed_price,
                    timestamp: pkg.created_at,
                    role: Role::Sender,
                };
                next.negotiation = Some(Negotiation::open(opening, offer));
            }
        }
        next.status = PackageStatus::Negotiating;
        touch(&mut next, now);

        tracing::debug!(
            package = %pkg.id,
            user = %acting.id,
            %role,
            price,
            version = next.version,
            "offer recorded"
        );

        Ok(next)
    }

    /// Accept the price currently on the table
    pub fn accept(&self, pkg: &Package, acting: &Party) -> Result<Package> {
        self.accept_at(pkg, acting, SystemTime::now())
    }

    /// Accept the price currently on the table with an explicit timestamp
    ///
    /// Only the counterparty of the price on the table may accept it. Any
    /// traveler may take the sender's price and binds themselves. Only the
    /// sender may take a traveler's counter-offer, which binds that traveler.
    pub fn accept_at(&self, pkg: &Package, acting: &Party, now: SystemTime) -> Result<Package> {
        ensure_open(pkg)?;

        let last = pkg.negotiation.as_ref().and_then(Negotiation::last_offer);
        let on_table = last.map_or(Role::Sender, |offer| offer.role);

        let traveler = match (on_table, role_for(pkg, &acting.id), last) {
            (Role::Sender, Role::Traveler, _) => acting.clone(),
            (Role::Traveler, Role::Sender, Some(offer)) => Party {
                id: offer.user_id.clone(),
                name: offer.user_name.clone(),
            },
            _ => {
                return Err(CarryLinkError::NotYourTurn {
                    user_id: acting.id.0.clone(),
                })
            }
        };

        let mut next = pkg.clone();
        next.agreed_price = Some(display_price(pkg));
        next.status = PackageStatus::Accepted;
        next.traveler_id = Some(traveler.id);
        next.traveler_name = Some(traveler.name);
        touch(&mut next, now);

        tracing::debug!(
            package = %pkg.id,
            user = %acting.id,
            price = display_price(pkg),
            "package accepted"
        );

        Ok(next)
    }
}

/// Role of `user_id` on this package
pub fn role_for(pkg: &Package, user_id: &UserId) -> Role {
    if pkg.is_sender(user_id) {
        Role::Sender
    } else {
        Role::Traveler
    }
}

/// Price to show for a package
pub fn display_price(pkg: &Package) -> f64 {
    match (&pkg.negotiation, pkg.status) {
        (Some(negotiation), PackageStatus::Negotiating) => negotiation.current_price(),
        _ => pkg.proposed_price,
    }
}

/// Whether `user_id` may make the next offer on this package
pub fn can_offer(pkg: &Package, user_id: &UserId) -> bool {
    pkg.status.is_open_for_negotiation() && last_author(pkg) != user_id
}

/// Author of the price on the table; the sender's ask counts as an offer
fn last_author(pkg: &Package) -> &UserId {
    pkg.negotiation
        .as_ref()
        .and_then(Negotiation::last_offer)
        .map(|offer| &offer.user_id)
        .unwrap_or(&pkg.sender_id)
}

fn ensure_open(pkg: &Package) -> Result<()> {
    if pkg.status.is_open_for_negotiation() {
        Ok(())
    } else {
        Err(CarryLinkError::InvalidStatusForNegotiation(pkg.status))
    }
}

fn ensure_turn(pkg: &Package, user_id: &UserId) -> Result<()> {
    if last_author(pkg) == user_id {
        return Err(CarryLinkError::NotYourTurn {
            user_id: user_id.0.clone(),
        });
    }
    Ok(())
}

fn touch(pkg: &mut Package, now: SystemTime) {
    pkg.updated_at = now;
    pkg.version += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::NewPackage;
    use crate::types::PackageSize;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn sender() -> Party {
        Party::new("S", "Sade")
    }

    fn traveler() -> Party {
        Party::new("T", "Tunde")
    }

    fn posted() -> Package {
        Package::post(
            NewPackage {
                sender: sender(),
                origin_city: "Lagos".to_string(),
                destination_city: "Abuja".to_string(),
                size: PackageSize::Small,
                weight_kg: 1.0,
                description: "Documents".to_string(),
                image_ref: None,
                proposed_price: 15000.0,
            },
            at(1_000),
        )
        .unwrap()
    }

    #[test]
    fn test_first_counter_offer_opens_negotiation() {
        let engine = NegotiationEngine::new();
        let pkg = posted();

        let next = engine
            .submit_offer_at(&pkg, &traveler(), 12000.0, at(2_000))
            .unwrap();

        assert_eq!(next.status, PackageStatus::Negotiating);
        let negotiation = next.negotiation.as_ref().unwrap();
        assert_eq!(negotiation.original_price(), 15000.0);
        assert_eq!(negotiation.current_price(), 12000.0);
        assert_eq!(negotiation.last_offer_by(), Role::Traveler);

        let offers = negotiation.offers();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].user_id, UserId("S".to_string()));
        assert_eq!(offers[0].user_name, "Sade");
        assert_eq!(offers[0].price, 15000.0);
        assert_eq!(offers[0].role, Role::Sender);
        assert_eq!(offers[0].timestamp, at(1_000));
        assert_eq!(offers[1].user_id, UserId("T".to_string()));
        assert_eq!(offers[1].role, Role::Traveler);
        assert_eq!(offers[1].timestamp, at(2_000));

        assert_eq!(next.updated_at, at(2_000));
        assert_eq!(next.created_at, at(1_000));
        assert_eq!(next.version, pkg.version + 1);
        // input snapshot untouched
        assert!(pkg.negotiation.is_none());
        assert_eq!(pkg.status, PackageStatus::Posted);
    }

    #[test]
    fn test_same_party_cannot_offer_twice() {
        let engine = NegotiationEngine::new();
        let pkg = engine
            .submit_offer(&posted(), &traveler(), 12000.0)
            .unwrap();

        let result = engine.submit_offer(&pkg, &traveler(), 11000.0);
        assert!(matches!(result, Err(CarryLinkError::NotYourTurn { .. })));
    }

    #[test]
    fn test_sender_cannot_counter_own_ask() {
        let engine = NegotiationEngine::new();
        let result = engine.submit_offer(&posted(), &sender(), 14000.0);
        assert!(matches!(result, Err(CarryLinkError::NotYourTurn { .. })));
    }

    #[test]
    fn test_sender_responds_to_traveler() {
        let engine = NegotiationEngine::new();
        let pkg = engine
            .submit_offer(&posted(), &traveler(), 12000.0)
            .unwrap();
        let pkg = engine.submit_offer(&pkg, &sender(), 13000.0).unwrap();

        let negotiation = pkg.negotiation.as_ref().unwrap();
        assert_eq!(negotiation.offers().len(), 3);
        assert_eq!(negotiation.current_price(), 13000.0);
        assert_eq!(negotiation.last_offer_by(), Role::Sender);
        assert_eq!(negotiation.original_price(), 15000.0);
    }

    #[test]
    fn test_role_is_derived_from_package() {
        let pkg = posted();
        assert_eq!(role_for(&pkg, &UserId("S".to_string())), Role::Sender);
        assert_eq!(role_for(&pkg, &UserId("anyone".to_string())), Role::Traveler);
    }

    #[test]
    fn test_invalid_prices_rejected() {
        let engine = NegotiationEngine::new();
        let pkg = posted();

        for price in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let result = engine.submit_offer(&pkg, &traveler(), price);
            assert!(matches!(result, Err(CarryLinkError::InvalidPrice(_))));
        }
    }

    #[test]
    fn test_closed_statuses_reject_offers() {
        let engine = NegotiationEngine::new();

        for status in [
            PackageStatus::Accepted,
            PackageStatus::EnRoute,
            PackageStatus::Delivered,
            PackageStatus::Cancelled,
        ] {
            let mut pkg = posted();
            pkg.status = status;

            // status gating wins over price validation
            for price in [12000.0, -1.0] {
                let result = engine.submit_offer(&pkg, &traveler(), price);
                assert!(matches!(
                    result,
                    Err(CarryLinkError::InvalidStatusForNegotiation(s)) if s == status
                ));
            }
        }
    }

    #[test]
    fn test_traveler_accepts_posted_price() {
        let engine = NegotiationEngine::new();
        let pkg = posted();

        let accepted = engine.accept_at(&pkg, &traveler(), at(3_000)).unwrap();

        assert_eq!(accepted.status, PackageStatus::Accepted);
        assert_eq!(accepted.traveler_id, Some(UserId("T".to_string())));
        assert_eq!(accepted.traveler_name.as_deref(), Some("Tunde"));
        assert_eq!(accepted.agreed_price, Some(15000.0));
        assert!(accepted.negotiation.is_none());
        assert_eq!(accepted.updated_at, at(3_000));
    }

    #[test]
    fn test_sender_accepts_counter_offer() {
        let engine = NegotiationEngine::new();
        let pkg = engine
            .submit_offer(&posted(), &traveler(), 12000.0)
            .unwrap();

        let accepted = engine.accept(&pkg, &sender()).unwrap();

        assert_eq!(accepted.status, PackageStatus::Accepted);
        assert_eq!(accepted.traveler_id, Some(UserId("T".to_string())));
        assert_eq!(accepted.agreed_price, Some(12000.0));
        // history retained after acceptance
        assert_eq!(accepted.negotiation.as_ref().unwrap().offers().len(), 2);
    }

    #[test]
    fn test_accept_follows_turn_rule() {
        let engine = NegotiationEngine::new();

        // sender cannot accept their own ask
        let result = engine.accept(&posted(), &sender());
        assert!(matches!(result, Err(CarryLinkError::NotYourTurn { .. })));

        // traveler cannot accept their own counter-offer
        let pkg = engine
            .submit_offer(&posted(), &traveler(), 12000.0)
            .unwrap();
        let result = engine.accept(&pkg, &traveler());
        assert!(matches!(result, Err(CarryLinkError::NotYourTurn { .. })));

        // nothing can be accepted twice
        let accepted = engine.accept(&pkg, &sender()).unwrap();
        let result = engine.accept(&accepted, &traveler());
        assert!(matches!(
            result,
            Err(CarryLinkError::InvalidStatusForNegotiation(PackageStatus::Accepted))
        ));
    }

    #[test]
    fn test_only_counterparty_accepts_counter_offer() {
        let engine = NegotiationEngine::new();
        let pkg = engine
            .submit_offer(&posted(), &traveler(), 12000.0)
            .unwrap();

        // another traveler cannot take over T's bid
        let result = engine.accept(&pkg, &Party::new("U", "Uche"));
        assert!(matches!(
            result,
            Err(CarryLinkError::NotYourTurn { user_id }) if user_id == "U"
        ));

        // once the sender counters, any traveler may take the sender's price
        let pkg = engine.submit_offer(&pkg, &sender(), 13000.0).unwrap();
        let accepted = engine.accept(&pkg, &Party::new("U", "Uche")).unwrap();
        assert_eq!(accepted.traveler_id, Some(UserId("U".to_string())));
        assert_eq!(accepted.agreed_price, Some(13000.0));
    }

    #[test]
    fn test_display_price() {
        let engine = NegotiationEngine::new();
        let pkg = posted();
        assert_eq!(display_price(&pkg), 15000.0);

        let negotiating = engine.submit_offer(&pkg, &traveler(), 12000.0).unwrap();
        assert_eq!(display_price(&negotiating), 12000.0);

        let accepted = engine.accept(&negotiating, &sender()).unwrap();
        assert_eq!(display_price(&accepted), 15000.0);
        assert_eq!(accepted.agreed_price, Some(12000.0));
    }

    #[test]
    fn test_can_offer_matches_submit_offer() {
        let engine = NegotiationEngine::new();
        let s = UserId("S".to_string());
        let t = UserId("T".to_string());

        let pkg = posted();
        assert!(!can_offer(&pkg, &s));
        assert!(can_offer(&pkg, &t));

        let pkg = engine.submit_offer(&pkg, &traveler(), 12000.0).unwrap();
        assert!(can_offer(&pkg, &s));
        assert!(!can_offer(&pkg, &t));

        let accepted = engine.accept(&pkg, &sender()).unwrap();
        assert!(!can_offer(&accepted, &s));
        assert!(!can_offer(&accepted, &t));
    }
}
