//! Negotiation types: roles, offers and the bargaining history

use crate::error::CarryLinkError;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Role of a party on a particular package
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sender,
    Traveler,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "sender"),
            Role::Traveler => write!(f, "traveler"),
        }
    }
}

/// One bargaining move
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub user_id: UserId,
    /// Name at the time of the offer, not a live lookup
    pub user_name: String,
    pub price: f64,
    pub timestamp: SystemTime,
    pub role: Role,
}

/// Ordered offer history attached to a package once counter-offers begin
///
/// `current_price` and `last_offer_by` mirror the last offer and are only
/// written by [`Negotiation::open`] and [`Negotiation::push`]. Deserialized
/// histories are checked against the same rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNegotiation")]
pub struct Negotiation {
    original_price: f64,
    offers: Vec<Offer>,
    current_price: f64,
    last_offer_by: Role,
}

/// Unchecked wire form of [`Negotiation`]
#[derive(Deserialize)]
struct RawNegotiation {
    original_price: f64,
    offers: Vec<Offer>,
    current_price: f64,
    last_offer_by: Role,
}

impl TryFrom<RawNegotiation> for Negotiation {
    type Error = CarryLinkError;

    fn try_from(raw: RawNegotiation) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| CarryLinkError::StateCorruption(format!("negotiation {reason}"));

        let (opening, last) = match raw.offers.as_slice() {
            [opening, .., last] => (opening, last),
            _ => return Err(corrupt("needs an opening ask and a counter-offer")),
        };
        if opening.role != Role::Sender || opening.price != raw.original_price {
            return Err(corrupt("does not start with the sender's original ask"));
        }
        if last.price != raw.current_price || last.role != raw.last_offer_by {
            return Err(corrupt("current price does not match the last offer"));
        }

        Ok(Self {
            original_price: raw.original_price,
            offers: raw.offers,
            current_price: raw.current_price,
            last_offer_by: raw.last_offer_by,
        })
    }
}

impl Negotiation {
    /// Start a negotiation from the sender's opening ask and the first counter
    pub fn open(opening: Offer, counter: Offer) -> Self {
        let original_price = opening.price;
        let current_price = counter.price;
        let last_offer_by = counter.role;

        Self {
            original_price,
            offers: vec![opening, counter],
            current_price,
            last_offer_by,
        }
    }

    /// Append an offer
    pub fn push(&mut self, offer: Offer) {
        self.current_price = offer.price;
        self.last_offer_by = offer.role;
        self.offers.push(offer);
    }

    pub fn original_price(&self) -> f64 {
        self.original_price
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn last_offer_by(&self) -> Role {
        self.last_offer_by
    }

    pub fn last_offer(&self) -> Option<&Offer> {
        self.offers.last()
    }
}
