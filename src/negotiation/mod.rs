//! Negotiation module for package price bargaining

pub mod engine;
pub mod types;

pub use engine::{can_offer, display_price, role_for, NegotiationEngine};
pub use types::{Negotiation, Offer, Role};
