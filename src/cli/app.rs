//! CarryLink application wiring the CLI to the marketplace

use crate::config::Config;
use crate::error::Result;
use crate::marketplace::Marketplace;
use crate::negotiation::{can_offer, display_price, role_for};
use crate::package::{NewPackage, Package};
use crate::pricing::{PriceSuggestion, PriceSuggestionRequest, RateCardAdvisor};
use crate::store::JsonFileStore;
use crate::types::{PackageId, Party, UserId};
use std::fmt::Write;

use super::commands::Commands;

/// Main CarryLink application
pub struct CarryLinkApp {
    market: Marketplace<JsonFileStore, RateCardAdvisor>,
}

impl CarryLinkApp {
    /// Create the application over the configured store file
    pub fn new(config: &Config) -> Self {
        let store = JsonFileStore::new(&config.store_path);
        tracing::debug!(store = %config.store_path.display(), "opening package store");

        Self {
            market: Marketplace::new(store, RateCardAdvisor::new(), config.cas_retries),
        }
    }

    pub fn market(&self) -> &Marketplace<JsonFileStore, RateCardAdvisor> {
        &self.market
    }

    /// Run one command and return the text to print
    pub async fn execute(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Post {
                sender_id,
                sender_name,
                from,
                to,
                size,
                weight,
                price,
                description,
                image,
            } => {
                let package = self.market.post_package(NewPackage {
                    sender: Party::new(sender_id, sender_name),
                    origin_city: from,
                    destination_city: to,
                    size,
                    weight_kg: weight,
                    description,
                    image_ref: image,
                    proposed_price: price,
                })?;
                Ok(format!(
                    "Posted {} (tracking {})\n{}",
                    package.id,
                    package.tracking_code,
                    render_package(&package)
                ))
            }

            Commands::Offer {
                package_id,
                user_id,
                user_name,
                price,
            } => {
                let package = self.market.submit_offer(
                    &PackageId(package_id),
                    &Party::new(user_id, user_name),
                    price,
                )?;
                Ok(format!(
                    "Offer of {:.2} submitted\n{}",
                    price,
                    render_package(&package)
                ))
            }

            Commands::Accept {
                package_id,
                user_id,
                user_name,
            } => {
                let package = self
                    .market
                    .accept(&PackageId(package_id), &Party::new(user_id, user_name))?;
                Ok(format!("Package accepted\n{}", render_package(&package)))
            }

            Commands::Show { package_id } => {
                let package = self.market.package(&PackageId(package_id))?;
                Ok(render_package(&package))
            }

            Commands::List => {
                let packages = self.market.packages()?;
                if packages.is_empty() {
                    return Ok("No packages posted yet".to_string());
                }
                Ok(packages
                    .iter()
                    .map(render_summary)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }

            Commands::CanOffer {
                package_id,
                user_id,
            } => {
                let id = PackageId(package_id);
                let user = UserId(user_id);
                let package = self.market.package(&id)?;
                Ok(if can_offer(&package, &user) {
                    format!("{} may make the next offer as {}", user, role_for(&package, &user))
                } else {
                    format!("{} cannot make an offer on {} right now", user, id)
                })
            }

            Commands::Suggest {
                size,
                weight,
                from,
                to,
            } => {
                let request = PriceSuggestionRequest {
                    size,
                    weight_kg: weight,
                    origin_city: from,
                    destination_city: to,
                };
                let suggestion = self.market.suggest_price(&request).await?;
                Ok(render_suggestion(&suggestion))
            }
        }
    }
}

/// One-line summary for listings
pub fn render_summary(pkg: &Package) -> String {
    format!(
        "{}  {}  {} -> {}  {}  {:.2}",
        pkg.id,
        pkg.tracking_code,
        pkg.origin_city,
        pkg.destination_city,
        pkg.status,
        display_price(pkg)
    )
}

/// Full package view with offer history
pub fn render_package(pkg: &Package) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Package {} ({})", pkg.id, pkg.tracking_code);
    let _ = writeln!(out, "  Route:    {} -> {}", pkg.origin_city, pkg.destination_city);
    let _ = writeln!(out, "  Size:     {}, {} kg", pkg.size, pkg.weight_kg);
    if !pkg.description.is_empty() {
        let _ = writeln!(out, "  Details:  {}", pkg.description);
    }
    let _ = writeln!(out, "  Sender:   {} ({})", pkg.sender_name, pkg.sender_id);
    if let (Some(id), Some(name)) = (&pkg.traveler_id, &pkg.traveler_name) {
        let _ = writeln!(out, "  Traveler: {} ({})", name, id);
    }
    let _ = writeln!(out, "  Status:   {}", pkg.status);
    let _ = writeln!(
        out,
        "  Price:    {:.2} (asked {:.2})",
        display_price(pkg),
        pkg.proposed_price
    );
    if let Some(agreed) = pkg.agreed_price {
        let _ = writeln!(out, "  Agreed:   {:.2}", agreed);
    }

    if let Some(negotiation) = &pkg.negotiation {
        let _ = writeln!(out, "  Offers:");
        for (i, offer) in negotiation.offers().iter().enumerate() {
            let _ = writeln!(
                out,
                "    {}. {} ({}) {:.2}",
                i + 1,
                offer.user_name,
                offer.role,
                offer.price
            );
        }
    }

    out.trim_end().to_string()
}

fn render_suggestion(suggestion: &PriceSuggestion) -> String {
    format!(
        "Suggested price: {:.2}\n{}",
        suggestion.suggested_price, suggestion.reasoning
    )
}
