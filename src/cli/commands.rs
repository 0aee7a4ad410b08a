//! CLI command definitions

use crate::types::PackageSize;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carrylink")]
#[command(about = "CarryLink - peer-to-peer package delivery with price negotiation", long_about = None)]
pub struct Cli {
    /// Package store file (overrides CARRYLINK_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post a new package as sender
    Post {
        #[arg(long)]
        sender_id: String,

        #[arg(long)]
        sender_name: String,

        /// Origin city
        #[arg(long)]
        from: String,

        /// Destination city
        #[arg(long)]
        to: String,

        /// Package size
        #[arg(short, long, value_enum, ignore_case = true)]
        size: PackageSize,

        /// Weight in kilograms
        #[arg(short, long)]
        weight: f64,

        /// Asking price
        #[arg(short, long, allow_hyphen_values = true)]
        price: f64,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Image reference
        #[arg(long)]
        image: Option<String>,
    },

    /// Make an offer on a package
    Offer {
        package_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        user_name: String,

        /// Offered price
        #[arg(short, long, allow_hyphen_values = true)]
        price: f64,
    },

    /// Accept the price currently on the table
    Accept {
        package_id: String,

        #[arg(long)]
        user_id: String,

        #[arg(long)]
        user_name: String,
    },

    /// Show a package and its offer history
    Show { package_id: String },

    /// List all packages
    List,

    /// Check whether a user may make the next offer
    CanOffer {
        package_id: String,

        #[arg(long)]
        user_id: String,
    },

    /// Get an advisory price for a package
    Suggest {
        /// Package size
        #[arg(short, long, value_enum, ignore_case = true)]
        size: PackageSize,

        /// Weight in kilograms
        #[arg(short, long)]
        weight: f64,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },
}
