mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_add, cmd_aisle_add, cmd_aisle_delete, cmd_aisle_list, cmd_aisle_reorder, cmd_clear,
    cmd_export, cmd_forget, cmd_frequent, cmd_import, cmd_list_archive, cmd_list_create,
    cmd_list_delete, cmd_list_rename, cmd_list_select, cmd_list_show, cmd_list_unarchive,
    cmd_offer_add, cmd_offer_delete, cmd_offer_list, cmd_remove, cmd_show, cmd_suggest,
    cmd_toggle, cmd_update,
};
use crate::config::Config;
use cesta_core::service::CestaService;

#[derive(Parser)]
#[command(
    name = "cesta",
    version,
    about = "A simple shopping-list manager CLI",
    long_about = "\n\n   ██████╗███████╗███████╗████████╗ █████╗
  ██╔════╝██╔════╝██╔════╝╚══██╔══╝██╔══██╗
  ██║     █████╗  ███████╗   ██║   ███████║
  ██║     ██╔══╝  ╚════██║   ██║   ██╔══██║
  ╚██████╗███████╗███████║   ██║   ██║  ██║
   ╚═════╝╚══════╝╚══════╝   ╚═╝   ╚═╝  ╚═╝
        know what you're buying.
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the selected list
    Add {
        /// Product name
        name: String,
        /// Quantity (default: 1)
        #[arg(short, long, default_value = "1")]
        quantity: f64,
        /// Unit price
        #[arg(short, long)]
        price: Option<f64>,
        /// Aisle ID (default: remembered from history, else the first aisle)
        #[arg(short, long)]
        aisle: Option<i64>,
        /// Offer ID to apply
        #[arg(short, long)]
        offer: Option<i64>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// List ID (default: the selected list)
        #[arg(long)]
        list: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a product (name, quantity, price, aisle, offer, notes)
    Update {
        /// Product ID
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New quantity
        #[arg(short, long)]
        quantity: Option<f64>,
        /// New unit price
        #[arg(short, long)]
        price: Option<f64>,
        /// Remove the unit price
        #[arg(long, conflicts_with = "price")]
        clear_price: bool,
        /// New aisle ID
        #[arg(short, long)]
        aisle: Option<i64>,
        /// New offer ID
        #[arg(short, long)]
        offer: Option<i64>,
        /// Remove the offer
        #[arg(long, conflicts_with = "offer")]
        clear_offer: bool,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a product by ID
    Remove {
        /// Product ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a product between purchased and pending
    Toggle {
        /// Product ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the selected list grouped by aisle, with totals
    Show {
        /// Only show one aisle
        #[arg(short, long)]
        aisle: Option<i64>,
        /// List ID (default: the selected list)
        #[arg(long)]
        list: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove products from the selected list
    Clear {
        /// Only remove purchased products
        #[arg(long)]
        purchased: bool,
        /// List ID (default: the selected list)
        #[arg(long)]
        list: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest product names matching a prefix
    Suggest {
        /// Name prefix (at least 2 characters)
        prefix: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the most frequently added products
    Frequent {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget a remembered product name
    Forget {
        /// Product name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a list to a JSON file
    Export {
        /// Output file path
        file: std::path::PathBuf,
        /// List ID (default: the selected list)
        #[arg(long)]
        list: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a list from a JSON file (replaces the list's products)
    Import {
        /// Input file path
        file: std::path::PathBuf,
        /// List ID (default: the selected list)
        #[arg(long)]
        list: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage shopping lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Manage aisles
    Aisle {
        #[command(subcommand)]
        command: AisleCommands,
    },
    /// Manage offers
    Offer {
        #[command(subcommand)]
        command: OfferCommands,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create a new list and select it
    Create {
        /// List name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a list
    Rename {
        /// List ID
        id: i64,
        /// New name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Archive an active list
    Archive {
        /// List ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Bring an archived list back to active
    Unarchive {
        /// List ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete an archived list and its products
    Delete {
        /// List ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Select the list product commands act on
    Select {
        /// List ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all lists
    Show {
        /// Include archived lists
        #[arg(short, long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AisleCommands {
    /// Add a custom aisle
    Add {
        /// Aisle name
        name: String,
        /// Emoji shown next to the name
        #[arg(short, long, default_value = "")]
        emoji: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a custom aisle (default aisles are protected)
    Delete {
        /// Aisle ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reorder aisles by listing their IDs in walk order
    Reorder {
        /// Aisle IDs in the new order
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all aisles in walk order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum OfferCommands {
    /// Add a custom offer
    Add {
        /// Offer code (e.g. "3x2")
        code: String,
        /// Display name
        name: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Documentation-only formula text
        #[arg(short, long, default_value = "")]
        formula: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a custom offer (built-in offers are protected)
    Delete {
        /// Offer ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show all offers
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let svc = CestaService::new(&config.db_path)?;

    match cli.command {
        Commands::Add {
            name,
            quantity,
            price,
            aisle,
            offer,
            notes,
            list,
            json,
        } => cmd_add(
            &svc,
            &name,
            quantity,
            price,
            aisle,
            offer,
            notes.as_deref(),
            list,
            json,
        ),
        Commands::Update {
            id,
            name,
            quantity,
            price,
            clear_price,
            aisle,
            offer,
            clear_offer,
            notes,
            json,
        } => cmd_update(
            &svc,
            id,
            name,
            quantity,
            price,
            clear_price,
            aisle,
            offer,
            clear_offer,
            notes,
            json,
        ),
        Commands::Remove { id, json } => cmd_remove(&svc, id, json),
        Commands::Toggle { id, json } => cmd_toggle(&svc, id, json),
        Commands::Show { aisle, list, json } => cmd_show(&svc, aisle, list, json),
        Commands::Clear {
            purchased,
            list,
            json,
        } => cmd_clear(&svc, purchased, list, json),
        Commands::Suggest { prefix, json } => cmd_suggest(&svc, &prefix, json),
        Commands::Frequent { json } => cmd_frequent(&svc, json),
        Commands::Forget { name, json } => cmd_forget(&svc, &name, json),
        Commands::Export { file, list, json } => cmd_export(&svc, &file, list, json),
        Commands::Import { file, list, json } => cmd_import(&svc, &file, list, json),
        Commands::List { command } => match command {
            ListCommands::Create { name, json } => cmd_list_create(&svc, &name, json),
            ListCommands::Rename { id, name, json } => cmd_list_rename(&svc, id, &name, json),
            ListCommands::Archive { id, json } => cmd_list_archive(&svc, id, json),
            ListCommands::Unarchive { id, json } => cmd_list_unarchive(&svc, id, json),
            ListCommands::Delete { id, json } => cmd_list_delete(&svc, id, json),
            ListCommands::Select { id, json } => cmd_list_select(&svc, id, json),
            ListCommands::Show { all, json } => cmd_list_show(&svc, all, json),
        },
        Commands::Aisle { command } => match command {
            AisleCommands::Add { name, emoji, json } => cmd_aisle_add(&svc, &name, &emoji, json),
            AisleCommands::Delete { id, json } => cmd_aisle_delete(&svc, id, json),
            AisleCommands::Reorder { ids, json } => cmd_aisle_reorder(&svc, &ids, json),
            AisleCommands::List { json } => cmd_aisle_list(&svc, json),
        },
        Commands::Offer { command } => match command {
            OfferCommands::Add {
                code,
                name,
                description,
                formula,
                json,
            } => cmd_offer_add(&svc, &code, &name, &description, &formula, json),
            OfferCommands::Delete { id, json } => cmd_offer_delete(&svc, id, json),
            OfferCommands::List { json } => cmd_offer_list(&svc, json),
        },
    }
}
