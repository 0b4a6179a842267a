use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;
use crate::directory::{ExpertFilters, SortKey};
use crate::utils::truncate_str;

#[derive(ClapArgs)]
pub struct Args {
    /// Substring match against expert name or specialty
    #[arg(long)]
    pub search: Option<String>,

    /// Keep only experts currently available
    #[arg(long)]
    pub available: bool,

    /// Language tag to match (repeatable, any match keeps the expert)
    #[arg(long = "language")]
    pub languages: Vec<String>,

    /// Minimum price per minute (inclusive)
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price per minute (inclusive)
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Sort key: rating, price_asc, price_desc
    #[arg(long)]
    pub sort: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;

    let price_range = match (args.min_price, args.max_price) {
        (None, None) => None,
        (min, max) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::MAX))),
    };
    let filters = ExpertFilters {
        search_term: args.search,
        only_available: args.available,
        selected_languages: args.languages,
        price_range,
        sort: SortKey::parse(args.sort.as_deref()),
    };

    let experts = core.directory().query(&filters).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&experts)?);
        return Ok(());
    }

    if experts.is_empty() {
        println!("No experts match the given filters.");
        return Ok(());
    }

    for expert in experts {
        let price = expert
            .price_per_minute
            .map(|p| format!("{p:.2}/min"))
            .unwrap_or_else(|| "rate not published".to_string());
        println!(
            "{:<12} {:<20} {:<24} {:.1}★ {} {} [{}]",
            expert.id,
            truncate_str(&expert.name, 20),
            truncate_str(&expert.specialty, 24),
            expert.rating,
            if expert.available { "available" } else { "offline" },
            price,
            expert.languages.join(","),
        );
    }

    Ok(())
}
