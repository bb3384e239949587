mod models;
mod scrapers;
mod store;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use scrapers::filters::{has_thumbnail, price_range, thumbnail_excludes, unseen};
use scrapers::{
    FilterSet, ListAmScraper, ListingScraper, MalformedPagePolicy, MissingDatePolicy,
    PriceNormalizer, ScrapePolicy, SearchParams, SiteConfig,
};
use std::path::PathBuf;
use store::cache::seen_urls;
use store::export::{export_csv, sort_by_posted};
use store::ListingCache;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingDate {
    Keep,
    Drop,
    Fail,
}

impl From<MissingDate> for MissingDatePolicy {
    fn from(value: MissingDate) -> Self {
        match value {
            MissingDate::Keep => MissingDatePolicy::Keep,
            MissingDate::Drop => MissingDatePolicy::Drop,
            MissingDate::Fail => MissingDatePolicy::Fail,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect new rental listings from list.am")]
struct Args {
    /// Lowest acceptable monthly price (AMD)
    #[arg(long, default_value_t = 100_000)]
    low_price: u32,

    /// Highest acceptable monthly price (AMD)
    #[arg(long, default_value_t = 300_000)]
    high_price: u32,

    /// Keep listings that have no thumbnail
    #[arg(long)]
    no_image_filter: bool,

    /// Drop listings whose thumbnail address contains this text (repeatable)
    #[arg(long = "exclude-image", value_name = "SUBSTRING")]
    exclude_images: Vec<String>,

    /// Neither skip nor extend previously seen listings
    #[arg(long)]
    ignore_cache: bool,

    /// How many of the newest listings to print, 0 for all
    #[arg(short = 'n', long, default_value_t = 100)]
    number_of_results: usize,

    /// Area code of the search
    #[arg(long, default_value_t = 8)]
    at: u32,

    /// Also reject prices with an explicit billing period when they fall
    /// outside the plausible monthly range
    #[arg(long)]
    bound_tagged_prices: bool,

    /// Skip results pages with malformed listing markup instead of stopping
    #[arg(long)]
    skip_malformed_pages: bool,

    /// What to do with listings whose detail page has no posting date
    #[arg(long, value_enum, default_value_t = MissingDate::Keep)]
    missing_date: MissingDate,

    /// Directory for the cache and CSV export
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("🏠 Listing Scout - list.am rentals, area {}", args.at);

    let cache = ListingCache::for_area(&args.out_dir, args.at);
    let previous = cache.load().await;

    let mut filters = FilterSet::new().with(price_range(
        f64::from(args.low_price),
        f64::from(args.high_price),
    ));
    if !args.no_image_filter {
        filters = filters.with(has_thumbnail());
    }
    if !args.exclude_images.is_empty() {
        filters = filters.with(thumbnail_excludes(args.exclude_images.clone()));
    }
    if !args.ignore_cache {
        filters = filters.with(unseen(seen_urls(&previous)));
    }

    let params = SearchParams {
        area_code: args.at,
        ..SearchParams::default()
    };
    let policy = ScrapePolicy {
        on_malformed_page: if args.skip_malformed_pages {
            MalformedPagePolicy::SkipPage
        } else {
            MalformedPagePolicy::Abort
        },
        on_missing_posting_date: args.missing_date.into(),
        ..ScrapePolicy::default()
    };
    let prices = PriceNormalizer {
        bound_tagged: args.bound_tagged_prices,
        ..PriceNormalizer::default()
    };
    let scraper = ListAmScraper::new(SiteConfig::default(), params)?
        .with_policy(policy)
        .with_prices(prices);

    let mut fresh = scraper.scrape(&filters).await?;
    info!("✅ Scraped {} new listings", fresh.len());

    let mut all = if args.ignore_cache {
        fresh.clone()
    } else {
        let mut all = previous;
        all.extend(fresh.iter().cloned());
        all
    };
    cache.save(&all).await?;

    sort_by_posted(&mut all);
    export_csv(
        &args.out_dir.join(format!("listings{}.csv", args.at)),
        &all,
    )?;

    sort_by_posted(&mut fresh);
    let shown = match args.number_of_results {
        0 => &fresh[..],
        n => &fresh[fresh.len().saturating_sub(n)..],
    };
    for listing in shown {
        println!("{}", listing);
    }

    Ok(())
}
