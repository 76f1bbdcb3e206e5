//! Interactive catalog browser over the storefront HTTP API.
//!
//! An empty line loads the next page, like scrolling to the bottom of the
//! storefront grid. Search text is debounced; every other filter applies
//! immediately and restarts the listing from the first page.

use aip_catalog::{CatalogFeed, FetchOutcome, HttpCatalogSource, SearchDebounce};
use aip_core::{CatalogFilters, MediaKind, Product};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Base URL of the storefront server
    #[arg(long, env = "AIP_API_URL", default_value = "http://localhost:3000")]
    pub api_url: String,
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

impl BrowseArgs {
    pub(crate) fn filters(&self) -> CatalogFilters {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        CatalogFilters {
            search: text(&self.search),
            min_price: text(&self.min_price),
            max_price: text(&self.max_price),
            size: text(&self.size),
            color: text(&self.color),
        }
    }
}

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BrowseInput {
    /// Empty line: fetch the next page.
    More,
    /// `/text`: debounced search; `/` alone clears it.
    Search(String),
    /// `:size M`, `:color red`, `:min 10`, `:max 50`; no value clears.
    Filter { field: FilterField, value: String },
    /// `:clear` resets every filter.
    Clear,
    /// `:show <product name>` prints the detail view.
    Show(String),
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterField {
    Size,
    Color,
    MinPrice,
    MaxPrice,
}

pub(crate) fn parse_input(line: &str) -> BrowseInput {
    let line = line.trim();
    if line.is_empty() {
        return BrowseInput::More;
    }
    if let Some(text) = line.strip_prefix('/') {
        return BrowseInput::Search(text.to_string());
    }
    let Some(command) = line.strip_prefix(':') else {
        return BrowseInput::Unknown(line.to_string());
    };

    let (name, value) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, v)| (n, v.trim()));
    let field = match name {
        "q" | "quit" => return BrowseInput::Quit,
        "clear" => return BrowseInput::Clear,
        "show" if !value.is_empty() => return BrowseInput::Show(value.to_string()),
        "size" => FilterField::Size,
        "color" => FilterField::Color,
        "min" => FilterField::MinPrice,
        "max" => FilterField::MaxPrice,
        _ => return BrowseInput::Unknown(line.to_string()),
    };
    BrowseInput::Filter {
        field,
        value: value.to_string(),
    }
}

pub(crate) fn apply_filter(
    filters: &CatalogFilters,
    field: FilterField,
    value: &str,
) -> CatalogFilters {
    let mut next = filters.clone();
    let slot = match field {
        FilterField::Size => &mut next.size,
        FilterField::Color => &mut next.color,
        FilterField::MinPrice => &mut next.min_price,
        FilterField::MaxPrice => &mut next.max_price,
    };
    *slot = value.to_string();
    next
}

pub(crate) fn format_row(product: &Product) -> String {
    let stock = if product.is_in_stock { "" } else { "  (out of stock)" };
    format!(
        "{:<7}{:<36}{:>10}  {:<6}{stock}",
        product.product_id,
        product.product_name,
        product.effective_price(),
        product.size,
    )
}

fn print_detail(product: &Product) {
    println!("{}", product.product_name);
    println!("  price:  {}", product.effective_price());
    if product.is_sale {
        println!("  was:    {}", product.price);
    }
    println!("  size:   {}", product.size);
    println!("  stock:  {}", product.stock_quantity);
    for color in &product.colors {
        println!("  color:  {} {}", color.color_name, color.color_code);
    }
    for item in product.media() {
        let kind = match item.kind {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        };
        println!("  media:  {kind:<6}{}", item.url);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

fn report(feed: &CatalogFeed, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Applied { added } => {
            let items = feed.items();
            for product in &items[items.len() - added..] {
                println!("{}", format_row(product));
            }
            if !feed.has_more() {
                println!("-- end of catalog ({} products) --", items.len());
            }
        }
        FetchOutcome::Failed => eprintln!("page load failed; press enter to retry"),
        FetchOutcome::Stale => {}
    }
}

async fn restart(feed: &mut CatalogFeed, source: &HttpCatalogSource, filters: CatalogFilters) {
    if let Some(ticket) = feed.set_filters(filters) {
        let outcome = feed.run(source, &ticket).await;
        report(feed, outcome);
    }
}

/// # Errors
///
/// Returns an error if the API URL is invalid or stdin cannot be read.
/// Fetch failures are reported and can be retried.
pub(crate) async fn run_browse(args: BrowseArgs) -> anyhow::Result<()> {
    let source = HttpCatalogSource::new(&args.api_url, args.timeout_secs)?;
    let mut feed = CatalogFeed::with_filters(args.filters());
    let mut debounce = SearchDebounce::default();

    println!("enter: more  /text: search  :size :color :min :max  :show <name>  :clear  :q");
    if let Some(outcome) = feed.load_more(&source).await {
        report(&feed, outcome);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = debounce.deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    BrowseInput::More => match feed.load_more(&source).await {
                        Some(outcome) => report(&feed, outcome),
                        None if !feed.has_more() => println!("-- end of catalog --"),
                        None => {}
                    },
                    BrowseInput::Search(text) => debounce.push(text, Instant::now()),
                    BrowseInput::Filter { field, value } => {
                        let next = apply_filter(feed.filters(), field, &value);
                        restart(&mut feed, &source, next).await;
                    }
                    BrowseInput::Clear => {
                        restart(&mut feed, &source, CatalogFilters::default()).await;
                    }
                    BrowseInput::Show(name) => match source.fetch_product(&name).await {
                        Ok(Some(product)) => print_detail(&product),
                        Ok(None) => println!("no product named '{name}'"),
                        Err(e) => eprintln!("lookup failed: {e}"),
                    },
                    BrowseInput::Quit => break,
                    BrowseInput::Unknown(input) => eprintln!("unrecognized input: {input}"),
                }
            }
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                if let Some(search) = debounce.poll(Instant::now()) {
                    let next = CatalogFilters {
                        search,
                        ..feed.filters().clone()
                    };
                    restart(&mut feed, &source, next).await;
                }
            }
        }
    }

    Ok(())
}
