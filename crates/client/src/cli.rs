//! `storefront` command-line shell.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use storefront_auth::Credentials;
use storefront_catalog::{ProductQuery, SortOption, category_label, format_price};
use storefront_core::ProductId;
use storefront_observability::LogFormat;

use crate::app::{AppError, Notice, NoticeLevel, ProductCard, ProductListing, Storefront};
use crate::config::{ClientConfig, DEFAULT_CATALOG_URL};
use crate::routes::Route;
use crate::wishlist::WishlistToggle;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Settings {
    /// Base URL of the catalog service
    #[arg(long, global = true, env = "STOREFRONT_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Directory holding the local state database
    #[arg(long, global = true, env = "STOREFRONT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Simulated payment time in milliseconds
    #[arg(long, global = true, env = "STOREFRONT_CHECKOUT_DELAY_MS", default_value_t = 1500)]
    pub checkout_delay_ms: u64,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, env = "STOREFRONT_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Log output: json or pretty
    #[arg(long, global = true, env = "STOREFRONT_LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in to the catalog service
    Login(LoginArgs),
    /// Sign out
    Logout,
    /// List products
    Products(ProductsArgs),
    /// List categories
    Categories,
    /// Show one product
    Product {
        id: ProductId,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        command: Option<CartCommand>,
    },
    /// Place the order for everything in the cart
    Checkout,
    /// Open a view by path: /, /login, /cart, /wishlist or /product/<id>
    Open {
        path: Route,
    },
    /// Inspect or change the wishlist
    Wishlist {
        #[command(subcommand)]
        command: Option<WishlistCommand>,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, env = "STOREFRONT_USERNAME")]
    pub username: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Only show this category
    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive title search
    #[arg(long, default_value = "")]
    pub search: String,

    /// price-asc, price-desc, rating-desc or name-asc
    #[arg(long, default_value_t = SortOption::PriceAsc)]
    pub sort: SortOption,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Show,
    Add {
        id: ProductId,
        #[arg(long, default_value = "1")]
        quantity: NonZeroU32,
    },
    Remove {
        id: ProductId,
    },
    /// Set the quantity of an entry; values below one are ignored
    Set {
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum WishlistCommand {
    Show,
    Add { id: ProductId },
    Remove { id: ProductId },
    Toggle { id: ProductId },
    /// Move an entry into the cart
    Move { id: ProductId },
}

impl Cli {
    pub fn config(&self) -> ClientConfig {
        let settings = &self.settings;
        ClientConfig {
            catalog_url: settings.catalog_url.clone(),
            data_dir: settings.data_dir.clone(),
            checkout_delay: Duration::from_millis(settings.checkout_delay_ms),
            request_timeout: settings.request_timeout_ms.map(Duration::from_millis),
            log_format: settings.log_format,
        }
    }
}

impl Command {
    /// View this command acts on; `None` for commands outside the gate.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login(_) => Some(Route::Login),
            Command::Logout => None,
            Command::Products(_) | Command::Categories => Some(Route::Products),
            Command::Product { id } => Some(Route::ProductDetail(*id)),
            Command::Cart { .. } | Command::Checkout => Some(Route::Cart),
            Command::Wishlist { .. } => Some(Route::Wishlist),
            Command::Open { path } => Some(*path),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.config();
    let mut storefront = Storefront::open(&config).await?;

    let outcome = dispatch(&mut storefront, cli.command).await;
    storefront.shutdown().await;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!("command failed: {err:?}");
            print_notice(&err.notice());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn dispatch(storefront: &mut Storefront, command: Command) -> Result<(), AppError> {
    if let Some(route) = command.route() {
        match route.resolve(storefront.session()) {
            Route::Login if route != Route::Login => return Err(AppError::Unauthenticated),
            Route::Products if route == Route::Login => {
                println!("Already signed in.");
                return Ok(());
            }
            _ => {}
        }
    }

    match command {
        Command::Login(args) => {
            let credentials = Credentials::new(args.username, args.password);
            storefront.login(&credentials).await?;
            print_notice(&Notice::success("Signed in"));
        }
        Command::Logout => {
            storefront.logout();
            print_notice(&Notice::success("Signed out"));
        }
        Command::Products(args) => {
            let mut query = ProductQuery::new().with_search(args.search).with_sort(args.sort);
            query.category = args.category;

            print_listing(&storefront.browse(&query).await?);
        }
        Command::Categories => {
            for category in storefront.categories().await? {
                println!("{:<20} {}", category, category_label(&category));
            }
        }
        Command::Product { id } => {
            let card = storefront.product_detail(id).await?;
            print_detail(&card);
        }
        Command::Cart { command } => cart(storefront, command.unwrap_or(CartCommand::Show)).await?,
        Command::Checkout => {
            println!("Processing payment...");
            let receipt = storefront.checkout().await?;
            for line in &receipt.lines {
                println!(
                    "{:>3} x {:<40} {:>10}",
                    line.quantity,
                    line.product.title,
                    format_price(line.line_total())
                );
            }
            println!("Total: {}", format_price(receipt.total));
            print_notice(&Notice::success("Order placed successfully!"));
        }
        Command::Wishlist { command } => {
            wishlist(storefront, command.unwrap_or(WishlistCommand::Show)).await?
        }
        Command::Open { path } => match path {
            Route::Login => println!("Sign in with `storefront login`."),
            Route::Products => print_listing(&storefront.browse(&ProductQuery::new()).await?),
            Route::ProductDetail(id) => print_detail(&storefront.product_detail(id).await?),
            Route::Cart => cart(storefront, CartCommand::Show).await?,
            Route::Wishlist => wishlist(storefront, WishlistCommand::Show).await?,
        },
    }
    Ok(())
}

async fn cart(storefront: &mut Storefront, command: CartCommand) -> Result<(), AppError> {
    match command {
        CartCommand::Show => {
            let cart = storefront.cart()?;
            if cart.is_empty() {
                println!("Your cart is empty.");
                return Ok(());
            }
            for entry in cart.entries() {
                println!(
                    "{:>4}  {:<40} {:>3} x {:>9} = {:>10}",
                    entry.product.id,
                    entry.product.title,
                    entry.quantity,
                    entry.product.display_price(),
                    format_price(entry.line_total())
                );
            }
            println!("Total: {} ({} items)", format_price(cart.total()), cart.item_count());
        }
        CartCommand::Add { id, quantity } => {
            let entry = storefront.add_to_cart_quantity(id, quantity).await?;
            println!("{} (quantity {})", entry.product.title, entry.quantity);
            print_notice(&Notice::success("Added to cart!"));
        }
        CartCommand::Remove { id } => storefront.cart_mut()?.remove_item(id),
        CartCommand::Set { id, quantity } => storefront.cart_mut()?.update_quantity(id, quantity),
        CartCommand::Clear => storefront.cart_mut()?.clear_cart(),
    }
    Ok(())
}

async fn wishlist(storefront: &mut Storefront, command: WishlistCommand) -> Result<(), AppError> {
    match command {
        WishlistCommand::Show => {
            let wishlist = storefront.wishlist()?;
            if wishlist.is_empty() {
                println!("Your wishlist is empty.");
                return Ok(());
            }
            for entry in wishlist.entries() {
                println!(
                    "{:>4}  {:<40} {:>9}  added {}",
                    entry.product.id,
                    entry.product.title,
                    entry.product.display_price(),
                    entry.added_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        WishlistCommand::Add { id } => {
            if storefront.wishlist()?.is_in_wishlist(id) {
                println!("Already in wishlist.");
            } else {
                toggle(storefront, id).await?;
            }
        }
        WishlistCommand::Remove { id } => {
            let wishlist = storefront.wishlist_mut()?;
            if wishlist.is_in_wishlist(id) {
                wishlist.remove_item(id);
                print_notice(&Notice::success("Removed from wishlist"));
            }
        }
        WishlistCommand::Toggle { id } => toggle(storefront, id).await?,
        WishlistCommand::Move { id } => {
            storefront.move_to_cart(id)?;
            print_notice(&Notice::success("Added to cart!"));
        }
    }
    Ok(())
}

async fn toggle(storefront: &mut Storefront, id: ProductId) -> Result<(), AppError> {
    let notice = match storefront.toggle_wishlist(id).await? {
        WishlistToggle::Added => Notice::success("Added to wishlist"),
        WishlistToggle::Removed => Notice::success("Removed from wishlist"),
    };
    print_notice(&notice);
    Ok(())
}

fn print_listing(listing: &ProductListing) {
    println!("{}", listing_header(listing));
    for card in &listing.cards {
        println!("{}", card_line(card));
    }
    if listing.cards.is_empty() && listing.notice.is_none() {
        println!("No products found.");
    }
    if let Some(notice) = &listing.notice {
        print_notice(notice);
    }
}

fn listing_header(listing: &ProductListing) -> String {
    let scope = match listing.query.category.as_deref() {
        None | Some("") => "All products".to_string(),
        Some(category) => category_label(category),
    };
    format!(
        "{} ({}), sorted by {}",
        scope,
        listing.cards.len(),
        listing.query.sort.label()
    )
}

fn card_line(card: &ProductCard) -> String {
    let product = &card.product;
    format!(
        "{:>4}  {:>9}  {:<5}  {}{}",
        product.id,
        product.display_price(),
        stars(product.rating.stars()),
        product.title,
        if card.in_wishlist { "  [wishlist]" } else { "" }
    )
}

fn print_detail(card: &ProductCard) {
    let product = &card.product;
    println!("{}", product.title);
    println!("{}", category_label(&product.category));
    println!(
        "{}  {} ({} reviews)",
        product.display_price(),
        stars(product.rating.stars()),
        product.rating.count
    );
    println!();
    println!("{}", product.description);
    println!();
    println!("Image: {}", product.image);
    if card.in_wishlist {
        println!("In your wishlist");
    }
}

fn stars(filled: u8) -> String {
    let filled = usize::from(filled.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{}", notice.message),
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}
