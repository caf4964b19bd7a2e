//! Storefront CLI - browse, shop, and moderate from the terminal.

mod commands;
mod output;

use auth_session::Session;
use clap::{ArgAction, Parser, Subcommand};
use storefront_api::{OrderStatus, ProductStatus, ReviewDecision, ReviewStatus};
use storefront_config_and_utils::{init_logging, Config, Paths, ENV_API_BASE_URL};
use tracing::debug;

/// Storefront CLI - Shop and manage a storefront account.
#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront CLI for shopping, orders, and moderation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = ENV_API_BASE_URL)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account
    Register {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Logout and clear the stored session
    Logout,

    /// Check authentication status
    Status,

    /// Show the signed-in user
    Whoami,

    /// Browse the catalog
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Manage your orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Back-office operations (admin accounts only)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List products
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Category slug
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Sort key understood by the backend (e.g. price_asc)
        #[arg(long)]
        sort: Option<String>,
        /// Extra attempts on network or server errors
        #[arg(long, default_value = "2")]
        retries: u32,
    },
    /// Show product details
    Show {
        /// Product slug
        slug: String,
    },
    /// List reviews of a product
    Reviews {
        /// Product slug
        slug: String,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long)]
        offset: Option<u32>,
    },
    /// Review a product
    Review {
        /// Product slug
        slug: String,
        /// Rating from 1 to 5
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show the cart
    Show,
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product ID
        product_id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// List your orders
    List,
    /// Place an order with shipping details
    Create {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        ward: Option<String>,
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        province: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Place an order from the current cart
    Checkout,
    /// Delete an order
    Delete {
        /// Order ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// List all orders
    Orders,
    /// Change the status of an order
    OrderStatus {
        /// Order ID
        id: String,
        /// New status
        status: OrderStatus,
    },
    /// Activate or deactivate a user
    UserActive {
        /// User ID
        user_id: String,
        /// true to activate, false to deactivate
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
    /// List reviews in the moderation queue
    Reviews {
        #[arg(short, long)]
        status: Option<ReviewStatus>,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long)]
        offset: Option<u32>,
    },
    /// Approve or reject a review
    ReviewStatus {
        /// Review ID
        id: String,
        /// approved or rejected
        decision: ReviewDecision,
    },
    /// Change the catalog status of a product
    ProductStatus {
        /// Product ID
        id: String,
        /// draft, active, hidden, or archived
        status: ProductStatus,
    },
}

async fn run(cli: Cli, config: Config, paths: Paths) -> anyhow::Result<()> {
    let session = Session::create(&config, &paths)?;
    let outcome = auth_session::bootstrap(&session).await;
    debug!(?outcome, "Bootstrap settled");

    let ctx = commands::Context::new(session, outcome, cli.format);
    let result = match cli.command {
        Commands::Login { email } => commands::login(&ctx, email).await,
        Commands::Register { email } => commands::register(&ctx, email).await,
        Commands::Logout => commands::logout(&ctx).await,
        Commands::Status => commands::status(&ctx).await,
        Commands::Whoami => commands::whoami(&ctx).await,
        Commands::Products { command } => match command {
            ProductCommands::List {
                search,
                category,
                min_price,
                max_price,
                sort,
                retries,
            } => {
                let query = storefront_api::ProductQuery {
                    search,
                    category,
                    min_price,
                    max_price,
                    sort,
                };
                commands::products_list(&ctx, query, retries).await
            }
            ProductCommands::Show { slug } => commands::products_show(&ctx, &slug).await,
            ProductCommands::Reviews {
                slug,
                limit,
                offset,
            } => {
                let page = storefront_api::Page { limit, offset };
                commands::products_reviews(&ctx, &slug, page).await
            }
            ProductCommands::Review {
                slug,
                rating,
                comment,
            } => commands::products_review(&ctx, &slug, rating, comment).await,
        },
        Commands::Cart { command } => match command {
            CartCommands::Show => commands::cart_show(&ctx).await,
            CartCommands::Set { product_id, qty } => {
                commands::cart_set(&ctx, &product_id, qty).await
            }
        },
        Commands::Orders { command } => match command {
            OrderCommands::List => commands::orders_list(&ctx).await,
            OrderCommands::Create {
                full_name,
                phone,
                address,
                ward,
                district,
                province,
                note,
            } => {
                let shipping = storefront_api::Shipping {
                    full_name,
                    phone,
                    address_line: address,
                    ward,
                    district,
                    province,
                    note,
                };
                commands::orders_create(&ctx, shipping).await
            }
            OrderCommands::Checkout => commands::orders_checkout(&ctx).await,
            OrderCommands::Delete { id } => commands::orders_delete(&ctx, &id).await,
        },
        Commands::Admin { command } => match command {
            AdminCommands::Orders => commands::admin_orders(&ctx).await,
            AdminCommands::OrderStatus { id, status } => {
                commands::admin_order_status(&ctx, &id, status).await
            }
            AdminCommands::UserActive { user_id, active } => {
                commands::admin_user_active(&ctx, &user_id, active).await
            }
            AdminCommands::Reviews {
                status,
                product,
                user,
                limit,
                offset,
            } => {
                let filter = storefront_api::ReviewFilter {
                    status,
                    product_id: product,
                    user_id: user,
                    page: storefront_api::Page { limit, offset },
                };
                commands::admin_reviews(&ctx, &filter).await
            }
            AdminCommands::ReviewStatus { id, decision } => {
                commands::admin_review_status(&ctx, &id, decision).await
            }
            AdminCommands::ProductStatus { id, status } => {
                commands::admin_product_status(&ctx, &id, status).await
            }
        },
    };

    ctx.session().dispose();
    result
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let paths = match Paths::new() {
        Ok(paths) => paths,
        Err(e) => {
            output::print_error(&e.to_string(), &format);
            std::process::exit(1);
        }
    };

    let mut config = match Config::load(&paths) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Failed to load config: {}", e), &format);
            std::process::exit(1);
        }
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }

    // CLI logs go to the JSONL file only; stdout is for command output.
    init_logging("cli", &config.log_level, &paths, false);

    if let Err(e) = run(cli, config, paths).await {
        output::print_error(&output::describe_error(&e), &format);
        std::process::exit(1);
    }
}
