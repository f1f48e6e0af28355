//! daokit CLI - drives the SQLite DAOs from the command line

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use daokit_core::domain::{Photo, PhotoComment, PhotoId, Product, ProductId};
use daokit_core::port::{AccountDao, CrudDao, PhotoDao, ProductDao, SystemTimeProvider};
use daokit_infra_sqlite::{
    create_pool, run_migrations, SqliteAccountDao, SqlitePhotoDao, SqlitePool, SqliteProductDao,
    StoreConfig,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "daokit")]
#[command(about = "Transactional DAO store CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides `database_url` from config/ and DAOKIT_DATABASE_URL
    #[arg(long, env = "DAOKIT_DATABASE_URL")]
    database_url: Option<String>,

    /// Directory holding default.toml / local.toml
    #[arg(long, default_value = "./config")]
    config_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the schema
    Migrate,

    /// Manage products
    #[command(subcommand)]
    Product(ProductCommand),

    /// Look up accounts
    #[command(subcommand)]
    Account(AccountCommand),

    /// Manage photos and their comments
    #[command(subcommand)]
    Photo(PhotoCommand),
}

#[derive(Subcommand)]
enum ProductCommand {
    /// Save a new product
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        producer: String,

        /// Decimal price, e.g. 1.50
        #[arg(long)]
        price: Decimal,

        /// YYYY-MM-DD
        #[arg(short, long)]
        expires: NaiveDate,

        #[arg(short, long)]
        company: Option<i64>,
    },

    /// List all products
    List,

    /// Show one product with its company
    Show { id: ProductId },

    /// Remove a product
    Remove { id: ProductId },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Find an account by email
    Find {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum PhotoCommand {
    /// Save a photo with optional initial comments
    Add {
        #[arg(short, long)]
        url: String,

        #[arg(short, long)]
        description: Option<String>,

        /// May be repeated
        #[arg(short, long = "comment")]
        comments: Vec<String>,
    },

    /// Add a comment to an existing photo
    Comment {
        photo_id: PhotoId,

        #[arg(short, long)]
        text: String,
    },

    /// Show a photo with its comments
    Show { id: PhotoId },
}

#[derive(Tabled)]
struct ProductLine {
    id: String,
    name: String,
    producer: String,
    price: String,
    expires: String,
    company: String,
}

impl From<&Product> for ProductLine {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_string()).unwrap_or_default(),
            name: product.name.clone(),
            producer: product.producer.clone(),
            price: product.price.to_string(),
            expires: product.expiration_date.to_string(),
            company: product
                .company_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn init_logging() {
    let log_format = std::env::var("DAOKIT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("daokit=info"));

    // stdout carries command output, logs go to stderr
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    info!("daokit v{} starting", VERSION);

    let mut store = StoreConfig::load_from(&cli.config_dir).context("Invalid configuration")?;
    if let Some(url) = cli.database_url {
        store.database_url = url;
    }

    let pool = create_pool(&store)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    match cli.command {
        Commands::Migrate => {
            println!("{}", "✓ Schema is up to date".green().bold());
        }
        Commands::Product(command) => run_product(pool, command).await?,
        Commands::Account(command) => run_account(pool, command).await?,
        Commands::Photo(command) => run_photo(pool, command).await?,
    }

    Ok(())
}

async fn run_product(pool: SqlitePool, command: ProductCommand) -> Result<()> {
    let dao = SqliteProductDao::new(pool, Arc::new(SystemTimeProvider));

    match command {
        ProductCommand::Add {
            name,
            producer,
            price,
            expires,
            company,
        } => {
            let mut product = Product::new(name, producer, price, expires);
            product.company_id = company;
            dao.save(&mut product).await?;

            println!("{}", "✓ Product saved".green().bold());
            println!();
            println!("{}", Table::new([ProductLine::from(&product)]));
        }

        ProductCommand::List => {
            let products = dao.find_all().await?;
            if products.is_empty() {
                println!("{}", "No products".yellow());
            } else {
                println!("{}", Table::new(products.iter().map(ProductLine::from)));
            }
        }

        ProductCommand::Show { id } => {
            print_json(&dao.find_one_fetch_company(id).await?)?;
        }

        ProductCommand::Remove { id } => {
            let product = dao.find_one(id).await?;
            dao.remove(&product).await?;
            println!("{}", format!("✓ Product {} removed", id).green().bold());
        }
    }

    Ok(())
}

async fn run_account(pool: SqlitePool, command: AccountCommand) -> Result<()> {
    let dao = SqliteAccountDao::new(pool, Arc::new(SystemTimeProvider));

    match command {
        AccountCommand::Find { email } => print_json(&dao.find_by_email(&email).await?),
    }
}

async fn run_photo(pool: SqlitePool, command: PhotoCommand) -> Result<()> {
    let dao = SqlitePhotoDao::new(pool, Arc::new(SystemTimeProvider));

    match command {
        PhotoCommand::Add {
            url,
            description,
            comments,
        } => {
            let mut photo = Photo::new(url);
            photo.description = description;
            for text in comments {
                photo.add_comment(PhotoComment::new(text));
            }
            dao.save(&mut photo).await?;

            println!("{}", "✓ Photo saved".green().bold());
            print_json(&photo)?;
        }

        PhotoCommand::Comment { photo_id, text } => {
            let comment = dao.add_comment(photo_id, &text).await?;
            println!(
                "{}",
                format!("✓ Comment added to photo {}", photo_id).green().bold()
            );
            print_json(&comment)?;
        }

        PhotoCommand::Show { id } => print_json(&dao.find_one(id).await?)?,
    }

    Ok(())
}
