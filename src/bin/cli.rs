use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use menuward::cli::{assign_role, check, seed_catalog};
use menuward::menuward_cache::InvalidationBus;
use menuward::menuward_config::{DatabaseConfig, InvalidationConfig, LoggingConfig};
use menuward::menuward_db::{PgPool, PgStore, init_db_pool, run_migrations};
use menuward::menuward_models::UserId;
use menuward::menuward_observability::init_tracing;
use menuward::modules::menus::service::get_user_menu_tree;

#[derive(Parser)]
#[command(name = "menuward-cli")]
#[command(about = "Menuward CLI - Operator tools for the authorization catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Seed actions, a demo menu tree and the default roles
    Seed,
    /// Assign a role to a user, bypassing the escalation guard
    AssignRole {
        /// Numeric user id
        user_id: i64,
        /// Role code, e.g. super_admin
        role_code: String,
    },
    /// Resolve one permission for one user
    Check {
        user_id: i64,
        /// Permission code, e.g. menu.posts.publish
        code: String,
    },
    /// Print a user's menu tree as JSON
    Menus {
        user_id: i64,
        #[arg(short = 'l', long)]
        locale: Option<String>,
    },
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, err);
    std::process::exit(1);
}

async fn connect() -> PgPool {
    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(_) => fail("Configuration error", "DATABASE_URL must be set"),
    };
    match init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => fail("Failed to connect to database", e),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing(&LoggingConfig::from_env()) {
        fail("Failed to initialise logging", e);
    }

    let cli = Cli::parse();
    let pool = connect().await;

    match cli.command {
        Commands::Migrate => match run_migrations(&pool).await {
            Ok(()) => println!("✅ Migrations applied"),
            Err(e) => fail("Error applying migrations", e),
        },
        Commands::Seed => {
            let store = PgStore::new(pool);
            match seed_catalog(&store).await {
                Ok(report) if report.is_empty() => println!("ℹ️  Catalog already seeded"),
                Ok(report) => {
                    println!("✅ Catalog seeded");
                    println!("   Actions: {}", report.actions);
                    println!("   Menus: {}", report.menus);
                    println!("   Permissions: {}", report.permissions);
                    println!("   Roles: {}", report.roles);
                }
                Err(e) => fail("Error seeding catalog", e),
            }
        }
        Commands::AssignRole { user_id, role_code } => {
            let store = PgStore::new(pool);
            let bus = match InvalidationBus::from_config(&InvalidationConfig::from_env()).await {
                Ok(bus) => bus,
                Err(e) => fail("Failed to connect to Redis", e),
            };
            match assign_role(&store, &bus, UserId::new(user_id), &role_code).await {
                Ok(_) => println!("✅ Assigned {} to user {}", role_code, user_id),
                Err(e) => fail("Error assigning role", e),
            }
        }
        Commands::Check { user_id, code } => {
            let store = PgStore::new(pool);
            if check(&store, UserId::new(user_id), &code).await {
                println!("✅ user {} holds {}", user_id, code);
            } else {
                println!("⛔ user {} does not hold {}", user_id, code);
                std::process::exit(2);
            }
        }
        Commands::Menus { user_id, locale } => {
            let store = PgStore::new(pool);
            let tree = get_user_menu_tree(&store, UserId::new(user_id), locale.as_deref()).await;
            match serde_json::to_string_pretty(&tree) {
                Ok(json) => println!("{}", json),
                Err(e) => fail("Error rendering menu tree", e),
            }
        }
    }
}
