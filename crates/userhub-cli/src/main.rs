use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use userhub_cli::admin::{self, NewAdmin};
use userhub_cli::seeder;
use userhub_config::JwtConfig;
use userhub_db::PgPool;
use userhub_models::UserId;

#[derive(Parser)]
#[command(name = "userhub-cli")]
#[command(about = "Userhub CLI - Administrative tools for Userhub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// First name of the admin
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the admin
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print an access token for an existing user
    IssueToken {
        /// ID of the user the token is issued for
        #[arg(short = 'u', long)]
        user_id: i32,
    },
    /// Seed the database with fake users
    Seed {
        /// Number of users to create
        #[arg(short = 'n', long, default_value = "50")]
        users: usize,
    },
    /// Remove seeded users
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = userhub_db::init_db_pool().await;

    let result = match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::IssueToken { user_id } => handle_issue_token(&pool, UserId::from(user_id)).await,
        Commands::Seed { users } => seeder::seed_users(&pool, users).await.map(|_| ()),
        Commands::ClearSeed => seeder::clear_users(&pool).await.map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), userhub_cli::CliError> {
    let first_name = match first_name {
        Some(value) => value,
        None => Input::new().with_prompt("First name").interact_text()?,
    };

    let last_name = match last_name {
        Some(value) => value,
        None => Input::new().with_prompt("Last name").interact_text()?,
    };

    let email = match email {
        Some(value) => value,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(value) => value,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let new_admin = NewAdmin {
        first_name,
        last_name,
        email,
        password,
    };
    let user_id = admin::create_admin(pool, new_admin.clone()).await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {}", user_id);
    println!("   Email: {}", new_admin.email.trim().to_lowercase());
    println!("   Name: {} {}", new_admin.first_name.trim(), new_admin.last_name.trim());
    Ok(())
}

async fn handle_issue_token(pool: &PgPool, user_id: UserId) -> Result<(), userhub_cli::CliError> {
    let jwt_config = JwtConfig::from_env();
    let token = admin::issue_token(pool, user_id, &jwt_config).await?;

    println!("{}", token);
    Ok(())
}
