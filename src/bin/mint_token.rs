use chrono::Duration;
use clap::Parser;
use cloud_file_storage::config::AppConfig;
use cloud_file_storage::utils::auth::create_jwt;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Issues an HS256 token signed with JWT_SECRET, for local testing.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Subject (user identifier)
    #[arg(long)]
    sub: String,

    /// Email claim
    #[arg(long)]
    email: Option<String>,

    /// Value of the `custom:role` claim (e.g. admin, user, viewer)
    #[arg(long)]
    role: Option<String>,

    /// Token lifetime in hours
    #[arg(long, default_value_t = 24)]
    hours: i64,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mint_token=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    if config.jwt_public_key.is_some() {
        anyhow::bail!("JWT_PUBLIC_KEY is set; the server will not accept HS256 tokens");
    }

    let token = create_jwt(
        &args.sub,
        args.email.as_deref(),
        args.role.as_deref(),
        Duration::hours(args.hours),
        &config.jwt_secret,
    )?;

    info!(
        "🔐 Token for {} (role: {}) valid for {}h",
        args.sub,
        args.role.as_deref().unwrap_or("user"),
        args.hours
    );
    println!("{}", token);
    Ok(())
}
