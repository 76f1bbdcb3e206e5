//! Database and admin-account commands. These need `DATABASE_URL`; admin
//! passwords are hashed at `AIP_PASSWORD_COST`. See
//! `aip_core::load_app_config`.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Create an admin account that can sign in to the back office
    Create {
        #[arg(long)]
        email: String,
        /// Falls back to `AIP_ADMIN_PASSWORD` so it stays out of shell history
        #[arg(long, env = "AIP_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

const MIN_PASSWORD_LEN: usize = 8;

async fn connect() -> anyhow::Result<(aip_core::AppConfig, sqlx::PgPool)> {
    let config = aip_core::load_app_config()?;
    let pool = aip_db::connect_pool(
        &config.database_url,
        aip_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    Ok((config, pool))
}

/// # Errors
///
/// Returns an error if configuration is invalid or the database call fails.
pub(crate) async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let (_, pool) = connect().await?;
    match command {
        DbCommands::Ping => {
            aip_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = aip_db::run_migrations(&pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
    }
    pool.close().await;
    Ok(())
}

/// # Errors
///
/// Returns an error if the input is rejected, the email is already
/// registered, or the database call fails.
pub(crate) async fn run_admin(command: AdminCommands) -> anyhow::Result<()> {
    match command {
        AdminCommands::Create { email, password } => {
            let email = check_admin_input(&email, &password)?;
            let (config, pool) = connect().await?;
            let cost = config.password_cost;
            let hash =
                tokio::task::spawn_blocking(move || aip_core::hash_password(&password, cost))
                    .await??;
            let result = aip_db::create_admin_user(&pool, &email, &hash).await;
            pool.close().await;

            match result {
                Ok(user) => {
                    tracing::info!(user_id = user.id, "admin account created");
                    println!("created admin {} (id {})", user.email, user.id);
                    Ok(())
                }
                Err(e) if e.is_unique_violation() => {
                    anyhow::bail!("an admin with email {email} already exists")
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

/// Trims `email` and applies the same rules as server-side sign-up.
pub(crate) fn check_admin_input(email: &str, password: &str) -> anyhow::Result<String> {
    let email = email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        anyhow::bail!("'{email}' is not a valid email address");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    Ok(email.to_string())
}
