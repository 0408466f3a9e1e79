use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use medcab_client::{CancellationToken, RequestOptions};
use medcab_config::load as load_config;
use medcab_runtime::{telemetry, ClientServices};
use medcab_session::{GuardDecision, RouteGuard, SessionError};
use medcab_types::auth::{Credentials, Registration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "medcab")]
#[command(about = "Medical practice backend client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the access token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in doctor
    Whoami,
    /// Show whether a session is active and when it expires
    Status,
    /// Fetch a protected endpoint and print the JSON answer
    Get {
        /// Path relative to the api base url, e.g. `patients/`
        endpoint: String,
        /// Query parameter as key=value, repeatable
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
    },
    /// Create a doctor account with a registration code
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        license_number: String,
        #[arg(long, default_value = "")]
        specialty: String,
        #[arg(long)]
        code: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services = ClientServices::initialise(&config)
        .await
        .context("failed to initialise client services")?;

    match cli.command {
        Commands::Login { email, password } => login(&services, email, password).await,
        Commands::Logout => logout(&services),
        Commands::Whoami => whoami(&services).await,
        Commands::Status => status(&services).await,
        Commands::Get { endpoint, query } => get(&services, &endpoint, &query).await,
        Commands::Register {
            first_name,
            last_name,
            email,
            license_number,
            specialty,
            code,
            password,
        } => {
            let password = password_or_prompt(password).await?;
            let registration = Registration {
                first_name,
                last_name,
                email,
                password,
                license_number,
                specialty,
                registration_code: code,
            };
            register(&services, &registration).await
        }
    }
}

async fn login(
    services: &ClientServices,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = password_or_prompt(password).await?;
    let credentials = Credentials::new(email, password);

    match services.session.login(&credentials).await {
        Ok(user) => {
            println!("Signed in as {} <{}>", user.full_name, user.email);
            Ok(())
        }
        Err(error) => bail!("login failed: {}", error.user_message()),
    }
}

fn logout(services: &ClientServices) -> anyhow::Result<()> {
    services
        .session
        .logout()
        .context("failed to clear persisted session")?;
    println!("Signed out");
    Ok(())
}

async fn whoami(services: &ClientServices) -> anyhow::Result<()> {
    restore(services).await?;

    match services.session.current_profile() {
        Some(profile) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&profile).context("failed to render profile")?
            );
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

async fn status(services: &ClientServices) -> anyhow::Result<()> {
    restore(services).await?;

    let snapshot = services.session.snapshot();
    match RouteGuard::new().evaluate(&services.session) {
        GuardDecision::Render => {
            let name = snapshot
                .user
                .map(|user| user.full_name)
                .unwrap_or_default();
            println!("Signed in as {name}");
            if let Some(expires_at) = snapshot.expires_at {
                println!("Token expires at {expires_at}");
            }
        }
        GuardDecision::Redirect { to, .. } => println!("Not signed in (sign in at {to})"),
        GuardDecision::Loading => println!("Session still loading"),
    }
    Ok(())
}

async fn get(services: &ClientServices, endpoint: &str, query: &[String]) -> anyhow::Result<()> {
    restore(services).await?;
    if let Err(error) = services.session.ensure_fresh() {
        bail!("{}", error.user_message());
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling request");
            trigger.cancel();
        }
    });

    let mut options = RequestOptions::get().cancel_with(cancel);
    for pair in query {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("query parameter {pair:?} is not KEY=VALUE");
        };
        options = options.query(key, value);
    }

    let body: Option<serde_json::Value> = match services
        .client
        .fetch_protected(endpoint, options)
        .await
    {
        Ok(body) => body,
        Err(error) => bail!("{}", error.user_message()),
    };

    match body {
        Some(value) => println!(
            "{}",
            serde_json::to_string_pretty(&value).context("failed to render response")?
        ),
        None => println!("(no content)"),
    }
    Ok(())
}

async fn register(services: &ClientServices, registration: &Registration) -> anyhow::Result<()> {
    match services.session.register(registration).await {
        Ok(()) => {
            println!("Account created, sign in with `medcab login --email {}`", registration.email);
            Ok(())
        }
        Err(SessionError::Api(error)) => {
            let Some(body) = error.body() else {
                bail!("registration failed: {}", error.user_message());
            };
            if let Some(code_errors) = body.field("registration_code") {
                let first = code_errors.first().map(String::as_str).unwrap_or_default();
                bail!("invalid or already used registration code. {first}");
            }
            bail!("registration failed: {}", body.joined())
        }
        Err(error) => bail!("registration failed: {}", error.user_message()),
    }
}

/// Restore the persisted session, reporting only failures the user can act on.
async fn restore(services: &ClientServices) -> anyhow::Result<()> {
    match services.session.initialize().await {
        Ok(()) => Ok(()),
        Err(error) if error.is_authorization() => {
            info!(%error, "persisted session ended");
            Ok(())
        }
        Err(error) => bail!("failed to restore session: {}", error.user_message()),
    }
}

async fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::Write::flush(&mut std::io::stderr())?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}
