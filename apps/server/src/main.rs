use anyhow::Context;
use clap::{Parser, Subcommand};
use huddle_config::load as load_config;
use huddle_database::{CreateConversationRequest, ProvisionUserRequest, UserError};
use huddle_gateway::{create_router, GatewayState};
use huddle_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "huddle-server")]
#[command(about = "Huddle chat backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Seed the database with demo users and a group conversation
    SeedData,
    /// Dump users, conversations and messages from the database
    DumpData,
}

const DEMO_USERS: [(&str, &str); 3] = [
    ("alice", "Alice Example"),
    ("bob", "Bob Example"),
    ("carol", "Carol Example"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(services).await,
        Commands::SeedData => seed_data(&services).await,
        Commands::DumpData => dump_data(&services).await,
    }
}

async fn run_server(services: BackendServices) -> anyhow::Result<()> {
    info!("starting Huddle backend");

    let config = services.config.clone();
    let state = GatewayState::new(
        services.db_pool.clone(),
        services.relay.clone(),
        services.jwt.clone(),
        config.auth.internal_secret.clone(),
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(huddle_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn seed_data(services: &BackendServices) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let issuer = services.jwt.issuer().to_string();
    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());

    for (subject, name) in DEMO_USERS {
        let request = ProvisionUserRequest {
            token_identifier: format!("{issuer}|{subject}"),
            email: format!("{subject}@example.com"),
            name: name.to_string(),
            image: format!("https://api.dicebear.com/7.x/initials/svg?seed={subject}"),
        };

        let user = match services.directory.provision(request).await {
            Ok(user) => user,
            Err(UserError::UserAlreadyExists) => {
                println!("- {subject} already present, skipping");
                continue;
            }
            Err(error) => return Err(error).context("failed to provision demo user"),
        };
        let token = services
            .jwt
            .generate_token(subject, Some(user.email.as_str()), Some(name))
            .context("failed to mint demo token")?;
        println!("- {name} ({subject})\n  token: {token}");
        user_ids.push(user.id);
    }

    if user_ids.len() == DEMO_USERS.len() {
        let conversation = huddle_database::ConversationRepository::new(services.db_pool.clone())
            .create(&CreateConversationRequest {
                participants: user_ids.clone(),
                is_group: true,
                group_name: Some("Demo group".to_string()),
                admin: user_ids.first().cloned(),
            })
            .await
            .context("failed to create demo conversation")?;
        println!("- group conversation {}", conversation.id);
    }

    println!("Seeding complete.");
    Ok(())
}

async fn dump_data(services: &BackendServices) -> anyhow::Result<()> {
    info!("dumping database contents");

    let users = huddle_database::UserRepository::new(services.db_pool.clone())
        .list_all()
        .await
        .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!(
            "{:<26} {:<40} {:<30} {:<8}",
            "ID", "Token Identifier", "Name", "Online"
        );
        println!("{}", "-".repeat(106));
        for user in users {
            println!(
                "{:<26} {:<40} {:<30} {:<8}",
                user.id, user.token_identifier, user.name, user.is_online
            );
        }
    }

    let conversations = huddle_database::ConversationRepository::new(services.db_pool.clone())
        .list_all()
        .await
        .context("failed to fetch conversations")?;

    println!("\n=== CONVERSATIONS ===");
    if conversations.is_empty() {
        println!("No conversations found in database");
    }
    for conversation in conversations {
        println!(
            "{} {} participants=[{}]",
            conversation.id,
            conversation.group_name.as_deref().unwrap_or("(direct)"),
            conversation.participants.join(", ")
        );

        let messages = services
            .messages
            .list_by_conversation(&conversation.id)
            .await
            .context("failed to fetch messages")?;
        for message in messages {
            let content = if message.content.chars().count() > 60 {
                let truncated: String = message.content.chars().take(57).collect();
                format!("{truncated}...")
            } else {
                message.content
            };
            println!("    [{}] {}: {}", message.created_at, message.sender, content);
        }
    }

    Ok(())
}
