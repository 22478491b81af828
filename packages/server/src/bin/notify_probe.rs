//! CLI for checking the notification path end to end
//!
//! Builds one membership fact from flags, renders it exactly as the service
//! would and publishes it to the configured NATS subject. Prints the outcome
//! as JSON and exits non-zero when delivery failed.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use membership_core::common::{Actor, ProjectId};
use membership_core::config::Config;
use membership_core::domains::membership::{
    EventFormatter, MembershipAction, MembershipChangeFact, NotificationPayload,
    NotificationPublisher, PublishResult,
};
use membership_core::kernel::NatsClientPublisher;

#[derive(Parser)]
#[command(name = "notify_probe")]
#[command(about = "Publish one membership notification to the configured broker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    project_id: i64,

    #[arg(long)]
    project_name: String,

    #[arg(long)]
    member: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long, default_value = "notify_probe")]
    actor: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Announce a member being added
    Add,

    /// Announce a role change
    Update {
        /// Role names after the change, in order
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
    },

    /// Announce a member being removed
    Delete,
}

#[derive(Serialize)]
struct Response {
    delivered: bool,
    subject: String,
    payload: NotificationPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,membership_core=debug,async_nats=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let action = match cli.command {
        Commands::Add => MembershipAction::AddMember,
        Commands::Update { roles } => MembershipAction::UpdateMember { role_names: roles },
        Commands::Delete => MembershipAction::DeleteMember,
    };

    let actor = Actor::named(cli.actor);
    let fact = MembershipChangeFact::builder()
        .project_id(ProjectId::new(cli.project_id))
        .project_name(cli.project_name)
        .member_name(cli.member)
        .member_phone(cli.phone)
        .actor_name(actor.name())
        .action(action)
        .occurred_at(Utc::now())
        .build();

    let settings = &config.notifications;
    let payload = EventFormatter::new(settings.locale, settings.utc_offset).format(&fact);

    let nats = NatsClientPublisher::connect(&config.nats_url, config.nats_connect_timeout)
        .await
        .context("Failed to create NATS client")?;
    let publisher = NotificationPublisher::new(
        Arc::new(nats),
        settings.subject.clone(),
        settings.publish_timeout,
    );

    let result = publisher.publish(&payload).await;
    let response = Response {
        delivered: result.is_delivered(),
        subject: publisher.subject().to_string(),
        payload,
        error: match &result {
            PublishResult::Delivered => None,
            PublishResult::Failed(e) => Some(e.to_string()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.delivered {
        std::process::exit(1);
    }
    Ok(())
}
