mod events;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use breeze_api::AppState;
use breeze_commands::replies::COMMAND_FAILED;
use breeze_core::config::{DatabaseConfig, DatabaseConnection};
use breeze_core::{Config, Data, Error};
use breeze_database::{AuditLogger, Database, MIGRATOR};
use breeze_utils::embed::build_reply_embed;
use breeze_weather::OpenWeatherClient;

const AUDIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let db = Database::new(connect_pool(&config.database).await?);
    info!("PostgreSQL connection established.");

    if config.database.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let db = Arc::new(db);
    let (audit, audit_worker) = AuditLogger::spawn(db.clone(), config.audit_queue_capacity);

    let weather = OpenWeatherClient::new(config.weather.api_key.clone())
        .with_base_url(config.weather.api_url.clone())
        .with_lang(config.weather.lang.clone());
    info!(api_url = %config.weather.api_url, lang = %config.weather.lang, "Weather provider configured.");

    let data = Data {
        settings: db.clone(),
        weather: Arc::new(weather),
        audit,
    };

    let api_addr = SocketAddr::new(config.api.bind_addr, config.api.port);
    let api_state = AppState::new(db.clone());

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let guild_id = config.discord_guild_id;
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: breeze_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            // Text commands go through the message handler.
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None,
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let data = data.clone();
            Box::pin(async move {
                info!("Breeze is ready.");

                let commands = &framework.options().commands;
                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "Slash commands registered in guild.");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                        info!("Slash commands registered globally.");
                    }
                }

                Ok(data)
            })
        })
        .build();

    info!("Breeze is connecting...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => result.context("Discord client stopped")?,
        result = breeze_api::serve(api_addr, api_state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested.");
            shard_manager.shutdown_all().await;
        }
    }

    // The worker exits once the last audit sender is dropped with the client.
    drop(client);
    if tokio::time::timeout(AUDIT_FLUSH_TIMEOUT, audit_worker)
        .await
        .is_err()
    {
        warn!("Timed out flushing queued audit entries.");
    }

    Ok(())
}

async fn connect_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool_options = PgPoolOptions::new().max_connections(config.max_connections);

    let pool = match &config.connection {
        DatabaseConnection::Url(url) => pool_options.connect(url).await,
        DatabaseConnection::Parts {
            host,
            port,
            database,
            username,
            password,
        } => {
            let mut connect_options = PgConnectOptions::new()
                .host(host)
                .port(*port)
                .database(database)
                .username(username);
            if let Some(password) = password {
                connect_options = connect_options.password(password);
            }

            pool_options.connect_with(connect_options).await
        }
    };

    pool.context("failed to connect to PostgreSQL")
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = build_reply_embed(COMMAND_FAILED);
            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, error, .. } => {
            warn!(?error, ?input, command = %ctx.command().qualified_name, "invalid command argument");

            let _ = ctx.say(COMMAND_FAILED).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        events::text_commands::handle_message_command(ctx, data, new_message).await?;
    }

    Ok(())
}
