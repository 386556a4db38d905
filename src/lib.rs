pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod slack;

use agent::ChatAgent;
use cli::{ mask_secret, Args };
use config::prompt::PromptTemplate;
use history::initialize_history_store;
use llm::chat::new_client as new_chat_client;
use llm::LlmConfig;
use log::{ info, warn };
use server::events::EventRouter;
use server::Server;
use slack::{ BotIdentity, SignatureVerifier, SlackApiClient };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Events Path: {}", args.events_path);
    info!("Slack Bot Token: {}", mask_secret(&args.slack_bot_token));
    info!("Slack API: {}", args.slack_api_base_url);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Chat Model: {}", args.chat_model);
    info!("Temperature: {}", args.temperature);
    info!("Max Tokens: {}", args.max_tokens);
    info!("Completion Timeout: {}s", args.completion_timeout_secs);
    info!("History Window: {} exchanges ({:?})", args.history_window, args.history_scope);
    info!("Process Before Response: {}", args.process_before_response);
    info!("Rate Limit: {}/s", args.max_requests_per_second);
    info!("-------------------------");

    // axum-server and reqwest may each pull in a rustls backend.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let verifier = SignatureVerifier::new(&args.signing_secret)?;

    let prompt = match &args.prompt_template_path {
        Some(path) => PromptTemplate::from_file(path)?,
        None => PromptTemplate::default(),
    };

    let chat_client = new_chat_client(&LlmConfig::from_args(&args))?;
    let history_store = initialize_history_store(&args);
    let agent = ChatAgent::new(
        chat_client,
        history_store,
        prompt,
        Duration::from_secs(args.completion_timeout_secs)
    ).with_prompt_logging(args.debug);

    let slack = Arc::new(SlackApiClient::new(&args.slack_bot_token, &args.slack_api_base_url)?);
    let identity: Option<BotIdentity> = if args.skip_token_verification {
        warn!("Skipping Slack token verification; bot identity unknown.");
        None
    } else {
        Some(slack.auth_test().await?.into())
    };

    let events = Arc::new(EventRouter::new(Arc::new(agent), slack, identity, args.history_scope));

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, events, verifier, args);
    server.run().await?;

    Ok(())
}
