pub mod commands;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{AuthError, AuthGate, HostedAuth, SignUpOutcome, Surface};
use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::panels::{ChatPanel, ImagePanel, Notice, PanelKind, ProxyClient, ResearchPanel};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to load config: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Sign in to access AI-powered tools (pass --email and --password)")]
    SignedOut,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Failed(String),
}

pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(&cli.config)?;

    let panel = match &cli.command {
        Commands::Serve => {
            return Err(CliError::Failed(
                "serve is handled by the server entry point".to_string(),
            ))
        }
        Commands::SignUp { name } => {
            return sign_up(&config, cli.email.as_deref(), cli.password.as_deref(), name).await
        }
        Commands::Oauth { provider } => {
            let gate = AuthGate::mount(hosted_auth(&config)).await;
            let url = gate.sign_in_with_oauth((*provider).into()).await;
            gate.unmount();
            println!("Open this URL to continue: {}", url?);
            return Ok(());
        }
        Commands::Chat { .. } => PanelKind::Chat,
        Commands::Image { .. } => PanelKind::Image,
        Commands::Research { .. } => PanelKind::Research,
    };

    let gate = open_gate(&config, cli.email.as_deref(), cli.password.as_deref(), panel).await?;
    let backend = ProxyClient::new(config.client.base_url.clone(), config.client.anon_key.clone());

    let outcome = match cli.command {
        Commands::Serve | Commands::SignUp { .. } | Commands::Oauth { .. } => Ok(()),
        Commands::Chat { model } => run_repl(&backend, model).await,
        Commands::Image {
            prompt,
            model,
            aspect_ratio,
            quality,
        } => {
            let mut panel = ImagePanel::new();
            panel.prompt = prompt;
            if let Some(model) = model {
                panel.model = model;
            }
            panel.aspect_ratio = aspect_ratio;
            panel.quality = quality;

            let image = panel.generate(&backend).await.cloned();
            print_notices(panel.take_notices());
            match image {
                Some(image) => {
                    println!("{}", image.url);
                    println!("Save as: {}", ImagePanel::download_name(&image));
                    Ok(())
                }
                None => Err(CliError::Failed("image generation failed".to_string())),
            }
        }
        Commands::Research { query } => {
            let mut panel = ResearchPanel::new();
            panel.query = query;

            let entry = panel.search(&backend).await.cloned();
            print_notices(panel.take_notices());
            match entry {
                Some(entry) => {
                    println!("{}\n", entry.summary);
                    for r in entry.results {
                        println!("{}. {} ({}, {})", r.id, r.title, r.domain, r.timestamp);
                        println!("   {}", r.url);
                        println!("   {}", r.snippet);
                    }
                    Ok(())
                }
                None => Err(CliError::Failed("web research failed".to_string())),
            }
        }
    };

    gate.unmount();
    outcome
}

async fn open_gate(
    config: &AppConfig,
    email: Option<&str>,
    password: Option<&str>,
    panel: PanelKind,
) -> Result<AuthGate, CliError> {
    let gate = AuthGate::mount(hosted_auth(config)).await;

    if let (Some(email), Some(password)) = (email, password) {
        let session = gate.sign_in(email, password).await?;
        println!("Signed in as {}", session.email);
    }

    match gate.surface(panel) {
        Surface::Panel(_) => Ok(gate),
        Surface::Landing | Surface::Loading => {
            gate.unmount();
            Err(CliError::SignedOut)
        }
    }
}

fn hosted_auth(config: &AppConfig) -> Arc<HostedAuth> {
    Arc::new(HostedAuth::new(
        config.client.auth_url.clone(),
        config.client.anon_key.clone(),
    ))
}

async fn sign_up(
    config: &AppConfig,
    email: Option<&str>,
    password: Option<&str>,
    name: &str,
) -> Result<(), CliError> {
    let gate = AuthGate::mount(hosted_auth(config)).await;
    let outcome = gate
        .sign_up(email.unwrap_or_default(), password.unwrap_or_default(), name)
        .await;
    gate.unmount();

    match outcome? {
        SignUpOutcome::SignedIn(session) => println!("Account created. Signed in as {}", session.email),
        SignUpOutcome::ConfirmationRequired => {
            println!("Account created. Please check your email for a confirmation link.")
        }
    }
    Ok(())
}

async fn run_repl(backend: &ProxyClient, model: Option<String>) -> Result<(), CliError> {
    let mut panel = ChatPanel::new();
    panel.model = model;

    println!("--- aidesk Terminal Chat ---");
    println!("Type /exit to quit.");
    println!("----------------------------");
    if let Some(greeting) = panel.transcript().first() {
        println!("\nAssistant> {}", greeting.content);
    }

    let stdin = io::stdin();
    loop {
        print!("\nUser> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        panel.input = text.to_string();
        if let Some(reply) = panel.send(backend).await {
            println!("Assistant> {}", reply.content);
        }
        print_notices(panel.take_notices());
    }

    Ok(())
}

fn print_notices(notices: Vec<Notice>) {
    for n in notices {
        eprintln!("[{}] {}", n.title, n.description);
    }
}
