use clap::{Parser, Subcommand, ValueEnum};

use crate::auth::OAuthProvider;

#[derive(Parser)]
#[command(name = "aidesk", version, about = "AI assistant dashboard: chat, image and research proxies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,

    /// Sign in with this email before opening a panel
    #[arg(long, global = true, env = "AIDESK_EMAIL")]
    pub email: Option<String>,

    /// Password for --email
    #[arg(long, global = true, env = "AIDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP proxy server
    Serve,

    /// Enter interactive chat REPL mode
    Chat {
        /// Model identifier forwarded to the chat provider
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Generate one image
    Image {
        prompt: String,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long, default_value = "1:1")]
        aspect_ratio: String,
        #[arg(short, long, default_value_t = 80, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },

    /// Run one web research query
    Research {
        query: String,
    },

    /// Create an account with --email and --password
    SignUp {
        /// Full name for the new account
        #[arg(long)]
        name: String,
    },

    /// Print the sign-in URL for an OAuth provider
    Oauth {
        #[arg(value_enum)]
        provider: OAuthArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OAuthArg {
    Github,
    Google,
}

impl From<OAuthArg> for OAuthProvider {
    fn from(arg: OAuthArg) -> Self {
        match arg {
            OAuthArg::Github => OAuthProvider::Github,
            OAuthArg::Google => OAuthProvider::Google,
        }
    }
}
