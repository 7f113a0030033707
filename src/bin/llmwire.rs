use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use futures::StreamExt;

use llmwire::{
    ClientFactory, CompletionRequest, CredentialStore, DynCompletionClient, LoggingConfig,
    ProviderKind, ProxyKind, SettingsState, SettingsStore,
};

#[derive(Parser)]
#[command(name = "llmwire", version, about = "Completion service client toolkit", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    Chat {
        #[arg(long, default_value = "llmwire.json")]
        settings: PathBuf,
        #[arg(long)]
        provider: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        stream: bool,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        access_token: Option<String>,
        message: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Init {
        #[arg(long, default_value = "llmwire.json")]
        settings: PathBuf,
    },
    Show {
        #[arg(long, default_value = "llmwire.json")]
        settings: PathBuf,
    },
    SetProxy {
        #[arg(long, default_value = "llmwire.json")]
        settings: PathBuf,
        #[arg(long, default_value = "")]
        host: String,
        #[arg(long, default_value_t = 0)]
        port: u16,
        #[arg(long, default_value = "http")]
        kind: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Settings { command } => match command {
            SettingsCommand::Init { settings } => handle_settings_init(settings)?,
            SettingsCommand::Show { settings } => handle_settings_show(settings)?,
            SettingsCommand::SetProxy {
                settings,
                host,
                port,
                kind,
                username,
                password,
            } => handle_settings_set_proxy(settings, host, port, kind, username, password)?,
        },
        Command::Chat {
            settings,
            provider,
            system,
            stream,
            session_id,
            access_token,
            message,
        } => {
            handle_chat(
                settings,
                provider,
                system,
                stream,
                session_id,
                access_token,
                message,
            )
            .await?
        }
    }
    Ok(())
}

fn handle_settings_init(path: PathBuf) -> anyhow::Result<()> {
    if path.exists() {
        println!("Settings file `{}` already exists", path.display());
        return Ok(());
    }
    let store = SettingsStore::with_state(&path, SettingsState::default());
    store.save()?;
    println!("Settings written to `{}`", path.display());
    Ok(())
}

fn handle_settings_show(path: PathBuf) -> anyhow::Result<()> {
    let store = SettingsStore::open(&path)?;
    let state = store.snapshot();
    let content = serde_json::to_string_pretty(&state)?;
    println!("{content}");

    let options = ClientFactory::shared_options(&state);
    match &options.proxy {
        Some(proxy) => println!("Effective proxy: {}", proxy.url()),
        None => println!("Effective proxy: none"),
    }
    println!(
        "Timeouts: connect {}s, read {}s",
        options.connect_timeout.as_secs(),
        options.read_timeout.as_secs()
    );
    Ok(())
}

fn handle_settings_set_proxy(
    path: PathBuf,
    host: String,
    port: u16,
    kind: String,
    username: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let kind = match kind.as_str() {
        "http" => ProxyKind::Http,
        "socks" => ProxyKind::Socks,
        other => return Err(anyhow!("unknown proxy kind `{}` (expected http or socks)", other)),
    };

    let store = SettingsStore::open(&path)?;
    store.update(|state| {
        state.advanced.proxy_kind = kind;
        state.advanced.proxy_host = host;
        state.advanced.proxy_port = port;
        match (username, password) {
            (Some(username), Some(password)) => {
                state.advanced.proxy_auth_selected = true;
                state.advanced.proxy_username = username;
                state.advanced.proxy_password = password;
            }
            _ => {
                state.advanced.proxy_auth_selected = false;
                state.advanced.proxy_username = String::new();
                state.advanced.proxy_password = String::new();
            }
        }
    })?;
    println!("Proxy settings updated in `{}`", path.display());
    Ok(())
}

async fn handle_chat(
    path: PathBuf,
    provider: String,
    system: Option<String>,
    stream: bool,
    session_id: Option<String>,
    access_token: Option<String>,
    message: String,
) -> anyhow::Result<()> {
    let store = SettingsStore::open(&path)?;
    let settings = store.snapshot();
    let credentials = CredentialStore::new();

    let kind: ProviderKind = provider.parse()?;
    let client: DynCompletionClient = match kind {
        ProviderKind::OpenAi => Arc::new(ClientFactory::openai(&settings, &credentials)?),
        ProviderKind::Azure => Arc::new(ClientFactory::azure(&settings, &credentials)?),
        ProviderKind::You => {
            let session_id = session_id
                .ok_or_else(|| anyhow!("--session-id is required for provider `you`"))?;
            let access_token = access_token
                .ok_or_else(|| anyhow!("--access-token is required for provider `you`"))?;
            Arc::new(ClientFactory::you(&settings, session_id, access_token)?)
        }
    };

    let mut request = CompletionRequest::new(message);
    request.system = system;

    if stream {
        let mut chunks = client.complete_stream(request);
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            print!("{}", chunk.content);
            std::io::stdout().flush()?;
            if chunk.done {
                break;
            }
        }
        println!();
    } else {
        let response = client.complete(request).await?;
        println!("{}", response.content);
    }
    Ok(())
}
