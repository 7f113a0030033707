use std::time::Duration;

use llmwire::{
    ClientFactory, CredentialKey, CredentialStore, LlmWireError, ProxyKind, SettingsState,
};

fn settings_with_proxy(host: &str, port: u16) -> SettingsState {
    let mut settings = SettingsState::default();
    settings.advanced.proxy_host = host.to_string();
    settings.advanced.proxy_port = port;
    settings
}

fn azure_ready_settings() -> SettingsState {
    let mut settings = SettingsState::default();
    settings.azure.resource_name = "unit".to_string();
    settings.azure.deployment_id = "gpt-35".to_string();
    settings
}

fn full_credentials() -> CredentialStore {
    let credentials = CredentialStore::new();
    credentials.set(CredentialKey::OpenAiApiKey, "sk-test");
    credentials.set(CredentialKey::AzureApiKey, "azure-key");
    credentials.set(CredentialKey::AzureActiveDirectoryToken, "ad-token");
    credentials
}

#[test]
fn shared_options_omit_proxy_when_host_empty() {
    let options = ClientFactory::shared_options(&settings_with_proxy("", 8080));
    assert!(options.proxy.is_none());
}

#[test]
fn shared_options_omit_proxy_when_port_zero() {
    let options = ClientFactory::shared_options(&settings_with_proxy("proxy.internal", 0));
    assert!(options.proxy.is_none());
}

#[test]
fn shared_options_carry_proxy_without_credentials() {
    let options = ClientFactory::shared_options(&settings_with_proxy("proxy.internal", 8080));
    let proxy = options.proxy.expect("proxy should be configured");
    assert_eq!(proxy.host, "proxy.internal");
    assert_eq!(proxy.port, 8080);
    assert!(proxy.credentials.is_none());
}

#[test]
fn shared_options_attach_credentials_when_auth_selected() {
    let mut settings = settings_with_proxy("proxy.internal", 8080);
    settings.advanced.proxy_auth_selected = true;
    settings.advanced.proxy_username = "user".to_string();
    settings.advanced.proxy_password = "pass".to_string();

    let options = ClientFactory::shared_options(&settings);
    let credentials = options.proxy.unwrap().credentials.expect("credentials expected");
    assert_eq!(credentials.username, "user");
    assert_eq!(credentials.password, "pass");
}

#[test]
fn shared_options_ignore_saved_credentials_until_auth_selected() {
    let mut settings = settings_with_proxy("proxy.internal", 8080);
    settings.advanced.proxy_username = "stale-user".to_string();
    settings.advanced.proxy_password = "stale-pass".to_string();

    let options = ClientFactory::shared_options(&settings);
    assert!(options.proxy.unwrap().credentials.is_none());
}

#[test]
fn shared_options_always_take_timeouts_from_settings() {
    let mut settings = SettingsState::default();
    settings.advanced.connect_timeout_secs = 7;
    settings.advanced.read_timeout_secs = 42;

    let options = ClientFactory::shared_options(&settings);
    assert_eq!(options.connect_timeout, Duration::from_secs(7));
    assert_eq!(options.read_timeout, Duration::from_secs(42));
    assert!(options.retry_on_read_timeout);
}

#[test]
fn openai_assembly_requires_api_key() {
    std::env::remove_var("OPENAI_API_KEY");
    match ClientFactory::openai(&SettingsState::default(), &CredentialStore::new()) {
        Err(LlmWireError::MissingCredential { env_var, .. }) => {
            assert_eq!(env_var, "OPENAI_API_KEY");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("assembly should fail without an API key"),
    }
}

#[test]
fn openai_assembly_succeeds_with_stored_key() {
    let client = ClientFactory::openai(&SettingsState::default(), &full_credentials());
    assert!(client.is_ok());
}

#[test]
fn azure_assembly_uses_api_key_by_default() {
    let credentials = CredentialStore::new();
    credentials.set(CredentialKey::AzureApiKey, "azure-key");

    let client = ClientFactory::azure(&azure_ready_settings(), &credentials);
    assert!(client.is_ok());
}

#[test]
fn azure_active_directory_flag_switches_required_credential() {
    std::env::remove_var("AZURE_ACTIVE_DIRECTORY_TOKEN");
    let mut settings = azure_ready_settings();
    settings.azure.use_active_directory_auth = true;

    // API key 已配置，但 AD 模式要求的是令牌
    let credentials = CredentialStore::new();
    credentials.set(CredentialKey::AzureApiKey, "azure-key");
    match ClientFactory::azure(&settings, &credentials) {
        Err(LlmWireError::MissingCredential { env_var, .. }) => {
            assert_eq!(env_var, "AZURE_ACTIVE_DIRECTORY_TOKEN");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("AD auth should demand the directory token"),
    }

    credentials.set(CredentialKey::AzureActiveDirectoryToken, "ad-token");
    assert!(ClientFactory::azure(&settings, &credentials).is_ok());
}

#[test]
fn azure_assembly_reports_missing_deployment() {
    let err = ClientFactory::azure(&SettingsState::default(), &full_credentials())
        .err()
        .expect("default settings have no deployment id");
    assert!(err.to_string().contains("deployment"));
}

#[test]
fn you_assembly_needs_no_stored_credentials() {
    let client = ClientFactory::you(&SettingsState::default(), "session", "token");
    assert!(client.is_ok());
}

#[test]
fn invalid_proxy_host_fails_every_provider() {
    let mut settings = azure_ready_settings();
    settings.advanced.proxy_host = "bad host".to_string();
    settings.advanced.proxy_port = 3128;
    let credentials = full_credentials();

    for result in [
        ClientFactory::openai(&settings, &credentials).map(|_| ()),
        ClientFactory::azure(&settings, &credentials).map(|_| ()),
        ClientFactory::you(&settings, "session", "token").map(|_| ()),
    ] {
        match result.unwrap_err() {
            LlmWireError::InvalidProxy { url, .. } => {
                assert_eq!(url, "http://bad host:3128");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn socks_proxy_builds_for_every_provider() {
    let mut settings = azure_ready_settings();
    settings.advanced.proxy_kind = ProxyKind::Socks;
    settings.advanced.proxy_host = "127.0.0.1".to_string();
    settings.advanced.proxy_port = 1080;
    settings.advanced.proxy_auth_selected = true;
    settings.advanced.proxy_username = "user".to_string();
    settings.advanced.proxy_password = "pass".to_string();
    let credentials = full_credentials();

    assert!(ClientFactory::openai(&settings, &credentials).is_ok());
    assert!(ClientFactory::azure(&settings, &credentials).is_ok());
    assert!(ClientFactory::you(&settings, "session", "token").is_ok());
}
