//! `socket login` command handler

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use socket_api::{ClientOptions, SocketClient};
use socket_core::config::{ConfigKey, SocketConfig};

use crate::cli::LoginArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `login` command.
///
/// The token comes from `--api-token` or the first line of stdin. It is only
/// stored once listing organizations with it succeeds.
pub async fn execute(
    args: LoginArgs,
    ctx: &Context,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let token = match args.api_token {
        Some(token) => token.trim().to_owned(),
        None => {
            eprint!("API token: ");
            read_token(BufReader::new(tokio::io::stdin())).await?
        }
    };
    if token.is_empty() {
        return Err(CliError::Usage("no API token given".to_owned()));
    }

    // `stored` is what gets saved; `effective` also carries env overrides and
    // is what the token is verified against.
    let mut stored = SocketConfig::from_file_or_default(&ctx.config_path).await?;
    let mut effective = ctx.config.api.clone();
    if let Some(base_url) = args.api_base_url.as_deref() {
        stored.set(ConfigKey::ApiBaseUrl, base_url)?;
        effective.base_url = stored.api.base_url.clone();
    }
    if let Some(proxy) = args.api_proxy.as_deref() {
        stored.set(ConfigKey::ApiProxy, proxy)?;
        effective.proxy = stored.api.proxy.clone();
    }

    if ctx.bail_if_dry_run(
        format!("store API token in {}", ctx.config_path.display()),
        writer,
    )? {
        return Ok(());
    }

    let client = SocketClient::new(ClientOptions {
        token: token.clone(),
        base_url: effective.base_url,
        proxy: Some(effective.proxy).filter(|p| !p.is_empty()),
        timeout: Duration::from_secs(effective.timeout_secs),
    })?;
    let response = client.organizations().await?;

    let mut organizations: Vec<String> = response
        .organizations
        .into_values()
        .map(|org| org.slug)
        .collect();
    organizations.sort();

    stored.set(ConfigKey::ApiToken, &token)?;
    let default_org = match organizations.as_slice() {
        [only] => {
            stored.set(ConfigKey::DefaultOrg, only)?;
            Some(only.clone())
        }
        _ => None,
    };
    stored.save(&ctx.config_path).await?;
    info!(path = %ctx.config_path.display(), orgs = organizations.len(), "API token stored");

    writer.render(&LoginResult {
        config_path: ctx.config_path.display().to_string(),
        organizations,
        default_org,
    })
}

async fn read_token<R: AsyncBufRead + Unpin>(mut reader: R) -> Result<String, CliError> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line.trim().to_owned())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub config_path: String,
    pub organizations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_org: Option<String>,
}

impl Render for LoginResult {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "{}", "API token verified and saved.".green())?;
        writeln!(w, "Config: {}", self.config_path)?;
        if self.organizations.is_empty() {
            writeln!(w, "The token has no organizations.")?;
        } else {
            writeln!(w, "Organizations: {}", self.organizations.join(", "))?;
        }
        if let Some(org) = &self.default_org {
            writeln!(w, "Default organization: {}", org.bold())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::context::tests::context_for;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn token_is_read_from_first_line() {
        let token = read_token(&b"  sktsec_abc \nignored\n"[..]).await.expect("read");
        assert_eq!(token, "sktsec_abc");
    }

    #[tokio::test]
    async fn test_login_stores_token_and_single_org() {
        // Given: an API that accepts the token and has one organization
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/organizations"))
            .and(header("authorization", "Basic c2t0c2VjX25ldzo="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organizations": {"o1": {"id": "o1", "plan": "team", "slug": "acme"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let ctx = context_for("http://unused.invalid/v0/", config_path.clone());
        let base_url = format!("{}/v0/", server.uri());

        // When: logging in with a new token
        let args = LoginArgs {
            api_token: Some("sktsec_new".to_owned()),
            api_base_url: Some(base_url.clone()),
            api_proxy: None,
        };
        execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect("login succeeds");

        // Then: token, base URL and default org are persisted
        let saved = SocketConfig::from_file(&config_path).await.expect("saved config");
        assert_eq!(saved.token(), Some("sktsec_new"));
        assert_eq!(saved.default_org(), Some("acme"));
        assert_eq!(saved.api.base_url, base_url);
    }

    #[tokio::test]
    async fn test_login_uses_env_endpoint_without_saving_it() {
        // Given: an endpoint that only comes from the environment
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/organizations"))
            .and(header("authorization", "Basic c2t0c2VjX25ldzo="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organizations": {
                    "o1": {"id": "o1", "slug": "acme"},
                    "o2": {"id": "o2", "slug": "beta"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let env_url = format!("{}/v0/", server.uri());
        let ctx = context_for(&env_url, config_path.clone());

        // When: logging in without --api-base-url
        let args = LoginArgs {
            api_token: Some("sktsec_new".to_owned()),
            api_base_url: None,
            api_proxy: None,
        };
        execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect("login reaches the env endpoint");

        // Then: the token is saved, the env endpoint is not
        let saved = SocketConfig::from_file(&config_path).await.expect("saved config");
        assert_eq!(saved.token(), Some("sktsec_new"));
        assert_eq!(saved.default_org(), None, "two organizations, no default");
        assert_eq!(saved.api.base_url, SocketConfig::default().api.base_url);
    }

    #[tokio::test]
    async fn test_login_rejected_token_is_not_saved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/organizations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Invalid API token"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let ctx = context_for("http://unused.invalid/v0/", config_path.clone());

        let args = LoginArgs {
            api_token: Some("sktsec_bad".to_owned()),
            api_base_url: Some(format!("{}/v0/", server.uri())),
            api_proxy: None,
        };
        let err = execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect_err("401 fails");

        assert!(err.to_string().contains("socket login"));
        assert!(!config_path.exists(), "nothing is written on failure");
    }

    #[tokio::test]
    async fn test_login_dry_run_writes_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        let mut ctx = context_for("http://unused.invalid/v0/", config_path.clone());
        ctx.dry_run = true;

        let args = LoginArgs {
            api_token: Some("sktsec_new".to_owned()),
            api_base_url: None,
            api_proxy: None,
        };
        execute(args, &ctx, &OutputWriter::new(OutputFormat::Json))
            .await
            .expect("dry run succeeds");
        assert!(!config_path.exists());
    }

    #[tokio::test]
    async fn test_login_empty_token_is_usage_error() {
        let dir = TempDir::new().expect("temp dir");
        let ctx = context_for("http://unused.invalid/v0/", dir.path().join("config.toml"));
        let args = LoginArgs {
            api_token: Some("   ".to_owned()),
            api_base_url: None,
            api_proxy: None,
        };
        let err = execute(args, &ctx, &OutputWriter::new(OutputFormat::Text))
            .await
            .expect_err("empty token");
        assert_eq!(err.exit_code(), 2);
    }
}
