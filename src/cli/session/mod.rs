//! Session command - prints a development session token

use clap::Args;

use super::common::load_config;
use crate::domain::UserId;
use crate::infrastructure::auth::SessionTokenIssuer;

/// Arguments for the session command
#[derive(Args, Clone)]
pub struct SessionArgs {
    /// User id placed in the token's `sub` claim
    #[arg(long)]
    pub user: String,

    /// Token lifetime in minutes
    #[arg(long, default_value_t = 60)]
    pub ttl_minutes: i64,
}

/// Sign a token with `session.secret` and print it to stdout
pub async fn run(args: SessionArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let token = issue_token(&config.session, &args)?;

    println!("{}", token);
    eprintln!("{}", browser_hint(&config.session.cookie_name, &token));
    Ok(())
}

fn issue_token(
    config: &crate::config::SessionConfig,
    args: &SessionArgs,
) -> anyhow::Result<String> {
    if args.ttl_minutes <= 0 {
        anyhow::bail!("--ttl-minutes must be positive");
    }

    let issuer = SessionTokenIssuer::from_config(config)?;
    let user_id = UserId::new(args.user.as_str())?;

    Ok(issuer.issue(&user_id, chrono::Duration::minutes(args.ttl_minutes))?)
}

/// The page stores `#<cookie>=<token>` from its URL fragment as the session cookie
fn browser_hint(cookie_name: &str, token: &str) -> String {
    format!(
        "Browser: open /ui/#{}={} on the serve or ui address to sign the page in",
        cookie_name, token
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::domain::SessionVerifier;
    use crate::infrastructure::auth::JwtSessionVerifier;

    fn args(user: &str, ttl_minutes: i64) -> SessionArgs {
        SessionArgs {
            user: user.to_string(),
            ttl_minutes,
        }
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let config = SessionConfig {
            secret: Some("dev-secret".to_string()),
            ..SessionConfig::default()
        };

        let token = issue_token(&config, &args("user_42", 5)).unwrap();
        let session = JwtSessionVerifier::from_config(&config)
            .unwrap()
            .verify(&token)
            .await
            .unwrap();

        assert_eq!(session.user_id().as_str(), "user_42");
    }

    #[test]
    fn test_requires_secret() {
        assert!(issue_token(&SessionConfig::default(), &args("user_42", 5)).is_err());
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        let config = SessionConfig {
            secret: Some("dev-secret".to_string()),
            ..SessionConfig::default()
        };

        assert!(issue_token(&config, &args("user_42", 0)).is_err());
        assert!(issue_token(&config, &args(" ", 5)).is_err());
    }

    #[test]
    fn test_browser_hint_uses_cookie_name() {
        let hint = browser_hint("__session", "abc.def.ghi");

        assert!(hint.contains("/ui/#__session=abc.def.ghi"));
    }
}
