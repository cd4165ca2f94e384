use anyhow::Result;
use clap::Args;
use colored::Colorize;
use wrap::prelude::*;

use crate::widgets::Api;

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Action word (create, read, update, delete, options) or HTTP verb
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// Request path, e.g. /widgets or /widgets/{id}
    #[arg(value_name = "PATH")]
    pub path: String,

    /// JSON request body
    #[arg(long, short)]
    pub body: Option<String>,

    /// Caller identity shown in diagnostics
    #[arg(long, short, env = "WRAP_USER")]
    pub user: Option<String>,

    /// Request flag, repeatable
    #[arg(long = "flag", short = 'f', value_name = "KEY=VALUE", value_parser = parse_flag)]
    pub flags: Vec<(String, String)>,
}

/// Run one request and print the response body to stdout.
///
/// Returns the process exit code: 0 for a success status, 1 otherwise.
pub fn execute(args: CallArgs, config: &Config) -> Result<i32> {
    let response = invoke(&Api::new(), args, config, LocalResponder::stdout());

    match response.status() {
        Some(status) if status.is_client_error() || status.is_server_error() => {
            eprintln!("{} {}", "Status:".red().bold(), status);
            Ok(1)
        }
        Some(status) => {
            eprintln!("{} {}", "Status:".green().bold(), status);
            Ok(0)
        }
        None => {
            eprintln!("{}", "No response written".yellow());
            Ok(0)
        }
    }
}

fn invoke<H: Handler>(
    handler: &H,
    args: CallArgs,
    config: &Config,
    responder: LocalResponder,
) -> LocalResponder {
    let path = Path::new(&args.path);
    let mut request = Request::new(Action::from(args.action.as_str()), path).with_flags(args.flags);
    if let Some(body) = args.body {
        request = request.with_body(body);
    }

    let mut ctx = Ctx::new(request, responder);
    if let Some(user) = args.user {
        ctx = ctx.with_user(user);
    }
    if let Some(cors) = &config.cors {
        ctx.response_mut()
            .enable_cors(&cors.origin, &cors.methods, &cors.headers);
    }

    ctx.serve(handler)
}

fn parse_flag(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(action: &str, path: &str) -> CallArgs {
        CallArgs {
            action: action.to_string(),
            path: path.to_string(),
            body: None,
            user: None,
            flags: Vec::new(),
        }
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(
            parse_flag("limit=5").unwrap(),
            ("limit".to_string(), "5".to_string())
        );
        assert_eq!(
            parse_flag("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_flag("limit").is_err());
        assert!(parse_flag("=5").is_err());
    }

    #[test]
    fn test_invoke_create_with_body() {
        let mut args = args("create", "/widgets");
        args.body = Some(r#"{"name":"gear"}"#.to_string());

        let response = invoke(&Api::new(), args, &Config::default(), LocalResponder::new());
        assert_eq!(response.status(), Some(StatusCode::CREATED));
        assert_eq!(response.output().unwrap()["name"], json!("gear"));
    }

    #[test]
    fn test_invoke_accepts_http_verbs() {
        let response = invoke(
            &Api::new(),
            args("GET", "/widgets"),
            &Config::default(),
            LocalResponder::new(),
        );
        assert_eq!(response.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_invoke_unknown_action_is_method_not_allowed() {
        let response = invoke(
            &Api::new(),
            args("frobnicate", "/widgets"),
            &Config::default(),
            LocalResponder::new(),
        );
        assert_eq!(response.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
    }

    #[test]
    fn test_invoke_applies_cors() {
        let mut config = Config::default();
        config.cors = Some(CorsConfig::default());

        let response = invoke(
            &Api::new(),
            args("options", "/widgets"),
            &config,
            LocalResponder::new(),
        );
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_invoke_routes_any_raw_path() {
        let response = invoke(
            &Api::new(),
            args("read", "/widgets/my widget"),
            &Config::default(),
            LocalResponder::new(),
        );
        assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));

        let response = invoke(&Api::new(), args("read", ""), &Config::default(), LocalResponder::new());
        assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
    }
}
