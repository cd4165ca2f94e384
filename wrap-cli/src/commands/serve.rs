use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use wrap::{Config, Server};

use crate::widgets::Api;

pub async fn execute(mut config: Config, port: Option<u16>) -> Result<i32> {
    if let Some(port) = port {
        config.service.port = port;
    }

    eprintln!(
        "{} {} on port {}",
        "Serving".green().bold(),
        config.service.name,
        config.service.port
    );

    Server::new(config)
        .serve(Arc::new(Api::new()))
        .await
        .context("Server failed")?;

    Ok(0)
}
