mod commands;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    geolocation::{FixedGeolocation, Geolocation, UnavailableGeolocation},
    select_bridge, GeoClient, HeadlessMap, PickerSession,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{dispatch, parse_command, HELP};

#[derive(Parser, Debug)]
struct Args {
    /// Geo backend base URL, overrides the settings file and environment.
    #[arg(long)]
    api_base: Option<String>,
    #[arg(long, default_value = "picker.toml")]
    config: PathBuf,
    /// Device position reported by `locate`, as "lat,lon".
    #[arg(long)]
    position: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base;
    }
    if let Some(position) = args.position.as_deref() {
        settings.fixed_position = Some(config::parse_position(position)?);
    }

    let picker_config = settings.picker_config();
    let geo = GeoClient::from_config(&picker_config)
        .with_context(|| format!("invalid api base '{}'", picker_config.api_base))?;
    let geolocation: Arc<dyn Geolocation> = match settings.fixed_position {
        Some(point) => Arc::new(FixedGeolocation(point)),
        None => Arc::new(UnavailableGeolocation),
    };
    info!(api_base = %geo.api_base(), style = %picker_config.style_url, "starting map picker");

    let session = PickerSession::new(
        picker_config,
        Arc::new(geo),
        Arc::new(HeadlessMap::default()),
        select_bridge(None),
        geolocation,
    );

    let mut events = session.subscribe_events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = render::render(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    session.start().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(cmd) => {
                if !dispatch(&session, cmd).await {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    session.shutdown();
    printer.abort();
    Ok(())
}
