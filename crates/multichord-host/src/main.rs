//! multichord: render a MIDI session through the chord expander

mod config;
mod engine;
mod session;
mod state_file;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use multichord_core::{MultiChord, Preset};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use engine::Engine;
use session::Session;

const USAGE: &str = "usage: multichord <session.json> [--config <path>] [--state <path>] \
                     [--save-state <path>] [--write-config]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    session: PathBuf,
    config: Option<PathBuf>,
    state: Option<PathBuf>,
    save_state: Option<PathBuf>,
    write_config: bool,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = Args::default();
        let mut session = None;
        while let Some(arg) = raw.next() {
            let mut value =
                |flag: &str| raw.next().with_context(|| format!("{flag} needs a path\n{USAGE}"));
            match arg.as_str() {
                "--config" => args.config = Some(value("--config")?.into()),
                "--state" => args.state = Some(value("--state")?.into()),
                "--save-state" => args.save_state = Some(value("--save-state")?.into()),
                "--write-config" => args.write_config = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                path if session.is_none() => session = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument {extra}\n{USAGE}"),
            }
        }
        args.session = session.with_context(|| USAGE.to_string())?;
        Ok(args)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("multichord=info".parse()?))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let config: AppConfig = config::load_config(&config_path);
    if args.write_config {
        config::save_config(&config_path, &config)?;
    }

    let plugin = Arc::new(MultiChord::new(config.engine.voices));
    tracing::info!(
        plugin = plugin.info().label,
        voices = plugin.voices(),
        parameters = plugin.parameter_count(),
        "Starting MultiChord"
    );

    let startup: Preset = config.engine.program.parse()?;
    plugin.load_preset(startup);

    if let Some(path) = args.state.as_ref().or(config.state_path.as_ref()) {
        if path.exists() {
            state_file::load_state(path, &plugin)?;
        }
    }

    let session = Session::load(&args.session)?;
    let engine = Engine::new(plugin, config.engine.block_size);
    let render = engine.render(&session)?;

    for event in &render.events {
        let bytes: Vec<String> = event.data.iter().map(|b| format!("{b:02X}")).collect();
        println!("{}: {}", event.time, bytes.join(" "));
    }

    if let Some(path) = &args.save_state {
        state_file::save_state(path, engine.plugin())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&["song.json", "--state", "s.json", "--write-config"]).unwrap();
        assert_eq!(args.session, PathBuf::from("song.json"));
        assert_eq!(args.state, Some(PathBuf::from("s.json")));
        assert!(args.write_config);
        assert_eq!(args.save_state, None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.json", "--state"]).is_err());
        assert!(parse(&["a.json", "--loud"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}
