//! `devreload serve` command implementation.

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use devreload_config::{CliSettings, Config};
use devreload_core::ReloadSignal;
use devreload_server::{ServerConfig, run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover devreload.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of static files to serve (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to watch for changes; repeatable (overrides config).
    #[arg(short, long = "watch")]
    watch: Vec<PathBuf>,

    /// File extensions that trigger a reload, e.g. `--ext css,js` (overrides config).
    #[arg(short, long = "ext", value_delimiter = ',')]
    ext: Vec<String>,

    /// Enable verbose output (watch and request logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable live reload (default: enabled).
    #[arg(long)]
    live_reload: Option<bool>,

    /// Disable live reload.
    #[arg(long, conflicts_with = "live_reload")]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let server_config = server_config_from_config(&config);

        print_summary(&output, &server_config);
        if !server_config.root.is_dir() {
            output.warning(&format!(
                "Root directory {} does not exist",
                server_config.root.display()
            ));
        }

        let signal = ReloadSignal::new();
        if server_config.live_reload_enabled {
            spawn_manual_trigger(signal.clone());
        }

        run_server(server_config, signal).await?;

        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            watch_paths: (!self.watch.is_empty()).then(|| self.watch.clone()),
            extensions: (!self.ext.is_empty()).then(|| self.ext.clone()),
            live_reload_enabled: self.resolve_live_reload_enabled(),
        }
    }

    /// Resolve `live_reload_enabled` from --live-reload/--no-live-reload flags.
    fn resolve_live_reload_enabled(&self) -> Option<bool> {
        self.no_live_reload.then_some(false).or(self.live_reload)
    }
}

fn print_summary(output: &Output, config: &ServerConfig) {
    output.banner(&config.host, config.port);
    output.setting("Root", &config.root.display().to_string());

    if config.live_reload_enabled {
        let watched: Vec<String> = config
            .watch_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        output.setting("Watching", &watched.join(", "));
        output.setting("Extensions", &config.extensions.join(", "));
        output.setting("Status endpoint", &config.status_path);
        output.setting("Manual reload", "press Enter (or type r)");
    } else {
        output.setting("Live reload", "disabled");
    }
}

/// Read stdin on a background thread and trigger a reload on demand.
///
/// A plain thread is used so a blocked read never holds up runtime shutdown.
fn spawn_manual_trigger(signal: ReloadSignal) {
    let spawned = std::thread::Builder::new()
        .name("devreload-stdin".to_owned())
        .spawn(move || {
            let output = Output::new();
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if is_reload_command(&line) {
                    let value = signal.trigger();
                    tracing::info!(value, "Manual reload triggered");
                    output.reload_triggered(value);
                }
            }
        });

    if let Err(err) = spawned {
        tracing::warn!(error = %err, "Manual reload from stdin unavailable");
    }
}

fn is_reload_command(line: &str) -> bool {
    matches!(line.trim(), "" | "r" | "reload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        let argv = std::iter::once("serve").chain(args.iter().copied());
        TestCli::parse_from(argv).args
    }

    #[test]
    fn test_is_reload_command() {
        assert!(is_reload_command(""));
        assert!(is_reload_command("r"));
        assert!(is_reload_command("  reload \n"));
        assert!(!is_reload_command("quit"));
    }

    #[test]
    fn test_no_flags_override_nothing() {
        let settings = parse(&[]).cli_settings();

        assert!(settings.host.is_none());
        assert!(settings.port.is_none());
        assert!(settings.root.is_none());
        assert!(settings.watch_paths.is_none());
        assert!(settings.extensions.is_none());
        assert!(settings.live_reload_enabled.is_none());
    }

    #[test]
    fn test_watch_and_ext_flags() {
        let settings =
            parse(&["--watch", "src", "-w", "public", "--ext", "css,js", "-e", "html"])
                .cli_settings();

        assert_eq!(
            settings.watch_paths,
            Some(vec![PathBuf::from("src"), PathBuf::from("public")])
        );
        assert_eq!(
            settings.extensions,
            Some(vec!["css".to_owned(), "js".to_owned(), "html".to_owned()])
        );
    }

    #[test]
    fn test_no_live_reload_flag() {
        let settings = parse(&["--no-live-reload"]).cli_settings();
        assert_eq!(settings.live_reload_enabled, Some(false));

        let settings = parse(&["--live-reload", "true"]).cli_settings();
        assert_eq!(settings.live_reload_enabled, Some(true));
    }

    #[test]
    fn test_server_flags() {
        let settings = parse(&["--host", "0.0.0.0", "-p", "9000", "-r", "site"]).cli_settings();

        assert_eq!(settings.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.port, Some(9000));
        assert_eq!(settings.root, Some(PathBuf::from("site")));
    }
}
