//! termbridge - headless host for the terminal engine.
//!
//! Validates configuration, lists the resolved binding table and probes
//! what a key would do, without a GUI.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use apprt::info::{BuildMode, VERSION};
use clap::{Parser, Subcommand};
use input::layout::{physical_key_for_char, UsLayout};
use input::{
    KeyEvent, KeyTranslator, KeycodeTable, ParsedBinding, Translation, Trigger, TriggerKey,
};
use settings::Config;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "termbridge")]
#[command(version = VERSION)]
#[command(about = "Headless host for the termbridge terminal engine")]
struct Cli {
    /// Config file to use instead of the user's
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the user's config.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the config and report every problem found
    CheckConfig,
    /// Print the resolved binding table
    ListKeybinds,
    /// Show what a key press would do, e.g. `probe ctrl+shift+t`
    Probe {
        trigger: String,
        /// Treat the key as part of an IME composition
        #[arg(long)]
        composing: bool,
    },
    /// Print version, build mode and config location
    Info,
    /// Write the commented default config if there is none
    Init,
}

/// Check if debug mode is enabled via environment variable.
fn is_debug_mode() -> bool {
    std::env::var("TERMBRIDGE_DEBUG").is_ok()
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if is_debug_mode() {
        "termbridge=trace,apprt=trace,input=debug,settings=debug,info"
    } else {
        "termbridge=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    if is_debug_mode() {
        debug!("termbridge v{} (DEBUG MODE ENABLED)", VERSION);
    }
}

/// Defaults plus either `path` or the user's config file. Not finalized, so
/// diagnostics are not logged yet.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::new();
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            config.load_file(path);
        }
        None => config.load_default_files(),
    }
    Ok(config)
}

fn diagnostic_lines(config: &Config) -> Vec<String> {
    config.diagnostics().iter().map(ToString::to_string).collect()
}

fn keybind_lines(config: &Config) -> Vec<String> {
    config
        .keybinds
        .iter()
        .map(|(trigger, binding)| {
            ParsedBinding {
                trigger: *trigger,
                action: binding.action.clone(),
                flags: binding.flags,
            }
            .to_string()
        })
        .collect()
}

/// The event a host would send for `trigger`.
fn probe_event(trigger: &str, composing: bool) -> Result<KeyEvent> {
    let trigger: Trigger = trigger
        .parse()
        .with_context(|| format!("invalid trigger {trigger:?}"))?;
    let event = match trigger.key {
        TriggerKey::Physical(key) => KeyEvent::key(key),
        TriggerKey::Unicode(c) => KeyEvent {
            key: physical_key_for_char(c).unwrap_or_default(),
            ..KeyEvent::default()
        }
        .with_unshifted(c),
        TriggerKey::CatchAll => bail!("probe needs a concrete key, not catch_all"),
    };
    Ok(event.with_mods(trigger.mods).with_composing(composing))
}

fn describe(translation: &Translation) -> String {
    match translation {
        Translation::Composing(_) => "composing: handed to the input method".to_string(),
        Translation::Binding { binding, .. } => {
            let forwarded = if binding.consumed() {
                "consumed"
            } else {
                "also forwarded"
            };
            format!(
                "binding: {} = {} ({}, flags {:?})",
                binding.trigger, binding.action, forwarded, binding.flags
            )
        }
        Translation::Forward(event) if event.text.is_empty() => {
            format!("forward: {:?} without text", event.key)
        }
        Translation::Forward(event) => format!("forward: {:?} text {:?}", event.key, event.text),
    }
}

fn probe(config: &Config, trigger: &str, composing: bool) -> Result<String> {
    let event = probe_event(trigger, composing)?;
    let translator = KeyTranslator::new(
        &UsLayout,
        KeycodeTable::W3c,
        config.macos_option_as_alt,
        &config.keybinds,
    );
    Ok(describe(&translator.translate(event)))
}

fn run(cli: Cli) -> Result<()> {
    if let Some(dir) = cli.config_dir {
        if !termbridge_paths::set_config_dir(dir) {
            warn!("--config-dir ignored: config directory already resolved");
        }
    }
    let path = cli.config.as_deref();

    match cli.command {
        Commands::CheckConfig => {
            let config = load_config(path)?;
            let problems = diagnostic_lines(&config);
            if problems.is_empty() {
                println!("config ok");
                return Ok(());
            }
            for problem in &problems {
                println!("{problem}");
            }
            bail!("{} problem(s) found", problems.len());
        }
        Commands::ListKeybinds => {
            let mut config = load_config(path)?;
            config.finalize();
            for line in keybind_lines(&config) {
                println!("{line}");
            }
        }
        Commands::Probe { trigger, composing } => {
            let mut config = load_config(path)?;
            config.finalize();
            println!("{}", probe(&config, &trigger, composing)?);
        }
        Commands::Info => {
            println!("termbridge {}", VERSION);
            println!("build mode: {}", BuildMode::current());
            println!("config: {}", termbridge_paths::config_file().display());
        }
        Commands::Init => {
            let path = settings::ensure_config_file()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    info!("termbridge v{} starting", VERSION);
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    fn config(toml: &str) -> Config {
        let mut config = Config::new();
        config.load_str("keybind = \"clear\"");
        config.load_str(toml);
        config
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/termbridge.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn config_file_problems_are_listed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "bogus = 1\ncopy-on-select = true").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.copy_on_select);
        let lines = diagnostic_lines(&config);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("bogus"));
    }

    #[test]
    fn keybinds_list_in_config_syntax() {
        let config = config(r#"keybind = ["ctrl+shift+t=new_tab", "global:unconsumed:f1=quit"]"#);
        assert_eq!(
            keybind_lines(&config),
            vec!["ctrl+shift+t=new_tab", "global:unconsumed:f1=quit"]
        );
    }

    #[test_case("ctrl+shift+t", "binding: ctrl+shift+t = new_tab (consumed" ; "unicode binding")]
    #[test_case("f1", "binding: f1 = quit (also forwarded" ; "physical unconsumed")]
    #[test_case("a", "forward: KeyA text \"a\"" ; "plain letter")]
    fn probe_outcomes(trigger: &str, expected: &str) {
        let config = config(r#"keybind = ["ctrl+shift+t=new_tab", "unconsumed:f1=quit"]"#);
        let outcome = probe(&config, trigger, false).unwrap();
        assert!(outcome.starts_with(expected), "{outcome}");
    }

    #[test]
    fn composing_probe_never_matches() {
        let config = config(r#"keybind = "ctrl+shift+t=new_tab""#);
        let outcome = probe(&config, "ctrl+shift+t", true).unwrap();
        assert!(outcome.starts_with("composing"));
    }

    #[test_case("catch_all" ; "catch all")]
    #[test_case("ctrl+" ; "missing key")]
    fn probe_rejects(trigger: &str) {
        assert!(probe(&config(""), trigger, false).is_err());
    }
}
