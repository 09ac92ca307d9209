use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use hbnb_console::{Console, Dispatcher};
use hbnb_store::{JsonFileBackend, ObjectStore};
use hbnb_types::ClassRegistry;
use tracing::info;

use crate::cli::Cli;
use crate::config::ConsoleConfig;
use crate::editor;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    if cli.commands.is_empty() && stdin.is_terminal() {
        let mut console = open_console(&config)?;
        return editor::run_terminal(&mut console, &mut stdout.lock());
    }
    run_console(&config, &cli.commands, stdin.lock(), &mut stdout.lock())
}

/// Config file values, then command-line overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<ConsoleConfig> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(file) = &cli.file {
        config.storage_path = file.clone();
    }
    Ok(config)
}

/// Load the configured store and wrap it in a console.
fn open_console(config: &ConsoleConfig) -> anyhow::Result<Console<JsonFileBackend>> {
    let path = &config.storage_path;
    let store = ObjectStore::open(JsonFileBackend::new(path), ClassRegistry::standard())
        .with_context(|| format!("loading {}", path.display()))?;
    info!(path = %path.display(), entities = store.len(), "store loaded");
    Ok(Console::new(Dispatcher::new(store)).with_prompt(config.prompt.clone()))
}

/// Run `commands`, or read unedited lines from `input` when there are none.
fn run_console<R: BufRead, W: Write>(
    config: &ConsoleConfig,
    commands: &[String],
    input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut console = open_console(config)?;
    if commands.is_empty() {
        console.run(input, out)?;
    } else {
        console.run_script(commands, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> ConsoleConfig {
        ConsoleConfig {
            storage_path: dir.path().join("file.json"),
            ..ConsoleConfig::default()
        }
    }

    fn lines(cmds: &[&str]) -> Vec<String> {
        cmds.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn file_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("hbnb.toml");
        fs::write(&cfg, "storage_path = \"a.json\"\nprompt = \"$ \"\n").unwrap();

        let cli = Cli::try_parse_from([
            "hbnb",
            "--config",
            cfg.to_str().unwrap(),
            "-f",
            "b.json",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.storage_path, PathBuf::from("b.json"));
        assert_eq!(config.prompt, "$ ");
    }

    #[test]
    fn scripted_commands_persist() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let mut out = Vec::new();
        run_console(&config, &lines(&["create User", "count User"]), io::empty(), &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\n1\n"));
        assert!(config.storage_path.exists());

        let mut out = Vec::new();
        run_console(&config, &lines(&["count User"]), io::empty(), &mut out).unwrap();
        assert_eq!(out, b"1\n");
    }

    #[test]
    fn interactive_uses_configured_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig {
            prompt: "hbnb> ".into(),
            ..config_in(&dir)
        };
        let mut out = Vec::new();
        run_console(&config, &[], "all\n".as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hbnb> []\nhbnb> \n");
    }

    #[test]
    fn corrupt_store_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(&config.storage_path, "{not json").unwrap();

        let err = run_console(&config, &lines(&["all"]), io::empty(), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().starts_with("loading "));
    }

    #[test]
    fn unknown_persisted_class_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        fs::write(
            &config.storage_path,
            r#"{"Ghost.1": {"id": "1", "__class__": "Ghost"}}"#,
        )
        .unwrap();
        assert!(run_console(&config, &[], io::empty(), &mut Vec::new()).is_err());
    }
}
