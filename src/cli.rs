//! Interactive console
//!
//! The REPL runs on a blocking thread and hands parsed commands to the
//! poll loop over a channel, so a slow prompt never delays polling.

use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::str::FromStr;
use tokio::sync::mpsc;

pub const HELP: &str = "\
  preset N                     switch to preset N (1-based)
  xy on|off                    amp 1 Y (on) or X (off)
  name                         request preset name
  number                       request preset number
  bypass                       request bypass states
  looper on|off                subscribe to looper updates
  param EFFECT PARAM [V [Q]]   get/set an effect parameter
  firmware                     send loopback probe and version request
  status                       show link state
  quit                         exit";

/// A console command for the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Preset(u16),
    Xy(bool),
    PresetName,
    PresetNumber,
    Bypass,
    Looper(bool),
    Param {
        effect_id: u16,
        param_id: u16,
        value: u32,
        query: u8,
    },
    Firmware,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("Empty command"))?;
        let args: Vec<&str> = words.collect();

        let command = match name.to_lowercase().as_str() {
            "preset" | "pc" => Command::Preset(number(&args, 0, "preset")?),
            "xy" => Command::Xy(switch(&args)?),
            "name" => Command::PresetName,
            "number" => Command::PresetNumber,
            "bypass" => Command::Bypass,
            "looper" => Command::Looper(switch(&args)?),
            "param" => Command::Param {
                effect_id: number(&args, 0, "effect id")?,
                param_id: number(&args, 1, "param id")?,
                value: optional_number(&args, 2, "value")?.unwrap_or(0),
                query: optional_number(&args, 3, "query")?.unwrap_or(0),
            },
            "firmware" | "version" => Command::Firmware,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command '{}' (try 'help')", other),
        };

        Ok(command)
    }
}

fn number<N: FromStr>(args: &[&str], index: usize, what: &str) -> Result<N> {
    optional_number(args, index, what)?.ok_or_else(|| anyhow!("Missing {}", what))
}

fn optional_number<N: FromStr>(args: &[&str], index: usize, what: &str) -> Result<Option<N>> {
    args.get(index)
        .map(|s| s.parse::<N>().map_err(|_| anyhow!("Invalid {} '{}'", what, s)))
        .transpose()
}

fn switch(args: &[&str]) -> Result<bool> {
    match args.first().map(|s| s.to_lowercase()).as_deref() {
        Some("on") | Some("1") | Some("true") => Ok(true),
        Some("off") | Some("0") | Some("false") => Ok(false),
        _ => bail!("Expected 'on' or 'off'"),
    }
}

/// Read commands until quit or EOF, forwarding them to the poll loop
///
/// Blocking; run it on its own thread.
pub fn run_repl(tx: mpsc::Sender<Command>) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to start console")?;

    loop {
        let line = match rl.readline("axe> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                let _ = tx.blocking_send(Command::Quit);
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match line.parse::<Command>() {
            Ok(Command::Help) => println!("{}", HELP),
            Ok(command) => {
                let quit = command == Command::Quit;
                if tx.blocking_send(command).is_err() || quit {
                    break;
                }
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preset_and_switches() {
        assert_eq!("preset 130".parse::<Command>().unwrap(), Command::Preset(130));
        assert_eq!("XY on".parse::<Command>().unwrap(), Command::Xy(true));
        assert_eq!("looper off".parse::<Command>().unwrap(), Command::Looper(false));
        assert_eq!("  name ".parse::<Command>().unwrap(), Command::PresetName);
    }

    #[test]
    fn test_parse_param_defaults() {
        assert_eq!(
            "param 106 2".parse::<Command>().unwrap(),
            Command::Param { effect_id: 106, param_id: 2, value: 0, query: 0 }
        );
        assert_eq!(
            "param 106 2 500 1".parse::<Command>().unwrap(),
            Command::Param { effect_id: 106, param_id: 2, value: 500, query: 1 }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("preset".parse::<Command>().is_err());
        assert!("preset abc".parse::<Command>().is_err());
        assert!("xy maybe".parse::<Command>().is_err());
        assert!("param 1".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }
}
