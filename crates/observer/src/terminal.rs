use std::sync::Mutex;
use std::time::Duration;

use darkest_hour_core::Coordinate;

use crate::{readout, render_readout, MapView, Phase, SearchState, ViewportState};

/// Map stand-in for the terminal driver
///
/// Moves are instantaneous and never report `moveEnd`, so programmatic
/// moves settle through the controller's timeout fallback.
pub struct TerminalMap {
    center: Mutex<Coordinate>,
}

impl TerminalMap {
    pub fn new(center: Coordinate) -> Self {
        Self {
            center: Mutex::new(center),
        }
    }

    /// A user-driven pan
    pub fn pan(&self, center: Coordinate) {
        if let Ok(mut current) = self.center.lock() {
            *current = center;
        }
    }
}

impl MapView for TerminalMap {
    fn move_to(&self, center: Coordinate, _duration: Duration) {
        self.pan(center);
    }

    fn center(&self) -> Coordinate {
        match self.center.lock() {
            Ok(center) => *center,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    Pan(Coordinate),
    Search(String),
    /// Zero-based index into the current results
    Pick(usize),
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "commands:
  pan <lat> <lng>   move the map there
  search <text>     look up a place
  pick <n>          fly to result n
  clear             clear the search box
  quit";

pub fn parse_command(line: &str) -> Result<TerminalCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match verb.to_lowercase().as_str() {
        "pan" => {
            let mut parts = rest.split_whitespace().map(str::parse::<f64>);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(Ok(lat)), Some(Ok(lng)), None) => Coordinate::checked(lng, lat)
                    .map(TerminalCommand::Pan)
                    .ok_or_else(|| format!("out of range: {} {}", lat, lng)),
                _ => Err("usage: pan <lat> <lng>".to_string()),
            }
        }
        "search" => Ok(TerminalCommand::Search(rest.to_string())),
        "pick" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(TerminalCommand::Pick(n - 1)),
            _ => Err("usage: pick <n>, counting from 1".to_string()),
        },
        "clear" => Ok(TerminalCommand::Clear),
        "help" | "?" => Ok(TerminalCommand::Help),
        "quit" | "exit" => Ok(TerminalCommand::Quit),
        "" => Err(String::new()),
        other => Err(format!("unknown command `{}`, try `help`", other)),
    }
}

/// Status block printed whenever the viewport changes
pub fn render_viewport(state: &ViewportState) -> String {
    let location = match (state.phase, state.settled_center, state.pending_target) {
        (Phase::Flying, _, Some(target)) => format!("flying to {}", target),
        (_, Some(center), _) => format!("at {}", center),
        (Phase::AutoLocating, _, _) => "locating...".to_string(),
        _ => "--".to_string(),
    };
    let lines = readout(state.conditions.as_ref(), state.conditions_loading);
    format!("[{}]\n{}", location, render_readout(&lines))
}

pub fn render_search(state: &SearchState) -> String {
    if state.loading {
        return "Searching...".to_string();
    }
    if state.results.is_empty() {
        return if state.query.trim().is_empty() {
            String::new()
        } else {
            "No results found.".to_string()
        };
    }
    state
        .results
        .iter()
        .enumerate()
        .map(|(i, place)| format!("{:>2}. {}", i + 1, place.label))
        .collect::<Vec<_>>()
        .join("\n")
}
