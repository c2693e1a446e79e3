//! Line commands standing in for the map page's controls.

use client_core::{selection::Endpoint, PickerSession};
use shared::domain::GeoPoint;
use tracing::debug;

pub const HELP: &str = "\
commands:
  tap <lat> <lon>    tap the map
  search <text>      type into the search field
  pick <n>           choose search result n (1-based)
  from | to          force the next pick target
  locate             use the device position
  comment <text>     set the order comment
  drivers            poll nearby drivers now
  state              show the current selection
  clear              reset everything
  submit             send the order
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tap(GeoPoint),
    Search(String),
    Pick(usize),
    Force(Endpoint),
    Locate,
    Comment(String),
    Drivers,
    State,
    Clear,
    Submit,
    Help,
    Quit,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Tap(_) => "tap",
            Self::Search(_) => "search",
            Self::Pick(_) => "pick",
            Self::Force(_) => "force",
            Self::Locate => "locate",
            Self::Comment(_) => "comment",
            Self::Drivers => "drivers",
            Self::State => "state",
            Self::Clear => "clear",
            Self::Submit => "submit",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word.to_ascii_lowercase().as_str() {
        "tap" => {
            let mut parts = rest.split_whitespace();
            let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err("usage: tap <lat> <lon>".into());
            };
            let lat = lat.parse::<f64>().map_err(|err| format!("latitude: {err}"))?;
            let lon = lon.parse::<f64>().map_err(|err| format!("longitude: {err}"))?;
            GeoPoint::new(lat, lon)
                .map(Command::Tap)
                .map_err(|err| err.to_string())
        }
        // The search field may legitimately be emptied.
        "search" => Ok(Command::Search(rest.to_string())),
        "pick" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Command::Pick(n - 1)),
            _ => Err("usage: pick <n>, n starting at 1".into()),
        },
        "from" => Ok(Command::Force(Endpoint::Origin)),
        "to" => Ok(Command::Force(Endpoint::Destination)),
        "locate" => Ok(Command::Locate),
        "comment" => Ok(Command::Comment(rest.to_string())),
        "drivers" => Ok(Command::Drivers),
        "state" => Ok(Command::State),
        "clear" => Ok(Command::Clear),
        "submit" => Ok(Command::Submit),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("empty command".into()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

/// Runs one command; returns false once the session should end.
/// Failures are already reported through session events.
pub async fn dispatch(session: &PickerSession, cmd: Command) -> bool {
    debug!(command = cmd.name(), "dispatching command");
    match cmd {
        Command::Tap(point) => {
            let _ = session.on_map_tap(point).await;
        }
        Command::Search(text) => session.on_search_input(&text).await,
        Command::Pick(index) => {
            if session.on_search_pick(index).await.is_none() {
                println!("no search result #{}", index + 1);
            }
        }
        Command::Force(endpoint) => session.force_pick(endpoint).await,
        Command::Locate => {
            let _ = session.on_locate_me().await;
        }
        Command::Comment(text) => session.set_comment(&text).await,
        Command::Drivers => match session.refresh_drivers().await {
            Ok(None) => println!("choose “From” first"),
            Ok(Some(_)) => {}
            Err(err) => println!("driver poll failed: {err}"),
        },
        Command::State => {
            let state = session.selection().await;
            let label = |point: &Option<shared::domain::LocatedAddress>| {
                point
                    .as_ref()
                    .map(|located| format!("{} ({})", located.address, located.point))
                    .unwrap_or_else(|| "-".to_string())
            };
            println!("mode: {:?}", state.pick_mode);
            println!("from: {}", label(&state.origin));
            println!("to:   {}", label(&state.destination));
            println!("drivers nearby: {}", session.driver_count().await);
        }
        Command::Clear => session.reset().await,
        Command::Submit => {
            let _ = session.submit().await;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
    }
    true
}
