use log;
use pretty_env_logger;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use raja_mantri_game::broadcast::channel_broadcast::ChannelBroadcast;
use raja_mantri_game::broadcast::OutboundEvent;
use raja_mantri_game::game::player::PlayerId;
use raja_mantri_game::session::SessionHandle;

const HELP: &str = "\
commands:
  join <name>         take a seat
  start               deal a round (needs ten seats)
  catch <you> <them>  attempt a catch
  role <name>         peek at a player's role
  state               print the public snapshot
  end                 force-end the round
  quit <name>         drop a player
  help                show this message";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting Raja Mantri game session");

    let turn_secs = env::var("TURN_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(30);

    let sink = ChannelBroadcast::new(256);
    let mut events = sink.subscribe();
    let session = SessionHandle::new(sink, Duration::from_secs(turn_secs));

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                OutboundEvent::TimerTick {
                    player,
                    remaining_secs,
                } => log::debug!("{}s left for {}", remaining_secs, player),
                other => log::info!("{:?}", other),
            }
        }
    });

    println!("{}", HELP);

    let mut seats: HashMap<String, PlayerId> = HashMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let text = match (parts.next(), parts.next(), parts.next()) {
            (Some("join"), Some(name), None) => match session.join(name).await {
                Ok(player_id) => {
                    seats.insert(name.to_string(), player_id);
                    format!("{} joined as player {}", name, player_id)
                }
                Err(message) => format!("cannot join: {}", message),
            },
            (Some("start"), None, None) => match session.start_round().await {
                Ok(snapshot) => format!(
                    "round {} started, {} is up",
                    snapshot.round,
                    snapshot.active_player.unwrap_or_default()
                ),
                Err(message) => format!("cannot start: {}", message),
            },
            (Some("catch"), Some(catcher), Some(target)) => {
                match session.attempt_catch(catcher, target).await {
                    Ok((outcome, snapshot)) => format!(
                        "{:?}; next up: {}",
                        outcome,
                        snapshot.active_player.unwrap_or_else(|| "nobody".to_string())
                    ),
                    Err(message) => format!("rejected: {}", message),
                }
            }
            (Some("role"), Some(name), None) => match session.role_of(name).await {
                Some(role) => format!("{} holds {}", name, role),
                None => format!("{} has no role this round", name),
            },
            (Some("state"), None, None) => format!("{:#?}", session.snapshot().await),
            (Some("end"), None, None) => match session.force_end().await {
                Ok(summary) => {
                    let rows = summary
                        .summary
                        .iter()
                        .map(|entry| {
                            let role = entry
                                .role
                                .map(|r| r.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            format!("{}: {} ({} points)", entry.name, role, entry.score)
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("round {} over\n{}", summary.round, rows)
                }
                Err(message) => format!("cannot end: {}", message),
            },
            (Some("quit"), Some(name), None) => match seats.remove(name) {
                Some(player_id) => {
                    session.handle_disconnect(player_id).await;
                    format!("{} left", name)
                }
                None => format!("no such player: {}", name),
            },
            (Some("help"), None, None) => HELP.to_string(),
            _ => format!("unrecognised command; try `help`"),
        };
        println!("{}", text);
    }

    Ok(())
}
