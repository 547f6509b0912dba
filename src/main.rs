use hue_lamp::config::Config;
use hue_lamp::{Bridge, Command, Fixture, Rgb, credentials};

use std::path::Path;

const USAGE: &str = "\
usage: hue_lamp [--config FILE] [--time DECISECONDS] <command>

commands:
  color R G B   fade to an RGB color (0-255 per channel)
  ct T          fade to a white point, T in [0, 1] (1 = coolest)
  bri B         set brightness, B in [0, 1] (0 = off)
  off           switch off
  status        print the tracked state of each light
  list          print the ids the bridge knows";

/// What to do to every configured light.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Color(Rgb),
    Temperature(f64),
    Brightness(f64),
    Off,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Intent {
    /// Print the bridge's light ids without opening any light.
    List,
    Apply(Action),
}

#[derive(Debug, PartialEq)]
struct Cli {
    config: Option<String>,
    transition_time: Option<u16>,
    intent: Intent,
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut config = None;
    let mut transition_time = None;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(iter.next().ok_or("--config needs a path")?.clone());
            }
            "--time" => {
                let value = iter.next().ok_or("--time needs a value")?;
                transition_time =
                    Some(value.parse::<u16>().map_err(|_| format!("invalid transition time: {value}"))?);
            }
            _ => rest.push(arg.as_str()),
        }
    }

    let unit = |s: &str| -> Result<f64, String> {
        s.parse::<f64>().map_err(|_| format!("not a number: {s}"))
    };

    let intent = match rest.as_slice() {
        ["color", r, g, b] => {
            let channel = |s: &str| s.parse::<u8>().map_err(|_| format!("invalid channel: {s}"));
            Intent::Apply(Action::Color(Rgb::from_u8(channel(*r)?, channel(*g)?, channel(*b)?)))
        }
        ["ct", t] => Intent::Apply(Action::Temperature(unit(*t)?)),
        ["bri", b] => Intent::Apply(Action::Brightness(unit(*b)?)),
        ["off"] => Intent::Apply(Action::Off),
        ["status"] => Intent::Apply(Action::Status),
        ["list"] => Intent::List,
        [] => return Err("missing command".into()),
        other => return Err(format!("unrecognized command: {}", other.join(" "))),
    };

    Ok(Cli {
        config,
        transition_time,
        intent,
    })
}

/// Open one light and apply the action. Runs on a blocking thread.
fn drive(
    bridge: Bridge,
    id: String,
    cfg: &Config,
    action: Action,
    transition_time: Option<u16>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let profile = cfg.profile_for(&id)?;
    let mut fixture = Fixture::open(bridge, id, profile)?;

    let sent: Option<Command> = match action {
        Action::Color(rgb) => fixture.send_color(rgb, transition_time)?,
        Action::Temperature(t) => fixture.send_color_temperature(t, transition_time)?,
        Action::Brightness(b) => fixture.send_brightness(b, transition_time)?,
        Action::Off => fixture.turn_off()?,
        Action::Status => {
            let s = fixture.state();
            println!(
                "{:>3}  {:<24} on={:<5} bri={:<3} xy={} ct={} mode={}",
                fixture.id(),
                fixture.name(),
                s.on,
                s.brightness,
                s.chromaticity,
                s.color_temperature,
                s.color_mode
            );
            return Ok(());
        }
    };

    match sent {
        Some(cmd) => log::info!("{} \"{}\": sent {cmd}", fixture.id(), fixture.name()),
        None => log::info!("{} \"{}\": already there", fixture.id(), fixture.name()),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let cfg = match &cli.config {
        Some(path) => match Config::load_from(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Config::load(),
    };

    if cfg.bridge.address.is_empty() {
        log::error!("No bridge address configured. Set [bridge] address in the config file.");
        std::process::exit(1);
    }

    let address = cfg.bridge.address.clone();
    let username_file = cfg.bridge.username_file.clone();
    let device_type = cfg.bridge.device_type.clone();
    let username = tokio::task::spawn_blocking(move || {
        credentials::load_or_register(Path::new(&username_file), || {
            Bridge::create_username(&address, &device_type)
        })
    })
    .await;
    let username = match username {
        Ok(Ok(u)) => u,
        Ok(Err(e)) => {
            log::error!("Could not get bridge credentials: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("Credential task failed: {e}");
            std::process::exit(1);
        }
    };

    let bridge = Bridge::new(cfg.bridge.address.clone(), username);
    log::info!("Using bridge at {}", bridge.address());

    let ids = if cfg.lights.is_empty() || cli.intent == Intent::List {
        let b = bridge.clone();
        match tokio::task::spawn_blocking(move || b.light_ids()).await {
            Ok(Ok(ids)) => ids,
            Ok(Err(e)) => {
                log::error!("Failed to list lights: {e}");
                std::process::exit(1);
            }
            Err(e) => {
                log::error!("Light listing task failed: {e}");
                std::process::exit(1);
            }
        }
    } else {
        cfg.lights.clone()
    };

    let action = match cli.intent {
        Intent::Apply(action) => action,
        Intent::List => {
            for id in ids {
                println!("{id}");
            }
            return;
        }
    };

    // One blocking task per light; each owns its fixture handle.
    let cfg = std::sync::Arc::new(cfg);
    let mut tasks = Vec::with_capacity(ids.len());
    for id in ids {
        let bridge = bridge.clone();
        let cfg = std::sync::Arc::clone(&cfg);
        let transition_time = cli.transition_time;
        let label = id.clone();
        tasks.push((
            label,
            tokio::task::spawn_blocking(move || drive(bridge, id, &cfg, action, transition_time)),
        ));
    }

    let mut failed = 0u32;
    for (id, task) in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::error!("Light {id}: {e}");
                failed += 1;
            }
            Err(e) => {
                log::error!("Light {id}: task failed: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
