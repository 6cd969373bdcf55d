//! # MC3000
//!
//! Monitor and configure the SkyRC MC3000 battery charger.
//!
//! Live telemetry is polled over BLE; per-slot configuration profiles are
//! read and written over USB and can be kept in a local profile store.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use mc3000::ble::ChargerBle;
use mc3000::config::Config;
use mc3000::protocol::frame::SLOT_COUNT;
use mc3000::protocol::SlotSettings;
use mc3000::store::ProfileStore;
use mc3000::usb::ChargerUsb;

/// Configuration file looked up in the working directory
const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH)?;
    let _log_guard = init_logging(&config.log.dir);

    info!("mc3000 v{} starting", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "monitor" => cmd_monitor(&config, &args[2..]).await,
        "save" => cmd_save(&args[2..]).await,
        "load" => cmd_load(&args[2..]).await,
        "profiles" => cmd_profiles(&config, &args[2..]).await,
        other => {
            print_help();
            bail!("unknown command: {}", other);
        }
    }
}

fn print_help() {
    println!("mc3000 - SkyRC MC3000 charger tool");
    println!();
    println!("Usage:");
    println!("  mc3000 monitor [device-name]       live telemetry for all four slots");
    println!("  mc3000 save [--slot N] [path]      read slot settings over USB into a JSON file");
    println!("  mc3000 load <path> [--slot N]      validate a JSON profile and write it to a slot");
    println!("  mc3000 profiles list               stored profiles");
    println!("  mc3000 profiles capture            save the current settings of all four slots");
    println!("  mc3000 profiles import <path>...   import profile JSON files");
    println!("  mc3000 profiles export <id> <path> export a stored profile to JSON");
    println!("  mc3000 profiles set <id> [slot]    write a profile to one slot, or all four");
    println!("  mc3000 profiles delete <id>        remove a stored profile");
    println!();
    println!("Slots are indexed 0-3.");
}

/// Console logging, plus a rolling file log when a directory is configured
fn init_logging(log_dir: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if log_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        None
    } else {
        let appender = tracing_appender::rolling::daily(log_dir, "mc3000.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .init();
        Some(guard)
    }
}

/// Extract a `--slot N` argument, if present
fn parse_slot(args: &[String]) -> Result<Option<u8>> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--slot" {
            let value = args
                .get(i + 1)
                .context("missing value for --slot")?;
            let slot: u8 = value
                .parse()
                .with_context(|| format!("invalid slot '{}'", value))?;
            if slot >= SLOT_COUNT {
                bail!("slot must be 0-3, got {}", slot);
            }
            return Ok(Some(slot));
        }
        i += 1;
    }
    Ok(None)
}

/// Positional arguments with any `--slot N` pair removed
fn positional(args: &[String]) -> Vec<&String> {
    let mut result = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg == "--slot" {
            skip = true;
            continue;
        }
        result.push(arg);
    }
    result
}

async fn cmd_monitor(config: &Config, args: &[String]) -> Result<()> {
    let device_name = args
        .first()
        .map(String::as_str)
        .unwrap_or(config.ble.device_name.as_str());

    let mut session = ChargerBle::connect(
        device_name,
        Duration::from_secs(config.ble.poll_interval_s),
        Duration::from_millis(config.ble.settle_ms),
    )
    .await?;

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    println!("Polling {} (ctrl-c to stop)", device_name);

    // Buffer one snapshot per slot and print the whole charger at once when
    // the last slot of a cycle arrives
    let mut buffer = HashMap::new();
    session
        .run(|info| {
            let last_slot = info.slot == SLOT_COUNT - 1;
            buffer.insert(info.slot, info);
            if last_slot && buffer.len() == SLOT_COUNT as usize {
                let mut slots: Vec<_> = buffer.values().collect();
                slots.sort_by_key(|info| info.slot);
                for info in slots {
                    println!("{}", info);
                }
                println!();
            }
        })
        .await?;

    session.disconnect().await?;
    Ok(())
}

async fn cmd_save(args: &[String]) -> Result<()> {
    let slot = parse_slot(args)?.unwrap_or(0);
    let default_path = format!("slot-{}.json", slot);
    let path = positional(args)
        .first()
        .map(|s| s.to_string())
        .unwrap_or(default_path);

    let mut usb = ChargerUsb::open()?;
    let settings = usb.read_slot_settings(slot).await?;
    fs::write(&path, settings.to_json()?)?;

    println!("successfully saved: {}", path);
    Ok(())
}

async fn cmd_load(args: &[String]) -> Result<()> {
    let slot = parse_slot(args)?;
    let positional = positional(args);
    let path = positional.first().context("usage: mc3000 load <path> [--slot N]")?;

    let payload = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path))?;
    let mut settings = SlotSettings::from_json(&payload)?;
    if let Some(slot) = slot {
        settings.slot_number = slot;
    }

    let mut usb = ChargerUsb::open()?;
    usb.write_slot_settings(&settings).await?;

    println!(
        "successfully loaded '{}' into slot {}",
        settings.description(true),
        settings.slot_number
    );
    Ok(())
}

async fn cmd_profiles(config: &Config, args: &[String]) -> Result<()> {
    let mut store = ProfileStore::open(&config.storage.profiles_path)?;

    match args.first().map(String::as_str) {
        Some("list") => {
            for profile in store.profiles() {
                println!(
                    "{}  {}",
                    profile.id.as_deref().unwrap_or("-"),
                    profile.description(true)
                );
            }
            Ok(())
        }

        Some("capture") => {
            let mut usb = ChargerUsb::open()?;
            for slot in 0..SLOT_COUNT {
                let mut settings = usb.read_slot_settings(slot).await?;
                settings.assign_new_id();
                store.save(&mut settings)?;
                println!("captured slot {}: {}", slot, settings.description(false));
            }
            Ok(())
        }

        Some("import") => {
            let paths = &args[1..];
            if paths.is_empty() {
                bail!("usage: mc3000 profiles import <path>...");
            }
            for path in paths {
                let payload = fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path))?;
                let mut settings = SlotSettings::from_json(&payload)?;
                settings.assign_new_id();
                store.save(&mut settings)?;
                println!("imported '{}' from {}", settings.description(true), path);
            }
            Ok(())
        }

        Some("export") => {
            let id = args.get(1).context("usage: mc3000 profiles export <id> <path>")?;
            let path = args.get(2).context("usage: mc3000 profiles export <id> <path>")?;
            let profile = store.get(id)?;
            fs::write(path, profile.to_json()?)?;
            println!("exported '{}' to {}", profile.description(true), path);
            Ok(())
        }

        Some("set") => {
            let id = args.get(1).context("usage: mc3000 profiles set <id> [slot]")?;
            let mut profile = store.get(id)?;

            let slots: Vec<u8> = match args.get(2) {
                Some(value) => {
                    let slot: u8 = value
                        .parse()
                        .with_context(|| format!("invalid slot '{}'", value))?;
                    if slot >= SLOT_COUNT {
                        bail!("slot must be 0-3, got {}", slot);
                    }
                    vec![slot]
                }
                None => (0..SLOT_COUNT).collect(),
            };

            let mut usb = ChargerUsb::open()?;
            for slot in &slots {
                profile.slot_number = *slot;
                usb.write_slot_settings(&profile).await?;
            }

            if slots.len() == 1 {
                println!("profile '{}' set to slot {}", profile.description(true), slots[0]);
            } else {
                println!("profile '{}' set to all slots", profile.description(true));
            }
            Ok(())
        }

        Some("delete") => {
            let id = args.get(1).context("usage: mc3000 profiles delete <id>")?;
            let profile = store.get(id)?;
            store.delete(id, true)?;
            println!("deleted '{}'", profile.description(true));
            Ok(())
        }

        _ => {
            print_help();
            bail!("usage: mc3000 profiles <list|capture|import|export|set|delete>");
        }
    }
}
