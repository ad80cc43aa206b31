//! # supergram
//!
//! Terminal front end for the superGram session core. Reads one command per
//! line from stdin and prints the current screen after each of them.

mod render;
mod shell;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use supergram_client::{ClientConfig, RedeemOutcome, Session, StorageMode};
use supergram_media::{MediaDevices, Permission, SimulatedDevices};

use crate::shell::Command;

#[derive(Parser, Debug)]
#[command(name = "supergram", version, about = "superGram messenger session in the terminal")]
struct Args {
    /// Where histories and settings are kept: sqlite, memory or none.
    #[arg(long, value_parser = parse_storage)]
    storage: Option<StorageMode>,

    /// Directory holding supergram.db.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Make the simulated microphone refuse access.
    #[arg(long)]
    deny_microphone: bool,

    /// Make the simulated camera refuse access.
    #[arg(long)]
    deny_camera: bool,

    /// Record voice notes from the default input device.
    #[cfg(feature = "native-audio")]
    #[arg(long)]
    native_audio: bool,
}

fn parse_storage(s: &str) -> Result<StorageMode, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    supergram_client::init_tracing();
    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(storage) = args.storage {
        config.storage = storage;
    }
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    info!(storage = ?config.storage, "Starting superGram v{}", env!("CARGO_PKG_VERSION"));

    #[cfg(feature = "native-audio")]
    if args.native_audio {
        let session = Session::from_config(&config, supergram_media::CpalDevices::new())?;
        return run(session).await;
    }

    let permission = |denied: bool| {
        if denied {
            Permission::Denied
        } else {
            Permission::Granted
        }
    };
    let devices = SimulatedDevices::granting().with_permissions(
        permission(args.deny_microphone),
        permission(args.deny_camera),
    );
    let session = Session::from_config(&config, devices)?;
    run(session).await
}

async fn run<D: MediaDevices>(mut session: Session<D>) -> Result<()> {
    println!("{}", render::render(session.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match shell::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if command == Command::Help {
            println!("{}", shell::HELP);
            continue;
        }

        apply(&mut session, command).await;

        for notice in session.take_notices() {
            eprintln!("! {notice}");
        }
        println!("{}", render::render(session.state()));
    }

    session.end_call();
    session.stop_recording().await;
    Ok(())
}

async fn apply<D: MediaDevices>(session: &mut Session<D>, command: Command) {
    match command {
        Command::Phone(phone) => session.set_phone(&phone),
        Command::Name(name) => session.set_display_name(&name),
        Command::Handle(handle) => session.set_handle(&handle),
        Command::Next => {
            session.advance();
        }
        Command::Back => {
            session.back();
        }
        Command::View(view) => {
            session.navigate(view);
        }
        Command::Search(query) => session.set_search_query(&query),
        Command::Open(chat) => {
            if !session.select_conversation(&chat) {
                eprintln!("no chat {chat}");
            }
        }
        Command::Close => session.deselect_conversation(),
        Command::Say(text) => {
            session.send_text(&text);
        }
        Command::Type(text) => session.set_compose(&text),
        Command::Send => {
            session.send_compose();
        }
        // Failures are already queued as notices.
        Command::Record => {
            let _ = session.start_recording().await;
        }
        Command::Stop => {
            session.stop_recording().await;
        }
        Command::Call => {
            let _ = session.start_call().await;
        }
        Command::Hangup => {
            session.end_call();
        }
        Command::Mute => {
            session.toggle_mute();
        }
        Command::Camera => {
            session.toggle_video();
        }
        Command::Redeem(None) => {
            session.open_redeem_dialog();
        }
        Command::Redeem(Some(code)) => report(session.redeem(&code)),
        Command::Code(code) => session.set_redeem_input(&code),
        Command::Submit => {
            if let Some(outcome) = session.submit_redeem() {
                report(outcome);
            }
        }
        Command::CancelRedeem => session.close_redeem_dialog(),
        Command::Edit => {
            session.begin_profile_edit();
        }
        Command::EditName(name) => session.set_draft_display_name(&name),
        Command::EditHandle(handle) => session.set_draft_handle(&handle),
        Command::Save => {
            if !session.save_profile_edit() {
                eprintln!("name and handle must not be empty");
            }
        }
        Command::Discard => session.cancel_profile_edit(),
        Command::DarkMode(on) => session.set_dark_mode(on),
        Command::Push(on) => session.set_push_notifications(on),
        Command::Help | Command::Quit => {}
    }
}

fn report(outcome: RedeemOutcome) {
    match outcome {
        RedeemOutcome::Granted => println!("Developer badge unlocked"),
        RedeemOutcome::Rejected(e) => eprintln!("code not accepted: {e}"),
        RedeemOutcome::AlreadyVerified => println!("already verified"),
        RedeemOutcome::NotRegistered => eprintln!("finish registration first"),
    }
}
