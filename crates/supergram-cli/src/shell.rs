//! Line commands understood by the terminal front end.

use anyhow::{anyhow, bail, Result};

use supergram_client::View;
use supergram_shared::ChatId;

pub const HELP: &str = "\
registration:  phone <number> | name <text> | handle <text> | next | back
navigation:    view chats|search|contacts|profile|settings | search <query>
chats:         open <id> | close | say <text> | type <text> | send
voice notes:   record | stop
calls:         call | hangup | mute | camera
badge:         redeem [code] | code <text> | submit | cancel
profile:       edit | edit-name <text> | edit-handle <text> | save | discard
settings:      dark on|off | push on|off
               help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Phone(String),
    Name(String),
    Handle(String),
    Next,
    Back,
    View(View),
    Search(String),
    Open(ChatId),
    Close,
    Say(String),
    Type(String),
    Send,
    Record,
    Stop,
    Call,
    Hangup,
    Mute,
    Camera,
    Redeem(Option<String>),
    Code(String),
    Submit,
    CancelRedeem,
    Edit,
    EditName(String),
    EditHandle(String),
    Save,
    Discard,
    DarkMode(bool),
    Push(bool),
    Help,
    Quit,
}

/// Parse one input line. Arguments keep their inner spacing.
pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim_start();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (line.trim_end(), ""),
    };

    let command = match word {
        "phone" => Command::Phone(rest.trim().to_string()),
        "name" => Command::Name(rest.to_string()),
        "handle" => Command::Handle(rest.trim().to_string()),
        "next" => Command::Next,
        "back" => Command::Back,
        "view" => Command::View(parse_view(rest.trim())?),
        "search" => Command::Search(rest.trim().to_string()),
        "open" => {
            let id = rest.trim();
            if id.is_empty() {
                bail!("usage: open <id>");
            }
            Command::Open(ChatId::new(id))
        }
        "close" => Command::Close,
        "say" => Command::Say(rest.to_string()),
        "type" => Command::Type(rest.to_string()),
        "send" => Command::Send,
        "record" => Command::Record,
        "stop" => Command::Stop,
        "call" => Command::Call,
        "hangup" => Command::Hangup,
        "mute" => Command::Mute,
        "camera" => Command::Camera,
        "redeem" => match rest.trim() {
            "" => Command::Redeem(None),
            code => Command::Redeem(Some(code.to_string())),
        },
        "code" => Command::Code(rest.trim().to_string()),
        "submit" => Command::Submit,
        "cancel" => Command::CancelRedeem,
        "edit" => Command::Edit,
        "edit-name" => Command::EditName(rest.to_string()),
        "edit-handle" => Command::EditHandle(rest.trim().to_string()),
        "save" => Command::Save,
        "discard" => Command::Discard,
        "dark" => Command::DarkMode(parse_switch(rest.trim())?),
        "push" => Command::Push(parse_switch(rest.trim())?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => bail!("empty command"),
        other => bail!("unknown command: {other} (try `help`)"),
    };
    Ok(command)
}

fn parse_view(s: &str) -> Result<View> {
    View::ALL
        .into_iter()
        .find(|v| format!("{v:?}").eq_ignore_ascii_case(s) || v.label() == s)
        .ok_or_else(|| anyhow!("unknown view: {s}"))
}

fn parse_switch(s: &str) -> Result<bool> {
    match s {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => bail!("expected on or off, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_keeps_inner_spacing() {
        assert_eq!(
            parse("say  привет  мир").unwrap(),
            Command::Say(" привет  мир".into())
        );
        assert_eq!(parse("say").unwrap(), Command::Say(String::new()));
    }

    #[test]
    fn test_views() {
        assert_eq!(parse("view settings").unwrap(), Command::View(View::Settings));
        assert_eq!(parse("view Профиль").unwrap(), Command::View(View::Profile));
        assert!(parse("view inbox").is_err());
    }

    #[test]
    fn test_redeem_forms() {
        assert_eq!(parse("redeem").unwrap(), Command::Redeem(None));
        assert_eq!(
            parse("redeem super123q").unwrap(),
            Command::Redeem(Some("super123q".into()))
        );
    }

    #[test]
    fn test_switches() {
        assert_eq!(parse("dark off").unwrap(), Command::DarkMode(false));
        assert_eq!(parse("push on").unwrap(), Command::Push(true));
        assert!(parse("dark maybe").is_err());
    }

    #[test]
    fn test_unknown() {
        assert!(parse("dance").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("open").is_err());
    }
}
