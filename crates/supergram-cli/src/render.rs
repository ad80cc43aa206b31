//! Plain-text rendering of a session.

use std::fmt::Write as _;

use chrono::Local;

use supergram_client::state::{CallDialog, PaneFeed, Registration, RecordingState};
use supergram_client::{SessionState, View};
use supergram_shared::constants::APP_NAME;
use supergram_shared::{Chat, Message};

pub fn render(state: &SessionState) -> String {
    let mut out = String::new();
    match state.registration() {
        Registration::PhoneEntry { phone } => {
            let _ = writeln!(out, "{APP_NAME}: step 1 of 2");
            let _ = writeln!(out, "Phone: {phone}");
            let _ = writeln!(out, "{}", hint(state, "phone <number>, then next"));
        }
        Registration::ProfileEntry {
            display_name,
            handle,
            ..
        } => {
            let _ = writeln!(out, "{APP_NAME}: step 2 of 2");
            let _ = writeln!(out, "Name:   {display_name}");
            let _ = writeln!(out, "Handle: @{handle}");
            let _ = writeln!(out, "{}", hint(state, "name <text>, handle <text>, then next"));
        }
        Registration::Registered(_) => render_shell(state, &mut out),
    }
    out
}

fn hint(state: &SessionState, usage: &str) -> String {
    if supergram_client::controllers::registration::can_advance(state) {
        format!("[{usage}] ready")
    } else {
        format!("[{usage}]")
    }
}

fn render_shell(state: &SessionState, out: &mut String) {
    let title = match state.badge() {
        Some(badge) => format!("{APP_NAME} [{badge}]"),
        None => APP_NAME.to_string(),
    };
    let tabs: Vec<String> = View::ALL
        .iter()
        .map(|v| {
            if *v == state.view {
                format!("[{}]", v.label())
            } else {
                v.label().to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{title}  |  {}", tabs.join(" "));

    if let Some(dialog) = state.call_dialog() {
        render_call(dialog, out);
    }
    if let RecordingState::Recording { chat, .. } = state.recording() {
        let _ = writeln!(out, "* recording voice note for chat {chat} (stop to send)");
    }

    match state.view {
        View::Chats => match state.active_chat() {
            Some(chat) => render_conversation(state, chat, out),
            None => render_chat_list(&state.visible_chats(), out),
        },
        View::Search => {
            let _ = writeln!(out, "Search: {}", state.search_query);
            render_chat_list(&state.visible_chats(), out);
        }
        View::Contacts => {
            for chat in state.chats() {
                let status = if chat.online { "online" } else { "offline" };
                let _ = writeln!(out, "  {} @{} ({status})", chat.display_name, chat.handle);
            }
        }
        View::Profile => render_profile(state, out),
        View::Settings => {
            let _ = writeln!(out, "Dark mode:          {}", on_off(state.settings.dark_mode));
            let _ = writeln!(
                out,
                "Push notifications: {}",
                on_off(state.settings.push_notifications)
            );
        }
    }
}

fn render_chat_list(chats: &[&Chat], out: &mut String) {
    if chats.is_empty() {
        let _ = writeln!(out, "  (no chats)");
    }
    for chat in chats {
        let verified = if chat.verified { " ✓" } else { "" };
        let unread = match chat.unread_count {
            0 => String::new(),
            n => format!(" ({n})"),
        };
        let _ = writeln!(
            out,
            "  {} {}{verified}  {}  {}{unread}",
            chat.id, chat.display_name, chat.last_activity_label, chat.last_message_preview
        );
    }
}

fn render_conversation(state: &SessionState, chat: &Chat, out: &mut String) {
    let presence = if chat.online { "online" } else { "был(а) недавно" };
    let _ = writeln!(out, "{} @{} ({presence})", chat.display_name, chat.handle);
    for message in state.active_messages() {
        let _ = writeln!(out, "{}", format_message(message, chat));
    }
    if !state.compose.is_empty() {
        let _ = writeln!(out, "> {}", state.compose);
    }
}

fn format_message(message: &Message, chat: &Chat) -> String {
    let who = if message.sender.is_self() {
        "Вы"
    } else {
        chat.display_name.as_str()
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    format!("  [{time}] {who}: {}", message.preview())
}

fn render_call(dialog: &CallDialog, out: &mut String) {
    let _ = writeln!(out, "Call with chat {}", dialog.chat);
    for pane in [&dialog.self_pane, &dialog.peer_pane] {
        let feed = match pane.feed {
            PaneFeed::Local(id) => format!("{id}"),
            PaneFeed::LocalMirror(id) => format!("{id} (mirrored)"),
        };
        let _ = writeln!(out, "  | {}: {feed}", pane.label);
    }
    let _ = writeln!(
        out,
        "  mic {}  camera {}",
        if dialog.muted { "off" } else { "on" },
        on_off(dialog.video_enabled)
    );
}

fn render_profile(state: &SessionState, out: &mut String) {
    if let Some(profile) = state.profile() {
        let _ = writeln!(out, "Name:   {}", profile.display_name);
        let _ = writeln!(out, "Handle: @{}", profile.handle);
        let _ = writeln!(out, "Phone:  {}", profile.phone);
    }
    if let Some(badge) = state.badge() {
        let _ = writeln!(out, "Badge:  {badge}");
    }
    if let Some(draft) = state.profile_draft() {
        let _ = writeln!(out, "Editing: {} @{}", draft.display_name, draft.handle);
    }
    if let Some(dialog) = state.redeem_dialog() {
        let _ = writeln!(out, "Redeem code: {}", dialog.code);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supergram_client::controllers::{navigation, registration};

    #[test]
    fn test_registration_screens() {
        let mut state = SessionState::seeded();
        assert!(render(&state).contains("step 1 of 2"));

        registration::set_phone(&mut state, "+79991234567");
        assert!(render(&state).contains("ready"));
        registration::advance(&mut state);
        assert!(render(&state).contains("step 2 of 2"));
    }

    #[test]
    fn test_chat_list_and_settings() {
        let mut state = SessionState::seeded();
        registration::set_phone(&mut state, "+79991234567");
        registration::advance(&mut state);
        registration::set_display_name(&mut state, "Иван");
        registration::set_handle(&mut state, "ivan");
        registration::advance(&mut state);

        let chats = render(&state);
        assert!(chats.contains("Алексей Смирнов"));
        assert!(chats.contains("Дмитрий"));

        navigation::navigate(&mut state, View::Settings);
        assert!(render(&state).contains("Dark mode:          on"));
    }
}
