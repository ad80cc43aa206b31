//! Two-step registration wizard: phone number, then profile.
//!
//! Purely local; nothing is verified against a server. Invalid input never
//! errors, the wizard simply refuses to move on (the UI keeps its button
//! disabled using [`can_advance`]).

use tracing::{debug, info};

use supergram_shared::validation::{filter_handle, phone_is_complete, profile_is_complete};

use crate::state::{Profile, Registration, SessionState};

pub fn set_phone(state: &mut SessionState, input: &str) {
    if let Registration::PhoneEntry { phone } = state.registration_mut() {
        *phone = input.to_string();
    }
}

pub fn set_display_name(state: &mut SessionState, input: &str) {
    if let Registration::ProfileEntry { display_name, .. } = state.registration_mut() {
        *display_name = input.to_string();
    }
}

/// Characters outside `[A-Za-z0-9_]` are dropped as they are entered.
pub fn set_handle(state: &mut SessionState, input: &str) {
    if let Registration::ProfileEntry { handle, .. } = state.registration_mut() {
        *handle = filter_handle(input);
    }
}

pub fn can_advance(state: &SessionState) -> bool {
    match state.registration() {
        Registration::PhoneEntry { phone } => phone_is_complete(phone),
        Registration::ProfileEntry {
            display_name,
            handle,
            ..
        } => profile_is_complete(display_name, handle),
        Registration::Registered(_) => false,
    }
}

/// Move to the next step if the current one is complete. Returns whether
/// the wizard moved.
pub fn advance(state: &mut SessionState) -> bool {
    if !can_advance(state) {
        debug!(step = ?state.registration().step(), "Registration step incomplete");
        return false;
    }

    let next = match state.registration() {
        Registration::PhoneEntry { phone } => Registration::ProfileEntry {
            phone: phone.clone(),
            display_name: String::new(),
            handle: String::new(),
        },
        Registration::ProfileEntry {
            phone,
            display_name,
            handle,
        } => Registration::Registered(Profile {
            phone: phone.clone(),
            display_name: display_name.trim().to_string(),
            handle: handle.trim().to_string(),
        }),
        Registration::Registered(_) => return false,
    };

    if let Registration::Registered(profile) = &next {
        info!(handle = %profile.handle, "Registration complete");
    }
    state.set_registration(next);
    true
}

/// Return from profile entry to phone entry, keeping the phone number.
pub fn back(state: &mut SessionState) -> bool {
    let Registration::ProfileEntry { phone, .. } = state.registration() else {
        return false;
    };
    let phone = phone.clone();
    state.set_registration(Registration::PhoneEntry { phone });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RegistrationStep;

    #[test]
    fn test_short_phone_does_not_advance() {
        let mut state = SessionState::seeded();

        for phone in ["", "1", "+7 999", "123456789", "+7 999 12"] {
            set_phone(&mut state, phone);
            assert!(!advance(&mut state), "advanced with {phone:?}");
            assert_eq!(state.registration().step(), RegistrationStep::PhoneEntry);
        }
    }

    #[test]
    fn test_ten_characters_advance() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+7 999 123");

        assert!(advance(&mut state));
        assert_eq!(state.registration().step(), RegistrationStep::ProfileEntry);
    }

    #[test]
    fn test_blank_profile_fields_do_not_register() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+79991234567");
        advance(&mut state);

        for (name, handle) in [("", "ivan"), ("   ", "ivan"), ("Иван", ""), ("Иван", "   "), ("", "")] {
            set_display_name(&mut state, name);
            set_handle(&mut state, handle);
            assert!(!advance(&mut state));
            assert!(!state.is_registered());
        }
    }

    #[test]
    fn test_handle_is_filtered_and_values_trimmed() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+79991234567");
        advance(&mut state);

        set_display_name(&mut state, "  Иван Иванов ");
        set_handle(&mut state, "ivan.ivanov!");
        assert!(advance(&mut state));

        let profile = state.profile().unwrap();
        assert_eq!(profile.display_name, "Иван Иванов");
        assert_eq!(profile.handle, "ivanivanov");
        assert_eq!(profile.phone, "+79991234567");
    }

    #[test]
    fn test_handle_of_only_invalid_chars_blocks_registration() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+79991234567");
        advance(&mut state);

        set_display_name(&mut state, "Иван");
        set_handle(&mut state, "иван");
        assert!(!advance(&mut state));
    }

    #[test]
    fn test_back_keeps_phone() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+79991234567");
        advance(&mut state);

        assert!(back(&mut state));
        assert_eq!(
            state.registration(),
            &Registration::PhoneEntry {
                phone: "+79991234567".into()
            }
        );
        assert!(!back(&mut state));
    }

    #[test]
    fn test_registered_is_terminal() {
        let mut state = SessionState::seeded();
        set_phone(&mut state, "+79991234567");
        advance(&mut state);
        set_display_name(&mut state, "Иван");
        set_handle(&mut state, "ivan");
        advance(&mut state);

        assert!(!advance(&mut state));
        assert!(!back(&mut state));
        set_phone(&mut state, "0");
        assert!(state.is_registered());
    }
}
