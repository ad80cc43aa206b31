use tracing::{debug, info};

use supergram_shared::validation::{filter_handle, profile_is_complete};

use crate::events::SessionEvent;
use crate::state::{ProfileDraft, SessionState};

/// Copy the current profile into an editable draft.
pub fn begin_edit(state: &mut SessionState) -> bool {
    let Some(profile) = state.profile() else {
        return false;
    };
    let draft = ProfileDraft {
        display_name: profile.display_name.clone(),
        handle: profile.handle.clone(),
    };
    *state.profile_draft_mut() = Some(draft);
    true
}

pub fn set_draft_display_name(state: &mut SessionState, input: &str) {
    if let Some(draft) = state.profile_draft_mut() {
        draft.display_name = input.to_string();
    }
}

pub fn set_draft_handle(state: &mut SessionState, input: &str) {
    if let Some(draft) = state.profile_draft_mut() {
        draft.handle = filter_handle(input);
    }
}

/// Commit the draft. An incomplete draft stays open and nothing changes.
pub fn save(state: &mut SessionState) -> bool {
    let Some(draft) = state.profile_draft().cloned() else {
        return false;
    };
    if !profile_is_complete(&draft.display_name, &draft.handle) {
        debug!("Profile draft incomplete, not saved");
        return false;
    }
    let Some(profile) = state.profile_mut() else {
        return false;
    };

    profile.display_name = draft.display_name.trim().to_string();
    profile.handle = draft.handle.trim().to_string();
    info!(handle = %profile.handle, "Profile updated");

    state.profile_draft_mut().take();
    state.emit(SessionEvent::ProfileUpdated);
    true
}

pub fn cancel(state: &mut SessionState) {
    state.profile_draft_mut().take();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::registration;

    fn registered() -> SessionState {
        let mut state = SessionState::seeded();
        registration::set_phone(&mut state, "+79991234567");
        registration::advance(&mut state);
        registration::set_display_name(&mut state, "Иван");
        registration::set_handle(&mut state, "ivan");
        registration::advance(&mut state);
        state
    }

    #[test]
    fn test_edit_and_save() {
        let mut state = registered();

        assert!(begin_edit(&mut state));
        set_draft_display_name(&mut state, " Иван Петров ");
        set_draft_handle(&mut state, "ivan-petrov");
        assert!(save(&mut state));

        let profile = state.profile().unwrap();
        assert_eq!(profile.display_name, "Иван Петров");
        assert_eq!(profile.handle, "ivanpetrov");
        assert!(state.profile_draft().is_none());
    }

    #[test]
    fn test_incomplete_draft_is_kept() {
        let mut state = registered();

        begin_edit(&mut state);
        set_draft_display_name(&mut state, "  ");
        assert!(!save(&mut state));

        assert_eq!(state.profile().unwrap().display_name, "Иван");
        assert!(state.profile_draft().is_some());
    }

    #[test]
    fn test_cancel_keeps_profile() {
        let mut state = registered();

        begin_edit(&mut state);
        set_draft_handle(&mut state, "other");
        cancel(&mut state);

        assert_eq!(state.profile().unwrap().handle, "ivan");
        assert!(!save(&mut state));
    }

    #[test]
    fn test_edit_requires_registration() {
        let mut state = SessionState::seeded();
        assert!(!begin_edit(&mut state));
    }
}
