use tracing::debug;

use crate::events::SessionEvent;
use crate::state::{SessionState, View};

/// Switch the main shell to `view`. The shell only exists once registered.
pub fn navigate(state: &mut SessionState, view: View) -> bool {
    if !state.is_registered() {
        debug!(?view, "Ignoring navigation before registration");
        return false;
    }
    if state.view != view {
        state.view = view;
        state.emit(SessionEvent::ViewChanged(view));
    }
    true
}

pub fn set_search_query(state: &mut SessionState, query: &str) {
    state.search_query = query.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::registration;

    #[test]
    fn test_navigation_needs_registration() {
        let mut state = SessionState::seeded();
        assert!(!navigate(&mut state, View::Settings));
        assert_eq!(state.view, View::Chats);

        registration::set_phone(&mut state, "+79991234567");
        registration::advance(&mut state);
        registration::set_display_name(&mut state, "Иван");
        registration::set_handle(&mut state, "ivan");
        registration::advance(&mut state);

        let mut events = state.subscribe();
        assert!(navigate(&mut state, View::Settings));
        assert_eq!(state.view, View::Settings);
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::ViewChanged(View::Settings)
        );
    }

    #[test]
    fn test_handle_search() {
        let mut state = SessionState::seeded();

        set_search_query(&mut state, "@d");
        let visible: Vec<_> = state.visible_chats().iter().map(|c| c.handle.as_str()).collect();

        assert_eq!(visible, ["dmitry_k"]);
    }
}
