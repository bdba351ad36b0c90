use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.validate_area`(...) and start polling on success
    SubmitArea,
    /// Run `poller.run_cycle`(...) right away
    Refresh,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Enter, Esc, Left};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::AreaEntry => match key.code {
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.area_input.push(character);
                }
            }
            Backspace => {
                app.area_input.pop();
            }
            Enter => {
                action = Action::SubmitArea;
            }
            Esc => {
                action = Action::Quit;
            }
            _ => {}
        },

        Screen::ScheduleView => match key.code {
            Char('q') if key.modifiers.is_empty() => {
                action = Action::Quit;
            }
            Char('r') => {
                action = Action::Refresh;
            }
            Left | Esc | Char('b') => {
                app.stop_polling();
                app.error_message = None;
                app.screen = Screen::AreaEntry;
            }
            _ => {}
        },
    }
    action
}
