use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Read the entered image file and run `service.classify_image`(...)
    ClassifyImage,
    /// Re-run the discovery cycle without a new classification
    RefreshLocations,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut; plain `q` only outside the path input.
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Capture => match key.code {
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.image_path_input.push(character);
                }
            }
            Backspace => {
                app.image_path_input.pop();
            }
            Enter => {
                action = Action::ClassifyImage;
            }
            Right | Tab => {
                if app.classification.is_some() {
                    app.screen = Screen::Results;
                }
            }
            Esc => {
                action = Action::Quit;
            }
            _ => {}
        },

        Screen::Results => match key.code {
            Up | Char('k') => {
                if app.list_index > 0 {
                    app.list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.list_index + 1 < app.points.len() {
                    app.list_index += 1;
                }
            }
            Char('r') => {
                action = Action::RefreshLocations;
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::Capture;
            }
            Char('q') => {
                action = Action::Quit;
            }
            _ => {}
        },
    }
    action
}
