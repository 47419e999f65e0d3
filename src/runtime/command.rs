use crate::terminal::KeyEvent;
use crate::widgets::traits::TextAction;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Exit,
    Generate,
    SaveTemplate,
    NextTemplate,
    PrevTemplate,
    LoadTemplate,
    DeleteTemplate,
    SubmitForm,
    Dismiss,
    NextFocus,
    PrevFocus,
    TextAction(TextAction),
    InputKey(KeyEvent),
    Tick,
}
