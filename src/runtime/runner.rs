use crate::generation::ChatTransport;
use crate::runtime::app::Session;
use crate::runtime::command::Command;
use crate::runtime::key_bindings::KeyBindings;
use crate::templates::BlobStore;
use crate::terminal::{Terminal, TerminalEvent};
use std::io;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(120);

pub struct Runtime<T: ChatTransport + 'static, B: BlobStore> {
    session: Session<T, B>,
    terminal: Terminal,
    key_bindings: KeyBindings,
}

impl<T: ChatTransport + 'static, B: BlobStore> Runtime<T, B> {
    pub fn new(session: Session<T, B>, terminal: Terminal) -> Self {
        Self::with_key_bindings(session, terminal, KeyBindings::new())
    }

    pub fn with_key_bindings(
        session: Session<T, B>,
        terminal: Terminal,
        key_bindings: KeyBindings,
    ) -> Self {
        Self {
            session,
            terminal,
            key_bindings,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.terminal.enter()?;

        let run_result = (|| -> io::Result<()> {
            self.render()?;

            while !self.session.should_exit() {
                let event = self.terminal.poll_event(POLL_INTERVAL)?;
                self.dispatch(event)?;
            }

            Ok(())
        })();

        let exit_result = self.terminal.exit();
        run_result.and(exit_result)
    }

    fn dispatch(&mut self, event: TerminalEvent) -> io::Result<()> {
        match event {
            TerminalEvent::Resize(size) => {
                self.terminal.set_size(size);
                self.render()
            }
            TerminalEvent::Scroll(delta) => {
                self.terminal.scroll(delta);
                self.render()
            }
            TerminalEvent::Key(key) => {
                let command = self
                    .key_bindings
                    .resolve(key)
                    .unwrap_or(Command::InputKey(key));
                self.terminal.reset_scroll();
                self.process_command(command)
            }
            TerminalEvent::Tick => self.process_command(Command::Tick),
        }
    }

    fn process_command(&mut self, command: Command) -> io::Result<()> {
        if self.session.handle(command) {
            self.render()?;
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.session.frame(self.key_bindings.help());
        self.terminal.render(&frame.lines, frame.cursor)
    }
}
