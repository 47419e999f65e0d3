use crate::core::defaults::default_for;
use crate::core::schema::FieldDescriptor;
use crate::core::value::Value;
use crate::error::{FormError, TemplateError};
use crate::generation::{ChatTransport, GenerationOutcome, GenerationRunner};
use crate::runtime::command::Command;
use crate::runtime::event::WidgetAction;
use crate::state::form::FormController;
use crate::templates::{BlobStore, TemplateStore};
use crate::terminal::{CursorPos, KeyEvent};
use crate::ui::frame::Frame;
use crate::ui::span::Span;
use crate::ui::spinner::Spinner;
use crate::ui::style::{Color, Style};
use crate::widgets::field::FieldWidget;
use crate::widgets::inputs::TextInput;
use crate::widgets::registry::render;
use crate::widgets::traits::{
    Drawable, InteractionResult, Interactive, RenderContext, TextAction,
};

const PROMPT_ID: &str = "prompt";
const TEMPLATE_PROMPT_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl ToString) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.to_string(),
        }
    }
}

/// Interactive session state: prompt editor, template list, live form and
/// submission log. Every failure becomes a dismissible message.
pub struct Session<T: ChatTransport + 'static, B: BlobStore> {
    prompt: TextInput,
    controller: FormController,
    /// One per field, in the controller's field order.
    widgets: Vec<FieldWidget>,
    /// Widget indexes in display (section) order.
    order: Vec<usize>,
    /// 0 is the prompt; `n` is `order[n - 1]`.
    focus: usize,
    templates: TemplateStore<B>,
    selected_template: usize,
    runner: GenerationRunner<T>,
    spinner: Spinner,
    raw_output: Option<String>,
    message: Option<Message>,
    should_exit: bool,
}

impl<T: ChatTransport + 'static, B: BlobStore> Session<T, B> {
    pub fn new(runner: GenerationRunner<T>, templates: TemplateStore<B>) -> Self {
        Self {
            prompt: TextInput::new(PROMPT_ID, "Describe your form")
                .with_placeholder("e.g. a contact form with name, email and message"),
            controller: FormController::new(),
            widgets: Vec::new(),
            order: Vec::new(),
            focus: 0,
            templates,
            selected_template: 0,
            runner,
            spinner: Spinner::default(),
            raw_output: None,
            message: None,
            should_exit: false,
        }
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn is_generating(&self) -> bool {
        self.runner.is_generating()
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn templates(&self) -> &TemplateStore<B> {
        &self.templates
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn raw_output(&self) -> Option<&str> {
        self.raw_output.as_deref()
    }

    pub fn prompt_text(&self) -> String {
        self.prompt
            .value()
            .and_then(|value| value.to_text_scalar())
            .unwrap_or_default()
    }

    pub fn set_prompt(&mut self, text: &str) {
        self.prompt.set_value(text.into());
    }

    /// Name of the focused field, `None` while the prompt has focus.
    pub fn focused_field(&self) -> Option<&str> {
        self.focused_widget_index()
            .map(|idx| self.widgets[idx].name())
    }

    pub fn widget(&self, name: &str) -> Option<&FieldWidget> {
        self.widgets.iter().find(|widget| widget.name() == name)
    }

    /// Returns true when the screen needs redrawing.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Exit => {
                self.should_exit = true;
                false
            }
            Command::Generate => self.generate(),
            Command::SaveTemplate => self.save_template(),
            Command::NextTemplate => self.cycle_template(true),
            Command::PrevTemplate => self.cycle_template(false),
            Command::LoadTemplate => self.load_selected_template(),
            Command::DeleteTemplate => self.delete_selected_template(),
            Command::SubmitForm => self.submit_form(),
            Command::Dismiss => self.message.take().is_some(),
            Command::NextFocus => self.move_focus(true),
            Command::PrevFocus => self.move_focus(false),
            Command::TextAction(action) => self.text_action(action),
            Command::InputKey(key) => self.input_key(key),
            Command::Tick => self.tick(),
        }
    }

    fn tick(&mut self) -> bool {
        let outcomes = self.runner.drain_ready();
        let finished = !outcomes.is_empty();
        for outcome in outcomes {
            self.apply_generation(outcome);
        }
        if self.runner.is_generating() {
            self.spinner.tick();
            return true;
        }
        finished
    }

    fn generate(&mut self) -> bool {
        let prompt = self.prompt_text();
        match self.runner.start(&prompt) {
            Ok(_) => {
                self.message = None;
                tracing::info!("generation requested");
            }
            Err(err) => self.message = Some(Message::error(err)),
        }
        true
    }

    fn apply_generation(&mut self, outcome: GenerationOutcome) {
        match outcome.result {
            Ok(generated) => {
                self.raw_output = Some(generated.pretty_raw());
                let count = generated.fields.len();
                match self.controller.load_generated(generated.fields) {
                    Ok(()) => {
                        self.rebuild_widgets();
                        self.message = Some(Message::info(format!(
                            "Generated a form with {count} field(s)"
                        )));
                    }
                    Err(err) => self.message = Some(Message::error(err)),
                }
            }
            Err(err) => {
                if let Some(raw) = err.raw_output() {
                    self.raw_output = Some(raw.to_string());
                }
                self.message = Some(Message::error(err));
            }
        }
    }

    fn save_template(&mut self) -> bool {
        if !self.controller.is_loaded() {
            self.message = Some(Message::error(TemplateError::NoFields));
            return true;
        }
        let prompt = self.prompt_text();
        match self
            .templates
            .save(&prompt, self.controller.fields().to_vec())
        {
            Ok(template) => {
                if let Some(idx) = self
                    .templates
                    .templates()
                    .iter()
                    .position(|entry| entry.id == template.id)
                {
                    self.selected_template = idx;
                }
                self.message = Some(Message::info(format!(
                    "Template saved (version {})",
                    template.version
                )));
            }
            Err(err) => self.message = Some(Message::error(err)),
        }
        true
    }

    fn cycle_template(&mut self, forward: bool) -> bool {
        let len = self.templates.len();
        if len == 0 {
            return false;
        }
        self.selected_template = if forward {
            (self.selected_template + 1) % len
        } else {
            (self.selected_template + len - 1) % len
        };
        true
    }

    fn selected_template_id(&self) -> Option<u64> {
        self.templates
            .templates()
            .get(self.selected_template)
            .map(|template| template.id)
    }

    fn load_selected_template(&mut self) -> bool {
        let Some(id) = self.selected_template_id() else {
            self.message = Some(Message::error("No saved templates"));
            return true;
        };
        let prompt = self
            .templates
            .get(id)
            .map(|template| template.prompt.clone())
            .unwrap_or_default();
        let loaded = self
            .templates
            .load(id)
            .map_err(|err| err.to_string())
            .and_then(|fields| {
                self.controller
                    .load_template(id, fields)
                    .map_err(|err| err.to_string())
            });
        match loaded {
            Ok(()) => {
                self.set_prompt(&prompt);
                self.raw_output = None;
                self.rebuild_widgets();
                self.message = Some(Message::info("Template loaded"));
            }
            Err(err) => self.message = Some(Message::error(err)),
        }
        true
    }

    fn delete_selected_template(&mut self) -> bool {
        let Some(id) = self.selected_template_id() else {
            return false;
        };
        match self.templates.delete(id) {
            Ok(()) => {
                self.selected_template = self
                    .selected_template
                    .min(self.templates.len().saturating_sub(1));
                self.message = Some(Message::info("Template deleted"));
            }
            Err(err) => self.message = Some(Message::error(err)),
        }
        true
    }

    fn submit_form(&mut self) -> bool {
        if !self.controller.is_loaded() {
            self.message = Some(Message::error(FormError::NotLoaded));
            return true;
        }

        let mut first_invalid = None;
        for (position, &idx) in self.order.iter().enumerate() {
            if !self.widgets[idx].check_submit() && first_invalid.is_none() {
                first_invalid = Some(position);
            }
        }
        if let Some(position) = first_invalid {
            self.focus = position + 1;
            self.message = Some(Message::error("Please fix the highlighted fields"));
            return true;
        }

        match self.controller.submit() {
            Ok(submission) => {
                let count = submission.values.len();
                self.hydrate_widgets();
                self.message = Some(Message::info(format!(
                    "Form submitted ({count} value(s))"
                )));
            }
            Err(err) => self.message = Some(Message::error(err)),
        }
        true
    }

    fn move_focus(&mut self, forward: bool) -> bool {
        let slots = self.order.len() + 1;
        self.focus = if forward {
            (self.focus + 1) % slots
        } else {
            (self.focus + slots - 1) % slots
        };
        true
    }

    fn focused_widget_index(&self) -> Option<usize> {
        match self.focus {
            0 => None,
            n => self.order.get(n - 1).copied(),
        }
    }

    fn input_key(&mut self, key: KeyEvent) -> bool {
        match self.focused_widget_index() {
            None => {
                let result = self.prompt.on_key(key);
                if result.actions.contains(&WidgetAction::InputDone) {
                    return self.generate();
                }
                result.request_render
            }
            Some(idx) => {
                let result = self.widgets[idx].on_key(key);
                self.apply_widget_result(result)
            }
        }
    }

    fn text_action(&mut self, action: TextAction) -> bool {
        match self.focused_widget_index() {
            None => self.prompt.on_text_action(action).request_render,
            Some(idx) => {
                let result = self.widgets[idx].on_text_action(action);
                self.apply_widget_result(result)
            }
        }
    }

    fn apply_widget_result(&mut self, result: InteractionResult) -> bool {
        for action in &result.actions {
            match action {
                WidgetAction::ValueChanged { change } => {
                    self.controller
                        .set_value(&change.target, change.value.clone());
                }
                WidgetAction::InputDone => {
                    self.move_focus(true);
                }
            }
        }
        result.request_render
    }

    fn rebuild_widgets(&mut self) {
        self.widgets = self
            .controller
            .fields()
            .iter()
            .map(|field| render(field, &self.current_value(field)))
            .collect();
        self.order = self.controller.display_order();
        self.focus = if self.order.is_empty() { 0 } else { 1 };
        self.adopt_widget_values();
    }

    fn hydrate_widgets(&mut self) {
        for (widget, field) in self.widgets.iter_mut().zip(self.controller.fields()) {
            let value = self
                .controller
                .value(&field.name)
                .cloned()
                .unwrap_or_else(|| default_for(field));
            widget.set_value(value);
        }
        self.adopt_widget_values();
    }

    // Widgets drop values they cannot show (unknown options, out-of-range
    // numbers); the controller must hold what is on screen.
    fn adopt_widget_values(&mut self) {
        for widget in &self.widgets {
            self.controller.set_value(widget.name(), widget.value());
        }
    }

    fn current_value(&self, field: &FieldDescriptor) -> Value {
        self.controller
            .value(&field.name)
            .cloned()
            .unwrap_or_else(|| default_for(field))
    }

    pub fn frame(&self, help: &str) -> Frame {
        let ctx = RenderContext {
            focused_id: match self.focused_widget_index() {
                None => Some(PROMPT_ID.to_string()),
                Some(idx) => Some(self.widgets[idx].name().to_string()),
            },
        };
        let mut frame = Frame::new();
        let hint = Style::new().color(Color::DarkGrey);

        frame.push(vec![Span::styled("formsmith", Style::new().bold())]);
        frame.push_text(help, hint);
        frame.blank();

        frame.heading("Prompt");
        let prompt_focused = self.focus == 0;
        let marker = if prompt_focused {
            Span::styled("> ", Style::new().color(Color::Cyan).bold())
        } else {
            Span::new("  ")
        };
        let mut prompt_line = vec![marker];
        let prompt_row = frame.lines.len() as u16;
        prompt_line.extend(self.prompt.draw(&ctx).lines.into_iter().flatten());
        if self.runner.is_generating() {
            prompt_line.push(Span::new("  "));
            prompt_line.push(self.spinner.span());
            prompt_line.push(Span::styled(" Generating…", Style::new().color(Color::Cyan)));
        }
        frame.push(prompt_line);
        if prompt_focused {
            frame.cursor = self.prompt.cursor_pos().map(|pos| CursorPos {
                col: pos.col + 2,
                row: prompt_row,
            });
        }

        if let Some(message) = &self.message {
            frame.blank();
            let style = match message.kind {
                MessageKind::Info => Style::new().color(Color::Green),
                MessageKind::Error => Style::new().color(Color::Red).bold(),
            };
            frame.push(vec![
                Span::styled(message.text.clone(), style),
                Span::styled("  (Esc to dismiss)", hint),
            ]);
        }

        frame.blank();
        frame.heading("Templates");
        if self.templates.is_empty() {
            frame.push_text("  No saved templates", hint);
        }
        for (idx, template) in self.templates.templates().iter().enumerate() {
            let selected = idx == self.selected_template;
            let marker = if selected { "▸ " } else { "  " };
            let style = if selected {
                Style::new().color(Color::Cyan).bold()
            } else {
                Style::default()
            };
            frame.push(vec![
                Span::styled(
                    format!("{marker}{}", template.short_prompt(TEMPLATE_PROMPT_CHARS)),
                    style,
                ),
                Span::styled(
                    format!(
                        "  Version {} • {}",
                        template.version,
                        template.date_created.format("%Y-%m-%d")
                    ),
                    hint,
                ),
            ]);
        }

        if self.controller.is_loaded() {
            frame.blank();
            frame.heading("Form");
            for section in self.controller.sections() {
                if let Some(title) = &section.title {
                    frame.push(vec![Span::styled(
                        title.clone(),
                        Style::new().color(Color::Yellow).bold(),
                    )]);
                }
                for idx in section.fields {
                    let widget = &self.widgets[idx];
                    frame.append(widget.draw(&ctx), widget.cursor_pos(&ctx));
                }
            }
        }

        if let Some(raw) = &self.raw_output {
            frame.blank();
            frame.heading("LLM Output");
            for line in raw.lines() {
                frame.push_text(format!("  {line}"), hint);
            }
        }

        let submissions = self.controller.submissions();
        if !submissions.is_empty() {
            frame.blank();
            frame.heading("Submissions");
            for (idx, submission) in submissions.iter().enumerate() {
                frame.push(vec![Span::styled(
                    format!(
                        "#{} at {}",
                        idx + 1,
                        submission.submitted_at.format("%H:%M:%S")
                    ),
                    Style::new().bold(),
                )]);
                for (name, value) in submission.values.iter() {
                    frame.push(vec![
                        Span::styled(format!("  {name}: "), hint),
                        Span::new(value.to_string()),
                    ]);
                }
            }
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageKind, Session};
    use crate::core::value::Value;
    use crate::generation::client::tests::CannedTransport;
    use crate::generation::runner::tests::gated;
    use crate::generation::{GenerationClient, GenerationRunner, GenerationSettings};
    use crate::runtime::command::Command;
    use crate::templates::{MemoryBlobStore, TemplateStore};
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::ui::span::line_text;
    use std::time::{Duration, Instant};

    const CONTACT: &str = r#"[
        {"label":"Full Name","name":"fullName","type":"text","required":true},
        {"label":"Email","name":"email","type":"email","required":true}
    ]"#;

    fn session(content: &str) -> Session<CannedTransport, MemoryBlobStore> {
        let client = GenerationClient::new(
            CannedTransport::content(content),
            GenerationSettings::default(),
        );
        Session::new(
            GenerationRunner::new(client),
            TemplateStore::open(MemoryBlobStore::new()),
        )
    }

    fn type_text(session: &mut Session<CannedTransport, MemoryBlobStore>, text: &str) {
        for ch in text.chars() {
            session.handle(Command::InputKey(KeyEvent::plain(KeyCode::Char(ch))));
        }
    }

    fn generate(session: &mut Session<CannedTransport, MemoryBlobStore>, prompt: &str) {
        type_text(session, prompt);
        session.handle(Command::Generate);
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_generating() && Instant::now() < deadline {
            session.handle(Command::Tick);
            std::thread::sleep(Duration::from_millis(5));
        }
        session.handle(Command::Tick);
    }

    #[test]
    fn contact_form_generate_fill_submit() {
        let mut session = session(CONTACT);
        generate(&mut session, "contact form with name and email");

        assert_eq!(session.controller().fields().len(), 2);
        assert_eq!(session.focused_field(), Some("fullName"));
        assert!(session.raw_output().is_some_and(|raw| raw.contains("fullName")));

        type_text(&mut session, "Ada Lovelace");
        session.handle(Command::NextFocus);
        type_text(&mut session, "ada@example.com");
        assert!(session.handle(Command::SubmitForm));

        let submissions = session.controller().submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(
            submissions[0].values.get("email"),
            Some(&Value::text("ada@example.com"))
        );
        assert_eq!(
            session.controller().value("fullName"),
            Some(&Value::empty_text())
        );
        assert_eq!(
            session.widget("fullName").map(|widget| widget.value()),
            Some(Value::empty_text())
        );
    }

    #[test]
    fn invalid_submit_focuses_first_failing_field() {
        let mut session = session(CONTACT);
        generate(&mut session, "contact");
        session.handle(Command::NextFocus);
        type_text(&mut session, "not-an-email");

        session.handle(Command::SubmitForm);
        assert!(session.controller().submissions().is_empty());
        assert_eq!(session.focused_field(), Some("fullName"));
        assert_eq!(
            session.widget("email").and_then(|widget| widget.error()),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            session.message().map(|message| message.kind),
            Some(MessageKind::Error)
        );
    }

    #[test]
    fn save_and_reload_template() {
        let mut session = session(CONTACT);
        assert!(session.handle(Command::SaveTemplate));
        assert_eq!(
            session.message().map(|message| message.text.as_str()),
            Some("Please generate a form before saving")
        );

        generate(&mut session, "Contact");
        session.handle(Command::SaveTemplate);
        session.handle(Command::SaveTemplate);
        assert_eq!(session.templates().len(), 1);
        assert_eq!(session.templates().templates()[0].version, 2);

        session.set_prompt("");
        session.handle(Command::LoadTemplate);
        assert_eq!(session.prompt_text(), "Contact");
        assert_eq!(session.controller().fields().len(), 2);

        session.handle(Command::DeleteTemplate);
        assert!(session.templates().is_empty());
    }

    #[test]
    fn parse_failure_keeps_previous_form_and_shows_raw_text() {
        let mut session = session("Sorry, I can't do that.");
        generate(&mut session, "anything");
        assert!(!session.controller().is_loaded());
        assert_eq!(session.raw_output(), Some("Sorry, I can't do that."));
        assert_eq!(
            session.message().map(|message| message.kind),
            Some(MessageKind::Error)
        );
        session.handle(Command::Dismiss);
        assert!(session.message().is_none());
    }

    #[test]
    fn frame_lists_templates_and_submissions() {
        let mut session = session(CONTACT);
        generate(&mut session, "A very long prompt describing a contact form");
        session.handle(Command::SaveTemplate);
        type_text(&mut session, "Ada");
        session.handle(Command::NextFocus);
        type_text(&mut session, "a@b.co");
        session.handle(Command::SubmitForm);

        let text: Vec<String> = session.frame("help").lines.iter().map(line_text).collect();
        assert!(text.iter().any(|line| line.contains("A very long prompt describing ...")));
        assert!(text.iter().any(|line| line.contains("Version 1 •")));
        assert!(text.iter().any(|line| line == "  email: a@b.co"));
    }

    #[test]
    fn values_a_widget_cannot_show_are_not_submitted() {
        let mut session = session(
            r#"[
                {"label":"Colour","name":"color","type":"select","options":["Red","Green"],"defaultValue":"red"},
                {"label":"Volume","name":"vol","type":"range","validation":{"max":10},"defaultValue":50}
            ]"#,
        );
        generate(&mut session, "preferences");

        for name in ["color", "vol"] {
            assert_eq!(
                session.controller().value(name).cloned(),
                session.widget(name).map(|widget| widget.value()),
                "{name}"
            );
        }
        assert_eq!(session.controller().value("color"), Some(&Value::empty_text()));
        assert_eq!(session.controller().value("vol"), Some(&Value::Number(10.0)));

        session.handle(Command::SubmitForm);
        let submitted = &session.controller().submissions()[0].values;
        assert_eq!(submitted.get("color"), Some(&Value::empty_text()));
        assert_eq!(submitted.get("vol"), Some(&Value::Number(10.0)));
        assert_eq!(session.controller().value("vol"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn generate_while_busy_is_refused_and_other_controls_keep_working() {
        let (transport, gate) = gated(CONTACT);
        let client = GenerationClient::new(transport, GenerationSettings::default());
        let mut session = Session::new(
            GenerationRunner::new(client),
            TemplateStore::open(MemoryBlobStore::new()),
        );
        for ch in "contact".chars() {
            session.handle(Command::InputKey(KeyEvent::plain(KeyCode::Char(ch))));
        }
        session.handle(Command::Generate);
        assert!(session.is_generating());
        let text: Vec<String> = session.frame("help").lines.iter().map(line_text).collect();
        assert!(text.iter().any(|line| line.contains("Generating…")));

        session.handle(Command::Generate);
        assert_eq!(
            session.message().map(|message| message.text.as_str()),
            Some("A form is already being generated")
        );
        assert!(session.handle(Command::Dismiss));

        session.handle(Command::SaveTemplate);
        assert_eq!(
            session.message().map(|message| message.text.as_str()),
            Some("Please generate a form before saving")
        );
        session.handle(Command::InputKey(KeyEvent::plain(KeyCode::Char('s'))));
        assert_eq!(session.prompt_text(), "contacts");
        assert!(session.is_generating());

        gate.send(()).expect("release");
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.is_generating() && Instant::now() < deadline {
            session.handle(Command::Tick);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!session.is_generating());
        assert_eq!(session.controller().fields().len(), 2);
    }
}
