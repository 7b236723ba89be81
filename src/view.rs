use crate::dom::Container;
use crate::reconcile::PatchReport;
use html_escape::encode_text;
use log::debug;

const ICONS: &str = "img/icons.svg";

/// Markup generator for one kind of view data
pub trait Template<T: ?Sized> {
    fn markup(&self, data: &T) -> String;

    /// Data for which the view shows its error message instead of markup
    fn is_empty(&self, _data: &T) -> bool {
        false
    }
}

/// A container plus the template and default messages of one view
#[derive(Debug)]
pub struct View<M> {
    container: Container,
    template: M,
    error_message: String,
    message: String,
}

impl<M> View<M> {
    pub fn new(template: M) -> Self {
        Self {
            container: Container::new(),
            template,
            error_message: String::new(),
            message: String::new(),
        }
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn clear(&mut self) {
        self.container.clear();
    }

    /// Full replace, no diffing
    pub fn replace(&mut self, markup: &str) {
        self.container.replace(markup);
    }

    /// Incremental patch; `markup` must have the same element skeleton as the live content
    pub fn patch(&self, markup: &str) -> PatchReport {
        self.container.patch(markup)
    }

    /// Generate markup for `data` without touching the container
    pub fn markup<T: ?Sized>(&self, data: &T) -> String
    where
        M: Template<T>,
    {
        self.template.markup(data)
    }

    /// Replace the content with the markup for `data`, or the error message if it is empty
    pub fn render<T: ?Sized>(&mut self, data: &T)
    where
        M: Template<T>,
    {
        if self.template.is_empty(data) {
            self.render_error(None);
            return;
        }
        let markup = self.template.markup(data);
        self.replace(&markup);
    }

    /// Patch the content towards the markup for `data`, keeping unchanged nodes
    pub fn update<T: ?Sized>(&self, data: &T) -> PatchReport
    where
        M: Template<T>,
    {
        let report = self.patch(&self.template.markup(data));
        debug!("View update: {:?}", report);
        report
    }

    pub fn render_spinner(&mut self) {
        let markup = format!(
            r#"<div class="spinner"><svg><use href="{}#icon-loader"></use></svg></div>"#,
            ICONS
        );
        self.replace(&markup);
    }

    /// Show `message`, or this view's default error message
    pub fn render_error(&mut self, message: Option<&str>) {
        let message = message.unwrap_or(&self.error_message).to_string();
        self.render_notice("error", "icon-alert-triangle", &message);
    }

    /// Show `message`, or this view's default message
    pub fn render_message(&mut self, message: Option<&str>) {
        let message = message.unwrap_or(&self.message).to_string();
        self.render_notice("message", "icon-smile", &message);
    }

    fn render_notice(&mut self, class: &str, icon: &str, message: &str) {
        let markup = format!(
            r#"<div class="{}"><div><svg><use href="{}#{}"></use></svg></div><p>{}</p></div>"#,
            class,
            ICONS,
            icon,
            encode_text(message)
        );
        self.replace(&markup);
    }
}
