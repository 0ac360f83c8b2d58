use std::sync::Arc;

use bootform_session::{FlashQueue, DEFAULT_QUEUE};
use ironhtml::html;
use ironhtml_elements::Button;
use tracing::debug;

use crate::error::Result;

/// Converts drained flash messages into markup.
pub type FlashRenderer = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Renders each message as a dismissable success banner.
pub fn render_flash_default(messages: &[String]) -> String {
    messages
        .iter()
        .map(|message| {
            html! { div.class("alert alert-success") }
                .attr("role", "alert")
                .child::<Button, _>(|b| {
                    b.attr("type", "button")
                        .class("close")
                        .attr("data-dismiss", "alert")
                        .text("×")
                })
                .text(message)
                .render()
        })
        .collect()
}

/// Shows queued flash messages above an embedded form.
#[derive(Clone)]
pub struct FlashPanel {
    queue: String,
    render_flash: Option<FlashRenderer>,
}

impl std::fmt::Debug for FlashPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashPanel")
            .field("queue", &self.queue)
            .field("custom_renderer", &self.render_flash.is_some())
            .finish()
    }
}

impl Default for FlashPanel {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE)
    }
}

impl FlashPanel {
    /// Creates a panel draining the named queue.
    pub fn new(queue: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            render_flash: None,
        }
    }

    /// Replaces the default message renderer.
    #[must_use]
    pub fn with_flash_renderer<F>(mut self, render_flash: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.render_flash = Some(Arc::new(render_flash));
        self
    }

    /// Returns the queue this panel drains.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Renders the form, then drains the queue once and renders the messages.
    ///
    /// The flash container appears only when messages were queued; the form
    /// markup is inserted as is. A failed form render leaves the queue intact.
    pub fn render<F>(&self, flash: &dyn FlashQueue, render_form: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let form_html = render_form()?;
        let messages = flash.pop_flash(&self.queue)?;
        debug!(queue = %self.queue, count = messages.len(), "rendering flash panel");

        let flash_html = if messages.is_empty() {
            String::new()
        } else {
            let inner = match &self.render_flash {
                Some(render) => render(&messages),
                None => render_flash_default(&messages),
            };
            html! { div.class("flash-messages") }.raw(&inner).render()
        };

        Ok(html! { div.class("form-panel") }
            .raw(&flash_html)
            .raw(&form_html)
            .render())
    }
}
