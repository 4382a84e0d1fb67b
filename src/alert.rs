//! Alert messages shown in the floating alert container.
//!
//! htmx requests whose response has an error status are swapped into
//! `#alert-container` instead of their usual target.

use maud::{Markup, html};

/// An error alert with a headline and optional details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self { message, details }
    }

    pub fn into_html(self) -> Markup {
        html! {
            div
                class="p-4 mb-4 text-red-800 rounded-lg bg-red-50
                    dark:bg-gray-800 dark:text-red-400"
                role="alert"
            {
                span class="font-medium" { (self.message) }

                @if !self.details.is_empty() {
                    p class="text-sm" { (self.details) }
                }

                button
                    type="button"
                    class="ms-auto text-sm underline"
                    onclick="this.parentElement.remove()"
                {
                    "Dismiss"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn renders_message_and_details() {
        let html = Html::parse_fragment(
            &Alert::error("Dashboard unavailable", "Restart the server.")
                .into_html()
                .into_string(),
        );

        let alert = html
            .select(&Selector::parse("div[role='alert']").unwrap())
            .next()
            .expect("No alert found");
        let text: String = alert.text().collect();
        assert!(text.contains("Dashboard unavailable"));
        assert!(text.contains("Restart the server."));
    }
}
