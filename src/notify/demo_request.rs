use serde::{Deserialize, Serialize};

/// Someone asked for a product demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
}

impl DemoRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            country: country.into(),
        }
    }

    /// Renders the HTML-mode chat message.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "<b>New demo request</b>\n\nName: {}\nEmail: {}\nPhone: {}\nCountry: {}",
            escape_html(&self.name),
            escape_html(&self.email),
            escape_html(&self.phone),
            escape_html(&self.country),
        )
    }
}

// Telegram's HTML mode only requires these three.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}
