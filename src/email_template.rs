use crate::domain::EnrichedWord;
use askama::Template;

/// The daily words email, ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Template)]
#[template(path = "daily_words.html")]
struct DailyWordsHtml<'a> {
    first: &'a EnrichedWord,
    second: &'a EnrichedWord,
    unsubscribe_url: &'a str,
}

#[derive(Template)]
#[template(path = "daily_words.txt")]
struct DailyWordsText<'a> {
    first: &'a EnrichedWord,
    second: &'a EnrichedWord,
    unsubscribe_url: &'a str,
}

/// Render the daily words email for two enriched words. Generated text is
/// HTML-escaped in the HTML body, empty fields render as empty text.
pub fn render_daily_words(
    first: &EnrichedWord,
    second: &EnrichedWord,
    subject: &str,
    unsubscribe_url: &str,
) -> Result<RenderedEmail, askama::Error> {
    let html_body = DailyWordsHtml {
        first,
        second,
        unsubscribe_url,
    }
    .render()?;
    let text_body = DailyWordsText {
        first,
        second,
        unsubscribe_url,
    }
    .render()?;

    Ok(RenderedEmail {
        subject: subject.to_string(),
        html_body,
        text_body,
    })
}
