//! Resolves `:emoji:` icons to the image the chat server serves for them.

use reqwest::Url;

use crate::error::{Error, Result};

/// Codepoint file stem the chat server uses for a short name, e.g. `angry` → `1f620`
/// and `us` → `1f1fa-1f1f8`. Variation selectors are not part of the file name.
pub fn codepoint(name: &str) -> Option<String> {
    let emoji = emojis::get_by_shortcode(name)?;
    let code = emoji
        .as_str()
        .chars()
        .filter(|&c| c != '\u{fe0f}')
        .map(|c| format!("{:x}", u32::from(c)))
        .collect::<Vec<_>>()
        .join("-");
    Some(code)
}

/// Turns a configured icon into an `icon_url`.
///
/// `:name:` is looked up and served from the webhook's host; anything else is
/// taken as a URL already.
pub fn icon_url(icon: &str, webhook_url: &str) -> Result<String> {
    let Some(name) = icon
        .strip_prefix(':')
        .and_then(|rest| rest.strip_suffix(':'))
        .filter(|name| !name.is_empty())
    else {
        return Ok(icon.to_string());
    };

    let code = codepoint(name).ok_or_else(|| Error::Config(format!("unknown emoji '{icon}'")))?;
    let mut url = Url::parse(webhook_url)
        .map_err(|e| Error::Config(format!("invalid webhook URL '{webhook_url}': {e}")))?;
    url.set_path(&format!("/static/emoji/{code}.png"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.into())
}
