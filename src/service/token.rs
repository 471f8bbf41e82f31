use std::sync::{Arc, RwLock};

/// The address of the page the curation gestures happen on.
///
/// The service token travels in the page's query string. It is looked up on
/// every request and never cached, so navigating (see [`PageLocation::navigate`])
/// takes effect on the next call.
#[derive(Clone, Debug)]
pub struct PageLocation {
    href: Arc<RwLock<String>>,
}

impl PageLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Arc::new(RwLock::new(href.into())),
        }
    }

    /// Builds a location carrying only a token, for callers that were handed
    /// the token directly instead of a page URL.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        match reqwest::Url::parse(base_url) {
            Ok(mut url) => {
                url.query_pairs_mut().clear().append_pair("token", token);
                Self::new(url.to_string())
            }
            Err(_) => Self::new(
                encode_token(token)
                    .map(|query| format!("?{query}"))
                    .unwrap_or_default(),
            ),
        }
    }

    pub fn href(&self) -> String {
        match self.href.read() {
            Ok(href) => href.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn navigate(&self, href: impl Into<String>) {
        let href = href.into();
        match self.href.write() {
            Ok(mut current) => *current = href,
            Err(poisoned) => *poisoned.into_inner() = href,
        }
    }

    /// Reads `token` from the current query string.
    pub fn token(&self) -> Option<String> {
        query_param(&self.href(), "token")
    }
}

fn encode_token(token: &str) -> Option<String> {
    let mut url = reqwest::Url::parse("http://page.invalid/").ok()?;
    url.query_pairs_mut().append_pair("token", token);
    url.query().map(str::to_string)
}

fn query_param(href: &str, key: &str) -> Option<String> {
    let query = match href.split_once('?') {
        Some((_, rest)) => rest,
        None => return None,
    };
    let query = query.split('#').next().unwrap_or_default();
    // A relative base is enough to reuse the URL parser's form decoding.
    let url = reqwest::Url::parse(&format!("http://page.invalid/?{query}")).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
