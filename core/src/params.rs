//! Reading the user id from the page address.
//!
//! The caller passes the address (or just its query string) in; nothing here
//! reaches for ambient page state. The value is taken as given: there is no
//! check that it belongs to a signed-in user.

use url::{form_urlencoded, Url};

pub const USER_ID_PARAM: &str = "userId";

/// First non-empty value of `name` in a query string. A leading `?` is
/// ignored.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub fn user_id_from_query(query: &str) -> Option<String> {
    query_param(query, USER_ID_PARAM)
}

/// User id carried by a full page address.
pub fn user_id_from_url(address: &str) -> Result<Option<String>, url::ParseError> {
    let url = Url::parse(address)?;
    Ok(url.query().and_then(user_id_from_query))
}
