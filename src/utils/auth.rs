//! Request headers for the completion endpoint
//!
//! Besides the bearer credential, the hosted router expects two attribution
//! headers identifying the calling application.

/// Add the bearer credential and the attribution headers to an HTTP request
///
/// # Arguments
/// * `request` - The reqwest RequestBuilder to add headers to
/// * `api_key` - The bearer credential
/// * `referer` - Value for `HTTP-Referer`
/// * `title` - Value for `X-Title`
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    api_key: &str,
    referer: &str,
    title: &str,
) -> reqwest::RequestBuilder {
    request
        .header("Authorization", format!("Bearer {api_key}"))
        .header("HTTP-Referer", referer)
        .header("X-Title", title)
}
