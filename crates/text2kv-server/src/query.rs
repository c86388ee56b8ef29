/// The query parameters a request can carry.
///
/// Each holds the first occurrence of its key; later repeats are ignored.
/// Values are form-decoded, so a literal `+` arrives as a space.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub token: Option<String>,
    pub text: Option<String>,
    pub b64: Option<String>,
}

impl RequestParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "token" => &mut params.token,
                "text" => &mut params.text,
                "b64" => &mut params.b64,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}
