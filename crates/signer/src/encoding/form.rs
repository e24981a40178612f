use url::form_urlencoded;

/// Encodes `key=value` pairs as `application/x-www-form-urlencoded`.
pub fn encode_form<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
