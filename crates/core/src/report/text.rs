use regex::Regex;

/// Compiles an extraction pattern. A pattern that fails to compile disables
/// its rule instead of failing the parse.
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::error!(%pattern, error = %err, "invalid extraction pattern; rule disabled");
            None
        }
    }
}

/// Body of the section introduced by `heading`, up to the first match of
/// `stop` or the end of the document.
pub(crate) fn section<'a>(text: &'a str, heading: Option<&Regex>, stop: Option<&Regex>) -> Option<&'a str> {
    let start = heading?.find(text)?.end();
    let rest = &text[start..];
    let end = stop
        .and_then(|re| re.find(rest))
        .map_or(rest.len(), |m| m.start());
    Some(&rest[..end])
}
