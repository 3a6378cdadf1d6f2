use url::form_urlencoded::byte_serialize;

/// Filter applied to anonymous listings: only servers that can run locally.
pub const LOCAL_ONLY_FILTER: &str = "is:local";

/// Marks `encodeURIComponent` leaves alone but form encoding escapes.
const URI_COMPONENT_MARKS: [(&str, &str); 5] =
    [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%7E", "~")];

/// URL-encodes free text like `encodeURIComponent`, with spaces as `+`.
pub fn encode_search_text(text: &str) -> String {
    let encoded: String = byte_serialize(text.trim().as_bytes()).collect();
    URI_COMPONENT_MARKS
        .iter()
        .fold(encoded, |acc, (escaped, mark)| acc.replace(escaped, mark))
}

/// The `q` value: the implicit filter and the encoded text, joined by `+`.
///
/// Terms are not re-encoded, so `is:local` keeps its colon and the joiner stays a literal `+`.
pub fn search_terms(filter: Option<&str>, text: Option<&str>) -> String {
    let text = text.map(encode_search_text).filter(|t| !t.is_empty());
    filter
        .map(str::to_string)
        .into_iter()
        .chain(text)
        .collect::<Vec<_>>()
        .join("+")
}

/// Query string for a listing; `q` is omitted when there is nothing to filter on.
pub(crate) fn listing_query(terms: &str, page_size: u32, page: u32) -> String {
    let paging = format!("pageSize={page_size}&page={page}");
    if terms.is_empty() {
        paging
    } else {
        format!("q={terms}&{paging}")
    }
}
