use anyhow::Result;
use quick_xml::events::BytesStart;

/// Strip any namespace qualifier from an XML tag name.
///
/// CFU producers bind the schema namespace inconsistently (or not at all),
/// so element matching is done on the local name only. Handles both the
/// `{uri}Tag` convention and the `prefix:Tag` form the streaming reader
/// reports; anything else is returned unchanged.
pub fn local_name(tag: &str) -> &str {
    if let Some(rest) = tag.strip_prefix('{') {
        return match rest.split_once('}') {
            Some((_, local)) => local,
            None => tag,
        };
    }
    match tag.rsplit_once(':') {
        Some((_, local)) => local,
        None => tag,
    }
}

/// Unescaped value of the named attribute, if present on the element.
pub fn attr_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
