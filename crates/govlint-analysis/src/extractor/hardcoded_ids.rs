//! Quoted literals shaped like 15- or 18-character record ids.

use super::types::HardcodedId;
use super::SourceContext;

/// Literals that have the shape of an id but are placeholders.
const NOT_IDS: &[&str] = &[
    "000000000000000AAA",
    "000000000000000AAC",
    "0000000000000000AA",
    "AAAAAAAAAAAAAAAAAA",
    "xxxxxxxxxxxxxxxxxx",
];

pub(crate) fn extract_hardcoded_ids(ctx: &SourceContext) -> Vec<HardcodedId> {
    ctx.scanner
        .strings()
        .iter()
        .filter(|s| s.terminated)
        .filter_map(|s| {
            let value = s.content(ctx.text);
            looks_like_record_id(value).then(|| HardcodedId {
                value: value.to_string(),
                range: ctx.range(s.span),
                span: s.span,
            })
        })
        .collect()
}

pub fn looks_like_record_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    if !matches!(bytes.len(), 15 | 18) || !bytes.iter().all(u8::is_ascii_alphanumeric) {
        return false;
    }
    if bytes.iter().all(u8::is_ascii_digit) || bytes.iter().all(u8::is_ascii_alphabetic) {
        return false;
    }
    if bytes.iter().all(|&b| b == bytes[0]) {
        return false;
    }
    !NOT_IDS.iter().any(|n| n.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_shapes() {
        assert!(looks_like_record_id("001000000000001AAA"));
        assert!(looks_like_record_id("0015g00000ABCde"));
        assert!(!looks_like_record_id("123456789012345"));
        assert!(!looks_like_record_id("AccountsPayable"));
        assert!(!looks_like_record_id("000000000000000AAA"));
        assert!(!looks_like_record_id("001-00000000001"));
        assert!(!looks_like_record_id("0015g00000ABC"));
    }

    #[test]
    fn only_string_literals_are_checked() {
        let ctx = SourceContext::new(
            "Id a = '001000000000001AAA';\n// '0015g00000ABCde'\nInteger n = 123456789012345;",
        );
        let ids = extract_hardcoded_ids(&ctx);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].value, "001000000000001AAA");
        assert_eq!(ids[0].range.start.line, 0);
    }
}
