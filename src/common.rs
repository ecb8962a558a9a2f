//! Supporting utilities.

/// Convert a `snake_case` column name into `camelCase`.
///
/// Underscores are dropped and the following character is uppercased.
/// Anything else passes through untouched, so names like `"?column?"`
/// come back as-is.
pub(crate) fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn camel_casing() {
        assert_eq!(snake_to_camel("user_id"), "userId");
        assert_eq!(snake_to_camel("created_at_ts"), "createdAtTs");
        assert_eq!(snake_to_camel("id"), "id");
        assert_eq!(snake_to_camel("?column?"), "?column?");
        assert_eq!(snake_to_camel(""), "");
    }
}
