//! Small text helpers shared by the renderer and the color assigner.

/// Annotation suffixes that profilers append to frame names.
const ANNOTATIONS: [&str; 4] = ["_[k]", "_[w]", "_[i]", "_[j]"];

/// Escapes the characters that would break an SVG/XML document.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Removes a trailing `_[k]`, `_[w]`, `_[i]` or `_[j]` annotation, if any.
pub fn strip_annotation(name: &str) -> &str {
    ANNOTATIONS
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Rounds a count to an integer and inserts thousands separators.
pub fn format_count(n: f64) -> String {
    let s = format!("{:.0}", n);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let mut result = String::from(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Truncates `name` to fit in `chars` characters, marking the cut with `..`.
///
/// Returns an empty string when fewer than three characters fit.
pub fn truncate_label(name: &str, chars: usize) -> String {
    if chars < 3 {
        return String::new();
    }
    let len = name.chars().count();
    if len <= chars {
        return name.to_string();
    }
    let mut text: String = name.chars().take(chars - 2).collect();
    text.push_str("..");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1.0), "1");
        assert_eq!(format_count(999.4), "999");
        assert_eq!(format_count(1000.0), "1,000");
        assert_eq!(format_count(23766.0), "23,766");
        assert_eq!(format_count(1000000.0), "1,000,000");
        assert_eq!(format_count(-1234.0), "-1,234");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_annotation() {
        assert_eq!(strip_annotation("do_syscall_[k]"), "do_syscall");
        assert_eq!(strip_annotation("Foo.bar_[j]"), "Foo.bar");
        assert_eq!(strip_annotation("plain"), "plain");
        assert_eq!(strip_annotation("_[k]_mid"), "_[k]_mid");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("main", 10), "main");
        assert_eq!(truncate_label("main", 4), "main");
        assert_eq!(truncate_label("function_name", 6), "func..");
        assert_eq!(truncate_label("function_name", 2), "");
    }
}
