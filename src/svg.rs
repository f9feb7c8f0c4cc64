//! A minimal SVG writer: the primitives the flame graph renderer needs.

use std::fmt::Write;

use crate::color::Rgb;
use crate::flgutils::escape_xml;
use crate::nameattr::Attributes;

/// Attributes that shape the group element itself rather than being copied onto it.
const GROUP_CONTROL: [&str; 5] = ["title", "href", "target", "a_extra", "g_extra"];

/// Whether `key` can be written as an attribute name.
fn is_xml_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// Document-level settings for [`SvgCanvas::new`].
#[derive(Debug, Clone)]
pub struct Header<'a> {
    pub width: f64,
    pub height: f64,
    pub encoding: Option<&'a str>,
    pub notes: &'a str,
    pub font_type: &'a str,
    pub font_size: f64,
    pub background: (&'a str, &'a str),
}

pub struct SvgCanvas {
    svg: String,
}

impl SvgCanvas {
    /// Starts a document with the XML prolog, gradient definition and styles.
    pub fn new(header: &Header<'_>) -> Self {
        let mut svg = String::with_capacity(256 * 1024);
        let encoding = header
            .encoding
            .map(|e| format!(r#" encoding="{}""#, escape_xml(e)))
            .unwrap_or_default();
        let Header {
            width,
            height,
            notes,
            font_type,
            font_size,
            ..
        } = *header;
        let (bg1, bg2) = header.background;
        let title_size = font_size + 5.0;

        // Writing into a String never fails.
        let _ = write!(
            svg,
            r##"<?xml version="1.0"{encoding} standalone="no"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg version="1.1" width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
<!-- Flame graph stack visualization. -->
<!-- NOTES: {notes} -->
<defs>
	<linearGradient id="background" y1="0" y2="1" x1="0" x2="0" >
		<stop stop-color="{bg1}" offset="5%" />
		<stop stop-color="{bg2}" offset="95%" />
	</linearGradient>
</defs>
<style type="text/css">
	text {{ font-family:{font_type}; font-size:{font_size}px; fill:rgb(0,0,0); }}
	#search, #ignorecase {{ opacity:0.1; cursor:pointer; }}
	#search:hover, #search.show, #ignorecase:hover, #ignorecase.show {{ opacity:1; }}
	#subtitle {{ text-anchor:middle; font-color:rgb(160,160,160); }}
	#title {{ text-anchor:middle; font-size:{title_size}px}}
	#unzoom {{ cursor:pointer; }}
	#frames > *:hover {{ stroke:black; stroke-width:0.5; cursor:pointer; }}
	.hide {{ display:none; }}
	.parent {{ opacity:0.5; }}
</style>
"##,
            font_type = escape_xml(font_type),
        );
        SvgCanvas { svg }
    }

    pub fn filled_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, fill: &str, extra: &str) {
        let _ = writeln!(
            self.svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" {}/>"#,
            x1,
            y1,
            x2 - x1,
            y2 - y1,
            fill,
            extra
        );
    }

    pub fn frame_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb) {
        self.filled_rect(x1, y1, x2, y2, &color.to_string(), r#"rx="2" ry="2" "#);
    }

    /// Writes a text element. `text` is escaped here.
    pub fn text(&mut self, id: Option<&str>, x: f64, y: f64, text: &str, extra: &str) {
        let id = id.map(|id| format!(r#"id="{id}" "#)).unwrap_or_default();
        let _ = writeln!(
            self.svg,
            r#"<text {}x="{:.2}" y="{:.2}" {}>{}</text>"#,
            id,
            x,
            y,
            extra,
            escape_xml(text)
        );
    }

    pub fn raw(&mut self, markup: &str) {
        self.svg.push_str(markup);
    }

    /// Opens a frame group; an `href` attribute turns it into a link.
    pub fn group_start(&mut self, attrs: &Attributes) {
        let mut g_attr: Vec<String> = attrs
            .iter()
            .filter(|(k, _)| !GROUP_CONTROL.contains(&k.as_str()) && is_xml_name(k))
            .map(|(k, v)| format!(r#"{}="{}""#, k, escape_xml(v)))
            .collect();
        if let Some(extra) = attrs.get("g_extra") {
            g_attr.push(extra.clone());
        }

        match attrs.get("href") {
            Some(href) => {
                let mut a_attr = vec![
                    format!(r#"xlink:href="{}""#, escape_xml(href)),
                    format!(
                        r#"target="{}""#,
                        escape_xml(attrs.get("target").map_or("_top", String::as_str))
                    ),
                ];
                if let Some(extra) = attrs.get("a_extra") {
                    a_attr.push(extra.clone());
                }
                a_attr.extend(g_attr);
                let _ = writeln!(self.svg, "<a {}>", a_attr.join(" "));
            }
            None if g_attr.is_empty() => self.svg.push_str("<g>\n"),
            None => {
                let _ = writeln!(self.svg, "<g {}>", g_attr.join(" "));
            }
        }

        if let Some(title) = attrs.get("title") {
            let _ = write!(self.svg, "<title>{}</title>", escape_xml(title));
        }
    }

    pub fn group_end(&mut self, attrs: &Attributes) {
        if attrs.contains_key("href") {
            self.svg.push_str("</a>\n");
        } else {
            self.svg.push_str("</g>\n");
        }
    }

    pub fn finish(mut self) -> String {
        self.svg.push_str("</svg>\n");
        self.svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header<'static> {
        Header {
            width: 100.0,
            height: 50.0,
            encoding: None,
            notes: "",
            font_type: "Verdana",
            font_size: 12.0,
            background: ("#eeeeee", "#eeeeb0"),
        }
    }

    #[test]
    fn test_document_frame() {
        let svg = SvgCanvas::new(&header()).finish();
        assert!(svg.starts_with(r#"<?xml version="1.0" standalone="no"?>"#));
        assert!(svg.contains(r#"width="100" height="50""#));
        assert!(svg.contains(r##"<stop stop-color="#eeeeb0" offset="95%" />"##));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_encoding_attribute() {
        let header = Header {
            encoding: Some("ISO-8859-1"),
            ..header()
        };
        let svg = SvgCanvas::new(&header).finish();
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1" standalone="no"?>"#));
    }

    #[test]
    fn test_rect_and_text() {
        let mut canvas = SvgCanvas::new(&header());
        canvas.frame_rect(10.0, 20.0, 30.5, 35.0, Rgb::new(1, 2, 3));
        canvas.text(Some("title"), 50.0, 24.0, "a < b", "");
        let svg = canvas.finish();
        assert!(svg.contains(
            r#"<rect x="10.0" y="20.0" width="20.5" height="15.0" fill="rgb(1,2,3)" rx="2" ry="2" />"#
        ));
        assert!(svg.contains(r#"<text id="title" x="50.00" y="24.00" >a &lt; b</text>"#));
    }

    #[test]
    fn test_plain_group() {
        let mut canvas = SvgCanvas::new(&header());
        let mut attrs = Attributes::new();
        attrs.insert("title".to_string(), "main (1 samples, 100.00%)".to_string());
        attrs.insert("class".to_string(), "func_g".to_string());
        canvas.group_start(&attrs);
        canvas.group_end(&attrs);
        let svg = canvas.finish();
        assert!(svg.contains("<g class=\"func_g\">\n<title>main (1 samples, 100.00%)</title></g>\n"));
    }

    #[test]
    fn test_link_group() {
        let mut canvas = SvgCanvas::new(&header());
        let mut attrs = Attributes::new();
        attrs.insert("href".to_string(), "http://x/?a=1&b=2".to_string());
        canvas.group_start(&attrs);
        canvas.group_end(&attrs);
        let svg = canvas.finish();
        assert!(svg.contains("<a xlink:href=\"http://x/?a=1&amp;b=2\" target=\"_top\">\n</a>\n"));
    }

    #[test]
    fn test_group_skips_unusable_keys() {
        let mut canvas = SvgCanvas::new(&header());
        let mut attrs = Attributes::new();
        attrs.insert("class".to_string(), "hot".to_string());
        attrs.insert("bad key".to_string(), "x".to_string());
        attrs.insert("a\"b".to_string(), "x".to_string());
        attrs.insert("1st".to_string(), "x".to_string());
        attrs.insert("data-id".to_string(), "7".to_string());
        canvas.group_start(&attrs);
        canvas.group_end(&attrs);
        let svg = canvas.finish();
        assert!(svg.contains("<g class=\"hot\" data-id=\"7\">\n</g>\n"));
    }

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name("class"));
        assert!(is_xml_name("xml:lang"));
        assert!(is_xml_name("_private.v2"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("-x"));
        assert!(!is_xml_name("on click"));
        assert!(!is_xml_name("x=\"y\""));
    }
}
