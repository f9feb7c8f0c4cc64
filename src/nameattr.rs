//! Per-function SVG attribute overrides.
//!
//! Each line of a name-attribute file is `funcname<TAB>key=value<TAB>key=value...`.
//! The attributes are merged into the group element of every frame with that
//! name, e.g. to replace its tooltip or turn it into a hyperlink.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{FlameError, Result};

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NameAttrs(HashMap<String, Attributes>);

impl NameAttrs {
    pub fn parse(text: &str) -> Result<Self> {
        let mut attrs = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let (func, rest) = line.split_once('\t').ok_or_else(|| {
                FlameError::InvalidConfig(format!(
                    "name attribute line {} has no attributes",
                    lineno + 1
                ))
            })?;

            let bag = rest
                .split('\t')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            attrs.insert(func.to_string(), bag);
        }
        Ok(NameAttrs(attrs))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FlameError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn get(&self, func: &str) -> Option<&Attributes> {
        self.0.get(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse() {
        let attrs = NameAttrs::parse(
            "main\ttitle=entry point\thref=http://example.com/?a=b\nfoo\tclass=hot\n",
        )
        .unwrap();

        let main = attrs.get("main").unwrap();
        assert_eq!(main.get("title").unwrap(), "entry point");
        assert_eq!(main.get("href").unwrap(), "http://example.com/?a=b");
        assert_eq!(attrs.get("foo").unwrap().get("class").unwrap(), "hot");
        assert!(attrs.get("bar").is_none());
    }

    #[test]
    fn test_missing_attributes_is_an_error() {
        assert!(matches!(
            NameAttrs::parse("lonely\n"),
            Err(FlameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "f\ttitle=custom").unwrap();
        let attrs = NameAttrs::load(file.path()).unwrap();
        assert_eq!(attrs.get("f").unwrap().get("title").unwrap(), "custom");

        let missing = NameAttrs::load(Path::new("/nonexistent/attrs.tsv"));
        assert!(matches!(missing, Err(FlameError::IoFailure { .. })));
    }
}
