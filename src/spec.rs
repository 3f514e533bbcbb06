//! Print requests.
//!
//! A request is a JSON object. Keys at the root apply to the whole document;
//! each entry of the optional `pages` array adds page-level values that take
//! precedence over the root ones:
//!
//! ```json
//! {
//!   "layout": "A4 portrait",
//!   "units": "m",
//!   "dpi": 150,
//!   "title": "Harbour survey",
//!   "layers": [{ "name": "base", "source": "base.png" }],
//!   "pages": [{ "center": [5, 10], "scale": 1000 }]
//! }
//! ```
//!
//! Without `pages` the root object itself describes the single page.

use crate::error::PrintError;
use crate::transform::{UnitSystem, ViewRequest};
use log::debug;
use mapsheet_traits::LayerSpec;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct PrintSpec {
    root: Map<String, Value>,
}

impl PrintSpec {
    pub fn parse(json: &str) -> Result<Self, PrintError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PrintError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(PrintError::invalid("spec", format!("expected an object, got {}", other))),
        }
    }

    fn root_params(&self) -> PageParams<'_> {
        PageParams {
            page: None,
            root: &self.root,
        }
    }

    /// Name of the requested layout, if any.
    pub fn layout(&self) -> Result<Option<String>, PrintError> {
        self.root_params().string("layout")
    }

    pub fn units(&self) -> Result<Option<UnitSystem>, PrintError> {
        self.root_params()
            .string("units")?
            .map(|units| units.parse::<UnitSystem>())
            .transpose()
    }

    /// The document-wide DPI.
    pub fn dpi(&self) -> Result<Option<u32>, PrintError> {
        self.root_params().u32("dpi")
    }

    /// Parameters of every page, in order.
    pub fn pages(&self) -> Result<Vec<PageParams<'_>>, PrintError> {
        let Some(pages) = self.root.get("pages").filter(|v| !v.is_null()) else {
            return Ok(vec![self.root_params()]);
        };
        let Value::Array(pages) = pages else {
            return Err(PrintError::invalid("pages", pages));
        };
        if pages.is_empty() {
            return Err(PrintError::invalid("pages", "[]"));
        }
        pages
            .iter()
            .map(|page| match page {
                Value::Object(page) => Ok(PageParams {
                    page: Some(page),
                    root: &self.root,
                }),
                other => Err(PrintError::invalid("pages", other)),
            })
            .collect()
    }
}

/// The parameters visible to the blocks of one page: page values first,
/// then root values.
#[derive(Debug, Clone, Copy)]
pub struct PageParams<'a> {
    page: Option<&'a Map<String, Value>>,
    root: &'a Map<String, Value>,
}

impl<'a> PageParams<'a> {
    /// Look `key` up on the page, then on the root. `null` counts as unset.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.page
            .and_then(|page| page.get(key))
            .filter(|v| !v.is_null())
            .or_else(|| self.root.get(key).filter(|v| !v.is_null()))
    }

    /// Look `key` up on the page only (the root when there are no pages).
    pub fn local(&self, key: &str) -> Option<&'a Value> {
        self.page
            .unwrap_or(self.root)
            .get(key)
            .filter(|v| !v.is_null())
    }

    pub fn string(&self, key: &str) -> Result<Option<String>, PrintError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(PrintError::invalid(key, other)),
        }
    }

    pub fn f64(&self, key: &str) -> Result<Option<f64>, PrintError> {
        self.get(key).map(|v| number(key, v)).transpose()
    }

    pub fn u32(&self, key: &str) -> Result<Option<u32>, PrintError> {
        self.get(key).map(|v| positive_integer(key, v)).transpose()
    }

    /// `[x, y]`
    pub fn center(&self) -> Result<Option<(f64, f64)>, PrintError> {
        let Some(value) = self.get("center") else {
            return Ok(None);
        };
        match value.as_array().map(Vec::as_slice) {
            Some([x, y]) => Ok(Some((number("center", x)?, number("center", y)?))),
            _ => Err(PrintError::invalid("center", value)),
        }
    }

    /// The view of a map region on this page. The DPI is taken from the page
    /// only so the document-wide DPI stays a fallback.
    pub fn view_request(&self) -> Result<ViewRequest, PrintError> {
        Ok(ViewRequest {
            center: self.center()?,
            scale: self.f64("scale")?,
            dpi: self.local("dpi").map(|v| positive_integer("dpi", v)).transpose()?,
        })
    }

    /// Layers listed under `key`; an absent key yields no layers.
    pub fn layers(&self, key: &str) -> Result<Vec<LayerSpec>, PrintError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| PrintError::invalid(key, e)),
        }
    }

    /// Replace `${name}` references with page or root values.
    ///
    /// Strings are inserted as-is and other values in their JSON form.
    /// Unknown names are left untouched.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            match self.get(name) {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => {
                    debug!("No value for '${{{}}}', leaving it in place", name);
                    out.push_str(&rest[start..start + 2 + end + 1]);
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

fn number(field: &str, value: &Value) -> Result<f64, PrintError> {
    value.as_f64().ok_or_else(|| PrintError::invalid(field, value))
}

fn positive_integer(field: &str, value: &Value) -> Result<u32, PrintError> {
    // Whole floats like 150.0 are accepted
    let n = value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
        .ok_or_else(|| PrintError::invalid(field, value))?;
    u32::try_from(n).map_err(|_| PrintError::invalid(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> PrintSpec {
        PrintSpec::parse(json).unwrap()
    }

    #[test]
    fn root_without_pages_is_one_page() {
        let spec = spec(r#"{"center": [1, 2], "scale": 500}"#);
        let pages = spec.pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].center().unwrap(), Some((1.0, 2.0)));
    }

    #[test]
    fn page_values_shadow_root_values() {
        let spec = spec(r#"{"scale": 500, "title": "Root", "pages": [{"scale": 2000}, {}]}"#);
        let pages = spec.pages().unwrap();
        assert_eq!(pages[0].f64("scale").unwrap(), Some(2000.0));
        assert_eq!(pages[1].f64("scale").unwrap(), Some(500.0));
        assert_eq!(pages[1].string("title").unwrap().as_deref(), Some("Root"));
    }

    #[test]
    fn view_request_takes_dpi_from_page_only() {
        let spec = spec(r#"{"dpi": 150, "pages": [{"center": [5, 10], "scale": 1000}, {"dpi": 300}]}"#);
        let pages = spec.pages().unwrap();

        let first = pages[0].view_request().unwrap();
        assert_eq!(first.center, Some((5.0, 10.0)));
        assert_eq!(first.scale, Some(1000.0));
        assert_eq!(first.dpi, None);
        assert_eq!(pages[1].view_request().unwrap().dpi, Some(300));
        assert_eq!(spec.dpi().unwrap(), Some(150));
    }

    #[test]
    fn null_counts_as_unset() {
        let spec = spec(r#"{"scale": 10, "pages": [{"scale": null}]}"#);
        assert_eq!(spec.pages().unwrap()[0].f64("scale").unwrap(), Some(10.0));
    }

    #[test]
    fn malformed_values_name_their_field() {
        let spec = spec(r#"{"center": "somewhere", "dpi": -3, "scale": "big"}"#);
        let page = spec.pages().unwrap()[0];
        assert!(matches!(page.center(), Err(PrintError::InvalidConfiguration { ref field, .. }) if field == "center"));
        assert!(matches!(page.u32("dpi"), Err(PrintError::InvalidConfiguration { ref field, .. }) if field == "dpi"));
        assert!(matches!(page.f64("scale"), Err(PrintError::InvalidConfiguration { ref field, .. }) if field == "scale"));
    }

    #[test]
    fn whole_float_dpi_is_accepted() {
        let spec = spec(r#"{"dpi": 150.0}"#);
        assert_eq!(spec.dpi().unwrap(), Some(150));
    }

    #[test]
    fn empty_pages_array_is_rejected() {
        assert!(spec(r#"{"pages": []}"#).pages().is_err());
        assert!(PrintSpec::parse("[1, 2]").is_err());
    }

    #[test]
    fn units_are_parsed() {
        assert_eq!(spec(r#"{"units": "ft"}"#).units().unwrap(), Some(UnitSystem::Feet));
        assert_eq!(spec("{}").units().unwrap(), None);
        assert!(spec(r#"{"units": "cubits"}"#).units().is_err());
    }

    #[test]
    fn layers_are_read_with_fallback_to_root() {
        let spec = spec(
            r#"{"layers": [{"name": "base", "source": "base.png", "opacity": 0.5}],
                "pages": [{}, {"layers": [{"name": "ortho"}]}]}"#,
        );
        let pages = spec.pages().unwrap();
        let first = pages[0].layers("layers").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].locator(), "base.png");
        assert_eq!(first[0].opacity, 0.5);
        assert_eq!(pages[1].layers("layers").unwrap()[0].name, "ortho");
        assert!(pages[0].layers("overviewLayers").unwrap().is_empty());
    }

    #[test]
    fn substitute_replaces_known_names() {
        let spec = spec(r#"{"title": "Harbour", "sheet": 3, "pages": [{"title": "Pier"}]}"#);
        let page = spec.pages().unwrap()[0];
        assert_eq!(page.substitute("${title} / sheet ${sheet}"), "Pier / sheet 3");
        assert_eq!(page.substitute("${missing} stays"), "${missing} stays");
        assert_eq!(page.substitute("open ${brace"), "open ${brace");
        assert_eq!(page.substitute("plain"), "plain");
    }
}
