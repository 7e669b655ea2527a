// Structural validation of an extracted document before it is trusted.
// Applied between extract_document() and envelope construction.
// Rejects only clearly broken output; deeper problems become warnings.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::schema::SectionKind;
use super::types::{Brand, Page, PaletteEntry, Section, SiteSpecification};
use super::GenerationError;

/// A specification that passed the structural checks, plus advisory findings.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub spec: SiteSpecification,
    pub warnings: Vec<String>,
}

/// Validate and re-type a parsed document.
///
/// Checks, in order: `templateSlug` present and a non-empty string, `pages`
/// present, `pages` an array. Empty `pages`, unknown section kinds and
/// duplicate slugs or ids are reported as warnings and never reject.
pub fn validate_specification(
    doc: Map<String, Value>,
) -> Result<ValidationResult, GenerationError> {
    let template_slug = match doc.get("templateSlug") {
        Some(Value::String(slug)) if !slug.trim().is_empty() => slug.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(GenerationError::Schema("templateSlug is required".into()))
        }
        Some(_) => {
            return Err(GenerationError::Schema("templateSlug must be a string".into()))
        }
    };

    let raw_pages = match doc.get("pages") {
        None | Some(Value::Null) => {
            return Err(GenerationError::Schema("pages is required".into()))
        }
        Some(Value::Array(pages)) => pages,
        Some(_) => return Err(GenerationError::Schema("pages must be an array".into())),
    };

    let mut warnings = Vec::new();

    let brand = parse_brand(doc.get("brand"), &mut warnings);

    let pages: Vec<Page> = raw_pages
        .iter()
        .enumerate()
        .filter_map(|(index, value)| parse_page(index, value, &mut warnings))
        .collect();

    check_pages(&pages, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            template = %template_slug,
            warning_count = warnings.len(),
            "Site specification validation warnings"
        );
    }

    Ok(ValidationResult {
        spec: SiteSpecification {
            template_slug,
            brand,
            pages,
        },
        warnings,
    })
}

/// Re-type the brand block. Scalar fields are coerced to strings; only a
/// non-object brand or palette entry is dropped.
fn parse_brand(value: Option<&Value>, warnings: &mut Vec<String>) -> Brand {
    let obj = match value {
        None | Some(Value::Null) => return Brand::default(),
        Some(Value::Object(obj)) => obj,
        Some(_) => {
            warnings.push("brand is not an object; using empty brand".to_string());
            return Brand::default();
        }
    };

    let palette = match obj.get("palette") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(pos, item)| match item.as_object() {
                Some(entry) => Some(PaletteEntry {
                    name: string_field(entry, "name", warnings, || format!("brand.palette[{pos}].name")),
                    value: string_field(entry, "value", warnings, || format!("brand.palette[{pos}].value")),
                }),
                None => {
                    warnings.push(format!("brand.palette[{pos}] is not an object; skipped"));
                    None
                }
            })
            .collect(),
        Some(_) => {
            warnings.push("brand.palette is not an array; ignored".to_string());
            Vec::new()
        }
    };

    Brand {
        name: string_field(obj, "name", warnings, || "brand.name".to_string()),
        description: string_field(obj, "description", warnings, || "brand.description".to_string()),
        palette,
    }
}

/// Re-type one page leniently: only a non-object page or section is
/// skipped. Scalar fields of any JSON type are kept as strings.
fn parse_page(index: usize, value: &Value, warnings: &mut Vec<String>) -> Option<Page> {
    let Some(obj) = value.as_object() else {
        warnings.push(format!("pages[{index}] is not an object; skipped"));
        return None;
    };

    let sections = match obj.get("sections") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(pos, item)| parse_section(index, pos, item, warnings))
            .collect(),
        Some(_) => {
            warnings.push(format!("pages[{index}].sections is not an array; ignored"));
            Vec::new()
        }
    };

    Some(Page {
        slug: string_field(obj, "slug", warnings, || format!("pages[{index}].slug")),
        title: string_field(obj, "title", warnings, || format!("pages[{index}].title")),
        sections,
    })
}

fn parse_section(
    page: usize,
    pos: usize,
    value: &Value,
    warnings: &mut Vec<String>,
) -> Option<Section> {
    let path = format!("pages[{page}].sections[{pos}]");
    let Some(obj) = value.as_object() else {
        warnings.push(format!("{path} is not an object; skipped"));
        return None;
    };

    let props = match obj.get("props") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(props)) => props.clone(),
        Some(_) => {
            warnings.push(format!("{path}.props is not an object; ignored"));
            Map::new()
        }
    };

    Some(Section {
        id: string_field(obj, "id", warnings, || format!("{path}.id")),
        kind: SectionKind::from(string_field(obj, "kind", warnings, || format!("{path}.kind"))),
        props,
    })
}

/// Read a scalar field as a string. Numbers and booleans keep their JSON
/// text; a missing field is empty; an object or array is dropped with a
/// warning.
fn string_field(
    obj: &Map<String, Value>,
    key: &str,
    warnings: &mut Vec<String>,
    path: impl FnOnce() -> String,
) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(_) => {
            warnings.push(format!("{} is not a scalar; ignored", path()));
            String::new()
        }
    }
}

/// Advisory checks that the model is asked to honour but which are not enforced.
fn check_pages(pages: &[Page], warnings: &mut Vec<String>) {
    if pages.is_empty() {
        warnings.push("pages is empty".to_string());
    }

    let mut slugs = HashSet::new();
    for page in pages {
        if !slugs.insert(page.slug.as_str()) {
            warnings.push(format!("Duplicate page slug '{}'", page.slug));
        }

        let mut ids = HashSet::new();
        for section in &page.sections {
            if !section.kind.is_known() {
                warnings.push(format!(
                    "Unknown section kind '{}' on page '{}'",
                    section.kind, page.slug
                ));
            }
            if !section.id.is_empty() && !ids.insert(section.id.as_str()) {
                warnings.push(format!(
                    "Duplicate section id '{}' on page '{}'",
                    section.id, page.slug
                ));
            }
        }
    }
}
