//! Section schema registry: the closed set of renderable section kinds and
//! the props each kind is expected to carry.
//!
//! Props are documented here and embedded in the model instructions, but they
//! are not mechanically checked. The renderer owns deep prop validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A renderable block type.
///
/// Model output is untrusted, so a kind outside the known set is kept as
/// `Other` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Hero,
    Features,
    Cta,
    Pricing,
    Testimonials,
    Contact,
    Footer,
    Other(String),
}

impl SectionKind {
    /// Every known kind, in the order they are presented to the model.
    pub const KNOWN: [SectionKind; 7] = [
        SectionKind::Hero,
        SectionKind::Features,
        SectionKind::Cta,
        SectionKind::Pricing,
        SectionKind::Testimonials,
        SectionKind::Contact,
        SectionKind::Footer,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::Features => "features",
            SectionKind::Cta => "cta",
            SectionKind::Pricing => "pricing",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Contact => "contact",
            SectionKind::Footer => "footer",
            SectionKind::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SectionKind::Other(_))
    }
}

impl From<String> for SectionKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "hero" => SectionKind::Hero,
            "features" => SectionKind::Features,
            "cta" => SectionKind::Cta,
            "pricing" => SectionKind::Pricing,
            "testimonials" => SectionKind::Testimonials,
            "contact" => SectionKind::Contact,
            "footer" => SectionKind::Footer,
            _ => SectionKind::Other(raw),
        }
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Documented prop contract for one section kind.
#[derive(Debug, Clone, Copy)]
pub struct SectionContract {
    pub kind: &'static str,
    pub purpose: &'static str,
    /// `(prop name, shape description)` pairs.
    pub props: &'static [(&'static str, &'static str)],
}

const SECTION_CONTRACTS: [SectionContract; 7] = [
    SectionContract {
        kind: "hero",
        purpose: "Top-of-page banner with the main value proposition",
        props: &[
            ("title", "string"),
            ("subtitle", "string"),
            ("ctaText", "string"),
            ("ctaHref", "string"),
        ],
    },
    SectionContract {
        kind: "features",
        purpose: "Grid of product or service highlights",
        props: &[
            ("title", "string"),
            ("items", "array of { title: string, description: string, icon: string }"),
        ],
    },
    SectionContract {
        kind: "cta",
        purpose: "Call-to-action strip",
        props: &[
            ("title", "string"),
            ("description", "string"),
            ("buttonText", "string"),
            ("buttonHref", "string"),
        ],
    },
    SectionContract {
        kind: "pricing",
        purpose: "Plan comparison",
        props: &[
            ("title", "string"),
            (
                "plans",
                "array of { name: string, price: string, period: string, features: string[], highlighted: boolean }",
            ),
        ],
    },
    SectionContract {
        kind: "testimonials",
        purpose: "Customer quotes",
        props: &[
            ("title", "string"),
            ("items", "array of { quote: string, author: string, role: string }"),
        ],
    },
    SectionContract {
        kind: "contact",
        purpose: "Contact details and inquiry prompt",
        props: &[
            ("title", "string"),
            ("description", "string"),
            ("email", "string"),
            ("phone", "string"),
        ],
    },
    SectionContract {
        kind: "footer",
        purpose: "Site footer",
        props: &[
            ("companyName", "string"),
            ("links", "array of { label: string, href: string }"),
            ("copyright", "string"),
        ],
    },
];

/// All section contracts, one per known kind, in `SectionKind::KNOWN` order.
pub fn section_contracts() -> &'static [SectionContract] {
    &SECTION_CONTRACTS
}

/// Look up the contract for a kind. `None` for unknown kinds.
pub fn contract_for(kind: &SectionKind) -> Option<&'static SectionContract> {
    SECTION_CONTRACTS.iter().find(|c| c.kind == kind.as_str())
}

/// Render the full document contract as instruction text.
pub fn render_schema_contract() -> String {
    let kinds = SectionKind::KNOWN
        .iter()
        .map(|k| format!("\"{}\"", k.as_str()))
        .collect::<Vec<_>>()
        .join(" | ");

    let mut out = format!(
        r##"{{
  "templateSlug": "string",
  "brand": {{
    "name": "string",
    "description": "string",
    "palette": [{{ "name": "string", "value": "#RRGGBB" }}]
  }},
  "pages": [
    {{
      "slug": "string",
      "title": "string",
      "sections": [
        {{ "id": "string", "kind": {kinds}, "props": {{ }} }}
      ]
    }}
  ]
}}

Section props by kind:
"##
    );

    for contract in section_contracts() {
        let props = contract
            .props
            .iter()
            .map(|(name, shape)| format!("{name}: {shape}"))
            .collect::<Vec<_>>()
            .join("; ");
        out.push_str(&format!(
            "- {} ({}): {}\n",
            contract.kind, contract.purpose, props
        ));
    }

    out
}
