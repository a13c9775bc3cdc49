//! Manuscript checks shipped with the pipeline.
//!
//! Each check is a plain function registered alongside its definition. Checks that inspect a
//! repeated element (links, equations, figures) emit one result per element found, and always at
//! least one result so the report records that the check ran.

mod content;
mod frontmatter;
mod parts;

use super::definition::{Check, CheckDefinition};
use super::options::{CheckOptionDefinition, OptionKind};

pub const TITLE: &str = "title";
pub const AUTHORS: &str = "authors";
pub const KEYWORDS: &str = "keywords";
pub const ABSTRACT: &str = "abstract";
pub const AVAILABILITY: &str = "availability";
pub const DOI: &str = "doi";
pub const LINKS: &str = "links";
pub const MATH: &str = "math";
pub const FIGURES: &str = "figures";

/// The standard catalog, in registration order.
pub fn standard_checks() -> Vec<Check> {
    vec![
        Check::new(
            CheckDefinition::new(
                "title-exists",
                "Title exists",
                "Every submission needs a title for indexing and display.",
                TITLE,
            )
            .with_tags(["frontmatter", "required"]),
            frontmatter::title_exists,
        ),
        Check::new(
            CheckDefinition::new(
                "title-length",
                "Title length",
                "Long titles are truncated in listings and citation exports.",
                TITLE,
            )
            .with_tags(["frontmatter"])
            .with_option(
                CheckOptionDefinition::new(
                    "max",
                    OptionKind::Integer,
                    "Maximum number of characters",
                )
                .with_default(200),
            ),
            frontmatter::title_length,
        ),
        Check::new(
            CheckDefinition::new(
                "authors-exist",
                "Authors listed",
                "Attribution requires at least one author.",
                AUTHORS,
            )
            .with_tags(["frontmatter", "required"]),
            frontmatter::authors_exist,
        ),
        Check::new(
            CheckDefinition::new(
                "authors-have-orcid",
                "Authors have ORCID",
                "Persistent author identifiers disambiguate contributors.",
                AUTHORS,
            )
            .with_tags(["frontmatter", "identifiers"]),
            frontmatter::authors_have_orcid,
        ),
        Check::new(
            CheckDefinition::new(
                "authors-have-affiliations",
                "Authors have affiliations",
                "Affiliations are required by most indexing services.",
                AUTHORS,
            )
            .with_tags(["frontmatter"]),
            frontmatter::authors_have_affiliations,
        ),
        Check::new(
            CheckDefinition::new(
                "authors-corresponding",
                "Corresponding author",
                "Editors need one corresponding author with a contact email.",
                AUTHORS,
            )
            .with_tags(["frontmatter", "required"]),
            frontmatter::authors_corresponding,
        ),
        Check::new(
            CheckDefinition::new(
                "keywords-defined",
                "Keywords defined",
                "Keywords drive discovery and reviewer matching.",
                KEYWORDS,
            )
            .with_tags(["frontmatter"]),
            frontmatter::keywords_defined,
        ),
        Check::new(
            CheckDefinition::new(
                "keywords-length",
                "Keyword count",
                "Keep the keyword list focused.",
                KEYWORDS,
            )
            .with_tags(["frontmatter"])
            .with_option(
                CheckOptionDefinition::new("min", OptionKind::Integer, "Minimum keywords")
                    .with_default(1),
            )
            .with_option(
                CheckOptionDefinition::new("max", OptionKind::Integer, "Maximum keywords")
                    .with_default(8),
            ),
            frontmatter::keywords_length,
        ),
        Check::new(
            CheckDefinition::new(
                "abstract-exists",
                "Abstract exists",
                "An abstract summarises the work for readers and indexes.",
                ABSTRACT,
            )
            .with_tags(["parts", "required"]),
            parts::abstract_exists,
        ),
        Check::new(
            CheckDefinition::new(
                "abstract-length",
                "Abstract length",
                "Abstracts outside the word range are rejected by indexing services.",
                ABSTRACT,
            )
            .with_tags(["parts"])
            .with_option(
                CheckOptionDefinition::new("min", OptionKind::Integer, "Minimum words")
                    .with_default(50),
            )
            .with_option(
                CheckOptionDefinition::new("max", OptionKind::Integer, "Maximum words")
                    .with_default(300),
            ),
            parts::abstract_length,
        ),
        Check::new(
            CheckDefinition::new(
                "data-availability-exists",
                "Data availability statement",
                "Readers must be told where the underlying data can be found.",
                AVAILABILITY,
            )
            .with_tags(["parts", "open-science"]),
            parts::data_availability_exists,
        ),
        Check::new(
            CheckDefinition::new(
                "code-availability-exists",
                "Code availability statement",
                "Readers must be told where analysis code can be found.",
                AVAILABILITY,
            )
            .with_tags(["parts", "open-science"]),
            parts::code_availability_exists,
        ),
        Check::new(
            CheckDefinition::new(
                "doi-exists",
                "DOI present",
                "A well-formed DOI is needed for citation and archiving.",
                DOI,
            )
            .with_tags(["frontmatter", "identifiers"]),
            frontmatter::doi_exists,
        ),
        Check::new(
            CheckDefinition::new(
                "links-valid",
                "Links are well formed",
                "Broken or relative links are unusable outside the site.",
                LINKS,
            )
            .with_tags(["content"])
            .with_option(
                CheckOptionDefinition::new(
                    "require_https",
                    OptionKind::Boolean,
                    "Fail links that do not use https",
                )
                .with_default(false),
            ),
            content::links_valid,
        ),
        Check::new(
            CheckDefinition::new(
                "math-not-empty",
                "Equations are not empty",
                "Empty math blocks usually indicate a conversion error.",
                MATH,
            )
            .with_tags(["content"]),
            content::math_not_empty,
        ),
        Check::new(
            CheckDefinition::new(
                "figures-have-captions",
                "Figures have captions",
                "Captions make figures accessible and citable.",
                FIGURES,
            )
            .with_tags(["content", "accessibility"]),
            content::figures_have_captions,
        ),
    ]
}
