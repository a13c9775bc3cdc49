use std::sync::OnceLock;

use regex::Regex;

use crate::checks::definition::{CheckFailure, RawCheckResult};
use crate::checks::options::CheckOptions;
use crate::document::ResolvedDocument;

type Outcome = Result<Vec<RawCheckResult>, CheckFailure>;

const DOI_PATTERN: &str = r"^10\.\d{4,9}/\S+$";
const ORCID_PATTERN: &str = r"^(https://orcid\.org/)?\d{4}-\d{4}-\d{4}-\d{3}[\dX]$";

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex, CheckFailure> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|err| CheckFailure::message(format!("invalid pattern {pattern}: {err}")))
}

fn doi_regex() -> Result<&'static Regex, CheckFailure> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&CELL, DOI_PATTERN)
}

fn orcid_regex() -> Result<&'static Regex, CheckFailure> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&CELL, ORCID_PATTERN)
}

pub(super) fn bounded_option(
    options: &CheckOptions,
    id: &str,
) -> Result<Option<usize>, CheckFailure> {
    match options.integer(id) {
        None => Ok(None),
        Some(value) => usize::try_from(value)
            .map(Some)
            .map_err(|_| CheckFailure::InvalidOption {
                option: id.to_string(),
                reason: format!("must not be negative, found {value}"),
            }),
    }
}

pub(super) fn title_exists(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let result = match document.frontmatter.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => RawCheckResult::pass("title is defined"),
        _ => RawCheckResult::fail("title is missing")
            .with_help("add a `title` to the frontmatter"),
    };
    Ok(vec![result])
}

pub(super) fn title_length(document: &ResolvedDocument, options: &CheckOptions) -> Outcome {
    let max = bounded_option(options, "max")?.unwrap_or(200);
    let Some(title) = document.frontmatter.title.as_deref() else {
        return Ok(vec![RawCheckResult::fail("title is missing")]);
    };

    let length = title.trim().chars().count();
    let result = if length <= max {
        RawCheckResult::pass(format!("title has {length} characters"))
    } else {
        RawCheckResult::fail(format!("title has {length} characters, limit is {max}"))
            .with_help("shorten the title or move detail into a subtitle")
    };
    Ok(vec![result])
}

pub(super) fn authors_exist(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let count = document
        .frontmatter
        .authors
        .iter()
        .filter(|author| !author.name.trim().is_empty())
        .count();
    let result = if count > 0 {
        RawCheckResult::pass(format!("{count} author(s) listed"))
    } else {
        RawCheckResult::fail("no authors listed").with_help("add `authors` to the frontmatter")
    };
    Ok(vec![result])
}

pub(super) fn authors_have_orcid(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let authors = &document.frontmatter.authors;
    if authors.is_empty() {
        return Ok(vec![RawCheckResult::fail("no authors listed")]);
    }

    let pattern = orcid_regex()?;
    Ok(authors
        .iter()
        .map(|author| match author.orcid.as_deref().map(str::trim) {
            Some(orcid) if pattern.is_match(orcid) => {
                RawCheckResult::pass(format!("{} has ORCID {orcid}", author.name))
            }
            Some(orcid) => RawCheckResult::fail(format!(
                "{} has a malformed ORCID '{orcid}'",
                author.name
            )),
            None => RawCheckResult::fail(format!("{} has no ORCID", author.name))
                .with_help("register at https://orcid.org and add it to the author entry"),
        })
        .collect())
}

pub(super) fn authors_have_affiliations(
    document: &ResolvedDocument,
    _options: &CheckOptions,
) -> Outcome {
    let authors = &document.frontmatter.authors;
    if authors.is_empty() {
        return Ok(vec![RawCheckResult::fail("no authors listed")]);
    }

    let missing: Vec<&str> = authors
        .iter()
        .filter(|author| author.affiliations.is_empty())
        .map(|author| author.name.as_str())
        .collect();

    let result = if missing.is_empty() {
        RawCheckResult::pass("every author has an affiliation")
    } else {
        RawCheckResult::fail(format!("missing affiliations: {}", missing.join(", ")))
    };
    Ok(vec![result])
}

pub(super) fn authors_corresponding(
    document: &ResolvedDocument,
    _options: &CheckOptions,
) -> Outcome {
    let corresponding: Vec<_> = document
        .frontmatter
        .authors
        .iter()
        .filter(|author| author.corresponding)
        .collect();

    let result = match corresponding.as_slice() {
        [] => RawCheckResult::fail("no corresponding author")
            .with_help("mark one author with `corresponding: true`"),
        [author] if author.email.as_deref().map(str::trim).unwrap_or("").is_empty() => {
            RawCheckResult::fail(format!(
                "corresponding author {} has no email",
                author.name
            ))
        }
        [author] => RawCheckResult::pass(format!("{} is the corresponding author", author.name)),
        _ => RawCheckResult::fail(format!(
            "{} corresponding authors marked, expected one",
            corresponding.len()
        )),
    };
    Ok(vec![result])
}

pub(super) fn keywords_defined(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let result = if document.frontmatter.keywords.is_empty() {
        RawCheckResult::fail("no keywords defined")
    } else {
        RawCheckResult::pass(format!(
            "{} keyword(s) defined",
            document.frontmatter.keywords.len()
        ))
    };
    Ok(vec![result])
}

pub(super) fn keywords_length(document: &ResolvedDocument, options: &CheckOptions) -> Outcome {
    let min = bounded_option(options, "min")?.unwrap_or(1);
    let max = bounded_option(options, "max")?.unwrap_or(8);
    if min > max {
        return Err(CheckFailure::InvalidOption {
            option: "min".to_string(),
            reason: format!("{min} exceeds max {max}"),
        });
    }

    let count = document.frontmatter.keywords.len();
    let result = if (min..=max).contains(&count) {
        RawCheckResult::pass(format!("{count} keyword(s)"))
    } else {
        RawCheckResult::fail(format!("{count} keyword(s), expected {min} to {max}"))
    };
    Ok(vec![result])
}

pub(super) fn doi_exists(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let result = match document.frontmatter.doi.as_deref().map(str::trim) {
        None | Some("") => RawCheckResult::fail("no DOI defined"),
        Some(doi) => {
            let bare = doi
                .strip_prefix("https://doi.org/")
                .or_else(|| doi.strip_prefix("doi:"))
                .unwrap_or(doi);
            if doi_regex()?.is_match(bare) {
                RawCheckResult::pass(format!("DOI {bare} is well formed"))
            } else {
                RawCheckResult::fail(format!("DOI '{doi}' is malformed"))
                    .with_help("DOIs look like 10.1234/abcd")
            }
        }
    };
    Ok(vec![result])
}
