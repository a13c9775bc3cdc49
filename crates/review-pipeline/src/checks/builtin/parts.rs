use super::frontmatter::bounded_option;
use crate::checks::definition::{CheckFailure, RawCheckResult};
use crate::checks::options::CheckOptions;
use crate::document::ResolvedDocument;

type Outcome = Result<Vec<RawCheckResult>, CheckFailure>;

const DATA_AVAILABILITY_PARTS: [&str; 2] = ["data_availability", "availability"];
const CODE_AVAILABILITY_PARTS: [&str; 1] = ["code_availability"];

fn part_present(document: &ResolvedDocument, names: &[&str], label: &str) -> RawCheckResult {
    let found = names.iter().find_map(|name| document.part(name));
    match found {
        Some(part) if part.word_count() > 0 => {
            RawCheckResult::pass(format!("{label} found")).at(part.position)
        }
        Some(part) => RawCheckResult::fail(format!("{label} is empty")).at(part.position),
        None => RawCheckResult::fail(format!("{label} is missing")).with_help(format!(
            "add a part named `{}` to the document",
            names[0]
        )),
    }
}

pub(super) fn abstract_exists(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    Ok(vec![part_present(document, &["abstract"], "abstract")])
}

pub(super) fn abstract_length(document: &ResolvedDocument, options: &CheckOptions) -> Outcome {
    let min = bounded_option(options, "min")?.unwrap_or(50);
    let max = bounded_option(options, "max")?.unwrap_or(300);
    if min > max {
        return Err(CheckFailure::InvalidOption {
            option: "min".to_string(),
            reason: format!("{min} exceeds max {max}"),
        });
    }

    let Some(part) = document.part("abstract") else {
        return Ok(vec![RawCheckResult::fail("abstract is missing")]);
    };

    let words = part.word_count();
    let result = if words < min {
        RawCheckResult::fail(format!("abstract has {words} words, minimum is {min}"))
    } else if words > max {
        RawCheckResult::fail(format!("abstract has {words} words, maximum is {max}"))
    } else {
        RawCheckResult::pass(format!("abstract has {words} words"))
    };
    Ok(vec![result.at(part.position)])
}

pub(super) fn data_availability_exists(
    document: &ResolvedDocument,
    _options: &CheckOptions,
) -> Outcome {
    Ok(vec![part_present(
        document,
        &DATA_AVAILABILITY_PARTS,
        "data availability statement",
    )])
}

pub(super) fn code_availability_exists(
    document: &ResolvedDocument,
    _options: &CheckOptions,
) -> Outcome {
    Ok(vec![part_present(
        document,
        &CODE_AVAILABILITY_PARTS,
        "code availability statement",
    )])
}
