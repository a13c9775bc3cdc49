use url::Url;

use crate::checks::definition::{CheckFailure, RawCheckResult};
use crate::checks::options::CheckOptions;
use crate::document::{NodeKind, ResolvedDocument};

type Outcome = Result<Vec<RawCheckResult>, CheckFailure>;

pub(super) fn links_valid(document: &ResolvedDocument, options: &CheckOptions) -> Outcome {
    let require_https = options.boolean("require_https").unwrap_or(false);
    let links = document.find_all(NodeKind::Link);
    if links.is_empty() {
        return Ok(vec![RawCheckResult::pass("no links found")]);
    }

    Ok(links
        .into_iter()
        .map(|link| {
            let target = link.url.as_deref().map(str::trim).unwrap_or("");
            let verdict = if target.is_empty() {
                RawCheckResult::fail("link has no target")
            } else if target.starts_with('#') {
                RawCheckResult::pass(format!("internal reference {target}"))
            } else {
                match Url::parse(target) {
                    Ok(url) if require_https && url.scheme() != "https" => {
                        RawCheckResult::fail(format!("{target} does not use https"))
                    }
                    Ok(url) if matches!(url.scheme(), "http" | "https" | "mailto") => {
                        RawCheckResult::pass(format!("{target} is well formed"))
                    }
                    Ok(url) => RawCheckResult::fail(format!(
                        "{target} uses unsupported scheme '{}'",
                        url.scheme()
                    )),
                    Err(err) => RawCheckResult::fail(format!("{target} is not a valid URL: {err}"))
                        .with_help("use an absolute URL, e.g. https://example.org/page"),
                }
            };
            verdict.at(link.position)
        })
        .collect())
}

pub(super) fn math_not_empty(document: &ResolvedDocument, _options: &CheckOptions) -> Outcome {
    let mut equations = document.find_all(NodeKind::Math);
    equations.extend(document.find_all(NodeKind::InlineMath));
    if equations.is_empty() {
        return Ok(vec![RawCheckResult::pass("no equations found")]);
    }

    Ok(equations
        .into_iter()
        .map(|node| {
            let blank = node.value.as_deref().map(str::trim).unwrap_or("").is_empty();
            if blank {
                RawCheckResult::fail("equation is empty").at(node.position)
            } else {
                RawCheckResult::pass("equation has content").at(node.position)
            }
        })
        .collect())
}

pub(super) fn figures_have_captions(
    document: &ResolvedDocument,
    _options: &CheckOptions,
) -> Outcome {
    let figures = document.find_all(NodeKind::Figure);
    if figures.is_empty() {
        return Ok(vec![RawCheckResult::pass("no figures found")]);
    }

    Ok(figures
        .into_iter()
        .map(|figure| {
            let name = figure.label.as_deref().unwrap_or("figure");
            let captioned = figure
                .children
                .iter()
                .any(|child| child.kind == NodeKind::Caption && child.word_count() > 0);
            if captioned {
                RawCheckResult::pass(format!("{name} has a caption")).at(figure.position)
            } else {
                RawCheckResult::fail(format!("{name} has no caption"))
                    .with_help("add a caption describing the figure")
                    .at(figure.position)
            }
        })
        .collect())
}
