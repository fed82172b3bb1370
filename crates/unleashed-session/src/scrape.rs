//! Reads the outcome of a login from the controller's HTML landing page.
//!
//! The page is walked breadth-first. The first element of interest
//! decides the outcome:
//!
//! - `<meta http-equiv="X-Auth" content="...">` means the login was
//!   rejected, for the reason in `content`
//! - the first `<script>` carries the session variables, which are pulled
//!   out of its text by the [`PATTERNS`] table

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

/// A session variable declared by the landing page's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Privilege,
    Version,
    CsrfToken,
}

/// Field → pattern. The first capture group is the value.
const PATTERNS: [(Field, &str); 3] = [
    (Field::Privilege, r#"var privilege = "([^"]+)""#),
    (Field::Version, r#"var frameVersion = "([^"]+)""#),
    // sic: the controller spells it "csfr"
    (Field::CsrfToken, r"var csfrToken = '([^']+)'"),
];

/// [`PATTERNS`], compiled once.
static EXTRACTORS: LazyLock<Result<Vec<(Field, Regex)>, regex::Error>> =
    LazyLock::new(|| {
        PATTERNS
            .iter()
            .map(|&(field, pattern)| Regex::new(pattern).map(|re| (field, re)))
            .collect()
    });

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScriptFields {
    pub privilege: Option<String>,
    pub version: Option<String>,
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoginPage {
    Rejected(String),
    Script(ScriptFields),
    /// No script, or only empty ones before the walk ended.
    NoScript,
}

/// # Errors
/// Fails only if the extraction patterns do not compile.
pub(crate) fn parse_login_page(html: &str) -> Result<LoginPage, regex::Error> {
    let document = Html::parse_document(html);
    let mut queue = VecDeque::from([document.tree.root()]);

    while let Some(node) = queue.pop_front() {
        if let Node::Element(element) = node.value() {
            match element.name() {
                "script" => {
                    let text: String = node
                        .children()
                        .filter_map(|child| child.value().as_text())
                        .map(|text| &**text)
                        .collect();
                    if text.is_empty() {
                        return Ok(LoginPage::NoScript);
                    }
                    return extract(&text).map(LoginPage::Script);
                }
                "meta"
                    if element
                        .attr("http-equiv")
                        .is_some_and(|v| v.eq_ignore_ascii_case("X-Auth")) =>
                {
                    let reason = element.attr("content").unwrap_or_default();
                    return Ok(LoginPage::Rejected(reason.to_string()));
                }
                _ => {}
            }
        }
        queue.extend(node.children());
    }

    Ok(LoginPage::NoScript)
}

fn extract(script: &str) -> Result<ScriptFields, regex::Error> {
    let extractors = EXTRACTORS.as_ref().map_err(Clone::clone)?;
    let mut fields = ScriptFields::default();
    for (field, pattern) in extractors {
        let Some(value) = pattern.captures(script).and_then(|c| c.get(1)) else {
            continue;
        };
        let slot = match field {
            Field::Privilege => &mut fields.privilege,
            Field::Version => &mut fields.version,
            Field::CsrfToken => &mut fields.csrf_token,
        };
        *slot = Some(value.as_str().to_string());
    }
    Ok(fields)
}
