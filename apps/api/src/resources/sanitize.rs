//! Link sanitization for AI-structured courses.
//!
//! A course survives only with a link on an allow-listed domain. A missing or
//! untrusted link may be replaced by a trusted discovery citation.
//!
//! Search-grounding citations usually carry a redirect URI on the provider's
//! grounding host and name the real domain in their title. Such a citation is
//! trusted by its title, and its redirect URI becomes the course link, so a
//! substituted link is not guaranteed to sit on an allow-listed host. Links the
//! model wrote itself always are.

use reqwest::Url;

use crate::models::analysis::Source;
use crate::models::resources::{CourseCandidate, LearningCourse};

/// Course platforms whose links are accepted. Subdomains match too.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "coursera.org",
    "edx.org",
    "udemy.com",
    "udacity.com",
    "pluralsight.com",
    "linkedin.com",
    "khanacademy.org",
    "freecodecamp.org",
    "kaggle.com",
    "datacamp.com",
    "codecademy.com",
    "futurelearn.com",
    "skillbuilder.aws",
    "aws.amazon.com",
    "cloudskillsboost.google",
    "learn.microsoft.com",
    "developers.google.com",
    "grow.google",
    "mit.edu",
    "stanford.edu",
];

fn domain_is_trusted(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    TRUSTED_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Host of an absolute http(s) URL.
pub fn host_of(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().map(str::to_ascii_lowercase)
}

pub fn is_trusted_link(link: &str) -> bool {
    host_of(link).is_some_and(|host| domain_is_trusted(&host))
}

/// Search-grounding citations often point at a redirect URL and carry the real
/// domain as their title, so either may vouch for the citation.
fn citation_is_trusted(source: &Source) -> bool {
    is_trusted_link(&source.uri) || domain_is_trusted(source.title.trim())
}

fn citation_names_provider(source: &Source, provider: &str) -> bool {
    let provider = provider.trim().to_ascii_lowercase();
    if provider.is_empty() {
        return false;
    }
    let compact: String = provider.chars().filter(|c| !c.is_whitespace()).collect();
    let haystacks = [
        source.title.to_ascii_lowercase(),
        host_of(&source.uri).unwrap_or_default(),
    ];
    haystacks
        .iter()
        .any(|h| h.contains(&provider) || h.contains(&compact))
}

/// Picks the citation to substitute for a course's missing or untrusted link.
fn substitute_citation<'a>(
    candidate: &CourseCandidate,
    trusted: &[&'a Source],
) -> Option<&'a Source> {
    let provider = candidate.provider.as_deref().unwrap_or_default();
    trusted
        .iter()
        .find(|s| citation_names_provider(s, provider))
        .or_else(|| trusted.first())
        .copied()
}

/// Keeps candidates with a trusted link, substituting a trusted citation when the
/// candidate's own link is missing or untrusted. Everything else is dropped.
pub fn sanitize_courses(candidates: Vec<CourseCandidate>, sources: &[Source]) -> Vec<LearningCourse> {
    let trusted: Vec<&Source> = sources.iter().filter(|s| citation_is_trusted(s)).collect();

    candidates
        .into_iter()
        .filter(|c| !c.title.trim().is_empty())
        .filter_map(|candidate| {
            let (link, fallback_provider) = match candidate.link.as_deref().map(str::trim) {
                Some(link) if is_trusted_link(link) => (link.to_string(), host_of(link)),
                _ => {
                    let citation = substitute_citation(&candidate, &trusted)?;
                    let named = Some(citation.title.trim().to_string()).filter(|t| !t.is_empty());
                    (citation.uri.clone(), named.or_else(|| host_of(&citation.uri)))
                }
            };
            let provider = candidate
                .provider
                .clone()
                .filter(|p| !p.trim().is_empty())
                .or(fallback_provider)
                .unwrap_or_else(|| "Unknown".to_string());

            Some(LearningCourse {
                title: candidate.title.trim().to_string(),
                provider,
                link,
                cost: candidate.cost,
                duration: candidate.duration,
                level: candidate.level,
            })
        })
        .collect()
}
