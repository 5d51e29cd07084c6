// ABOUTME: Image Resolver: picks the first available image from prioritized candidates.
// ABOUTME: Priority fields come before predicate fields; the empty tag is always tried last.

use crate::descriptor::ResourceDescriptor;
use crate::runtime::ImageOps;
use crate::types::ImageRef;

/// Candidate references in the order they are tried: repositories outer,
/// tags inner.
pub fn image_candidates(
    predicate: &ResourceDescriptor,
    priority: &ResourceDescriptor,
) -> Vec<ImageRef> {
    let repositories = ordered_non_empty([&priority.repository, &predicate.repository]);
    let mut tags = ordered_non_empty([&priority.tag, &predicate.tag]);
    tags.push("");

    let mut candidates = Vec::new();
    for repository in &repositories {
        for tag in &tags {
            match ImageRef::new(repository, tag) {
                Ok(image) if !candidates.contains(&image) => candidates.push(image),
                Ok(_) => {}
                Err(e) => tracing::warn!(repository, tag, error = %e, "skipping invalid image candidate"),
            }
        }
    }
    candidates
}

fn ordered_non_empty<'a>(fields: [&'a String; 2]) -> Vec<&'a str> {
    fields
        .into_iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Return the first candidate the runtime reports as available.
///
/// Finding nothing is not an error here; the caller decides what an
/// unresolved image means.
pub async fn resolve_image<R: ImageOps + ?Sized>(
    runtime: &R,
    predicate: &ResourceDescriptor,
    priority: &ResourceDescriptor,
    local_only: bool,
) -> Option<ImageRef> {
    let candidates = image_candidates(predicate, priority);

    for candidate in &candidates {
        if runtime.image_available(candidate, local_only).await {
            tracing::info!(image = %candidate, "image resolved");
            return Some(candidate.clone());
        }
        tracing::debug!(image = %candidate, "image candidate unavailable");
    }

    let tried: Vec<String> = candidates.iter().map(ToString::to_string).collect();
    tracing::warn!(candidates = ?tried, "no available image among candidates");
    None
}
