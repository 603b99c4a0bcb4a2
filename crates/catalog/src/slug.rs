//! Slug derivation and collision resolution.
//!
//! A slug is the URL-safe identifier a store is addressed by. The base
//! form is derived from the display name; when other stores already hold
//! the base (or a numbered variant of it), a numeric suffix is appended.
//!
//! The suffix is `count of colliding slugs + 1`, which is deterministic
//! for a fixed snapshot of existing slugs but can race under concurrent
//! creation. Uniqueness is therefore guaranteed downstream by the unique
//! index on `store.slug` plus re-resolution on conflict (see
//! [`crate::services::CatalogService::create_store`]).

use regex::Regex;

/// Derive the base slug from a display name.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single hyphen, and trims leading/trailing hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// SQL-side pattern (POSIX, case-insensitive via `~*`) matching a base
/// slug and its numbered variants: `^base(-[0-9]+)?$`.
#[must_use]
pub fn collision_pattern(base: &str) -> String {
    format!("^{}(-[0-9]+)?$", regex::escape(base))
}

/// Resolve the slug for `name` against a snapshot of existing slugs.
///
/// `existing` is the sequence returned by the persistence layer for
/// [`collision_pattern`]; it is re-filtered here so a broader lookup does
/// not inflate the count. With no collisions the base slug is returned
/// as-is; otherwise the suffix is `count + 1`.
///
/// The count-based suffix can land on a taken slug when a numbered
/// variant exists without its base (one match named `base-2` yields the
/// candidate `base-2`). The unique index rejects such a candidate and
/// the caller re-resolves with [`resolve_after_conflict`].
#[must_use]
pub fn resolve(name: &str, existing: &[String]) -> String {
    let base = slugify(name);
    let pattern = compiled_pattern(&base);

    let collisions = existing.iter().filter(|slug| pattern.is_match(slug)).count();

    if collisions == 0 {
        base
    } else {
        format!("{base}-{}", collisions + 1)
    }
}

/// Resolve a replacement slug after an insert lost to the unique index.
///
/// Counting collisions again would recompute the very candidate that just
/// conflicted whenever the snapshot is unchanged, so this advances past
/// the largest numeric suffix among the matches instead: the result is
/// never in `existing`. With no matches at all the base is free again
/// (the conflicting row was deleted) and is returned as-is.
#[must_use]
pub fn resolve_after_conflict(name: &str, existing: &[String]) -> String {
    let base = slugify(name);
    let pattern = compiled_pattern(&base);

    // The bare base counts as suffix 1, so the first variant is `base-2`.
    let highest = existing
        .iter()
        .filter_map(|slug| pattern.captures(slug))
        .map(|caps| {
            caps.get(1)
                .and_then(|m| m.as_str().strip_prefix('-'))
                .and_then(|digits| digits.parse::<u64>().ok())
                .unwrap_or(1)
        })
        .max();

    match highest {
        None => base,
        Some(n) => format!("{base}-{}", n.saturating_add(1).max(2)),
    }
}

fn compiled_pattern(base: &str) -> Regex {
    Regex::new(&format!("(?i){}", collision_pattern(base)))
        .unwrap_or_else(|_| unreachable!("escaped base slug always forms a valid pattern"))
}
