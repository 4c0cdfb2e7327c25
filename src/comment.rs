//!
//! Renders and classifies the broker-authored annotation carried by every
//! service record.
//!
//! The annotation serves two roles: it is the human-readable description
//! shown by `list`, and it is the filter that separates this broker's
//! records from unrelated services hosted on the same daemon. Recognition is
//! a fixed-prefix classification, not free-form parsing: it accepts exactly
//! what [`render`] produces and rejects partial or reordered text.

use crate::types::GrantKind;

const READ_PHRASE: &str = "allow read ";
const WRITE_PHRASE: &str = "(and write) ";
const ACCESS_PHRASE: &str = "access to the Git repository at ";

/// Structured form of a broker-authored comment, recovered by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComment {
    pub writable: bool,
    pub repo_path: String,
    /// The operator-supplied free-text note, if one was given at create time.
    pub user_comment: Option<String>,
}

/// Renders the comment attached to every record of one grant.
pub fn render(kind: GrantKind, repo_path: &str, user_comment: &str) -> String {
    let mut out = String::from(READ_PHRASE);
    if kind.writable() {
        out.push_str(WRITE_PHRASE);
    }
    out.push_str(ACCESS_PHRASE);
    out.push_str(repo_path);
    if !user_comment.is_empty() {
        out.push_str(" (");
        out.push_str(user_comment);
        out.push(')');
    }
    out
}

/// Recognises comments authored by [`render`].
pub fn matches(comment: &str) -> bool {
    parse(comment).is_some()
}

/// Recovers the structured form of a broker-authored comment, or `None` for
/// anything this broker did not write.
pub fn parse(comment: &str) -> Option<ParsedComment> {
    let rest = comment.strip_prefix(READ_PHRASE)?;
    let (writable, rest) = match rest.strip_prefix(WRITE_PHRASE) {
        Some(tail) => (true, tail),
        None => (false, rest),
    };
    let rest = rest.strip_prefix(ACCESS_PHRASE)?;
    let (repo_path, user_comment) = match rest.rfind(" (") {
        Some(idx) if rest.ends_with(')') => {
            (&rest[..idx], Some(rest[idx + 2..rest.len() - 1].to_string()))
        }
        _ => (rest, None),
    };
    Some(ParsedComment {
        writable,
        repo_path: repo_path.to_string(),
        user_comment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_read_only_without_user_comment() {
        let comment = render(GrantKind::ReadOnly, "/srv/repo", "");
        assert_eq!(comment, "allow read access to the Git repository at /srv/repo");
    }

    #[test]
    fn render_read_write_with_user_comment() {
        let comment = render(GrantKind::ReadWrite, "/srv/repo", "for Bob");
        assert_eq!(
            comment,
            "allow read (and write) access to the Git repository at /srv/repo (for Bob)"
        );
    }

    #[test]
    fn rendered_comments_always_classify_as_ours() {
        for kind in [GrantKind::ReadOnly, GrantKind::ReadWrite] {
            for user in ["", "for Alice"] {
                assert!(matches(&render(kind, "/srv/repo", user)));
            }
        }
    }

    #[test]
    fn parse_recovers_fields() {
        let parsed = parse(&render(GrantKind::ReadWrite, "/srv/repo", "for Bob")).unwrap();
        assert!(parsed.writable);
        assert_eq!(parsed.repo_path, "/srv/repo");
        assert_eq!(parsed.user_comment.as_deref(), Some("for Bob"));

        let parsed = parse(&render(GrantKind::ReadOnly, "/srv/repo", "")).unwrap();
        assert!(!parsed.writable);
        assert_eq!(parsed.user_comment, None);
    }

    #[test]
    fn rejects_foreign_and_partial_comments() {
        assert!(!matches("nightly backup cron job"));
        assert!(!matches("allow read "));
        assert!(!matches("allow read something else entirely"));
        assert!(!matches("(and write) allow read access to the Git repository at /x"));
        assert!(!matches("ALLOW READ access to the Git repository at /x"));
        assert!(!matches(""));
    }
}
