use proptest::prelude::*;

use gitcap::comment;
use gitcap::furl;
use gitcap::GrantKind;

fn grant_kind() -> impl Strategy<Value = GrantKind> {
    prop_oneof![Just(GrantKind::ReadOnly), Just(GrantKind::ReadWrite)]
}

proptest! {
    /// deriveBase round-trips: for any operation capability derived from a
    /// base swissnum with an operation suffix, stripping the suffix yields
    /// the base capability.
    #[test]
    fn prop_derive_base_round_trips(
        base in "[0-9a-f]{8,40}",
        op in prop_oneof![Just("fetch"), Just("push")],
        host in "[a-z0-9]{4,12}",
        port in 1u16..=65535,
    ) {
        let prefix = format!("pb://{host}@example.net:{port}/");
        let op_swissnum = format!("{base}-{op}");
        let op_furl = format!("{prefix}{op_swissnum}");

        let derived = furl::derive_base(&op_furl, &op_swissnum, &base).unwrap();
        prop_assert_eq!(derived, format!("{prefix}{base}"));
    }

    /// Grouping inverts construction: chopping from the first `-` of an
    /// operation swissnum recovers the base swissnum and base capability.
    #[test]
    fn prop_base_of_record_inverts_suffixing(
        base in "[0-9a-f]{8,40}",
        op in prop_oneof![Just("fetch"), Just("push")],
        host in "[a-z0-9]{4,12}",
    ) {
        let prefix = format!("pb://{host}@example.net:1234/");
        let op_swissnum = format!("{base}-{op}");
        let op_furl = format!("{prefix}{op_swissnum}");

        let (got_swissnum, got_furl) = furl::base_of_record(&op_swissnum, &op_furl);
        prop_assert_eq!(got_swissnum, base.clone());
        prop_assert_eq!(got_furl, format!("{prefix}{base}"));
    }

    /// The swissnum of a capability is its final path segment.
    #[test]
    fn prop_swissnum_of_is_final_segment(
        host in "[a-z0-9]{4,12}",
        segment in "[0-9a-f]{1,40}(-fetch|-push)?",
    ) {
        let cap = format!("pb://{host}@example.net:1234/{segment}");
        prop_assert_eq!(furl::swissnum_of(&cap), segment);
    }

    /// Every comment the renderer produces is recognised by the classifier,
    /// and parsing recovers the fields that went in.
    #[test]
    fn prop_rendered_comment_classifies_and_parses(
        kind in grant_kind(),
        path in "(/[a-zA-Z0-9_.]{1,12}){1,4}",
        user in "[a-zA-Z0-9][a-zA-Z0-9 ]{0,20}",
    ) {
        for user_comment in [user.as_str(), ""] {
            let rendered = comment::render(kind, &path, user_comment);
            prop_assert!(comment::matches(&rendered));

            let parsed = comment::parse(&rendered).unwrap();
            prop_assert_eq!(parsed.writable, kind.writable());
            prop_assert_eq!(parsed.repo_path, path.clone());
            if user_comment.is_empty() {
                prop_assert_eq!(parsed.user_comment, None);
            } else {
                prop_assert_eq!(parsed.user_comment.as_deref(), Some(user_comment));
            }
        }
    }
}
