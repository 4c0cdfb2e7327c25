//!
//! Capability-URL (FURL) derivation and parsing helpers.
//!
//! A FURL has the shape `<transport-info>/<swissnum>`. An operation
//! capability extends the base swissnum with `-<operation>`; the base
//! capability is the shared prefix of a grant's operation capabilities and
//! is not independently resolvable. A grantee appends an operation name to
//! the base to regenerate a usable capability.

use crate::error::BrokerError;

/// Derives the base capability from the last operation capability issued in
/// one `create` call, by stripping the operation suffix.
///
/// `last_furl` must end with `last_swissnum`, and `last_swissnum` must
/// extend `base_swissnum`. Both hold by construction; they are still checked
/// here so a violation fails loudly instead of silently truncating the URL.
pub fn derive_base(
    last_furl: &str,
    last_swissnum: &str,
    base_swissnum: &str,
) -> Result<String, BrokerError> {
    if !last_furl.ends_with(last_swissnum) {
        return Err(BrokerError::Precondition(format!(
            "capability {last_furl} does not end with swissnum {last_swissnum}"
        )));
    }
    if !last_swissnum.starts_with(base_swissnum) {
        return Err(BrokerError::Precondition(format!(
            "operation swissnum {last_swissnum} does not extend base swissnum {base_swissnum}"
        )));
    }
    let chop = last_swissnum.len() - base_swissnum.len();
    Ok(last_furl[..last_furl.len() - chop].to_string())
}

/// The swissnum of a capability: its final `/`-separated path segment.
pub fn swissnum_of(furl: &str) -> &str {
    furl.rsplit('/').next().unwrap_or(furl)
}

/// Splits an operation record's swissnum and capability back into their base
/// forms by chopping from the swissnum's first `-` to its end, and the same
/// number of characters off the capability. Records without an operation
/// suffix come back unchanged.
pub fn base_of_record(swissnum: &str, furl: &str) -> (String, String) {
    match swissnum.find('-') {
        Some(idx) => {
            let chop = swissnum.len() - idx;
            let keep = furl.len().saturating_sub(chop);
            (swissnum[..idx].to_string(), furl[..keep].to_string())
        }
        None => (swissnum.to_string(), furl.to_string()),
    }
}
