use std::sync::Arc;

use super::RequestSpec;

/// Read-only supply of requests, addressed by the run-wide sequence number
/// handed out with each in-flight ticket.
#[derive(Debug, Clone)]
pub(super) enum RequestSource {
    Repeat(Arc<RequestSpec>),
    Cycle(Arc<[RequestSpec]>),
}

impl RequestSource {
    pub(super) fn spec_for(&self, sequence: u64) -> Option<&RequestSpec> {
        match self {
            RequestSource::Repeat(spec) => Some(spec.as_ref()),
            RequestSource::Cycle(specs) => {
                let len = u64::try_from(specs.len()).ok()?;
                let index = sequence.checked_rem(len)?;
                specs.get(usize::try_from(index).ok()?)
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        match self {
            RequestSource::Repeat(_) => 1,
            RequestSource::Cycle(specs) => specs.len(),
        }
    }
}
