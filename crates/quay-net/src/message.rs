use quay_types::{Record, RecordId};

/// Inbound messages arriving from the network engine.
///
/// The same message shape travels on two feeds: the continuous
/// observed-traffic stream drained by the [`IngressConsumer`](crate::IngressConsumer)
/// and the response side of the fetch channel pair, which also carries
/// unrelated traffic that fetchers must tolerate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetEvent {
    /// A record announced by a peer.
    Announce { record: Record },
    /// A record carried by random gossip sampling.
    Sample { record: Record },
    /// A record answering a get-by-identity request.
    Response { record: Record },
}

impl NetEvent {
    /// The record carried by this event.
    pub fn record(&self) -> &Record {
        match self {
            Self::Announce { record } | Self::Sample { record } | Self::Response { record } => {
                record
            }
        }
    }

    /// Consume the event, yielding its record.
    pub fn into_record(self) -> Record {
        match self {
            Self::Announce { record } | Self::Sample { record } | Self::Response { record } => {
                record
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Announce { .. } => "Announce",
            Self::Sample { .. } => "Sample",
            Self::Response { .. } => "Response",
        }
    }
}

/// Outbound requests to the network engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetRequest {
    /// Ask the network for the record with the given identity.
    Get { id: RecordId },
}
