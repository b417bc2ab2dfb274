use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

use quay_crypto::pow;
use quay_types::RecordId;

use crate::error::FetchError;
use crate::message::{NetEvent, NetRequest};

/// Chain fetch tunables.
#[derive(Clone, Copy, Debug)]
pub struct FetchConfig {
    /// Minimum proof-of-work score a fragment must carry.
    pub min_work: i32,
    /// How long to wait for any inbound message before re-sending the
    /// current request (once) or giving up.
    pub step_timeout: Duration,
    /// Hard deadline for the whole walk, regardless of per-step retries.
    pub overall_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            min_work: 16,
            step_timeout: Duration::from_secs(5),
            overall_timeout: Duration::from_secs(30),
        }
    }
}

/// A fully reassembled multi-fragment object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedObject {
    /// Fragment payloads concatenated oldest-first.
    pub data: Vec<u8>,
    /// Tag carried by the first-discovered fragment that has one.
    pub tag: Option<String>,
}

struct FetchChannels {
    requests: mpsc::Sender<NetRequest>,
    responses: mpsc::Receiver<NetEvent>,
}

/// Walks a backward-linked chain of records across the network boundary.
///
/// Fragments are discovered newest-first by following `prev` links and
/// prepended to the accumulator, so the final byte sequence reads
/// oldest-first. The request/response pair is exclusive per logical
/// connection, so fetches serialize on an internal mutex held for the
/// duration of one walk.
pub struct ChainFetcher {
    channels: Mutex<FetchChannels>,
    config: FetchConfig,
}

impl ChainFetcher {
    pub fn new(
        requests: mpsc::Sender<NetRequest>,
        responses: mpsc::Receiver<NetEvent>,
        config: FetchConfig,
    ) -> Self {
        Self {
            channels: Mutex::new(FetchChannels {
                requests,
                responses,
            }),
            config,
        }
    }

    /// Reconstruct the object whose newest fragment is `head`.
    ///
    /// The overall deadline is the only cancellation mechanism; expiry
    /// aborts the walk with [`FetchError::Timeout`], never partial data.
    pub async fn fetch(&self, head: RecordId) -> Result<FetchedObject, FetchError> {
        let mut channels = self.channels.lock().await;
        match tokio::time::timeout(self.config.overall_timeout, self.walk(&mut channels, head))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                debug!(%head, "chain fetch deadline expired");
                Err(FetchError::Timeout)
            }
        }
    }

    async fn walk(
        &self,
        channels: &mut FetchChannels,
        head: RecordId,
    ) -> Result<FetchedObject, FetchError> {
        let mut wanted = head;
        let mut data: Vec<u8> = Vec::new();
        let mut tag: Option<String> = None;
        let mut fragments = 0usize;

        loop {
            send_draining(channels, wanted).await?;
            let record = await_fragment(channels, wanted, self.config.step_timeout).await?;

            let score = pow::work_score(
                &record.value,
                &record.time_bytes(),
                &record.salt,
                &record.work,
            );
            if score < self.config.min_work {
                debug!(id = %wanted, score, "aborting fetch on bad fragment");
                return Err(FetchError::InsufficientWork {
                    id: wanted,
                    score,
                    required: self.config.min_work,
                });
            }

            // Newest fragment first on the wire, oldest first in the output.
            let mut combined = record.value.to_vec();
            combined.extend_from_slice(&data);
            data = combined;
            if tag.is_none() {
                tag = record.tag.clone();
            }
            fragments += 1;

            match record.prev {
                None => {
                    trace!(%head, fragments, bytes = data.len(), "chain complete");
                    return Ok(FetchedObject { data, tag });
                }
                Some(prev) => wanted = prev,
            }
        }
    }
}

/// Send a get request without blocking behind unread inbound traffic.
///
/// Classic two-channel rendezvous: race "a send slot opened" against
/// "an inbound message arrived", discarding the latter until the send
/// goes through.
async fn send_draining(channels: &mut FetchChannels, id: RecordId) -> Result<(), FetchError> {
    let FetchChannels {
        requests,
        responses,
    } = channels;
    loop {
        tokio::select! {
            permit = requests.reserve() => {
                let permit = permit.map_err(|_| FetchError::EngineClosed)?;
                permit.send(NetRequest::Get { id });
                return Ok(());
            }
            inbound = responses.recv() => {
                match inbound {
                    Some(event) => {
                        trace!(kind = event.kind_name(), "drained message while sending");
                    }
                    None => return Err(FetchError::EngineClosed),
                }
            }
        }
    }
}

/// Wait for the response matching `want`, tolerating duplicate and
/// unrelated traffic. One silent step re-sends the request; a second gives
/// up with [`FetchError::NotFound`].
async fn await_fragment(
    channels: &mut FetchChannels,
    want: RecordId,
    step_timeout: Duration,
) -> Result<quay_types::Record, FetchError> {
    let mut resent = false;
    loop {
        match tokio::time::timeout(step_timeout, channels.responses.recv()).await {
            Ok(Some(NetEvent::Response { record })) if record.work == want => return Ok(record),
            Ok(Some(other)) => {
                trace!(kind = other.kind_name(), "ignoring unrelated message");
            }
            Ok(None) => return Err(FetchError::EngineClosed),
            Err(_) if !resent => {
                resent = true;
                debug!(id = %want, "step timeout, re-sending request");
                send_draining(channels, want).await?;
            }
            Err(_) => return Err(FetchError::NotFound(want)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quay_crypto::mine;
    use quay_types::Record;
    use tokio::sync::mpsc::{Receiver, Sender};

    const TS: i64 = 1_700_000_000_000;

    fn honest_record(value: &'static [u8], prev: Option<RecordId>) -> Record {
        let (salt, work) = mine(value, TS, 0);
        let mut rec = Record::new(value, salt, work, TS);
        if let Some(prev) = prev {
            rec = rec.with_prev(prev);
        }
        rec
    }

    /// Three-fragment chain: F0 (start) <- F1 <- F2 (head).
    fn chain() -> [Record; 3] {
        let f0 = honest_record(b"first ", None);
        let f1 = honest_record(b"second ", Some(f0.id()));
        let f2 = honest_record(b"third", Some(f1.id()));
        [f0, f1, f2]
    }

    fn fetcher_pair(
        config: FetchConfig,
    ) -> (ChainFetcher, Receiver<NetRequest>, Sender<NetEvent>) {
        let (req_tx, req_rx) = mpsc::channel(1);
        let (resp_tx, resp_rx) = mpsc::channel(16);
        (ChainFetcher::new(req_tx, resp_rx, config), req_rx, resp_tx)
    }

    fn fast_config() -> FetchConfig {
        FetchConfig {
            min_work: 0,
            step_timeout: Duration::from_millis(200),
            overall_timeout: Duration::from_secs(5),
        }
    }

    /// Engine that answers every get with the matching record, if it has one.
    async fn serve_chain(
        mut req_rx: Receiver<NetRequest>,
        resp_tx: Sender<NetEvent>,
        records: Vec<Record>,
    ) {
        while let Some(NetRequest::Get { id }) = req_rx.recv().await {
            if let Some(rec) = records.iter().find(|r| r.work == id) {
                let _ = resp_tx
                    .send(NetEvent::Response { record: rec.clone() })
                    .await;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reassembly
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn reconstructs_forward_order() {
        let [f0, f1, f2] = chain();
        let head = f2.id();
        let (fetcher, req_rx, resp_tx) = fetcher_pair(fast_config());
        let engine = tokio::spawn(serve_chain(req_rx, resp_tx, vec![f0, f1, f2]));

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.data, b"first second third");
        engine.abort();
    }

    #[tokio::test]
    async fn single_fragment_chain() {
        let f0 = honest_record(b"alone", None);
        let head = f0.id();
        let (fetcher, req_rx, resp_tx) = fetcher_pair(fast_config());
        let engine = tokio::spawn(serve_chain(req_rx, resp_tx, vec![f0]));

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.data, b"alone");
        engine.abort();
    }

    #[tokio::test]
    async fn tag_comes_from_first_discovered_fragment_that_has_one() {
        let f0 = honest_record(b"body", None).with_tag("text/plain");
        let f1 = {
            let (salt, work) = mine(b"head", TS, 0);
            Record::new(b"head".as_slice(), salt, work, TS).with_prev(f0.id())
        };
        let head = f1.id();
        let (fetcher, req_rx, resp_tx) = fetcher_pair(fast_config());
        let engine = tokio::spawn(serve_chain(req_rx, resp_tx, vec![f0, f1]));

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.tag.as_deref(), Some("text/plain"));
        engine.abort();
    }

    // -----------------------------------------------------------------------
    // Tolerance of shared-channel noise
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unrelated_and_duplicate_messages_are_ignored() {
        let [f0, f1, f2] = chain();
        let head = f2.id();
        let noise = honest_record(b"noise", None);

        let (fetcher, mut req_rx, resp_tx) = fetcher_pair(fast_config());
        let records = vec![f0, f1, f2];
        let engine = tokio::spawn(async move {
            while let Some(NetRequest::Get { id }) = req_rx.recv().await {
                // Gossip noise before every real answer, plus a duplicate.
                let _ = resp_tx
                    .send(NetEvent::Announce { record: noise.clone() })
                    .await;
                if let Some(rec) = records.iter().find(|r| r.work == id) {
                    for _ in 0..2 {
                        let _ = resp_tx
                            .send(NetEvent::Response { record: rec.clone() })
                            .await;
                    }
                }
            }
        });

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.data, b"first second third");
        engine.abort();
    }

    // -----------------------------------------------------------------------
    // Verification gate
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn aborts_on_bad_fragment_without_partial_result() {
        let f0 = honest_record(b"first ", None);
        // F1's work bytes do not match its content: never verifies.
        let forged = Record::new(b"second ".as_slice(), vec![0; 32], RecordId::new([1; 32]), TS)
            .with_prev(f0.id());
        let f2 = honest_record(b"third", Some(forged.id()));
        let head = f2.id();

        let (fetcher, req_rx, resp_tx) = fetcher_pair(fast_config());
        let engine = tokio::spawn(serve_chain(req_rx, resp_tx, vec![f0, forged, f2]));

        let err = fetcher.fetch(head).await.unwrap_err();
        assert!(matches!(err, FetchError::InsufficientWork { score: -1, .. }));
        engine.abort();
    }

    #[tokio::test]
    async fn enforces_minimum_work() {
        // Honest but weak work, against a high minimum.
        let f0 = honest_record(b"weak", None);
        let head = f0.id();
        let config = FetchConfig {
            min_work: 255,
            ..fast_config()
        };
        let (fetcher, req_rx, resp_tx) = fetcher_pair(config);
        let engine = tokio::spawn(serve_chain(req_rx, resp_tx, vec![f0]));

        let err = fetcher.fetch(head).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::InsufficientWork { required: 255, .. }
        ));
        engine.abort();
    }

    // -----------------------------------------------------------------------
    // Timeouts and retries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn resends_once_then_succeeds() {
        let f0 = honest_record(b"eventually", None);
        let head = f0.id();
        let (fetcher, mut req_rx, resp_tx) = fetcher_pair(fast_config());

        let engine = tokio::spawn(async move {
            // Ignore the first request; answer the re-send.
            let _ = req_rx.recv().await;
            if let Some(NetRequest::Get { id }) = req_rx.recv().await {
                assert_eq!(id, f0.id());
                let _ = resp_tx.send(NetEvent::Response { record: f0 }).await;
            }
        });

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.data, b"eventually");
        engine.await.unwrap();
    }

    #[tokio::test]
    async fn silent_network_is_not_found() {
        let (fetcher, mut req_rx, _resp_tx) = fetcher_pair(FetchConfig {
            min_work: 0,
            step_timeout: Duration::from_millis(20),
            overall_timeout: Duration::from_secs(5),
        });
        // Keep the request channel drained so sends never block.
        let engine = tokio::spawn(async move { while req_rx.recv().await.is_some() {} });

        let head = RecordId::new([7; 32]);
        let err = fetcher.fetch(head).await.unwrap_err();
        assert_eq!(err, FetchError::NotFound(head));
        engine.abort();
    }

    #[tokio::test]
    async fn overall_deadline_wins() {
        let (fetcher, mut req_rx, _resp_tx) = fetcher_pair(FetchConfig {
            min_work: 0,
            step_timeout: Duration::from_secs(60),
            overall_timeout: Duration::from_millis(30),
        });
        let engine = tokio::spawn(async move { while req_rx.recv().await.is_some() {} });

        let err = fetcher.fetch(RecordId::new([7; 32])).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
        engine.abort();
    }

    #[tokio::test]
    async fn closed_engine_is_reported() {
        let (req_tx, req_rx) = mpsc::channel::<NetRequest>(1);
        let (resp_tx, resp_rx) = mpsc::channel::<NetEvent>(1);
        drop(req_rx);
        drop(resp_tx);
        let fetcher = ChainFetcher::new(req_tx, resp_rx, fast_config());

        let err = fetcher.fetch(RecordId::new([7; 32])).await.unwrap_err();
        assert_eq!(err, FetchError::EngineClosed);
    }

    // -----------------------------------------------------------------------
    // Send-while-draining
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn send_does_not_block_behind_unread_inbound() {
        let f0 = honest_record(b"payload", None);
        let head = f0.id();

        // Both channels at capacity 1, the request channel pre-filled. A
        // plain blocking send would deadlock against an engine that pushes
        // gossip before reading requests; draining breaks the cycle.
        let (req_tx, mut req_rx) = mpsc::channel(1);
        let (resp_tx, resp_rx) = mpsc::channel(1);
        req_tx
            .send(NetRequest::Get {
                id: RecordId::new([9; 32]),
            })
            .await
            .unwrap();
        let fetcher = ChainFetcher::new(req_tx, resp_rx, fast_config());

        let engine = tokio::spawn(async move {
            for _ in 0..8 {
                resp_tx
                    .send(NetEvent::Announce {
                        record: honest_record(b"junk", None),
                    })
                    .await
                    .unwrap();
            }
            // Discard the stale request, answer the real one.
            let _ = req_rx.recv().await;
            while let Some(NetRequest::Get { id }) = req_rx.recv().await {
                assert_eq!(id, head);
                let _ = resp_tx.send(NetEvent::Response { record: f0.clone() }).await;
            }
        });

        let object = fetcher.fetch(head).await.unwrap();
        assert_eq!(object.data, b"payload");
        engine.abort();
    }
}
