use crate::config::SharedConfig;
use crate::dns::acceptance::{self, Acceptance, WireHeader};
use crate::dns::resolution::{Resolution, Resolver};
use crate::dns::response;
use crate::dns::update::Updater;
use crate::error::Error;
use crate::store::DynRecordStore;
use std::net::SocketAddr;
use tracing::{debug, error, info};
use trust_dns_proto::op::{Message, OpCode, ResponseCode};

/// Handles one inbound datagram at a time: acceptance check, then either the update or the
/// resolution path, then an uncompressed reply.
#[derive(Clone)]
pub struct Handler {
    resolver: Resolver,
    updater: Updater,
}

impl Handler {
    pub(super) fn new(config: &SharedConfig, store: DynRecordStore) -> Result<Self, Error> {
        Ok(Handler {
            resolver: Resolver::new(config, store.clone())?,
            updater: Updater::new(store),
        })
    }

    /// Process one datagram and return the reply to send, if any.
    pub async fn handle_datagram(&self, src: SocketAddr, bytes: &[u8]) -> Option<Vec<u8>> {
        let Some(header) = WireHeader::parse(bytes) else {
            debug!("dropped {} byte datagram from {src}: shorter than a header", bytes.len());
            return None;
        };

        match acceptance::decide(&header) {
            Acceptance::Accept => {}
            Acceptance::Ignore => {
                debug!("ignored message {} from {src}: not a request", header.id);
                return None;
            }
            Acceptance::RejectNotImplemented => {
                debug!(
                    "rejected message {} from {src}: opcode {} not implemented",
                    header.id,
                    header.opcode()
                );
                return Some(header.rejection(ResponseCode::NotImp).to_vec());
            }
            Acceptance::Reject => {
                debug!("rejected message {} from {src}: unexpected section counts", header.id);
                return Some(header.rejection(ResponseCode::FormErr).to_vec());
            }
        }

        let request = match Message::from_vec(bytes) {
            Ok(request) => request,
            Err(err) => {
                debug!("rejected message {} from {src}: {err}", header.id);
                return Some(header.rejection(ResponseCode::FormErr).to_vec());
            }
        };

        let reply = self.dispatch_request(&request).await;
        match response::encode(&reply) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                error!("failed to encode reply to message {}: {err}", request.id());
                Some(header.rejection(ResponseCode::ServFail).to_vec())
            }
        }
    }

    /// Build the reply to an accepted, fully decoded message.
    pub async fn dispatch_request(&self, request: &Message) -> Message {
        if request.op_code() == OpCode::Update {
            let report = self.updater.apply(request).await;
            info!(
                "update {} applied {} of {} records",
                request.id(),
                report.applied(),
                report.outcomes.len()
            );
            return response::update_result(request, report.any_failed());
        }

        let Some(query) = request.queries().first() else {
            return response::nxdomain(request);
        };
        debug!("query {}: {} {}", request.id(), query.name(), query.query_type());
        match self.resolver.resolve(query.name(), query.query_type()).await {
            Resolution::Answer(record) => response::authoritative_answer(request, record),
            Resolution::NxDomain => response::nxdomain(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Domain, InMemoryRecordStore, RecordStore, RecordType as StoredType};
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use trust_dns_proto::op::{MessageType, Query};
    use trust_dns_proto::rr::{Name, RData, Record, RecordType};

    const CONFIG: &str = r#"{
        "ns_domain": "ns1.example.com.",
        "ns_admin": "hostmaster.example.com.",
        "soa": { "mname": "ns-822.example.net." },
        "dns_udp_bind_addr": "127.0.0.1:0",
        "api_bind_addr": "127.0.0.1:0",
        "api_timeout": 5
    }"#;

    /// An in-memory store that counts every call it receives.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRecordStore,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecordStore for CountingStore {
        async fn set(
            &self,
            domain: &Domain,
            record_type: StoredType,
            value: String,
        ) -> Result<(), Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.set(domain, record_type, value).await
        }

        async fn get(
            &self,
            domain: &Domain,
            record_type: StoredType,
        ) -> Result<Option<String>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(domain, record_type).await
        }

        async fn conditional_delete(
            &self,
            domain: &Domain,
            record_type: StoredType,
            expected: &str,
        ) -> Result<(), Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner
                .conditional_delete(domain, record_type, expected)
                .await
        }
    }

    fn handler(store: DynRecordStore) -> Handler {
        let config = Arc::new(Config::try_from_json(CONFIG).unwrap());
        Handler::new(&config, store).unwrap()
    }

    fn src() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn query(name: &str, query_type: RecordType) -> Message {
        let mut message = Message::new();
        message
            .set_id(99)
            .set_op_code(OpCode::Query)
            .add_query(Query::query(Name::from_str(name).unwrap(), query_type));
        message
    }

    async fn roundtrip(handler: &Handler, request: &Message) -> Message {
        let bytes = request.to_vec().unwrap();
        let reply = handler.handle_datagram(src(), &bytes).await.unwrap();
        Message::from_vec(&reply).unwrap()
    }

    #[tokio::test]
    async fn answers_stored_a_record() {
        let store = Arc::new(CountingStore::default());
        store
            .set(&Domain::new("testingsub.testingdomain.com."), StoredType::A, "1.2.3.4".into())
            .await
            .unwrap();
        let reply = roundtrip(
            &handler(store),
            &query("testingsub.testingdomain.com.", RecordType::A),
        )
        .await;

        assert_eq!(reply.id(), 99);
        assert_eq!(reply.message_type(), MessageType::Response);
        assert!(reply.authoritative());
        assert_eq!(reply.response_code(), ResponseCode::NoError);
        assert_eq!(reply.answers().len(), 1);
        assert_eq!(
            reply.answers()[0].data(),
            Some(&RData::A(Ipv4Addr::new(1, 2, 3, 4)))
        );
    }

    #[tokio::test]
    async fn missing_record_is_nxdomain() {
        let reply = roundtrip(
            &handler(Arc::new(InMemoryRecordStore::new())),
            &query("testingsub.testingdomain.com.", RecordType::A),
        )
        .await;
        assert!(reply.authoritative());
        assert_eq!(reply.response_code(), ResponseCode::NXDomain);
        assert!(reply.answers().is_empty());
    }

    #[tokio::test]
    async fn two_questions_are_rejected_before_resolution() {
        let store = Arc::new(CountingStore::default());
        let handler = handler(store.clone());
        let mut request = query("a.example.com.", RecordType::A);
        request.add_query(Query::query(
            Name::from_str("b.example.com.").unwrap(),
            RecordType::A,
        ));

        let reply = roundtrip(&handler, &request).await;
        assert_eq!(reply.id(), 99);
        assert_eq!(reply.response_code(), ResponseCode::FormErr);
        assert!(reply.queries().is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn responses_are_never_answered() {
        let store = Arc::new(CountingStore::default());
        let handler = handler(store.clone());
        let mut request = query("a.example.com.", RecordType::A);
        request.set_message_type(MessageType::Response);

        let bytes = request.to_vec().unwrap();
        assert_eq!(handler.handle_datagram(src(), &bytes).await, None);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_opcode_is_not_implemented() {
        let handler = handler(Arc::new(InMemoryRecordStore::new()));
        let mut bytes = query("a.example.com.", RecordType::A).to_vec().unwrap();
        // Opcode 2 (STATUS).
        bytes[2] = (bytes[2] & 0x87) | (2 << 3);

        let reply = handler.handle_datagram(src(), &bytes).await.unwrap();
        let header = WireHeader::parse(&reply).unwrap();
        assert!(header.is_response());
        assert_eq!(header.opcode(), 2);
        assert_eq!(header.bits & 0xF, u16::from(ResponseCode::NotImp.low()));
    }

    #[tokio::test]
    async fn truncated_body_is_format_error() {
        let handler = handler(Arc::new(InMemoryRecordStore::new()));
        let bytes = query("a.example.com.", RecordType::A).to_vec().unwrap();
        let reply = handler
            .handle_datagram(src(), &bytes[..WireHeader::LEN + 3])
            .await
            .unwrap();
        let reply = Message::from_vec(&reply).unwrap();
        assert_eq!(reply.response_code(), ResponseCode::FormErr);
    }

    #[tokio::test]
    async fn short_datagram_is_dropped() {
        let handler = handler(Arc::new(InMemoryRecordStore::new()));
        assert_eq!(handler.handle_datagram(src(), &[0u8; 5]).await, None);
    }

    #[tokio::test]
    async fn update_then_query() {
        let store = Arc::new(InMemoryRecordStore::new());
        let handler = handler(store);
        let owner = Name::from_str("dyn.example.com.").unwrap();

        let mut update = Message::new();
        update
            .set_id(1)
            .set_op_code(OpCode::Update)
            .add_query(Query::query(
                Name::from_str("example.com.").unwrap(),
                RecordType::SOA,
            ))
            .add_name_server(Record::from_rdata(
                owner.clone(),
                60,
                RData::A(Ipv4Addr::new(192, 0, 2, 10)),
            ));
        let reply = roundtrip(&handler, &update).await;
        assert_eq!(reply.op_code(), OpCode::Update);
        assert_eq!(reply.response_code(), ResponseCode::NoError);
        assert!(!reply.authoritative());

        let reply = roundtrip(&handler, &query("DYN.example.com.", RecordType::A)).await;
        assert_eq!(
            reply.answers()[0].data(),
            Some(&RData::A(Ipv4Addr::new(192, 0, 2, 10)))
        );
    }

    #[tokio::test]
    async fn notify_is_answered_like_a_query() {
        let handler = handler(Arc::new(InMemoryRecordStore::new()));
        let mut notify = query("example.com.", RecordType::SOA);
        notify.set_op_code(OpCode::Notify);
        let reply = roundtrip(&handler, &notify).await;
        assert_eq!(reply.op_code(), OpCode::Notify);
        assert_eq!(reply.response_code(), ResponseCode::NoError);
        assert_eq!(reply.answers()[0].record_type(), RecordType::SOA);
    }
}
