//! Reply construction and encoding.

use trust_dns_proto::error::ProtoResult;
use trust_dns_proto::op::{Message, MessageType, ResponseCode};
use trust_dns_proto::rr::Record;
use trust_dns_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Start a reply to `request`: same id, opcode, RD and CD bits, and the request's question.
fn reply_to(request: &Message) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_checking_disabled(request.checking_disabled())
        .set_recursion_available(false);
    if let Some(query) = request.queries().first() {
        reply.add_query(query.clone());
    }
    reply
}

/// An authoritative `NOERROR` reply carrying `answer`.
#[must_use]
pub fn authoritative_answer(request: &Message, answer: Record) -> Message {
    let mut reply = reply_to(request);
    reply
        .set_authoritative(true)
        .set_response_code(ResponseCode::NoError)
        .add_answer(answer);
    reply
}

/// An authoritative `NXDOMAIN` reply with an empty answer section.
#[must_use]
pub fn nxdomain(request: &Message) -> Message {
    let mut reply = reply_to(request);
    reply
        .set_authoritative(true)
        .set_response_code(ResponseCode::NXDomain);
    reply
}

/// The reply to an UPDATE: `SERVFAIL` if any record failed to apply, `NOERROR` otherwise.
#[must_use]
pub fn update_result(request: &Message, any_failed: bool) -> Message {
    let mut reply = reply_to(request);
    reply.set_response_code(if any_failed {
        ResponseCode::ServFail
    } else {
        ResponseCode::NoError
    });
    reply
}

/// Encode a message for the wire with name compression disabled.
pub fn encode(message: &Message) -> ProtoResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buffer);
    encoder.set_canonical_names(true);
    message.emit(&mut encoder)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use trust_dns_proto::op::{OpCode, Query};
    use trust_dns_proto::rr::{Name, RData, RecordType};

    fn request() -> Message {
        let mut request = Message::new();
        request
            .set_id(4242)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(
                Name::from_str("www.example.com.").unwrap(),
                RecordType::A,
            ));
        request
    }

    #[test]
    fn answer_reply_is_authoritative() {
        let name = Name::from_str("www.example.com.").unwrap();
        let reply = authoritative_answer(
            &request(),
            Record::from_rdata(name, 60, RData::A(Ipv4Addr::new(1, 2, 3, 4))),
        );
        assert_eq!(reply.id(), 4242);
        assert_eq!(reply.message_type(), MessageType::Response);
        assert!(reply.authoritative());
        assert!(reply.recursion_desired());
        assert!(!reply.recursion_available());
        assert_eq!(reply.response_code(), ResponseCode::NoError);
        assert_eq!(reply.queries(), request().queries());
        assert_eq!(reply.answers().len(), 1);
    }

    #[test]
    fn nxdomain_has_no_answers() {
        let reply = nxdomain(&request());
        assert!(reply.authoritative());
        assert_eq!(reply.response_code(), ResponseCode::NXDomain);
        assert!(reply.answers().is_empty());
    }

    #[test]
    fn update_result_reflects_failure() {
        assert_eq!(
            update_result(&request(), true).response_code(),
            ResponseCode::ServFail
        );
        assert_eq!(
            update_result(&request(), false).response_code(),
            ResponseCode::NoError
        );
    }

    #[test]
    fn encoding_never_compresses_names() {
        let name = Name::from_str("www.example.com.").unwrap();
        let reply = authoritative_answer(
            &request(),
            Record::from_rdata(name, 60, RData::A(Ipv4Addr::new(1, 2, 3, 4))),
        );
        let bytes = encode(&reply).unwrap();
        // Question and answer both spell the owner out; no pointer back to offset 12.
        let labels = b"\x03www\x07example\x03com\x00";
        let occurrences = bytes
            .windows(labels.len())
            .filter(|window| *window == &labels[..])
            .count();
        assert_eq!(occurrences, 2);
        assert!(!bytes.windows(2).any(|w| w[0] == 0xc0 && w[1] == 0x0c));

        let decoded = Message::from_vec(&bytes).unwrap();
        assert_eq!(decoded.answers(), reply.answers());
    }
}
