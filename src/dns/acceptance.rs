//! Message acceptance policy.
//!
//! Runs on the fixed 12 byte header of every inbound datagram, before anything else of the
//! message is decoded, and decides whether the message is worth processing at all.

use trust_dns_proto::op::ResponseCode;

const QR_BIT: u16 = 1 << 15;
const RD_BIT: u16 = 1 << 8;
const OPCODE_SHIFT: u16 = 11;
const OPCODE_MASK: u16 = 0xF;

const OPCODE_QUERY: u8 = 0;
const OPCODE_NOTIFY: u8 = 4;
const OPCODE_UPDATE: u8 = 5;

/// What to do with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Decode and process the message.
    Accept,
    /// Drop the message without replying.
    Ignore,
    /// Reply with a header-only `NOTIMP` response.
    RejectNotImplemented,
    /// Reply with a header-only `FORMERR` response.
    Reject,
}

/// The raw DNS header, read straight from the wire without decoding the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub id: u16,
    pub bits: u16,
    pub query_count: u16,
    pub answer_count: u16,
    pub name_server_count: u16,
    pub additional_count: u16,
}

impl WireHeader {
    pub const LEN: usize = 12;

    /// Read the header from the start of `bytes`, or `None` if there are fewer than
    /// [`WireHeader::LEN`] bytes.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..Self::LEN)?;
        let word = |i: usize| u16::from_be_bytes([header[i], header[i + 1]]);
        Some(Self {
            id: word(0),
            bits: word(2),
            query_count: word(4),
            answer_count: word(6),
            name_server_count: word(8),
            additional_count: word(10),
        })
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        self.bits & QR_BIT != 0
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn opcode(&self) -> u8 {
        ((self.bits >> OPCODE_SHIFT) & OPCODE_MASK) as u8
    }

    /// A header-only reply skeleton for this message: id, opcode and RD echoed, QR set, every
    /// section count zero.
    #[must_use]
    pub fn rejection(&self, response_code: ResponseCode) -> [u8; Self::LEN] {
        let bits = QR_BIT
            | (u16::from(self.opcode()) << OPCODE_SHIFT)
            | (self.bits & RD_BIT)
            | u16::from(response_code.low());
        let mut reply = [0u8; Self::LEN];
        reply[..2].copy_from_slice(&self.id.to_be_bytes());
        reply[2..4].copy_from_slice(&bits.to_be_bytes());
        reply
    }
}

/// Decide whether a message with this header should be processed.
///
/// Responses are never answered, so reflected traffic can't start a loop between servers.
#[must_use]
pub fn decide(header: &WireHeader) -> Acceptance {
    if header.is_response() {
        return Acceptance::Ignore;
    }
    if !matches!(
        header.opcode(),
        OPCODE_QUERY | OPCODE_NOTIFY | OPCODE_UPDATE
    ) {
        return Acceptance::RejectNotImplemented;
    }
    if header.query_count != 1 {
        return Acceptance::Reject;
    }
    // A NOTIFY may carry one SOA in its answer section (RFC 1996 3.7, 3.11).
    if header.answer_count > 1 {
        return Acceptance::Reject;
    }
    if header.additional_count > 2 {
        return Acceptance::Reject;
    }
    Acceptance::Accept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(opcode: u8, qd: u16, an: u16, ar: u16) -> WireHeader {
        WireHeader {
            id: 0xbeef,
            bits: u16::from(opcode) << OPCODE_SHIFT,
            query_count: qd,
            answer_count: an,
            name_server_count: 0,
            additional_count: ar,
        }
    }

    #[test]
    fn parse_reads_big_endian_fields() {
        let bytes = [
            0x12, 0x34, 0x28, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0xff,
        ];
        let parsed = WireHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.id, 0x1234);
        assert_eq!(parsed.opcode(), OPCODE_UPDATE);
        assert!(!parsed.is_response());
        assert_eq!(parsed.query_count, 1);
        assert_eq!(parsed.name_server_count, 3);
        assert_eq!(parsed.additional_count, 1);
    }

    #[test]
    fn short_datagrams_have_no_header() {
        assert_eq!(WireHeader::parse(&[0u8; 11]), None);
    }

    #[test]
    fn responses_are_ignored() {
        let mut h = header(OPCODE_QUERY, 1, 0, 0);
        h.bits |= QR_BIT;
        assert_eq!(decide(&h), Acceptance::Ignore);
    }

    #[test]
    fn responses_are_ignored_before_opcode_check() {
        let mut h = header(2, 0, 0, 0);
        h.bits |= QR_BIT;
        assert_eq!(decide(&h), Acceptance::Ignore);
    }

    #[test]
    fn unsupported_opcodes_are_not_implemented() {
        for opcode in [1, 2, 3, 6, 15] {
            assert_eq!(
                decide(&header(opcode, 1, 0, 0)),
                Acceptance::RejectNotImplemented,
                "opcode {opcode}"
            );
        }
    }

    #[test]
    fn supported_opcodes_are_accepted() {
        for opcode in [OPCODE_QUERY, OPCODE_NOTIFY, OPCODE_UPDATE] {
            assert_eq!(decide(&header(opcode, 1, 0, 0)), Acceptance::Accept);
        }
    }

    #[test]
    fn question_count_must_be_one() {
        assert_eq!(decide(&header(OPCODE_QUERY, 0, 0, 0)), Acceptance::Reject);
        assert_eq!(decide(&header(OPCODE_QUERY, 2, 0, 0)), Acceptance::Reject);
    }

    #[test]
    fn answer_and_additional_limits() {
        assert_eq!(decide(&header(OPCODE_NOTIFY, 1, 1, 0)), Acceptance::Accept);
        assert_eq!(decide(&header(OPCODE_QUERY, 1, 2, 0)), Acceptance::Reject);
        assert_eq!(decide(&header(OPCODE_QUERY, 1, 0, 2)), Acceptance::Accept);
        assert_eq!(decide(&header(OPCODE_QUERY, 1, 0, 3)), Acceptance::Reject);
    }

    #[test]
    fn name_server_count_is_unbounded() {
        let mut h = header(OPCODE_UPDATE, 1, 0, 0);
        h.name_server_count = 40;
        assert_eq!(decide(&h), Acceptance::Accept);
    }

    #[test]
    fn rejection_echoes_id_opcode_and_rd() {
        let mut h = header(OPCODE_UPDATE, 2, 0, 0);
        h.bits |= RD_BIT | (1 << 10);
        let reply = WireHeader::parse(&h.rejection(ResponseCode::FormErr)).unwrap();
        assert_eq!(reply.id, 0xbeef);
        assert!(reply.is_response());
        assert_eq!(reply.opcode(), OPCODE_UPDATE);
        assert_eq!(reply.bits & RD_BIT, RD_BIT);
        assert_eq!(reply.bits & (1 << 10), 0);
        assert_eq!(reply.bits & 0xF, 1);
        assert_eq!(
            (reply.query_count, reply.answer_count, reply.additional_count),
            (0, 0, 0)
        );
    }
}
