use crate::dns::rdata::RecordData;
use crate::error::Error;
use crate::store::{Domain, DynRecordStore, RecordType as StoredType};
use trust_dns_proto::op::Message;
use trust_dns_proto::rr::{Name, RecordType};

/// What happened to one record of an UPDATE's update section.
#[derive(Debug)]
pub enum RecordOutcome {
    Applied {
        name: Name,
        record_type: StoredType,
    },
    Failed {
        name: Name,
        record_type: StoredType,
        error: Error,
    },
    /// Unsupported types, and TXT records without any character-string (deletions).
    Ignored {
        name: Name,
        record_type: RecordType,
    },
}

/// Per-record outcomes of one UPDATE, in update-section order.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl UpdateReport {
    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, RecordOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, RecordOutcome::Applied { .. }))
            .count()
    }
}

/// Applies RFC 2136 UPDATE messages to the record store.
///
/// Each record in the update section is stored independently and in order. There is no
/// transaction: a failed record doesn't undo earlier ones and doesn't stop later ones.
/// Prerequisites are not evaluated and record deletion is not supported.
#[derive(Clone)]
pub struct Updater {
    store: DynRecordStore,
}

impl Updater {
    pub fn new(store: DynRecordStore) -> Self {
        Self { store }
    }

    pub async fn apply(&self, message: &Message) -> UpdateReport {
        let mut report = UpdateReport::default();
        for record in message.name_servers() {
            let name = record.name().clone();
            let outcome = match RecordData::from_record(record) {
                RecordData::A(addr) => self.set(name, StoredType::A, addr.to_string()).await,
                RecordData::Cname(target) => {
                    self.set(name, StoredType::CNAME, target.to_string()).await
                }
                // TODO: store every character-string once multi-value TXT records are supported.
                RecordData::Txt(segments) if !segments.is_empty() => {
                    let first = segments.into_iter().next().unwrap_or_default();
                    self.set(name, StoredType::TXT, first).await
                }
                other => RecordOutcome::Ignored {
                    name,
                    record_type: other.record_type(),
                },
            };
            match &outcome {
                RecordOutcome::Applied { name, record_type } => {
                    tracing::info!("applied {record_type} update for \"{name}\"");
                }
                RecordOutcome::Failed {
                    name,
                    record_type,
                    error,
                } => {
                    tracing::error!("failed to apply {record_type} update for \"{name}\": {error}");
                }
                RecordOutcome::Ignored { name, record_type } => {
                    tracing::debug!("ignored {record_type} update for \"{name}\"");
                }
            }
            report.outcomes.push(outcome);
        }
        report
    }

    async fn set(&self, name: Name, record_type: StoredType, value: String) -> RecordOutcome {
        match self.store.set(&Domain::from(&name), record_type, value).await {
            Ok(()) => RecordOutcome::Applied { name, record_type },
            Err(error) => RecordOutcome::Failed {
                name,
                record_type,
                error,
            },
        }
    }
}
