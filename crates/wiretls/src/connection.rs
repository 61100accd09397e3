//! Stream (SSLv3/TLS) connection state machine.
//!
//! The record layer is free to fragment a handshake message across several
//! records and to pack several messages into one record. `TlsConnection`
//! undoes both: it buffers raw stream bytes, parses whole records, coalesces
//! payload bytes of consecutive records with the same content type, and
//! drains complete messages off the front of that run. Payload bytes of
//! differing content types are never merged.

use std::collections::VecDeque;

use log::{debug, trace};
use thiserror::Error;

use wiretls_core::error::CodecError;
use wiretls_core::version::{ProtocolVersion, WireVersion};
use wiretls_core::Codec;
use wiretls_proto::record::{ContentType, Record, TlsMessage, TlsRecord, TlsRecordPayload};

/// Result type alias for connection operations
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Errors surfaced by the connection facades.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A record arrived with a version other than the one the connection
    /// was constructed for. The offending record has been consumed from
    /// the buffer and is carried here for inspection.
    #[error("wrong protocol version: expected {expected}, got {got}")]
    WrongProtocolVersion {
        expected: ProtocolVersion,
        got: WireVersion,
        record: Box<Record>,
    },
}

/// A stream connection for SSLv3, TLS 1.0, TLS 1.1 or TLS 1.2.
#[derive(Debug)]
pub struct TlsConnection {
    version: ProtocolVersion,
    stream: Vec<u8>,
    cur_type: Option<ContentType>,
    cur_payload: Vec<u8>,
    records: VecDeque<TlsMessage>,
}

impl TlsConnection {
    pub fn new(expected_version: ProtocolVersion) -> Self {
        TlsConnection {
            version: expected_version,
            stream: Vec::new(),
            cur_type: None,
            cur_payload: Vec::new(),
            records: VecDeque::new(),
        }
    }

    pub fn expected_version(&self) -> ProtocolVersion {
        self.version
    }

    /// Feed raw stream bytes and drain every message that became complete.
    ///
    /// Incomplete trailing input stays buffered for the next call. A
    /// version mismatch consumes the offending record and returns it in
    /// the error; decoding may continue afterwards if the caller decides
    /// to go on.
    pub fn decode(&mut self, data: &[u8]) -> Result<()> {
        self.stream.extend_from_slice(data);
        loop {
            let (record, consumed) = match TlsRecord::read(&self.stream) {
                Ok((record, rest)) => (record, self.stream.len() - rest.len()),
                Err(CodecError::NotEnoughData(_)) => break,
                Err(err) => return Err(err.into()),
            };
            self.stream.drain(..consumed);

            if record.version.protocol_version() != Some(self.version) {
                debug!(
                    "record version {} does not match expected {}",
                    record.version, self.version
                );
                return Err(ConnectionError::WrongProtocolVersion {
                    expected: self.version,
                    got: record.version,
                    record: Box::new(Record::Tls(record)),
                });
            }

            let content_type = record.content_type;
            match record.payload {
                TlsRecordPayload::Raw(payload) => {
                    if self.cur_type.is_none() {
                        self.cur_type = Some(content_type);
                    }
                    if self.cur_type != Some(content_type) {
                        self.flush_current()?;
                        self.cur_type = Some(content_type);
                    }
                    self.cur_payload.extend_from_slice(&payload);
                    self.drain_current()?;
                }
                // Already decoded records are handed over directly.
                TlsRecordPayload::Messages(messages) => {
                    self.records.extend(messages);
                }
            }
        }
        Ok(())
    }

    /// Serialize messages into records, one buffer per record, framed with
    /// the connection version.
    pub fn encode(&self, records: Vec<TlsMessage>) -> Result<Vec<Vec<u8>>> {
        let version = WireVersion::from(self.version);
        let mut pkgs = Vec::with_capacity(records.len());
        for message in records {
            let record = TlsRecord::single(version, message);
            pkgs.push(record.to_bytes().map_err(ConnectionError::from)?);
        }
        Ok(pkgs)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pop the oldest completed message.
    pub fn pop_record(&mut self) -> Option<TlsMessage> {
        self.records.pop_front()
    }

    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    /// Drain what can still be parsed from the current run, then drop the
    /// remainder before switching content type.
    fn flush_current(&mut self) -> Result<()> {
        self.drain_current()?;
        if !self.cur_payload.is_empty() {
            debug!(
                "discarding {} unparsed bytes at content type change",
                self.cur_payload.len()
            );
            self.cur_payload.clear();
        }
        Ok(())
    }

    /// Parse as many complete messages as possible off the front of the
    /// coalesced payload run.
    fn drain_current(&mut self) -> Result<()> {
        let content_type = match self.cur_type {
            Some(content_type) => content_type,
            None => return Ok(()),
        };
        while !self.cur_payload.is_empty() {
            let (message, consumed) = match TlsMessage::read(content_type, &self.cur_payload) {
                Ok((message, rest)) => (message, self.cur_payload.len() - rest.len()),
                Err(CodecError::NotEnoughData(field)) => {
                    trace!("message incomplete, waiting for more data: {}", field);
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            self.cur_payload.drain(..consumed);
            self.records.push_back(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiretls_proto::alert::{Alert, AlertDescription, AlertLevel};

    use super::*;

    fn alert_record(version: (u8, u8), level: u8, description: u8) -> Vec<u8> {
        vec![21, version.0, version.1, 0, 2, level, description]
    }

    #[test]
    fn test_decode_single_alert() {
        let mut connection = TlsConnection::new(ProtocolVersion::TLSv10);
        connection.decode(&alert_record((3, 1), 1, 0)).unwrap();
        assert!(!connection.is_empty());
        assert_eq!(
            connection.pop_record(),
            Some(TlsMessage::Alert(Alert::new(
                AlertLevel::WARNING,
                AlertDescription::CLOSE_NOTIFY
            )))
        );
        assert!(connection.is_empty());
        assert_eq!(connection.pop_record(), None);
    }

    #[test]
    fn test_wrong_version_carries_record() {
        let mut connection = TlsConnection::new(ProtocolVersion::TLSv12);
        let err = connection.decode(&alert_record((3, 1), 2, 40)).unwrap_err();
        match err {
            ConnectionError::WrongProtocolVersion {
                expected,
                got,
                record,
            } => {
                assert_eq!(expected, ProtocolVersion::TLSv12);
                assert_eq!(got, WireVersion::new(3, 1));
                assert!(matches!(*record, Record::Tls(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The offending record was consumed; the connection can go on.
        connection.decode(&alert_record((3, 3), 1, 0)).unwrap();
        assert!(!connection.is_empty());
    }

    #[test]
    fn test_partial_record_stays_buffered() {
        let mut connection = TlsConnection::new(ProtocolVersion::TLSv10);
        let record = alert_record((3, 1), 1, 0);
        connection.decode(&record[..3]).unwrap();
        assert!(connection.is_empty());
        connection.decode(&record[3..]).unwrap();
        assert!(!connection.is_empty());
    }

    #[test]
    fn test_clear_records() {
        let mut connection = TlsConnection::new(ProtocolVersion::TLSv10);
        connection.decode(&alert_record((3, 1), 1, 0)).unwrap();
        connection.clear_records();
        assert!(connection.is_empty());
    }

    #[test]
    fn test_encode_framing() {
        let connection = TlsConnection::new(ProtocolVersion::TLSv11);
        let pkgs = connection
            .encode(vec![TlsMessage::Alert(Alert::new(
                AlertLevel::FATAL,
                AlertDescription::HANDSHAKE_FAILURE,
            ))])
            .unwrap();
        assert_eq!(pkgs, vec![vec![21, 3, 2, 0, 2, 2, 40]]);
    }
}
