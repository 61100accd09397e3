//! Datagram (DTLS) connection state machine.
//!
//! DTLS handshake messages travel over an unreliable transport, so a single
//! logical message may arrive split into fragments, reordered across
//! datagrams, or duplicated. `DtlsConnection` reassembles fragments per
//! `message_seq` and delivers handshake messages strictly in sequence
//! order. Non-handshake records are delivered in arrival order.

use std::collections::VecDeque;

use log::{debug, trace};

use wiretls_core::error::CodecError;
use wiretls_core::version::{ProtocolVersion, WireVersion};
use wiretls_core::Codec;
use wiretls_proto::handshake::DtlsHandshake;
use wiretls_proto::record::{ContentType, DtlsMessage, DtlsRecord, DtlsRecordPayload, Record};

use crate::connection::{ConnectionError, Result};

/// Sliding window over record sequence numbers, one slot per residue class
/// of `sequence_number mod 64`.
///
/// The window only observes; whether a duplicate is dropped is the
/// caller's policy, not the codec's.
#[derive(Debug, Clone)]
pub struct ReplayWindow {
    slots: [Option<u64>; 64],
}

impl Default for ReplayWindow {
    fn default() -> Self {
        ReplayWindow { slots: [None; 64] }
    }
}

impl ReplayWindow {
    pub fn new() -> Self {
        ReplayWindow::default()
    }

    /// Record a sequence number. Returns true when the number was already
    /// covered by its slot, meaning a replay or reordered duplicate.
    pub fn observe(&mut self, sequence_number: u64) -> bool {
        let slot = &mut self.slots[(sequence_number & 0x3f) as usize];
        match *slot {
            Some(highest) if sequence_number <= highest => true,
            _ => {
                *slot = Some(sequence_number);
                false
            }
        }
    }

    /// Whether a sequence number would count as already seen.
    pub fn is_duplicate(&self, sequence_number: u64) -> bool {
        match self.slots[(sequence_number & 0x3f) as usize] {
            Some(highest) => sequence_number <= highest,
            None => false,
        }
    }
}

/// A datagram connection for DTLS 1.0 or DTLS 1.2.
#[derive(Debug)]
pub struct DtlsConnection {
    version: ProtocolVersion,
    window: ReplayWindow,
    epoch: u16,
    next_receive_seq: u16,
    next_send_seq: u16,
    next_record_send_seq: u64,
    queue: VecDeque<DtlsHandshake>,
    records: VecDeque<DtlsMessage>,
}

impl DtlsConnection {
    pub fn new(expected_version: ProtocolVersion) -> Self {
        DtlsConnection {
            version: expected_version,
            window: ReplayWindow::new(),
            epoch: 0,
            next_receive_seq: 0,
            next_send_seq: 0,
            next_record_send_seq: 0,
            queue: VecDeque::new(),
            records: VecDeque::new(),
        }
    }

    pub fn expected_version(&self) -> ProtocolVersion {
        self.version
    }

    /// The `message_seq` the handshake layer will deliver next.
    pub fn next_receive_seq(&self) -> u16 {
        self.next_receive_seq
    }

    /// Feed one datagram and drain every message that became complete.
    ///
    /// Handshake fragments are fed through the reassembler; everything
    /// else is delivered directly. A truncated record at the end of the
    /// datagram is dropped, as the missing bytes can never arrive.
    pub fn decode(&mut self, datagram: &[u8]) -> Result<()> {
        let mut data = datagram;
        while !data.is_empty() {
            let (record, rest) = match DtlsRecord::read(data) {
                Ok(value) => value,
                Err(CodecError::NotEnoughData(field)) => {
                    trace!("dropping truncated record at end of datagram: {}", field);
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            data = rest;

            if record.version.protocol_version() != Some(self.version) {
                debug!(
                    "record version {} does not match expected {}",
                    record.version, self.version
                );
                return Err(ConnectionError::WrongProtocolVersion {
                    expected: self.version,
                    got: record.version,
                    record: Box::new(Record::Dtls(record)),
                });
            }

            if self.window.observe(record.sequence_number) {
                // Replay policy stays with the caller; note it and go on.
                debug!(
                    "record sequence number {} already seen",
                    record.sequence_number
                );
            }

            let content_type = record.content_type;
            let payload = match record.payload {
                DtlsRecordPayload::Raw(payload) => payload,
                DtlsRecordPayload::Messages(messages) => {
                    self.records.extend(messages);
                    continue;
                }
            };

            if content_type == ContentType::Handshake {
                let mut body: &[u8] = &payload;
                while !body.is_empty() {
                    let (fragment, rest) = match DtlsHandshake::read_fragment(body) {
                        Ok(value) => value,
                        // The record is complete, so a short fragment is a
                        // hard framing error rather than missing input.
                        Err(CodecError::NotEnoughData(field)) => {
                            return Err(CodecError::UnexpectedEndOfStream(field).into())
                        }
                        Err(err) => return Err(err.into()),
                    };
                    body = rest;
                    self.process_handshake(fragment)?;
                }
            } else {
                let mut body: &[u8] = &payload;
                while !body.is_empty() {
                    let (message, rest) = match DtlsMessage::read(content_type, body) {
                        Ok(value) => value,
                        Err(CodecError::NotEnoughData(field)) => {
                            return Err(CodecError::UnexpectedEndOfStream(field).into())
                        }
                        Err(err) => return Err(err.into()),
                    };
                    body = rest;
                    self.records.push_back(message);
                }
            }
        }
        Ok(())
    }

    /// Reassembler for one incoming handshake fragment.
    ///
    /// Fragments ahead of `next_receive_seq` are queued for later; stale
    /// ones are dropped. Whenever the expected message can be advanced the
    /// queue is drained again, so buffered successors complete in order.
    fn process_handshake(&mut self, fragment: DtlsHandshake) -> Result<()> {
        if fragment.message_seq < self.next_receive_seq {
            debug!(
                "dropping stale handshake fragment seq={} (expecting {})",
                fragment.message_seq, self.next_receive_seq
            );
            return Ok(());
        }
        if fragment.message_seq > self.next_receive_seq {
            trace!(
                "queueing out-of-order handshake fragment seq={} (expecting {})",
                fragment.message_seq,
                self.next_receive_seq
            );
        }
        self.queue.push_back(fragment);

        loop {
            let index = match self
                .queue
                .iter()
                .position(|queued| queued.message_seq == self.next_receive_seq)
            {
                Some(index) => index,
                None => break,
            };
            let mut head = match self.queue.remove(index) {
                Some(head) => head,
                None => break,
            };

            // Merge every queued fragment of the same message until no
            // candidate fits anymore.
            loop {
                let mut merged_any = false;
                let mut i = 0;
                while i < self.queue.len() {
                    if self.queue[i].message_seq == head.message_seq
                        && head.merge(&self.queue[i])
                    {
                        self.queue.remove(i);
                        merged_any = true;
                    } else {
                        i += 1;
                    }
                }
                if !merged_any {
                    break;
                }
            }

            if head.is_fragment() {
                // Still incomplete; park it and wait for more fragments.
                self.queue.push_front(head);
                break;
            }

            head.decode_body()?;
            self.next_receive_seq = self.next_receive_seq.wrapping_add(1);
            trace!("handshake message seq={} complete", head.message_seq);
            self.records.push_back(DtlsMessage::Handshake(head));
        }
        Ok(())
    }

    /// Serialize messages into records, one datagram buffer per record.
    ///
    /// Handshake messages get the next send `message_seq`; the codec does
    /// not fragment on send. Records are framed with the connection
    /// version, the current epoch and the next record sequence number.
    pub fn encode(&mut self, records: Vec<DtlsMessage>) -> Result<Vec<Vec<u8>>> {
        let version = WireVersion::from(self.version);
        let mut pkgs = Vec::with_capacity(records.len());
        for mut message in records {
            if let DtlsMessage::Handshake(handshake) = &mut message {
                handshake.message_seq = self.next_send_seq;
                self.next_send_seq = self.next_send_seq.wrapping_add(1);
            }
            let mut record = DtlsRecord::single(version, message);
            record.epoch = self.epoch;
            record.sequence_number = self.next_record_send_seq;
            self.next_record_send_seq += 1;
            pkgs.push(record.to_bytes().map_err(ConnectionError::from)?);
        }
        Ok(pkgs)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pop the oldest completed message.
    pub fn pop_record(&mut self) -> Option<DtlsMessage> {
        self.records.pop_front()
    }

    pub fn clear_records(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_window_observes_per_slot() {
        let mut window = ReplayWindow::new();
        assert!(!window.observe(5));
        assert!(window.observe(5));
        assert!(window.is_duplicate(5));
        // Same residue class, higher number.
        assert!(!window.observe(69));
        assert!(window.is_duplicate(5));
        // Different slot is untouched.
        assert!(!window.is_duplicate(6));
    }

    #[test]
    fn test_truncated_datagram_is_dropped() {
        let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
        let data = hex::decode("16feff000000000000000000cd").unwrap();
        connection.decode(&data).unwrap();
        assert!(connection.is_empty());
        // Nothing is buffered between datagrams.
        assert_eq!(connection.next_receive_seq(), 0);
    }
}
