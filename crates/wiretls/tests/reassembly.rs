//! DTLS fragment reassembly: permutation invariance, in-order delivery and
//! duplicate handling.

use wiretls::{
    Certificate, Codec, ConnectionError, DtlsConnection, DtlsHandshake, DtlsMessage, DtlsRecord,
    HandshakeBody, HandshakeType, ProtocolVersion, ServerCertificate, WireVersion,
};

/// A 600-byte certificate handshake body: 3 list header bytes, 3 entry
/// header bytes and 594 certificate bytes.
fn certificate_body() -> Vec<u8> {
    let message = ServerCertificate::new(vec![Certificate(vec![0xab; 594])]);
    let body = message.to_bytes().unwrap();
    assert_eq!(body.len(), 600);
    body
}

fn fragment(body: &[u8], message_seq: u16, offset: usize, len: usize) -> DtlsHandshake {
    DtlsHandshake {
        msg_type: HandshakeType::Certificate,
        length: body.len() as u32,
        message_seq,
        fragment_offset: offset as u32,
        fragment_length: len as u32,
        body: HandshakeBody::Opaque(body[offset..offset + len].to_vec()),
    }
}

fn record_for(sequence_number: u64, handshake: &DtlsHandshake) -> Vec<u8> {
    let record = DtlsRecord {
        content_type: wiretls::ContentType::Handshake,
        version: WireVersion::new(254, 255),
        epoch: 0,
        sequence_number,
        length: 0,
        payload: wiretls::DtlsRecordPayload::Raw(handshake.to_bytes().unwrap()),
    };
    record.to_bytes().unwrap()
}

fn pop_handshake(connection: &mut DtlsConnection) -> DtlsHandshake {
    match connection.pop_record() {
        Some(DtlsMessage::Handshake(handshake)) => handshake,
        other => panic!("expected a handshake message, got {:?}", other),
    }
}

fn assert_reassembled(mut connection: DtlsConnection) {
    let handshake = pop_handshake(&mut connection);
    assert_eq!(handshake.msg_type, HandshakeType::Certificate);
    assert_eq!(handshake.message_seq, 0);
    assert_eq!(handshake.length, 600);
    assert_eq!(handshake.fragment_offset, 0);
    assert_eq!(handshake.fragment_length, 600);
    assert!(!handshake.is_fragment());
    match &handshake.body {
        HandshakeBody::Certificate(certificate) => {
            assert_eq!(certificate.certificate_list.len(), 1);
            assert_eq!(certificate.certificate_list[0].len(), 594);
        }
        other => panic!("expected a decoded certificate, got {:?}", other),
    }
    assert!(connection.is_empty());
}

#[test]
fn test_fragments_in_order() {
    let body = certificate_body();
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    for (i, offset) in [0usize, 200, 400].into_iter().enumerate() {
        assert!(connection.is_empty());
        let handshake = fragment(&body, 0, offset, 200);
        connection.decode(&record_for(i as u64, &handshake)).unwrap();
    }
    assert_reassembled(connection);
}

#[test]
fn test_fragments_in_reverse_order() {
    let body = certificate_body();
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    for (i, offset) in [400usize, 200, 0].into_iter().enumerate() {
        assert!(connection.is_empty());
        let handshake = fragment(&body, 0, offset, 200);
        connection.decode(&record_for(i as u64, &handshake)).unwrap();
    }
    assert_reassembled(connection);
}

#[test]
fn test_fragments_with_duplicate() {
    let body = certificate_body();
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    for (i, offset) in [0usize, 200, 0, 400].into_iter().enumerate() {
        assert!(connection.is_empty());
        let handshake = fragment(&body, 0, offset, 200);
        connection.decode(&record_for(i as u64, &handshake)).unwrap();
    }
    assert_reassembled(connection);
}

#[test]
fn test_overlapping_fragments() {
    let body = certificate_body();
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    // Ranges overlap by 100 bytes on each seam.
    for (i, (offset, len)) in [(0usize, 300usize), (200, 300), (300, 300)]
        .into_iter()
        .enumerate()
    {
        let handshake = fragment(&body, 0, offset, len);
        connection.decode(&record_for(i as u64, &handshake)).unwrap();
    }
    assert_reassembled(connection);
}

fn server_hello_done(message_seq: u16) -> DtlsHandshake {
    DtlsHandshake {
        msg_type: HandshakeType::ServerHelloDone,
        length: 0,
        message_seq,
        fragment_offset: 0,
        fragment_length: 0,
        body: HandshakeBody::Opaque(Vec::new()),
    }
}

#[test]
fn test_no_delivery_before_predecessor() {
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);

    // Sequence 1 arrives complete but must wait for sequence 0.
    connection
        .decode(&record_for(0, &server_hello_done(1)))
        .unwrap();
    assert!(connection.is_empty());
    assert_eq!(connection.next_receive_seq(), 0);

    connection
        .decode(&record_for(1, &server_hello_done(0)))
        .unwrap();
    assert_eq!(connection.next_receive_seq(), 2);

    assert_eq!(pop_handshake(&mut connection).message_seq, 0);
    assert_eq!(pop_handshake(&mut connection).message_seq, 1);
    assert!(connection.is_empty());
}

#[test]
fn test_stale_sequence_is_dropped() {
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    connection
        .decode(&record_for(0, &server_hello_done(0)))
        .unwrap();
    assert_eq!(pop_handshake(&mut connection).message_seq, 0);

    // A retransmission of sequence 0 is ignored.
    connection
        .decode(&record_for(1, &server_hello_done(0)))
        .unwrap();
    assert!(connection.is_empty());
    assert_eq!(connection.next_receive_seq(), 1);
}

#[test]
fn test_non_handshake_records_pass_through() {
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    // Alert record: warning close_notify.
    let data = hex::decode("15feff000000000000000000020100").unwrap();
    connection.decode(&data).unwrap();
    match connection.pop_record() {
        Some(DtlsMessage::Alert(alert)) => assert_eq!(alert.description.0, 0),
        other => panic!("expected an alert, got {:?}", other),
    }
}

#[test]
fn test_wrong_version_carries_record() {
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);
    // DTLS 1.2 alert fed to a DTLS 1.0 connection.
    let data = hex::decode("15fefd000000000000000000020100").unwrap();
    let err = connection.decode(&data).unwrap_err();
    match err {
        ConnectionError::WrongProtocolVersion { expected, got, .. } => {
            assert_eq!(expected, ProtocolVersion::DTLSv10);
            assert_eq!(got, WireVersion::new(254, 253));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_encode_assigns_sequence_numbers() {
    let mut sender = DtlsConnection::new(ProtocolVersion::DTLSv10);
    let messages = vec![
        DtlsMessage::Handshake(server_hello_done(0)),
        DtlsMessage::Handshake(server_hello_done(0)),
    ];
    let pkgs = sender.encode(messages).unwrap();
    assert_eq!(pkgs.len(), 2);

    for (i, pkg) in pkgs.iter().enumerate() {
        let (record, rest) = DtlsRecord::decode(pkg).unwrap();
        assert!(rest.is_empty());
        assert_eq!(record.version, WireVersion::new(254, 255));
        assert_eq!(record.epoch, 0);
        assert_eq!(record.sequence_number, i as u64);
        match record.message() {
            Some(DtlsMessage::Handshake(handshake)) => {
                assert_eq!(handshake.message_seq, i as u16);
                assert_eq!(handshake.fragment_offset, 0);
                assert_eq!(handshake.fragment_length, handshake.length);
            }
            other => panic!("expected a handshake message, got {:?}", other),
        }
    }

    // A receiver consumes the flight in order.
    let mut receiver = DtlsConnection::new(ProtocolVersion::DTLSv10);
    for pkg in &pkgs {
        receiver.decode(pkg).unwrap();
    }
    assert_eq!(pop_handshake(&mut receiver).message_seq, 0);
    assert_eq!(pop_handshake(&mut receiver).message_seq, 1);
}

#[test]
fn test_two_fragments_in_one_datagram() {
    let body = certificate_body();
    let mut connection = DtlsConnection::new(ProtocolVersion::DTLSv10);

    let first = fragment(&body, 0, 0, 300);
    let second = fragment(&body, 0, 300, 300);
    let mut datagram = record_for(0, &first);
    datagram.extend_from_slice(&record_for(1, &second));

    connection.decode(&datagram).unwrap();
    assert_reassembled(connection);
}
