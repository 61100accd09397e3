//! SSLv2 record corpus: both header shapes, hello messages and padding
//! preservation.

use wiretls::{Codec, Record, Ssl2Message, Ssl2Record, WireVersion};

fn decode_record(data: &[u8]) -> Ssl2Record {
    let (record, rest) = Ssl2Record::decode(data).unwrap();
    assert!(rest.is_empty());
    record
}

const CLIENT_HELLO: &str = concat!(
    "802e010002",
    "001500000010",
    "0500800300800100800700c0060040040080020080",
    "44daa86b5ce6cbddde1d6948488e258e",
);

#[test]
fn test_client_hello() {
    let data = hex::decode(CLIENT_HELLO).unwrap();

    // The stream sniffer classifies this as SSLv2 from bytes 3 and 4.
    let (record, rest) = Record::decode(&data).unwrap();
    assert!(rest.is_empty());
    let record = match record {
        Record::Ssl2(record) => record,
        other => panic!("expected an SSLv2 record, got {:?}", other),
    };

    assert_eq!(record.length, 46);
    assert!(record.padding.is_empty());
    assert!(!record.is_escape);
    assert_eq!(record.msg_type, 1);

    let hello = match record.message() {
        Some(Ssl2Message::ClientHello(hello)) => hello,
        other => panic!("expected an SSLv2 client hello, got {:?}", other),
    };
    assert_eq!(hello.version, WireVersion::new(0, 2));
    assert!(hello.session_id.is_empty());
    assert_eq!(hello.cipher_suites.len(), 7);
    assert_eq!(hello.cipher_suites[0], 0x050080);
    assert_eq!(hello.challenge.len(), 16);

    assert_eq!(record.to_bytes().unwrap(), data);
}

#[test]
fn test_client_hello_truncation_is_retryable() {
    let data = hex::decode(CLIENT_HELLO).unwrap();
    for cut in [1, 2, 5, 11, data.len() - 1] {
        let err = Ssl2Record::decode(&data[..cut]).unwrap_err();
        assert!(err.is_retryable(), "prefix of {} bytes", cut);
    }
}

#[test]
fn test_server_hello() {
    let data = hex::decode(concat!(
        "837304",
        "00010002",
        "034300150010",
        "3082033f308202a8a00302010202024ae6300d06092a864886",
        "f70d01010505003081bb310b3009060355040613022d2d3112",
        "301006035504080c09536f6d6553746174653111300f060355",
        "04070c08536f6d654369747931193017060355040a0c10536f",
        "6d654f7267616e697a6174696f6e311f301d060355040b0c16",
        "536f6d654f7267616e697a6174696f6e616c556e6974311e30",
        "1c06035504030c156c6f63616c686f73742e6c6f63616c646f",
        "6d61696e3129302706092a864886f70d010901161a726f6f74",
        "406c6f63616c686f73742e6c6f63616c646f6d61696e301e17",
        "0d3134303530343035343935345a170d313530353034303534",
        "3935345a3081bb310b3009060355040613022d2d3112301006",
        "035504080c09536f6d6553746174653111300f06035504070c",
        "08536f6d654369747931193017060355040a0c10536f6d654f",
        "7267616e697a6174696f6e311f301d060355040b0c16536f6d",
        "654f7267616e697a6174696f6e616c556e6974311e301c0603",
        "5504030c156c6f63616c686f73742e6c6f63616c646f6d6169",
        "6e3129302706092a864886f70d010901161a726f6f74406c6f",
        "63616c686f73742e6c6f63616c646f6d61696e30819f300d06",
        "092a864886f70d010101050003818d0030818902818100b712",
        "157298a96c4f64027fec7fc42f66f5d5d46da4096b5f0b8e77",
        "9b5677dcecba2eb8bca41b11eda4ee5f19d86cbb714d0a38a3",
        "4c0bc7b02ec3594c56b1b5aea33d3f2de966b3f7256594b990",
        "fa7c0de34d99d9d8a0a626b49a0234822a17868316e25aa58f",
        "ebd23693744a8bf0836fe5d337b6caebeaef0b583758340f4a",
        "d10203010001a350304e301d0603551d0e041604149744e81b",
        "a93cd6eec904f7da99100b1e6c37e429301f0603551d230418",
        "301680149744e81ba93cd6eec904f7da99100b1e6c37e42930",
        "0c0603551d13040530030101ff300d06092a864886f70d0101",
        "0505000381810032e346b65873c17df9b86d61fb2692255a46",
        "54861cf77ddc82feb03827f6074f9f2671033abc6d6f3d4cdc",
        "41545bee1ff7e0d94d59d70e9f8150e63aee5f0ffe3c7b3cfd",
        "053ac1991254284376b5063637fd8aee38c9b2ca1ec5c49c45",
        "d27038474f393f2dc0233d72afa769085ffe7e4d46363525ce",
        "04b9cb4d6e88b9595394",
        "0500800300800100800700c0060040040080020080",
        "091968f2228096a12b87ee83f96669c2",
    ))
    .unwrap();
    let record = decode_record(&data);

    assert_eq!(record.length, 883);
    assert!(record.padding.is_empty());
    assert_eq!(record.msg_type, 4);

    let hello = match record.message() {
        Some(Ssl2Message::ServerHello(hello)) => hello,
        other => panic!("expected an SSLv2 server hello, got {:?}", other),
    };
    assert_eq!(hello.session_id_hit, 0);
    assert_eq!(hello.certificate_type, 1);
    assert_eq!(hello.version, WireVersion::new(0, 2));
    assert_eq!(hello.certificate.len(), 835);
    assert_eq!(hello.cipher_suites.len(), 7);
    assert_eq!(hello.connection_id.len(), 16);

    assert_eq!(record.to_bytes().unwrap(), data);
}

fn sample_client_hello() -> wiretls::Ssl2ClientHello {
    wiretls::Ssl2ClientHello {
        version: WireVersion::new(0, 2),
        cipher_suites: vec![0x010080, 0x0700c0],
        session_id: Vec::new(),
        challenge: vec![0x5a; 16],
    }
}

#[test]
fn test_three_byte_header_keeps_padding() {
    let hello = sample_client_hello();
    let mut record = Ssl2Record::single(Ssl2Message::ClientHello(hello)).unwrap();
    record.padding = vec![0x00; 3];

    let bytes = record.to_bytes().unwrap();
    // 3-byte header: high bit clear, padding length in byte 2.
    assert_eq!(bytes[0] & 0x80, 0);
    assert_eq!(bytes[2], 3);

    let (decoded, rest) = Ssl2Record::decode(&bytes).unwrap();
    assert!(rest.is_empty());
    assert_eq!(decoded.padding, vec![0x00; 3]);
    assert_eq!(decoded.message(), record.message());
    assert_eq!(decoded.to_bytes().unwrap(), bytes);
}

#[test]
fn test_two_byte_header_never_has_padding() {
    let hello = sample_client_hello();
    let record = Ssl2Record::single(Ssl2Message::ClientHello(hello)).unwrap();

    let bytes = record.to_bytes().unwrap();
    assert_eq!(bytes[0] & 0x80, 0x80);

    let (decoded, _) = Ssl2Record::decode(&bytes).unwrap();
    assert!(decoded.padding.is_empty());
}
