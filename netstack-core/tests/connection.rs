use netstack_core::{EngineConfig, TcpConnection};

fn handshake() -> (TcpConnection, TcpConnection) {
    let mut a = TcpConnection::new(EngineConfig::default());
    let mut b = TcpConnection::new(EngineConfig::default());
    a.connect();
    let syn = a.segments_out().pop_front().expect("SYN sent");
    b.segment_received(&syn);
    let syn_ack = b.segments_out().pop_front().expect("SYN/ACK sent");
    a.segment_received(&syn_ack);
    if let Some(ack) = a.segments_out().pop_front() {
        b.segment_received(&ack);
    }
    (a, b)
}

#[test]
fn data_written_on_one_side_arrives_on_the_other() {
    let (mut a, mut b) = handshake();
    a.write(b"hello, world");
    while let Some(seg) = a.segments_out().pop_front() {
        b.segment_received(&seg);
    }
    assert_eq!(b.inbound().read(12), b"hello, world");
}

#[test]
fn closing_one_side_eventually_ends_the_connection() {
    let (mut a, mut b) = handshake();
    a.write(b"bye");
    a.end_input_stream();
    while let Some(seg) = a.segments_out().pop_front() {
        b.segment_received(&seg);
    }
    while let Some(seg) = b.segments_out().pop_front() {
        a.segment_received(&seg);
    }
    assert_eq!(b.inbound().read(3), b"bye");
    assert!(b.inbound().eof());
}

#[test]
fn connections_start_active() {
    let (a, b) = handshake();
    assert!(a.active());
    assert!(b.active());
}
