use netstack_core::wire::seqno::WrappingInt32;
use netstack_core::TcpSender;

fn sender(rt_timeout: u16) -> TcpSender {
    TcpSender::new(2000, rt_timeout, 1000, Some(WrappingInt32::new(0)))
}

#[test]
fn first_fill_window_sends_a_bare_syn() {
    let mut s = sender(1000);
    s.fill_window();
    assert_eq!(s.segments_out().len(), 1);
    let syn = s.segments_out().pop_front().unwrap();
    assert!(syn.header.syn);
    assert_eq!(syn.payload.len(), 0);
    assert_eq!(s.bytes_in_flight(), 1);
}

#[test]
fn window_limits_how_much_goes_out() {
    let mut s = sender(1000);
    s.fill_window();
    s.segments_out().clear();
    s.ack_received(WrappingInt32::new(1), 3);
    s.stream_mut().write(b"hello world");
    s.fill_window();
    let total: usize = s.segments_out().iter().map(|seg| seg.payload.len()).sum();
    assert!(total <= 3);
}

#[test]
fn retransmission_timer_doubles_rto_on_each_expiry() {
    let mut s = sender(100);
    s.fill_window();
    s.segments_out().clear();
    // RTO starts at 100 and doubles on every non-zero-window expiry, so
    // feeding back exactly the current RTO each time keeps triggering it.
    for (expected_attempts, elapsed) in [(1, 100), (2, 200), (3, 400), (4, 800), (5, 1600)] {
        s.tick(elapsed);
        assert_eq!(s.consecutive_retransmissions(), expected_attempts);
        assert_eq!(s.segments_out().len(), 1);
        s.segments_out().clear();
    }
}

#[test]
fn replaying_the_same_ack_is_a_no_op() {
    let mut s = sender(1000);
    s.fill_window();
    s.segments_out().clear();
    s.ack_received(WrappingInt32::new(1), 1000);
    let bytes_in_flight = s.bytes_in_flight();
    s.ack_received(WrappingInt32::new(1), 1000);
    assert_eq!(s.bytes_in_flight(), bytes_in_flight);
}
