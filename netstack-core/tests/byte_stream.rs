use netstack_core::ByteStream;

#[test]
fn writer_and_reader_share_the_same_accounting() {
    let mut s = ByteStream::new(15);
    assert_eq!(s.write(b"abcdef"), 6);
    assert_eq!(s.peek_output(3), b"abc");
    s.pop_output(3);
    assert_eq!(s.write(b"ghijklmnop"), 10);
    assert_eq!(s.buffer_size(), 12);
    assert_eq!(s.remaining_capacity(), 3);
    assert_eq!(s.read(12), b"defghijklmnop");
}

#[test]
fn eof_only_after_ended_and_drained() {
    let mut s = ByteStream::new(4);
    s.write(b"ab");
    assert!(!s.eof());
    s.end_input();
    assert!(!s.eof());
    s.pop_output(2);
    assert!(s.eof());
}

#[test]
fn error_flag_is_sticky() {
    let mut s = ByteStream::new(4);
    assert!(!s.error());
    s.set_error();
    assert!(s.error());
    s.write(b"x");
    assert!(s.error());
}
