/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

mod channels;

/// The size of the queue to use
pub const SCALE_QUEUE_SIZE: usize = 32;

/// The number of messages
pub const SCALE_MSG_COUNT: usize = 200_000;

/// The number of producers in a multiple producers test
pub const SCALE_PRODUCERS: usize = 5;

/// The number of consumers in a multiple consumers test
pub const SCALE_CONSUMERS: usize = 5;

fn assert_send<T: Send>(_thing: &T) {}

#[test]
fn test_sender_receiver_are_send() {
    // usize: Send + Sync
    let (sender, receiver) = crate::channels::channel::<usize>(4).unwrap();
    assert_send(&sender);
    assert_send(&receiver);

    // RefCell: Send + !Sync
    let (sender, receiver) = crate::channels::channel::<core::cell::RefCell<usize>>(4).unwrap();
    assert_send(&sender);
    assert_send(&receiver);
}
