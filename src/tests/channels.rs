/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

use crate::channels::channel;
use crate::errors::{RecvError, TryRecvError};
use crate::tests::{SCALE_CONSUMERS, SCALE_MSG_COUNT, SCALE_PRODUCERS, SCALE_QUEUE_SIZE};

#[test]
fn channel_mp_sc() {
    let (sender, receiver) = channel::<usize>(SCALE_QUEUE_SIZE).unwrap();

    let producers = (0..SCALE_PRODUCERS)
        .map(|p| {
            let sender = sender.clone();
            std::thread::spawn(move || {
                for i in 0..(SCALE_MSG_COUNT / SCALE_PRODUCERS) {
                    sender.send((p * SCALE_MSG_COUNT / SCALE_PRODUCERS) + i).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    drop(sender);

    let consumer = std::thread::spawn(move || {
        let mut outputs = Vec::with_capacity(SCALE_MSG_COUNT);
        loop {
            match receiver.recv() {
                Ok(item) => outputs.push(item),
                Err(RecvError) => break,
            }
        }
        outputs
    });

    for producer in producers {
        producer.join().unwrap();
    }
    let mut outputs = consumer.join().unwrap();
    outputs.sort_unstable();
    assert_eq!(SCALE_MSG_COUNT, outputs.len());
    for (i, v) in outputs.into_iter().enumerate() {
        assert_eq!(i, v);
    }
}

#[test]
fn channel_sp_mc() {
    let (sender, receiver) = channel::<usize>(SCALE_QUEUE_SIZE).unwrap();

    let consumers = (0..SCALE_CONSUMERS)
        .map(|_| {
            let receiver = receiver.clone();
            std::thread::spawn(move || {
                let mut outputs = Vec::new();
                loop {
                    match receiver.try_recv() {
                        Ok(item) => outputs.push(item),
                        Err(TryRecvError::Empty) => std::thread::yield_now(),
                        Err(TryRecvError::Disconnected) => break,
                    }
                }
                outputs
            })
        })
        .collect::<Vec<_>>();
    drop(receiver);

    let producer = std::thread::spawn(move || {
        for i in 0..SCALE_MSG_COUNT {
            sender.send(i).unwrap();
        }
    });

    producer.join().unwrap();
    let mut outputs = consumers
        .into_iter()
        .flat_map(|consumer| consumer.join().unwrap())
        .collect::<Vec<_>>();
    outputs.sort_unstable();
    assert_eq!(SCALE_MSG_COUNT, outputs.len());
    for (i, v) in outputs.into_iter().enumerate() {
        assert_eq!(i, v);
    }
}
