use alloc::vec;

use tokio::sync::mpsc;

use crate::core::Stream;

#[tokio::test(flavor = "current_thread")]
async fn drains_a_bounded_channel_until_senders_drop() {
  let (sender, receiver) = mpsc::channel::<u32>(8);
  for value in 1..=3 {
    sender.send(value).await.expect("receiver alive");
  }
  drop(sender);
  let stream = Stream::from_tokio_receiver(receiver).map(|value| value + 1);
  assert!(stream.is_async());
  assert_eq!(stream.values().await, Ok(vec![2, 3, 4]));
}

#[tokio::test(flavor = "current_thread")]
async fn stopping_early_closes_the_channel() {
  let (sender, receiver) = mpsc::unbounded_channel::<u32>();
  sender.send(9).expect("receiver alive");
  assert_eq!(Stream::from_tokio_unbounded_receiver(receiver).value().await, Ok(9));
  assert!(sender.is_closed());
}

#[tokio::test(flavor = "current_thread")]
async fn values_sent_while_consuming_are_delivered() {
  let (sender, receiver) = mpsc::channel::<u32>(1);
  let producer = tokio::spawn(async move {
    for value in 0..5 {
      sender.send(value).await.expect("receiver alive");
    }
  });
  let total = Stream::from_tokio_receiver(receiver).reduce(0_u32, |acc, value| acc + value).value().await;
  assert_eq!(total, Ok(10));
  producer.await.expect("producer task");
}
