use std::time::Duration;

use exstream_rs::{core::Stream, std::TokioDriver};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let (mut emitter, stream) = Stream::<String>::from_push(4);
  let producer = tokio::spawn(async move {
    for line in ["GET /", "GET /health", "POST /orders", "GET /orders/1"] {
      if emitter.emit(line.to_owned()).await.is_err() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    emitter.end();
  });

  let mut requests = stream.filter(|line| line.starts_with("GET")).to_async_iterator();
  while let Some(request) = requests.next().await {
    match request {
      | Ok(line) => println!("handled {line}"),
      | Err(error) => println!("stream failed: {error}"),
    }
  }
  producer.await.expect("producer");

  let (sender, receiver) = tokio::sync::mpsc::channel::<u32>(8);
  let driver = TokioDriver::current().expect("tokio runtime");
  let counter = driver.spawn_evaluation(Stream::from_tokio_receiver(receiver).reduce(0_u32, |count, _| count + 1).value());
  for value in 0..3 {
    sender.send(value).await.expect("receiver alive");
  }
  drop(sender);
  println!("received {} values", counter.await.expect("join").expect("count"));
}
