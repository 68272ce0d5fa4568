use std::time::Duration;

use exstream_rs::{core::Stream, std::TokioDriver};
use tracing_subscriber::EnvFilter;

async fn lookup(id: u32) -> Result<String, String> {
  tokio::time::sleep(Duration::from_millis(u64::from(10 - id))).await;
  if id == 7 { Err(format!("record {id} missing")) } else { Ok(format!("record-{id}")) }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let stream = Stream::from_iterator(1_u32..=9).map(lookup).resolve_with(3).expect("parallelism").stop_on_error(false);
  let errors = stream.errors();
  let records = stream.try_map(|record| record).values().await.expect("lookup stream");
  println!("records: {records:?}");
  println!("errors recorded: {}", errors.len());

  let driver = TokioDriver::current().expect("tokio runtime");
  let squares = Stream::from_iterator(1_u32..=5).map(|value| async move { value * value }).resolve();
  let task = driver.spawn(squares.to_promise());
  println!("squares: {:?}", task.await.expect("join"));
}
