use exstream_rs::core::{Pipeline, Stream};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let words = ["apple", "banana", "avocado", "cherry", "blueberry", "apricot"];
  let by_letter = Stream::from_iterator(words).group_by(|word| word.as_bytes()[0]).value().wait().expect("grouping");
  for (letter, group) in &by_letter {
    println!("{}: {:?}", char::from(*letter), group);
  }

  let normalize = Pipeline::<&str, &str>::new().map(str::trim).reject(|word| word.is_empty()).map(str::to_uppercase);
  let batches = Stream::from_iterator([" one", "", "two ", "three", "  "])
    .through(&normalize)
    .batch(2)
    .expect("batch size")
    .values()
    .into_immediate()
    .expect("synchronous chain");
  println!("batches: {batches:?}");

  let total = Stream::from_iterator(1_u64..=10).filter(|value| value % 2 == 0).reduce1(|left, right| left + right).value();
  println!("sum of evens: {:?}", total.wait());
}
