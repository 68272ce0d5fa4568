use super::StreamConfig;
use crate::core::{ErrorPolicy, StreamBufferConfig};

#[test]
fn default_config_stops_on_error_with_sixteen_slot_buffers() {
  let config = StreamConfig::default();
  assert_eq!(config.error_policy(), ErrorPolicy::Stop);
  assert_eq!(config.buffer().capacity(), 16);
}

#[test]
fn builders_replace_single_fields() {
  let config = StreamConfig::default()
    .with_buffer(StreamBufferConfig::default().with_capacity(2))
    .with_error_policy(ErrorPolicy::from_stop_on_error(false));
  assert_eq!(config, StreamConfig::new(StreamBufferConfig::new(2), ErrorPolicy::Continue));
  assert!(!config.error_policy().stops());
}
