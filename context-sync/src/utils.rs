#[cfg(test)]
pub mod fake_key_value_store;
#[cfg(test)]
pub mod test_connector;
pub mod time_source;
