pub mod generator;
pub mod instance;
pub mod layout;

#[cfg(test)]
pub mod test_instances;
