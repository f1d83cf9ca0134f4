pub mod handlers;
pub mod matcher;
pub mod reply;
pub mod similarity;

#[cfg(test)]
pub mod test_support;
