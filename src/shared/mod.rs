pub mod constants;
pub mod llm;

#[cfg(test)]
pub mod test_helpers;
