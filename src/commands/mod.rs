mod checklist;
pub mod filter;
pub mod options;
pub mod resolve;
#[cfg(test)]
mod tests;
