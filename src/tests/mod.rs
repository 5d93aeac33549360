#[cfg(test)]
pub mod common;

pub mod category_entries;
