//! History store tests

#[cfg(test)]
mod store_tests;
