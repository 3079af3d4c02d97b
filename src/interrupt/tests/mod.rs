#[cfg(test)]
mod flag_tests;
