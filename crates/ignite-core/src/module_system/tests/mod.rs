#[cfg(test)]
mod version_tests;
