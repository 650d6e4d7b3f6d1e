pub mod fixtures;

#[cfg(test)]
mod dropbox_client_tests;
