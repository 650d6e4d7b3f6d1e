pub mod dropbox;
