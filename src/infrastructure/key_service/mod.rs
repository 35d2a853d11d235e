//! Hosted key service clients

mod unkey;

pub use unkey::UnkeyKeyService;
