mod secret;

pub use secret::SecretBuilder;
