// Library exports for testing
// The binary (main.rs) imports these as well

pub mod error;
pub mod intake;
pub mod logger;
pub mod settings;

#[cfg(test)]
mod tests;
