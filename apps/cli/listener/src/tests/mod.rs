mod intake;
mod logger;
mod settings;
