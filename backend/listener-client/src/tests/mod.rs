mod config;
mod protocol;
mod support;
